//! Per-table query functions. All take `&PgPool` and return `anyhow::Result`.

pub mod phases;
pub mod projects;
pub mod tasks;
