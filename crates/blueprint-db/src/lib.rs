//! Database layer for blueprint: connection pool, embedded migrations,
//! row models, and per-table query functions.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
