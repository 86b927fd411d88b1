//! Plan handling: wire schema, priority mapping, validation, and the
//! aggregate service with the atomic apply operation.

pub mod priority;
pub mod schema;
pub mod service;
pub mod validate;

pub use priority::{PlanPriority, PlanPriorityParseError};
pub use schema::{
    ArchitectureModule, GeneratedPlan, PlanArchitecture, PlanPhase, PlanTask, PlanTechStack,
};
pub use service::{PhaseWithTasks, ProjectAggregate, apply_plan, get_project_aggregate,
    list_project_aggregates, update_task};
pub use validate::{PlanShapeError, parse_generated_plan};
