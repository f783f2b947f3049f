//! `gymgrid-workouts` — workout plans and member tasks.

pub mod plan;
pub mod task;

pub use plan::{CreatePlan, WorkoutPlan};
pub use task::{CreateTask, TaskStatus, WorkoutTask};
