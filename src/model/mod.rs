//! Domain records.
//!
//! A `Project` is a named container with an archived flag. A `Task` belongs to
//! exactly one project (referenced by the project's id) and carries a priority,
//! an optional deadline and a completion flag.

mod project;
mod task;

pub use project::Project;
pub use task::{NewTask, Priority, Task};
