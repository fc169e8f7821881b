mod dispatcher;
mod queue;
mod scheduler;

pub use dispatcher::{DispatchError, run_dispatcher};
pub use queue::EventQueue;
pub use scheduler::{SchedulerError, run_scheduler};
