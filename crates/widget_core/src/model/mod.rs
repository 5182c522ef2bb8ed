mod task;

pub use task::{DEFAULT_DUE_HOUR, DEFAULT_DUE_MINUTE, NO_UPCOMING_TITLE, Task, TaskCollection};
