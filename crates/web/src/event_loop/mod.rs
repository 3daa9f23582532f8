//! Orders the work of the representation algorithm
//!
//! Refer to <https://html.spec.whatwg.org/multipage/webappapis.html#event-loops> for more information.

mod event_loop;
mod task;

pub use event_loop::{EventLoop, TaskQueueHandle};
pub use task::{Task, TaskSource};
