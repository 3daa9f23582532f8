use std::{sync::mpsc, time::Duration};

use crate::dom::{ElementId, RepresentationStep};

use super::{Task, TaskSource};

/// <https://html.spec.whatwg.org/multipage/webappapis.html#event-loop>
///
/// There is a single FIFO [task queue](https://html.spec.whatwg.org/multipage/webappapis.html#task-queue)
/// for all task sources, so tasks run in exactly the order in which they were queued.
pub struct EventLoop {
    receiver: mpsc::Receiver<Task>,

    /// Kept so that the queue stays connected even when no handle is alive
    sender: mpsc::Sender<Task>,
}

/// The enqueueing side of an [EventLoop]
///
/// Handles can be cloned freely and sent to other threads, which is how fetch and decode
/// completions find their way back.
#[derive(Clone, Debug)]
pub struct TaskQueueHandle {
    sender: mpsc::Sender<Task>,
}

impl TaskQueueHandle {
    /// <https://html.spec.whatwg.org/multipage/webappapis.html#queue-a-task>
    pub fn queue_task(&self, source: TaskSource, target: ElementId, steps: RepresentationStep) {
        let task = Task::new(source, target, steps);
        log::trace!("Queueing {:?} task for {target:?}", task.source());

        if self.sender.send(task).is_err() {
            // Nobody is going to run the task, which is fine during teardown
            log::debug!("Dropping task for {target:?}, the event loop is gone");
        }
    }
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { receiver, sender }
    }

    #[must_use]
    pub fn handle(&self) -> TaskQueueHandle {
        TaskQueueHandle {
            sender: self.sender.clone(),
        }
    }

    /// Removes the oldest queued task without blocking
    #[must_use]
    pub fn next_task(&self) -> Option<Task> {
        self.receiver.try_recv().ok()
    }

    /// Blocks until a task is queued or `timeout` elapses
    #[must_use]
    pub fn wait_for_task(&self, timeout: Duration) -> Option<Task> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn tasks_run_in_queue_order() {
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();

        handle.queue_task(
            TaskSource::DomManipulation,
            ElementId::new(0),
            RepresentationStep::RunRepresentationSteps,
        );
        handle.queue_task(
            TaskSource::Networking,
            ElementId::new(1),
            RepresentationStep::RunRepresentationSteps,
        );

        let first = event_loop.next_task().unwrap();
        assert_eq!(first.source(), TaskSource::DomManipulation);
        assert_eq!(first.target(), ElementId::new(0));

        let second = event_loop.next_task().unwrap();
        assert_eq!(second.target(), ElementId::new(1));

        assert!(event_loop.next_task().is_none());
    }

    #[test]
    fn tasks_can_be_queued_from_other_threads() {
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();

        thread::spawn(move || {
            handle.queue_task(
                TaskSource::Networking,
                ElementId::new(7),
                RepresentationStep::RunRepresentationSteps,
            );
        })
        .join()
        .unwrap();

        let task = event_loop.wait_for_task(Duration::from_secs(5)).unwrap();
        assert_eq!(task.target(), ElementId::new(7));
    }

    #[test]
    fn waiting_times_out() {
        let event_loop = EventLoop::new();
        assert!(event_loop
            .wait_for_task(Duration::from_millis(10))
            .is_none());
    }
}
