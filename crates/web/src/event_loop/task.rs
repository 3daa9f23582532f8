//! <https://html.spec.whatwg.org/multipage/webappapis.html#concept-task>

use crate::dom::{ElementId, RepresentationStep};

/// <https://html.spec.whatwg.org/multipage/webappapis.html#generic-task-sources>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskSource {
    /// <https://html.spec.whatwg.org/multipage/webappapis.html#dom-manipulation-task-source>
    DomManipulation,

    /// <https://html.spec.whatwg.org/multipage/webappapis.html#networking-task-source>
    Networking,
}

/// <https://html.spec.whatwg.org/multipage/webappapis.html#concept-task>
///
/// Tasks never capture element state. They name the element they are meant for
/// and the transition that should be applied to it.
#[derive(Debug)]
pub struct Task {
    /// <https://html.spec.whatwg.org/multipage/webappapis.html#concept-task-source>
    source: TaskSource,

    target: ElementId,

    /// <https://html.spec.whatwg.org/multipage/webappapis.html#concept-task-steps>
    steps: RepresentationStep,
}

impl Task {
    #[must_use]
    pub fn new(source: TaskSource, target: ElementId, steps: RepresentationStep) -> Self {
        Self {
            source,
            target,
            steps,
        }
    }

    #[must_use]
    pub fn source(&self) -> TaskSource {
        self.source
    }

    #[must_use]
    pub fn target(&self) -> ElementId {
        self.target
    }

    #[must_use]
    pub fn into_steps(self) -> RepresentationStep {
        self.steps
    }
}
