//! <https://dom.spec.whatwg.org/#events>

use std::fmt;

use crate::dom::ElementId;

/// The events fired by the representation algorithm
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// The external resource was fetched and is being represented
    Load,

    /// The `data` attribute could not be resolved or the fetch failed
    Error,
}

impl EventType {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// <https://dom.spec.whatwg.org/#concept-event>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    event_type: EventType,
    target: ElementId,
}

impl Event {
    #[must_use]
    pub fn new(event_type: EventType, target: ElementId) -> Self {
        Self { event_type, target }
    }

    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    #[must_use]
    pub fn target(&self) -> ElementId {
        self.target
    }
}

pub type EventListener = Box<dyn FnMut(&Event)>;

/// <https://dom.spec.whatwg.org/#interface-eventtarget>
#[derive(Default)]
pub struct EventTarget {
    /// <https://dom.spec.whatwg.org/#eventtarget-event-listener-list>
    listeners: Vec<(EventType, EventListener)>,
}

impl EventTarget {
    /// <https://dom.spec.whatwg.org/#dom-eventtarget-addeventlistener>
    pub fn add_event_listener(&mut self, event_type: EventType, listener: EventListener) {
        self.listeners.push((event_type, listener));
    }

    /// <https://dom.spec.whatwg.org/#concept-event-dispatch>
    ///
    /// Listeners run synchronously, in the order in which they were added.
    pub fn dispatch_event(&mut self, event: &Event) {
        log::trace!(
            "Dispatching {} event at {:?}",
            event.event_type(),
            event.target()
        );

        for (event_type, listener) in &mut self.listeners {
            if *event_type == event.event_type() {
                listener(event);
            }
        }
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn listeners_only_see_their_event_type() {
        let mut target = EventTarget::default();
        let seen = Rc::new(RefCell::new(vec![]));

        let load_events = seen.clone();
        target.add_event_listener(
            EventType::Load,
            Box::new(move |event| load_events.borrow_mut().push(event.event_type())),
        );

        target.dispatch_event(&Event::new(EventType::Error, ElementId::new(0)));
        assert!(seen.borrow().is_empty());

        target.dispatch_event(&Event::new(EventType::Load, ElementId::new(0)));
        assert_eq!(*seen.borrow(), vec![EventType::Load]);
    }
}
