use std::time::{Duration, Instant};

use resourceloader::{Fetcher, ResourceThreadHandle};
use settings::Settings;

use crate::{
    dom::{Document, ElementId, HtmlObjectElement},
    event_loop::{EventLoop, Task},
    html::{ImageDecoder, ThreadedImageDecoder},
};

/// The Browsing Context owns a document along with its elements and runs their tasks
pub struct BrowsingContext {
    document: Document,
    event_loop: EventLoop,

    /// Indexed by [ElementId], removed elements leave a hole
    object_elements: Vec<Option<HtmlObjectElement>>,
}

impl BrowsingContext {
    /// Creates a browsing context that loads resources on a background thread
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let fetcher = ResourceThreadHandle::spawn(settings.clone());
        Self::with_collaborators(settings, Box::new(fetcher), Box::new(ThreadedImageDecoder::new()))
    }

    #[must_use]
    pub fn with_collaborators(
        settings: Settings,
        fetcher: Box<dyn Fetcher>,
        image_decoder: Box<dyn ImageDecoder>,
    ) -> Self {
        let event_loop = EventLoop::new();
        let document = Document::new(settings, fetcher, image_decoder, event_loop.handle());

        Self {
            document,
            event_loop,
            object_elements: vec![],
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Creates a new `<object>` element and queues its first run of the representation algorithm
    pub fn create_object_element(
        &mut self,
        data: Option<&str>,
        declared_type: Option<&str>,
    ) -> ElementId {
        let id = ElementId::new(self.object_elements.len());
        let element =
            HtmlObjectElement::new(id, data.map(str::to_owned), declared_type.map(str::to_owned));
        element.queue_representation_steps(&self.document);

        log::debug!("Created <object> element {id:?} (data={data:?}, type={declared_type:?})");
        self.object_elements.push(Some(element));
        id
    }

    #[must_use]
    pub fn object_element(&self, id: ElementId) -> Option<&HtmlObjectElement> {
        self.object_elements.get(id.index())?.as_ref()
    }

    pub fn object_element_mut(&mut self, id: ElementId) -> Option<&mut HtmlObjectElement> {
        self.object_elements.get_mut(id.index())?.as_mut()
    }

    /// Returns `false` if there is no such element
    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> bool {
        self.change_attribute(id, name, Some(value.to_owned()))
    }

    /// Returns `false` if there is no such element
    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> bool {
        self.change_attribute(id, name, None)
    }

    fn change_attribute(&mut self, id: ElementId, name: &str, value: Option<String>) -> bool {
        let Some(element) = self
            .object_elements
            .get_mut(id.index())
            .and_then(Option::as_mut)
        else {
            log::warn!("Cannot change attribute {name:?} of {id:?}: no such element");
            return false;
        };

        element.set_attribute(name, value, &self.document);
        true
    }

    /// Removes an element from the document
    ///
    /// In-flight fetches are cancelled and tasks that are still queued for the
    /// element will be dropped.
    pub fn remove_object_element(&mut self, id: ElementId) -> Option<HtmlObjectElement> {
        let mut element = self.object_elements.get_mut(id.index())?.take()?;
        element.abandon();

        log::debug!("Removed <object> element {id:?}");
        Some(element)
    }

    /// Runs queued tasks until the queue is empty
    ///
    /// Tasks that are queued while this runs are also run. Returns the number of tasks that ran.
    pub fn spin_event_loop(&mut self) -> usize {
        let mut tasks_run = 0;
        while let Some(task) = self.event_loop.next_task() {
            self.run_task(task);
            tasks_run += 1;
        }
        tasks_run
    }

    /// Runs tasks until every element has reached its final representation
    ///
    /// Blocks while fetches or decodes are in flight. Returns `false` if `timeout`
    /// elapsed first.
    pub fn run_until_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        loop {
            self.spin_event_loop();

            if self.is_settled() {
                return true;
            }

            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };

            match self.event_loop.wait_for_task(remaining) {
                Some(task) => self.run_task(task),
                None => {
                    log::warn!("Gave up waiting for pending loads after {timeout:?}");
                    return false;
                },
            }
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.object_elements
            .iter()
            .flatten()
            .all(HtmlObjectElement::is_settled)
    }

    fn run_task(&mut self, task: Task) {
        let target = task.target();
        let Some(element) = self
            .object_elements
            .get_mut(target.index())
            .and_then(Option::as_mut)
        else {
            log::debug!("Dropping {:?} task for removed element {target:?}", task.source());
            return;
        };

        element.run_step(task.into_steps(), &mut self.document);
    }
}
