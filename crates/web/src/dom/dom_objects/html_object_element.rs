use std::{fmt, mem, sync::Arc};

use resourceloader::{FetchHandle, LoadCompletion};

use crate::{
    dom::{Document, ElementId},
    event::{Event, EventListener, EventTarget, EventType},
    event_loop::TaskSource,
    html::{
        determine_resource_type, DecodeOutcome, DecodedImage, ImageRepresentationAdapter,
        ResourceHandler,
    },
};

const DATA_ATTRIBUTE: &str = "data";
const TYPE_ATTRIBUTE: &str = "type";

/// Identifies one run of the representation algorithm
///
/// Every run gets a generation that is larger than that of all previous runs. Completions
/// carry the generation of the run that caused them, which is how stale ones are detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunGeneration(u64);

impl RunGeneration {
    #[must_use]
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// What an `<object>` element currently shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepresentationMode {
    /// The representation algorithm has not decided yet
    #[default]
    Unresolved,

    /// The element's children are shown instead of the external resource
    Fallback,

    Image,

    /// The resource would be shown in a nested browsing context
    ///
    /// Nested browsing contexts are not supported, elements that would use one
    /// show their fallback content instead.
    NestedContext,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResourceState {
    /// No fetch was issued by the current run
    #[default]
    None,
    Pending,
    Succeeded,
    Failed,
}

/// The transitions of the representation algorithm that happen inside a task
#[derive(Debug)]
pub enum RepresentationStep {
    /// Start a new run, superseding the current one
    RunRepresentationSteps,

    FetchSettled {
        generation: RunGeneration,
        completion: LoadCompletion,
    },

    ImageSettled {
        generation: RunGeneration,
        outcome: DecodeOutcome,
    },

    FireLoadEvent { generation: RunGeneration },
}

/// What the layout of an `<object>` element is built from
#[derive(Clone, Debug)]
pub enum ObjectLayoutBox {
    /// The element's children
    FallbackContent,

    Image(Arc<DecodedImage>),
}

/// The work that the current run owns
///
/// There is never more than one of these per element. Starting a new run
/// replaces it and releases the previous occupant.
#[derive(Debug, Default)]
enum CurrentRun {
    #[default]
    Idle,
    Fetching(FetchHandle),
    RepresentingImage(ImageRepresentationAdapter),
}

impl CurrentRun {
    fn release(self) {
        match self {
            Self::Fetching(handle) => handle.cancel(),
            Self::RepresentingImage(adapter) => {
                if adapter.is_pending() {
                    log::debug!("Abandoning pending image decode");
                    adapter.cancel();
                }
            },
            Self::Idle => {},
        }
    }
}

/// <https://html.spec.whatwg.org/multipage/iframe-embed-object.html#the-object-element>
pub struct HtmlObjectElement {
    id: ElementId,

    /// <https://html.spec.whatwg.org/multipage/iframe-embed-object.html#attr-object-data>
    data: Option<String>,

    /// <https://html.spec.whatwg.org/multipage/iframe-embed-object.html#attr-object-type>
    declared_type: Option<String>,

    run_generation: RunGeneration,
    current_run: CurrentRun,
    representation: RepresentationMode,
    resource_state: ResourceState,
    needs_style_update: bool,
    event_target: EventTarget,
}

impl HtmlObjectElement {
    /// Creates an element that has not run the representation algorithm yet
    ///
    /// Use [BrowsingContext::create_object_element](crate::BrowsingContext::create_object_element)
    /// to get an element that does.
    #[must_use]
    pub(crate) fn new(id: ElementId, data: Option<String>, declared_type: Option<String>) -> Self {
        Self {
            id,
            data,
            declared_type,
            run_generation: RunGeneration::default(),
            current_run: CurrentRun::default(),
            representation: RepresentationMode::default(),
            resource_state: ResourceState::default(),
            needs_style_update: false,
            event_target: EventTarget::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case(DATA_ATTRIBUTE) {
            self.data.as_deref()
        } else if name.eq_ignore_ascii_case(TYPE_ATTRIBUTE) {
            self.declared_type.as_deref()
        } else {
            None
        }
    }

    /// Sets or removes (`value` is `None`) an attribute
    ///
    /// Changing the `data` attribute queues a new run of the representation algorithm.
    /// Setting it to the value it already has does nothing.
    pub(crate) fn set_attribute(&mut self, name: &str, value: Option<String>, document: &Document) {
        if name.eq_ignore_ascii_case(DATA_ATTRIBUTE) {
            if self.data == value {
                log::trace!("data attribute of {:?} did not change", self.id);
                return;
            }

            self.data = value;
            self.queue_representation_steps(document);
        } else if name.eq_ignore_ascii_case(TYPE_ATTRIBUTE) {
            // Only takes effect during the next run
            self.declared_type = value;
        } else {
            log::trace!("Ignoring unknown <object> attribute {name:?}");
        }
    }

    /// <https://html.spec.whatwg.org/multipage/iframe-embed-object.html#dom-object-data>
    ///
    /// The `data` attribute, resolved relative to the document.
    #[must_use]
    pub fn data(&self, document: &Document) -> String {
        let Some(data) = &self.data else {
            return String::new();
        };

        match document.parse_url(data) {
            Ok(url) => url.to_string(),
            Err(_) => data.clone(),
        }
    }

    /// <https://html.spec.whatwg.org/multipage/iframe-embed-object.html#dom-object-type>
    #[must_use]
    pub fn type_(&self) -> &str {
        self.declared_type.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn representation_mode(&self) -> RepresentationMode {
        self.representation
    }

    #[must_use]
    pub fn resource_state(&self) -> ResourceState {
        self.resource_state
    }

    #[must_use]
    pub fn run_generation(&self) -> RunGeneration {
        self.run_generation
    }

    /// The decoded image, if the element is represented by one
    #[must_use]
    pub fn image(&self) -> Option<&Arc<DecodedImage>> {
        match &self.current_run {
            CurrentRun::RepresentingImage(adapter) => adapter.image(),
            _ => None,
        }
    }

    /// Returns `None` while there is nothing to lay out
    #[must_use]
    pub fn layout_box(&self) -> Option<ObjectLayoutBox> {
        match self.representation {
            RepresentationMode::Fallback => Some(ObjectLayoutBox::FallbackContent),
            RepresentationMode::Image => self.image().cloned().map(ObjectLayoutBox::Image),
            RepresentationMode::Unresolved | RepresentationMode::NestedContext => None,
        }
    }

    #[must_use]
    pub fn needs_style_update(&self) -> bool {
        self.needs_style_update
    }

    /// Clears the style flag, returning whether it was set
    pub fn take_needs_style_update(&mut self) -> bool {
        mem::take(&mut self.needs_style_update)
    }

    /// Whether the current run has reached its final representation
    #[must_use]
    pub fn is_settled(&self) -> bool {
        match &self.current_run {
            CurrentRun::Idle => self.representation != RepresentationMode::Unresolved,
            CurrentRun::Fetching(_) => false,
            CurrentRun::RepresentingImage(adapter) => !adapter.is_pending(),
        }
    }

    pub fn add_event_listener(&mut self, event_type: EventType, listener: EventListener) {
        self.event_target.add_event_listener(event_type, listener);
    }

    pub(crate) fn queue_representation_steps(&self, document: &Document) {
        document.task_queue().queue_task(
            TaskSource::DomManipulation,
            self.id,
            RepresentationStep::RunRepresentationSteps,
        );
    }

    /// Applies a step that was queued for this element
    pub(crate) fn run_step(&mut self, step: RepresentationStep, document: &mut Document) {
        match step {
            RepresentationStep::RunRepresentationSteps => self.start_run(document),
            RepresentationStep::FetchSettled {
                generation,
                completion,
            } => self.on_fetch_settled(generation, completion, document),
            RepresentationStep::ImageSettled {
                generation,
                outcome,
            } => self.on_image_settled(generation, outcome, document),
            RepresentationStep::FireLoadEvent { generation } => {
                if self.is_stale(generation, "load event") {
                    return;
                }
                self.fire_event(EventType::Load);
            },
        }
    }

    /// Stops all work of the current run, without starting a new one
    ///
    /// Completions that are still in flight become stale.
    pub(crate) fn abandon(&mut self) {
        self.run_generation = self.run_generation.next();
        mem::take(&mut self.current_run).release();
    }

    /// <https://html.spec.whatwg.org/multipage/iframe-embed-object.html#the-object-element:queue-an-element-task>
    fn start_run(&mut self, document: &mut Document) {
        self.abandon();
        self.resource_state = ResourceState::None;

        if self.representation != RepresentationMode::Unresolved {
            self.representation = RepresentationMode::Unresolved;
            self.invalidate(document);
        }

        log::debug!(
            "Running representation steps for {:?} ({:?})",
            self.id,
            self.run_generation
        );

        let Some(data) = self.data.as_deref().filter(|data| !data.is_empty()) else {
            self.enter_fallback(document);
            return;
        };

        let url = match document.parse_url(data) {
            Ok(url) => url,
            Err(error) => {
                log::error!("Failed to load <object> content: {data:?} is not a valid url ({error})");
                self.fire_event(EventType::Error);
                self.enter_fallback(document);
                return;
            },
        };

        let task_queue = document.task_queue().clone();
        let target = self.id;
        let generation = self.run_generation;
        let handle = document.fetcher().fetch(
            url,
            Box::new(move |completion| {
                task_queue.queue_task(
                    TaskSource::Networking,
                    target,
                    RepresentationStep::FetchSettled {
                        generation,
                        completion,
                    },
                );
            }),
        );

        self.current_run = CurrentRun::Fetching(handle);
        self.resource_state = ResourceState::Pending;
    }

    fn on_fetch_settled(
        &mut self,
        generation: RunGeneration,
        completion: LoadCompletion,
        document: &mut Document,
    ) {
        if self.is_stale(generation, "fetch completion") {
            return;
        }

        let CurrentRun::Fetching(handle) = &mut self.current_run else {
            log::debug!("{:?} received a fetch completion without a fetch", self.id);
            return;
        };

        if let Err(error) = handle.settle(completion) {
            log::error!("Failed to load <object> content: {} ({error})", handle.url());
            self.resource_state = ResourceState::Failed;
            self.fire_event(EventType::Error);
            self.enter_fallback(document);
            return;
        }

        self.resource_state = ResourceState::Succeeded;
        self.resolve_type(document);
    }

    fn resolve_type(&mut self, document: &mut Document) {
        let CurrentRun::Fetching(handle) = &self.current_run else {
            return;
        };

        let Some(resource) = handle.resource() else {
            self.enter_fallback(document);
            return;
        };

        let resource_type = determine_resource_type(
            self.declared_type.as_deref(),
            resource.headers(),
            &resource.computed_mime_type().essence(),
            document.settings().obey_content_type,
        );
        log::debug!("Resource type of {} is {resource_type}", handle.url());

        match resource_type.handler(document.settings().images_enabled) {
            ResourceHandler::Image => self.begin_image_representation(document),
            ResourceHandler::NestedBrowsingContext => {
                log::warn!(
                    "Cannot display {resource_type} in <object>: nested browsing contexts are not supported"
                );
                self.enter_fallback(document);
            },
            ResourceHandler::Fallback => self.enter_fallback(document),
        }
    }

    fn begin_image_representation(&mut self, document: &mut Document) {
        let CurrentRun::Fetching(mut handle) = mem::take(&mut self.current_run) else {
            self.enter_fallback(document);
            return;
        };

        let Some(resource) = handle
            .take_resource()
            .filter(|resource| resource.has_encoded_data())
        else {
            log::warn!("{} contains no image data", handle.url());
            self.enter_fallback(document);
            return;
        };

        let task_queue = document.task_queue().clone();
        let target = self.id;
        let generation = self.run_generation;
        let adapter = ImageRepresentationAdapter::create(
            resource,
            document.image_decoder(),
            Box::new(move |outcome| {
                task_queue.queue_task(
                    TaskSource::Networking,
                    target,
                    RepresentationStep::ImageSettled {
                        generation,
                        outcome,
                    },
                );
            }),
        );

        self.current_run = CurrentRun::RepresentingImage(adapter);
    }

    fn on_image_settled(
        &mut self,
        generation: RunGeneration,
        outcome: DecodeOutcome,
        document: &mut Document,
    ) {
        if self.is_stale(generation, "decode outcome") {
            return;
        }

        let CurrentRun::RepresentingImage(adapter) = &mut self.current_run else {
            log::debug!("{:?} received a decode outcome without an image", self.id);
            return;
        };

        match adapter.settle(outcome) {
            Ok(()) => self.on_image_ready(document),
            Err(error) => {
                log::error!("Failed to load <object> content: {error}");
                self.enter_fallback(document);
            },
        }
    }

    fn on_image_ready(&mut self, document: &mut Document) {
        self.representation = RepresentationMode::Image;
        self.invalidate(document);

        // Listeners should only run once the element is in a stable state
        document.task_queue().queue_task(
            TaskSource::DomManipulation,
            self.id,
            RepresentationStep::FireLoadEvent {
                generation: self.run_generation,
            },
        );
    }

    fn enter_fallback(&mut self, document: &mut Document) {
        mem::take(&mut self.current_run).release();
        self.representation = RepresentationMode::Fallback;
        self.invalidate(document);
    }

    fn invalidate(&mut self, document: &mut Document) {
        self.needs_style_update = true;
        document.set_needs_layout();
    }

    fn fire_event(&mut self, event_type: EventType) {
        self.event_target
            .dispatch_event(&Event::new(event_type, self.id));
    }

    fn is_stale(&self, generation: RunGeneration, what: &str) -> bool {
        let is_stale = generation != self.run_generation;
        if is_stale {
            log::debug!(
                "Discarding stale {what} for {:?} ({generation:?}, current is {:?})",
                self.id,
                self.run_generation
            );
        }
        is_stale
    }
}

impl fmt::Debug for HtmlObjectElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlObjectElement")
            .field("id", &self.id)
            .field("data", &self.data)
            .field("type", &self.declared_type)
            .field("run_generation", &self.run_generation)
            .field("representation", &self.representation)
            .field("resource_state", &self.resource_state)
            .finish_non_exhaustive()
    }
}
