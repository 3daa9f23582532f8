use std::{cell::RefCell, process::ExitCode, rc::Rc, time::Duration};

use settings::Settings;
use web::{
    dom::{ObjectLayoutBox, RepresentationMode},
    event::EventType,
    BrowsingContext,
};

pub fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (settings, arguments) = Settings::from_args();
    let mut browsing_context = BrowsingContext::new(settings);

    let id = browsing_context.create_object_element(
        arguments.data.as_deref(),
        arguments.declared_type.as_deref(),
    );

    let events = Rc::new(RefCell::new(vec![]));
    let Some(element) = browsing_context.object_element_mut(id) else {
        log::error!("Element {id:?} disappeared right after it was created");
        return ExitCode::FAILURE;
    };
    for event_type in [EventType::Load, EventType::Error] {
        let events = events.clone();
        element.add_event_listener(
            event_type,
            Box::new(move |event| events.borrow_mut().push(event.event_type())),
        );
    }

    if !browsing_context.run_until_settled(Duration::from_secs(arguments.wait)) {
        log::error!(
            "<object> did not settle within {} seconds",
            arguments.wait
        );
        return ExitCode::FAILURE;
    }

    let Some(element) = browsing_context.object_element(id) else {
        return ExitCode::FAILURE;
    };

    println!("data: {}", element.data(browsing_context.document()));
    println!("type: {}", element.type_());

    match element.layout_box() {
        Some(ObjectLayoutBox::Image(image)) => {
            println!("representation: image ({}x{})", image.width(), image.height());
        },
        Some(ObjectLayoutBox::FallbackContent) => println!("representation: fallback content"),
        None => println!("representation: {:?}", element.representation_mode()),
    }

    for event in events.borrow().iter() {
        println!("event: {event}");
    }

    if element.representation_mode() == RepresentationMode::Image {
        ExitCode::SUCCESS
    } else {
        // Fallback content
        ExitCode::from(2)
    }
}
