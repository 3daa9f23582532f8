//! Configuration for embedding external content
//!
//! Library users start from [Settings::default]. Binaries call [Settings::from_args], which
//! applies the command line on top of the defaults.

mod cli;

use std::time::Duration;

use clap::Parser;
use url::Url;

pub use cli::Arguments;

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Holds all the configurable information for loading and representing embedded content
#[derive(Clone, Debug)]
pub struct Settings {
    /// Whether fetched images may be represented at all
    ///
    /// When disabled, resources that resolve to an image type show their fallback content.
    pub images_enabled: bool,

    /// Take the `Content-Type` of a response at face value instead of second-guessing
    /// `application/octet-stream`
    pub obey_content_type: bool,

    /// The url that relative `data` attributes are resolved against
    pub base_url: Url,

    /// Upper bound for a single network request
    pub timeout: Duration,

    pub user_agent: String,

    /// Responses larger than this many bytes are treated as failed loads
    pub max_response_size: u64,

    /// Keep successfully loaded resources in memory and serve repeated requests from there
    pub cache_resources: bool,
}

impl Settings {
    /// Parses the process arguments and applies them to the default settings
    ///
    /// Exits the process with a usage message if the arguments are invalid.
    #[must_use]
    pub fn from_args() -> (Self, Arguments) {
        let arguments = Arguments::parse();
        let mut settings = Self::default();
        arguments.update_settings(&mut settings);
        (settings, arguments)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            images_enabled: true,
            obey_content_type: false,
            base_url: Url::parse("about:blank").expect("about:blank is a valid url"),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_response_size: 50 * 1024 * 1024,
            cache_resources: true,
        }
    }
}
