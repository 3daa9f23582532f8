use std::time::Duration;

use url::Url;

use crate::Settings;

#[derive(clap::Parser, Debug)]
#[command(name = "embedview", version, about = "Resolve what an embedded-content element represents", long_about = None)]
pub struct Arguments {
    /// Value of the element's data attribute
    pub data: Option<String>,

    /// Value of the element's type attribute
    #[arg(long = "type")]
    pub declared_type: Option<String>,

    /// Document url that the data attribute is resolved against
    #[arg(long, value_parser = parse_url, value_hint = clap::ValueHint::Url)]
    base_url: Option<Url>,

    /// Never represent fetched resources as images
    #[clap(
        long,
        action = clap::ArgAction::SetTrue,
    )]
    disable_images: bool,

    /// Always trust the Content-Type of a response
    #[clap(
        long,
        action = clap::ArgAction::SetTrue,
    )]
    obey_content_type: bool,

    /// Network timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// How long to wait for the element to settle, in seconds
    #[arg(long, default_value_t = 60)]
    pub wait: u64,
}

impl Arguments {
    pub(crate) fn update_settings(&self, settings: &mut Settings) {
        if self.disable_images {
            settings.images_enabled = false;
        }

        if self.obey_content_type {
            settings.obey_content_type = true;
        }

        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }

        if let Some(timeout) = self.timeout {
            settings.timeout = Duration::from_secs(timeout);
        }
    }
}

fn parse_url(s: &str) -> Result<Url, String> {
    Url::parse(s).map_err(|e| format!("{e}"))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Arguments;
    use crate::Settings;

    #[test]
    fn flags_override_defaults() {
        let arguments = Arguments::parse_from([
            "embedview",
            "picture.png",
            "--type",
            "image/png",
            "--base-url",
            "https://example.com/gallery/",
            "--disable-images",
            "--timeout",
            "5",
        ]);

        let mut settings = Settings::default();
        arguments.update_settings(&mut settings);

        assert_eq!(arguments.data.as_deref(), Some("picture.png"));
        assert_eq!(arguments.declared_type.as_deref(), Some("image/png"));
        assert!(!settings.images_enabled);
        assert!(!settings.obey_content_type);
        assert_eq!(settings.base_url.as_str(), "https://example.com/gallery/");
        assert_eq!(settings.timeout.as_secs(), 5);
    }

    #[test]
    fn defaults_are_kept() {
        let arguments = Arguments::parse_from(["embedview"]);

        let mut settings = Settings::default();
        arguments.update_settings(&mut settings);

        assert!(arguments.data.is_none());
        assert!(settings.images_enabled);
        assert_eq!(settings.base_url.as_str(), "about:blank");
        assert_eq!(arguments.wait, 60);
    }
}
