use std::{fs, io};

use base64::Engine;
use error_derive::Error;
use http::{Header, Headers, StatusCode};
use settings::Settings;
use url::Url;

/// The media type of a `data:` URL that doesn't specify one
///
/// <https://fetch.spec.whatwg.org/#data-url-processor>
const DEFAULT_DATA_URL_MIME_TYPE: &str = "text/plain;charset=US-ASCII";

/// The bytes of a fetched resource along with everything that is known about their type
#[derive(Clone, Debug)]
pub struct Resource {
    data: Vec<u8>,
    mime_metadata: mime::Metadata,
    protocol_specific_data: ProtocolSpecificData,
}

#[derive(Clone, Debug)]
enum ProtocolSpecificData {
    /// Response headers, either received over the network or synthesized
    /// from a `data:` URL
    Headers(Headers),

    /// The protocol did not supply us with additional relevant information
    None,
}

#[derive(Debug, Error)]
pub enum ResourceLoadError {
    #[msg = "http request failed"]
    Http(ureq::Error),

    #[msg = "server responded with an error status"]
    #[plain]
    HttpStatus(StatusCode),

    #[msg = "response is larger than the configured limit"]
    #[plain]
    ResponseTooLarge(u64),

    #[msg = "invalid base64"]
    Base64(base64::DecodeError),

    #[msg = "unsupported url scheme"]
    #[plain]
    UnsupportedScheme(String),

    #[msg = "invalid file path"]
    InvalidFilePath,

    #[msg = "invalid data url"]
    InvalidDataURL,

    #[msg = "io error"]
    IO(io::Error),

    #[msg = "resource loader disconnected"]
    LoaderDisconnected,
}

impl Resource {
    /// Creates a resource that was transferred with headers
    ///
    /// The computed MIME type respects both `Content-Type` and `X-Content-Type-Options`.
    #[must_use]
    pub fn with_headers(data: Vec<u8>, headers: Headers) -> Self {
        let no_sniff = match headers.get(&Header::X_CONTENT_TYPE_OPTIONS) {
            Some(value) if value.trim().eq_ignore_ascii_case("nosniff") => mime::NoSniff::Yes,
            _ => mime::NoSniff::No,
        };
        let mime_metadata =
            mime::Metadata::for_content_type(headers.get(&Header::CONTENT_TYPE), no_sniff, &data);

        Self {
            data,
            mime_metadata,
            protocol_specific_data: ProtocolSpecificData::Headers(headers),
        }
    }

    /// Creates a resource without any headers, such as a local file
    #[must_use]
    pub fn new(data: Vec<u8>, mimetype_hint: Option<mime::MIMEType>) -> Self {
        let mime_metadata =
            mime::Metadata::with_supplied_mime_type(mimetype_hint, mime::NoSniff::No, &data);

        Self {
            data,
            mime_metadata,
            protocol_specific_data: ProtocolSpecificData::None,
        }
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether there are any bytes that a decoder could look at
    #[must_use]
    pub fn has_encoded_data(&self) -> bool {
        !self.data.is_empty()
    }

    #[must_use]
    pub fn mime_metadata(&self) -> &mime::Metadata {
        &self.mime_metadata
    }

    /// The type of the resource after taking its contents into account
    #[must_use]
    pub fn computed_mime_type(&self) -> &mime::MIMEType {
        &self.mime_metadata.computed_mime_type
    }

    /// Return the headers associated with this response, or `None`
    /// if the [Resource] was not transferred with any.
    #[must_use]
    pub fn headers(&self) -> Option<&Headers> {
        match &self.protocol_specific_data {
            ProtocolSpecificData::Headers(headers) => Some(headers),
            ProtocolSpecificData::None => None,
        }
    }

    /// The raw value of the `Content-Type` header, if there is one
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers()?.get(&Header::CONTENT_TYPE)
    }

    /// Loads the resource at `url`, blocking the current thread until it is done
    pub fn load(url: &Url, settings: &Settings) -> Result<Self, ResourceLoadError> {
        log::info!("Starting load of {}", without_fragment(url));

        let resource = match url.scheme() {
            "http" | "https" => load_over_http(url, settings)?,
            "file" => {
                let Ok(path) = url.to_file_path() else {
                    log::error!(
                        "Failed to load {}: Invalid file path for current platform",
                        without_fragment(url)
                    );
                    return Err(ResourceLoadError::InvalidFilePath);
                };

                Self::new(fs::read(path)?, None)
            },
            "data" => load_data_url(url)?,
            other => {
                log::error!(
                    "Failed to load unknown url scheme: {other} from {}",
                    without_fragment(url)
                );
                return Err(ResourceLoadError::UnsupportedScheme(other.to_string()));
            },
        };

        log::info!(
            "Successfully loaded {} ({} bytes, {})",
            without_fragment(url),
            resource.data.len(),
            resource.computed_mime_type()
        );

        Ok(resource)
    }
}

fn without_fragment(url: &Url) -> &str {
    let serialized = url.as_str();
    serialized
        .split_once('#')
        .map_or(serialized, |(before_fragment, _)| before_fragment)
}

fn load_over_http(url: &Url, settings: &Settings) -> Result<Resource, ResourceLoadError> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(settings.timeout))
        .http_status_as_error(false)
        .build()
        .into();

    let mut response = agent
        .get(url.as_str())
        .header(Header::USER_AGENT.as_str(), &settings.user_agent)
        .call()?;

    let status = StatusCode::new(response.status().as_u16());
    if !status.is_ok() {
        log::warn!("{} responded with status {status}", without_fragment(url));
        return Err(ResourceLoadError::HttpStatus(status));
    }

    let headers: Headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?.to_string())))
        .collect();

    // Refuse oversized bodies up front instead of reading until the limit trips
    let announced_length = headers
        .get(&Header::CONTENT_LENGTH)
        .and_then(|length| length.trim().parse::<u64>().ok());
    if let Some(length) = announced_length.filter(|&length| length > settings.max_response_size) {
        log::warn!(
            "{} announced {length} bytes, more than the allowed {}",
            without_fragment(url),
            settings.max_response_size
        );
        return Err(ResourceLoadError::ResponseTooLarge(length));
    }

    let data = response
        .body_mut()
        .with_config()
        .limit(settings.max_response_size)
        .read_to_vec()?;

    Ok(Resource::with_headers(data, headers))
}

/// <https://fetch.spec.whatwg.org/#data-url-processor>
///
/// The media type is passed on as a `Content-Type` header, just like a
/// network response would carry it.
fn load_data_url(url: &Url) -> Result<Resource, ResourceLoadError> {
    let Some(input) = without_fragment(url).strip_prefix("data:") else {
        return Err(ResourceLoadError::InvalidDataURL);
    };

    let (mime_type, body) = input
        .split_once(',')
        .ok_or(ResourceLoadError::InvalidDataURL)?;
    let mime_type = mime_type.trim();

    let (mime_type, is_base64) = match mime_type.rsplit_once(';') {
        Some((before, parameter)) if parameter.trim().eq_ignore_ascii_case("base64") => {
            (before.trim(), true)
        },
        _ => (mime_type, false),
    };

    let body = percent_decode(body.as_bytes());
    let data = if is_base64 {
        let without_whitespace: Vec<u8> = body
            .into_iter()
            .filter(|byte| !byte.is_ascii_whitespace())
            .collect();
        base64::engine::general_purpose::STANDARD.decode(without_whitespace)?
    } else {
        body
    };

    // A media type that doesn't parse falls back to the default
    let content_type = match mime_type.parse::<mime::MIMEType>() {
        Ok(_) => mime_type,
        Err(_) => DEFAULT_DATA_URL_MIME_TYPE,
    };

    let mut headers = Headers::with_capacity(1);
    headers.set(Header::CONTENT_TYPE, content_type);

    Ok(Resource::with_headers(data, headers))
}

/// <https://url.spec.whatwg.org/#percent-decode>
fn percent_decode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut index = 0;

    while index < input.len() {
        let byte = input[index];
        let escaped = (byte == b'%')
            .then(|| input.get(index + 1..index + 3))
            .flatten()
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());

        match escaped {
            Some(decoded) => {
                output.push(decoded);
                index += 3;
            },
            None => {
                output.push(byte);
                index += 1;
            },
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(url: &str) -> Result<Resource, ResourceLoadError> {
        Resource::load(&Url::parse(url).unwrap(), &Settings::default())
    }

    #[test]
    fn data_url_with_media_type() {
        let resource = load("data:image/gif;base64,R0lGODlhAQABAAAAACw=").unwrap();

        assert_eq!(resource.content_type(), Some("image/gif"));
        assert!(resource.data().starts_with(b"GIF89a"));
        assert_eq!(resource.computed_mime_type().essence(), "image/gif");
    }

    #[test]
    fn data_url_without_media_type() {
        let resource = load("data:,hello%20world").unwrap();

        assert_eq!(resource.data(), b"hello world");
        assert_eq!(resource.content_type(), Some(DEFAULT_DATA_URL_MIME_TYPE));
    }

    #[test]
    fn data_url_with_empty_body() {
        let resource = load("data:application/octet-stream,").unwrap();

        assert!(!resource.has_encoded_data());
        assert_eq!(resource.content_type(), Some("application/octet-stream"));
    }

    #[test]
    fn invalid_data_urls() {
        assert!(matches!(
            load("data:image/png;base64"),
            Err(ResourceLoadError::InvalidDataURL)
        ));
        assert!(matches!(
            load("data:image/png;base64,!!!!"),
            Err(ResourceLoadError::Base64(_))
        ));
    }

    #[test]
    fn unsupported_scheme() {
        let error = load("gopher://example.com/").unwrap_err();
        assert!(matches!(&error, ResourceLoadError::UnsupportedScheme(scheme) if scheme == "gopher"));
        assert_eq!(error.to_string(), "unsupported url scheme (gopher)");
    }

    #[test]
    fn local_file_has_no_headers() {
        let path = std::env::temp_dir().join("resourceloader-local-file-test.txt");
        fs::write(&path, b"just some text").unwrap();

        let url = Url::from_file_path(&path).unwrap();
        let resource = Resource::load(&url, &Settings::default()).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(resource.headers().is_none());
        assert_eq!(resource.computed_mime_type().essence(), "text/plain");
    }

    #[test]
    fn missing_file() {
        let path = std::env::temp_dir().join("resourceloader-this-file-does-not-exist");
        let url = Url::from_file_path(path).unwrap();

        assert!(matches!(
            Resource::load(&url, &Settings::default()),
            Err(ResourceLoadError::IO(_))
        ));
    }

    #[test]
    fn nosniff_keeps_supplied_type() {
        let gif = b"GIF89a\x01\x00\x01\x00".to_vec();

        let sniffed: Headers = [("Content-Type", "application/unknown")]
            .into_iter()
            .collect();
        let resource = Resource::with_headers(gif.clone(), sniffed);
        assert_eq!(resource.computed_mime_type().essence(), "image/gif");

        let not_sniffed: Headers = [
            ("Content-Type", "application/unknown"),
            ("X-Content-Type-Options", " NoSniff "),
        ]
        .into_iter()
        .collect();
        let resource = Resource::with_headers(gif, not_sniffed);
        assert_eq!(resource.computed_mime_type().essence(), "application/unknown");
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode(b"a%20b"), b"a b");
        assert_eq!(percent_decode(b"100%"), b"100%");
        assert_eq!(percent_decode(b"%zz"), b"%zz");
    }
}
