//! Request envelope and body payload variants.
//!
//! A [`RequestBody`] is the immutable, fully-resolved description of one
//! HTTP request: method, resolved target URL, headers, query parameters,
//! timeout and payload. It is frozen by the builder at `build()` and owned
//! by the handle until the request completes. The payload is a closed
//! tagged union resolved once at build time, not re-checked per attempt.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, multipart};
use tokio_util::io::ReaderStream;
use url::Url;

use crate::error::{Error, Result};
use crate::form_data::{FormData, FormDataList};

/// Byte source for one multipart file part.
///
/// File sources are opened lazily, once per attempt, so a retried request
/// re-streams from the start and every opened handle is closed exactly once
/// when the attempt's request future is dropped. Caller-supplied readers are
/// drained into a `Bytes` source at builder time for the same reason.
#[derive(Debug, Clone)]
pub enum StreamSource {
    /// A file on disk, streamed without whole-payload buffering.
    File(PathBuf),
    /// An in-memory byte buffer.
    Bytes(Vec<u8>),
}

/// One file part of a multipart payload.
#[derive(Debug, Clone)]
pub struct StreamPart {
    /// Part name.
    pub key: String,
    /// File name reported to the server.
    pub file_name: String,
    /// Byte source.
    pub source: StreamSource,
}

/// Closed set of body payload shapes sharing the common envelope.
#[derive(Debug, Clone)]
pub enum BodyPayload {
    /// Raw JSON document sent verbatim with
    /// `application/json; charset=utf-8`. Empty text means "no body"
    /// (the GET/DELETE case).
    Json {
        /// JSON document text.
        text: String,
    },
    /// Urlencoded key/value fields, `application/x-www-form-urlencoded`.
    Form {
        /// Form fields in insertion order.
        fields: Vec<FormData>,
    },
    /// Multipart form: text parts from `fields`, file parts from `streams`.
    Multipart {
        /// Plain-text parts named by key.
        fields: Vec<FormData>,
        /// File parts.
        streams: Vec<StreamPart>,
    },
}

impl BodyPayload {
    /// Short name of the content format, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            BodyPayload::Json { .. } => "json",
            BodyPayload::Form { .. } => "form",
            BodyPayload::Multipart { .. } => "multipart",
        }
    }

    /// Returns `true` when the payload carries nothing to send.
    pub fn is_empty(&self) -> bool {
        match self {
            BodyPayload::Json { text } => text.trim().is_empty(),
            BodyPayload::Form { fields } => fields.is_empty(),
            BodyPayload::Multipart { fields, streams } => fields.is_empty() && streams.is_empty(),
        }
    }
}

/// The immutable, fully-resolved description of one HTTP request.
#[derive(Debug, Clone)]
pub struct RequestBody {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) timeout: Duration,
    pub(crate) headers: FormDataList,
    pub(crate) params: FormDataList,
    pub(crate) payload: BodyPayload,
}

impl RequestBody {
    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Fully resolved target URL, query parameters included.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Effective per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Headers transmitted with the request, deduplicated by key.
    pub fn headers(&self) -> &FormDataList {
        &self.headers
    }

    /// Query parameters (already folded into [`Self::url`]).
    pub fn params(&self) -> &FormDataList {
        &self.params
    }

    /// Body payload variant.
    pub fn payload(&self) -> &BodyPayload {
        &self.payload
    }

    /// The target URL with any query string elided, for log lines.
    pub fn short_url(&self) -> String {
        let text = self.url.as_str();
        match text.split_once('?') {
            Some((base, _)) => format!("{base}?..."),
            None => text.to_string(),
        }
    }

    /// Builds the per-attempt reqwest request from the envelope.
    ///
    /// Called once per retry attempt: file-backed multipart parts are
    /// reopened so the stream starts from the beginning each time.
    pub(crate) fn to_request(&self, client: &Client) -> Result<reqwest::RequestBuilder> {
        let mut request = client
            .request(self.method.clone(), self.url.clone())
            .timeout(self.timeout)
            .headers(self.header_map()?);

        request = match &self.payload {
            BodyPayload::Json { text } => {
                if text.trim().is_empty() {
                    request
                } else {
                    request
                        .header(CONTENT_TYPE, "application/json; charset=utf-8")
                        .body(text.clone())
                }
            }
            BodyPayload::Form { fields } => {
                let pairs: Vec<(&str, &str)> =
                    fields.iter().map(|f| (f.key(), f.value())).collect();
                request.form(&pairs)
            }
            BodyPayload::Multipart { fields, streams } => {
                let mut form = multipart::Form::new();
                for field in fields {
                    form = form.text(field.key().to_string(), field.value().to_string());
                }
                for stream in streams {
                    form = form.part(stream.key.clone(), Self::file_part(stream)?);
                }
                request.multipart(form)
            }
        };

        Ok(request)
    }

    fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for header in &self.headers {
            let name = HeaderName::try_from(header.key())
                .map_err(|e| Error::validation(format!("invalid header key `{}`: {e}", header.key())))?;
            let value = HeaderValue::try_from(header.value())
                .map_err(|e| Error::validation(format!("invalid header value for `{}`: {e}", header.key())))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    fn file_part(stream: &StreamPart) -> Result<multipart::Part> {
        let part = match &stream.source {
            StreamSource::File(path) => {
                let file = std::fs::File::open(path).map_err(|e| {
                    Error::validation(format!(
                        "cannot open multipart source `{}`: {e}",
                        path.display()
                    ))
                })?;
                let reader = ReaderStream::new(tokio::fs::File::from_std(file));
                multipart::Part::stream(reqwest::Body::wrap_stream(reader))
            }
            StreamSource::Bytes(bytes) => multipart::Part::bytes(bytes.clone()),
        };
        Ok(part.file_name(stream.file_name.clone()))
    }

    /// Header table rendered for log lines.
    pub fn header_text(&self) -> String {
        let mut text = String::new();
        for header in &self.headers {
            text.push_str(&format!(">>> {} : {}\n", header.key(), header.value()));
        }
        text.trim_end_matches('\n').to_string()
    }

    /// Body content rendered for log lines.
    pub fn body_text(&self) -> String {
        match &self.payload {
            BodyPayload::Json { text } => text.clone(),
            BodyPayload::Form { fields } => {
                let mut text = String::new();
                for field in fields {
                    text.push_str(&format!(">>> {} : {}\n", field.key(), field.value()));
                }
                text.trim_end_matches('\n').to_string()
            }
            BodyPayload::Multipart { fields, streams } => {
                let mut text = String::new();
                for field in fields {
                    text.push_str(&format!(">>> {} : {}\n", field.key(), field.value()));
                }
                for stream in streams {
                    text.push_str(&format!(">>> {} : {}\n", stream.key, stream.file_name));
                }
                text.trim_end_matches('\n').to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(url: &str) -> RequestBody {
        RequestBody {
            method: Method::GET,
            url: Url::parse(url).unwrap(),
            timeout: Duration::from_millis(3000),
            headers: FormDataList::new(),
            params: FormDataList::new(),
            payload: BodyPayload::Json {
                text: String::new(),
            },
        }
    }

    #[test]
    fn test_short_url_elides_query() {
        let body = envelope("https://api.example.com/users?id=42&full=true");
        assert_eq!(body.short_url(), "https://api.example.com/users?...");

        let body = envelope("https://api.example.com/users");
        assert_eq!(body.short_url(), "https://api.example.com/users");
    }

    #[test]
    fn test_payload_kind_and_emptiness() {
        let json = BodyPayload::Json {
            text: "  ".to_string(),
        };
        assert_eq!(json.kind(), "json");
        assert!(json.is_empty());

        let form = BodyPayload::Form {
            fields: vec![FormData::new("a", "1")],
        };
        assert_eq!(form.kind(), "form");
        assert!(!form.is_empty());

        let multipart = BodyPayload::Multipart {
            fields: Vec::new(),
            streams: Vec::new(),
        };
        assert_eq!(multipart.kind(), "multipart");
        assert!(multipart.is_empty());
    }

    #[test]
    fn test_header_text_rendering() {
        let mut headers = FormDataList::new();
        headers.upsert("Accept", "application/json");
        headers.upsert("X-Token", "abc");
        let mut body = envelope("https://api.example.com");
        body.headers = headers;

        let text = body.header_text();
        assert!(text.contains(">>> Accept : application/json"));
        assert!(text.ends_with(">>> X-Token : abc"));
    }

    #[test]
    fn test_invalid_header_key_is_a_validation_error() {
        let mut headers = FormDataList::new();
        headers.upsert("bad key\n", "value");
        let mut body = envelope("https://api.example.com");
        body.headers = headers;

        assert!(matches!(body.header_map(), Err(Error::Validation(_))));
    }
}
