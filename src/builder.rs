//! Fluent request builder.
//!
//! Accumulation is non-validating: call order is irrelevant except for
//! last-write-wins on duplicate keys and on the shared timeout field. Two
//! exceptions fail fast: an empty/whitespace URL and an unknown section
//! name are rejected at the call site, not deferred to `build()`.
//!
//! Body variants use typestate: `json_body()` / `form_body()` /
//! `multipart_body()` move the builder into a variant-specific stage, so
//! calling a content method for the wrong variant is a compile error.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::{Client, Method};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

use crate::body::{BodyPayload, RequestBody, StreamPart, StreamSource};
use crate::error::{Error, Result};
use crate::form_data::FormDataList;
use crate::handle::RequestHandle;
use crate::settings::{ApiSection, RequestSettings};

/// Section resolution mode.
#[derive(Debug, Clone)]
enum SectionMode {
    /// No preference stated; relative targets resolve against the settings
    /// default section when one is configured, absolute otherwise.
    Unset,
    /// Relative targets resolve against this section's base URL.
    Named(ApiSection),
    /// Absolute-URL mode was forced with `without_section()`.
    Absolute,
}

#[derive(Debug, Clone)]
struct BuilderCore {
    settings: Arc<RequestSettings>,
    http: Client,
    shutdown: CancellationToken,
    method: Method,
    target: Option<String>,
    section: SectionMode,
    timeout: Duration,
    headers: FormDataList,
    params: FormDataList,
}

/// Marker stage: no body variant selected yet.
#[derive(Debug, Default)]
pub struct NoBody;

/// JSON body stage.
#[derive(Debug, Default)]
pub struct JsonBody {
    text: String,
}

/// Urlencoded form body stage.
#[derive(Debug, Default)]
pub struct FormBody {
    fields: Vec<crate::form_data::FormData>,
}

/// Multipart body stage.
#[derive(Debug, Default)]
pub struct MultipartBody {
    fields: Vec<crate::form_data::FormData>,
    streams: Vec<StreamPart>,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::NoBody {}
    impl Sealed for super::JsonBody {}
    impl Sealed for super::FormBody {}
    impl Sealed for super::MultipartBody {}
}

/// Builder body stage. Sealed; implemented by [`NoBody`], [`JsonBody`],
/// [`FormBody`] and [`MultipartBody`].
pub trait BodyStage: sealed::Sealed {
    #[doc(hidden)]
    fn into_payload(self) -> BodyPayload;
}

impl BodyStage for NoBody {
    fn into_payload(self) -> BodyPayload {
        // A body-less request travels as an empty JSON payload; the encoder
        // attaches no body for empty text.
        BodyPayload::Json {
            text: String::new(),
        }
    }
}

impl BodyStage for JsonBody {
    fn into_payload(self) -> BodyPayload {
        BodyPayload::Json { text: self.text }
    }
}

impl BodyStage for FormBody {
    fn into_payload(self) -> BodyPayload {
        BodyPayload::Form {
            fields: self.fields,
        }
    }
}

impl BodyStage for MultipartBody {
    fn into_payload(self) -> BodyPayload {
        BodyPayload::Multipart {
            fields: self.fields,
            streams: self.streams,
        }
    }
}

/// Fluent request builder, parameterized by its body stage.
///
/// Produced by the method entry points on
/// [`RequestClient`](crate::client::RequestClient); consumed by
/// [`build`](Self::build), which yields exactly one single-use
/// [`RequestHandle`].
#[derive(Debug)]
pub struct RequestBuilder<B = NoBody> {
    core: BuilderCore,
    body: B,
}

impl RequestBuilder<NoBody> {
    pub(crate) fn start(
        method: Method,
        settings: Arc<RequestSettings>,
        http: Client,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            core: BuilderCore {
                settings,
                http,
                shutdown,
                method,
                target: None,
                section: SectionMode::Unset,
                timeout: Duration::ZERO,
                headers: FormDataList::new(),
                params: FormDataList::new(),
            },
            body: NoBody,
        }
    }

    /// Switches to a JSON body.
    pub fn json_body(self) -> RequestBuilder<JsonBody> {
        RequestBuilder {
            core: self.core,
            body: JsonBody::default(),
        }
    }

    /// Switches to an urlencoded form body.
    pub fn form_body(self) -> RequestBuilder<FormBody> {
        RequestBuilder {
            core: self.core,
            body: FormBody::default(),
        }
    }

    /// Switches to a multipart body.
    pub fn multipart_body(self) -> RequestBuilder<MultipartBody> {
        RequestBuilder {
            core: self.core,
            body: MultipartBody::default(),
        }
    }
}

impl<B> RequestBuilder<B> {
    /// Sets the target: an absolute URL, or a section-relative path when a
    /// section is selected.
    ///
    /// Empty or whitespace-only targets are rejected immediately.
    pub fn url(mut self, target: impl Into<String>) -> Result<Self> {
        let target = target.into();
        if target.trim().is_empty() {
            return Err(Error::validation("request url is empty"));
        }
        self.core.target = Some(target);
        Ok(self)
    }

    /// Resolves relative targets against the named API section's base URL
    /// and auto-fills the section's default headers.
    ///
    /// Unknown section names fail immediately. Mutually exclusive with
    /// [`without_section`](Self::without_section).
    pub fn section(mut self, name: &str) -> Result<Self> {
        if matches!(self.core.section, SectionMode::Absolute) {
            return Err(Error::validation(
                "section cannot be combined with without_section",
            ));
        }
        let section = self
            .core
            .settings
            .section(name)
            .cloned()
            .ok_or_else(|| Error::validation(format!("unknown api section `{name}`")))?;
        self.core.section = SectionMode::Named(section);
        Ok(self)
    }

    /// Forces absolute-URL mode: the target is used verbatim, the settings
    /// default section is ignored and no section headers are filled in.
    ///
    /// Mutually exclusive with [`section`](Self::section); fails immediately
    /// when a section is already selected, in either call order.
    pub fn without_section(mut self) -> Result<Self> {
        if matches!(self.core.section, SectionMode::Named(_)) {
            return Err(Error::validation(
                "without_section cannot be combined with section",
            ));
        }
        self.core.section = SectionMode::Absolute;
        Ok(self)
    }

    /// Adds a header. An empty key or value is a no-op (logged as a
    /// warning); a repeated key replaces the prior value.
    pub fn header(mut self, key: &str, value: &str) -> Self {
        if key.trim().is_empty() || value.trim().is_empty() {
            warn!(key, value, "empty header entry ignored");
            return self;
        }
        self.core.headers.upsert(key, value);
        self
    }

    /// Adds a query parameter. Same empty-entry and duplicate-key rules as
    /// [`header`](Self::header).
    pub fn param(mut self, key: &str, value: &str) -> Self {
        if key.trim().is_empty() || value.trim().is_empty() {
            warn!(key, value, "empty query parameter ignored");
            return self;
        }
        self.core.params.upsert(key, value);
        self
    }

    /// Overwrites the effective timeout. `Duration::ZERO` means "not set";
    /// the settings default is applied at build time.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.core.timeout = timeout;
        self
    }

    /// Sets the timeout to the settings-provided long-request value. A
    /// later [`timeout`](Self::timeout) call overwrites it; both write the
    /// same field, so order matters.
    pub fn long_request(mut self) -> Self {
        self.core.timeout = self.core.settings.long_request_timeout;
        self
    }
}

impl RequestBuilder<JsonBody> {
    /// Replaces the JSON body with a raw document.
    ///
    /// Empty text is a no-op. When `check_json_before_send` is on, invalid
    /// JSON is rejected here rather than surfacing as a server error later.
    pub fn content_json(mut self, json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(self);
        }
        if self.core.settings.check_json_before_send
            && serde_json::from_str::<serde_json::Value>(json).is_err()
        {
            return Err(Error::validation("json format is not correct"));
        }
        self.body.text = json.to_string();
        Ok(self)
    }

    /// Upserts one key into the JSON body.
    ///
    /// The first call with no prior body produces a single-key object;
    /// subsequent calls parse the existing document, overwrite only the
    /// matching key and re-serialize, preserving all other keys.
    pub fn content(mut self, key: &str, value: &str) -> Self {
        if key.trim().is_empty() || value.trim().is_empty() {
            warn!(key, value, "empty json content entry ignored");
            return self;
        }

        if self.body.text.trim().is_empty() {
            self.body.text = serde_json::json!({ key: value }).to_string();
            return self;
        }

        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&self.body.text) {
            Ok(mut map) => {
                map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
                self.body.text = serde_json::Value::Object(map).to_string();
            }
            Err(error) => {
                warn!(%error, "existing json body is not an object, content merge skipped");
            }
        }
        self
    }
}

impl RequestBuilder<FormBody> {
    /// Appends an urlencoded form field.
    pub fn content(mut self, key: &str, value: &str) -> Self {
        if key.trim().is_empty() || value.trim().is_empty() {
            warn!(key, value, "empty form field ignored");
            return self;
        }
        self.body
            .fields
            .push(crate::form_data::FormData::new(key, value));
        self
    }
}

impl RequestBuilder<MultipartBody> {
    /// Appends a plain-text part named by `key`.
    pub fn content(mut self, key: &str, value: &str) -> Self {
        if key.trim().is_empty() || value.trim().is_empty() {
            warn!(key, value, "empty multipart field ignored");
            return self;
        }
        self.body
            .fields
            .push(crate::form_data::FormData::new(key, value));
        self
    }

    /// Appends a file part streamed from `path`.
    ///
    /// The file must exist now; it is opened lazily, once per send attempt,
    /// so retries re-stream from the start.
    pub fn stream_file(
        mut self,
        key: &str,
        path: impl AsRef<Path>,
        file_name: &str,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::validation(format!(
                "multipart source file not found: {}",
                path.display()
            )));
        }
        self.body.streams.push(StreamPart {
            key: key.to_string(),
            file_name: file_name.to_string(),
            source: StreamSource::File(path.to_path_buf()),
        });
        Ok(self)
    }

    /// Appends a file part from an in-memory buffer.
    pub fn stream_bytes(mut self, key: &str, data: Vec<u8>, file_name: &str) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::validation("multipart source data is empty"));
        }
        self.body.streams.push(StreamPart {
            key: key.to_string(),
            file_name: file_name.to_string(),
            source: StreamSource::Bytes(data),
        });
        Ok(self)
    }

    /// Appends a file part drained from a caller-supplied reader.
    ///
    /// The reader is consumed here so the part can be re-sent on retry.
    pub fn stream_reader(
        self,
        key: &str,
        mut reader: impl Read,
        file_name: &str,
    ) -> Result<Self> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| Error::validation(format!("failed to read multipart source: {e}")))?;
        self.stream_bytes(key, data, file_name)
    }
}

impl<B: BodyStage> RequestBuilder<B> {
    /// Validates and freezes the request, producing exactly one single-use
    /// [`RequestHandle`].
    ///
    /// Resolution performed here, in order: section base URL + relative
    /// path (verbatim when the target already carries an http/https
    /// scheme), URL parse, force-https policy, query-parameter folding,
    /// default timeout, and the default-header merge (settings/section
    /// headers and the timestamp header land *under* caller-supplied
    /// headers, never overwriting explicit duplicates).
    pub fn build(self) -> Result<RequestHandle> {
        let Self { core, body } = self;
        let settings = Arc::clone(&core.settings);

        let target = core
            .target
            .ok_or_else(|| Error::validation("request url is not set"))?;

        // The explicitly named section wins; an unset mode falls back to
        // the settings default section; without_section() suppresses both.
        let section = match &core.section {
            SectionMode::Named(section) => Some(section),
            SectionMode::Unset => settings.fallback_section(),
            SectionMode::Absolute => None,
        };

        let resolved = match section {
            Some(section) if !has_scheme(&target) => format!(
                "{}/{}",
                section.base_url.trim_end_matches('/'),
                target.trim_start_matches('/')
            ),
            _ => target,
        };

        let mut url = Url::parse(&resolved)
            .map_err(|e| Error::validation(format!("invalid url `{resolved}`: {e}")))?;

        if settings.force_https_scheme && url.scheme() != "https" {
            return Err(Error::validation(format!(
                "url is not https scheme: {url}"
            )));
        }

        if !core.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for param in &core.params {
                pairs.append_pair(param.key(), param.value());
            }
        }

        let timeout = if core.timeout.is_zero() {
            settings.request_timeout
        } else {
            core.timeout
        };

        let mut headers = FormDataList::new();
        if settings.add_time_in_header {
            headers.upsert(settings.time_key.clone(), now_unix_millis().to_string());
        }
        let defaults = match section {
            Some(section) => &section.headers,
            None => &settings.default_headers,
        };
        for header in defaults {
            if !header.is_empty_entry() {
                headers.upsert(header.key(), header.value());
            }
        }
        // Explicit headers land last so they win over any default.
        for header in &core.headers {
            headers.upsert(header.key(), header.value());
        }

        let envelope = RequestBody {
            method: core.method,
            url,
            timeout,
            headers,
            params: core.params,
            payload: body.into_payload(),
        };

        Ok(RequestHandle::new(
            envelope,
            core.http,
            settings,
            core.shutdown,
        ))
    }
}

fn has_scheme(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

/// Current Unix epoch time in milliseconds, for the auto-injected
/// timestamp header.
fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
