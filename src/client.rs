//! Request client: the entry point application code talks to.

use std::sync::Arc;

use reqwest::{Client, Method};

use crate::builder::{NoBody, RequestBuilder};
use crate::error::{Error, Result};
use crate::settings::RequestSettings;
use crate::shutdown::AppLifetime;

/// Factory for request builders.
///
/// Holds the settings, one shared transport client and the process-lifetime
/// signal. Cheap to clone; concurrent handles share only the read-only
/// settings and reqwest's internal connection pool.
#[derive(Debug, Clone)]
pub struct RequestClient {
    settings: Arc<RequestSettings>,
    http: Client,
    lifetime: AppLifetime,
}

impl RequestClient {
    /// Creates a client with its own process-lifetime signal.
    ///
    /// The hosting application fires the signal through
    /// [`lifetime`](Self::lifetime) when it begins shutting down.
    pub fn new(settings: RequestSettings) -> Result<Self> {
        Self::with_lifetime(settings, AppLifetime::new())
    }

    /// Creates a client observing an externally owned lifetime signal.
    pub fn with_lifetime(settings: RequestSettings, lifetime: AppLifetime) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            settings: Arc::new(settings),
            http,
            lifetime,
        })
    }

    /// Read-only view of the settings.
    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }

    /// The process-lifetime signal this client observes.
    pub fn lifetime(&self) -> &AppLifetime {
        &self.lifetime
    }

    /// Starts a GET request builder.
    pub fn get(&self) -> RequestBuilder<NoBody> {
        self.start(Method::GET)
    }

    /// Starts a POST request builder.
    pub fn post(&self) -> RequestBuilder<NoBody> {
        self.start(Method::POST)
    }

    /// Starts a PUT request builder.
    pub fn put(&self) -> RequestBuilder<NoBody> {
        self.start(Method::PUT)
    }

    /// Starts a PATCH request builder.
    pub fn patch(&self) -> RequestBuilder<NoBody> {
        self.start(Method::PATCH)
    }

    /// Starts a DELETE request builder.
    pub fn delete(&self) -> RequestBuilder<NoBody> {
        self.start(Method::DELETE)
    }

    fn start(&self, method: Method) -> RequestBuilder<NoBody> {
        RequestBuilder::start(
            method,
            Arc::clone(&self.settings),
            self.http.clone(),
            self.lifetime.token(),
        )
    }
}
