// src/http/transport.rs
// =============================================================================
// The one place that talks to the network.
//
// Everything else builds an HttpRequest and hands it to an HttpTransport.
// The real transport wraps a single reqwest::Client (connection pooling,
// optional proxy). Unit tests swap in MockTransport, which answers from an
// in-memory table and records every request it saw.
//
// The transport never looks at status codes: a 404 is a perfectly good
// response at this layer. Only "no response at all" becomes an error.
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, Proxy};

use crate::config::ScraperConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
        }
    }
}

/// Header name/value pairs; lookups ignore ASCII case
pub type HttpHeaders = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HttpHeaders,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Head,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// First header value matching `name`, compared case-insensitively
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Transport boundary for all HTTP I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// The real transport, backed by one shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the client, routing through `config.proxy` and applying
    /// `config.timeout` when set.
    ///
    /// reqwest is compiled without its `gzip` feature, so bodies arrive
    /// exactly as the server sent them; see `http::fetch` for decoding.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(proxy) = &config.proxy {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("invalid proxy {}: {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }

        // Covers connect through the end of the body; an expiry surfaces as
        // Error::Network like any other transport failure
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("could not build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Head => self.client.head(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let network_error = |e: reqwest::Error| Error::Network {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let response = builder.send().await.map_err(network_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(network_error)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
pub use mock::MockTransport;

#[cfg(test)]
mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    /// In-memory transport: method + URL -> FIFO queue of canned outcomes.
    ///
    /// An unregistered route answers with a Network error, which is also
    /// how tests simulate a dropped connection.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        inner: Arc<Mutex<Inner>>,
    }

    #[derive(Default)]
    struct Inner {
        routes: HashMap<(HttpMethod, String), VecDeque<HttpResponse>>,
        requests: Vec<HttpRequest>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_response(&self, method: HttpMethod, url: &str, response: HttpResponse) {
            let mut inner = self.inner.lock().expect("mock transport lock poisoned");
            inner
                .routes
                .entry((method, url.to_string()))
                .or_default()
                .push_back(response);
        }

        /// Shorthand for a response with a body and optional headers
        pub fn respond(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
            self.push_response(
                method,
                url,
                HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: body.as_bytes().to_vec(),
                },
            );
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.inner
                .lock()
                .expect("mock transport lock poisoned")
                .requests
                .clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            let mut inner = self.inner.lock().expect("mock transport lock poisoned");
            let key = (request.method, request.url.clone());
            inner.requests.push(request);

            match inner.routes.get_mut(&key).and_then(|q| q.pop_front()) {
                Some(response) => Ok(response),
                None => Err(Error::Network {
                    url: key.1,
                    message: format!("no mock response registered for {}", key.0.as_str()),
                }),
            }
        }
    }
}
