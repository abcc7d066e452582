// src/http/mod.rs
// =============================================================================
// HTTP plumbing.
//
// Submodules:
// - transport: the HttpTransport trait, the reqwest-backed implementation
//   and (in tests) an in-memory mock
// - fetch: GET a page as text, with optional gzip/deflate negotiation
// =============================================================================

mod fetch;
mod transport;

pub use fetch::PageFetcher;
pub use transport::{
    header_get, HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    ReqwestTransport,
};

#[cfg(test)]
pub(crate) use transport::MockTransport;
