// src/http/fetch.rs
// =============================================================================
// Fetches a page and turns the body into text.
//
// Two things happen between the raw bytes and the String we return:
// 1. Content decoding: if we asked for compression (use_compression), the
//    server may answer gzip or deflate. We undo that with flate2. The
//    Content-Encoding header decides, not what we asked for, so a server
//    that compresses unprompted still works.
// 2. Charset decoding: the bytes are decoded with the charset named in
//    Content-Type (encoding_rs), falling back to UTF-8.
//
// A non-2xx status is an Http error; nothing is retried.
// =============================================================================

use std::io::Read;
use std::sync::Arc;

use encoding_rs::{Encoding, UTF_8};
use flate2::read::{MultiGzDecoder, ZlibDecoder};
use tracing::debug;

use super::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{Error, Result};

const ACCEPT_COMPRESSED: &str = "gzip, deflate";

/// GETs pages as text over a shared transport.
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn HttpTransport>,
    use_compression: bool,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, use_compression: bool) -> Self {
        Self {
            transport,
            use_compression,
        }
    }

    /// GET `url` and return the decoded body text.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let mut request = HttpRequest::get(url);

        // Only advertise codings we can undo below
        if self.use_compression {
            request = request.header("Accept-Encoding", ACCEPT_COMPRESSED);
        }

        // A transport error here means no response at all (Error::Network)
        let response = self.transport.send(request).await?;
        debug!(
            url,
            status = response.status,
            bytes = response.body.len(),
            encoding = response.header("content-encoding").unwrap_or("identity"),
            "fetched page"
        );

        // Any status outside 2xx is reported as-is; the caller decides what
        // to do about it (nothing is retried here)
        if !response.is_success() {
            return Err(Error::Http {
                url: url.to_string(),
                status: response.status,
            });
        }

        decode_body(url, &response)
    }
}

/// Undo any content coding, then decode with the declared charset.
fn decode_body(url: &str, response: &HttpResponse) -> Result<String> {
    // The response header decides, whether or not we asked for compression
    let bytes = decompress(url, response.header("content-encoding"), &response.body)?;

    // Unknown or missing charset labels fall back to UTF-8
    let encoding = response
        .header("content-type")
        .and_then(charset_of)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    // decode() handles a BOM and replaces malformed sequences
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        debug!(url, charset = encoding.name(), "body contained malformed sequences");
    }
    Ok(text.into_owned())
}

fn decompress(url: &str, content_encoding: Option<&str>, body: &[u8]) -> Result<Vec<u8>> {
    // Header values are case-insensitive ("GZIP" == "gzip")
    let coding = content_encoding
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let mut out = Vec::new();
    match coding.as_str() {
        // No coding: the body already is the payload
        "" | "identity" => return Ok(body.to_vec()),

        // A gzip body may hold several members back to back; MultiGzDecoder
        // reads all of them, GzDecoder would stop after the first
        "gzip" | "x-gzip" => MultiGzDecoder::new(body)
            .read_to_end(&mut out)
            .map_err(|e| Error::decode(url, format!("corrupt gzip body: {}", e)))?,

        // HTTP "deflate" is zlib-wrapped deflate
        "deflate" => ZlibDecoder::new(body)
            .read_to_end(&mut out)
            .map_err(|e| Error::decode(url, format!("corrupt deflate body: {}", e)))?,

        // br, zstd, ...: we never ask for these, so receiving one is an error
        other => {
            return Err(Error::decode(
                url,
                format!("unsupported content encoding: {}", other),
            ))
        }
    };
    Ok(out)
}

// "text/html; charset=utf-8" -> Some("utf-8")
fn charset_of(content_type: &str) -> Option<String> {
    // The first segment is the media type itself; parameters follow
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why not let reqwest decompress?
//    - reqwest can do it with its 'gzip' feature, but then use_compression
//      could not be switched off per client and decode errors would surface
//      as transport errors
//
// 2. Content-Encoding vs charset
//    - Content-Encoding is a byte-level wrapper (gzip) around the body
//    - the charset says how the unwrapped bytes map to characters
//    - so the order is always: decompress first, then decode text
// -----------------------------------------------------------------------------
