//! HTTP fetch capability: one request in, status and body text out.
//!
//! [`Fetcher`] is the seam the page runtime talks to. [`HttpFetcher`] goes to the network via
//! a blocking `reqwest` client; [`StaticFetcher`] serves canned responses for tests and demos.
//! [`spawn_fetch`] runs a fetch on its own thread and reports through a callback, so the
//! caller's loop is never blocked on I/O.

mod http;
mod request;
mod static_routes;

pub use http::{FetchConfig, HttpFetcher};
pub use request::{FORM_CONTENT_TYPE, Request, encode_form, resolve_endpoint};
pub use static_routes::StaticFetcher;

use std::sync::Arc;
use std::thread;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetError {
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("http client setup failed: {0}")]
    Client(String),
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },
    #[error("{status} for {url}")]
    Status { status: u16, url: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl Response {
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx status into [`NetError::Status`].
    pub fn error_for_status(self) -> Result<Self, NetError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(NetError::Status {
                status: self.status,
                url: self.url,
            })
        }
    }
}

pub trait Fetcher: Send + Sync {
    /// Performs exactly one request. Non-2xx statuses are returned, not turned into errors.
    fn fetch(&self, request: &Request) -> Result<Response, NetError>;
}

/// Runs `request` on a worker thread and hands the result to `cb` there.
pub fn spawn_fetch(
    fetcher: Arc<dyn Fetcher>,
    request: Request,
    cb: impl FnOnce(Result<Response, NetError>) + Send + 'static,
) {
    thread::spawn(move || {
        let start = Instant::now();
        let result = fetcher.fetch(&request);
        match &result {
            Ok(resp) => log::debug!(
                target: "zjax.net",
                "{} {} -> {} ({} bytes, {} ms)",
                request.method,
                request.url,
                resp.status,
                resp.body.len(),
                start.elapsed().as_millis()
            ),
            Err(err) => log::debug!(target: "zjax.net", "{err}"),
        }
        cb(result);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::HttpMethod;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn spawn_fetch_reports_on_callback() {
        let fetcher = StaticFetcher::new();
        fetcher.route(HttpMethod::Get, "/hello", 200, "<p>hi</p>");
        let fetcher: Arc<dyn Fetcher> = Arc::new(fetcher);
        let base = url::Url::parse("http://localhost/").expect("base");
        let request = Request::new(HttpMethod::Get, &base, "/hello", None).expect("request");

        let (tx, rx) = mpsc::channel();
        spawn_fetch(fetcher, request, move |result| {
            let _ = tx.send(result);
        });
        let result = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("callback ran");
        let resp = result.expect("fetch ok");
        assert_eq!(resp.body, "<p>hi</p>");
    }

    #[test]
    fn error_for_status() {
        let mut resp = Response::ok("http://localhost/x", "");
        assert!(resp.clone().error_for_status().is_ok());
        resp.status = 503;
        assert!(matches!(
            resp.error_for_status(),
            Err(NetError::Status { status: 503, .. })
        ));
    }
}
