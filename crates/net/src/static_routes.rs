use crate::{Fetcher, NetError, Request, Response};
use core_types::HttpMethod;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory route table keyed by method and path (optionally with a query string).
///
/// Unknown routes answer 404. Every request is recorded so callers can assert on what was
/// sent.
#[derive(Default)]
pub struct StaticFetcher {
    routes: Mutex<HashMap<(HttpMethod, String), (u16, String)>>,
    requests: Mutex<Vec<Request>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert((method, path.to_string()), (status, body.to_string()));
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let path = request.url.path().to_string();
        let with_query = match request.url.query() {
            Some(q) => format!("{path}?{q}"),
            None => path.clone(),
        };
        let routes = self.routes.lock().map_err(|e| NetError::Transport {
            method: request.method.to_string(),
            url: request.url.to_string(),
            message: e.to_string(),
        })?;
        let hit = routes
            .get(&(request.method, with_query))
            .or_else(|| routes.get(&(request.method, path)));
        let (status, body) = hit
            .cloned()
            .unwrap_or_else(|| (404, "<p>not found</p>".to_string()));
        Ok(Response {
            status,
            ..Response::ok(request.url.as_str(), body)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn routes_match_query_first_then_path() {
        let fetcher = StaticFetcher::new();
        fetcher.route(HttpMethod::Get, "/search", 200, "any");
        fetcher.route(HttpMethod::Get, "/search?q=x", 200, "exact");
        fetcher.route(HttpMethod::Post, "/save", 201, "saved");
        let base = Url::parse("http://localhost/").expect("base");
        let get = |endpoint: &str| {
            let req = Request::new(HttpMethod::Get, &base, endpoint, None).expect("request");
            fetcher.fetch(&req).expect("fetch")
        };
        assert_eq!(get("/search?q=x").body, "exact");
        assert_eq!(get("/search?q=y").body, "any");
        assert_eq!(get("/missing").status, 404);

        let post = Request::new(HttpMethod::Post, &base, "/save", None).expect("request");
        assert_eq!(fetcher.fetch(&post).expect("fetch").status, 201);
        assert_eq!(fetcher.requests().len(), 4);
    }
}
