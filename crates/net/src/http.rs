use crate::{Fetcher, NetError, Request, Response};
use core_types::HttpMethod;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// Response bodies longer than this are cut off.
    pub max_body_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("zjax/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    max_body_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| NetError::Client(e.to_string()))?;
        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        let transport = |message: String| NetError::Transport {
            method: request.method.to_string(),
            url: request.url.to_string(),
            message,
        };

        let mut builder = self
            .client
            .request(to_reqwest(request.method), request.url.clone());
        if let Some(content_type) = request.content_type {
            builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        let resp = builder.send().map_err(|e| transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let url = resp.url().to_string();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        use std::io::Read;
        let mut limited = resp.take(self.max_body_bytes);
        let mut buf = Vec::new();
        limited
            .read_to_end(&mut buf)
            .map_err(|e| transport(e.to_string()))?;

        Ok(Response {
            url,
            status,
            content_type,
            body: String::from_utf8_lossy(&buf).into_owned(),
        })
    }
}
