use crate::NetError;
use core_types::HttpMethod;
use url::Url;
use url::form_urlencoded;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: HttpMethod,
    pub url: Url,
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
}

impl Request {
    /// Builds a request for `endpoint` relative to `base`.
    ///
    /// Form entries go into the query string for methods that carry one and into an
    /// urlencoded body otherwise.
    pub fn new(
        method: HttpMethod,
        base: &Url,
        endpoint: &str,
        form: Option<&[(String, String)]>,
    ) -> Result<Self, NetError> {
        let mut url = resolve_endpoint(base, endpoint)?;
        let mut body = None;
        let mut content_type = None;
        if let Some(entries) = form {
            if method.carries_query() {
                if !entries.is_empty() {
                    url.query_pairs_mut().extend_pairs(entries.iter());
                }
            } else {
                body = Some(encode_form(entries));
                content_type = Some(FORM_CONTENT_TYPE);
            }
        }
        Ok(Self {
            method,
            url,
            body,
            content_type,
        })
    }
}

/// Resolves an endpoint token. `.` means the base URL itself.
pub fn resolve_endpoint(base: &Url, endpoint: &str) -> Result<Url, NetError> {
    if endpoint == "." {
        return Ok(base.clone());
    }
    base.join(endpoint).map_err(|source| NetError::InvalidUrl {
        url: endpoint.to_string(),
        source,
    })
}

pub fn encode_form(entries: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(entries.iter())
        .finish()
}
