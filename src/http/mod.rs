//! The request pipeline every outgoing call passes through
//!
//! Stage order is fixed: credential attachment, unauthorized handling, error
//! normalization, loading bookkeeping, response path rewriting. Requests are
//! independent of each other; the loading counter is the only state shared
//! across concurrent calls.

mod loading;
mod rewrite;

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::session::SessionShared;

pub use loading::LoadingTracker;

/// Endpoints exempt from automatic sign-out on a 401 response, matched by
/// substring against the request URL. A failed sign-in is a normal error,
/// not a session event.
const PUBLIC_ENDPOINTS: &[&str] = &[
    "/auth/signin",
    "/auth/signup",
    "/auth/refresh",
    "/auth/forgot-password",
];

fn is_public_endpoint(url: &str) -> bool {
    PUBLIC_ENDPOINTS.iter().any(|fragment| url.contains(fragment))
}

struct ApiInner {
    http: Client,
    api_url: String,
    files_url: String,
    session: Arc<SessionShared>,
    loading: LoadingTracker,
}

/// Entry point for issuing requests through the pipeline
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiInner>,
}

impl ApiClient {
    pub(crate) fn new(
        api_url: &str,
        files_url: &str,
        options: &ClientOptions,
        session: Arc<SessionShared>,
    ) -> Self {
        // Cookie support is enabled once here and cannot be opted out of per
        // request: every call is credentialed.
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().expect("failed to build HTTP client");

        Self {
            inner: Arc::new(ApiInner {
                http,
                api_url: api_url.trim_end_matches('/').to_string(),
                files_url: files_url.to_string(),
                session,
                loading: LoadingTracker::new(),
            }),
        }
    }

    /// The shared loading tracker behind the global indicator.
    pub fn loading(&self) -> &LoadingTracker {
        &self.inner.loading
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    /// Start a request for `path` below the configured API base URL.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.inner.api_url, path);
        RequestBuilder::new(self.inner.clone(), method, url)
    }
}

/// Builder for a single request through the pipeline
pub struct RequestBuilder {
    api: Arc<ApiInner>,
    method: Method,
    url: String,
    headers: HeaderMap,
    query_params: Option<HashMap<String, String>>,
    body: Option<Vec<u8>>,
    multipart: Option<Form>,
}

impl RequestBuilder {
    fn new(api: Arc<ApiInner>, method: Method, url: String) -> Self {
        Self {
            api,
            method,
            url,
            headers: HeaderMap::new(),
            query_params: None,
            body: None,
            multipart: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authentication to the request.
    ///
    /// Independent capability: the pipeline itself authenticates through the
    /// cookie session and never sets this header.
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Add query parameters to the request
    pub fn query(mut self, params: HashMap<String, String>) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(json);
        Ok(self.header("Content-Type", "application/json"))
    }

    /// Attach a multipart form (file uploads). The form passes through the
    /// pipeline opaquely.
    pub fn multipart(mut self, form: Form) -> Self {
        self.multipart = Some(form);
        self
    }

    fn build(self) -> Result<(Arc<ApiInner>, String, reqwest::RequestBuilder), Error> {
        let mut url = Url::parse(&self.url)?;

        if let Some(params) = &self.query_params {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in params {
                query_pairs.append_pair(key, value);
            }
        }

        let mut req = self.api.http.request(self.method, url.as_str());
        req = req.headers(self.headers);

        if let Some(form) = self.multipart {
            req = req.multipart(form);
        } else if let Some(body) = self.body {
            req = req.body(body);
        }

        Ok((self.api, self.url, req))
    }

    /// Run the pipeline up to and including error normalization.
    ///
    /// `Ok(None)` means an unauthorized response on a protected endpoint
    /// forced the session to terminate; the call completes silently and the
    /// trace is a [`crate::session::SessionEvent::Terminated`] event.
    async fn dispatch(self) -> Result<Option<reqwest::Response>, Error> {
        let (api, request_url, req) = self.build()?;

        api.loading.begin().await;
        let outcome = req.send().await;
        api.loading.end().await;

        // No response at all: client-side error, normalized distinctly from
        // server status errors
        let response = outcome?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED && !is_public_endpoint(&request_url) {
            api.session.terminate();
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_response(status, &body));
        }

        Ok(Some(response))
    }

    /// Execute the request and parse the JSON response, rewriting relative
    /// `filePath` fields against the file-server base URL.
    pub async fn send<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        let files_url = self.api.files_url.clone();
        let response = match self.dispatch().await? {
            Some(response) => response,
            None => return Ok(None),
        };

        let mut value: serde_json::Value = response.json().await?;
        rewrite::rewrite_file_paths(&mut value, &files_url);
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Execute the request and discard the response body.
    pub async fn send_unit(self) -> Result<Option<()>, Error> {
        Ok(self.dispatch().await?.map(|_| ()))
    }

    /// Execute the request and return the raw response, with no body
    /// rewriting. Used for downloads and other opaque payloads.
    pub async fn send_raw(self) -> Result<Option<reqwest::Response>, Error> {
        self.dispatch().await
    }
}
