//! HTTP request executor.
//!
//! Every tool operation funnels through [`Executor::request`], which joins the endpoint onto
//! the configured base URL, serializes the query (lists become repeated keys), attaches signed
//! headers for authenticated endpoints and classifies failures.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::CredentialProvider;
use crate::config::Config;
use crate::error::Error;
use crate::{Result, ToQueryParams as _, endpoint_url};

#[derive(Debug)]
pub struct Executor {
    base_url: String,
    client: ReqwestClient,
    auth: CredentialProvider,
}

impl Executor {
    /// Creates an executor for `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API URL is invalid, or an internal error if the
    /// HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self> {
        Url::parse(config.api_url())?;

        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static("polymarket_mcp"));
        headers.insert("Accept", HeaderValue::from_static("*/*"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = ReqwestClient::builder().default_headers(headers).build()?;

        Ok(Self {
            base_url: config.api_url().trim_end_matches('/').to_owned(),
            auth: CredentialProvider::new(config, client.clone()),
            client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialProvider {
        &self.auth
    }

    pub async fn get<Q: Serialize>(
        &self,
        endpoint: &str,
        query: &Q,
        auth_required: bool,
    ) -> Result<Value> {
        self.request(endpoint, Method::GET, query, None, auth_required)
            .await
    }

    pub async fn post<Q: Serialize, B: Serialize>(
        &self,
        endpoint: &str,
        query: &Q,
        body: &B,
        auth_required: bool,
    ) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.request(endpoint, Method::POST, query, Some(&body), auth_required)
            .await
    }

    /// Issues a single call against the upstream API and returns its JSON body.
    ///
    /// Only `GET` and `POST` are supported; any other method fails before a request is built.
    /// Non-success statuses become [`crate::error::Kind::Status`] errors carrying the response
    /// body. When `auth_required` is set and authentication is available, the signed headers
    /// are attached; if they cannot be produced the call goes out unauthenticated.
    pub async fn request<Q: Serialize>(
        &self,
        endpoint: &str,
        method: Method,
        query: &Q,
        body: Option<&Value>,
        auth_required: bool,
    ) -> Result<Value> {
        if method != Method::GET && method != Method::POST {
            return Err(Error::configuration(format!(
                "unsupported HTTP method: {method}"
            )));
        }

        let url = format!(
            "{}{}",
            endpoint_url(&self.base_url, endpoint),
            query.query_params()
        );

        let mut builder = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let request = builder.build()?;

        let headers = if auth_required {
            Some(self.auth.auth_headers(&request).await)
        } else {
            None
        };

        crate::request(&self.client, request, headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    #[tokio::test]
    async fn unsupported_method_should_fail_locally() -> anyhow::Result<()> {
        // Nothing listens here; reaching the network would surface as a network error.
        let config = Config::builder().api_url("http://127.0.0.1:1").build();
        let executor = Executor::new(&config)?;

        let err = executor
            .request("orders", Method::DELETE, &(), None, false)
            .await
            .expect_err("DELETE is not supported");

        assert_eq!(err.kind(), Kind::Configuration);

        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host_should_be_network_error() -> anyhow::Result<()> {
        let config = Config::builder().api_url("http://127.0.0.1:1/").build();
        let executor = Executor::new(&config)?;

        let err = executor
            .get("markets", &(), false)
            .await
            .expect_err("connection should be refused");

        assert_eq!(err.kind(), Kind::Network);

        Ok(())
    }

    #[test]
    fn invalid_base_url_should_be_configuration_error() {
        let config = Config::builder().api_url("not a url").build();

        let err = Executor::new(&config).expect_err("invalid url");
        assert_eq!(err.kind(), Kind::Configuration);
    }

    #[test]
    fn base_url_should_drop_trailing_slash() -> anyhow::Result<()> {
        let config = Config::builder()
            .api_url("https://clob.polymarket.com/")
            .build();

        assert_eq!(
            Executor::new(&config)?.base_url(),
            "https://clob.polymarket.com"
        );

        Ok(())
    }
}
