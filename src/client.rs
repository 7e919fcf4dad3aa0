use crate::config::AppConfig;
use crate::errors::ClientError;
use crate::query::ODataQuery;
use crate::sources::{Domain, QueryScope, query_for};
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct ODataEnvelope<T> {
    d: ODataResults<T>,
}

#[derive(Debug, Deserialize)]
struct ODataResults<T> {
    results: Vec<T>,
}

/// Thin HTTP client for the practice's OData backend.
#[derive(Clone)]
pub struct RemoteDataClient {
    http: Client,
    base_url: Option<Url>,
    api_key: Option<String>,
    endpoints: HashMap<Domain, String>,
}

impl fmt::Debug for RemoteDataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteDataClient")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("api_key", &"<redacted>")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl RemoteDataClient {
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            endpoints: config.endpoints.clone(),
        })
    }

    /// Absolute endpoints are used as-is, anything else is joined onto the
    /// base url.
    pub fn resolve(&self, endpoint: &str) -> Result<Url, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: endpoint.to_string(),
            reason,
        };

        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Url::parse(endpoint).map_err(|err| invalid(err.to_string()));
        }
        match &self.base_url {
            Some(base) => base.join(endpoint).map_err(|err| invalid(err.to_string())),
            None => Err(invalid("relative endpoint and no API_BASE_URL configured".to_string())),
        }
    }

    /// Runs `query` against `endpoint` and returns the rows of the
    /// `d.results` envelope.
    pub async fn fetch_rows<T>(&self, endpoint: &str, query: &ODataQuery) -> Result<Vec<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = self.resolve(endpoint)?;
        let target = url.to_string();

        let mut request = self
            .http
            .get(url)
            .query(&query.to_params())
            .header(ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!(endpoint = %target, filter = ?query.filter_expression(), "fetching rows");
        let response = request.send().await.map_err(|source| {
            warn!(endpoint = %target, "request failed: {source}");
            ClientError::Transport {
                endpoint: target.clone(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %target, status = status.as_u16(), "backend returned an error status");
            return Err(ClientError::Status {
                endpoint: target,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: target.clone(),
                source,
            })?;
        let envelope: ODataEnvelope<T> =
            serde_json::from_slice(&body).map_err(|err| ClientError::Decode {
                endpoint: target.clone(),
                reason: err.to_string(),
            })?;

        info!(endpoint = %target, rows = envelope.d.results.len(), "fetched rows");
        Ok(envelope.d.results)
    }

    /// Fetches the rows of one data source for `scope`.
    pub async fn fetch<T>(&self, domain: Domain, scope: &QueryScope) -> Result<Vec<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let endpoint = self
            .endpoints
            .get(&domain)
            .ok_or(ClientError::MissingEndpoint(domain))?;
        self.fetch_rows(endpoint, &query_for(domain, scope)).await
    }
}
