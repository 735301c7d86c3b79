//! Backend boundary: schema lookup and connection creation.

use {
    async_trait::async_trait,
    conduit_config::ApiConfig,
    reqwest::{Client, Response},
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::{debug, warn},
    url::Url,
};

use crate::{
    draft::ConnectionDraft,
    error::{Context, Error, Result},
    schema::SourceSchema,
};

/// Returned by the backend after a connection is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedConnection {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Sources/connections backend.
///
/// This allows the wizard to run against a fake in tests.
#[async_trait]
pub trait SourceApi: Send + Sync {
    /// `GET /sources/detail/{short_name}`
    async fn fetch_schema(&self, short_name: &str) -> Result<SourceSchema>;

    /// `POST /connections/connect/source/{short_name}`
    async fn create_connection(
        &self,
        short_name: &str,
        draft: &ConnectionDraft,
    ) -> Result<CreatedConnection>;
}

/// `reqwest`-backed [`SourceApi`].
#[derive(Clone)]
pub struct HttpSourceApi {
    client: Client,
    base_url: Url,
    api_key: Option<Secret<String>>,
}

impl std::fmt::Debug for HttpSourceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSourceApi")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl HttpSourceApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("invalid api base url '{}'", config.base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::message(format!(
                "api base url '{base_url}' cannot carry a path"
            )));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::message("api base url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }
}

/// Describe a non-success response, preferring the server's `detail` field.
async fn describe_failure(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .map(|b| match b.detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .filter(|d| !d.trim().is_empty());
    match detail {
        Some(detail) => format!("server returned {status}: {detail}"),
        None => format!("server returned {status}"),
    }
}

#[async_trait]
impl SourceApi for HttpSourceApi {
    async fn fetch_schema(&self, short_name: &str) -> Result<SourceSchema> {
        let url = self.endpoint(&["sources", "detail", short_name])?;
        debug!(%url, short_name, "fetching source schema");

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| Error::schema_fetch(short_name, e))?;
        if !response.status().is_success() {
            let reason = describe_failure(response).await;
            warn!(short_name, %reason, "source schema request failed");
            return Err(Error::schema_fetch(short_name, reason));
        }

        let schema = response
            .json::<SourceSchema>()
            .await
            .map_err(|e| Error::schema_fetch(short_name, format!("invalid schema payload: {e}")))?;
        debug!(short_name, field_count = schema.fields.len(), "source schema loaded");
        Ok(schema)
    }

    async fn create_connection(
        &self,
        short_name: &str,
        draft: &ConnectionDraft,
    ) -> Result<CreatedConnection> {
        let url = self.endpoint(&["connections", "connect", "source", short_name])?;
        debug!(%url, short_name, "creating connection");

        let response = self
            .authorize(self.client.post(url).json(draft))
            .send()
            .await
            .map_err(Error::provisioning)?;
        if !response.status().is_success() {
            let reason = describe_failure(response).await;
            warn!(short_name, %reason, "connection request failed");
            return Err(Error::provisioning(reason));
        }

        let created = response
            .json::<CreatedConnection>()
            .await
            .map_err(|e| Error::provisioning(format!("invalid connection payload: {e}")))?;
        debug!(short_name, connection_id = %created.id, "connection created");
        Ok(created)
    }
}
