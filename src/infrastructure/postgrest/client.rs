//! HTTP client for the hosted data store's REST gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use tracing::{debug, warn};

use super::dto::ErrorResponse;
use super::query::{OWNER_COLUMN, id_param, list_params};
use crate::domain::entities::{ApiKey, ItemId, Row};
use crate::domain::errors::StoreError;
use crate::domain::ports::{Collection, Query, RemoteStorePort};
use crate::infrastructure::config::StoreConfig;

const REST_PATH: &str = "rest/v1";
const DEFAULT_RETRY_AFTER_MS: u64 = 5000;
const USER_AGENT: &str = concat!("discipline-os/", env!("CARGO_PKG_VERSION"));

/// Data store client speaking the PostgREST dialect.
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    api_key: ApiKey,
    access_token: Option<ApiKey>,
    owner: Option<String>,
}

impl PostgrestClient {
    /// Creates a client from the `[store]` configuration section.
    ///
    /// # Errors
    /// Returns `StoreError::Rejected` when the URL or API key is missing and
    /// `StoreError::Unexpected` when the HTTP client cannot be built.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let base_url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::rejected("store url is not configured"))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| StoreError::rejected("store api key is not configured"))?;

        let mut client = Self::with_base_url(base_url, api_key, config.timeout())?;
        client.access_token = config.access_token.clone();
        Ok(match &config.user_id {
            Some(user_id) => client.with_owner(user_id.as_str()),
            None => client,
        })
    }

    /// Creates client with custom base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: ApiKey,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            access_token: None,
            owner: None,
        })
    }

    /// Scopes created rows and list calls to one owner.
    #[must_use]
    pub fn with_owner(mut self, user_id: impl Into<String>) -> Self {
        self.owner = Some(user_id.into());
        self
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/{REST_PATH}/{}", self.base_url, collection.table())
    }

    fn request(&self, method: Method, collection: Collection) -> RequestBuilder {
        let bearer = self.access_token.as_ref().unwrap_or(&self.api_key);
        self.client
            .request(method, self.table_url(collection))
            .header("apikey", self.api_key.as_str())
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer.as_str()))
    }

    /// Stamps the owner on an insert payload unless it already carries one.
    fn owned(&self, mut row: Row) -> Row {
        if let (Some(owner), Some(fields)) = (&self.owner, row.as_object_mut()) {
            fields
                .entry(OWNER_COLUMN)
                .or_insert_with(|| Row::String(owner.clone()));
        }
        row
    }

    async fn send(
        &self,
        request: RequestBuilder,
        collection: Collection,
    ) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(|e| {
            warn!(%collection, error = %e, "Failed to reach data store");
            if e.is_timeout() {
                StoreError::network("request timed out")
            } else if e.is_connect() {
                StoreError::network("failed to connect to data store")
            } else {
                StoreError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }
        Ok(response)
    }

    async fn rows(response: Response, collection: Collection) -> Result<Vec<Row>, StoreError> {
        response.json::<Vec<Row>>().await.map_err(|e| {
            warn!(%collection, error = %e, "Failed to parse store response");
            StoreError::decode(format!("failed to parse {collection} rows: {e}"))
        })
    }

    async fn handle_error_response(status: StatusCode, response: Response) -> StoreError {
        let retry_after_ms = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .map_or(DEFAULT_RETRY_AFTER_MS, |secs| secs.saturating_mul(1000));

        let error_message = match response.json::<ErrorResponse>().await {
            Ok(error) => error.describe(),
            Err(_) => format!("HTTP {status}"),
        };

        error_for_status(status, &error_message, retry_after_ms)
    }
}

fn error_for_status(status: StatusCode, message: &str, retry_after_ms: u64) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED => StoreError::rejected("invalid or expired credentials"),
        StatusCode::FORBIDDEN => StoreError::rejected(format!("access denied: {message}")),
        StatusCode::NOT_FOUND => StoreError::not_found(message),
        StatusCode::TOO_MANY_REQUESTS => StoreError::RateLimited { retry_after_ms },
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            StoreError::network("data store is temporarily unavailable")
        }
        _ => StoreError::unexpected(format!("unexpected response: {status} - {message}")),
    }
}

#[async_trait]
impl RemoteStorePort for PostgrestClient {
    async fn create(&self, collection: Collection, row: Row) -> Result<Row, StoreError> {
        debug!(%collection, "Inserting row");

        let request = self
            .request(Method::POST, collection)
            .header("Prefer", "return=representation")
            .json(&self.owned(row));
        let response = self.send(request, collection).await?;

        let row = Self::rows(response, collection)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::decode("insert returned no row"))?;

        debug!(%collection, id = %row["id"], "Row inserted");
        Ok(row)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &ItemId,
        row: Row,
    ) -> Result<(), StoreError> {
        debug!(%collection, %id, "Updating row");

        let request = self
            .request(Method::PATCH, collection)
            .query(&id_param(id))
            .header("Prefer", "return=representation")
            .json(&row);
        let response = self.send(request, collection).await?;

        if Self::rows(response, collection).await?.is_empty() {
            return Err(StoreError::not_found(format!("{collection} row {id}")));
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &ItemId) -> Result<(), StoreError> {
        debug!(%collection, %id, "Deleting row");

        let request = self
            .request(Method::DELETE, collection)
            .query(&id_param(id))
            .header("Prefer", "return=representation");
        let response = self.send(request, collection).await?;

        if Self::rows(response, collection).await?.is_empty() {
            return Err(StoreError::not_found(format!("{collection} row {id}")));
        }
        Ok(())
    }

    async fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Row>, StoreError> {
        debug!(%collection, filters = query.filters.len(), "Listing rows");

        let request = self
            .request(Method::GET, collection)
            .query(&list_params(query, self.owner.as_deref()));
        let response = self.send(request, collection).await?;
        let rows = Self::rows(response, collection).await?;

        debug!(%collection, count = rows.len(), "Rows listed");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn key() -> ApiKey {
        ApiKey::new("anon-key-0123456789").unwrap()
    }

    fn client() -> PostgrestClient {
        PostgrestClient::with_base_url("https://abc.supabase.co/", key(), Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(
            client.table_url(Collection::VisionBoard),
            "https://abc.supabase.co/rest/v1/vision_board_items"
        );
    }

    #[test]
    fn test_from_config_requires_url_and_key() {
        let mut config = StoreConfig::default();
        assert!(matches!(
            PostgrestClient::from_config(&config),
            Err(StoreError::Rejected { .. })
        ));

        config.url = Some("https://abc.supabase.co".into());
        config.api_key = Some(key());
        config.user_id = Some("u-1".into());
        let client = PostgrestClient::from_config(&config).unwrap();
        assert_eq!(client.owner.as_deref(), Some("u-1"));
    }

    #[test]
    fn test_owner_is_stamped_on_insert() {
        let client = client().with_owner("u-1");

        let row = client.owned(json!({"title": "Buy milk"}));
        assert_eq!(row["user_id"], json!("u-1"));

        let row = client.owned(json!({"title": "Shared", "user_id": "u-2"}));
        assert_eq!(row["user_id"], json!("u-2"));
    }

    #[test]
    fn test_request_carries_credentials() {
        let request = client()
            .request(Method::GET, Collection::Todos)
            .build()
            .unwrap();

        assert_eq!(request.headers()["apikey"], "anon-key-0123456789");
        assert_eq!(
            request.headers()[header::AUTHORIZATION],
            "Bearer anon-key-0123456789"
        );
    }

    #[test_case(StatusCode::UNAUTHORIZED, "rejected" ; "unauthorized")]
    #[test_case(StatusCode::FORBIDDEN, "rejected" ; "forbidden")]
    #[test_case(StatusCode::NOT_FOUND, "not_found" ; "not_found")]
    #[test_case(StatusCode::TOO_MANY_REQUESTS, "rate_limited" ; "rate_limited")]
    #[test_case(StatusCode::SERVICE_UNAVAILABLE, "network" ; "unavailable")]
    #[test_case(StatusCode::GATEWAY_TIMEOUT, "network" ; "gateway_timeout")]
    #[test_case(StatusCode::CONFLICT, "unexpected" ; "conflict")]
    fn test_status_mapping(status: StatusCode, expected: &str) {
        let kind = match error_for_status(status, "boom", 1000) {
            StoreError::Rejected { .. } => "rejected",
            StoreError::NotFound { .. } => "not_found",
            StoreError::RateLimited { .. } => "rate_limited",
            StoreError::Network { .. } => "network",
            StoreError::Decode { .. } => "decode",
            StoreError::Unexpected { .. } => "unexpected",
        };
        assert_eq!(kind, expected);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_network_error() {
        let client =
            PostgrestClient::with_base_url("http://127.0.0.1:9", key(), Duration::from_secs(2))
                .unwrap();

        let err = client
            .list(Collection::Todos, &Query::new())
            .await
            .unwrap_err();
        assert!(err.is_network_error());
    }
}
