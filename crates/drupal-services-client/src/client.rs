//! REST client for the Services dialect.
//!
//! One [`ServicesClient`] wraps every network call made for an entity or
//! collection: it resolves the resource path against the application root,
//! forces credentialed transport (cookies), and injects the cached
//! anti-forgery token into a fixed request header before dispatch.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::token::{TokenSource, TokenStore};
use async_trait::async_trait;
use drupal_entity_model::{Entity, EntityCollection};
use reqwest::Method;
use serde::Deserialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Header carrying the anti-forgery token on every request.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Response from the `/system/connect` endpoint.
#[derive(Debug, Deserialize)]
pub struct ConnectResponse {
    /// The user record for the current session (anonymous or not)
    pub user: serde_json::Value,
    /// Token issued alongside the connect response, when the server sends one
    #[serde(default)]
    pub token: Option<String>,
}

/// Response from the `/user/login` endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// The authenticated user record
    pub user: serde_json::Value,
    /// Token issued for the new session
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Options for collection fetches.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Replace existing members instead of upserting into them
    pub remove: bool,
    /// `pagesize` query parameter
    pub page_size: Option<u32>,
    /// `page` query parameter
    pub page: Option<u32>,
    /// Additional query parameters passed through verbatim
    pub params: Vec<(String, String)>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            remove: true,
            page_size: None,
            page: None,
            params: Vec::new(),
        }
    }
}

/// REST client for entity, collection, and session exchanges.
#[derive(Debug)]
pub struct ServicesClient {
    http_client: reqwest::Client,
    config: ClientConfig,
    tokens: TokenStore,
}

impl ServicesClient {
    /// Create a client for the given configuration.
    ///
    /// The underlying HTTP client keeps a cookie store so the server-side
    /// session cookie rides along on every call.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http_client,
            config,
            tokens: TokenStore::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The anti-forgery token cache.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Build an intercepted request for a resource path.
    ///
    /// Resolves the URL against the application root, awaits the token cache
    /// (fetching `/user/token` first when empty), and injects the token
    /// header. The returned builder lets callers chain their own pre-dispatch
    /// customization after the injected step. A failed token fetch fails the
    /// call before it reaches the network.
    pub async fn request(&self, method: Method, path: &str) -> ClientResult<reqwest::RequestBuilder> {
        let url = self.config.endpoint(path);
        let token = self.tokens.get(self).await?;
        Ok(self
            .http_client
            .request(method, url)
            .header(CSRF_HEADER, token)
            .header("Accept", "application/json"))
    }

    /// Probe the current session via `/system/connect`.
    pub async fn system_connect(&self) -> ClientResult<ConnectResponse> {
        tracing::debug!("Probing session via /system/connect");

        let response = self.request(Method::POST, "/system/connect").await?.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(status = %status, body_summary = %body_summary, "Connect probe failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("connect failed ({body_summary})"),
            });
        }

        Ok(response.json().await?)
    }

    /// Exchange credentials via `/user/login`.
    pub async fn user_login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        tracing::debug!(username = %username, "Posting credentials to /user/login");

        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let response = self
            .request(Method::POST, "/user/login")
            .await?
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(status = %status, body_summary = %body_summary, "Login failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("login failed ({body_summary})"),
            });
        }

        Ok(response.json().await?)
    }

    /// End the server-side session via `/user/logout`.
    pub async fn user_logout(&self) -> ClientResult<()> {
        tracing::debug!("Posting to /user/logout");

        let response = self.request(Method::POST, "/user/logout").await?.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(status = %status, body_summary = %body_summary, "Logout failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("logout failed ({body_summary})"),
            });
        }

        Ok(())
    }

    /// Re-fetch a saved entity from its resource path.
    pub async fn fetch_entity(&self, entity: &mut Entity) -> ClientResult<()> {
        if entity.is_new() {
            return Err(ClientError::State(
                "cannot fetch an entity with no identity".to_string(),
            ));
        }
        let path = entity.resource_path();
        tracing::debug!(path = %path, "Fetching entity");

        let response = self.request(Method::GET, &path).await?.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(status = %status, body_summary = %body_summary, "Entity fetch failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("fetch of {path} failed ({body_summary})"),
            });
        }

        let record: serde_json::Value = response.json().await?;
        entity.merge_wire(record)?;
        Ok(())
    }

    /// Persist an entity: POST for a new record, PUT for an update.
    ///
    /// On success the response record is merged back and the entity is
    /// re-fetched, so server-computed fields (timestamps, paths, defaults)
    /// land in the model before the caller sees it again.
    pub async fn save_entity(&self, entity: &mut Entity) -> ClientResult<()> {
        let method = if entity.is_new() { Method::POST } else { Method::PUT };
        // Writes skip the fetch query; those parameters only shape reads
        let path = entity.write_path();
        let body = entity.serialize();
        tracing::debug!(path = %path, method = %method, "Saving entity");

        let response = self
            .request(method, &path)
            .await?
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(status = %status, body_summary = %body_summary, "Entity save failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("save to {path} failed ({body_summary})"),
            });
        }

        let record: serde_json::Value = response.json().await?;
        entity.merge_wire(record)?;

        if entity.is_new() {
            return Err(ClientError::InvalidResponse(
                "save response carried no identity".to_string(),
            ));
        }
        self.fetch_entity(entity).await
    }

    /// Fetch a page of records into a collection.
    pub async fn fetch_collection(
        &self,
        collection: &mut EntityCollection,
        options: &FetchOptions,
    ) -> ClientResult<()> {
        let path = collection.resource_path();
        let mut query: Vec<(String, String)> = Vec::new();
        if let Some(page_size) = options.page_size {
            query.push(("pagesize".to_string(), page_size.to_string()));
        }
        if let Some(page) = options.page {
            query.push(("page".to_string(), page.to_string()));
        }
        query.extend(options.params.iter().cloned());

        tracing::debug!(path = %path, params = query.len(), "Fetching collection");

        let response = self
            .request(Method::GET, &path)
            .await?
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(status = %status, body_summary = %body_summary, "Collection fetch failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("fetch of {path} failed ({body_summary})"),
            });
        }

        let records: Vec<serde_json::Value> = response.json().await?;
        let mut incoming = Vec::with_capacity(records.len());
        for record in records {
            incoming.push(Entity::from_wire_with_mode(
                collection.kind(),
                record,
                self.config.coercion,
            )?);
        }
        tracing::debug!(count = incoming.len(), "Hydrated collection page");

        collection.merge(incoming, options.remove)?;
        Ok(())
    }
}

#[async_trait]
impl TokenSource for ServicesClient {
    /// Fetch a fresh token from `/user/token`.
    ///
    /// This is the one endpoint that must not go through the interceptor,
    /// since the interceptor itself waits on the token cache.
    async fn fetch_token(&self) -> ClientResult<String> {
        let url = self.config.endpoint("/user/token");
        tracing::debug!("Requesting anti-forgery token");

        let response = self
            .http_client
            .post(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(status = %status, body_summary = %body_summary, "Token request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("token request failed ({body_summary})"),
            });
        }

        let issued: TokenResponse = response.json().await?;
        Ok(issued.token)
    }
}
