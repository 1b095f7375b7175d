//! HTTP client for the Shopify Admin GraphQL API.
//!
//! Wraps `reqwest` with token management, per-shop endpoint construction, and
//! typed payload deserialization. Every call checks the top-level `errors`
//! array and mutation `userErrors` and surfaces both as [`ShopifyError::Api`].
//! Transient failures are retried with exponential back-off.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ShopifyError;
use crate::retry;
use crate::types::{
    AppRoot, CreatedFile, FileCreatePayload, FileNode, StagedTarget, StagedUploadsCreatePayload,
    UserError,
};

const STAGED_UPLOADS_CREATE: &str = "\
    mutation stagedUploadsCreate($input: [StagedUploadInput!]!) { \
        stagedUploadsCreate(input: $input) { \
            stagedTargets { url resourceUrl parameters { name value } } \
            userErrors { field message } \
        } \
    }";

const FILE_CREATE: &str = "\
    mutation fileCreate($files: [FileCreateInput!]!) { \
        fileCreate(files: $files) { \
            files { \
                id fileStatus \
                ... on GenericFile { url } \
                ... on MediaImage { image { url } } \
            } \
            userErrors { field message } \
        } \
    }";

const FILE_BY_ID: &str = "\
    query fileById($id: ID!) { \
        node(id: $id) { \
            ... on GenericFile { id fileStatus url } \
            ... on MediaImage { id fileStatus image { url } } \
        } \
    }";

const ACTIVE_SUBSCRIPTIONS: &str = "\
    query activeSubscriptions { \
        app { installation { activeSubscriptions { name } } } \
    }";

/// Client for the Shopify Admin GraphQL API.
///
/// Holds one HTTP client and the Admin access token; the shop domain is
/// supplied per call and selects the endpoint
/// `https://{shop}/admin/api/{version}/graphql.json`. Use
/// [`ShopifyAdminClient::with_base_url`] to point every call at a mock server
/// in tests regardless of the shop argument.
#[derive(Debug)]
pub struct ShopifyAdminClient {
    client: Client,
    access_token: String,
    api_version: String,
    max_retries: u32,
    retry_backoff_base_ms: u64,
    base_url: Option<Url>,
}

impl ShopifyAdminClient {
    /// Creates a new client that resolves endpoints from the shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        access_token: &str,
        api_version: &str,
        timeout_secs: u64,
        max_retries: u32,
        retry_backoff_base_ms: u64,
    ) -> Result<Self, ShopifyError> {
        Self::build(
            access_token,
            api_version,
            timeout_secs,
            max_retries,
            retry_backoff_base_ms,
            None,
        )
    }

    /// Creates a new client with a fixed base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ShopifyError::Api`] if `base_url` is not
    /// a valid URL.
    pub fn with_base_url(
        access_token: &str,
        api_version: &str,
        timeout_secs: u64,
        max_retries: u32,
        retry_backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, ShopifyError> {
        // Normalise: ensure the override ends with exactly one slash so the
        // graphql.json path lands under it rather than replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let url = Url::parse(&normalised)
            .map_err(|e| ShopifyError::Api(format!("invalid base URL '{base_url}': {e}")))?;
        Self::build(
            access_token,
            api_version,
            timeout_secs,
            max_retries,
            retry_backoff_base_ms,
            Some(url),
        )
    }

    fn build(
        access_token: &str,
        api_version: &str,
        timeout_secs: u64,
        max_retries: u32,
        retry_backoff_base_ms: u64,
        base_url: Option<Url>,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("fitform/0.1 (custom-size-forms)")
            .build()?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            api_version: api_version.to_owned(),
            max_retries,
            retry_backoff_base_ms,
            base_url,
        })
    }

    /// Requests a presigned upload target for a file the browser will post
    /// directly to Shopify's storage.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::Api`] on GraphQL errors, `userErrors`, or an empty
    ///   target list.
    /// - [`ShopifyError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ShopifyError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn staged_uploads_create(
        &self,
        shop: &str,
        filename: &str,
        mime_type: &str,
    ) -> Result<StagedTarget, ShopifyError> {
        let variables = serde_json::json!({
            "input": [{
                "filename": filename,
                "mimeType": mime_type,
                "resource": "IMAGE",
                "httpMethod": "POST",
            }]
        });
        let data = self
            .graphql(shop, STAGED_UPLOADS_CREATE, variables, "stagedUploadsCreate")
            .await?;
        let payload: StagedUploadsCreatePayload = Self::payload(&data, "stagedUploadsCreate")?;
        Self::check_user_errors(&payload.user_errors, "stagedUploadsCreate")?;
        payload.staged_targets.into_iter().next().ok_or_else(|| {
            ShopifyError::Api("stagedUploadsCreate returned no staged targets".to_owned())
        })
    }

    /// Registers an uploaded staged resource as a Shopify file.
    ///
    /// The returned [`CreatedFile`] often has no URL yet; Shopify assigns one
    /// asynchronously. Poll with [`ShopifyAdminClient::wait_for_file_url`].
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::Api`] on GraphQL errors, `userErrors`, or an empty
    ///   file list.
    /// - [`ShopifyError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ShopifyError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn file_create(
        &self,
        shop: &str,
        resource_url: &str,
    ) -> Result<CreatedFile, ShopifyError> {
        let variables = serde_json::json!({
            "files": [{
                "originalSource": resource_url,
                "contentType": "IMAGE",
            }]
        });
        let data = self.graphql(shop, FILE_CREATE, variables, "fileCreate").await?;
        let payload: FileCreatePayload = Self::payload(&data, "fileCreate")?;
        Self::check_user_errors(&payload.user_errors, "fileCreate")?;
        payload
            .files
            .into_iter()
            .next()
            .map(CreatedFile::from)
            .ok_or_else(|| ShopifyError::Api("fileCreate returned no files".to_owned()))
    }

    /// Fetches the current state of a file by its GraphQL ID.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::Api`] on GraphQL errors or when no node exists for
    ///   `file_id`.
    /// - [`ShopifyError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ShopifyError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn get_file(&self, shop: &str, file_id: &str) -> Result<CreatedFile, ShopifyError> {
        let variables = serde_json::json!({ "id": file_id });
        let data = self.graphql(shop, FILE_BY_ID, variables, "fileById").await?;
        let node: Option<FileNode> = Self::payload(&data, "node")?;
        node.map(CreatedFile::from)
            .ok_or_else(|| ShopifyError::Api(format!("file {file_id} not found")))
    }

    /// Polls [`ShopifyAdminClient::get_file`] until the file has a URL or the
    /// retry budget is spent.
    ///
    /// Returns the last observed state either way; a missing URL after the
    /// final attempt is not an error, callers decide how to report it.
    ///
    /// # Errors
    ///
    /// Propagates the first [`ShopifyError`] from the underlying poll calls.
    pub async fn wait_for_file_url(
        &self,
        shop: &str,
        file_id: &str,
        retries: u32,
        delay_ms: u64,
    ) -> Result<CreatedFile, ShopifyError> {
        let mut file = self.get_file(shop, file_id).await?;
        let mut attempt = 0u32;
        while file.url.is_none() && attempt < retries {
            attempt += 1;
            tracing::debug!(file_id, attempt, "file URL not ready, polling again");
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            file = self.get_file(shop, file_id).await?;
        }
        Ok(file)
    }

    /// Returns the name of the shop's first active app subscription, or
    /// `None` when the app has no installation or no paid subscription.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::Api`] on GraphQL errors.
    /// - [`ShopifyError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ShopifyError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn active_subscription_plan(
        &self,
        shop: &str,
    ) -> Result<Option<String>, ShopifyError> {
        let data = self
            .graphql(
                shop,
                ACTIVE_SUBSCRIPTIONS,
                serde_json::json!({}),
                "activeSubscriptions",
            )
            .await?;
        let app: Option<AppRoot> = Self::payload(&data, "app")?;
        Ok(app
            .and_then(|root| root.installation)
            .and_then(|installation| installation.active_subscriptions.into_iter().next())
            .map(|subscription| subscription.name))
    }

    /// Builds the Admin GraphQL endpoint for a shop, honouring the test
    /// base-URL override when one is set.
    fn endpoint_for(&self, shop: &str) -> Result<Url, ShopifyError> {
        let raw = match &self.base_url {
            Some(base) => format!("{base}admin/api/{}/graphql.json", self.api_version),
            None => format!("https://{shop}/admin/api/{}/graphql.json", self.api_version),
        };
        Url::parse(&raw).map_err(|e| ShopifyError::Api(format!("invalid shop domain '{shop}': {e}")))
    }

    /// Executes one GraphQL operation with retry, returning the `data` field.
    async fn graphql(
        &self,
        shop: &str,
        query: &str,
        variables: serde_json::Value,
        op: &str,
    ) -> Result<serde_json::Value, ShopifyError> {
        let url = self.endpoint_for(shop)?;
        let body = serde_json::json!({ "query": query, "variables": variables });
        let envelope = retry::retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            self.post_graphql(&url, &body)
        })
        .await?;
        Self::check_graphql_errors(&envelope, op)?;
        envelope
            .get("data")
            .cloned()
            .ok_or_else(|| ShopifyError::Api(format!("{op}: response carried no data")))
    }

    /// Sends one POST, asserts a 2xx HTTP status, and parses the response
    /// body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] on network failure or a non-2xx status.
    /// Returns [`ShopifyError::Deserialize`] if the body is not valid JSON.
    async fn post_graphql(
        &self,
        url: &Url,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ShopifyError> {
        let response = self
            .client
            .post(url.clone())
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(body)
            .send()
            .await?;
        let response = response.error_for_status()?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ShopifyError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Checks the top-level `"errors"` array and returns an error if it is
    /// present and non-empty.
    fn check_graphql_errors(body: &serde_json::Value, op: &str) -> Result<(), ShopifyError> {
        let Some(errors) = body.get("errors").and_then(serde_json::Value::as_array) else {
            return Ok(());
        };
        if errors.is_empty() {
            return Ok(());
        }
        let joined = errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unknown error")
            })
            .collect::<Vec<_>>()
            .join("; ");
        Err(ShopifyError::Api(format!("{op}: {joined}")))
    }

    /// Surfaces mutation-level `userErrors` as [`ShopifyError::Api`].
    fn check_user_errors(errors: &[UserError], op: &str) -> Result<(), ShopifyError> {
        if errors.is_empty() {
            return Ok(());
        }
        let joined = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Err(ShopifyError::Api(format!("{op}: {joined}")))
    }

    /// Extracts and deserializes one named payload out of the `data` object.
    fn payload<T: serde::de::DeserializeOwned>(
        data: &serde_json::Value,
        op: &str,
    ) -> Result<T, ShopifyError> {
        let value = data.get(op).cloned().unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value).map_err(|e| ShopifyError::Deserialize {
            context: op.to_owned(),
            source: e,
        })
    }
}
