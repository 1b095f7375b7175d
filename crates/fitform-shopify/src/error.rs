//! Error types for the Shopify Admin API client.

use thiserror::Error;

/// Errors returned by [`crate::ShopifyAdminClient`] operations.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// Network-level failure or non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The GraphQL response carried top-level `errors` or mutation `userErrors`.
    #[error("Shopify API error: {0}")]
    Api(String),

    /// A response body did not match the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// No Admin API access token is configured for this deployment.
    #[error("no Shopify Admin API access token configured")]
    MissingToken,
}
