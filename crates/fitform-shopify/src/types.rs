//! Shopify Admin GraphQL payload types.
//!
//! All types model the JSON payloads returned by the Admin GraphQL API.
//! Shopify wraps every response in a `{"data": ..., "errors": [...]}`
//! envelope; the client strips the envelope and deserializes the per-operation
//! payloads into these types.

use serde::{Deserialize, Serialize};

/// One mutation-level user error (`userErrors { field message }`).
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

// ---------------------------------------------------------------------------
// stagedUploadsCreate
// ---------------------------------------------------------------------------

/// One form parameter the browser must echo when posting to a staged target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedParameter {
    pub name: String,
    pub value: String,
}

/// A presigned upload destination returned by `stagedUploadsCreate`.
///
/// The browser posts the raw file to `url` with `parameters` as extra form
/// fields; `resource_url` is then handed back to the server to finalize the
/// upload via `fileCreate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedTarget {
    pub url: String,
    pub resource_url: String,
    #[serde(default)]
    pub parameters: Vec<StagedParameter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedUploadsCreatePayload {
    #[serde(default)]
    pub staged_targets: Vec<StagedTarget>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

// ---------------------------------------------------------------------------
// fileCreate / node polling
// ---------------------------------------------------------------------------

/// Raw file node as Shopify returns it. `GenericFile` carries a top-level
/// `url`; `MediaImage` nests it under `image.url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub id: String,
    #[serde(default)]
    pub file_status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagePayload {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCreatePayload {
    #[serde(default)]
    pub files: Vec<FileNode>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

/// A created file with the URL flattened out of whichever node shape
/// Shopify returned.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedFile {
    pub id: String,
    /// CDN URL; absent until Shopify finishes processing the file.
    pub url: Option<String>,
    /// Shopify file status (`UPLOADED`, `PROCESSING`, `READY`, `FAILED`).
    pub status: String,
}

impl From<FileNode> for CreatedFile {
    fn from(node: FileNode) -> Self {
        let url = node.url.or_else(|| node.image.and_then(|image| image.url));
        Self {
            id: node.id,
            url,
            status: node.file_status.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// activeSubscriptions
// ---------------------------------------------------------------------------

/// One active app subscription as returned by `activeSubscriptions`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSubscription {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInstallation {
    #[serde(default)]
    pub active_subscriptions: Vec<AppSubscription>,
}

/// Wrapper for the `app` query root; `installation` is null when the app
/// is not installed on the shop.
#[derive(Debug, Deserialize)]
pub struct AppRoot {
    #[serde(default)]
    pub installation: Option<AppInstallation>,
}
