//! Image upload proxy handlers.
//!
//! Two-step flow against the Shopify Admin API: `stage` reserves a presigned
//! target the browser posts the raw bytes to, `finalize` registers the
//! uploaded resource as a Shopify file and polls until the CDN URL is issued.
//! Both routes are merchant actions and fail closed with a visible error.

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use fitform_shopify::{CreatedFile, ShopifyAdminClient, ShopifyError, StagedTarget};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{require_param, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct StageBody {
    pub shop: Option<String>,
    pub filename: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
pub(super) struct StageData {
    pub target: StagedTarget,
}

#[derive(Debug, Deserialize)]
pub(super) struct FinalizeBody {
    pub shop: Option<String>,
    pub resource_url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct FinalizeData {
    /// Set when the CDN URL was still unissued after polling; the file id can
    /// be retried later. This is a partial success, not a failure.
    pub error: Option<String>,
    pub file: CreatedFile,
}

pub(super) async fn stage_upload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<StageBody>,
) -> Result<Json<ApiResponse<StageData>>, ApiError> {
    let rid = &req_id.0;
    let client = require_client(state.shopify.as_ref(), rid)?;
    let shop = require_param(rid, body.shop.as_deref(), "shop")?;

    let filename = body.filename.trim();
    if filename.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "filename must not be empty",
        ));
    }
    let mime_type = body.mime_type.trim();
    if mime_type.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "mime_type must not be empty",
        ));
    }

    let target = client
        .staged_uploads_create(shop, filename, mime_type)
        .await
        .map_err(|e| map_shopify_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: StageData { target },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn finalize_upload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<FinalizeBody>,
) -> Result<Json<ApiResponse<FinalizeData>>, ApiError> {
    let rid = &req_id.0;
    let client = require_client(state.shopify.as_ref(), rid)?;
    let shop = require_param(rid, body.shop.as_deref(), "shop")?;

    let resource_url = body.resource_url.trim();
    if resource_url.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "resource_url must not be empty",
        ));
    }

    let created = client
        .file_create(shop, resource_url)
        .await
        .map_err(|e| map_shopify_error(rid.clone(), &e))?;

    let file = client
        .wait_for_file_url(
            shop,
            &created.id,
            state.upload_poll_retries,
            state.upload_poll_delay_ms,
        )
        .await
        .map_err(|e| map_shopify_error(rid.clone(), &e))?;

    let error = if file.url.is_none() {
        tracing::debug!(file_id = %file.id, status = %file.status, "file URL still pending after polling");
        Some("file is still processing; retry with the returned id".to_owned())
    } else {
        None
    };

    Ok(Json(ApiResponse {
        data: FinalizeData { error, file },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn require_client<'a>(
    shopify: Option<&'a Arc<ShopifyAdminClient>>,
    rid: &str,
) -> Result<&'a ShopifyAdminClient, ApiError> {
    shopify
        .map(Arc::as_ref)
        .ok_or_else(|| ApiError::new(rid, "upstream_error", "admin API not configured"))
}

/// Upload calls fail closed: GraphQL-level errors become 400s the merchant
/// can act on, anything else is a 502.
fn map_shopify_error(rid: String, error: &ShopifyError) -> ApiError {
    match error {
        ShopifyError::Api(message) => ApiError::new(rid, "bad_request", message.clone()),
        other => {
            tracing::error!(error = %other, "Shopify Admin API call failed");
            ApiError::new(rid, "upstream_error", "Shopify Admin API request failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_client_is_an_upstream_error() {
        let err = require_client(None, "req-1").unwrap_err();
        assert_eq!(err.error.code, "upstream_error");
        assert!(err.error.message.contains("not configured"));
    }

    #[test]
    fn user_errors_map_to_bad_request() {
        let err = map_shopify_error(
            "req-1".to_owned(),
            &ShopifyError::Api("fileCreate: Original source is invalid".to_owned()),
        );
        assert_eq!(err.error.code, "bad_request");
        assert!(err.error.message.contains("Original source"));
    }

    #[test]
    fn transport_errors_map_to_upstream_error() {
        let err = map_shopify_error("req-1".to_owned(), &ShopifyError::MissingToken);
        assert_eq!(err.error.code, "upstream_error");
    }
}
