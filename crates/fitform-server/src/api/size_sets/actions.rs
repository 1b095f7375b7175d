//! POST /api/v1/size-sets/actions — form-encoded mutations.
//!
//! The dashboard posts `_action=delete|reorder|reorder_all` with the
//! arguments each action needs. Unknown actions are a 400.

use axum::{extract::State, Extension, Form, Json};
use fitform_db::{DbError, ReorderDirection};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::super::{map_db_error, require_param, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ActionForm {
    #[serde(rename = "_action")]
    pub action: String,
    pub shop: Option<String>,
    pub id: Option<i64>,
    pub direction: Option<String>,
    /// Comma-joined id list for `reorder_all`.
    pub ids: Option<String>,
}

pub(in crate::api) async fn apply_action(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Form(form): Form<ActionForm>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let shop = require_param(rid, form.shop.as_deref(), "shop")?;

    let data = match form.action.as_str() {
        "delete" => delete_set(&state, rid, shop, form.id).await?,
        "reorder" => reorder_set(&state, rid, shop, form.id, form.direction.as_deref()).await?,
        "reorder_all" => reorder_all_sets(&state, rid, shop, form.ids.as_deref()).await?,
        other => {
            return Err(ApiError::new(
                rid,
                "bad_request",
                format!("unknown _action '{other}'"),
            ))
        }
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn require_id(rid: &str, id: Option<i64>) -> Result<i64, ApiError> {
    id.ok_or_else(|| ApiError::new(rid, "validation_error", "id is required"))
}

async fn delete_set(
    state: &AppState,
    rid: &str,
    shop: &str,
    id: Option<i64>,
) -> Result<serde_json::Value, ApiError> {
    let id = require_id(rid, id)?;
    let deleted = fitform_db::delete_set(&state.pool, shop, id)
        .await
        .map_err(|e| map_db_error(rid.to_owned(), &e))?;
    if !deleted {
        return Err(ApiError::new(
            rid,
            "not_found",
            format!("size set {id} not found"),
        ));
    }
    Ok(serde_json::json!({ "deleted": true }))
}

async fn reorder_set(
    state: &AppState,
    rid: &str,
    shop: &str,
    id: Option<i64>,
    direction: Option<&str>,
) -> Result<serde_json::Value, ApiError> {
    let id = require_id(rid, id)?;
    let direction = match direction {
        Some("up") => ReorderDirection::Up,
        Some("down") => ReorderDirection::Down,
        _ => {
            return Err(ApiError::new(
                rid,
                "validation_error",
                "direction must be 'up' or 'down'",
            ))
        }
    };

    // A swap at the top or bottom edge is a no-op, reported as moved=false.
    let moved = fitform_db::swap_positions(&state.pool, shop, id, direction)
        .await
        .map_err(|e| match e {
            DbError::NotFound => {
                ApiError::new(rid, "not_found", format!("size set {id} not found"))
            }
            other => map_db_error(rid.to_owned(), &other),
        })?;

    Ok(serde_json::json!({ "moved": moved }))
}

async fn reorder_all_sets(
    state: &AppState,
    rid: &str,
    shop: &str,
    ids: Option<&str>,
) -> Result<serde_json::Value, ApiError> {
    let raw = ids.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        ApiError::new(rid, "validation_error", "ids is required for reorder_all")
    })?;

    let ids = parse_id_list(raw).map_err(|_| {
        ApiError::new(
            rid,
            "validation_error",
            "ids must be a comma-separated list of numeric ids",
        )
    })?;

    // InvalidReorder (not the shop's exact permutation) maps to a 400.
    fitform_db::reorder_all(&state.pool, shop, &ids)
        .await
        .map_err(|e| map_db_error(rid.to_owned(), &e))?;

    Ok(serde_json::json!({ "reordered": ids.len() }))
}

fn parse_id_list(raw: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_id_list;

    #[test]
    fn id_list_parses_and_trims() {
        assert_eq!(parse_id_list("3, 1 ,2").expect("valid list"), vec![3, 1, 2]);
        assert_eq!(parse_id_list("7,").expect("trailing comma ok"), vec![7]);
    }

    #[test]
    fn id_list_rejects_non_numeric_entries() {
        assert!(parse_id_list("1,two,3").is_err());
    }
}
