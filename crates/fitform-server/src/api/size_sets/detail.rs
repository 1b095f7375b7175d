//! GET /api/v1/size-sets/{id} — one set with its ordered fields.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::middleware::RequestId;

use super::super::{
    map_sqlx_error, require_param, ApiError, ApiResponse, AppState, ResponseMeta, ShopQuery,
};
use super::SizeSetItem;

pub(in crate::api) async fn get_size_set(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<ApiResponse<SizeSetItem>>, ApiError> {
    let shop = require_param(&req_id.0, query.shop.as_deref(), "shop")?;

    let row = fitform_db::get_set(&state.pool, shop, id)
        .await
        .map_err(|e| map_sqlx_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(req_id.0.clone(), "not_found", format!("size set {id} not found"))
        })?;

    let fields = fitform_db::list_fields_for_set(&state.pool, row.id)
        .await
        .map_err(|e| map_sqlx_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: SizeSetItem::from_parts(row, fields),
        meta: ResponseMeta::new(req_id.0),
    }))
}
