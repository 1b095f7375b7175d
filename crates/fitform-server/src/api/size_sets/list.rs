//! GET /api/v1/size-sets — dashboard list with fields, position order.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use fitform_db::FieldRow;

use crate::middleware::RequestId;

use super::super::{map_sqlx_error, ApiError, ApiResponse, AppState, ResponseMeta, ShopQuery};
use super::SizeSetItem;

pub(in crate::api) async fn list_size_sets(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<ApiResponse<Vec<SizeSetItem>>>, ApiError> {
    let shop = super::super::require_param(&req_id.0, query.shop.as_deref(), "shop")?;

    let rows = fitform_db::list_sets_for_shop(&state.pool, shop)
        .await
        .map_err(|e| map_sqlx_error(req_id.0.clone(), &e))?;

    let set_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let field_rows = fitform_db::list_fields_for_sets(&state.pool, &set_ids)
        .await
        .map_err(|e| map_sqlx_error(req_id.0.clone(), &e))?;

    let mut fields_by_set: HashMap<i64, Vec<FieldRow>> = HashMap::new();
    for field in field_rows {
        fields_by_set.entry(field.set_id).or_default().push(field);
    }

    let data = rows
        .into_iter()
        .map(|row| {
            let fields = fields_by_set.remove(&row.id).unwrap_or_default();
            SizeSetItem::from_parts(row, fields)
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
