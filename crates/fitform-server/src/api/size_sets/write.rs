//! Size-set write handlers: create and full update.
//! Form-style mutations (delete, reorder) live in `actions`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use fitform_core::seeds::MAX_FIELDS_PER_SET;
use fitform_core::{slugify, CoreError, DisplayStyle, InputType, PlanLimits};
use fitform_db::{NewField, NewSizeSet, PresentationAxes};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::super::{
    map_db_error, map_sqlx_error, require_param, ApiError, ApiResponse, AppState, ResponseMeta,
};
use super::SizeSetItem;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Shared body for create and full update. PUT replaces the whole set, so
/// absent optional fields reset to their defaults.
#[derive(Debug, Deserialize)]
pub(in crate::api) struct SizeSetBody {
    pub shop: Option<String>,
    pub name: String,
    pub trigger_variant: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub note_title: String,
    #[serde(default)]
    pub note_content: String,
    #[serde(default)]
    pub require_nearest_size: bool,
    #[serde(default)]
    pub display_style: Option<String>,
    #[serde(default)]
    pub desktop: Option<AxesBody>,
    #[serde(default)]
    pub mobile: Option<AxesBody>,
    #[serde(default)]
    pub fields: Vec<FieldBody>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct AxesBody {
    #[serde(default)]
    pub image_position: Option<String>,
    #[serde(default)]
    pub image_width: Option<String>,
    #[serde(default)]
    pub image_height: Option<String>,
    #[serde(default)]
    pub image_container_width: Option<String>,
    #[serde(default)]
    pub fields_container_width: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct FieldBody {
    pub label: String,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: String,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn invalid(rid: &str, error: &CoreError) -> ApiError {
    ApiError::new(rid, "validation_error", error.to_string())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn validate_image_url(rid: &str, value: &str) -> Result<(), ApiError> {
    reqwest::Url::parse(value).map(|_| ()).map_err(|_| {
        ApiError::new(
            rid,
            "validation_error",
            format!("image_url must be a valid URL, got '{value}'"),
        )
    })
}

fn build_axes(rid: &str, body: Option<&AxesBody>) -> Result<PresentationAxes, ApiError> {
    let mut axes = PresentationAxes::default();
    let Some(body) = body else {
        return Ok(axes);
    };
    if let Some(position) = &body.image_position {
        axes.image_position = position.parse().map_err(|e: CoreError| invalid(rid, &e))?;
    }
    if let Some(width) = non_empty(&body.image_width) {
        axes.image_width = width;
    }
    if let Some(height) = non_empty(&body.image_height) {
        axes.image_height = height;
    }
    if let Some(width) = non_empty(&body.image_container_width) {
        axes.image_container_width = width;
    }
    if let Some(width) = non_empty(&body.fields_container_width) {
        axes.fields_container_width = width;
    }
    Ok(axes)
}

/// Validates a request body and converts it into a database input record.
fn build_new_set(rid: &str, body: &SizeSetBody) -> Result<NewSizeSet, ApiError> {
    let name = body.name.trim().to_owned();
    if name.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "name must not be empty",
        ));
    }
    if name.len() > 200 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "name must be at most 200 characters",
        ));
    }

    let trigger_variant = body.trigger_variant.trim().to_owned();
    if trigger_variant.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "trigger_variant must not be empty",
        ));
    }
    // A trigger that slugifies to nothing could never match any variant key.
    if slugify(&trigger_variant).is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "trigger_variant must contain at least one letter or digit",
        ));
    }

    if body.fields.len() > MAX_FIELDS_PER_SET {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("a size set may have at most {MAX_FIELDS_PER_SET} fields"),
        ));
    }

    let image_url = non_empty(&body.image_url);
    if let Some(ref url) = image_url {
        validate_image_url(rid, url)?;
    }

    let display_style = match &body.display_style {
        Some(style) => style.parse().map_err(|e: CoreError| invalid(rid, &e))?,
        None => DisplayStyle::Inline,
    };

    let mut fields = Vec::with_capacity(body.fields.len());
    for field in &body.fields {
        let label = field.label.trim().to_owned();
        if label.is_empty() {
            return Err(ApiError::new(
                rid,
                "validation_error",
                "field labels must not be empty",
            ));
        }
        let input_type = match &field.input_type {
            Some(kind) => kind.parse().map_err(|e: CoreError| invalid(rid, &e))?,
            None => InputType::Text,
        };
        fields.push(NewField {
            label,
            input_type,
            required: field.required,
            placeholder: field.placeholder.trim().to_owned(),
        });
    }

    Ok(NewSizeSet {
        name,
        trigger_variant,
        image_url,
        note_title: body.note_title.trim().to_owned(),
        note_content: body.note_content.trim().to_owned(),
        require_nearest_size: body.require_nearest_size,
        display_style,
        desktop: build_axes(rid, body.desktop.as_ref())?,
        mobile: build_axes(rid, body.mobile.as_ref())?,
        fields,
    })
}

/// Resolves plan limits, failing open to unlimited when the policy lookup
/// errors.
async fn effective_limits(state: &AppState, shop: &str) -> PlanLimits {
    match state.entitlement.limits_for(shop).await {
        Ok(limits) => limits,
        Err(e) => {
            tracing::warn!(shop, error = %e, "entitlement lookup failed; not enforcing plan limits");
            PlanLimits {
                max_sets: None,
                max_fields_per_set: None,
            }
        }
    }
}

fn check_field_allowance(
    rid: &str,
    limits: &PlanLimits,
    requested: usize,
) -> Result<(), ApiError> {
    let Some(max_fields) = limits.max_fields_per_set else {
        return Ok(());
    };
    if requested > usize::try_from(max_fields).unwrap_or(usize::MAX) {
        return Err(ApiError::new(
            rid,
            "plan_limit",
            format!("current plan allows at most {max_fields} fields per size set"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/size-sets — create a set with its fields.
pub(in crate::api) async fn create_size_set(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SizeSetBody>,
) -> Result<(StatusCode, Json<ApiResponse<SizeSetItem>>), ApiError> {
    let rid = &req_id.0;
    let shop = require_param(rid, body.shop.as_deref(), "shop")?;
    let new_set = build_new_set(rid, &body)?;

    let limits = effective_limits(&state, shop).await;
    check_field_allowance(rid, &limits, new_set.fields.len())?;
    if let Some(max_sets) = limits.max_sets {
        let existing = fitform_db::count_sets_for_shop(&state.pool, shop)
            .await
            .map_err(|e| map_sqlx_error(rid.clone(), &e))?;
        if existing >= i64::from(max_sets) {
            return Err(ApiError::new(
                rid,
                "plan_limit",
                format!("current plan allows at most {max_sets} size sets"),
            ));
        }
    }

    let (row, fields) = fitform_db::create_set(&state.pool, shop, &new_set)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: SizeSetItem::from_parts(row, fields),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PUT /api/v1/size-sets/{id} — full update; fields are replaced wholesale.
pub(in crate::api) async fn update_size_set(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<SizeSetBody>,
) -> Result<Json<ApiResponse<SizeSetItem>>, ApiError> {
    let rid = &req_id.0;
    let shop = require_param(rid, body.shop.as_deref(), "shop")?;
    let new_set = build_new_set(rid, &body)?;

    let limits = effective_limits(&state, shop).await;
    check_field_allowance(rid, &limits, new_set.fields.len())?;

    let (row, fields) = fitform_db::update_set(&state.pool, shop, id, &new_set)
        .await
        .map_err(|e| match e {
            fitform_db::DbError::NotFound => {
                ApiError::new(rid, "not_found", format!("size set {id} not found"))
            }
            other => map_db_error(rid.clone(), &other),
        })?;

    Ok(Json(ApiResponse {
        data: SizeSetItem::from_parts(row, fields),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_from_json(value: serde_json::Value) -> SizeSetBody {
        serde_json::from_value(value).expect("body should deserialize")
    }

    #[test]
    fn build_new_set_requires_a_name() {
        let body = body_from_json(serde_json::json!({
            "name": "   ",
            "trigger_variant": "Custom Size",
        }));
        let err = build_new_set("req-1", &body).unwrap_err();
        assert_eq!(err.error.code, "validation_error");
        assert!(err.error.message.contains("name"));
    }

    #[test]
    fn build_new_set_requires_a_matchable_trigger() {
        let body = body_from_json(serde_json::json!({
            "name": "Curtains",
            "trigger_variant": "!!!",
        }));
        let err = build_new_set("req-1", &body).unwrap_err();
        assert!(err.error.message.contains("letter or digit"));
    }

    #[test]
    fn build_new_set_rejects_unknown_display_style() {
        let body = body_from_json(serde_json::json!({
            "name": "Curtains",
            "trigger_variant": "Custom Size",
            "display_style": "popup",
        }));
        let err = build_new_set("req-1", &body).unwrap_err();
        assert_eq!(err.error.code, "validation_error");
        assert!(err.error.message.contains("popup"));
    }

    #[test]
    fn build_new_set_caps_the_field_count() {
        let fields: Vec<serde_json::Value> = (0..=MAX_FIELDS_PER_SET)
            .map(|i| serde_json::json!({ "label": format!("Field {i}") }))
            .collect();
        let body = body_from_json(serde_json::json!({
            "name": "Curtains",
            "trigger_variant": "Custom Size",
            "fields": fields,
        }));
        let err = build_new_set("req-1", &body).unwrap_err();
        assert!(err.error.message.contains("at most 50"));
    }

    #[test]
    fn build_new_set_applies_defaults() {
        let body = body_from_json(serde_json::json!({
            "name": "Curtains",
            "trigger_variant": "Custom Size",
            "fields": [{ "label": "Width (cm)" }],
        }));
        let set = build_new_set("req-1", &body).expect("minimal body is valid");
        assert_eq!(set.display_style, DisplayStyle::Inline);
        assert_eq!(set.fields[0].input_type, InputType::Text);
        assert_eq!(set.desktop.image_width, "auto");
        assert!(set.image_url.is_none());
    }

    #[test]
    fn build_new_set_rejects_a_bad_image_url() {
        let body = body_from_json(serde_json::json!({
            "name": "Curtains",
            "trigger_variant": "Custom Size",
            "image_url": "not a url",
        }));
        let err = build_new_set("req-1", &body).unwrap_err();
        assert!(err.error.message.contains("image_url"));
    }

    #[test]
    fn field_allowance_enforces_known_limits_only() {
        let unlimited = PlanLimits {
            max_sets: None,
            max_fields_per_set: None,
        };
        assert!(check_field_allowance("req-1", &unlimited, 40).is_ok());

        let free = PlanLimits {
            max_sets: Some(1),
            max_fields_per_set: Some(3),
        };
        assert!(check_field_allowance("req-1", &free, 3).is_ok());
        let err = check_field_allowance("req-1", &free, 4).unwrap_err();
        assert_eq!(err.error.code, "plan_limit");
    }
}
