//! Shop design settings handlers.
//!
//! - `GET /api/v1/design?shop=` — saved design, or the defaults when the
//!   shop has never customized anything
//! - `PUT /api/v1/design`       — validated full upsert

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use fitform_core::CoreError;
use fitform_db::{DesignRow, NewDesign};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_sqlx_error, require_param, ApiError, ApiResponse, AppState, ResponseMeta, ShopQuery};

const MAX_BORDER_WIDTH: i32 = 20;

#[derive(Debug, Serialize)]
pub(super) struct DesignItem {
    image_layout: String,
    modal_bg_color: String,
    border_width: i32,
    border_style: String,
    border_color: String,
    text_color: String,
    placeholder_color: String,
    title_color: String,
    note_color: String,
    note_bg_color: String,
    title_font_size: String,
    note_font_size: String,
    field_font_size: String,
    mobile_title_font_size: String,
    mobile_note_font_size: String,
    mobile_field_font_size: String,
    custom_css: String,
}

/// Full-replace body; absent fields reset to defaults. The dashboard always
/// sends the complete design form.
#[derive(Debug, Deserialize)]
pub(super) struct DesignBody {
    pub shop: Option<String>,
    #[serde(default)]
    pub image_layout: Option<String>,
    #[serde(default)]
    pub modal_bg_color: Option<String>,
    #[serde(default)]
    pub border_width: Option<i32>,
    #[serde(default)]
    pub border_style: Option<String>,
    #[serde(default)]
    pub border_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub placeholder_color: Option<String>,
    #[serde(default)]
    pub title_color: Option<String>,
    #[serde(default)]
    pub note_color: Option<String>,
    #[serde(default)]
    pub note_bg_color: Option<String>,
    #[serde(default)]
    pub title_font_size: Option<String>,
    #[serde(default)]
    pub note_font_size: Option<String>,
    #[serde(default)]
    pub field_font_size: Option<String>,
    #[serde(default)]
    pub mobile_title_font_size: Option<String>,
    #[serde(default)]
    pub mobile_note_font_size: Option<String>,
    #[serde(default)]
    pub mobile_field_font_size: Option<String>,
    #[serde(default)]
    pub custom_css: Option<String>,
}

pub(super) async fn get_design(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<ApiResponse<DesignItem>>, ApiError> {
    let shop = require_param(&req_id.0, query.shop.as_deref(), "shop")?;

    let data = fitform_db::get_design(&state.pool, shop)
        .await
        .map_err(|e| map_sqlx_error(req_id.0.clone(), &e))?
        .map_or_else(|| DesignItem::from(NewDesign::default()), DesignItem::from);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn update_design(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<DesignBody>,
) -> Result<Json<ApiResponse<DesignItem>>, ApiError> {
    let rid = &req_id.0;
    let shop = require_param(rid, body.shop.as_deref(), "shop")?;
    let design = build_design(rid, &body)?;

    let row = fitform_db::upsert_design(&state.pool, shop, &design)
        .await
        .map_err(|e| map_sqlx_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: DesignItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn is_hex_color(value: &str) -> bool {
    value.len() == 7 && value.starts_with('#') && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn validated_color(rid: &str, name: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if is_hex_color(value) {
        Ok(value.to_ascii_lowercase())
    } else {
        Err(ApiError::new(
            rid,
            "validation_error",
            format!("{name} must be a #rrggbb color, got '{value}'"),
        ))
    }
}

fn build_design(rid: &str, body: &DesignBody) -> Result<NewDesign, ApiError> {
    let mut design = NewDesign::default();

    if let Some(layout) = &body.image_layout {
        design.image_layout = layout.parse().map_err(|e: CoreError| {
            ApiError::new(rid, "validation_error", e.to_string())
        })?;
    }
    if let Some(style) = &body.border_style {
        design.border_style = style.parse().map_err(|e: CoreError| {
            ApiError::new(rid, "validation_error", e.to_string())
        })?;
    }
    if let Some(width) = body.border_width {
        if !(0..=MAX_BORDER_WIDTH).contains(&width) {
            return Err(ApiError::new(
                rid,
                "validation_error",
                format!("border_width must be between 0 and {MAX_BORDER_WIDTH}"),
            ));
        }
        design.border_width = width;
    }

    let colors: [(&str, &Option<String>, &mut String); 7] = [
        ("modal_bg_color", &body.modal_bg_color, &mut design.modal_bg_color),
        ("border_color", &body.border_color, &mut design.border_color),
        ("text_color", &body.text_color, &mut design.text_color),
        ("placeholder_color", &body.placeholder_color, &mut design.placeholder_color),
        ("title_color", &body.title_color, &mut design.title_color),
        ("note_color", &body.note_color, &mut design.note_color),
        ("note_bg_color", &body.note_bg_color, &mut design.note_bg_color),
    ];
    for (name, value, slot) in colors {
        if let Some(color) = value {
            *slot = validated_color(rid, name, color)?;
        }
    }

    let fonts: [(&Option<String>, &mut String); 6] = [
        (&body.title_font_size, &mut design.title_font_size),
        (&body.note_font_size, &mut design.note_font_size),
        (&body.field_font_size, &mut design.field_font_size),
        (&body.mobile_title_font_size, &mut design.mobile_title_font_size),
        (&body.mobile_note_font_size, &mut design.mobile_note_font_size),
        (&body.mobile_field_font_size, &mut design.mobile_field_font_size),
    ];
    for (value, slot) in fonts {
        if let Some(size) = value {
            let trimmed = size.trim();
            if !trimmed.is_empty() {
                *slot = trimmed.to_owned();
            }
        }
    }

    if let Some(css) = &body.custom_css {
        design.custom_css = css.clone();
    }

    Ok(design)
}

impl From<DesignRow> for DesignItem {
    fn from(row: DesignRow) -> Self {
        Self {
            image_layout: row.image_layout,
            modal_bg_color: row.modal_bg_color,
            border_width: row.border_width,
            border_style: row.border_style,
            border_color: row.border_color,
            text_color: row.text_color,
            placeholder_color: row.placeholder_color,
            title_color: row.title_color,
            note_color: row.note_color,
            note_bg_color: row.note_bg_color,
            title_font_size: row.title_font_size,
            note_font_size: row.note_font_size,
            field_font_size: row.field_font_size,
            mobile_title_font_size: row.mobile_title_font_size,
            mobile_note_font_size: row.mobile_note_font_size,
            mobile_field_font_size: row.mobile_field_font_size,
            custom_css: row.custom_css,
        }
    }
}

impl From<NewDesign> for DesignItem {
    fn from(design: NewDesign) -> Self {
        Self {
            image_layout: design.image_layout.to_string(),
            modal_bg_color: design.modal_bg_color,
            border_width: design.border_width,
            border_style: design.border_style.to_string(),
            border_color: design.border_color,
            text_color: design.text_color,
            placeholder_color: design.placeholder_color,
            title_color: design.title_color,
            note_color: design.note_color,
            note_bg_color: design.note_bg_color,
            title_font_size: design.title_font_size,
            note_font_size: design.note_font_size,
            field_font_size: design.field_font_size,
            mobile_title_font_size: design.mobile_title_font_size,
            mobile_note_font_size: design.mobile_note_font_size,
            mobile_field_font_size: design.mobile_field_font_size,
            custom_css: design.custom_css,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_from_json(value: serde_json::Value) -> DesignBody {
        serde_json::from_value(value).expect("body should deserialize")
    }

    #[test]
    fn hex_colors_are_validated_and_lowercased() {
        assert!(is_hex_color("#A1B2C3"));
        assert!(!is_hex_color("A1B2C3"));
        assert!(!is_hex_color("#fff"));
        assert!(!is_hex_color("#gggggg"));

        let color = validated_color("req-1", "text_color", " #A1B2C3 ").expect("valid color");
        assert_eq!(color, "#a1b2c3");
    }

    #[test]
    fn build_design_rejects_out_of_range_border_width() {
        let body = body_from_json(serde_json::json!({ "border_width": 21 }));
        let err = build_design("req-1", &body).unwrap_err();
        assert_eq!(err.error.code, "validation_error");
        assert!(err.error.message.contains("border_width"));
    }

    #[test]
    fn build_design_rejects_unknown_layout() {
        let body = body_from_json(serde_json::json!({ "image_layout": "diagonal" }));
        let err = build_design("req-1", &body).unwrap_err();
        assert!(err.error.message.contains("diagonal"));
    }

    #[test]
    fn build_design_keeps_defaults_for_absent_fields() {
        let body = body_from_json(serde_json::json!({ "text_color": "#112233" }));
        let design = build_design("req-1", &body).expect("valid body");
        assert_eq!(design.text_color, "#112233");
        assert_eq!(design.border_width, 1);
        assert_eq!(design.title_font_size, "18px");
    }
}
