//! Public storefront config endpoint.
//!
//! Serves the camelCase payload the theme widget consumes: every size set
//! matching the shopper's current variant selection, in dashboard order,
//! plus the shop's design settings. Unauthenticated and fetched cross-origin.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use fitform_core::{DisplayStyle, VariantKey};
use fitform_db::{DesignRow, FieldRow, SizeSetRow};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_sqlx_error, require_param, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct StorefrontQuery {
    pub shop: Option<String>,
    pub variant: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct StorefrontConfig {
    sets: Vec<StorefrontSizeSet>,
    design: Option<StorefrontDesign>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StorefrontSizeSet {
    id: i64,
    name: String,
    trigger_variant: String,
    image_url: Option<String>,
    /// `INLINE` or `MODAL` on the wire.
    display_style: String,
    req_nearest_size: bool,
    note_title: String,
    note_content: String,
    image_position: String,
    image_width: String,
    image_height: String,
    container_width: String,
    fields_container_width: String,
    mobile_image_position: String,
    mobile_image_width: String,
    mobile_image_height: String,
    mobile_container_width: String,
    mobile_fields_container_width: String,
    fields: Vec<StorefrontField>,
}

#[derive(Debug, Serialize)]
struct StorefrontField {
    label: String,
    #[serde(rename = "type")]
    field_type: String,
    required: bool,
    placeholder: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StorefrontDesign {
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

pub(super) async fn get_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<StorefrontQuery>,
) -> Result<Json<ApiResponse<StorefrontConfig>>, ApiError> {
    let shop = require_param(&req_id.0, query.shop.as_deref(), "shop")?;
    let raw_variant = require_param(&req_id.0, query.variant.as_deref(), "variant")?;

    // Well-behaved embeds send slugs already; re-normalize anyway so a
    // hand-built URL with raw option values still matches.
    let key = VariantKey::parse(raw_variant);

    let matched = if key.is_empty() {
        Vec::new()
    } else {
        let tokens: Vec<String> = key.tokens().map(ToOwned::to_owned).collect();
        fitform_db::match_sets_by_tokens(&state.pool, shop, &tokens)
            .await
            .map_err(|e| map_sqlx_error(req_id.0.clone(), &e))?
    };

    let matched = apply_entitlement(&state, shop, matched).await;

    let set_ids: Vec<i64> = matched.iter().map(|row| row.id).collect();
    let field_rows = fitform_db::list_fields_for_sets(&state.pool, &set_ids)
        .await
        .map_err(|e| map_sqlx_error(req_id.0.clone(), &e))?;
    let mut fields_by_set = group_fields(field_rows);

    let design = fitform_db::get_design(&state.pool, shop)
        .await
        .map_err(|e| map_sqlx_error(req_id.0.clone(), &e))?
        .map(StorefrontDesign::from);

    let sets = matched
        .into_iter()
        .map(|row| {
            let fields = fields_by_set.remove(&row.id).unwrap_or_default();
            StorefrontSizeSet::from_row(row, fields)
        })
        .collect();

    Ok(Json(ApiResponse {
        data: StorefrontConfig { sets, design },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Truncates the match list to the shop's plan allowance.
///
/// Policy errors fail open: a billing API outage must never empty a
/// storefront widget.
async fn apply_entitlement(
    state: &AppState,
    shop: &str,
    mut matched: Vec<SizeSetRow>,
) -> Vec<SizeSetRow> {
    match state.entitlement.limits_for(shop).await {
        Ok(limits) => {
            if let Some(max_sets) = limits.max_sets {
                let allowed = usize::try_from(max_sets).unwrap_or(usize::MAX);
                if matched.len() > allowed {
                    tracing::warn!(
                        shop,
                        matched = matched.len(),
                        allowed,
                        "plan allows fewer size sets than matched; truncating"
                    );
                    matched.truncate(allowed);
                }
            }
            matched
        }
        Err(e) => {
            tracing::warn!(shop, error = %e, "entitlement lookup failed; serving all matches");
            matched
        }
    }
}

/// Groups ordered field rows by their owning set. Rows arrive sorted by
/// `(set_id, position)`, so per-set order is preserved.
fn group_fields(rows: Vec<FieldRow>) -> HashMap<i64, Vec<StorefrontField>> {
    let mut grouped: HashMap<i64, Vec<StorefrontField>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.set_id)
            .or_default()
            .push(StorefrontField::from(row));
    }
    grouped
}

/// Maps the stored lowercase style to the UPPERCASE wire form. Unknown
/// values pass through uppercased rather than failing the whole response.
fn wire_display_style(stored: &str) -> String {
    stored.parse::<DisplayStyle>().map_or_else(
        |_| stored.to_ascii_uppercase(),
        |style| style.wire_name().to_owned(),
    )
}

impl StorefrontSizeSet {
    fn from_row(row: SizeSetRow, fields: Vec<StorefrontField>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            trigger_variant: row.trigger_variant,
            image_url: row.image_url,
            display_style: wire_display_style(&row.display_style),
            req_nearest_size: row.require_nearest_size,
            note_title: row.note_title,
            note_content: row.note_content,
            image_position: row.image_position,
            image_width: row.image_width,
            image_height: row.image_height,
            container_width: row.image_container_width,
            fields_container_width: row.fields_container_width,
            mobile_image_position: row.mobile_image_position,
            mobile_image_width: row.mobile_image_width,
            mobile_image_height: row.mobile_image_height,
            mobile_container_width: row.mobile_image_container_width,
            mobile_fields_container_width: row.mobile_fields_container_width,
            fields,
        }
    }
}

impl From<FieldRow> for StorefrontField {
    fn from(row: FieldRow) -> Self {
        Self {
            label: row.label,
            field_type: row.input_type,
            required: row.required,
            placeholder: row.placeholder,
        }
    }
}

impl From<DesignRow> for StorefrontDesign {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_serializes_to_the_camel_case_wire_contract() {
        let set = StorefrontSizeSet {
            id: 7,
            name: "Custom Curtains".to_owned(),
            trigger_variant: "Custom Size".to_owned(),
            image_url: None,
            display_style: "INLINE".to_owned(),
            req_nearest_size: true,
            note_title: String::new(),
            note_content: String::new(),
            image_position: "top".to_owned(),
            image_width: "auto".to_owned(),
            image_height: "auto".to_owned(),
            container_width: "auto".to_owned(),
            fields_container_width: "auto".to_owned(),
            mobile_image_position: "top".to_owned(),
            mobile_image_width: "auto".to_owned(),
            mobile_image_height: "auto".to_owned(),
            mobile_container_width: "auto".to_owned(),
            mobile_fields_container_width: "auto".to_owned(),
            fields: vec![StorefrontField {
                label: "Width (cm)".to_owned(),
                field_type: "number".to_owned(),
                required: true,
                placeholder: "120".to_owned(),
            }],
        };

        let json = serde_json::to_value(&set).expect("serialize set");
        assert_eq!(json["triggerVariant"], "Custom Size");
        assert_eq!(json["reqNearestSize"], true);
        assert_eq!(json["containerWidth"], "auto");
        assert_eq!(json["fields"][0]["type"], "number");
        assert!(json.get("trigger_variant").is_none());
    }

    #[test]
    fn design_border_width_stays_numeric() {
        let design = StorefrontDesign {
            image_layout: "vertical".to_owned(),
            modal_bg_color: "#ffffff".to_owned(),
            border_width: 2,
            border_style: "solid".to_owned(),
            border_color: "#dddddd".to_owned(),
            text_color: "#333333".to_owned(),
            placeholder_color: "#999999".to_owned(),
            title_color: "#000000".to_owned(),
            note_color: "#666666".to_owned(),
            note_bg_color: "#f9f9f9".to_owned(),
            title_font_size: "18px".to_owned(),
            note_font_size: "14px".to_owned(),
            field_font_size: "14px".to_owned(),
            mobile_title_font_size: "16px".to_owned(),
            mobile_note_font_size: "13px".to_owned(),
            mobile_field_font_size: "13px".to_owned(),
            custom_css: String::new(),
        };

        let json = serde_json::to_value(&design).expect("serialize design");
        assert_eq!(json["borderWidth"], 2);
        assert_eq!(json["noteBgColor"], "#f9f9f9");
    }

    #[test]
    fn wire_display_style_uppercases() {
        assert_eq!(wire_display_style("inline"), "INLINE");
        assert_eq!(wire_display_style("modal"), "MODAL");
        assert_eq!(wire_display_style("popup"), "POPUP");
    }
}
