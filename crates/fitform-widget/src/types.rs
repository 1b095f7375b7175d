//! Wire types for the storefront config endpoint.
//!
//! These model the camelCase JSON the app serves to themes. Every field
//! defaults so a partial payload degrades to empty strings rather than a
//! parse failure; the widget must keep working on whatever it is given.

use serde::Deserialize;

/// One form field of a size set, in merchant-defined order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConfig {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub placeholder: String,
}

impl FieldConfig {
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.field_type.eq_ignore_ascii_case("number")
    }
}

/// A matched size set as served to the storefront.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SizeSetConfig {
    pub id: i64,
    pub name: String,
    pub trigger_variant: String,
    pub image_url: Option<String>,
    /// `INLINE` or `MODAL`.
    pub display_style: String,
    pub req_nearest_size: bool,
    pub note_title: String,
    pub note_content: String,
    pub image_position: String,
    pub image_width: String,
    pub image_height: String,
    pub container_width: String,
    pub fields_container_width: String,
    pub mobile_image_position: String,
    pub mobile_image_width: String,
    pub mobile_image_height: String,
    pub mobile_container_width: String,
    pub mobile_fields_container_width: String,
    pub fields: Vec<FieldConfig>,
}

impl SizeSetConfig {
    #[must_use]
    pub fn is_modal(&self) -> bool {
        self.display_style.eq_ignore_ascii_case("modal")
    }
}

/// Shop-wide design settings; `None` on the wire means theme defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignConfig {
    pub image_layout: String,
    pub modal_bg_color: String,
    pub border_width: u32,
    pub border_style: String,
    pub border_color: String,
    pub text_color: String,
    pub placeholder_color: String,
    pub title_color: String,
    pub note_color: String,
    pub note_bg_color: String,
    pub title_font_size: String,
    pub note_font_size: String,
    pub field_font_size: String,
    pub mobile_title_font_size: String,
    pub mobile_note_font_size: String,
    pub mobile_field_font_size: String,
    pub custom_css: String,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            image_layout: "vertical".to_owned(),
            modal_bg_color: "#ffffff".to_owned(),
            border_width: 1,
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
        }
    }
}

/// Full payload of one config fetch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigResponse {
    pub sets: Vec<SizeSetConfig>,
    pub design: Option<DesignConfig>,
}
