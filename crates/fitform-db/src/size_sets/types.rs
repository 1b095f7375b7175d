//! Row and input types for the `size_sets` and `size_set_fields` tables.

use chrono::{DateTime, Utc};
use fitform_core::types::{DisplayStyle, ImagePosition, InputType};
use uuid::Uuid;

/// Per-viewport presentation settings for a set's image/fields arrangement.
///
/// Width and height values are free-form CSS lengths (`auto`, `240px`, `50%`);
/// they are stored verbatim and interpreted by the widget's render engine.
#[derive(Debug, Clone)]
pub struct PresentationAxes {
    pub image_position: ImagePosition,
    pub image_width: String,
    pub image_height: String,
    pub image_container_width: String,
    pub fields_container_width: String,
}

impl Default for PresentationAxes {
    fn default() -> Self {
        Self {
            image_position: ImagePosition::Top,
            image_width: "auto".to_string(),
            image_height: "auto".to_string(),
            image_container_width: "auto".to_string(),
            fields_container_width: "auto".to_string(),
        }
    }
}

/// Input record for creating a measurement field.
#[derive(Debug, Clone)]
pub struct NewField {
    pub label: String,
    pub input_type: InputType,
    pub required: bool,
    pub placeholder: String,
}

/// Input record for creating or fully replacing a size set.
///
/// `trigger_token` is derived from `trigger_variant` at write time; callers
/// never supply it directly.
#[derive(Debug, Clone)]
pub struct NewSizeSet {
    pub name: String,
    pub trigger_variant: String,
    pub image_url: Option<String>,
    pub note_title: String,
    pub note_content: String,
    pub require_nearest_size: bool,
    pub display_style: DisplayStyle,
    pub desktop: PresentationAxes,
    pub mobile: PresentationAxes,
    pub fields: Vec<NewField>,
}

/// A row from the `size_sets` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SizeSetRow {
    pub id: i64,
    pub public_id: Uuid,
    pub shop: String,
    pub name: String,
    /// Merchant-entered trigger value, kept verbatim for the admin UI.
    pub trigger_variant: String,
    /// Slugified form of `trigger_variant`; the only column used for matching.
    pub trigger_token: String,
    pub image_url: Option<String>,
    pub note_title: String,
    pub note_content: String,
    pub require_nearest_size: bool,
    pub display_style: String,
    pub position: i32,
    pub image_position: String,
    pub image_width: String,
    pub image_height: String,
    pub image_container_width: String,
    pub fields_container_width: String,
    pub mobile_image_position: String,
    pub mobile_image_width: String,
    pub mobile_image_height: String,
    pub mobile_image_container_width: String,
    pub mobile_fields_container_width: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `size_set_fields` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FieldRow {
    pub id: i64,
    pub set_id: i64,
    pub label: String,
    pub input_type: String,
    pub required: bool,
    pub placeholder: String,
    pub position: i32,
}
