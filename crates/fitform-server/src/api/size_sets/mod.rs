//! Size-set admin API handlers.
//!
//! - `GET  /api/v1/size-sets?shop=`     — dashboard list, position order
//! - `POST /api/v1/size-sets`           — create a set with its fields
//! - `GET  /api/v1/size-sets/{id}?shop=` — detail with fields
//! - `PUT  /api/v1/size-sets/{id}`      — full update, fields replaced
//! - `POST /api/v1/size-sets/actions`   — form mutations: `delete`,
//!   `reorder`, `reorder_all`

mod actions;
mod detail;
mod list;
mod write;

pub(super) use actions::apply_action;
pub(super) use detail::get_size_set;
pub(super) use list::list_size_sets;
pub(super) use write::{create_size_set, update_size_set};

use chrono::{DateTime, Utc};
use fitform_db::{FieldRow, SizeSetRow};
use serde::Serialize;
use uuid::Uuid;

/// A size set plus its ordered fields, as served to the admin dashboard.
#[derive(Debug, Serialize)]
pub(in crate::api) struct SizeSetItem {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub trigger_variant: String,
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
    pub fields: Vec<FieldItem>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct FieldItem {
    pub id: i64,
    pub label: String,
    pub input_type: String,
    pub required: bool,
    pub placeholder: String,
    pub position: i32,
}

impl SizeSetItem {
    pub(in crate::api) fn from_parts(row: SizeSetRow, fields: Vec<FieldRow>) -> Self {
        Self {
            id: row.id,
            public_id: row.public_id,
            name: row.name,
            trigger_variant: row.trigger_variant,
            trigger_token: row.trigger_token,
            image_url: row.image_url,
            note_title: row.note_title,
            note_content: row.note_content,
            require_nearest_size: row.require_nearest_size,
            display_style: row.display_style,
            position: row.position,
            image_position: row.image_position,
            image_width: row.image_width,
            image_height: row.image_height,
            image_container_width: row.image_container_width,
            fields_container_width: row.fields_container_width,
            mobile_image_position: row.mobile_image_position,
            mobile_image_width: row.mobile_image_width,
            mobile_image_height: row.mobile_image_height,
            mobile_image_container_width: row.mobile_image_container_width,
            mobile_fields_container_width: row.mobile_fields_container_width,
            created_at: row.created_at,
            updated_at: row.updated_at,
            fields: fields.into_iter().map(FieldItem::from).collect(),
        }
    }
}

impl From<FieldRow> for FieldItem {
    fn from(row: FieldRow) -> Self {
        Self {
            id: row.id,
            label: row.label,
            input_type: row.input_type,
            required: row.required,
            placeholder: row.placeholder,
            position: row.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FieldItem;

    #[test]
    fn field_item_is_serializable() {
        let item = FieldItem {
            id: 3,
            label: "Width (cm)".to_string(),
            input_type: "number".to_string(),
            required: true,
            placeholder: "120".to_string(),
            position: 1,
        };

        let json = serde_json::to_string(&item).expect("serialize field item");
        assert!(json.contains("\"input_type\":\"number\""));
        assert!(json.contains("\"position\":1"));
    }
}
