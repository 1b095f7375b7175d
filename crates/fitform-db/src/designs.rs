//! Database operations for the `shop_designs` table.

use chrono::{DateTime, Utc};
use fitform_core::types::{BorderStyle, ImageLayout};
use sqlx::PgPool;

/// Input record for upserting a shop's widget design.
///
/// Colors are `#rrggbb` strings, font sizes are CSS lengths; both are
/// validated at the API boundary and stored verbatim.
#[derive(Debug, Clone)]
pub struct NewDesign {
    pub image_layout: ImageLayout,
    pub modal_bg_color: String,
    pub border_width: i32,
    pub border_style: BorderStyle,
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

impl Default for NewDesign {
    fn default() -> Self {
        Self {
            image_layout: ImageLayout::Vertical,
            modal_bg_color: "#ffffff".to_string(),
            border_width: 1,
            border_style: BorderStyle::Solid,
            border_color: "#dddddd".to_string(),
            text_color: "#333333".to_string(),
            placeholder_color: "#999999".to_string(),
            title_color: "#000000".to_string(),
            note_color: "#666666".to_string(),
            note_bg_color: "#f9f9f9".to_string(),
            title_font_size: "18px".to_string(),
            note_font_size: "14px".to_string(),
            field_font_size: "14px".to_string(),
            mobile_title_font_size: "16px".to_string(),
            mobile_note_font_size: "13px".to_string(),
            mobile_field_font_size: "13px".to_string(),
            custom_css: String::new(),
        }
    }
}

/// A row from the `shop_designs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DesignRow {
    pub id: i64,
    pub shop: String,
    pub image_layout: String,
    pub modal_bg_color: String,
    pub border_width: i32,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fetch a shop's design, if one has been saved.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_design(pool: &PgPool, shop: &str) -> Result<Option<DesignRow>, sqlx::Error> {
    sqlx::query_as::<_, DesignRow>(
        "SELECT id, shop, image_layout, modal_bg_color, border_width, border_style, \
                border_color, text_color, placeholder_color, title_color, note_color, \
                note_bg_color, title_font_size, note_font_size, field_font_size, \
                mobile_title_font_size, mobile_note_font_size, mobile_field_font_size, \
                custom_css, created_at, updated_at \
         FROM shop_designs \
         WHERE shop = $1",
    )
    .bind(shop)
    .fetch_optional(pool)
    .await
}

/// Insert or replace a shop's design (one row per shop).
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_design(
    pool: &PgPool,
    shop: &str,
    design: &NewDesign,
) -> Result<DesignRow, sqlx::Error> {
    sqlx::query_as::<_, DesignRow>(
        "INSERT INTO shop_designs \
             (shop, image_layout, modal_bg_color, border_width, border_style, border_color, \
              text_color, placeholder_color, title_color, note_color, note_bg_color, \
              title_font_size, note_font_size, field_font_size, mobile_title_font_size, \
              mobile_note_font_size, mobile_field_font_size, custom_css) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
         ON CONFLICT (shop) DO UPDATE SET \
             image_layout = EXCLUDED.image_layout, \
             modal_bg_color = EXCLUDED.modal_bg_color, \
             border_width = EXCLUDED.border_width, \
             border_style = EXCLUDED.border_style, \
             border_color = EXCLUDED.border_color, \
             text_color = EXCLUDED.text_color, \
             placeholder_color = EXCLUDED.placeholder_color, \
             title_color = EXCLUDED.title_color, \
             note_color = EXCLUDED.note_color, \
             note_bg_color = EXCLUDED.note_bg_color, \
             title_font_size = EXCLUDED.title_font_size, \
             note_font_size = EXCLUDED.note_font_size, \
             field_font_size = EXCLUDED.field_font_size, \
             mobile_title_font_size = EXCLUDED.mobile_title_font_size, \
             mobile_note_font_size = EXCLUDED.mobile_note_font_size, \
             mobile_field_font_size = EXCLUDED.mobile_field_font_size, \
             custom_css = EXCLUDED.custom_css, \
             updated_at = NOW() \
         RETURNING id, shop, image_layout, modal_bg_color, border_width, border_style, \
                   border_color, text_color, placeholder_color, title_color, note_color, \
                   note_bg_color, title_font_size, note_font_size, field_font_size, \
                   mobile_title_font_size, mobile_note_font_size, mobile_field_font_size, \
                   custom_css, created_at, updated_at",
    )
    .bind(shop)
    .bind(design.image_layout.to_string())
    .bind(&design.modal_bg_color)
    .bind(design.border_width)
    .bind(design.border_style.to_string())
    .bind(&design.border_color)
    .bind(&design.text_color)
    .bind(&design.placeholder_color)
    .bind(&design.title_color)
    .bind(&design.note_color)
    .bind(&design.note_bg_color)
    .bind(&design.title_font_size)
    .bind(&design.note_font_size)
    .bind(&design.field_font_size)
    .bind(&design.mobile_title_font_size)
    .bind(&design.mobile_note_font_size)
    .bind(&design.mobile_field_font_size)
    .bind(&design.custom_css)
    .fetch_one(pool)
    .await
}
