//! Read operations for the `size_sets` and `size_set_fields` tables.

use sqlx::PgPool;

use super::types::{FieldRow, SizeSetRow};

/// List all size sets for a shop in dashboard order.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_sets_for_shop(pool: &PgPool, shop: &str) -> Result<Vec<SizeSetRow>, sqlx::Error> {
    sqlx::query_as::<_, SizeSetRow>(
        "SELECT id, public_id, shop, name, trigger_variant, trigger_token, image_url, \
                note_title, note_content, require_nearest_size, display_style, position, \
                image_position, image_width, image_height, image_container_width, \
                fields_container_width, mobile_image_position, mobile_image_width, \
                mobile_image_height, mobile_image_container_width, \
                mobile_fields_container_width, created_at, updated_at \
         FROM size_sets \
         WHERE shop = $1 \
         ORDER BY position",
    )
    .bind(shop)
    .fetch_all(pool)
    .await
}

/// Fetch a single size set by id, scoped to the shop.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_set(
    pool: &PgPool,
    shop: &str,
    id: i64,
) -> Result<Option<SizeSetRow>, sqlx::Error> {
    sqlx::query_as::<_, SizeSetRow>(
        "SELECT id, public_id, shop, name, trigger_variant, trigger_token, image_url, \
                note_title, note_content, require_nearest_size, display_style, position, \
                image_position, image_width, image_height, image_container_width, \
                fields_container_width, mobile_image_position, mobile_image_width, \
                mobile_image_height, mobile_image_container_width, \
                mobile_fields_container_width, created_at, updated_at \
         FROM size_sets \
         WHERE id = $1 AND shop = $2",
    )
    .bind(id)
    .bind(shop)
    .fetch_optional(pool)
    .await
}

/// Return every set whose `trigger_token` appears in `tokens`, in dashboard
/// order. This is the storefront matching query; tokens are expected to
/// already be slugs.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn match_sets_by_tokens(
    pool: &PgPool,
    shop: &str,
    tokens: &[String],
) -> Result<Vec<SizeSetRow>, sqlx::Error> {
    sqlx::query_as::<_, SizeSetRow>(
        "SELECT id, public_id, shop, name, trigger_variant, trigger_token, image_url, \
                note_title, note_content, require_nearest_size, display_style, position, \
                image_position, image_width, image_height, image_container_width, \
                fields_container_width, mobile_image_position, mobile_image_width, \
                mobile_image_height, mobile_image_container_width, \
                mobile_fields_container_width, created_at, updated_at \
         FROM size_sets \
         WHERE shop = $1 AND trigger_token = ANY($2::text[]) \
         ORDER BY position",
    )
    .bind(shop)
    .bind(tokens)
    .fetch_all(pool)
    .await
}

/// List a set's fields in order.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_fields_for_set(pool: &PgPool, set_id: i64) -> Result<Vec<FieldRow>, sqlx::Error> {
    sqlx::query_as::<_, FieldRow>(
        "SELECT id, set_id, label, input_type, required, placeholder, position \
         FROM size_set_fields \
         WHERE set_id = $1 \
         ORDER BY position",
    )
    .bind(set_id)
    .fetch_all(pool)
    .await
}

/// Batch-fetch fields for several sets in one round-trip, ordered by
/// `(set_id, position)` so callers can group them with a single pass.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_fields_for_sets(
    pool: &PgPool,
    set_ids: &[i64],
) -> Result<Vec<FieldRow>, sqlx::Error> {
    if set_ids.is_empty() {
        return Ok(vec![]);
    }

    sqlx::query_as::<_, FieldRow>(
        "SELECT id, set_id, label, input_type, required, placeholder, position \
         FROM size_set_fields \
         WHERE set_id = ANY($1::bigint[]) \
         ORDER BY set_id, position",
    )
    .bind(set_ids)
    .fetch_all(pool)
    .await
}

/// Count a shop's size sets (used for plan-limit checks).
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_sets_for_shop(pool: &PgPool, shop: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM size_sets WHERE shop = $1")
        .bind(shop)
        .fetch_one(pool)
        .await
}
