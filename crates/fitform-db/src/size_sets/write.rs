//! Write operations for the `size_sets` and `size_set_fields` tables.
//!
//! Every operation here runs inside a single transaction. Position
//! invariants (unique and contiguous from zero per shop) are maintained by
//! the writes themselves; the deferred unique constraint on
//! `(shop, position)` lets multi-row shifts commit atomically.

use fitform_core::slugify;
use sqlx::{PgPool, Postgres, Transaction};

use super::types::{FieldRow, NewSizeSet, SizeSetRow};
use crate::DbError;

/// Direction for an adjacent reorder swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderDirection {
    Up,
    Down,
}

/// Create a size set (with its fields) at the end of the shop's dashboard
/// order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the whole batch is
/// rolled back.
pub async fn create_set(
    pool: &PgPool,
    shop: &str,
    set: &NewSizeSet,
) -> Result<(SizeSetRow, Vec<FieldRow>), DbError> {
    let mut tx = pool.begin().await?;

    let next_position: i32 =
        sqlx::query_scalar("SELECT COALESCE(MAX(position) + 1, 0) FROM size_sets WHERE shop = $1")
            .bind(shop)
            .fetch_one(&mut *tx)
            .await?;

    let row = insert_set_row(&mut tx, shop, set, next_position).await?;
    let fields = insert_fields(&mut tx, row.id, set).await?;

    tx.commit().await?;
    Ok((row, fields))
}

/// Fully replace a size set, scoped to the shop.
///
/// The field list is re-created wholesale; field positions restart from zero.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the id does not belong to the shop, or
/// [`DbError::Sqlx`] if any statement fails.
pub async fn update_set(
    pool: &PgPool,
    shop: &str,
    id: i64,
    set: &NewSizeSet,
) -> Result<(SizeSetRow, Vec<FieldRow>), DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, SizeSetRow>(
        "UPDATE size_sets \
         SET name = $3, \
             trigger_variant = $4, \
             trigger_token = $5, \
             image_url = $6, \
             note_title = $7, \
             note_content = $8, \
             require_nearest_size = $9, \
             display_style = $10, \
             image_position = $11, \
             image_width = $12, \
             image_height = $13, \
             image_container_width = $14, \
             fields_container_width = $15, \
             mobile_image_position = $16, \
             mobile_image_width = $17, \
             mobile_image_height = $18, \
             mobile_image_container_width = $19, \
             mobile_fields_container_width = $20, \
             updated_at = NOW() \
         WHERE id = $1 AND shop = $2 \
         RETURNING id, public_id, shop, name, trigger_variant, trigger_token, image_url, \
                   note_title, note_content, require_nearest_size, display_style, position, \
                   image_position, image_width, image_height, image_container_width, \
                   fields_container_width, mobile_image_position, mobile_image_width, \
                   mobile_image_height, mobile_image_container_width, \
                   mobile_fields_container_width, created_at, updated_at",
    )
    .bind(id)
    .bind(shop)
    .bind(&set.name)
    .bind(&set.trigger_variant)
    .bind(slugify(&set.trigger_variant))
    .bind(&set.image_url)
    .bind(&set.note_title)
    .bind(&set.note_content)
    .bind(set.require_nearest_size)
    .bind(set.display_style.to_string())
    .bind(set.desktop.image_position.to_string())
    .bind(&set.desktop.image_width)
    .bind(&set.desktop.image_height)
    .bind(&set.desktop.image_container_width)
    .bind(&set.desktop.fields_container_width)
    .bind(set.mobile.image_position.to_string())
    .bind(&set.mobile.image_width)
    .bind(&set.mobile.image_height)
    .bind(&set.mobile.image_container_width)
    .bind(&set.mobile.fields_container_width)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    sqlx::query("DELETE FROM size_set_fields WHERE set_id = $1")
        .bind(row.id)
        .execute(&mut *tx)
        .await?;

    let fields = insert_fields(&mut tx, row.id, set).await?;

    tx.commit().await?;
    Ok((row, fields))
}

/// Delete a size set, scoped to the shop. Fields go with it via `ON DELETE
/// CASCADE`. Returns `false` when the id does not belong to the shop.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn delete_set(pool: &PgPool, shop: &str, id: i64) -> Result<bool, DbError> {
    let mut tx = pool.begin().await?;

    let deleted_position: Option<i32> =
        sqlx::query_scalar("DELETE FROM size_sets WHERE id = $1 AND shop = $2 RETURNING position")
            .bind(id)
            .bind(shop)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(position) = deleted_position else {
        return Ok(false);
    };

    // Close the gap so positions stay contiguous from zero.
    sqlx::query("UPDATE size_sets SET position = position - 1 WHERE shop = $1 AND position > $2")
        .bind(shop)
        .bind(position)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Swap a set with its neighbor in the given direction.
///
/// Returns `false` (without touching anything) when the set is already at
/// the edge of the list. Both position updates commit together, so no other
/// reader ever observes a duplicated or missing position.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the id does not belong to the shop, or
/// [`DbError::Sqlx`] if any statement fails.
pub async fn swap_positions(
    pool: &PgPool,
    shop: &str,
    id: i64,
    direction: ReorderDirection,
) -> Result<bool, DbError> {
    let mut tx = pool.begin().await?;

    let current: i32 =
        sqlx::query_scalar("SELECT position FROM size_sets WHERE id = $1 AND shop = $2 FOR UPDATE")
            .bind(id)
            .bind(shop)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

    let neighbor_sql = match direction {
        ReorderDirection::Up => {
            "SELECT id, position FROM size_sets \
             WHERE shop = $1 AND position < $2 \
             ORDER BY position DESC LIMIT 1 FOR UPDATE"
        }
        ReorderDirection::Down => {
            "SELECT id, position FROM size_sets \
             WHERE shop = $1 AND position > $2 \
             ORDER BY position ASC LIMIT 1 FOR UPDATE"
        }
    };

    let neighbor: Option<(i64, i32)> = sqlx::query_as(neighbor_sql)
        .bind(shop)
        .bind(current)
        .fetch_optional(&mut *tx)
        .await?;

    let Some((neighbor_id, neighbor_position)) = neighbor else {
        return Ok(false);
    };

    sqlx::query("UPDATE size_sets SET position = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(neighbor_position)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE size_sets SET position = $2, updated_at = NOW() WHERE id = $1")
        .bind(neighbor_id)
        .bind(current)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Assign positions `0..n` following the order of `ordered_ids`.
///
/// The id list must be exactly the shop's size sets (no duplicates, no
/// missing or foreign ids); anything else is rejected before any row is
/// touched.
///
/// # Errors
///
/// Returns [`DbError::InvalidReorder`] if the id list is not a permutation
/// of the shop's sets, or [`DbError::Sqlx`] if any statement fails.
pub async fn reorder_all(pool: &PgPool, shop: &str, ordered_ids: &[i64]) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let existing: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM size_sets WHERE shop = $1 ORDER BY id FOR UPDATE")
            .bind(shop)
            .fetch_all(&mut *tx)
            .await?;

    let mut requested = ordered_ids.to_vec();
    requested.sort_unstable();
    requested.dedup();
    if requested.len() != ordered_ids.len() || requested != existing {
        return Err(DbError::InvalidReorder);
    }

    sqlx::query(
        "UPDATE size_sets AS s \
         SET position = (u.ord - 1)::INT, updated_at = NOW() \
         FROM UNNEST($2::bigint[]) WITH ORDINALITY AS u(id, ord) \
         WHERE s.id = u.id AND s.shop = $1",
    )
    .bind(shop)
    .bind(ordered_ids)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

// ---------- shared insert helpers ----------

async fn insert_set_row(
    tx: &mut Transaction<'_, Postgres>,
    shop: &str,
    set: &NewSizeSet,
    position: i32,
) -> Result<SizeSetRow, sqlx::Error> {
    sqlx::query_as::<_, SizeSetRow>(
        "INSERT INTO size_sets \
             (shop, name, trigger_variant, trigger_token, image_url, note_title, \
              note_content, require_nearest_size, display_style, position, \
              image_position, image_width, image_height, image_container_width, \
              fields_container_width, mobile_image_position, mobile_image_width, \
              mobile_image_height, mobile_image_container_width, mobile_fields_container_width) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
                 $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
         RETURNING id, public_id, shop, name, trigger_variant, trigger_token, image_url, \
                   note_title, note_content, require_nearest_size, display_style, position, \
                   image_position, image_width, image_height, image_container_width, \
                   fields_container_width, mobile_image_position, mobile_image_width, \
                   mobile_image_height, mobile_image_container_width, \
                   mobile_fields_container_width, created_at, updated_at",
    )
    .bind(shop)
    .bind(&set.name)
    .bind(&set.trigger_variant)
    .bind(slugify(&set.trigger_variant))
    .bind(&set.image_url)
    .bind(&set.note_title)
    .bind(&set.note_content)
    .bind(set.require_nearest_size)
    .bind(set.display_style.to_string())
    .bind(position)
    .bind(set.desktop.image_position.to_string())
    .bind(&set.desktop.image_width)
    .bind(&set.desktop.image_height)
    .bind(&set.desktop.image_container_width)
    .bind(&set.desktop.fields_container_width)
    .bind(set.mobile.image_position.to_string())
    .bind(&set.mobile.image_width)
    .bind(&set.mobile.image_height)
    .bind(&set.mobile.image_container_width)
    .bind(&set.mobile.fields_container_width)
    .fetch_one(&mut **tx)
    .await
}

async fn insert_fields(
    tx: &mut Transaction<'_, Postgres>,
    set_id: i64,
    set: &NewSizeSet,
) -> Result<Vec<FieldRow>, sqlx::Error> {
    let mut rows = Vec::with_capacity(set.fields.len());
    for (position, field) in set.fields.iter().enumerate() {
        let row = sqlx::query_as::<_, FieldRow>(
            "INSERT INTO size_set_fields \
                 (set_id, label, input_type, required, placeholder, position) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, set_id, label, input_type, required, placeholder, position",
        )
        .bind(set_id)
        .bind(&field.label)
        .bind(field.input_type.to_string())
        .bind(field.required)
        .bind(&field.placeholder)
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .fetch_one(&mut **tx)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}
