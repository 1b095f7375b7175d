use fitform_core::{slugify, SeedSet};
use sqlx::PgPool;

use crate::DbError;

/// Upsert size sets from a seed file into the database.
///
/// Sets are keyed by `(shop, name)` case-insensitively: existing sets are
/// updated in place (fields re-created wholesale, dashboard position kept),
/// new sets are appended at the end of the shop's order. Returns the number
/// of sets processed. All statements run inside a single transaction; if any
/// operation fails the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_size_sets(pool: &PgPool, shop: &str, sets: &[SeedSet]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for seed in sets {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM size_sets WHERE shop = $1 AND LOWER(name) = LOWER($2)",
        )
        .bind(shop)
        .bind(&seed.name)
        .fetch_optional(&mut *tx)
        .await?;

        let set_id: i64 = if let Some(id) = existing {
            sqlx::query(
                "UPDATE size_sets \
                 SET trigger_variant = $2, \
                     trigger_token = $3, \
                     image_url = $4, \
                     note_title = $5, \
                     note_content = $6, \
                     require_nearest_size = $7, \
                     display_style = $8, \
                     updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(&seed.trigger_variant)
            .bind(slugify(&seed.trigger_variant))
            .bind(&seed.image_url)
            .bind(&seed.note_title)
            .bind(&seed.note_content)
            .bind(seed.require_nearest_size)
            .bind(seed.display_style.to_string())
            .execute(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM size_set_fields WHERE set_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            id
        } else {
            let next_position: i32 = sqlx::query_scalar(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM size_sets WHERE shop = $1",
            )
            .bind(shop)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query_scalar::<_, i64>(
                "INSERT INTO size_sets \
                     (shop, name, trigger_variant, trigger_token, image_url, note_title, \
                      note_content, require_nearest_size, display_style, position) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
                 RETURNING id",
            )
            .bind(shop)
            .bind(&seed.name)
            .bind(&seed.trigger_variant)
            .bind(slugify(&seed.trigger_variant))
            .bind(&seed.image_url)
            .bind(&seed.note_title)
            .bind(&seed.note_content)
            .bind(seed.require_nearest_size)
            .bind(seed.display_style.to_string())
            .bind(next_position)
            .fetch_one(&mut *tx)
            .await?
        };

        for (position, field) in seed.fields.iter().enumerate() {
            sqlx::query(
                "INSERT INTO size_set_fields \
                     (set_id, label, input_type, required, placeholder, position) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(set_id)
            .bind(&field.label)
            .bind(field.input_type.to_string())
            .bind(field.required)
            .bind(&field.placeholder)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;
        }

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
