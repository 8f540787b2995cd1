use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A trail record. Field names follow the client app's data model.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trail {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub length: Option<f64>,
    pub estimated_time: Option<String>,
    pub elevation_gain: Option<i32>,
    pub image_url: Option<String>,
    pub map_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub trail_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub review_text: String,
    pub created_at: OffsetDateTime,
}

const TRAIL_COLUMNS: &str =
    "id, name, description, difficulty, length, estimated_time, elevation_gain, image_url, map_url";

pub async fn list_trails(db: &PgPool) -> anyhow::Result<Vec<Trail>> {
    let rows = sqlx::query_as::<_, Trail>(&format!(
        "SELECT {TRAIL_COLUMNS} FROM trails ORDER BY name"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_trail(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Trail>> {
    let row = sqlx::query_as::<_, Trail>(&format!(
        "SELECT {TRAIL_COLUMNS} FROM trails WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn list_reviews(db: &PgPool, trail_id: Uuid) -> anyhow::Result<Vec<Review>> {
    let rows = sqlx::query_as::<_, Review>(
        r#"
        SELECT id, trail_id, user_id, rating, review_text, created_at
        FROM reviews
        WHERE trail_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(trail_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn create_review(
    db: &PgPool,
    trail_id: Uuid,
    user_id: Uuid,
    rating: i32,
    review_text: &str,
) -> anyhow::Result<Review> {
    let row = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (trail_id, user_id, rating, review_text)
        VALUES ($1, $2, $3, $4)
        RETURNING id, trail_id, user_id, rating, review_text, created_at
        "#,
    )
    .bind(trail_id)
    .bind(user_id)
    .bind(rating)
    .bind(review_text)
    .fetch_one(db)
    .await?;
    Ok(row)
}
