use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};

use super::store::{new_id, WardrobeStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        CalendarEntry, Category, ItemFilter, ItemPatch, MonthRange, NewItem, NewOutfit, Outfit,
        User, WardrobeItem,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const USER_COLUMNS: &str = "id, email, password_hash, created_at";
const ITEM_COLUMNS: &str = "id, user_id, category, color, season, formality, image_url, created_at";
const OUTFIT_COLUMNS: &str =
    "id, user_id, top_id, bottom_id, shoes_id, accessory_ids, occasion, created_at";
const CALENDAR_COLUMNS: &str = "id, user_id, outfit_id, date, created_at";

/// Wardrobe store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> AppResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn item_from_row(row: &PgRow) -> AppResult<WardrobeItem> {
    let category: String = row.try_get("category")?;
    let formality: Option<i16> = row.try_get("formality")?;

    Ok(WardrobeItem {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        category: category.parse::<Category>()?,
        color: row.try_get("color")?,
        season: row.try_get("season")?,
        formality: formality
            .map(u8::try_from)
            .transpose()
            .map_err(|_| AppError::Internal("Stored formality out of range".to_string()))?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn outfit_from_row(row: &PgRow) -> AppResult<Outfit> {
    Ok(Outfit {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        top_id: row.try_get("top_id")?,
        bottom_id: row.try_get("bottom_id")?,
        shoes_id: row.try_get("shoes_id")?,
        accessory_ids: row.try_get("accessory_ids")?,
        occasion: row.try_get("occasion")?,
        created_at: row.try_get("created_at")?,
    })
}

fn calendar_from_row(row: &PgRow) -> AppResult<CalendarEntry> {
    Ok(CalendarEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        outfit_id: row.try_get("outfit_id")?,
        date: row.try_get("date")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait::async_trait]
impl WardrobeStore for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_id())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("email_exists".to_string())
            }
            other => AppError::Database(other),
        })?;

        let user = user_from_row(&row)?;
        tracing::debug!(user_id = %user.id, "Inserted user");
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_items(&self, user_id: &str, filter: &ItemFilter) -> AppResult<Vec<WardrobeItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE user_id = $1
               AND ($2::TEXT IS NULL OR category = $2)
               AND ($3::TEXT IS NULL OR color = $3)
               AND ($4::TEXT IS NULL OR season = $4)
             ORDER BY created_at, seq"
        ))
        .bind(user_id)
        .bind(filter.category.map(|c| c.as_str()))
        .bind(filter.color.as_deref())
        .bind(filter.season.as_deref())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn find_items(&self, user_id: &str, ids: &[&str]) -> AppResult<Vec<WardrobeItem>> {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE user_id = $1 AND id = ANY($2)
             ORDER BY created_at, seq"
        ))
        .bind(user_id)
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn get_item(&self, user_id: &str, id: &str) -> AppResult<Option<WardrobeItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn create_item(&self, user_id: &str, item: NewItem) -> AppResult<WardrobeItem> {
        let item = item.into_item(new_id(), user_id);

        sqlx::query(
            "INSERT INTO items (id, user_id, category, color, season, formality, image_url, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&item.id)
        .bind(&item.user_id)
        .bind(item.category.as_str())
        .bind(item.color.as_deref())
        .bind(item.season.as_deref())
        .bind(item.formality.map(i16::from))
        .bind(item.image_url.as_deref())
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(item_id = %item.id, category = %item.category, "Inserted wardrobe item");
        Ok(item)
    }

    async fn update_item(
        &self,
        user_id: &str,
        id: &str,
        patch: ItemPatch,
    ) -> AppResult<Option<WardrobeItem>> {
        let row = sqlx::query(&format!(
            "UPDATE items SET
                category = COALESCE($3, category),
                color = COALESCE($4, color),
                season = COALESCE($5, season),
                formality = COALESCE($6, formality),
                image_url = COALESCE($7, image_url)
             WHERE id = $1 AND user_id = $2
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.color.as_deref())
        .bind(patch.season.as_deref())
        .bind(patch.formality.map(i16::from))
        .bind(patch.image_url.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn delete_item(&self, user_id: &str, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_outfit(&self, user_id: &str, outfit: NewOutfit) -> AppResult<Outfit> {
        let outfit = outfit.into_outfit(new_id(), user_id);

        sqlx::query(
            "INSERT INTO outfits (id, user_id, top_id, bottom_id, shoes_id, accessory_ids, occasion, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&outfit.id)
        .bind(&outfit.user_id)
        .bind(&outfit.top_id)
        .bind(&outfit.bottom_id)
        .bind(&outfit.shoes_id)
        .bind(&outfit.accessory_ids)
        .bind(outfit.occasion.as_deref())
        .bind(outfit.created_at)
        .execute(&self.pool)
        .await?;

        Ok(outfit)
    }

    async fn list_outfits(&self, user_id: &str) -> AppResult<Vec<Outfit>> {
        let rows = sqlx::query(&format!(
            "SELECT {OUTFIT_COLUMNS} FROM outfits WHERE user_id = $1 ORDER BY created_at, seq"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(outfit_from_row).collect()
    }

    async fn get_outfit(&self, id: &str) -> AppResult<Option<Outfit>> {
        let row = sqlx::query(&format!("SELECT {OUTFIT_COLUMNS} FROM outfits WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(outfit_from_row).transpose()
    }

    async fn list_calendar(
        &self,
        user_id: &str,
        range: Option<MonthRange>,
    ) -> AppResult<Vec<CalendarEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {CALENDAR_COLUMNS} FROM calendar_entries
             WHERE user_id = $1
               AND ($2::DATE IS NULL OR date >= $2)
               AND ($3::DATE IS NULL OR date < $3)
             ORDER BY created_at, seq"
        ))
        .bind(user_id)
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(calendar_from_row).collect()
    }

    async fn create_calendar_entry(
        &self,
        user_id: &str,
        outfit_id: &str,
        date: NaiveDate,
    ) -> AppResult<CalendarEntry> {
        let row = sqlx::query(&format!(
            "INSERT INTO calendar_entries (id, user_id, outfit_id, date)
             VALUES ($1, $2, $3, $4)
             RETURNING {CALENDAR_COLUMNS}"
        ))
        .bind(new_id())
        .bind(user_id)
        .bind(outfit_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        calendar_from_row(&row)
    }

    async fn get_calendar_entry(&self, id: &str) -> AppResult<Option<CalendarEntry>> {
        let row = sqlx::query(&format!(
            "SELECT {CALENDAR_COLUMNS} FROM calendar_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(calendar_from_row).transpose()
    }

    async fn delete_calendar_entry(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM calendar_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// These tests need a running PostgreSQL instance reachable through DATABASE_URL.
