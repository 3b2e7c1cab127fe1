use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Pool, RepositoryError};
use crate::buyers::{Buyer, BuyerId, BuyerRepository, BuyerSource, BuyerType};

pub(crate) const BUYER_COLUMNS: &str =
    "id, first_name, last_name, email, phone, buyer_type, source, preferred_areas, created_at";

pub struct SqliteBuyerRepository {
    pool: Pool,
}

impl SqliteBuyerRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

pub(crate) fn buyer_from_row(row: &SqliteRow) -> Result<Buyer, RepositoryError> {
    let buyer_type: String = row.get("buyer_type");
    let buyer_type = BuyerType::parse(&buyer_type)
        .ok_or_else(|| RepositoryError::Unavailable(format!("unknown buyer_type '{buyer_type}'")))?;

    let source: String = row.get("source");
    let source = BuyerSource::parse(&source)
        .ok_or_else(|| RepositoryError::Unavailable(format!("unknown source '{source}'")))?;

    let preferred_areas: String = row.get("preferred_areas");
    let preferred_areas = serde_json::from_str(&preferred_areas)
        .map_err(|err| RepositoryError::Unavailable(format!("bad preferred_areas: {err}")))?;

    Ok(Buyer {
        id: BuyerId(row.get("id")),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        buyer_type,
        source,
        preferred_areas,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

pub(crate) fn areas_json(areas: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(areas)
        .map_err(|err| RepositoryError::Unavailable(format!("unencodable areas: {err}")))
}

#[async_trait]
impl BuyerRepository for SqliteBuyerRepository {
    async fn insert(&self, buyer: Buyer) -> Result<Buyer, RepositoryError> {
        sqlx::query(
            "INSERT INTO buyers (id, first_name, last_name, email, phone, buyer_type, source, preferred_areas, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&buyer.id.0)
        .bind(&buyer.first_name)
        .bind(&buyer.last_name)
        .bind(&buyer.email)
        .bind(&buyer.phone)
        .bind(buyer.buyer_type.label())
        .bind(buyer.source.label())
        .bind(areas_json(&buyer.preferred_areas)?)
        .bind(buyer.created_at)
        .execute(&self.pool)
        .await?;
        Ok(buyer)
    }

    async fn update(&self, buyer: Buyer) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE buyers SET first_name = ?, last_name = ?, email = ?, phone = ?, buyer_type = ?, source = ?, preferred_areas = ? \
             WHERE id = ?",
        )
        .bind(&buyer.first_name)
        .bind(&buyer.last_name)
        .bind(&buyer.email)
        .bind(&buyer.phone)
        .bind(buyer.buyer_type.label())
        .bind(buyer.source.label())
        .bind(areas_json(&buyer.preferred_areas)?)
        .bind(&buyer.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn fetch(&self, id: &BuyerId) -> Result<Option<Buyer>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {BUYER_COLUMNS} FROM buyers WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(buyer_from_row).transpose()
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<Buyer>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {BUYER_COLUMNS} FROM buyers WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(buyer_from_row).transpose()
    }

    async fn fetch_by_phone(&self, phone: &str) -> Result<Option<Buyer>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {BUYER_COLUMNS} FROM buyers WHERE phone = ?"))
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(buyer_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Buyer>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {BUYER_COLUMNS} FROM buyers ORDER BY datetime(created_at) ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(buyer_from_row).collect()
    }

    async fn delete_cascading(&self, id: &BuyerId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Offers and memberships go first so the buyer row never leaves
        // orphans behind.
        sqlx::query("DELETE FROM offers WHERE buyer_id = ?")
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM buyer_list_members WHERE buyer_id = ?")
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM buyers WHERE id = ?")
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}
