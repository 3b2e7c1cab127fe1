use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Pool, RepositoryError};
use crate::properties::{Property, PropertyId, PropertyRepository};

const PROPERTY_COLUMNS: &str =
    "id, address, area, asking_price, minimum_offer, financing_available, created_at";

pub struct SqlitePropertyRepository {
    pool: Pool,
}

impl SqlitePropertyRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

pub(crate) fn property_from_row(row: &SqliteRow) -> Property {
    Property {
        id: PropertyId(row.get("id")),
        address: row.get("address"),
        area: row.get("area"),
        asking_price: row.get("asking_price"),
        minimum_offer: row.get("minimum_offer"),
        financing_available: row.get::<i64, _>("financing_available") != 0,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

#[async_trait]
impl PropertyRepository for SqlitePropertyRepository {
    async fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
        sqlx::query(
            "INSERT INTO properties (id, address, area, asking_price, minimum_offer, financing_available, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&property.id.0)
        .bind(&property.address)
        .bind(&property.area)
        .bind(property.asking_price)
        .bind(property.minimum_offer)
        .bind(i64::from(property.financing_available))
        .bind(property.created_at)
        .execute(&self.pool)
        .await?;
        Ok(property)
    }

    async fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ?"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(property_from_row))
    }

    async fn list(&self) -> Result<Vec<Property>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties ORDER BY datetime(created_at) ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(property_from_row).collect())
    }
}
