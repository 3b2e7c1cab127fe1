use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Pool, RepositoryError};
use crate::buyers::BuyerId;
use crate::lists::{BuyerList, ListCriteria, ListId, ListRepository};

const LIST_COLUMNS: &str = "id, name, description, criteria, created_at";

pub struct SqliteListRepository {
    pool: Pool,
}

impl SqliteListRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn list_from_row(row: &SqliteRow) -> Result<BuyerList, RepositoryError> {
    let criteria: Option<String> = row.get("criteria");
    let criteria = criteria
        .map(|raw| {
            serde_json::from_str::<ListCriteria>(&raw)
                .map_err(|err| RepositoryError::Unavailable(format!("bad criteria: {err}")))
        })
        .transpose()?;

    Ok(BuyerList {
        id: ListId(row.get("id")),
        name: row.get("name"),
        description: row.get("description"),
        criteria,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

#[async_trait]
impl ListRepository for SqliteListRepository {
    async fn insert(&self, list: BuyerList) -> Result<BuyerList, RepositoryError> {
        let criteria = list
            .criteria
            .as_ref()
            .map(|criteria| {
                serde_json::to_string(criteria).map_err(|err| {
                    RepositoryError::Unavailable(format!("unencodable criteria: {err}"))
                })
            })
            .transpose()?;

        sqlx::query(
            "INSERT INTO buyer_lists (id, name, description, criteria, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&list.id.0)
        .bind(&list.name)
        .bind(&list.description)
        .bind(criteria)
        .bind(list.created_at)
        .execute(&self.pool)
        .await?;
        Ok(list)
    }

    async fn fetch(&self, id: &ListId) -> Result<Option<BuyerList>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {LIST_COLUMNS} FROM buyer_lists WHERE id = ?"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(list_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<BuyerList>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {LIST_COLUMNS} FROM buyer_lists ORDER BY datetime(created_at) ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(list_from_row).collect()
    }

    async fn delete(&self, id: &ListId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM buyer_list_members WHERE list_id = ?")
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM buyer_lists WHERE id = ?")
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    async fn add_member(
        &self,
        list_id: &ListId,
        buyer_id: &BuyerId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR IGNORE INTO buyer_list_members (list_id, buyer_id) VALUES (?, ?)",
        )
        .bind(&list_id.0)
        .bind(&buyer_id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_member(
        &self,
        list_id: &ListId,
        buyer_id: &BuyerId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM buyer_list_members WHERE list_id = ? AND buyer_id = ?")
            .bind(&list_id.0)
            .bind(&buyer_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn member_ids(&self, list_id: &ListId) -> Result<Vec<BuyerId>, RepositoryError> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT buyer_id FROM buyer_list_members WHERE list_id = ?")
                .bind(&list_id.0)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().map(BuyerId).collect())
    }
}
