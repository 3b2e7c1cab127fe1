use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Pool, RepositoryError};
use crate::properties::PropertyId;
use crate::qualification::{
    DisqualificationFlag, QualificationSession, SessionId, SessionRepository, StepId,
};

const SESSION_COLUMNS: &str =
    "id, property_id, current_step, answers, flags, history, completed, created_at, updated_at";

pub struct SqliteSessionRepository {
    pool: Pool,
}

impl SqliteSessionRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(
    raw: &str,
    what: &str,
) -> Result<T, RepositoryError> {
    serde_json::from_str(raw)
        .map_err(|err| RepositoryError::Unavailable(format!("bad session {what}: {err}")))
}

fn encode_json<T: serde::Serialize>(value: &T, what: &str) -> Result<String, RepositoryError> {
    serde_json::to_string(value)
        .map_err(|err| RepositoryError::Unavailable(format!("unencodable session {what}: {err}")))
}

fn session_from_row(row: &SqliteRow) -> Result<QualificationSession, RepositoryError> {
    let step: String = row.get("current_step");
    let current_step = StepId::parse(&step)
        .ok_or_else(|| RepositoryError::Unavailable(format!("unknown step '{step}'")))?;

    let answers: String = row.get("answers");
    let flags: String = row.get("flags");
    let history: String = row.get("history");

    let answers: BTreeMap<String, String> = decode_json(&answers, "answers")?;
    let flags: BTreeSet<DisqualificationFlag> = decode_json(&flags, "flags")?;
    let history: Vec<StepId> = decode_json(&history, "history")?;

    Ok(QualificationSession {
        id: SessionId(row.get("id")),
        property_id: PropertyId(row.get("property_id")),
        current_step,
        answers,
        flags,
        history,
        completed: row.get::<i64, _>("completed") != 0,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn insert(
        &self,
        session: QualificationSession,
    ) -> Result<QualificationSession, RepositoryError> {
        sqlx::query(
            "INSERT INTO qualification_sessions (id, property_id, current_step, answers, flags, history, completed, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&session.id.0)
        .bind(&session.property_id.0)
        .bind(session.current_step.as_str())
        .bind(encode_json(&session.answers, "answers")?)
        .bind(encode_json(&session.flags, "flags")?)
        .bind(encode_json(&session.history, "history")?)
        .bind(i64::from(session.completed))
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(session)
    }

    async fn update(&self, session: QualificationSession) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE qualification_sessions SET current_step = ?, answers = ?, flags = ?, history = ?, completed = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(session.current_step.as_str())
        .bind(encode_json(&session.answers, "answers")?)
        .bind(encode_json(&session.flags, "flags")?)
        .bind(encode_json(&session.history, "history")?)
        .bind(i64::from(session.completed))
        .bind(session.updated_at)
        .bind(&session.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn fetch(
        &self,
        id: &SessionId,
    ) -> Result<Option<QualificationSession>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM qualification_sessions WHERE id = ?"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(session_from_row).transpose()
    }
}
