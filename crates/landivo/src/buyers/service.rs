use std::io::Cursor;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::domain::{
    normalize_email, normalize_phone, Buyer, BuyerDraft, BuyerId, BuyerSource, BuyerUpdate,
    VipSignup,
};
use super::import::{parse_buyer_rows, ImportRowError};
use super::repository::BuyerRepository;
use crate::store::RepositoryError;

/// Service enforcing contact uniqueness and the buyer lifecycle rules.
pub struct BuyerService<R> {
    repository: Arc<R>,
}

/// Whether a VIP signup landed on an existing record or made a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Result of a persisted CSV import.
#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub imported: Vec<Buyer>,
    pub errors: Vec<ImportRowError>,
}

impl<R> BuyerService<R>
where
    R: BuyerRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a buyer after normalization and uniqueness checks.
    pub async fn create(
        &self,
        draft: BuyerDraft,
        source: BuyerSource,
    ) -> Result<Buyer, BuyerServiceError> {
        let draft = validated(draft)?;

        if self
            .repository
            .fetch_by_email(&draft.email)
            .await?
            .is_some()
        {
            return Err(BuyerServiceError::DuplicateEmail);
        }
        if self
            .repository
            .fetch_by_phone(&draft.phone)
            .await?
            .is_some()
        {
            return Err(BuyerServiceError::DuplicatePhone);
        }

        let buyer = Buyer {
            id: BuyerId::generate(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            buyer_type: draft.buyer_type,
            source,
            preferred_areas: draft.preferred_areas,
            created_at: Utc::now(),
        };

        let stored = self.repository.insert(buyer).await?;
        Ok(stored)
    }

    pub async fn get(&self, id: &BuyerId) -> Result<Buyer, BuyerServiceError> {
        self.repository
            .fetch(id)
            .await?
            .ok_or(BuyerServiceError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<Buyer>, BuyerServiceError> {
        Ok(self.repository.list().await?)
    }

    /// Apply a partial update. Email/phone changes are checked against every
    /// other buyer before being accepted.
    pub async fn update(
        &self,
        id: &BuyerId,
        update: BuyerUpdate,
    ) -> Result<Buyer, BuyerServiceError> {
        let mut buyer = self.get(id).await?;

        if let Some(email) = update.email {
            let email = normalize_email(&email);
            if email.is_empty() {
                return Err(BuyerServiceError::MissingFields("email".to_string()));
            }
            if let Some(owner) = self.repository.fetch_by_email(&email).await? {
                if owner.id != buyer.id {
                    return Err(BuyerServiceError::DuplicateEmail);
                }
            }
            buyer.email = email;
        }

        if let Some(phone) = update.phone {
            let phone = normalize_phone(&phone);
            if phone.is_empty() {
                return Err(BuyerServiceError::MissingFields("phone".to_string()));
            }
            if let Some(owner) = self.repository.fetch_by_phone(&phone).await? {
                if owner.id != buyer.id {
                    return Err(BuyerServiceError::DuplicatePhone);
                }
            }
            buyer.phone = phone;
        }

        if let Some(first_name) = update.first_name {
            buyer.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = update.last_name {
            buyer.last_name = last_name.trim().to_string();
        }
        if let Some(buyer_type) = update.buyer_type {
            buyer.buyer_type = buyer_type;
        }
        if let Some(preferred_areas) = update.preferred_areas {
            buyer.preferred_areas = preferred_areas;
        }

        self.repository.update(buyer.clone()).await?;
        Ok(buyer)
    }

    /// Delete the buyer and everything hanging off it (offers, memberships).
    pub async fn delete(&self, id: &BuyerId) -> Result<(), BuyerServiceError> {
        self.get(id).await?;
        self.repository.delete_cascading(id).await?;
        Ok(())
    }

    /// VIP signups upsert by email and always stamp the VIP source.
    pub async fn vip_signup(
        &self,
        signup: VipSignup,
    ) -> Result<(Buyer, UpsertOutcome), BuyerServiceError> {
        let email = normalize_email(&signup.email);
        if email.is_empty() {
            return Err(BuyerServiceError::MissingFields("email".to_string()));
        }

        if let Some(mut existing) = self.repository.fetch_by_email(&email).await? {
            let phone = normalize_phone(&signup.phone);
            if phone.is_empty() {
                return Err(BuyerServiceError::MissingFields("phone".to_string()));
            }
            if let Some(owner) = self.repository.fetch_by_phone(&phone).await? {
                if owner.id != existing.id {
                    return Err(BuyerServiceError::DuplicatePhone);
                }
            }

            existing.first_name = signup.first_name.trim().to_string();
            existing.last_name = signup.last_name.trim().to_string();
            existing.phone = phone;
            existing.buyer_type = signup.buyer_type;
            existing.preferred_areas = signup.preferred_areas;
            existing.source = BuyerSource::VipBuyersList;

            self.repository.update(existing.clone()).await?;
            return Ok((existing, UpsertOutcome::Updated));
        }

        let buyer = self
            .create(
                BuyerDraft {
                    first_name: signup.first_name,
                    last_name: signup.last_name,
                    email,
                    phone: signup.phone,
                    buyer_type: signup.buyer_type,
                    preferred_areas: signup.preferred_areas,
                },
                BuyerSource::VipBuyersList,
            )
            .await?;
        Ok((buyer, UpsertOutcome::Created))
    }

    /// Parse a CSV export and persist the valid rows. Parse failures and
    /// duplicate contacts are reported per row; the rest of the batch lands.
    pub async fn import_csv(&self, csv_text: &str) -> Result<ImportOutcome, BuyerServiceError> {
        let report = parse_buyer_rows(Cursor::new(csv_text.as_bytes()))
            .map_err(|err| BuyerServiceError::UnreadableCsv(err.to_string()))?;

        let mut imported = Vec::new();
        let mut errors = report.errors;

        for accepted in report.accepted {
            match self.create(accepted.draft, BuyerSource::CsvImport).await {
                Ok(buyer) => imported.push(buyer),
                Err(
                    err @ (BuyerServiceError::DuplicateEmail
                    | BuyerServiceError::DuplicatePhone
                    | BuyerServiceError::MissingFields(_)),
                ) => errors.push(ImportRowError {
                    row: accepted.row,
                    message: format!("row {}: {err}", accepted.row),
                }),
                Err(other) => return Err(other),
            }
        }

        Ok(ImportOutcome { imported, errors })
    }
}

fn validated(draft: BuyerDraft) -> Result<BuyerDraft, BuyerServiceError> {
    let first_name = draft.first_name.trim().to_string();
    let last_name = draft.last_name.trim().to_string();
    let email = normalize_email(&draft.email);
    let phone = normalize_phone(&draft.phone);

    let mut missing = Vec::new();
    if first_name.is_empty() {
        missing.push("first_name");
    }
    if last_name.is_empty() {
        missing.push("last_name");
    }
    if email.is_empty() {
        missing.push("email");
    }
    if phone.is_empty() {
        missing.push("phone");
    }
    if !missing.is_empty() {
        return Err(BuyerServiceError::MissingFields(missing.join(", ")));
    }

    Ok(BuyerDraft {
        first_name,
        last_name,
        email,
        phone,
        buyer_type: draft.buyer_type,
        preferred_areas: draft.preferred_areas,
    })
}

/// Error raised by the buyer service.
#[derive(Debug, thiserror::Error)]
pub enum BuyerServiceError {
    #[error("missing required field(s): {0}")]
    MissingFields(String),
    #[error("email already in use by another buyer")]
    DuplicateEmail,
    #[error("phone already in use by another buyer")]
    DuplicatePhone,
    #[error("buyer not found")]
    NotFound,
    #[error("unreadable csv payload: {0}")]
    UnreadableCsv(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
