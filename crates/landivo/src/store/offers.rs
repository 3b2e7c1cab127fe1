use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::buyers::{areas_json, buyer_from_row, BUYER_COLUMNS};
use super::outbox::enqueue_tx;
use super::properties::property_from_row;
use super::{Pool, RepositoryError};
use crate::buyers::{Buyer, BuyerId, BuyerSource};
use crate::notifications::templates;
use crate::offers::{
    decide, IntakeDecision, Offer, OfferId, OfferRepository, OfferSubmission, SubmissionFault,
    SubmissionOutcome,
};
use crate::properties::PropertyId;

const OFFER_COLUMNS: &str = "id, buyer_id, property_id, offered_price, offered_at";

pub struct SqliteOfferRepository {
    pool: Pool,
}

impl SqliteOfferRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn offer_from_row(row: &SqliteRow) -> Offer {
    Offer {
        id: OfferId(row.get("id")),
        buyer_id: BuyerId(row.get("buyer_id")),
        property_id: PropertyId(row.get("property_id")),
        offered_price: row.get("offered_price"),
        offered_at: row.get::<DateTime<Utc>, _>("offered_at"),
    }
}

#[async_trait]
impl OfferRepository for SqliteOfferRepository {
    /// The intake unit: property read, buyer find-or-create, the
    /// create/raise/reject branch, and the notification enqueue run in one
    /// transaction. A rejection writes nothing.
    async fn submit(
        &self,
        submission: OfferSubmission,
    ) -> Result<SubmissionOutcome, SubmissionFault> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let property_row = sqlx::query(
            "SELECT id, address, area, asking_price, minimum_offer, financing_available, created_at \
             FROM properties WHERE id = ?",
        )
        .bind(&submission.property_id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        let Some(property_row) = property_row else {
            return Err(SubmissionFault::PropertyNotFound);
        };
        let property = property_from_row(&property_row);

        let buyer = match sqlx::query(&format!(
            "SELECT {BUYER_COLUMNS} FROM buyers WHERE email = ?"
        ))
        .bind(&submission.email)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from)?
        {
            Some(row) => Some(buyer_from_row(&row)?),
            None => sqlx::query(&format!(
                "SELECT {BUYER_COLUMNS} FROM buyers WHERE phone = ?"
            ))
            .bind(&submission.phone)
            .fetch_optional(&mut *tx)
            .await
            .map_err(RepositoryError::from)?
            .as_ref()
            .map(buyer_from_row)
            .transpose()?,
        };

        let buyer = match buyer {
            Some(buyer) => buyer,
            None => {
                let buyer = Buyer {
                    id: BuyerId::generate(),
                    first_name: submission.first_name.clone(),
                    last_name: submission.last_name.clone(),
                    email: submission.email.clone(),
                    phone: submission.phone.clone(),
                    buyer_type: submission.buyer_type,
                    source: BuyerSource::PropertyOffer,
                    preferred_areas: Vec::new(),
                    created_at: Utc::now(),
                };
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
                .execute(&mut *tx)
                .await
                .map_err(RepositoryError::from)?;
                buyer
            }
        };

        let existing = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE buyer_id = ? AND property_id = ?"
        ))
        .bind(&buyer.id.0)
        .bind(&property.id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from)?
        .as_ref()
        .map(offer_from_row);

        let decision = decide(
            existing.as_ref(),
            submission.offered_price,
            property.minimum_offer,
        );

        match (decision, existing) {
            (IntakeDecision::Create { below_minimum }, _) => {
                let offer = Offer {
                    id: OfferId::generate(),
                    buyer_id: buyer.id.clone(),
                    property_id: property.id.clone(),
                    offered_price: submission.offered_price,
                    offered_at: Utc::now(),
                };
                sqlx::query(
                    "INSERT INTO offers (id, buyer_id, property_id, offered_price, offered_at) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&offer.id.0)
                .bind(&offer.buyer_id.0)
                .bind(&offer.property_id.0)
                .bind(offer.offered_price)
                .bind(offer.offered_at)
                .execute(&mut *tx)
                .await
                .map_err(RepositoryError::from)?;

                let notification = if below_minimum {
                    templates::offer_below_minimum(&buyer, &property, offer.offered_price)
                } else {
                    templates::offer_received(&buyer, &property, offer.offered_price)
                };
                enqueue_tx(&mut tx, &notification)
                    .await
                    .map_err(RepositoryError::from)?;

                tx.commit().await.map_err(RepositoryError::from)?;
                Ok(SubmissionOutcome::Created {
                    offer,
                    buyer,
                    below_minimum,
                })
            }
            (IntakeDecision::Raise { previous_price }, Some(mut offer)) => {
                offer.offered_price = submission.offered_price;
                offer.offered_at = Utc::now();
                sqlx::query("UPDATE offers SET offered_price = ?, offered_at = ? WHERE id = ?")
                    .bind(offer.offered_price)
                    .bind(offer.offered_at)
                    .bind(&offer.id.0)
                    .execute(&mut *tx)
                    .await
                    .map_err(RepositoryError::from)?;

                let notification =
                    templates::offer_updated(&buyer, &property, previous_price, offer.offered_price);
                enqueue_tx(&mut tx, &notification)
                    .await
                    .map_err(RepositoryError::from)?;

                tx.commit().await.map_err(RepositoryError::from)?;
                Ok(SubmissionOutcome::Raised {
                    offer,
                    buyer,
                    previous_price,
                })
            }
            (IntakeDecision::Reject, Some(existing)) => {
                // Dropping the transaction discards the lookup; nothing was
                // written and nothing is enqueued.
                Ok(SubmissionOutcome::NotHigher { existing })
            }
            (IntakeDecision::Raise { .. } | IntakeDecision::Reject, None) => Err(
                RepositoryError::Unavailable("intake decision desynced from lookup".to_string())
                    .into(),
            ),
        }
    }

    async fn list_for_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Vec<Offer>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE property_id = ? ORDER BY offered_price DESC"
        ))
        .bind(&property_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(offer_from_row).collect())
    }

    async fn list_for_buyer(&self, buyer_id: &BuyerId) -> Result<Vec<Offer>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE buyer_id = ? ORDER BY datetime(offered_at) DESC"
        ))
        .bind(&buyer_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(offer_from_row).collect())
    }
}
