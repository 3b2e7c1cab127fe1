use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::buyers::BuyerId;
use crate::properties::PropertyId;

/// Identifier wrapper for offers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub String);

impl OfferId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// A buyer's standing bid on a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    pub buyer_id: BuyerId,
    pub property_id: PropertyId,
    pub offered_price: i64,
    pub offered_at: DateTime<Utc>,
}

/// What the intake branch decided for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeDecision {
    /// First offer from this buyer on this property.
    Create { below_minimum: bool },
    /// The buyer already has an offer and the new price is strictly higher.
    Raise { previous_price: i64 },
    /// The new price does not beat the standing offer; nothing is written.
    Reject,
}

/// The intake branch. A price below the property minimum is still accepted
/// on first contact; it rides the low-offer notification path.
pub fn decide(existing: Option<&Offer>, offered_price: i64, minimum_offer: i64) -> IntakeDecision {
    match existing {
        None => IntakeDecision::Create {
            below_minimum: offered_price < minimum_offer,
        },
        Some(offer) if offered_price > offer.offered_price => IntakeDecision::Raise {
            previous_price: offer.offered_price,
        },
        Some(_) => IntakeDecision::Reject,
    }
}

/// Prices arrive as a JSON number or a numeric string; legacy clients sent
/// strings like `"50000"`.
pub fn deserialize_price<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("'{value}' is not a whole price"))),
    }
}
