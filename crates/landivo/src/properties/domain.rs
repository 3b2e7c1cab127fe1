use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for property listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

impl PropertyId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// A listed property. Offers read the price bounds; qualification reads the
/// financing flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub address: String,
    pub area: String,
    pub asking_price: i64,
    pub minimum_offer: i64,
    pub financing_available: bool,
    pub created_at: DateTime<Utc>,
}

/// Inbound payload for seeding a property.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    /// Optional external id so seed data can keep stable references.
    pub id: Option<String>,
    pub address: String,
    pub area: String,
    pub asking_price: i64,
    #[serde(default)]
    pub minimum_offer: Option<i64>,
    #[serde(default)]
    pub financing_available: bool,
}

impl PropertyDraft {
    pub fn into_property(self) -> Property {
        let minimum_offer = self.minimum_offer.unwrap_or(self.asking_price);
        Property {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .map(PropertyId)
                .unwrap_or_else(PropertyId::generate),
            address: self.address,
            area: self.area,
            asking_price: self.asking_price,
            minimum_offer,
            financing_available: self.financing_available,
            created_at: Utc::now(),
        }
    }
}
