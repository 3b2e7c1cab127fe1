use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::buyers::{Buyer, BuyerType};

/// Identifier wrapper for buyer lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListId(pub String);

impl ListId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Filter describing which buyers belong to a criteria-driven list.
/// Empty fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCriteria {
    #[serde(default)]
    pub areas: Vec<String>,
    #[serde(default)]
    pub buyer_types: Vec<BuyerType>,
    #[serde(default)]
    pub vip_only: bool,
}

impl ListCriteria {
    pub fn matches(&self, buyer: &Buyer) -> bool {
        if self.vip_only && !buyer.is_vip() {
            return false;
        }

        if !self.buyer_types.is_empty() && !self.buyer_types.contains(&buyer.buyer_type) {
            return false;
        }

        if !self.areas.is_empty() {
            let in_area = buyer.preferred_areas.iter().any(|area| {
                self.areas
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(area))
            });
            if !in_area {
                return false;
            }
        }

        true
    }
}

/// An admin-curated grouping of buyers. `criteria == None` means membership
/// is explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerList {
    pub id: ListId,
    pub name: String,
    pub description: Option<String>,
    pub criteria: Option<ListCriteria>,
    pub created_at: DateTime<Utc>,
}

/// Inbound payload for creating a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub criteria: Option<ListCriteria>,
}

/// Case-insensitive substring match over name and email, mirroring the
/// member search box.
pub fn search_members(buyers: Vec<Buyer>, query: &str) -> Vec<Buyer> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return buyers;
    }

    buyers
        .into_iter()
        .filter(|buyer| {
            buyer.full_name().to_lowercase().contains(&needle)
                || buyer.email.to_lowercase().contains(&needle)
        })
        .collect()
}
