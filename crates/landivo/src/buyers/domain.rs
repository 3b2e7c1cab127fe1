use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for buyer records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuyerId(pub String);

impl BuyerId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Category a buyer self-selects when joining the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerType {
    CashBuyer,
    Investor,
    Builder,
    Developer,
    Realtor,
    Wholesaler,
}

impl BuyerType {
    pub const fn label(self) -> &'static str {
        match self {
            BuyerType::CashBuyer => "cash_buyer",
            BuyerType::Investor => "investor",
            BuyerType::Builder => "builder",
            BuyerType::Developer => "developer",
            BuyerType::Realtor => "realtor",
            BuyerType::Wholesaler => "wholesaler",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cash_buyer" | "cashbuyer" | "cash buyer" => Some(Self::CashBuyer),
            "investor" => Some(Self::Investor),
            "builder" => Some(Self::Builder),
            "developer" => Some(Self::Developer),
            "realtor" => Some(Self::Realtor),
            "wholesaler" => Some(Self::Wholesaler),
            _ => None,
        }
    }
}

/// Acquisition channel a buyer record arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerSource {
    VipBuyersList,
    PropertyOffer,
    ManualEntry,
    CsvImport,
}

impl BuyerSource {
    pub const fn label(self) -> &'static str {
        match self {
            BuyerSource::VipBuyersList => "VIP Buyers List",
            BuyerSource::PropertyOffer => "Property Offer",
            BuyerSource::ManualEntry => "Manual Entry",
            BuyerSource::CsvImport => "CSV Import",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "VIP Buyers List" => Some(Self::VipBuyersList),
            "Property Offer" => Some(Self::PropertyOffer),
            "Manual Entry" => Some(Self::ManualEntry),
            "CSV Import" => Some(Self::CsvImport),
            _ => None,
        }
    }
}

/// A lead/contact record identified primarily by email or phone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: BuyerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub buyer_type: BuyerType,
    pub source: BuyerSource,
    pub preferred_areas: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Buyer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_vip(&self) -> bool {
        self.source == BuyerSource::VipBuyersList
    }
}

/// Inbound payload for creating a buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default = "default_buyer_type")]
    pub buyer_type: BuyerType,
    #[serde(default)]
    pub preferred_areas: Vec<String>,
}

fn default_buyer_type() -> BuyerType {
    BuyerType::Investor
}

/// Inbound payload for updating a buyer. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub buyer_type: Option<BuyerType>,
    pub preferred_areas: Option<Vec<String>>,
}

/// Inbound payload for the VIP signup upsert.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VipSignup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default = "default_buyer_type")]
    pub buyer_type: BuyerType,
    #[serde(default)]
    pub preferred_areas: Vec<String>,
}

/// Emails compare case-insensitively; phones are matched verbatim.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn normalize_phone(phone: &str) -> String {
    phone.trim().to_string()
}
