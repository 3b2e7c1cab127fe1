use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::steps::{self, StepId};
use crate::properties::PropertyId;

/// Identifier wrapper for qualification sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Soft disqualifiers. They color the closing copy and the admin review, but
/// the applicant can always finish the questionnaire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DisqualificationFlag {
    LowIncome,
    LowCreditScore,
    BehindOnPayments,
    RecentForeclosure,
    RecentBankruptcy,
}

/// Annual income below this raises the low-income flag.
pub const LOW_INCOME_THRESHOLD: i64 = 30_000;

/// Derive the flag (if any) a single answer raises.
pub fn evaluate_flag(step: StepId, answer: &str) -> Option<DisqualificationFlag> {
    let answer = answer.trim();
    match step {
        StepId::GrossAnnualIncome => answer
            .parse::<i64>()
            .ok()
            .filter(|income| *income < LOW_INCOME_THRESHOLD)
            .map(|_| DisqualificationFlag::LowIncome),
        StepId::CreditScoreRange => {
            (answer == "below_580").then_some(DisqualificationFlag::LowCreditScore)
        }
        StepId::CurrentOnPayments => (answer == "no").then_some(DisqualificationFlag::BehindOnPayments),
        StepId::ForeclosureHistory => {
            (answer == "yes").then_some(DisqualificationFlag::RecentForeclosure)
        }
        StepId::DeclaredBankruptcy => {
            (answer == "yes").then_some(DisqualificationFlag::RecentBankruptcy)
        }
        _ => None,
    }
}

/// One applicant's progress through the questionnaire. `answers` is the flat
/// survey map keyed by step id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationSession {
    pub id: SessionId,
    pub property_id: PropertyId,
    pub current_step: StepId,
    pub answers: BTreeMap<String, String>,
    pub flags: BTreeSet<DisqualificationFlag>,
    pub history: Vec<StepId>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QualificationSession {
    pub fn start(property_id: PropertyId) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::generate(),
            property_id,
            current_step: steps::first_step(),
            answers: BTreeMap::new(),
            flags: BTreeSet::new(),
            history: Vec::new(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute the flag set from every recorded answer. Back-navigation can
    /// rewrite earlier answers, so flags are always derived, never patched.
    pub fn recompute_flags(&mut self) {
        self.flags = self
            .answers
            .iter()
            .filter_map(|(step, answer)| {
                StepId::parse(step).and_then(|id| evaluate_flag(id, answer))
            })
            .collect();
    }

    pub fn qualified(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            property_id: self.property_id.clone(),
            current_step: self.current_step,
            answers: self.answers.clone(),
            flags: self.flags.iter().copied().collect(),
            completed: self.completed,
            qualified: self.qualified(),
        }
    }
}

/// Read model returned by the session summary endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub property_id: PropertyId,
    pub current_step: StepId,
    pub answers: BTreeMap<String, String>,
    pub flags: Vec<DisqualificationFlag>,
    pub completed: bool,
    pub qualified: bool,
}
