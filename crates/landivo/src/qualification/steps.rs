//! The questionnaire as an explicit graph: every step names the steps that
//! may follow it, so the branch taken out of `employment_status` is data,
//! not control flow buried in a handler.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    HomeUsage,
    PurchaseTiming,
    CurrentHomeOwnership,
    RealEstateAgent,
    BudgetRange,
    DownPayment,
    EmploymentStatus,
    VerifyIncomeEmployed,
    VerifyIncomeSelfEmployed,
    VerifyIncomeNotEmployed,
    VerifyIncomeRetired,
    GrossAnnualIncome,
    IncomeHistory,
    CreditScoreRange,
    OpenCreditLines,
    TotalMonthlyPayments,
    ForeclosureHistory,
    DeclaredBankruptcy,
    CurrentOnPayments,
    LiensOrJudgments,
    ContactName,
    ContactDetails,
    Summary,
}

impl StepId {
    pub fn as_str(self) -> &'static str {
        match self {
            StepId::HomeUsage => "home_usage",
            StepId::PurchaseTiming => "purchase_timing",
            StepId::CurrentHomeOwnership => "current_home_ownership",
            StepId::RealEstateAgent => "real_estate_agent",
            StepId::BudgetRange => "budget_range",
            StepId::DownPayment => "down_payment",
            StepId::EmploymentStatus => "employment_status",
            StepId::VerifyIncomeEmployed => "verify_income_employed",
            StepId::VerifyIncomeSelfEmployed => "verify_income_self_employed",
            StepId::VerifyIncomeNotEmployed => "verify_income_not_employed",
            StepId::VerifyIncomeRetired => "verify_income_retired",
            StepId::GrossAnnualIncome => "gross_annual_income",
            StepId::IncomeHistory => "income_history",
            StepId::CreditScoreRange => "credit_score_range",
            StepId::OpenCreditLines => "open_credit_lines",
            StepId::TotalMonthlyPayments => "total_monthly_payments",
            StepId::ForeclosureHistory => "foreclosure_history",
            StepId::DeclaredBankruptcy => "declared_bankruptcy",
            StepId::CurrentOnPayments => "current_on_payments",
            StepId::LiensOrJudgments => "liens_or_judgments",
            StepId::ContactName => "contact_name",
            StepId::ContactDetails => "contact_details",
            StepId::Summary => "summary",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        ALL_STEPS
            .iter()
            .map(|node| node.id)
            .find(|id| id.as_str() == value.trim())
    }
}

/// How a step's answer is captured and validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Choice(&'static [&'static str]),
    Text,
    Number,
}

/// One screen of the questionnaire.
#[derive(Debug, Clone, Copy)]
pub struct StepNode {
    pub id: StepId,
    pub prompt: &'static str,
    pub kind: StepKind,
    pub allowed_next: &'static [StepId],
}

pub const EMPLOYMENT_OPTIONS: &[&str] = &["employed", "self_employed", "not_employed", "retired"];

pub const CREDIT_OPTIONS: &[&str] = &[
    "excellent_720_plus",
    "good_680_719",
    "fair_620_679",
    "poor_580_619",
    "below_580",
];

const YES_NO: &[&str] = &["yes", "no"];

pub const ALL_STEPS: &[StepNode] = &[
    StepNode {
        id: StepId::HomeUsage,
        prompt: "How do you plan to use the property?",
        kind: StepKind::Choice(&["primary_residence", "secondary_home", "investment"]),
        allowed_next: &[StepId::PurchaseTiming],
    },
    StepNode {
        id: StepId::PurchaseTiming,
        prompt: "When are you hoping to purchase?",
        kind: StepKind::Choice(&["asap", "one_to_three_months", "three_to_six_months", "just_browsing"]),
        allowed_next: &[StepId::CurrentHomeOwnership],
    },
    StepNode {
        id: StepId::CurrentHomeOwnership,
        prompt: "Do you currently own or rent your home?",
        kind: StepKind::Choice(&["own", "rent", "other"]),
        allowed_next: &[StepId::RealEstateAgent],
    },
    StepNode {
        id: StepId::RealEstateAgent,
        prompt: "Are you working with a real estate agent?",
        kind: StepKind::Choice(YES_NO),
        allowed_next: &[StepId::BudgetRange],
    },
    StepNode {
        id: StepId::BudgetRange,
        prompt: "What total budget are you working with (USD)?",
        kind: StepKind::Number,
        allowed_next: &[StepId::DownPayment],
    },
    StepNode {
        id: StepId::DownPayment,
        prompt: "How much can you put down today (USD)?",
        kind: StepKind::Number,
        allowed_next: &[StepId::EmploymentStatus],
    },
    StepNode {
        id: StepId::EmploymentStatus,
        prompt: "What best describes your employment?",
        kind: StepKind::Choice(EMPLOYMENT_OPTIONS),
        allowed_next: &[
            StepId::VerifyIncomeEmployed,
            StepId::VerifyIncomeSelfEmployed,
            StepId::VerifyIncomeNotEmployed,
            StepId::VerifyIncomeRetired,
        ],
    },
    StepNode {
        id: StepId::VerifyIncomeEmployed,
        prompt: "How will you verify income? (pay stubs, W-2, employer letter)",
        kind: StepKind::Choice(&["pay_stubs", "w2", "employer_letter"]),
        allowed_next: &[StepId::GrossAnnualIncome],
    },
    StepNode {
        id: StepId::VerifyIncomeSelfEmployed,
        prompt: "How will you verify income? (tax returns, bank statements, 1099)",
        kind: StepKind::Choice(&["tax_returns", "bank_statements", "ten_ninety_nine"]),
        allowed_next: &[StepId::GrossAnnualIncome],
    },
    StepNode {
        id: StepId::VerifyIncomeNotEmployed,
        prompt: "What income would the purchase rely on?",
        kind: StepKind::Choice(&["benefits", "savings", "household_member", "other"]),
        allowed_next: &[StepId::GrossAnnualIncome],
    },
    StepNode {
        id: StepId::VerifyIncomeRetired,
        prompt: "How will you verify retirement income? (social security, pension, distributions)",
        kind: StepKind::Choice(&["social_security", "pension", "retirement_distributions"]),
        allowed_next: &[StepId::GrossAnnualIncome],
    },
    StepNode {
        id: StepId::GrossAnnualIncome,
        prompt: "What is your gross annual income (USD)?",
        kind: StepKind::Number,
        allowed_next: &[StepId::IncomeHistory],
    },
    StepNode {
        id: StepId::IncomeHistory,
        prompt: "Have you had steady income for the last two years?",
        kind: StepKind::Choice(YES_NO),
        allowed_next: &[StepId::CreditScoreRange],
    },
    StepNode {
        id: StepId::CreditScoreRange,
        prompt: "Where does your credit score fall?",
        kind: StepKind::Choice(CREDIT_OPTIONS),
        allowed_next: &[StepId::OpenCreditLines],
    },
    StepNode {
        id: StepId::OpenCreditLines,
        prompt: "How many open credit lines do you have?",
        kind: StepKind::Number,
        allowed_next: &[StepId::TotalMonthlyPayments],
    },
    StepNode {
        id: StepId::TotalMonthlyPayments,
        prompt: "What are your total monthly debt payments (USD)?",
        kind: StepKind::Number,
        allowed_next: &[StepId::ForeclosureHistory],
    },
    StepNode {
        id: StepId::ForeclosureHistory,
        prompt: "Any foreclosure in the last four years?",
        kind: StepKind::Choice(YES_NO),
        allowed_next: &[StepId::DeclaredBankruptcy],
    },
    StepNode {
        id: StepId::DeclaredBankruptcy,
        prompt: "Have you declared bankruptcy in the last two years?",
        kind: StepKind::Choice(YES_NO),
        allowed_next: &[StepId::CurrentOnPayments],
    },
    StepNode {
        id: StepId::CurrentOnPayments,
        prompt: "Are you current on all existing payments?",
        kind: StepKind::Choice(YES_NO),
        allowed_next: &[StepId::LiensOrJudgments],
    },
    StepNode {
        id: StepId::LiensOrJudgments,
        prompt: "Any outstanding liens or judgments?",
        kind: StepKind::Choice(YES_NO),
        allowed_next: &[StepId::ContactName],
    },
    StepNode {
        id: StepId::ContactName,
        prompt: "What is your full name?",
        kind: StepKind::Text,
        allowed_next: &[StepId::ContactDetails],
    },
    StepNode {
        id: StepId::ContactDetails,
        prompt: "Best email or phone to reach you?",
        kind: StepKind::Text,
        allowed_next: &[StepId::Summary],
    },
    StepNode {
        id: StepId::Summary,
        prompt: "All set. A team member will review your answers.",
        kind: StepKind::Text,
        allowed_next: &[],
    },
];

pub fn first_step() -> StepId {
    StepId::HomeUsage
}

pub fn node(id: StepId) -> &'static StepNode {
    ALL_STEPS
        .iter()
        .find(|candidate| candidate.id == id)
        .unwrap_or(&ALL_STEPS[0])
}

/// Pick the successor for `current` given its recorded answer. Linear steps
/// have exactly one allowed successor; the employment branch selects the
/// verification screen matching the answer.
pub fn advance(current: StepId, answer: &str) -> Option<StepId> {
    if current == StepId::EmploymentStatus {
        let target = match answer {
            "employed" => StepId::VerifyIncomeEmployed,
            "self_employed" => StepId::VerifyIncomeSelfEmployed,
            "not_employed" => StepId::VerifyIncomeNotEmployed,
            "retired" => StepId::VerifyIncomeRetired,
            _ => return None,
        };
        debug_assert!(node(current).allowed_next.contains(&target));
        return Some(target);
    }

    node(current).allowed_next.first().copied()
}

/// Check an answer against the step's capture kind.
pub fn validate_answer(id: StepId, answer: &str) -> Result<(), String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err("answer must not be empty".to_string());
    }

    match node(id).kind {
        StepKind::Choice(options) => {
            if options.contains(&answer) {
                Ok(())
            } else {
                Err(format!(
                    "'{answer}' is not one of: {}",
                    options.join(", ")
                ))
            }
        }
        StepKind::Number => answer
            .parse::<i64>()
            .ok()
            .filter(|value| *value >= 0)
            .map(|_| ())
            .ok_or_else(|| format!("'{answer}' is not a non-negative whole number")),
        StepKind::Text => Ok(()),
    }
}
