//! Seller-financing pre-qualification: a multi-screen questionnaire modeled
//! as an explicit step graph with server-side sessions. Disqualifying answers
//! raise soft flags; they never block the applicant from finishing.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod steps;

#[cfg(test)]
mod tests;

pub use domain::{DisqualificationFlag, QualificationSession, SessionId, SessionSummary};
pub use repository::SessionRepository;
pub use router::qualification_router;
pub use service::{AnswerOutcome, QualificationService, QualificationServiceError, StepView};
pub use steps::{advance, first_step, node, StepId, StepKind, StepNode};
