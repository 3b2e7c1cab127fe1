use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::domain::{QualificationSession, SessionId, SessionSummary};
use super::repository::SessionRepository;
use super::steps::{self, StepId, StepKind};
use crate::properties::{PropertyId, PropertyRepository};
use crate::store::RepositoryError;

/// Service driving sessions through the step graph.
pub struct QualificationService<S, P> {
    sessions: Arc<S>,
    properties: Arc<P>,
}

/// A step as presented to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub id: StepId,
    pub prompt: &'static str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<&'static str>,
}

impl StepView {
    pub(crate) fn for_step(id: StepId) -> Self {
        let node = steps::node(id);
        let (kind, options) = match node.kind {
            StepKind::Choice(options) => ("choice", options.to_vec()),
            StepKind::Text => ("text", Vec::new()),
            StepKind::Number => ("number", Vec::new()),
        };
        Self {
            id,
            prompt: node.prompt,
            kind,
            options,
        }
    }
}

/// Response to a recorded answer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub next: StepView,
    pub completed: bool,
    pub flags: Vec<super::domain::DisqualificationFlag>,
}

impl<S, P> QualificationService<S, P>
where
    S: SessionRepository + 'static,
    P: PropertyRepository + 'static,
{
    pub fn new(sessions: Arc<S>, properties: Arc<P>) -> Self {
        Self {
            sessions,
            properties,
        }
    }

    /// Open a session against a financed property.
    pub async fn start(
        &self,
        property_id: &PropertyId,
    ) -> Result<QualificationSession, QualificationServiceError> {
        let property = self
            .properties
            .fetch(property_id)
            .await?
            .ok_or(QualificationServiceError::PropertyNotFound)?;

        if !property.financing_available {
            return Err(QualificationServiceError::FinancingUnavailable);
        }

        let session = QualificationSession::start(property.id);
        Ok(self.sessions.insert(session).await?)
    }

    pub async fn current_step(
        &self,
        session_id: &SessionId,
    ) -> Result<StepView, QualificationServiceError> {
        let session = self.fetch(session_id).await?;
        Ok(StepView::for_step(session.current_step))
    }

    /// Record an answer for the session's current step and advance through
    /// the graph. Flags are recomputed from the whole survey on every write.
    pub async fn answer(
        &self,
        session_id: &SessionId,
        step: StepId,
        value: &str,
    ) -> Result<AnswerOutcome, QualificationServiceError> {
        let mut session = self.fetch(session_id).await?;

        if session.completed {
            return Err(QualificationServiceError::AlreadyCompleted);
        }
        if step != session.current_step {
            return Err(QualificationServiceError::StepMismatch {
                expected: session.current_step,
            });
        }

        steps::validate_answer(step, value)
            .map_err(QualificationServiceError::InvalidAnswer)?;

        session
            .answers
            .insert(step.as_str().to_string(), value.trim().to_string());
        session.recompute_flags();

        let next = steps::advance(step, value.trim())
            .ok_or_else(|| QualificationServiceError::InvalidAnswer("no next step".to_string()))?;

        session.history.push(step);
        session.current_step = next;
        if next == StepId::Summary {
            session.completed = true;
        }
        session.updated_at = Utc::now();

        let outcome = AnswerOutcome {
            next: StepView::for_step(next),
            completed: session.completed,
            flags: session.flags.iter().copied().collect(),
        };

        self.sessions.update(session).await?;
        Ok(outcome)
    }

    /// Step back to the previously shown screen.
    pub async fn back(
        &self,
        session_id: &SessionId,
    ) -> Result<StepView, QualificationServiceError> {
        let mut session = self.fetch(session_id).await?;

        let previous = session
            .history
            .pop()
            .ok_or(QualificationServiceError::AtFirstStep)?;

        session.current_step = previous;
        session.completed = false;
        session.updated_at = Utc::now();

        let view = StepView::for_step(previous);
        self.sessions.update(session).await?;
        Ok(view)
    }

    pub async fn summary(
        &self,
        session_id: &SessionId,
    ) -> Result<SessionSummary, QualificationServiceError> {
        let session = self.fetch(session_id).await?;
        Ok(session.summary())
    }

    async fn fetch(
        &self,
        session_id: &SessionId,
    ) -> Result<QualificationSession, QualificationServiceError> {
        self.sessions
            .fetch(session_id)
            .await?
            .ok_or(QualificationServiceError::SessionNotFound)
    }
}

/// Error raised by the qualification service.
#[derive(Debug, thiserror::Error)]
pub enum QualificationServiceError {
    #[error("property not found")]
    PropertyNotFound,
    #[error("seller financing is not offered on this property")]
    FinancingUnavailable,
    #[error("session not found")]
    SessionNotFound,
    #[error("answer targets the wrong step (expected {})", expected.as_str())]
    StepMismatch { expected: StepId },
    #[error("invalid answer: {0}")]
    InvalidAnswer(String),
    #[error("session already completed")]
    AlreadyCompleted,
    #[error("already at the first step")]
    AtFirstStep,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
