//! Pipeline errors

use thiserror::Error;

use super::branch::Stage;
use crate::auth::AuthError;
use crate::domain::TripIdError;
use crate::llm::LlmError;
use crate::state::StateError;

/// Why a generation run did not complete
///
/// Everything up to `Unauthorized` is raised before the trip is touched.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidTripId(#[from] TripIdError),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] AuthError),

    #[error("Trip not found: {0}")]
    NotFound(String),

    #[error("Trip belongs to another user")]
    Unauthorized,

    /// A stage's completion call failed; the trip stays at that stage's status
    #[error("Stage {stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

impl PipelineError {
    /// True when the run was rejected before any state was written
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidTripId(_) | Self::Unauthenticated(_) | Self::NotFound(_) | Self::Unauthorized
        )
    }

    /// The underlying completion error, if a stage failed
    pub fn llm_error(&self) -> Option<&LlmError> {
        match self {
            Self::Stage { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::branch::CurationBranch;
    use std::time::Duration;

    #[test]
    fn test_stage_error_display_and_source() {
        let err = PipelineError::Stage {
            stage: Stage::Curation(CurationBranch::Active),
            source: LlmError::RateLimited {
                retry_after: Duration::from_secs(30),
                message: "too many requests".to_string(),
            },
        };
        assert!(err.to_string().starts_with("Stage curation[active] failed: Rate limited"));
        assert_eq!(
            err.llm_error().and_then(LlmError::retry_after),
            Some(Duration::from_secs(30))
        );
        assert!(!err.is_rejection());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_rejections() {
        assert!(PipelineError::Unauthorized.is_rejection());
        assert!(PipelineError::from(AuthError::MissingCredential).is_rejection());
        assert!(PipelineError::from(TripIdError("x".to_string())).is_rejection());
        assert!(!PipelineError::Prompt("bad".to_string()).is_rejection());
    }
}
