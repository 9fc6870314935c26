use thiserror::Error;

use super::RepositoryError;

/// Errors raised while mapping a URL to a short key.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Key too long: '{key}' exceeds {max} characters")]
    KeyTooLong { key: String, max: usize },

    #[error("Key conflict: '{0}' is already in use")]
    KeyConflict(String),

    #[error("Key allocation exhausted: no free key after {attempts} attempts")]
    KeyAllocationExhausted { attempts: u32 },

    #[error("Batch too large: {size} items exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

impl AllocationError {
    /// Stable machine-readable tag, used in JSON bodies and batch results.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::InvalidKeyFormat(_) => "INVALID_KEY_FORMAT",
            Self::KeyTooLong { .. } => "KEY_TOO_LONG",
            Self::KeyConflict(_) => "KEY_CONFLICT",
            Self::KeyAllocationExhausted { .. } => "KEY_ALLOCATION_EXHAUSTED",
            Self::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Caller mistakes that are reported as-is and never retried.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl(_)
                | Self::InvalidKeyFormat(_)
                | Self::KeyTooLong { .. }
                | Self::BatchTooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_distinct_per_variant() {
        let errors = [
            AllocationError::InvalidUrl("x".into()),
            AllocationError::InvalidKeyFormat("x".into()),
            AllocationError::KeyTooLong { key: "x".into(), max: 12 },
            AllocationError::KeyConflict("x".into()),
            AllocationError::KeyAllocationExhausted { attempts: 3 },
            AllocationError::BatchTooLarge { size: 101, max: 100 },
            AllocationError::Persistence(RepositoryError::NotFound("x".into())),
        ];
        let mut tags: Vec<_> = errors.iter().map(|e| e.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), errors.len());
    }

    #[test]
    fn only_caller_mistakes_are_validation_errors() {
        assert!(AllocationError::KeyTooLong { key: "x".into(), max: 1 }.is_validation());
        assert!(AllocationError::BatchTooLarge { size: 2, max: 1 }.is_validation());
        assert!(!AllocationError::KeyConflict("x".into()).is_validation());
        assert!(!AllocationError::KeyAllocationExhausted { attempts: 3 }.is_validation());
    }
}
