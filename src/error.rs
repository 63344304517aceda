use thiserror::Error;

/// Failure reported by a [`crate::GraphSource`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("not authorized")]
    Unauthorized,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidResponse(e.to_string())
    }
}

/// Insertion contract violations of the [`crate::RenderGraph`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderGraphError {
    #[error("node {0} already exists")]
    DuplicateNode(String),
    #[error("edge {0} already exists")]
    DuplicateEdge(String),
    #[error("node {0} does not exist")]
    MissingNode(String),
}

/// Errors surfaced by [`crate::GraphSyncEngine`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("failed to load graph: {0}")]
    LoadFailure(#[from] FetchError),
    /// The cause is logged, not carried.
    #[error("failed to update {target}")]
    MutationFailure { target: String },
}

impl SyncError {
    pub(crate) fn mutation(target: impl Into<String>) -> Self {
        Self::MutationFailure {
            target: target.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_failure_message_is_generic() {
        let e = SyncError::mutation("node a");
        assert_eq!(e.to_string(), "failed to update node a");
    }

    #[test]
    fn load_failure_wraps_fetch_error() {
        let e: SyncError = FetchError::Unauthorized.into();
        assert_eq!(e, SyncError::LoadFailure(FetchError::Unauthorized));
        assert_eq!(e.to_string(), "failed to load graph: not authorized");
    }
}
