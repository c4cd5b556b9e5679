use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// Zero clusters were requested.
    #[error("at least one cluster must be requested")]
    NoClusters,
}
