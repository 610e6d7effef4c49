use thiserror::Error;

/// Request-level failures of [`crate::Ranker::rank`]. Per-candidate
/// collaborator failures are not here: those are isolated into the
/// result list so siblings keep ranking.
#[derive(Debug, Error)]
pub enum RankError {
    #[error("unknown job description '{0}'")]
    UnknownJobDescription(String),

    #[error("candidate set is empty")]
    EmptyCandidateSet,

    #[error("top_n must be positive")]
    InvalidTopN,

    #[error("no candidate could be scored: {0}")]
    NoScoredCandidates(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
