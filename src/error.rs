use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("malformed rule {workplace}/{system}#{entry}: {reason}")]
    MalformedRule {
        workplace: String,
        system: String,
        entry: usize,
        reason: String,
    },
    #[error("unknown workplace type: {0}")]
    UnknownWorkplaceType(String),
    #[error("invalid worker token: {0}")]
    InvalidToken(String),
}
