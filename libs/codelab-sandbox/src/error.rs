use thiserror::Error;

pub type Result<T> = std::result::Result<T, SandboxError>;

/// Infrastructure failures. Anything a submission does wrong becomes a failed
/// test outcome instead; these abort the whole suite.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("failed to start execution context `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for execution context: {0}")]
    Wait(#[source] std::io::Error),

    #[error("failed to encode context payload: {0}")]
    Payload(#[from] serde_json::Error),
}
