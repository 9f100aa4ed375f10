use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid rect: [{0}, {1}, {2}, {3}]")]
    InvalidRect(i32, i32, i32, i32),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Wrong frame format: {0}")]
    FrameFormat(String),

    #[error("Wrong input format at line {line}: {reason}")]
    InputFormat { line: usize, reason: String },
}
