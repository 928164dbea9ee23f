use thiserror::Error;

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Docker error: {0}")]
    Docker(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Scan timed out after {0}s")]
    Timeout(u64),

    #[error("System error: {0}")]
    System(String),
}

pub type Result<T> = std::result::Result<T, DoctorError>;
