use thiserror::Error;
pub type Result<T> = std::result::Result<T, ClimateError>;

#[derive(Error, Debug)]
pub enum ClimateError {
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ron::error::SpannedError),
    #[error("unknown simulation: {0}")]
    UnknownSimulation(String),
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
