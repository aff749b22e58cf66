use thiserror::Error;
pub type Result<T> = std::result::Result<T, RegionError>;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ron::error::SpannedError),
    #[error("no stations selected for this region")]
    NoStationsSelected,
    #[error("climate error: {0}")]
    Climate(#[from] agroclim_climate::errors::ClimateError),
    #[error("config error: {0}")]
    Build(#[from] agroclim_build::AgroBuildError),
}
