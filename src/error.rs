use exif::Error as ExifError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] SerdeJsonError),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("No geotagged photos were located, cannot center the map")]
    EmptyInput,

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Failure of a single photo. Never escapes the batch collector.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("could not open file: {0}")]
    Open(String),

    #[error("no EXIF data")]
    NoExif,

    #[error("could not read EXIF data: {0}")]
    ExifRead(String),

    #[error("reverse geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),
}

impl ExtractError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Open(_) => "open-error",
            ExtractError::NoExif => "no-exif",
            ExtractError::ExifRead(_) => "exif-read-error",
            ExtractError::Geocode(_) => "geocode-error",
        }
    }

    /// A photo without metadata is skipped, not failed.
    pub fn is_skip(&self) -> bool {
        matches!(self, ExtractError::NoExif)
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        ExtractError::Open(e.to_string())
    }
}

impl From<ExifError> for ExtractError {
    fn from(e: ExifError) -> Self {
        match e {
            ExifError::NotFound(_) => ExtractError::NoExif,
            ExifError::Io(io) => ExtractError::Open(io.to_string()),
            other => ExtractError::ExifRead(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("rate limited by geocoding service")]
    RateLimited,

    #[error("geocoding service answered with status {0}")]
    Status(u16),

    #[error("no address found for {0}, {1}")]
    NoResult(f64, f64),

    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}
