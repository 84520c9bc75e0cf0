use crate::error::AppError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub folder_path: String,
    pub scale_factor: f64,
    pub zoom_level: u8,
    pub allowed_extensions: HashSet<String>,
    pub output_path: String,
    pub thumbnail_dir_name: String,
    pub marker_color: String,
    pub geocoder_url: String,
    pub user_agent: String,
    pub language: String,
    pub geocode_min_interval_ms: u64,
    pub geocode_timeout_secs: u64,
    pub open_browser: bool,
    pub log_level: String,
}

/// Highest zoom served by the OpenStreetMap tile servers.
const MAX_ZOOM: u8 = 19;

impl AppConfig {
    pub fn new() -> Result<Self, AppError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("PHOTOMAP"));

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("folder_path", ".")?
            .set_default("scale_factor", 0.1)?
            .set_default("zoom_level", 14)?
            .set_default("allowed_extensions", Vec::<String>::new())?
            .set_default("output_path", "photo_map.html")?
            .set_default("thumbnail_dir_name", "thumbnails")?
            .set_default("marker_color", "red")?
            .set_default(
                "geocoder_url",
                "https://nominatim.openstreetmap.org/reverse",
            )?
            .set_default(
                "user_agent",
                concat!("photo_mapper/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("language", "en")?
            .set_default("geocode_min_interval_ms", 1000)?
            .set_default("geocode_timeout_secs", 30)?
            .set_default("open_browser", false)?
            .set_default("log_level", "info")
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.scale_factor > 0.0 && self.scale_factor <= 1.0) {
            return Err(AppError::InvalidConfig(format!(
                "scale_factor must be in (0, 1], got {}",
                self.scale_factor
            )));
        }
        if self.zoom_level == 0 || self.zoom_level > MAX_ZOOM {
            return Err(AppError::InvalidConfig(format!(
                "zoom_level must be between 1 and {}, got {}",
                MAX_ZOOM, self.zoom_level
            )));
        }
        if self.thumbnail_dir_name.is_empty() {
            return Err(AppError::InvalidConfig(
                "thumbnail_dir_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Extensions compared case-insensitively; an empty set admits every file.
    pub fn accepts_extension(&self, ext: Option<&str>) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        match ext {
            Some(ext) => self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig::defaults()
        .map_err(AppError::from)
        .and_then(AppConfig::from_builder)
        .unwrap()
}
