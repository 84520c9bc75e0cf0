mod address;
mod config;
mod coords;
mod error;
mod exif_reader;
mod geocode;
mod map;
mod metadata;
mod processor;
mod report;
mod walker;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::geocode::NominatimGeocoder;
use crate::map::{MapDocument, Marker};
use crate::metadata::Batch;
use crate::processor::Processor;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};

/// Place geotagged photos of a folder on an interactive map
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Folder containing the photos
    folder: Option<String>,
    /// Thumbnail scale factor, in (0, 1]
    #[arg(short, long)]
    scale_factor: Option<f64>,
    /// Default map zoom level
    #[arg(short, long)]
    zoom_level: Option<u8>,
    /// Where to write the HTML map
    #[arg(short, long)]
    output: Option<String>,
    /// Open the map once it is saved
    #[arg(long, action)]
    open: bool,
    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(folder) = self.folder {
            config.folder_path = folder;
        }
        if let Some(scale_factor) = self.scale_factor {
            config.scale_factor = scale_factor;
        }
        if let Some(zoom_level) = self.zoom_level {
            config.zoom_level = zoom_level;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if self.open {
            config.open_browser = true;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
    }
}

fn build_map(config: &AppConfig, batch: &Batch) -> Result<MapDocument, AppError> {
    let center_lat = coords::center(&batch.latitudes())?;
    let center_lon = coords::center(&batch.longitudes())?;

    let mut document = MapDocument::new(
        center_lat,
        center_lon,
        config.zoom_level,
        &config.thumbnail_dir_name,
    );
    for record in &batch.records {
        document.add_marker(Marker {
            latitude: record.latitude,
            longitude: record.longitude,
            image_path: PathBuf::from(&record.full_path),
            scale_factor: config.scale_factor,
            color: config.marker_color.clone(),
            tooltip: address::tooltip(record),
        });
    }
    Ok(document)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::new()?;
    cli.apply(&mut config);

    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    info!("Starting photo_mapper");
    config.validate()?;

    let paths = walker::list_folder(&config)?;
    let geocoder = NominatimGeocoder::new(&config).context("could not set up the geocoder")?;
    let batch = Processor::new(&geocoder, &config.language).collect(&paths);

    println!("{}", report::render_table(&batch));
    println!("{}", report::summary(&batch));

    let document = build_map(&config, &batch)?;
    let (center_lat, center_lon) = document.center();
    info!(
        "Placing {} markers around {}, {}",
        document.markers().len(),
        center_lat,
        center_lon
    );
    let output = Path::new(&config.output_path);
    document
        .save(output)
        .with_context(|| format!("could not save map to {}", config.output_path))?;

    if config.open_browser {
        map::open(output)?;
    }

    info!("photo_mapper finished");
    Ok(())
}
