use crate::error::AppError;
use image::DynamicImage;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

const LEAFLET_CSS_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// One photo on the map: hover shows `tooltip`, click shows the thumbnail.
#[derive(Debug, Clone)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub image_path: PathBuf,
    pub scale_factor: f64,
    pub color: String,
    pub tooltip: String,
}

#[derive(Serialize)]
struct MarkerView<'a> {
    lat: f64,
    lon: f64,
    color: &'a str,
    tooltip: &'a str,
    thumbnail: Option<String>,
}

/// A Leaflet page centered on a point, persisted as a single HTML file.
pub struct MapDocument {
    center: (f64, f64),
    zoom: u8,
    thumbnail_dir_name: String,
    markers: Vec<Marker>,
}

impl MapDocument {
    pub fn new(center_lat: f64, center_lon: f64, zoom: u8, thumbnail_dir_name: &str) -> Self {
        Self {
            center: (center_lat, center_lon),
            zoom,
            thumbnail_dir_name: thumbnail_dir_name.to_string(),
            markers: Vec::new(),
        }
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Writes the page to `path` and the thumbnails next to it.
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let out_dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let thumbnail_dir = out_dir.join(&self.thumbnail_dir_name);
        if !self.markers.is_empty() && !thumbnail_dir.exists() {
            fs::create_dir_all(&thumbnail_dir)?;
            log::debug!("Created thumbnail directory: {:?}", thumbnail_dir);
        }

        let views: Vec<MarkerView> = self
            .markers
            .iter()
            .map(|m| MarkerView {
                lat: m.latitude,
                lon: m.longitude,
                color: &m.color,
                tooltip: &m.tooltip,
                thumbnail: match write_thumbnail(&m.image_path, m.scale_factor, &thumbnail_dir) {
                    Ok(name) => Some(format!("{}/{}", self.thumbnail_dir_name, name)),
                    Err(e) => {
                        log::warn!("Could not create thumbnail for {:?}: {}", m.image_path, e);
                        None
                    }
                },
            })
            .collect();

        let html = self.render(&views)?;
        fs::write(path, html)?;
        log::info!("Map with {} markers saved to {:?}", views.len(), path);
        Ok(())
    }

    fn render(&self, views: &[MarkerView]) -> Result<String, AppError> {
        let script = self.map_script(views)?;
        Ok(html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { "Photo map" }
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    (leaflet_css_link())
                    script src=(LEAFLET_JS_URL) {}
                    style { "html, body, #map { height: 100%; margin: 0; }" }
                }
                body {
                    div id="map" {}
                    (script)
                }
            }
        }
        .into_string())
    }

    fn map_script(&self, views: &[MarkerView]) -> Result<Markup, AppError> {
        // Keep the JSON from closing the surrounding script element.
        let markers = serde_json::to_string(views)?.replace("</", "<\\/");
        let setup = format!(
            "var map = L.map('map').setView([{}, {}], {});\n\
             L.tileLayer('{}', {{ maxZoom: 19, attribution: '&copy; \
             <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors' }}).addTo(map);\n\
             var markers = {};\n\
             markers.forEach(function (m) {{\n\
             \x20 var marker = L.circleMarker([m.lat, m.lon], {{ color: m.color, radius: 8 }}).addTo(map);\n\
             \x20 marker.bindTooltip(m.tooltip);\n\
             \x20 if (m.thumbnail) {{ marker.bindPopup('<img src=\"' + m.thumbnail + '\">'); }}\n\
             }});",
            self.center.0, self.center.1, self.zoom, TILE_URL, markers
        );
        Ok(html! {
            script { (PreEscaped(setup)) }
        })
    }
}

fn leaflet_css_link() -> Markup {
    html! {
        link rel="stylesheet" href=(LEAFLET_CSS_URL);
    }
}

/// Scales the photo by `scale_factor` and stores it as `<sha256>.jpg` in `dir`.
fn write_thumbnail(image_path: &Path, scale_factor: f64, dir: &Path) -> Result<String, AppError> {
    let hash = file_hash(image_path)?;
    let name = format!("{}.jpg", hash);
    let target = dir.join(&name);
    if target.exists() {
        log::trace!("Thumbnail already present: {:?}", target);
        return Ok(name);
    }

    log::trace!("Opening image for thumbnail generation: {:?}", image_path);
    let image = image::open(image_path)?;
    let width = ((image.width() as f64 * scale_factor).round() as u32).max(1);
    let height = ((image.height() as f64 * scale_factor).round() as u32).max(1);
    let thumbnail = DynamicImage::ImageRgb8(image.thumbnail(width, height).to_rgb8());
    thumbnail.save(&target)?;
    log::debug!("Thumbnail saved to: {:?}", target);
    Ok(name)
}

fn file_hash(path: &Path) -> Result<String, AppError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Opens the saved map with the desktop's default handler.
pub fn open(path: &Path) -> Result<(), AppError> {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    let status = command.arg(path).status()?;
    if !status.success() {
        return Err(AppError::Generic(format!(
            "could not open {:?} ({})",
            path, status
        )));
    }
    Ok(())
}
