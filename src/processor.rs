use crate::coords::{decimal_degrees, round6};
use crate::error::ExtractError;
use crate::exif_reader::read_exif;
use crate::geocode::ReverseGeocoder;
use crate::metadata::{split_address, Batch, LocationRecord, SkippedFile};
use std::path::{Path, PathBuf};

/// Turns photos into located records, one file at a time.
pub struct Processor<'a> {
    geocoder: &'a dyn ReverseGeocoder,
    language: String,
}

impl<'a> Processor<'a> {
    pub fn new(geocoder: &'a dyn ReverseGeocoder, language: &str) -> Self {
        Self {
            geocoder,
            language: language.to_string(),
        }
    }

    /// Runs every path through the extractor. Per-file errors are recorded, never returned.
    pub fn collect(&self, paths: &[PathBuf]) -> Batch {
        log::info!("Processing {} files", paths.len());
        let mut batch = Batch::default();

        for path in paths {
            log::info!("Processing image started for: {:?}", path);
            match self.extract(path) {
                Ok(record) => {
                    log::trace!("Extracted record for {:?}: {:?}", path, record);
                    batch.records.push(record);
                }
                Err(e) => {
                    let skipped = SkippedFile {
                        file_name: file_name(path),
                        reason: e.kind(),
                        detail: e.to_string(),
                    };
                    if e.is_skip() {
                        log::info!("{:?} has no EXIF info, skipping", path);
                        batch.skipped.push(skipped);
                    } else {
                        log::warn!("Failed to process image {:?} [{}]: {}", path, e.kind(), e);
                        batch.failed.push(skipped);
                    }
                }
            }
        }

        log::info!(
            "All images processed: {} located, {} skipped, {} failed.",
            batch.records.len(),
            batch.skipped.len(),
            batch.failed.len()
        );
        batch
    }

    pub fn extract(&self, path: &Path) -> Result<LocationRecord, ExtractError> {
        log::trace!("Extracting EXIF data for image: {:?}", path);
        let exif = read_exif(path)?;

        log::info!(
            "x,y dimensions for {:?}: {}, {}",
            path,
            display_opt(exif.width),
            display_opt(exif.height)
        );
        log::debug!("GPS latitude: {:?}", exif.latitude);
        log::debug!("GPS longitude: {:?}", exif.longitude);

        let raw_lat = exif
            .latitude
            .ok_or_else(|| ExtractError::ExifRead("missing GPS latitude".to_string()))?;
        let raw_lon = exif
            .longitude
            .ok_or_else(|| ExtractError::ExifRead("missing GPS longitude".to_string()))?;

        let latitude = round6(decimal_degrees(&raw_lat));
        let longitude = round6(decimal_degrees(&raw_lon));
        log::info!("lat, long: {}, {}", latitude, longitude);

        let address = self.geocoder.reverse(latitude, longitude, &self.language)?;
        log::info!("address: {}", address);

        Ok(LocationRecord {
            file_name: file_name(path),
            full_path: path.to_string_lossy().to_string(),
            latitude,
            longitude,
            address_components: split_address(&address),
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn display_opt(value: Option<u32>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::tooltip;
    use crate::error::GeocodeError;
    use crate::exif_reader::fixtures::*;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    const EIFFEL: &str = "Tour Eiffel, Avenue Anatole France, Paris, Île-de-France, 75007, France";

    struct MockGeocoder {
        answer: Option<&'static str>,
        calls: RefCell<Vec<(f64, f64, String)>>,
    }

    impl MockGeocoder {
        fn answering(answer: Option<&'static str>) -> Self {
            Self {
                answer,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ReverseGeocoder for MockGeocoder {
        fn reverse(&self, lat: f64, lon: f64, language: &str) -> Result<String, GeocodeError> {
            self.calls.borrow_mut().push((lat, lon, language.to_string()));
            match self.answer {
                Some(address) => Ok(address.to_string()),
                None => Err(GeocodeError::Status(503)),
            }
        }
    }

    #[test]
    fn located_photo_end_to_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eiffel.jpg");
        fs::write(&path, jpeg_with_exif(Some(&eiffel()))).unwrap();

        let geocoder = MockGeocoder::answering(Some(EIFFEL));
        let batch = Processor::new(&geocoder, "en").collect(&[path.clone()]);

        assert_eq!(batch.records.len(), 1);
        let record = &batch.records[0];
        assert_eq!(record.file_name, "eiffel.jpg");
        assert_eq!(record.full_path, path.to_string_lossy());
        assert!((record.latitude - 48.8582).abs() < 1e-4);
        assert!((record.longitude - 2.2945).abs() < 1e-4);
        assert_eq!(record.address_components.len(), 6);

        let calls = geocoder.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (record.latitude, record.longitude, "en".to_string()));

        let tip = tooltip(record);
        let lines: Vec<&str> = tip.split("<br>").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "eiffel.jpg");
    }

    #[test]
    fn invalid_container_is_isolated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("readme.txt");
        fs::write(&path, b"not a photo").unwrap();

        let geocoder = MockGeocoder::answering(Some(EIFFEL));
        let batch = Processor::new(&geocoder, "en").collect(&[path]);

        assert!(batch.records.is_empty());
        assert!(batch.skipped.is_empty());
        assert_eq!(batch.failed.len(), 1);
        assert_eq!(batch.failed[0].reason, "open-error");
        assert_eq!(batch.failed[0].file_name, "readme.txt");
        assert!(geocoder.calls.borrow().is_empty());
    }

    #[test]
    fn mixed_batch_keeps_order_and_counts() {
        let dir = tempdir().unwrap();
        let write = |name: &str, bytes: Vec<u8>| {
            let path = dir.path().join(name);
            fs::write(&path, bytes).unwrap();
            path
        };
        let west = Gps {
            lat: [(40, 1), (26, 1), (46, 1)],
            lat_ref: "N",
            lon: [(73, 1), (59, 1), (8, 1)],
            lon_ref: "W",
        };
        let paths = vec![
            write("1.jpg", jpeg_with_exif(Some(&eiffel()))),
            write("2.jpg", jpeg_without_exif()),
            write("3.jpg", jpeg_with_exif(None)),
            write("4.txt", b"text".to_vec()),
            write("5.jpg", jpeg_with_exif(Some(&west))),
            dir.path().join("6.jpg"),
        ];

        let geocoder = MockGeocoder::answering(Some("123 Main St, Springfield"));
        let batch = Processor::new(&geocoder, "en").collect(&paths);

        assert_eq!(batch.processed(), paths.len());
        assert_eq!(batch.file_names(), vec!["1.jpg", "5.jpg"]);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].reason, "no-exif");
        let reasons: Vec<&str> = batch.failed.iter().map(|f| f.reason).collect();
        assert_eq!(reasons, vec!["exif-read-error", "open-error", "open-error"]);

        assert_eq!(batch.records[1].latitude, 40.446111);
        assert_eq!(batch.records[1].longitude, -73.985556);
    }

    #[test]
    fn geocode_failure_discards_coordinates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offline.jpg");
        fs::write(&path, jpeg_with_exif(Some(&eiffel()))).unwrap();

        let geocoder = MockGeocoder::answering(None);
        let processor = Processor::new(&geocoder, "en");
        let err = processor.extract(&path).unwrap_err();
        assert_eq!(err.kind(), "geocode-error");

        let batch = processor.collect(&[path]);
        assert!(batch.records.is_empty());
        assert_eq!(batch.failed[0].reason, "geocode-error");
    }
}
