// src/metadata.rs

use serde::Serialize;

/// Degrees/minutes/seconds as stored in the EXIF GPS IFD, with its hemisphere reference.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGeoCoordinate {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
    pub reference: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LocationRecord {
    pub file_name: String,
    pub full_path: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address_components: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: &'static str,
    pub detail: String,
}

/// Result of one run over a folder. Records keep the listing order.
#[derive(Debug, Default)]
pub struct Batch {
    pub records: Vec<LocationRecord>,
    pub skipped: Vec<SkippedFile>,
    pub failed: Vec<SkippedFile>,
}

impl Batch {
    pub fn file_names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.file_name.as_str()).collect()
    }

    pub fn latitudes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.latitude).collect()
    }

    pub fn longitudes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.longitude).collect()
    }

    pub fn addresses(&self) -> Vec<&[String]> {
        self.records
            .iter()
            .map(|r| r.address_components.as_slice())
            .collect()
    }

    pub fn processed(&self) -> usize {
        self.records.len() + self.skipped.len() + self.failed.len()
    }
}

/// Splits a geocoder address on ", ", keeping the geocoder's order.
pub fn split_address(address: &str) -> Vec<String> {
    address.split(", ").map(str::to_string).collect()
}
