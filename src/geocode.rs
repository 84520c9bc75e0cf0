use crate::config::AppConfig;
use crate::error::GeocodeError;
use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
    StatusCode,
};
use serde_json::Value;
use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

/// Resolves a coordinate to a comma separated address.
pub trait ReverseGeocoder {
    fn reverse(&self, lat: f64, lon: f64, language: &str) -> Result<String, GeocodeError>;
}

/// OpenStreetMap's Nominatim reverse endpoint.
pub struct NominatimGeocoder {
    client: Client,
    url: String,
    min_interval: Duration,
    last_request: Cell<Option<Instant>>,
}

impl NominatimGeocoder {
    pub fn new(config: &AppConfig) -> Result<Self, GeocodeError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| GeocodeError::Malformed(format!("user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        // Fail on a bad URL now rather than once per photo.
        let endpoint = url::Url::parse(&config.geocoder_url)?;

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.geocode_timeout_secs));
        // A self-hosted Nominatim on this machine is never reached through a proxy.
        if is_loopback(&endpoint) {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        log::debug!("Using reverse geocoder at {}", config.geocoder_url);
        Ok(Self {
            client,
            url: config.geocoder_url.clone(),
            min_interval: Duration::from_millis(config.geocode_min_interval_ms),
            last_request: Cell::new(None),
        })
    }

    fn throttle(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                log::trace!("Waiting {:?} before next geocode request", wait);
                thread::sleep(wait);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn reverse(&self, lat: f64, lon: f64, language: &str) -> Result<String, GeocodeError> {
        let lat_s = lat.to_string();
        let lon_s = lon.to_string();
        let params = [
            ("format", "jsonv2"),
            ("lat", lat_s.as_str()),
            ("lon", lon_s.as_str()),
            ("accept-language", language),
        ];
        let url = url::Url::parse_with_params(&self.url, &params)?;

        self.throttle();
        log::trace!("Reverse geocoding request: {}", url);
        let res = self.client.get(url).send()?;
        match res.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(GeocodeError::RateLimited),
            status if !status.is_success() => return Err(GeocodeError::Status(status.as_u16())),
            _ => {}
        }
        let json: Value = res.json()?;
        display_name(&json, lat, lon)
    }
}

fn is_loopback(endpoint: &url::Url) -> bool {
    match endpoint.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn display_name(json: &Value, lat: f64, lon: f64) -> Result<String, GeocodeError> {
    if json.get("error").is_some() {
        return Err(GeocodeError::NoResult(lat, lon));
    }
    match json["display_name"].as_str() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        Some(_) => Err(GeocodeError::NoResult(lat, lon)),
        None => Err(GeocodeError::Malformed(
            "missing display_name".to_string(),
        )),
    }
}
