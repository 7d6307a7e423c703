//! Reverse geocoding: coordinates to a human-readable address label.

use serde::Deserialize;

use crate::api::ApiError;

/// Resolves a coordinate pair to an address label.
#[allow(async_fn_in_trait)]
pub trait ReverseGeocoder {
    async fn resolve(&self, lat: f64, lng: f64) -> Result<String, ApiError>;
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    display_name: String,
}

/// OSM Nominatim reverse geocoder.
#[derive(Debug, Clone)]
pub struct NominatimReverse {
    http: reqwest::Client,
    endpoint: String,
}

impl NominatimReverse {
    /// Build a reverse geocoder against a Nominatim-compatible endpoint.
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub fn new(endpoint: &str, user_agent: &str) -> Result<Self, ApiError> {
        if endpoint.is_empty() {
            return Err(ApiError::Config("reverse_geocode_url is empty".into()));
        }
        let http = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl ReverseGeocoder for NominatimReverse {
    async fn resolve(&self, lat: f64, lng: f64) -> Result<String, ApiError> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", format!("{lat}")),
                ("lon", format!("{lng}")),
            ])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: "Reverse geocode failed".into(),
            });
        }
        let body: NominatimResponse = resp.json().await?;
        Ok(body.display_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_endpoint_is_config_error() {
        let err = NominatimReverse::new("", "parkgrid/0.1").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn response_parses_display_name() {
        let body: NominatimResponse =
            serde_json::from_str(r#"{"display_name": "Banani, Dhaka, Bangladesh"}"#).unwrap();
        assert_eq!(body.display_name, "Banani, Dhaka, Bangladesh");
    }

    #[test]
    fn response_without_display_name_is_empty() {
        let body: NominatimResponse = serde_json::from_str("{}").unwrap();
        assert!(body.display_name.is_empty());
    }
}
