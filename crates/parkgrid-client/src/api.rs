//! Parking backend REST API client.
//!
//! Uses reqwest to call the backend endpoints for auth, search, bookings,
//! spaces and reports. Single-shot request/response: no retries, no
//! caching. Mutating calls are never retried.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use parkgrid_core::model::{
    AvailabilityWindow, Booking, BookingAction, GeoPoint, MonthlyIncomeReport, Role,
    SearchResponse, Session, Space,
};

/// Parking API client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether this error means the session is no longer valid. Triggers
    /// the logout-once latch in every workflow.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Api { status, message } => {
                *status == 401 || message.to_lowercase().contains("unauth")
            }
            _ => false,
        }
    }
}

/// Parking backend REST API client.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

/// Search request parameters, resolved from a [`crate::workflows::search`]
/// query. Optional fields are omitted from the query string entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub query: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub start_ts: String,
    pub end_ts: String,
    pub radius_m: Option<f64>,
}

impl SearchParams {
    /// Flatten into query-string pairs. Coordinates are emitted only as a
    /// pair; the backend treats a lone coordinate as absent.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("start_ts", self.start_ts.clone()),
            ("end_ts", self.end_ts.clone()),
        ];
        if let Some(radius) = self.radius_m {
            pairs.push(("radius_m", format_num(radius)));
        }
        if let Some(query) = self.query.as_deref() {
            if !query.is_empty() {
                pairs.push(("query", query.to_string()));
            }
        }
        if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            pairs.push(("lat", format_num(lat)));
            pairs.push(("lng", format_num(lng)));
        }
        pairs
    }
}

/// Request body for creating a space. Coordinates come from the picker and
/// pass through verbatim; the client computes no geometry.
#[derive(Debug, Clone, Serialize)]
pub struct NewSpace {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_label: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_limit: Option<f64>,
}

/// Request body for adding an availability window to a space.
#[derive(Debug, Clone, Serialize)]
pub struct NewAvailability {
    pub start_ts: String,
    pub end_ts: String,
    pub base_price_per_hour: f64,
    pub is_active: bool,
}

impl ApiClient {
    /// Create a new API client for the given backend base URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        if base_url.is_empty() {
            return Err(ApiError::Config("base_url is empty".into()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed — safe to ignore.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// Build the full URL for an API path.
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the response body.
    ///
    /// A 2xx body that fails to parse yields an empty JSON object rather
    /// than an error; a non-2xx response becomes [`ApiError::Api`] with the
    /// best human-readable message the body offers.
    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        let fallback = status.canonical_reason().unwrap_or("Unknown").to_string();
        let body: Value = resp
            .json()
            .await
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: extract_message(&body, &fallback),
            });
        }
        Ok(body)
    }

    fn bearer(req: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
        req.bearer_auth(token)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with phone + password. Returns the new session.
    pub async fn login(&self, phone: &str, password: &str) -> Result<Session, ApiError> {
        let body = self
            .execute(self.http.post(self.api_url("/auth/login")).json(
                &serde_json::json!({ "phone": phone, "password": password }),
            ))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Register a new account and return its session.
    pub async fn register(
        &self,
        name: &str,
        phone: &str,
        password: &str,
        role: Role,
    ) -> Result<Session, ApiError> {
        let body = self
            .execute(self.http.post(self.api_url("/auth/register")).json(
                &serde_json::json!({
                    "name": name,
                    "phone": phone,
                    "password": password,
                    "role": role,
                }),
            ))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    // =========================================================================
    // Geocoding & search
    // =========================================================================

    /// Resolve a free-text place query to a point (server-side geocoding).
    pub async fn geocode(&self, query: &str) -> Result<GeoPoint, ApiError> {
        let body = self
            .execute(
                self.http
                    .post(self.api_url("/geocode"))
                    .json(&serde_json::json!({ "query": query })),
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Search spaces around a point or text query within a time window.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, ApiError> {
        let body = self
            .execute(
                self.http
                    .get(self.api_url("/search"))
                    .query(&params.to_query()),
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Search around the caller's previously saved location.
    pub async fn search_nearby(
        &self,
        token: &str,
        start_ts: &str,
        end_ts: &str,
        radius_m: Option<f64>,
    ) -> Result<SearchResponse, ApiError> {
        let mut pairs = vec![
            ("start_ts", start_ts.to_string()),
            ("end_ts", end_ts.to_string()),
        ];
        if let Some(radius) = radius_m {
            pairs.push(("radius_m", format_num(radius)));
        }
        let body = self
            .execute(Self::bearer(
                self.http
                    .get(self.api_url("/search/nearby"))
                    .query(&pairs),
                token,
            ))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Save the device location for later nearby searches.
    pub async fn save_my_location(&self, token: &str, lat: f64, lng: f64) -> Result<(), ApiError> {
        self.execute(Self::bearer(
            self.http
                .post(self.api_url("/me/location"))
                .json(&serde_json::json!({ "lat": lat, "lng": lng })),
            token,
        ))
        .await?;
        Ok(())
    }

    // =========================================================================
    // Bookings
    // =========================================================================

    /// The caller's own bookings (driver view).
    pub async fn my_bookings(&self, token: &str) -> Result<Vec<Booking>, ApiError> {
        let body = self
            .execute(Self::bearer(
                self.http.get(self.api_url("/bookings/my")),
                token,
            ))
            .await?;
        decode_list(body)
    }

    /// Bookings made against the caller's spaces (provider view).
    pub async fn bookings_for_my_spaces(&self, token: &str) -> Result<Vec<Booking>, ApiError> {
        let body = self
            .execute(Self::bearer(
                self.http.get(self.api_url("/bookings/for-my-spaces")),
                token,
            ))
            .await?;
        decode_list(body)
    }

    /// Create a booking. The response body is intentionally discarded:
    /// `price_total` and `status` are backend-computed, so callers re-fetch
    /// the booking list instead of splicing a partial object into it.
    pub async fn create_booking(
        &self,
        token: &str,
        space_id: u64,
        start_ts: &str,
        end_ts: &str,
    ) -> Result<(), ApiError> {
        self.execute(Self::bearer(
            self.http.post(self.api_url("/bookings")).json(&serde_json::json!({
                "space_id": space_id,
                "start_ts": start_ts,
                "end_ts": end_ts,
            })),
            token,
        ))
        .await?;
        Ok(())
    }

    /// Request a status transition on a booking.
    pub async fn booking_action(
        &self,
        token: &str,
        booking_id: u64,
        action: BookingAction,
    ) -> Result<(), ApiError> {
        let path = format!("/bookings/{booking_id}/{}", action.path_segment());
        self.execute(Self::bearer(self.http.patch(self.api_url(&path)), token))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Spaces & availability
    // =========================================================================

    /// The caller's own spaces.
    pub async fn my_spaces(&self, token: &str) -> Result<Vec<Space>, ApiError> {
        let body = self
            .execute(Self::bearer(
                self.http.get(self.api_url("/spaces/my")),
                token,
            ))
            .await?;
        decode_list(body)
    }

    /// Create a space. Callers re-fetch the space list afterwards.
    pub async fn create_space(&self, token: &str, space: &NewSpace) -> Result<(), ApiError> {
        self.execute(Self::bearer(
            self.http.post(self.api_url("/spaces")).json(space),
            token,
        ))
        .await?;
        Ok(())
    }

    /// Availability windows of one owned space.
    pub async fn space_availability(
        &self,
        token: &str,
        space_id: u64,
    ) -> Result<Vec<AvailabilityWindow>, ApiError> {
        let body = self
            .execute(Self::bearer(
                self.http
                    .get(self.api_url(&format!("/spaces/{space_id}/availability"))),
                token,
            ))
            .await?;
        decode_list(body)
    }

    /// Add an availability window to an owned space.
    pub async fn add_availability(
        &self,
        token: &str,
        space_id: u64,
        window: &NewAvailability,
    ) -> Result<(), ApiError> {
        self.execute(Self::bearer(
            self.http
                .post(self.api_url(&format!("/spaces/{space_id}/availability")))
                .json(window),
            token,
        ))
        .await?;
        Ok(())
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Monthly income report over the caller's spaces.
    pub async fn monthly_report(&self, token: &str) -> Result<MonthlyIncomeReport, ApiError> {
        let body = self
            .execute(Self::bearer(
                self.http.get(self.api_url("/reports/provider/monthly")),
                token,
            ))
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}

/// Extract a human-readable error message from a backend error body.
///
/// Precedence: structured `error.message`, flat `message`, first value of a
/// field-level `errors` map, then the HTTP status text. Rendering code gets
/// one line regardless of which shape the backend chose.
pub(crate) fn extract_message(body: &Value, fallback: &str) -> String {
    if let Some(msg) = body
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return msg.to_string();
    }
    if let Some(msg) = body.get("message").and_then(Value::as_str) {
        return msg.to_string();
    }
    if let Some(errors) = body.get("errors").and_then(Value::as_object) {
        if let Some(first) = errors.values().next() {
            // Laravel-style: each field maps to an array of messages.
            if let Some(msg) = first
                .as_array()
                .and_then(|a| a.first())
                .and_then(Value::as_str)
                .or_else(|| first.as_str())
            {
                return msg.to_string();
            }
        }
    }
    fallback.to_string()
}

/// Decode a list response that may arrive as a bare array or wrapped in a
/// `{data: [...]}` / `{items: [...]}` envelope.
fn decode_list<T: serde::de::DeserializeOwned>(body: Value) -> Result<Vec<T>, ApiError> {
    let inner = match body {
        Value::Array(_) => body,
        Value::Object(ref map) => map
            .get("data")
            .or_else(|| map.get("items"))
            .cloned()
            .unwrap_or(Value::Array(Vec::new())),
        _ => Value::Array(Vec::new()),
    };
    Ok(serde_json::from_value(inner)?)
}

fn format_num(n: f64) -> String {
    // Avoid "1500.0" in query strings when the value is integral.
    if (n.fract()).abs() < f64::EPSILON {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use parkgrid_core::model::BookingStatus;

    // =========================================================================
    // Client construction
    // =========================================================================

    #[test]
    fn empty_base_url_returns_config_error() {
        let err = ApiClient::new("").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn trailing_slash_stripped_from_base_url() {
        let client = ApiClient::new("http://127.0.0.1:8000/api/v1/").unwrap();
        let url = client.api_url("/bookings/my");
        assert_eq!(url, "http://127.0.0.1:8000/api/v1/bookings/my");
        assert!(!url.contains("v1//"));
    }

    // =========================================================================
    // Error message extraction
    // =========================================================================

    #[test]
    fn extract_prefers_structured_error_message() {
        let body = serde_json::json!({
            "error": {"message": "NO_AVAILABILITY"},
            "message": "flat",
            "errors": {"start_ts": ["bad"]}
        });
        assert_eq!(extract_message(&body, "Bad Request"), "NO_AVAILABILITY");
    }

    #[test]
    fn extract_falls_back_to_flat_message() {
        let body = serde_json::json!({"message": "ALREADY_BOOKED"});
        assert_eq!(extract_message(&body, "Conflict"), "ALREADY_BOOKED");
    }

    #[test]
    fn extract_uses_first_field_error() {
        let body = serde_json::json!({"errors": {"phone": ["phone is taken"]}});
        assert_eq!(extract_message(&body, "Unprocessable"), "phone is taken");
    }

    #[test]
    fn extract_handles_string_field_errors() {
        let body = serde_json::json!({"errors": {"phone": "phone is taken"}});
        assert_eq!(extract_message(&body, "Unprocessable"), "phone is taken");
    }

    #[test]
    fn extract_falls_back_to_status_text() {
        let body = serde_json::json!({});
        assert_eq!(extract_message(&body, "Not Found"), "Not Found");
    }

    // =========================================================================
    // Query-string building
    // =========================================================================

    #[test]
    fn search_params_emit_exact_pairs() {
        let params = SearchParams {
            query: None,
            lat: Some(23.78),
            lng: Some(90.41),
            start_ts: "2024-01-01T10:00".into(),
            end_ts: "2024-01-01T11:00".into(),
            radius_m: Some(1500.0),
        };
        let pairs = params.to_query();
        assert_eq!(
            pairs,
            vec![
                ("start_ts", "2024-01-01T10:00".to_string()),
                ("end_ts", "2024-01-01T11:00".to_string()),
                ("radius_m", "1500".to_string()),
                ("lat", "23.78".to_string()),
                ("lng", "90.41".to_string()),
            ]
        );
    }

    #[test]
    fn search_params_skip_lone_coordinate() {
        let params = SearchParams {
            lat: Some(23.78),
            start_ts: "a".into(),
            end_ts: "b".into(),
            ..Default::default()
        };
        let pairs = params.to_query();
        assert!(!pairs.iter().any(|(k, _)| *k == "lat" || *k == "lng"));
    }

    #[test]
    fn search_params_skip_empty_query() {
        let params = SearchParams {
            query: Some(String::new()),
            start_ts: "a".into(),
            end_ts: "b".into(),
            ..Default::default()
        };
        assert!(!params.to_query().iter().any(|(k, _)| *k == "query"));
    }

    // =========================================================================
    // Auth-failure detection
    // =========================================================================

    #[test]
    fn status_401_is_auth_failure() {
        let err = ApiError::Api {
            status: 401,
            message: "Unauthorized".into(),
        };
        assert!(err.is_auth_failure());
    }

    #[test]
    fn unauthenticated_message_is_auth_failure() {
        let err = ApiError::Api {
            status: 400,
            message: "Unauthenticated.".into(),
        };
        assert!(err.is_auth_failure());
    }

    #[test]
    fn forbidden_is_not_auth_failure() {
        // 403 shows a permission message; it does not force logout.
        let err = ApiError::Api {
            status: 403,
            message: "Forbidden".into(),
        };
        assert!(!err.is_auth_failure());
    }

    // =========================================================================
    // List envelope decoding
    // =========================================================================

    #[test]
    fn decode_list_bare_array() {
        let body = serde_json::json!([
            {"id": 1, "space_id": 2, "user_id": 3,
             "start_ts": "2024-01-01T10:00", "end_ts": "2024-01-01T11:00",
             "status": "reserved"}
        ]);
        let bookings: Vec<Booking> = decode_list(body).unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].status, BookingStatus::Reserved);
    }

    #[test]
    fn decode_list_data_envelope() {
        let body = serde_json::json!({"data": [
            {"id": 1, "title": "Spot", "lat": 0.0, "lng": 0.0}
        ]});
        let spaces: Vec<Space> = decode_list(body).unwrap();
        assert_eq!(spaces[0].title, "Spot");
    }

    #[test]
    fn decode_list_items_envelope() {
        let body = serde_json::json!({"items": []});
        let spaces: Vec<Space> = decode_list(body).unwrap();
        assert!(spaces.is_empty());
    }

    #[test]
    fn decode_list_missing_key_is_empty() {
        let body = serde_json::json!({"total": 0});
        let spaces: Vec<Space> = decode_list(body).unwrap();
        assert!(spaces.is_empty());
    }

    // =========================================================================
    // Error display
    // =========================================================================

    #[test]
    fn api_error_display() {
        let err = ApiError::Api {
            status: 409,
            message: "ALREADY_BOOKED".into(),
        };
        assert_eq!(err.to_string(), "API error (409): ALREADY_BOOKED");
    }
}
