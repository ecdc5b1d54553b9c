//! HTTP point-of-interest directory.
//!
//! Fetches `GET {base}/points-of-interest` and turns each JSON record into a
//! [`PointOfInterest`]. The directory is loose about types: ids and
//! coordinates may arrive as numbers or as numeric strings. Every record is
//! decoded on its own, so one bad record is dropped with a warning instead
//! of failing the whole fetch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::metrics::AppMetrics;
use crate::proximity::{
    error::{DirectoryError, ProximityError},
    geo::Coordinate,
    provider::{DirectoryResult, PointDirectory},
    schedule::WeeklySchedule,
    types::PointOfInterest,
};

/// A numeric field that may be encoded as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrString {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumberOrString::Int(v) => Some(*v as f64),
            NumberOrString::Float(v) => Some(*v),
            NumberOrString::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrString::Int(v) => Some(*v),
            NumberOrString::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            NumberOrString::Float(_) => None,
            NumberOrString::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

/// Raw directory record, before validation
#[derive(Debug, Deserialize)]
pub struct DirectoryRecord {
    pub id: NumberOrString,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "opening_hours", alias = "openingHours")]
    pub hours: Option<String>,
    #[serde(alias = "lat")]
    pub latitude: NumberOrString,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: NumberOrString,
}

impl TryFrom<DirectoryRecord> for PointOfInterest {
    type Error = ProximityError;

    fn try_from(record: DirectoryRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .as_i64()
            .ok_or_else(|| ProximityError::invalid_point(format!("invalid id {:?}", record.id)))?;

        let latitude = record.latitude.as_f64().ok_or_else(|| {
            ProximityError::invalid_point(format!("point {}: invalid latitude {:?}", id, record.latitude))
        })?;
        let longitude = record.longitude.as_f64().ok_or_else(|| {
            ProximityError::invalid_point(format!(
                "point {}: invalid longitude {:?}",
                id, record.longitude
            ))
        })?;
        let location = Coordinate::new(latitude, longitude)?;

        let hours = record
            .hours
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(WeeklySchedule::parse);

        Ok(PointOfInterest {
            id,
            name: record.name,
            address: record.address,
            location,
            hours,
        })
    }
}

/// Decode directory records one by one. Returns the valid points and the
/// number of records dropped.
pub fn decode_points(records: Vec<Value>) -> (Vec<PointOfInterest>, usize) {
    let mut points = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for (index, value) in records.into_iter().enumerate() {
        let decoded = serde_json::from_value::<DirectoryRecord>(value)
            .map_err(|e| ProximityError::invalid_point(e.to_string()))
            .and_then(PointOfInterest::try_from);

        match decoded {
            Ok(point) => points.push(point),
            Err(err) => {
                dropped += 1;
                tracing::warn!("Dropping directory record {}: {}", index, err);
            }
        }
    }

    (points, dropped)
}

/// [`PointDirectory`] backed by the HTTP directory service
#[derive(Clone)]
pub struct HttpDirectory {
    base_url: String,
    http: Client,
    timeout: Duration,
    metrics: Option<Arc<AppMetrics>>,
}

impl HttpDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DirectoryError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::NetworkError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            timeout,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_records(&self) -> DirectoryResult<Vec<Value>> {
        let url = format!("{}/points-of-interest", self.base_url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                DirectoryError::Timeout {
                    millis: self.timeout.as_millis() as u64,
                }
            } else {
                DirectoryError::NetworkError {
                    message: format!("Failed to fetch points of interest: {}", e),
                }
            }
        })?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(DirectoryError::ServiceUnavailable);
        }
        if !status.is_success() {
            return Err(DirectoryError::NetworkError {
                message: format!("Directory returned HTTP {}", status),
            });
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| DirectoryError::FormatError {
                message: format!("Failed to parse directory response: {}", e),
            })
    }
}

#[async_trait]
impl PointDirectory for HttpDirectory {
    async fn fetch_points(&self) -> DirectoryResult<Vec<PointOfInterest>> {
        let records = self.fetch_records().await?;
        let (points, dropped) = decode_points(records);

        if let Some(metrics) = &self.metrics {
            metrics.points_dropped_total.inc_by(dropped as f64);
        }

        Ok(points)
    }

    fn directory_name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_string_encoded_numbers() {
        let (points, dropped) = decode_points(vec![json!({
            "id": "17",
            "name": "City Pool",
            "hours": "Mon: 06:00 AM - 09:00 PM",
            "latitude": "51.5074",
            "longitude": "-0.1278"
        })]);

        assert_eq!(dropped, 0);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, 17);
        assert_eq!(points[0].location.latitude, 51.5074);
        assert_eq!(points[0].location.longitude, -0.1278);
        assert_eq!(points[0].hours.as_ref().map(|h| h.len()), Some(1));
    }

    #[test]
    fn accepts_aliases_and_plain_numbers() {
        let (points, _) = decode_points(vec![json!({
            "id": 3,
            "name": "Clinic",
            "address": "1 Main St",
            "opening_hours": "Tue: 08:00 AM - 04:00 PM",
            "lat": 40.0,
            "lng": -73
        })]);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].address.as_deref(), Some("1 Main St"));
        assert_eq!(points[0].location.longitude, -73.0);
        assert!(points[0].hours.is_some());
    }

    #[test]
    fn bad_records_are_dropped_individually() {
        let (points, dropped) = decode_points(vec![
            json!({ "id": 1, "name": "Good", "latitude": 1.0, "longitude": 1.0 }),
            json!({ "id": 2, "name": "Text lat", "latitude": "north", "longitude": 1.0 }),
            json!({ "id": 3, "name": "Off the map", "latitude": 95.0, "longitude": 1.0 }),
            json!({ "name": "No id", "latitude": 1.0, "longitude": 1.0 }),
            json!("not an object"),
        ]);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, 1);
        assert_eq!(dropped, 4);
    }

    #[test]
    fn blank_hours_mean_no_schedule() {
        let (points, _) = decode_points(vec![json!({
            "id": 9, "name": "Kiosk", "hours": "  ", "latitude": 0, "longitude": 0
        })]);
        assert!(points[0].hours.is_none());
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let directory = HttpDirectory::new("http://directory.local/", Duration::from_secs(1)).unwrap();
        assert_eq!(directory.base_url(), "http://directory.local");
        assert_eq!(directory.directory_name(), "http");
    }

    #[test]
    fn fractional_id_is_rejected() {
        assert_eq!(NumberOrString::Float(4.5).as_i64(), None);
        assert_eq!(NumberOrString::Float(4.0).as_i64(), Some(4));
        assert_eq!(NumberOrString::Text(" 12 ".into()).as_i64(), Some(12));
    }
}
