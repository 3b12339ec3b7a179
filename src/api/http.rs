//! Blocking HTTP backend for the imaging server.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde_json::Value;
use url::Url;

use crate::model::{ImagePoint, InstanceId, Marker, WindowLevel};
use crate::state::SeriesRef;

use super::{ApiError, MeasurementClient, SeriesSource};

/// Talks to the imaging server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    /// Create a backend for the server at `server_url`.
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(server_url)?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(server_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        log::info!("HTTP backend for {} (timeout {:?})", base, timeout);
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `base/segments...?query`. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn instances_url(&self, series: &SeriesRef) -> Result<Url, ApiError> {
        self.endpoint(
            &["api", "studies", &series.study_id, "series", &series.series_id, "instances"],
            &[],
        )
    }

    fn preview_url(
        &self,
        series: &SeriesRef,
        instance_id: &InstanceId,
        window: Option<WindowLevel>,
    ) -> Result<Url, ApiError> {
        let query = match window {
            Some(w) => vec![("ww", w.width.to_string()), ("wl", w.level.to_string())],
            None => Vec::new(),
        };
        self.endpoint(
            &[
                "api",
                "studies",
                &series.study_id,
                "series",
                &series.series_id,
                "instances",
                instance_id.as_str(),
                "preview",
            ],
            &query,
        )
    }

    fn density_url(&self, instance_id: &InstanceId, point: ImagePoint) -> Result<Url, ApiError> {
        self.endpoint(
            &["api", "instances", instance_id.as_str(), "density"],
            &[("x", point.x.to_string()), ("y", point.y.to_string())],
        )
    }

    fn distance_url(&self, first: &Marker, second: &Marker) -> Result<Url, ApiError> {
        self.endpoint(
            &["api", "distance"],
            &[
                ("instanceId1", first.instance_id.to_string()),
                ("x1", first.point.x.to_string()),
                ("y1", first.point.y.to_string()),
                ("instanceId2", second.instance_id.to_string()),
                ("x2", second.point.x.to_string()),
                ("y2", second.point.y.to_string()),
            ],
        )
    }

    fn area_url(&self, instance_id: &InstanceId, vertices: &[ImagePoint]) -> Result<Url, ApiError> {
        let mut query = vec![("instanceId", instance_id.to_string())];
        query.extend(vertices.iter().map(|p| ("x", p.x.to_string())));
        query.extend(vertices.iter().map(|p| ("y", p.y.to_string())));
        self.endpoint(&["api", "area"], &query)
    }

    fn get(&self, url: Url) -> Result<Response, ApiError> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::error!("Server returned {}: {}", status, body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn get_text(&self, url: Url) -> Result<String, ApiError> {
        Ok(self.get(url)?.text()?)
    }
}

/// Read `field` from a JSON object payload as a float.
pub(crate) fn parse_number(payload: &str, field: &'static str) -> Result<f64, ApiError> {
    serde_json::from_str::<Value>(payload)
        .ok()
        .and_then(|v| v.get(field).and_then(Value::as_f64))
        .ok_or_else(|| malformed(payload, field))
}

/// Read `field` from a JSON object payload as a whole number.
pub(crate) fn parse_integer(payload: &str, field: &'static str) -> Result<i32, ApiError> {
    let value = parse_number(payload, field)?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(malformed(payload, field));
    }
    Ok(value as i32)
}

fn malformed(payload: &str, field: &'static str) -> ApiError {
    log::warn!("Response without numeric '{}': {}", field, payload);
    ApiError::Malformed {
        field,
        payload: payload.to_string(),
    }
}

impl MeasurementClient for HttpBackend {
    fn density(&self, instance_id: &InstanceId, point: ImagePoint) -> Result<i32, ApiError> {
        let payload = self.get_text(self.density_url(instance_id, point)?)?;
        parse_integer(&payload, "hu")
    }

    fn distance(&self, first: &Marker, second: &Marker) -> Result<f64, ApiError> {
        let payload = self.get_text(self.distance_url(first, second)?)?;
        parse_number(&payload, "distance")
    }

    fn area(&self, instance_id: &InstanceId, vertices: &[ImagePoint]) -> Result<f64, ApiError> {
        let payload = self.get_text(self.area_url(instance_id, vertices)?)?;
        parse_number(&payload, "area")
    }
}

impl SeriesSource for HttpBackend {
    fn instances(&self, series: &SeriesRef) -> Result<Vec<InstanceId>, ApiError> {
        let payload = self.get_text(self.instances_url(series)?)?;
        serde_json::from_str(&payload).map_err(|_| malformed(&payload, "instances"))
    }

    fn preview(
        &self,
        series: &SeriesRef,
        instance_id: &InstanceId,
        window: Option<WindowLevel>,
    ) -> Result<Vec<u8>, ApiError> {
        let bytes = self.get(self.preview_url(series, instance_id, window)?)?.bytes()?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(base, Duration::from_secs(1)).unwrap()
    }

    fn pt(x: u32, y: u32) -> ImagePoint {
        ImagePoint::new(x, y)
    }

    #[test]
    fn test_instances_url() {
        let b = backend("http://localhost:5000");
        let url = b.instances_url(&SeriesRef::new("st1", "se2")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/studies/st1/series/se2/instances");
    }

    #[test]
    fn test_base_path_prefix_kept() {
        let b = backend("http://host/pacs/");
        let url = b.density_url(&InstanceId::from("i"), pt(1, 2)).unwrap();
        assert_eq!(url.as_str(), "http://host/pacs/api/instances/i/density?x=1&y=2");
    }

    #[test]
    fn test_preview_window_optional() {
        let b = backend("http://host/");
        let series = SeriesRef::new("s", "r");
        let id = InstanceId::from("1.2.3");

        let url = b.preview_url(&series, &id, None).unwrap();
        assert_eq!(url.as_str(), "http://host/api/studies/s/series/r/instances/1.2.3/preview");

        let url = b
            .preview_url(&series, &id, Some(WindowLevel::new(1500, -600)))
            .unwrap();
        assert_eq!(url.query(), Some("ww=1500&wl=-600"));
    }

    #[test]
    fn test_distance_query() {
        let b = backend("http://host/");
        let first = Marker::new(InstanceId::from("A"), pt(100, 100));
        let second = Marker::new(InstanceId::from("B"), pt(300, 400));
        let url = b.distance_url(&first, &second).unwrap();
        assert_eq!(url.path(), "/api/distance");
        assert_eq!(
            url.query(),
            Some("instanceId1=A&x1=100&y1=100&instanceId2=B&x2=300&y2=400")
        );
    }

    #[test]
    fn test_area_query_keeps_vertex_order() {
        let b = backend("http://host/");
        let url = b
            .area_url(&InstanceId::from("a"), &[pt(0, 0), pt(10, 0), pt(5, 8)])
            .unwrap();
        assert_eq!(url.query(), Some("instanceId=a&x=0&x=10&x=5&y=0&y=0&y=8"));
    }

    #[test]
    fn test_ids_are_escaped() {
        let b = backend("http://host/");
        let url = b.density_url(&InstanceId::from("a/b c"), pt(0, 0)).unwrap();
        assert_eq!(url.path(), "/api/instances/a%2Fb%20c/density");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpBackend::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpBackend::new("mailto:someone@example.com", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_fields() {
        assert_eq!(parse_integer(r#"{"hu": -40}"#, "hu").unwrap(), -40);
        assert_eq!(parse_number(r#"{"distance": 12.5}"#, "distance").unwrap(), 12.5);
        assert_eq!(parse_number(r#"{"area": 3}"#, "area").unwrap(), 3.0);
    }

    #[test]
    fn test_malformed_keeps_payload() {
        let err = parse_number(r#"{"error": "no pixel spacing"}"#, "distance").unwrap_err();
        match err {
            ApiError::Malformed { field, payload } => {
                assert_eq!(field, "distance");
                assert_eq!(payload, r#"{"error": "no pixel spacing"}"#);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(parse_number("<html>", "area").is_err());
        assert!(parse_integer(r#"{"hu": 1.5}"#, "hu").is_err());
        assert!(parse_integer(r#"{"hu": "12"}"#, "hu").is_err());
    }
}
