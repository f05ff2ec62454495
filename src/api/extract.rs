//! Ingest body decoding.
//!
//! Game clients post either JSON or `application/x-www-form-urlencoded`
//! (the default for engine HTTP helpers). Anything not declared as JSON is
//! decoded as a form.

use axum::extract::{Form, FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue};
use axum::Json;
use serde_json::{Map, Value};

use super::dto::SnapshotReport;
use crate::error::GatewayError;

impl<S> FromRequest<S> for SnapshotReport
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(mut req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if declares_json(req.headers()) {
            let Json(body) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| invalid_body(&e.body_text()))?;
            return Ok(Self::from_json(body));
        }

        req.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|e| invalid_body(&e.body_text()))?;
        Ok(Self::from_form(fields))
    }
}

impl SnapshotReport {
    /// Reads a report from a JSON object. Numbers and strings are both
    /// accepted for every field; `null` counts as absent.
    #[must_use]
    pub fn from_json(mut body: Map<String, Value>) -> Self {
        let mut take = |key: &str| body.remove(key).and_then(json_text);
        Self {
            player_count: take("player_count"),
            room_name: take("room_name").unwrap_or_default(),
            game_version: take("game_version").unwrap_or_default(),
            game_name: take("game_name").unwrap_or_default(),
        }
    }

    /// Reads a report from decoded form fields. A repeated field keeps its
    /// first value.
    #[must_use]
    pub fn from_form(fields: Vec<(String, String)>) -> Self {
        let first = |key: &str| {
            fields
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
        };
        Self {
            player_count: first("player_count"),
            room_name: first("room_name").unwrap_or_default(),
            game_version: first("game_version").unwrap_or_default(),
            game_name: first("game_name").unwrap_or_default(),
        }
    }
}

fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with("application/json"))
}

/// Renders a JSON scalar as text. Whole floats such as `5.0` render
/// without the fraction so they parse as counts.
fn json_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) if n.is_f64() => Some(match n.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
            _ => n.to_string(),
        }),
        other => Some(other.to_string()),
    }
}

fn invalid_body(reason: &str) -> GatewayError {
    tracing::debug!(reason, "undecodable ingest body");
    GatewayError::Validation("invalid body".to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;

    use super::*;

    async fn decode(content_type: Option<&'static str>, body: &'static str) -> Result<SnapshotReport, GatewayError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        let Ok(req) = builder.body(Body::from(body)) else {
            panic!("request build failed");
        };
        SnapshotReport::from_request(req, &()).await
    }

    #[tokio::test]
    async fn json_with_numeric_count() {
        let Ok(report) = decode(
            Some("application/json; charset=utf-8"),
            r#"{"player_count": 5, "room_name": "lobby"}"#,
        )
        .await
        else {
            panic!("decode failed");
        };
        assert_eq!(report.player_count.as_deref(), Some("5"));
        assert_eq!(report.room_name, "lobby");
        assert!(report.game_name.is_empty());
    }

    #[tokio::test]
    async fn json_null_count_is_absent() {
        let Ok(report) = decode(Some("application/json"), r#"{"player_count": null}"#).await else {
            panic!("decode failed");
        };
        assert!(report.player_count.is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_body() {
        let result = decode(Some("application/json"), "{not json").await;
        assert!(matches!(result, Err(GatewayError::Validation(msg)) if msg == "invalid body"));
    }

    #[tokio::test]
    async fn form_is_default_without_content_type() {
        let Ok(report) = decode(None, "player_count=12&room_name=arena&game_version=1.2").await
        else {
            panic!("decode failed");
        };
        assert_eq!(report.player_count.as_deref(), Some("12"));
        assert_eq!(report.room_name, "arena");
        assert_eq!(report.game_version, "1.2");
    }

    #[tokio::test]
    async fn form_with_other_content_type() {
        let Ok(report) = decode(Some("text/plain"), "player_count=3").await else {
            panic!("decode failed");
        };
        assert_eq!(report.player_count.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn whole_float_count_drops_fraction() {
        let Ok(report) = decode(Some("application/json"), r#"{"player_count": 5.0}"#).await else {
            panic!("decode failed");
        };
        assert_eq!(report.player_count.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn fractional_count_is_kept_verbatim() {
        let Ok(report) = decode(Some("application/json"), r#"{"player_count": 4.5}"#).await else {
            panic!("decode failed");
        };
        assert_eq!(report.player_count.as_deref(), Some("4.5"));
    }

    #[tokio::test]
    async fn repeated_form_field_keeps_first_value() {
        let Ok(report) = decode(None, "player_count=5&player_count=9&room_name=a&room_name=b").await
        else {
            panic!("decode failed");
        };
        assert_eq!(report.player_count.as_deref(), Some("5"));
        assert_eq!(report.room_name, "a");
    }
}
