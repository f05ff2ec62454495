//! Redis backend reached through the Upstash REST API.
//!
//! Each trait operation is one REST round-trip carrying one Redis command
//! as a JSON array of strings. The series is a sorted set scored by
//! timestamp with `{"t":..,"c":..}` members; the current snapshot is a
//! hash.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::{StoreError, TimeSeriesStore, fields};
use crate::config::{GatewayConfig, Secret};
use crate::domain::{SeriesPoint, Snapshot};

/// Adds `ARGV[2]` at score `ARGV[1]` only when no member already carries
/// that score. Runs atomically on the Redis server.
const INSERT_IF_ABSENT_SCRIPT: &str = "if redis.call('ZCOUNT', KEYS[1], ARGV[1], ARGV[1]) == 0 then \
     redis.call('ZADD', KEYS[1], ARGV[1], ARGV[2]) return 1 end return 0";

/// Single-command reply envelope.
#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Upstash-hosted Redis [`TimeSeriesStore`].
#[derive(Clone)]
pub struct UpstashStore {
    client: reqwest::Client,
    base_url: String,
    token: Secret,
    series_key: String,
    current_key: String,
}

impl fmt::Debug for UpstashStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstashStore")
            .field("base_url", &self.base_url)
            .field("token", &self.token)
            .field("series_key", &self.series_key)
            .field("current_key", &self.current_key)
            .finish_non_exhaustive()
    }
}

impl UpstashStore {
    /// Creates a store talking to `base_url` with bearer `token`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        token: Secret,
        series_key: impl Into<String>,
        current_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            series_key: series_key.into(),
            current_key: current_key.into(),
        }
    }

    /// Builds a store from the Upstash settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the URL or token is missing or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, StoreError> {
        let (Some(url), Some(token)) = (&config.upstash_url, &config.upstash_token) else {
            return Err(StoreError::Backend(
                "UPSTASH_REDIS_REST_URL and UPSTASH_REDIS_REST_TOKEN are required".to_string(),
            ));
        };
        let client = reqwest::Client::builder()
            .timeout(config.store_timeout)
            .build()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self::new(
            client,
            url,
            token.clone(),
            config.series_key.clone(),
            config.current_key.clone(),
        ))
    }

    async fn command(&self, args: Vec<String>) -> Result<Value, StoreError> {
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(self.token.expose())
            .json(&args)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        match serde_json::from_slice::<CommandReply>(&body) {
            Ok(CommandReply {
                error: Some(error), ..
            }) => Err(StoreError::Backend(error)),
            Ok(reply) if status.is_success() => Ok(reply.result.unwrap_or(Value::Null)),
            Err(e) if status.is_success() => Err(StoreError::Malformed(e.to_string())),
            Ok(_) | Err(_) => Err(StoreError::Backend(format!("upstash answered {status}"))),
        }
    }

    fn insert_command(&self, point: SeriesPoint) -> Result<Vec<String>, StoreError> {
        let member =
            serde_json::to_string(&point).map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(vec![
            "EVAL".to_string(),
            INSERT_IF_ABSENT_SCRIPT.to_string(),
            "1".to_string(),
            self.series_key.clone(),
            point.timestamp.to_string(),
            member,
        ])
    }

    fn prune_command(&self, cutoff: i64) -> Vec<String> {
        vec![
            "ZREMRANGEBYSCORE".to_string(),
            self.series_key.clone(),
            "-inf".to_string(),
            format!("({cutoff}"),
        ]
    }

    fn range_command(&self, from: i64) -> Vec<String> {
        vec![
            "ZRANGEBYSCORE".to_string(),
            self.series_key.clone(),
            from.to_string(),
            "+inf".to_string(),
        ]
    }

    fn set_current_command(&self, snapshot: &Snapshot) -> Vec<String> {
        let mut args = vec!["HSET".to_string(), self.current_key.clone()];
        for (field, value) in fields::to_fields(snapshot) {
            args.push(field);
            args.push(value);
        }
        args
    }
}

impl TimeSeriesStore for UpstashStore {
    async fn insert_if_absent(&self, point: SeriesPoint) -> Result<bool, StoreError> {
        let reply = self.command(self.insert_command(point)?).await?;
        Ok(as_integer(&reply)? == 1)
    }

    async fn prune_before(&self, cutoff: i64) -> Result<u64, StoreError> {
        let reply = self.command(self.prune_command(cutoff)).await?;
        u64::try_from(as_integer(&reply)?)
            .map_err(|_| StoreError::Malformed(format!("negative removal count: {reply}")))
    }

    async fn range_from(&self, from: i64) -> Result<Vec<SeriesPoint>, StoreError> {
        let reply = self.command(self.range_command(from)).await?;
        as_strings(reply)?
            .iter()
            .map(|member| {
                serde_json::from_str(member)
                    .map_err(|e| StoreError::Malformed(format!("series member {member:?}: {e}")))
            })
            .collect()
    }

    async fn set_current(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.command(self.set_current_command(snapshot)).await?;
        Ok(())
    }

    async fn get_current(&self) -> Result<Option<Snapshot>, StoreError> {
        let reply = self
            .command(vec!["HGETALL".to_string(), self.current_key.clone()])
            .await?;
        let flat = as_strings(reply)?;
        if flat.is_empty() {
            return Ok(None);
        }
        fields::from_fields(pair_up(flat)?).map(Some)
    }

    fn backend_name(&self) -> &'static str {
        "upstash"
    }
}

/// Integer reply; Upstash may encode it as a JSON number or a string.
fn as_integer(value: &Value) -> Result<i64, StoreError> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| StoreError::Malformed(format!("expected integer reply, got {value}")))
}

/// Array-of-strings reply; `null` reads as empty.
fn as_strings(value: Value) -> Result<Vec<String>, StoreError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(StoreError::Malformed(format!("expected string, got {other}"))),
            })
            .collect(),
        other => Err(StoreError::Malformed(format!("expected array reply, got {other}"))),
    }
}

/// Turns a flat `[k1, v1, k2, v2, ..]` reply into pairs.
fn pair_up(flat: Vec<String>) -> Result<Vec<(String, String)>, StoreError> {
    if flat.len() % 2 != 0 {
        return Err(StoreError::Malformed(
            "hash reply has an odd number of elements".to_string(),
        ));
    }
    let mut pairs = Vec::with_capacity(flat.len() / 2);
    let mut items = flat.into_iter();
    while let (Some(field), Some(value)) = (items.next(), items.next()) {
        pairs.push((field, value));
    }
    Ok(pairs)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use serde_json::json;

    use super::*;

    fn store() -> UpstashStore {
        UpstashStore::new(
            reqwest::Client::new(),
            "https://example.upstash.io/",
            Secret::new("s3cr3t"),
            "players:series",
            "players:current",
        )
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(store().base_url, "https://example.upstash.io");
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", store());
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("players:series"));
    }

    #[test]
    fn insert_scores_member_by_timestamp() {
        let Ok(args) = store().insert_command(SeriesPoint {
            timestamp: 1000,
            player_count: 5,
        }) else {
            panic!("command build failed");
        };
        assert_eq!(args.first().map(String::as_str), Some("EVAL"));
        assert_eq!(args.get(4).map(String::as_str), Some("1000"));
        assert_eq!(args.get(5).map(String::as_str), Some(r#"{"t":1000,"c":5}"#));
    }

    #[test]
    fn prune_bound_is_exclusive() {
        let args = store().prune_command(500);
        assert_eq!(args.last().map(String::as_str), Some("(500"));
    }

    #[test]
    fn set_current_flattens_fields() {
        let snapshot = Snapshot {
            player_count: 9,
            room_name: "lobby".to_string(),
            game_version: String::new(),
            game_name: String::new(),
            timestamp: 2000,
        };
        let args = store().set_current_command(&snapshot);
        assert_eq!(args.len(), 2 + 10);
        assert_eq!(args.get(2).map(String::as_str), Some("player_count"));
        assert_eq!(args.get(3).map(String::as_str), Some("9"));
    }

    #[test]
    fn integer_replies_accept_numbers_and_strings() {
        assert_eq!(as_integer(&json!(3)), Ok(3));
        assert_eq!(as_integer(&json!("4")), Ok(4));
        assert!(as_integer(&json!(null)).is_err());
    }

    #[test]
    fn string_array_replies() {
        assert_eq!(as_strings(json!(null)), Ok(Vec::new()));
        assert_eq!(as_strings(json!(["a", "b"])), Ok(vec!["a".to_string(), "b".to_string()]));
        assert!(as_strings(json!([1])).is_err());
        assert!(as_strings(json!("a")).is_err());
    }

    #[test]
    fn hash_reply_pairs_up() {
        let flat = vec!["player_count".to_string(), "9".to_string()];
        assert_eq!(
            pair_up(flat),
            Ok(vec![("player_count".to_string(), "9".to_string())])
        );
        assert!(pair_up(vec!["dangling".to_string()]).is_err());
    }

    async fn stub(status: StatusCode, body: &'static str) -> UpstashStore {
        let app = Router::new().route("/", post(move || async move { (status, body) }));
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        UpstashStore::new(
            reqwest::Client::new(),
            &format!("http://{addr}"),
            Secret::new("s3cr3t"),
            "players:series",
            "players:current",
        )
    }

    #[tokio::test]
    async fn eval_zero_means_already_present() {
        let point = SeriesPoint {
            timestamp: 1000,
            player_count: 5,
        };
        let taken = stub(StatusCode::OK, r#"{"result":0}"#).await;
        assert_eq!(taken.insert_if_absent(point).await, Ok(false));
        let fresh = stub(StatusCode::OK, r#"{"result":1}"#).await;
        assert_eq!(fresh.insert_if_absent(point).await, Ok(true));
    }

    #[tokio::test]
    async fn error_reply_is_backend_failure() {
        let store = stub(StatusCode::BAD_REQUEST, r#"{"error":"ERR wrong type"}"#).await;
        assert_eq!(
            store.prune_before(10).await,
            Err(StoreError::Backend("ERR wrong type".to_string()))
        );
    }

    #[tokio::test]
    async fn non_success_status_is_backend_failure() {
        let store = stub(StatusCode::SERVICE_UNAVAILABLE, "upstream down").await;
        assert!(matches!(
            store.range_from(0).await,
            Err(StoreError::Backend(msg)) if msg.contains("503")
        ));
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed() {
        let store = stub(StatusCode::OK, "<html>").await;
        assert!(matches!(store.get_current().await, Err(StoreError::Malformed(_))));
    }

    #[tokio::test]
    async fn empty_hash_reads_as_no_current() {
        let store = stub(StatusCode::OK, r#"{"result":[]}"#).await;
        assert_eq!(store.get_current().await, Ok(None));
    }

    #[tokio::test]
    async fn hash_reply_reads_as_snapshot() {
        let store = stub(
            StatusCode::OK,
            r#"{"result":["player_count","9","room_name","lobby","timestamp","2000"]}"#,
        )
        .await;
        let Ok(Some(current)) = store.get_current().await else {
            panic!("expected a current snapshot");
        };
        assert_eq!(current.player_count, 9);
        assert_eq!(current.room_name, "lobby");
        assert_eq!(current.timestamp, 2000);
    }

    #[tokio::test]
    async fn range_reply_decodes_members() {
        let store = stub(
            StatusCode::OK,
            r#"{"result":["{\"t\":1000,\"c\":5}","{\"t\":2000,\"c\":9}"]}"#,
        )
        .await;
        let Ok(points) = store.range_from(0).await else {
            panic!("range failed");
        };
        assert_eq!(
            points,
            vec![
                SeriesPoint {
                    timestamp: 1000,
                    player_count: 5
                },
                SeriesPoint {
                    timestamp: 2000,
                    player_count: 9
                },
            ]
        );
    }
}
