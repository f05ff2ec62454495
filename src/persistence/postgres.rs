//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{StoreError, TimeSeriesStore};
use crate::config::GatewayConfig;
use crate::domain::{SeriesPoint, Snapshot};

/// PostgreSQL-backed [`TimeSeriesStore`] using `sqlx::PgPool`.
///
/// The series lives in `player_series` with the timestamp as primary key,
/// so the conditional insert is a plain `ON CONFLICT DO NOTHING`. The
/// current snapshot is a single row upserted on a fixed id.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wraps an existing connection pool. The schema must already exist.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool from configuration and applies embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database is unreachable or a
    /// migration fails.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))?;

        tracing::info!("postgres store ready");
        Ok(Self::new(pool))
    }
}

impl TimeSeriesStore for PostgresStore {
    async fn insert_if_absent(&self, point: SeriesPoint) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO player_series (ts, player_count) VALUES ($1, $2) \
             ON CONFLICT (ts) DO NOTHING",
        )
        .bind(point.timestamp)
        .bind(to_db_count(point.player_count)?)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn prune_before(&self, cutoff: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM player_series WHERE ts < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn range_from(&self, from: i64) -> Result<Vec<SeriesPoint>, StoreError> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            "SELECT ts, player_count FROM player_series WHERE ts >= $1",
        )
        .bind(from)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter()
            .map(|(timestamp, count)| -> Result<SeriesPoint, StoreError> {
                Ok(SeriesPoint {
                    timestamp,
                    player_count: from_db_count(count)?,
                })
            })
            .collect()
    }

    async fn set_current(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO player_current (id, player_count, room_name, game_version, game_name, ts) \
             VALUES (1, $1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET \
                 player_count = EXCLUDED.player_count, \
                 room_name = EXCLUDED.room_name, \
                 game_version = EXCLUDED.game_version, \
                 game_name = EXCLUDED.game_name, \
                 ts = EXCLUDED.ts",
        )
        .bind(to_db_count(snapshot.player_count)?)
        .bind(&snapshot.room_name)
        .bind(&snapshot.game_version)
        .bind(&snapshot.game_name)
        .bind(snapshot.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn get_current(&self) -> Result<Option<Snapshot>, StoreError> {
        let row = sqlx::query_as::<_, (i64, String, String, String, i64)>(
            "SELECT player_count, room_name, game_version, game_name, ts \
             FROM player_current WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(
            |(count, room_name, game_version, game_name, timestamp)| -> Result<Snapshot, StoreError> {
                Ok(Snapshot {
                    player_count: from_db_count(count)?,
                    room_name,
                    game_version,
                    game_name,
                    timestamp,
                })
            },
        )
        .transpose()
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn to_db_count(count: u64) -> Result<i64, StoreError> {
    i64::try_from(count)
        .map_err(|_| StoreError::Backend(format!("player count {count} exceeds BIGINT")))
}

fn from_db_count(count: i64) -> Result<u64, StoreError> {
    u64::try_from(count)
        .map_err(|_| StoreError::Malformed(format!("negative player count {count}")))
}
