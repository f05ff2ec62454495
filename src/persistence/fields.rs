//! Field-value encoding of the current-snapshot record.
//!
//! Hash-like backends store the snapshot as flat `(field, value)` string
//! pairs. Unknown fields are ignored on read; string fields default to
//! empty, numeric fields are mandatory.

use super::StoreError;
use crate::domain::Snapshot;

/// Field holding the player count.
pub const PLAYER_COUNT: &str = "player_count";
/// Field holding the room name.
pub const ROOM_NAME: &str = "room_name";
/// Field holding the client version.
pub const GAME_VERSION: &str = "game_version";
/// Field holding the game title.
pub const GAME_NAME: &str = "game_name";
/// Field holding the ingestion timestamp.
pub const TIMESTAMP: &str = "timestamp";

/// Flattens a snapshot into ordered field-value pairs.
#[must_use]
pub fn to_fields(snapshot: &Snapshot) -> Vec<(String, String)> {
    vec![
        (PLAYER_COUNT.to_string(), snapshot.player_count.to_string()),
        (ROOM_NAME.to_string(), snapshot.room_name.clone()),
        (GAME_VERSION.to_string(), snapshot.game_version.clone()),
        (GAME_NAME.to_string(), snapshot.game_name.clone()),
        (TIMESTAMP.to_string(), snapshot.timestamp.to_string()),
    ]
}

/// Rebuilds a snapshot from field-value pairs.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] if `player_count` or `timestamp` is
/// missing or not an integer.
pub fn from_fields<I>(pairs: I) -> Result<Snapshot, StoreError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut player_count = None;
    let mut timestamp = None;
    let mut room_name = String::new();
    let mut game_version = String::new();
    let mut game_name = String::new();

    for (field, value) in pairs {
        match field.as_str() {
            PLAYER_COUNT => player_count = Some(parse_field::<u64>(PLAYER_COUNT, &value)?),
            TIMESTAMP => timestamp = Some(parse_field::<i64>(TIMESTAMP, &value)?),
            ROOM_NAME => room_name = value,
            GAME_VERSION => game_version = value,
            GAME_NAME => game_name = value,
            _ => {}
        }
    }

    Ok(Snapshot {
        player_count: player_count
            .ok_or_else(|| StoreError::Malformed(format!("current record lacks {PLAYER_COUNT}")))?,
        room_name,
        game_version,
        game_name,
        timestamp: timestamp
            .ok_or_else(|| StoreError::Malformed(format!("current record lacks {TIMESTAMP}")))?,
    })
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, StoreError> {
    value
        .parse()
        .map_err(|_| StoreError::Malformed(format!("{field} is not an integer: {value:?}")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn decodes_with_defaults_for_missing_strings() {
        let Ok(snapshot) = from_fields(pairs(&[("player_count", "9"), ("timestamp", "2000")]))
        else {
            panic!("expected valid record");
        };
        assert_eq!(snapshot.player_count, 9);
        assert_eq!(snapshot.timestamp, 2000);
        assert!(snapshot.room_name.is_empty());
    }

    #[test]
    fn rejects_missing_count() {
        let result = from_fields(pairs(&[("timestamp", "1"), ("room_name", "lobby")]));
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        let result = from_fields(pairs(&[("player_count", "1"), ("timestamp", "soon")]));
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn encoding_is_readable_back() {
        let snapshot = Snapshot {
            player_count: 3,
            room_name: "arena".to_string(),
            game_version: "0.9".to_string(),
            game_name: "monke".to_string(),
            timestamp: 77,
        };
        let decoded = from_fields(to_fields(&snapshot));
        assert_eq!(decoded, Ok(snapshot));
    }
}
