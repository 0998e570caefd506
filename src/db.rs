// Local key-value storage + audit trail
//
// Each collection is one JSON document under a fixed key, written whole
// on every mutation. The events table records what changed and when.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Key holding the JSON array of items
pub const ITEMS_KEY: &str = "fridge_inventory_items";

/// Key holding the JSON settings document
pub const SETTINGS_KEY: &str = "fridge_app_settings";

/// One recorded mutation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }

    /// Columns: event_id, timestamp, event_type, entity_type, entity_id, data, actor
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let stamp: String = row.get(1)?;
        let payload: String = row.get(5)?;

        Ok(Event {
            event_id: row.get(0)?,
            timestamp: DateTime::parse_from_rfc3339(&stamp)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?,
            event_type: row.get(2)?,
            entity_type: row.get(3)?,
            entity_id: row.get(4)?,
            data: serde_json::from_str(&payload)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
            actor: row.get(6)?,
        })
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery; in-memory databases report "memory" and that's fine
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;

    // ==========================================================================
    // Key-value table (one JSON document per key)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Events table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp)",
        [],
    )?;

    Ok(())
}

/// Read the raw value stored under `key`
pub fn kv_get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;

    Ok(value)
}

/// Insert or replace the value under `key`
pub fn kv_set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, Utc::now().to_rfc3339()],
    )?;

    Ok(())
}

/// Returns true if a value was removed
pub fn kv_remove(conn: &Connection, key: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
    Ok(removed > 0)
}

/// Append one event
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let payload = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            payload,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Events for one entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], Event::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_kv_set_get_overwrite() {
        let conn = test_conn();

        assert_eq!(kv_get(&conn, ITEMS_KEY).unwrap(), None);

        kv_set(&conn, ITEMS_KEY, "[]").unwrap();
        kv_set(&conn, ITEMS_KEY, "[1]").unwrap();

        assert_eq!(kv_get(&conn, ITEMS_KEY).unwrap(), Some("[1]".to_string()));
        assert_eq!(kv_get(&conn, SETTINGS_KEY).unwrap(), None);
    }

    #[test]
    fn test_kv_remove() {
        let conn = test_conn();
        kv_set(&conn, SETTINGS_KEY, "{}").unwrap();

        assert!(kv_remove(&conn, SETTINGS_KEY).unwrap());
        assert!(!kv_remove(&conn, SETTINGS_KEY).unwrap());
        assert_eq!(kv_get(&conn, SETTINGS_KEY).unwrap(), None);
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = test_conn();
        kv_set(&conn, ITEMS_KEY, "[]").unwrap();

        setup_database(&conn).unwrap();

        assert_eq!(kv_get(&conn, ITEMS_KEY).unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_event_log() {
        let conn = test_conn();

        let event = Event::new(
            "item_added",
            "item",
            "item-123",
            serde_json::json!({"name": "Milk"}),
            "cli",
        );
        insert_event(&conn, &event).unwrap();
        insert_event(
            &conn,
            &Event::new("item_added", "item", "other", serde_json::json!({}), "cli"),
        )
        .unwrap();

        let events = get_events_for_entity(&conn, "item", "item-123").unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "item_added");
        assert_eq!(events[0].data["name"], "Milk");
        assert_eq!(get_events_for_entity(&conn, "item", "other").unwrap().len(), 1);
    }
}
