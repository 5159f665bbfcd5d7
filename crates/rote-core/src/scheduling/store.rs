//! Card schedule persistence store.
//!
//! Provides SQLite-backed storage for per-card schedules, so answers
//! computed locally survive between sessions and due cards can be queried
//! without the remote service.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{RoteError, RoteResult};
use crate::types::CardSchedule;

/// SQLite-backed store for card schedules.
pub struct ScheduleStore {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleStore {
    /// Create a new schedule store with the given database path.
    ///
    /// Creates the database file, its parent directory, and the schema if
    /// they don't exist.
    pub fn new<P: AsRef<Path>>(path: P) -> RoteResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory schedule store (useful for testing).
    pub fn in_memory() -> RoteResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> RoteResult<()> {
        let conn = self.conn.lock().map_err(|e| RoteError::database(e.to_string()))?;

        conn.execute_batch(
            "
            -- Per-card SM-2 scheduling state
            CREATE TABLE IF NOT EXISTS card_schedules (
                card_id TEXT PRIMARY KEY,
                interval_days INTEGER NOT NULL,
                ease_factor REAL NOT NULL,
                repetitions INTEGER NOT NULL DEFAULT 0,
                next_review TEXT NOT NULL,
                last_reviewed TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_card_schedules_next_review ON card_schedules(next_review);
            CREATE INDEX IF NOT EXISTS idx_card_schedules_last_reviewed ON card_schedules(last_reviewed);
            ",
        )?;

        Ok(())
    }

    /// Load the schedule for a card.
    ///
    /// Returns None if the card has no stored schedule.
    pub fn load(&self, card_id: &str) -> RoteResult<Option<CardSchedule>> {
        let conn = self.conn.lock().map_err(|e| RoteError::database(e.to_string()))?;

        let result = conn
            .query_row(
                "SELECT interval_days, ease_factor, repetitions, next_review, last_reviewed
                 FROM card_schedules WHERE card_id = ?1",
                params![card_id],
                |row| {
                    let interval_days: u32 = row.get(0)?;
                    let ease_factor: f32 = row.get(1)?;
                    let repetitions: u32 = row.get(2)?;
                    let next_review_str: String = row.get(3)?;
                    let last_reviewed_str: Option<String> = row.get(4)?;

                    let next_review = DateTime::parse_from_rfc3339(&next_review_str)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now());

                    let last_reviewed = last_reviewed_str.and_then(|s| {
                        DateTime::parse_from_rfc3339(&s)
                            .map(|dt| dt.with_timezone(&Utc))
                            .ok()
                    });

                    Ok(CardSchedule {
                        interval_days,
                        ease_factor,
                        repetitions,
                        next_review,
                        last_reviewed,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    /// Save the schedule for a card.
    ///
    /// Creates or updates the row for the given card ID.
    pub fn save(&self, card_id: &str, schedule: &CardSchedule) -> RoteResult<()> {
        let conn = self.conn.lock().map_err(|e| RoteError::database(e.to_string()))?;

        let now = Utc::now();
        let last_reviewed_str = schedule.last_reviewed.map(|dt| dt.to_rfc3339());

        conn.execute(
            "INSERT OR REPLACE INTO card_schedules
             (card_id, interval_days, ease_factor, repetitions, next_review, last_reviewed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6,
                     COALESCE((SELECT created_at FROM card_schedules WHERE card_id = ?1), ?7),
                     ?8)",
            params![
                card_id,
                schedule.interval_days,
                schedule.ease_factor,
                schedule.repetitions,
                schedule.next_review.to_rfc3339(),
                last_reviewed_str,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Delete the schedule for a card.
    pub fn delete(&self, card_id: &str) -> RoteResult<bool> {
        let conn = self.conn.lock().map_err(|e| RoteError::database(e.to_string()))?;

        let deleted = conn.execute(
            "DELETE FROM card_schedules WHERE card_id = ?1",
            params![card_id],
        )?;

        Ok(deleted > 0)
    }

    /// Get card ids and schedules due at or before `now`, earliest first.
    ///
    /// Returns up to `limit` entries.
    pub fn due_before(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> RoteResult<Vec<(String, CardSchedule)>> {
        let conn = self.conn.lock().map_err(|e| RoteError::database(e.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT card_id, interval_days, ease_factor, repetitions, next_review, last_reviewed
             FROM card_schedules
             WHERE next_review <= ?1
             ORDER BY next_review ASC
             LIMIT ?2",
        )?;

        let due = stmt
            .query_map(params![now.to_rfc3339(), limit], |row| {
                let card_id: String = row.get(0)?;
                let interval_days: u32 = row.get(1)?;
                let ease_factor: f32 = row.get(2)?;
                let repetitions: u32 = row.get(3)?;
                let next_review_str: String = row.get(4)?;
                let last_reviewed_str: Option<String> = row.get(5)?;

                let next_review = DateTime::parse_from_rfc3339(&next_review_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());

                let last_reviewed = last_reviewed_str.and_then(|s| {
                    DateTime::parse_from_rfc3339(&s)
                        .map(|dt| dt.with_timezone(&Utc))
                        .ok()
                });

                Ok((
                    card_id,
                    CardSchedule {
                        interval_days,
                        ease_factor,
                        repetitions,
                        next_review,
                        last_reviewed,
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(due)
    }

    /// Get count of stored schedules.
    pub fn count(&self) -> RoteResult<usize> {
        let conn = self.conn.lock().map_err(|e| RoteError::database(e.to_string()))?;

        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM card_schedules", [], |row| row.get(0))?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_schedule(interval_days: u32, due_in_days: i64) -> CardSchedule {
        let now = Utc::now();
        CardSchedule {
            interval_days,
            ease_factor: 2.5,
            repetitions: 2,
            next_review: now + Duration::days(due_in_days),
            last_reviewed: Some(now - Duration::days(interval_days as i64)),
        }
    }

    #[test]
    fn test_store_creation() {
        let store = ScheduleStore::in_memory().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_load_schedule() {
        let store = ScheduleStore::in_memory().unwrap();

        let schedule = create_test_schedule(6, 3);
        store.save("card1", &schedule).unwrap();

        let loaded = store.load("card1").unwrap().unwrap();

        assert_eq!(loaded.interval_days, 6);
        assert!((loaded.ease_factor - 2.5).abs() < 0.001);
        assert_eq!(loaded.repetitions, 2);
        assert!(loaded.last_reviewed.is_some());
    }

    #[test]
    fn test_load_missing_returns_none() {
        let store = ScheduleStore::in_memory().unwrap();
        assert!(store.load("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_existing() {
        let store = ScheduleStore::in_memory().unwrap();

        store.save("card1", &create_test_schedule(1, 1)).unwrap();
        store.save("card1", &create_test_schedule(15, 15)).unwrap();

        let loaded = store.load("card1").unwrap().unwrap();
        assert_eq!(loaded.interval_days, 15);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_schedule() {
        let store = ScheduleStore::in_memory().unwrap();

        store.save("card1", &create_test_schedule(1, 1)).unwrap();

        assert!(store.delete("card1").unwrap());
        assert!(store.load("card1").unwrap().is_none());

        // Deleting non-existent returns false
        assert!(!store.delete("nonexistent").unwrap());
    }

    #[test]
    fn test_due_before_filters_and_orders() {
        let store = ScheduleStore::in_memory().unwrap();

        store.save("overdue", &create_test_schedule(6, -3)).unwrap();
        store.save("due_now", &create_test_schedule(1, 0)).unwrap();
        store.save("tomorrow", &create_test_schedule(1, 1)).unwrap();

        let due = store.due_before(Utc::now(), 10).unwrap();

        let ids: Vec<&str> = due.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["overdue", "due_now"], "Earliest due first, future cards excluded");
    }

    #[test]
    fn test_due_before_respects_limit() {
        let store = ScheduleStore::in_memory().unwrap();
        let now = Utc::now();

        for i in 0..5 {
            store
                .save(&format!("card{}", i), &create_test_schedule(1, -(i as i64) - 1))
                .unwrap();
        }

        let due = store.due_before(now, 2).unwrap();
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn test_store_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.db");

        {
            let store = ScheduleStore::new(&path).unwrap();
            store.save("card1", &create_test_schedule(6, 3)).unwrap();
        }

        let reopened = ScheduleStore::new(&path).unwrap();
        let loaded = reopened.load("card1").unwrap().unwrap();
        assert_eq!(loaded.interval_days, 6);
    }

    #[test]
    fn test_store_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("schedules.db");

        let store = ScheduleStore::new(&path).unwrap();
        store.save("card1", &create_test_schedule(1, 0)).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
