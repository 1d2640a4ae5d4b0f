//! SQLite-based activity storage.
//!
//! One row per stored record (templates and standalone activities). Dates are
//! `YYYY-MM-DD` text; the recurrence rule and the skipped dates are JSON text
//! columns.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use super::{data_dir, ActivityStore};
use crate::activity::date::{parse_date, DATE_FORMAT};
use crate::activity::{Activity, RecurrenceConfig};
use crate::error::StoreError;

/// Raw column values, decoded outside of rusqlite's row callback so date and
/// enum errors surface as [`StoreError`] rather than being swallowed.
struct ActivityRow {
    id: String,
    start_date: String,
    end_date: String,
    activity_name: String,
    board: String,
    status: String,
    is_locked: bool,
    recurrence: Option<String>,
    skipped_dates: String,
}

impl ActivityRow {
    fn decode(self) -> Result<Activity, StoreError> {
        let recurrence: Option<RecurrenceConfig> = self
            .recurrence
            .as_deref()
            .map(|raw| serde_json::from_str::<RecurrenceConfig>(raw))
            .transpose()?;
        let skipped: Vec<String> = serde_json::from_str(&self.skipped_dates)?;
        let skipped_dates = skipped
            .iter()
            .map(|s| parse_date("skippedDates", s))
            .collect::<Result<BTreeSet<NaiveDate>, _>>()?;

        Ok(Activity {
            start_date: parse_date("startDate", &self.start_date)?,
            end_date: parse_date("endDate", &self.end_date)?,
            board: self.board.parse()?,
            status: self.status.parse()?,
            id: self.id,
            activity_name: self.activity_name,
            is_locked: self.is_locked,
            recurrence,
            parent_id: None,
            skipped_dates,
        })
    }
}

/// SQLite database for activity storage.
pub struct ActivityDb {
    conn: Connection,
}

impl ActivityDb {
    /// Open the database at `<data_dir>/planboard.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::DataDir(e.to_string()))?;
        Self::open_at(&dir.join("planboard.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS activities (
                id             TEXT PRIMARY KEY,
                start_date     TEXT NOT NULL,
                end_date       TEXT NOT NULL,
                activity_name  TEXT NOT NULL,
                board          TEXT NOT NULL,
                status         TEXT NOT NULL,
                is_locked      INTEGER NOT NULL DEFAULT 0,
                recurrence     TEXT,
                skipped_dates  TEXT NOT NULL DEFAULT '[]'
            );

            CREATE INDEX IF NOT EXISTS idx_activities_start_date ON activities(start_date);",
        )?;
        Ok(())
    }

    /// Fetch a single stored record.
    pub fn get(&self, id: &str) -> Result<Option<Activity>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, start_date, end_date, activity_name, board, status, is_locked,
                    recurrence, skipped_dates
             FROM activities WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], read_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?.decode()?)),
            None => Ok(None),
        }
    }
}

fn read_row(row: &rusqlite::Row) -> Result<ActivityRow, rusqlite::Error> {
    Ok(ActivityRow {
        id: row.get(0)?,
        start_date: row.get(1)?,
        end_date: row.get(2)?,
        activity_name: row.get(3)?,
        board: row.get(4)?,
        status: row.get(5)?,
        is_locked: row.get(6)?,
        recurrence: row.get(7)?,
        skipped_dates: row.get(8)?,
    })
}

impl ActivityStore for ActivityDb {
    fn load_all(&self) -> Result<Vec<Activity>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, start_date, end_date, activity_name, board, status, is_locked,
                    recurrence, skipped_dates
             FROM activities ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], read_row)?;

        let mut activities = Vec::new();
        for row in rows {
            activities.push(row?.decode()?);
        }
        Ok(activities)
    }

    fn save(&self, activity: &Activity) -> Result<(), StoreError> {
        let recurrence = activity
            .recurrence
            .as_ref()
            .map(|rule| serde_json::to_string(rule))
            .transpose()?;
        let skipped: Vec<String> = activity
            .skipped_dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();

        // Upsert keeps the rowid, so load order stays insertion order.
        self.conn.execute(
            "INSERT INTO activities (id, start_date, end_date, activity_name, board, status,
                                     is_locked, recurrence, skipped_dates)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                activity_name = excluded.activity_name,
                board = excluded.board,
                status = excluded.status,
                is_locked = excluded.is_locked,
                recurrence = excluded.recurrence,
                skipped_dates = excluded.skipped_dates",
            params![
                activity.id,
                activity.start_date.format(DATE_FORMAT).to_string(),
                activity.end_date.format(DATE_FORMAT).to_string(),
                activity.activity_name,
                activity.board.label(),
                activity.status.label(),
                activity.is_locked,
                recurrence,
                serde_json::to_string(&skipped)?,
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityDraft, Board, RecurrenceFrequency, Status};

    fn day(s: &str) -> NaiveDate {
        parse_date("date", s).unwrap()
    }

    fn weekly_template(id: &str) -> Activity {
        let mut rule = RecurrenceConfig::new(RecurrenceFrequency::Weekly, 1);
        rule.days_of_week = [1, 3].into_iter().collect();
        rule.end_recurrence = Some(day("2024-12-10"));
        let mut activity = ActivityDraft::new(
            "Prayer meeting",
            day("2024-01-01"),
            day("2024-01-01"),
            Board::RaphaLifeline,
            Status::House,
        )
        .with_recurrence(rule)
        .into_activity(id.to_string());
        activity.skipped_dates.insert(day("2024-01-03"));
        activity
    }

    #[test]
    fn save_and_load_roundtrip() {
        let db = ActivityDb::open_memory().unwrap();
        let template = weekly_template("t1");
        db.save(&template).unwrap();

        let loaded = db.load_all().unwrap();
        assert_eq!(loaded, vec![template.clone()]);
        assert_eq!(db.get("t1").unwrap(), Some(template));
        assert!(db.get("missing").unwrap().is_none());
    }

    #[test]
    fn upsert_keeps_insertion_order() {
        let db = ActivityDb::open_memory().unwrap();
        db.save(&weekly_template("a")).unwrap();
        db.save(&weekly_template("b")).unwrap();

        let mut updated = weekly_template("a");
        updated.skipped_dates.insert(day("2024-01-08"));
        db.save(&updated).unwrap();

        let ids: Vec<_> = db.load_all().unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(db.get("a").unwrap().unwrap().skipped_dates.len(), 2);
    }

    #[test]
    fn delete_removes_record() {
        let db = ActivityDb::open_memory().unwrap();
        db.save(&weekly_template("a")).unwrap();
        db.delete("a").unwrap();
        db.delete("a").unwrap();
        assert!(db.load_all().unwrap().is_empty());
    }

    #[test]
    fn malformed_stored_dates_surface_as_errors() {
        let db = ActivityDb::open_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO activities (id, start_date, end_date, activity_name, board, status)
                 VALUES ('x', '2024-02-30', '2024-03-01', 'Broken', 'EXCEL', 'HOUSE')",
                [],
            )
            .unwrap();
        assert!(matches!(db.load_all(), Err(StoreError::Date(_))));
    }

    #[test]
    fn file_backed_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planboard.db");
        {
            let db = ActivityDb::open_at(&path).unwrap();
            db.save(&weekly_template("kept")).unwrap();
        }
        let reopened = ActivityDb::open_at(&path).unwrap();
        assert_eq!(reopened.load_all().unwrap().len(), 1);
    }
}
