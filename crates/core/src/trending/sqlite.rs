//! SQLite-backed trending item store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use super::{TrendingError, TrendingItem, TrendingStore};
use crate::catalog::MediaType;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed trending store.
pub struct SqliteTrendingStore {
    conn: Mutex<Connection>,
}

impl SqliteTrendingStore {
    /// Create a new SQLite trending store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TrendingError> {
        let conn = Connection::open(path).map_err(|e| TrendingError::Store(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite trending store (useful for testing).
    pub fn in_memory() -> Result<Self, TrendingError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TrendingError::Store(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TrendingError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS trending_items (
                catalog_id TEXT PRIMARY KEY,
                media_type TEXT NOT NULL,
                title TEXT NOT NULL,
                banner_url TEXT,
                release_date TEXT,
                first_air_date TEXT,
                last_air_date TEXT,
                rating REAL,
                rated TEXT,
                rank INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_trending_created ON trending_items(created_at);
            "#,
        )
        .map_err(|e| TrendingError::Store(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, TrendingError> {
        self.conn
            .lock()
            .map_err(|e| TrendingError::Store(format!("trending lock poisoned: {e}")))
    }
}

/// Fixed-width timestamps so that text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<TrendingItem> {
    let media_type_str: String = row.get(1)?;
    let media_type = media_type_str
        .parse::<MediaType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let created_at_str: String = row.get(10)?;

    Ok(TrendingItem {
        id: row.get(0)?,
        media_type,
        title: row.get(2)?,
        banner_url: row.get(3)?,
        release_date: date_column(row, 4)?,
        first_air_date: date_column(row, 5)?,
        last_air_date: date_column(row, 6)?,
        rating: row.get(7)?,
        rated: row.get(8)?,
        rank: row.get(9)?,
        created_at: parse_timestamp(10, &created_at_str)?,
    })
}

impl TrendingStore for SqliteTrendingStore {
    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>, TrendingError> {
        let conn = self.lock()?;
        let latest: Option<String> = conn
            .query_row(
                "SELECT created_at FROM trending_items ORDER BY created_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| TrendingError::Store(e.to_string()))?;

        latest
            .map(|s| parse_timestamp(0, &s).map_err(|e| TrendingError::Store(e.to_string())))
            .transpose()
    }

    fn list(&self) -> Result<Vec<TrendingItem>, TrendingError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT catalog_id, media_type, title, banner_url, release_date, first_air_date,
                        last_air_date, rating, rated, rank, created_at
                 FROM trending_items ORDER BY rank ASC",
            )
            .map_err(|e| TrendingError::Store(e.to_string()))?;

        let rows = stmt
            .query_map([], row_to_item)
            .map_err(|e| TrendingError::Store(e.to_string()))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(|e| TrendingError::Store(e.to_string()))?);
        }
        Ok(items)
    }

    fn replace_all(&self, items: &[TrendingItem]) -> Result<(), TrendingError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| TrendingError::Store(e.to_string()))?;

        tx.execute("DELETE FROM trending_items", [])
            .map_err(|e| TrendingError::Store(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO trending_items (catalog_id, media_type, title, banner_url,
                        release_date, first_air_date, last_air_date, rating, rated, rank, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                )
                .map_err(|e| TrendingError::Store(e.to_string()))?;

            for item in items {
                stmt.execute(params![
                    &item.id,
                    item.media_type.as_str(),
                    &item.title,
                    &item.banner_url,
                    item.release_date.map(|d| d.format(DATE_FORMAT).to_string()),
                    item.first_air_date.map(|d| d.format(DATE_FORMAT).to_string()),
                    item.last_air_date.map(|d| d.format(DATE_FORMAT).to_string()),
                    item.rating,
                    &item.rated,
                    item.rank,
                    format_timestamp(&item.created_at),
                ])
                .map_err(|e| TrendingError::Store(e.to_string()))?;
            }
        }

        tx.commit()
            .map_err(|e| TrendingError::Store(e.to_string()))?;

        Ok(())
    }

    fn count(&self) -> Result<u64, TrendingError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM trending_items", [], |row| row.get(0))
            .map_err(|e| TrendingError::Store(e.to_string()))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(id: &str, rank: u32, created_at: DateTime<Utc>) -> TrendingItem {
        TrendingItem {
            id: id.to_string(),
            title: format!("Title {id}"),
            banner_url: Some(format!("{id}.jpg")),
            release_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            first_air_date: None,
            last_air_date: None,
            rated: Some("PG-13".to_string()),
            rating: Some(7.5),
            media_type: MediaType::Movie,
            rank,
            created_at,
        }
    }

    #[test]
    fn test_empty_store() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        assert!(store.latest_created_at().unwrap().is_none());
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_replace_all_and_list_in_rank_order() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        let now = Utc::now();
        store
            .replace_all(&[item("b", 2, now), item("a", 1, now), item("c", 3, now)])
            .unwrap();

        let items = store.list().unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(items[0].rated.as_deref(), Some("PG-13"));
        assert_eq!(items[0].release_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_replace_all_discards_previous_set() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        let earlier = Utc::now() - Duration::days(8);
        store
            .replace_all(&[item("old-1", 1, earlier), item("old-2", 2, earlier)])
            .unwrap();

        let now = Utc::now();
        store.replace_all(&[item("new-1", 1, now)]).unwrap();

        let items = store.list().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "new-1");
    }

    #[test]
    fn test_replace_all_with_empty_set_clears() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        store.replace_all(&[item("a", 1, Utc::now())]).unwrap();
        store.replace_all(&[]).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_failed_replace_keeps_previous_set() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        let now = Utc::now();
        store.replace_all(&[item("a", 1, now)]).unwrap();

        // Duplicate primary key aborts the transaction after the delete.
        let result = store.replace_all(&[item("x", 1, now), item("x", 2, now)]);
        assert!(result.is_err());

        let items = store.list().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
    }

    #[test]
    fn test_latest_created_at_round_trips() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        let created = Utc::now() - Duration::days(3);
        store.replace_all(&[item("a", 1, created)]).unwrap();

        let latest = store.latest_created_at().unwrap().unwrap();
        assert_eq!(latest.timestamp_micros(), created.timestamp_micros());
    }
}
