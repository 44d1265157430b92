//! SQLite-backed movie and TV show catalog.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    CatalogError, CatalogRecord, CatalogStats, CatalogStore, MediaLinks, MediaSummary, MediaType,
    Movie, NewMovie, NewShow, Page, Show, PAGE_SIZE,
};

const MEDIA_COLUMNS: &str = "id, media_type, title, imdb_id, rating, rated, runtime, language,
    release_date, first_air_date, last_air_date, status, genres, summary, cast_members,
    homepage, banner_url, poster_url, trailer_url";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed catalog. Movies and shows share one table keyed by id.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS media (
                id TEXT PRIMARY KEY,
                media_type TEXT NOT NULL,
                title TEXT NOT NULL,
                imdb_id TEXT,
                rating REAL,
                rated TEXT,
                runtime INTEGER,
                language TEXT NOT NULL,
                release_date TEXT,
                first_air_date TEXT,
                last_air_date TEXT,
                status TEXT,
                genres TEXT NOT NULL DEFAULT '[]',
                summary TEXT NOT NULL,
                cast_members TEXT NOT NULL DEFAULT '[]',
                homepage TEXT,
                banner_url TEXT,
                poster_url TEXT,
                trailer_url TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_media_type ON media(media_type);
            CREATE INDEX IF NOT EXISTS idx_media_imdb ON media(media_type, imdb_id);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|e| CatalogError::Internal(format!("catalog lock poisoned: {e}")))
    }

    fn insert_row(conn: &Connection, row: &MediaRow) -> Result<(), CatalogError> {
        let genres =
            serde_json::to_string(&row.genres).map_err(|e| CatalogError::Internal(e.to_string()))?;
        let cast =
            serde_json::to_string(&row.cast).map_err(|e| CatalogError::Internal(e.to_string()))?;

        conn.execute(
            "INSERT INTO media (id, media_type, title, imdb_id, rating, rated, runtime, language,
                release_date, first_air_date, last_air_date, status, genres, summary, cast_members,
                homepage, banner_url, poster_url, trailer_url, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
             ON CONFLICT(id) DO UPDATE SET
                media_type = excluded.media_type,
                title = excluded.title,
                imdb_id = excluded.imdb_id,
                rating = excluded.rating,
                rated = excluded.rated,
                runtime = excluded.runtime,
                language = excluded.language,
                release_date = excluded.release_date,
                first_air_date = excluded.first_air_date,
                last_air_date = excluded.last_air_date,
                status = excluded.status,
                genres = excluded.genres,
                summary = excluded.summary,
                cast_members = excluded.cast_members,
                homepage = excluded.homepage,
                banner_url = excluded.banner_url,
                poster_url = excluded.poster_url,
                trailer_url = excluded.trailer_url,
                updated_at = excluded.updated_at",
            params![
                &row.id,
                row.media_type.as_str(),
                &row.title,
                &row.imdb_id,
                row.rating,
                &row.rated,
                row.runtime,
                &row.language,
                row.release_date.map(|d| d.format(DATE_FORMAT).to_string()),
                row.first_air_date.map(|d| d.format(DATE_FORMAT).to_string()),
                row.last_air_date.map(|d| d.format(DATE_FORMAT).to_string()),
                &row.status,
                genres,
                &row.summary,
                cast,
                &row.homepage,
                &row.banner_url,
                &row.poster_url,
                &row.trailer_url,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    fn find_row(
        &self,
        media_type: MediaType,
        id: &str,
    ) -> Result<Option<MediaRow>, CatalogError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = ?1 AND media_type = ?2"),
            params![id, media_type.as_str()],
            row_to_media,
        )
        .optional()
        .map_err(|e| CatalogError::Database(e.to_string()))
    }

    fn get_row(&self, media_type: MediaType, id: &str) -> Result<MediaRow, CatalogError> {
        self.find_row(media_type, id)?
            .ok_or_else(|| CatalogError::NotFound(format!("{media_type} {id}")))
    }

    fn list_page(&self, media_type: MediaType, page: u32) -> Result<Page<MediaSummary>, CatalogError> {
        let conn = self.lock()?;

        let total: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM media WHERE media_type = ?",
                params![media_type.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        let total = total as u64;
        let total_pages = Page::<MediaSummary>::page_count(total);

        if page == 0 || page > total_pages {
            return Err(CatalogError::NotFound(format!("page {page}")));
        }

        let offset = (page - 1) as i64 * PAGE_SIZE as i64;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {MEDIA_COLUMNS} FROM media WHERE media_type = ?1
                 ORDER BY rowid LIMIT ?2 OFFSET ?3"
            ))
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![media_type.as_str(), PAGE_SIZE as i64, offset],
                row_to_media,
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(|e| CatalogError::Database(e.to_string()))?.summary());
        }

        Ok(Page {
            items,
            total,
            total_pages,
        })
    }

    fn search(&self, media_type: MediaType, title: &str) -> Result<Vec<MediaSummary>, CatalogError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {MEDIA_COLUMNS} FROM media
                 WHERE media_type = ?1
                 ORDER BY rowid"
            ))
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![media_type.as_str()], row_to_media)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        // SQLite's lower() only folds ASCII
        let needle = title.to_lowercase();
        let mut results = Vec::new();
        for row in rows {
            let row = row.map_err(|e| CatalogError::Database(e.to_string()))?;
            if row.title.to_lowercase().contains(&needle) {
                results.push(row.summary());
            }
        }
        Ok(results)
    }
}

impl CatalogStore for SqliteCatalog {
    fn upsert_movie(&self, movie: NewMovie) -> Result<Movie, CatalogError> {
        let row = MediaRow::from_new_movie(movie);
        let conn = self.lock()?;
        Self::insert_row(&conn, &row)?;
        row.into_movie()
    }

    fn upsert_show(&self, show: NewShow) -> Result<Show, CatalogError> {
        let row = MediaRow::from_new_show(show);
        let conn = self.lock()?;
        Self::insert_row(&conn, &row)?;
        row.into_show()
    }

    fn list_movies(&self, page: u32) -> Result<Page<MediaSummary>, CatalogError> {
        self.list_page(MediaType::Movie, page)
    }

    fn list_shows(&self, page: u32) -> Result<Page<MediaSummary>, CatalogError> {
        self.list_page(MediaType::Tv, page)
    }

    fn get_movie(&self, id: &str) -> Result<Movie, CatalogError> {
        self.get_row(MediaType::Movie, id)?.into_movie()
    }

    fn get_show(&self, id: &str) -> Result<Show, CatalogError> {
        self.get_row(MediaType::Tv, id)?.into_show()
    }

    fn search_movies(&self, title: &str) -> Result<Vec<MediaSummary>, CatalogError> {
        self.search(MediaType::Movie, title)
    }

    fn search_shows(&self, title: &str) -> Result<Vec<MediaSummary>, CatalogError> {
        self.search(MediaType::Tv, title)
    }

    fn movie_urls(&self, id: &str) -> Result<MediaLinks, CatalogError> {
        Ok(self.get_row(MediaType::Movie, id)?.links())
    }

    fn show_urls(&self, id: &str) -> Result<MediaLinks, CatalogError> {
        Ok(self.get_row(MediaType::Tv, id)?.links())
    }

    fn movie_cast(&self, id: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self.get_row(MediaType::Movie, id)?.cast)
    }

    fn show_cast(&self, id: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self.get_row(MediaType::Tv, id)?.cast)
    }

    fn find_by_imdb_id(
        &self,
        media_type: MediaType,
        imdb_id: &str,
    ) -> Result<Option<CatalogRecord>, CatalogError> {
        if imdb_id.is_empty() {
            return Ok(None);
        }

        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {MEDIA_COLUMNS} FROM media
                     WHERE media_type = ?1 AND imdb_id = ?2
                     ORDER BY rowid LIMIT 1"
                ),
                params![media_type.as_str(), imdb_id],
                row_to_media,
            )
            .optional()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(row.map(MediaRow::record))
    }

    fn get_summary(&self, id: &str) -> Result<Option<MediaSummary>, CatalogError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = ?"),
                params![id],
                row_to_media,
            )
            .optional()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(row.map(|r| r.summary()))
    }

    fn count(&self) -> Result<CatalogStats, CatalogError> {
        let conn = self.lock()?;
        let (movies, shows): (i64, i64) = conn
            .query_row(
                "SELECT
                    COALESCE(SUM(CASE WHEN media_type = 'movie' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN media_type = 'tv' THEN 1 ELSE 0 END), 0)
                 FROM media",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(CatalogStats {
            movies: movies as u64,
            shows: shows as u64,
        })
    }
}

/// Flat view of a `media` row, shared by movies and shows.
struct MediaRow {
    id: String,
    media_type: MediaType,
    title: String,
    imdb_id: Option<String>,
    rating: Option<f64>,
    rated: Option<String>,
    runtime: Option<u32>,
    language: String,
    release_date: Option<NaiveDate>,
    first_air_date: Option<NaiveDate>,
    last_air_date: Option<NaiveDate>,
    status: Option<String>,
    genres: Vec<String>,
    summary: String,
    cast: Vec<String>,
    homepage: Option<String>,
    banner_url: Option<String>,
    poster_url: Option<String>,
    trailer_url: Option<String>,
}

impl MediaRow {
    fn from_new_movie(movie: NewMovie) -> Self {
        Self {
            id: movie.id.unwrap_or_else(new_id),
            media_type: MediaType::Movie,
            title: movie.title,
            imdb_id: movie.imdb_id,
            rating: movie.rating,
            rated: movie.rated,
            runtime: movie.runtime,
            language: movie.language,
            release_date: Some(movie.release_date),
            first_air_date: None,
            last_air_date: None,
            status: movie.status,
            genres: movie.genres,
            summary: movie.summary,
            cast: movie.cast,
            homepage: movie.homepage,
            banner_url: movie.banner_url,
            poster_url: movie.poster_url,
            trailer_url: movie.trailer_url,
        }
    }

    fn from_new_show(show: NewShow) -> Self {
        Self {
            id: show.id.unwrap_or_else(new_id),
            media_type: MediaType::Tv,
            title: show.title,
            imdb_id: show.imdb_id,
            rating: show.rating,
            rated: show.rated,
            runtime: show.runtime,
            language: show.language,
            release_date: None,
            first_air_date: Some(show.first_air_date),
            last_air_date: show.last_air_date,
            status: show.status,
            genres: show.genres,
            summary: show.summary,
            cast: show.cast,
            homepage: show.homepage,
            banner_url: show.banner_url,
            poster_url: show.poster_url,
            trailer_url: None,
        }
    }

    fn into_movie(self) -> Result<Movie, CatalogError> {
        let release_date = self.release_date.ok_or_else(|| {
            CatalogError::Internal(format!("movie {} has no release date", self.id))
        })?;

        Ok(Movie {
            id: self.id,
            title: self.title,
            imdb_id: self.imdb_id,
            rating: self.rating,
            rated: self.rated,
            runtime: self.runtime,
            language: self.language,
            release_date,
            status: self.status,
            genres: self.genres,
            summary: self.summary,
            cast: self.cast,
            homepage: self.homepage,
            banner_url: self.banner_url,
            poster_url: self.poster_url,
            trailer_url: self.trailer_url,
        })
    }

    fn into_show(self) -> Result<Show, CatalogError> {
        let first_air_date = self.first_air_date.ok_or_else(|| {
            CatalogError::Internal(format!("show {} has no first air date", self.id))
        })?;

        Ok(Show {
            id: self.id,
            title: self.title,
            imdb_id: self.imdb_id,
            rating: self.rating,
            rated: self.rated,
            runtime: self.runtime,
            language: self.language,
            first_air_date,
            last_air_date: self.last_air_date,
            status: self.status,
            genres: self.genres,
            summary: self.summary,
            cast: self.cast,
            homepage: self.homepage,
            banner_url: self.banner_url,
            poster_url: self.poster_url,
        })
    }

    fn summary(self) -> MediaSummary {
        MediaSummary {
            id: self.id,
            title: self.title,
            media_type: self.media_type,
            banner_url: self.banner_url,
            poster_url: self.poster_url,
            release_date: self.release_date,
            first_air_date: self.first_air_date,
            last_air_date: self.last_air_date,
        }
    }

    fn links(&self) -> MediaLinks {
        MediaLinks {
            homepage: self.homepage.clone(),
            trailer_url: self.trailer_url.clone(),
            imdb_url: MediaLinks::imdb_url_for(self.imdb_id.as_deref()),
        }
    }

    fn record(self) -> CatalogRecord {
        CatalogRecord {
            id: self.id,
            media_type: self.media_type,
            title: self.title,
            banner_url: self.banner_url,
            release_date: self.release_date,
            first_air_date: self.first_air_date,
            last_air_date: self.last_air_date,
            rating: self.rating,
            rated: self.rated,
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn list_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let value: String = row.get(idx)?;
    serde_json::from_str(&value).map_err(|e| conversion_error(idx, e))
}

fn row_to_media(row: &rusqlite::Row) -> rusqlite::Result<MediaRow> {
    let media_type_str: String = row.get(1)?;
    let media_type = media_type_str
        .parse::<MediaType>()
        .map_err(|e| conversion_error(1, e))?;

    Ok(MediaRow {
        id: row.get(0)?,
        media_type,
        title: row.get(2)?,
        imdb_id: row.get(3)?,
        rating: row.get(4)?,
        rated: row.get(5)?,
        runtime: row.get(6)?,
        language: row.get(7)?,
        release_date: date_column(row, 8)?,
        first_air_date: date_column(row, 9)?,
        last_air_date: date_column(row, 10)?,
        status: row.get(11)?,
        genres: list_column(row, 12)?,
        summary: row.get(13)?,
        cast: list_column(row, 14)?,
        homepage: row.get(15)?,
        banner_url: row.get(16)?,
        poster_url: row.get(17)?,
        trailer_url: row.get(18)?,
    })
}
