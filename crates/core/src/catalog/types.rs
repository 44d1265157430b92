//! Types for the local movie and TV show catalog.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of summaries returned per catalog page.
pub const PAGE_SIZE: u32 = 20;

/// Kind of catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(CatalogError::Internal(format!("unknown media type: {other}"))),
        }
    }
}

/// A movie as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    pub language: String,
    pub release_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub genres: Vec<String>,
    pub summary: String,
    pub cast: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
}

/// A TV show as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    pub language: String,
    pub first_air_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_air_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub genres: Vec<String>,
    pub summary: String,
    pub cast: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

/// Input for inserting or replacing a movie.
///
/// When `id` is absent a new UUID is assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rated: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    pub language: String,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub summary: String,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
}

/// Input for inserting or replacing a TV show.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShow {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rated: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    pub language: String,
    pub first_air_date: NaiveDate,
    #[serde(default)]
    pub last_air_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub summary: String,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// Listing projection shared by movies and shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_air_date: Option<NaiveDate>,
}

/// Detail projection of a movie.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub release_date: NaiveDate,
    pub cast: Vec<String>,
    pub rating: Option<f64>,
    pub summary: String,
    pub genres: Vec<String>,
    pub runtime: Option<u32>,
    pub language: String,
    pub poster_url: Option<String>,
    pub status: Option<String>,
}

impl From<Movie> for MovieDetails {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            media_type: MediaType::Movie,
            release_date: movie.release_date,
            cast: movie.cast,
            rating: movie.rating,
            summary: movie.summary,
            genres: movie.genres,
            runtime: movie.runtime,
            language: movie.language,
            poster_url: movie.poster_url,
            status: movie.status,
        }
    }
}

/// Detail projection of a TV show.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowDetails {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub first_air_date: NaiveDate,
    pub last_air_date: Option<NaiveDate>,
    pub cast: Vec<String>,
    pub rating: Option<f64>,
    pub rated: Option<String>,
    pub summary: String,
    pub genres: Vec<String>,
    pub runtime: Option<u32>,
    pub language: String,
    pub poster_url: Option<String>,
    pub status: Option<String>,
}

impl From<Show> for ShowDetails {
    fn from(show: Show) -> Self {
        Self {
            id: show.id,
            title: show.title,
            media_type: MediaType::Tv,
            first_air_date: show.first_air_date,
            last_air_date: show.last_air_date,
            cast: show.cast,
            rating: show.rating,
            rated: show.rated,
            summary: show.summary,
            genres: show.genres,
            runtime: show.runtime,
            language: show.language,
            poster_url: show.poster_url,
            status: show.status,
        }
    }
}

/// External links for a catalog record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaLinks {
    pub homepage: Option<String>,
    pub trailer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_url: Option<String>,
}

impl MediaLinks {
    pub fn imdb_url_for(imdb_id: Option<&str>) -> Option<String> {
        imdb_id
            .filter(|id| !id.is_empty())
            .map(|id| format!("https://www.imdb.com/title/{id}"))
    }
}

/// The fields of a catalog record copied into the trending cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub id: String,
    pub media_type: MediaType,
    pub title: String,
    pub banner_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub first_air_date: Option<NaiveDate>,
    pub last_air_date: Option<NaiveDate>,
    pub rating: Option<f64>,
    pub rated: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` items.
    pub fn page_count(total: u64) -> u32 {
        total.div_ceil(PAGE_SIZE as u64) as u32
    }
}

/// Catalog statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub movies: u64,
    pub shows: u64,
}

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
