use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::error::ModelError;
use crate::macros::setter;

pub const MAX_RATING: f64 = 10.0;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilmId(u32);

impl FilmId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> u32 {
        self.0
    }
}

impl From<u32> for FilmId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for FilmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable film snapshot.
///
/// Snapshots are never edited while another view holds them: callers clone,
/// change the clone and hand the full replacement to whoever owns canonical
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: FilmId,
    pub name: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub poster: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rating: f64,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub runtime: u32,
    pub genres: Vec<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub writers: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub age_rating: Option<u8>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub is_added_to_watchlist: bool,
    #[serde(default)]
    pub is_marked_as_watched: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub watching_date: Option<DateTime<Utc>>,
}

impl Film {
    pub fn new<T>(id: T, name: &str) -> Self
    where
        T: Into<FilmId>,
    {
        Self {
            id: id.into(),
            name: name.to_string(),
            original_name: None,
            poster: String::new(),
            description: String::new(),
            rating: 0.0,
            release_date: NaiveDate::default(),
            runtime: 0,
            genres: Vec::new(),
            director: None,
            writers: Vec::new(),
            actors: Vec::new(),
            country: None,
            age_rating: None,
            comments: Vec::new(),
            is_added_to_watchlist: false,
            is_marked_as_watched: false,
            is_favorite: false,
            watching_date: None,
        }
    }

    setter!(poster: String);
    setter!(description: String);
    setter!(rating: f64);
    setter!(release_date: NaiveDate);
    setter!(opt original_name: String);
    setter!(opt director: String);
    setter!(opt country: String);

    pub fn runtime(mut self, minutes: u32) -> Self {
        self.runtime = minutes;
        self
    }

    pub fn genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    /// Films are the same entity when their ids match, whatever their state.
    pub fn is_same(&self, other: &Film) -> bool {
        self.id == other.id
    }

    /// Returns a clone carrying a replacement comment collection.
    pub fn with_comments(&self, comments: Vec<Comment>) -> Film {
        Film {
            comments,
            ..self.clone()
        }
    }

    pub fn toggle_watchlist(&mut self) {
        self.is_added_to_watchlist = !self.is_added_to_watchlist;
    }

    /// Flips the watched flag, stamping `watching_date` only when it turns on.
    pub fn toggle_watched(&mut self, now: DateTime<Utc>) {
        self.is_marked_as_watched = !self.is_marked_as_watched;
        if self.is_marked_as_watched {
            self.watching_date = Some(now);
        }
    }

    pub fn toggle_favorite(&mut self) {
        self.is_favorite = !self.is_favorite;
    }

    pub fn release_year(&self) -> i32 {
        self.release_date.year()
    }

    pub fn formatted_rating(&self) -> String {
        format!("{:.1}", self.rating)
    }

    pub fn main_genre(&self) -> Option<&str> {
        self.genres.first().map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.genres.is_empty() {
            return Err(ModelError::InvalidFilm {
                id: self.id,
                reason: "at least one genre is required".to_string(),
            });
        }
        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(ModelError::InvalidFilm {
                id: self.id,
                reason: format!("rating {} is outside 0-{}", self.rating, MAX_RATING),
            });
        }
        Ok(())
    }
}
