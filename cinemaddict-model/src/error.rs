use thiserror::Error;

use crate::film::FilmId;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown emotion: {0}")]
    UnknownEmotion(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Unknown sort: {0}")]
    UnknownSort(String),

    #[error("Film not found: {0}")]
    FilmNotFound(FilmId),

    #[error("Invalid film {id}: {reason}")]
    InvalidFilm { id: FilmId, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
