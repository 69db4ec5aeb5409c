pub mod comment;
mod error;
pub mod film;
mod films_model;
pub mod filter;
mod macros;

pub use crate::comment::{Comment, CommentId, Emotion};
pub use crate::error::ModelError;
pub use crate::film::{Film, FilmId};
pub use crate::films_model::FilmsModel;
pub use crate::filter::{FilterType, SortType, films_by_filter, sort_films};
