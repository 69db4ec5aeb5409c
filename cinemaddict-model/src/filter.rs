use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ModelError;
use crate::film::Film;

/// Navigation filters, in the order the filter bar shows them.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    All,
    Watchlist,
    History,
    Favorites,
}

impl FilterType {
    pub const ALL: [FilterType; 4] = [
        FilterType::All,
        FilterType::Watchlist,
        FilterType::History,
        FilterType::Favorites,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Watchlist => "watchlist",
            Self::History => "history",
            Self::Favorites => "favorites",
        }
    }

    /// Display title for the filter bar
    pub fn title(&self) -> &'static str {
        match self {
            Self::All => "All movies",
            Self::Watchlist => "Watchlist",
            Self::History => "History",
            Self::Favorites => "Favorites",
        }
    }

    pub fn matches(&self, film: &Film) -> bool {
        match self {
            Self::All => true,
            Self::Watchlist => film.is_added_to_watchlist,
            Self::History => film.is_marked_as_watched,
            Self::Favorites => film.is_favorite,
        }
    }
}

impl FromStr for FilterType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| ModelError::UnknownFilter(s.to_string()))
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    #[default]
    Default,
    Date,
    Rating,
}

impl SortType {
    pub const ALL: [SortType; 3] = [SortType::Default, SortType::Date, SortType::Rating];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Date => "date",
            Self::Rating => "rating",
        }
    }
}

impl FromStr for SortType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| ModelError::UnknownSort(s.to_string()))
    }
}

/// Films matching `filter`, in their original order.
pub fn films_by_filter(films: &[Film], filter: FilterType) -> Vec<&Film> {
    films.iter().filter(|film| filter.matches(film)).collect()
}

/// Orders films for display. `Default` keeps catalogue order.
pub fn sort_films(films: Vec<Film>, sort: SortType) -> Vec<Film> {
    match sort {
        SortType::Default => films,
        SortType::Date => films
            .into_iter()
            .sorted_by(|a, b| b.release_date.cmp(&a.release_date))
            .collect(),
        SortType::Rating => films
            .into_iter()
            .sorted_by(|a, b| b.rating.total_cmp(&a.rating))
            .collect(),
    }
}
