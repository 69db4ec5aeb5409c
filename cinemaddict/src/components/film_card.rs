use std::rc::Rc;

use cinemaddict_model::Film;

use super::{Component, ComponentBase};
use crate::dom::Document;
use crate::utils::{escape_html, format_runtime, pluralize, truncate_description};

const ACTIVE_CONTROL_CLASS: &str = "film-card__controls-item--active";

/// Parts of the card that open the detail popup
pub const OPEN_POPUP_SELECTORS: [&str; 3] = [
    ".film-card__poster",
    ".film-card__title",
    ".film-card__comments",
];

pub struct FilmCardComponent {
    base: ComponentBase,
    film: Film,
}

impl FilmCardComponent {
    pub fn new(document: &Rc<Document>, film: &Film) -> Self {
        Self {
            base: ComponentBase::new(document),
            film: film.clone(),
        }
    }

    pub fn set_open_handler(&self, handler: Rc<dyn Fn()>) {
        for selector in OPEN_POPUP_SELECTORS {
            self.on_click(selector, handler.clone());
        }
    }

    pub fn set_watchlist_handler(&self, handler: Rc<dyn Fn()>) {
        self.on_click(".film-card__controls-item--add-to-watchlist", handler);
    }

    pub fn set_watched_handler(&self, handler: Rc<dyn Fn()>) {
        self.on_click(".film-card__controls-item--mark-as-watched", handler);
    }

    pub fn set_favorite_handler(&self, handler: Rc<dyn Fn()>) {
        self.on_click(".film-card__controls-item--favorite", handler);
    }
}

fn control_markup(modifier: &str, label: &str, is_active: bool) -> String {
    let active = if is_active { ACTIVE_CONTROL_CLASS } else { "" };
    format!(
        r#"<button class="film-card__controls-item button film-card__controls-item--{} {}">{}</button>"#,
        modifier, active, label
    )
}

impl Component for FilmCardComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn template(&self) -> String {
        let film = &self.film;
        let name = escape_html(&film.name);
        format!(
            r#"<article class="film-card" data-film-id="{id}">
              <h3 class="film-card__title">{name}</h3>
              <p class="film-card__rating">{rating}</p>
              <p class="film-card__info">
                <span class="film-card__year">{year}</span>
                <span class="film-card__duration">{duration}</span>
                <span class="film-card__genre">{genre}</span>
              </p>
              <img src="{poster}" alt="{name}" class="film-card__poster">
              <p class="film-card__description">{description}</p>
              <a class="film-card__comments">{comments}</a>
              <form class="film-card__controls">
                {watchlist}
                {watched}
                {favorite}
              </form>
            </article>"#,
            id = film.id,
            name = name,
            rating = film.formatted_rating(),
            year = film.release_year(),
            duration = format_runtime(film.runtime),
            genre = escape_html(film.main_genre().unwrap_or_default()),
            poster = escape_html(&film.poster),
            description = escape_html(&truncate_description(&film.description)),
            comments = pluralize(film.comments.len(), "comment", "comments"),
            watchlist = control_markup(
                "add-to-watchlist",
                "Add to watchlist",
                film.is_added_to_watchlist
            ),
            watched = control_markup("mark-as-watched", "Mark as watched", film.is_marked_as_watched),
            favorite = control_markup("favorite", "Mark as favorite", film.is_favorite),
        )
    }
}
