use std::rc::Rc;

use cinemaddict_model::{Emotion, Film};
use itertools::Itertools;

use super::{weak_document, Component, ComponentBase};
use crate::dom::{Document, EventKind, NodeId, RenderPosition};
use crate::utils::{escape_html, format_release_date, format_runtime};

const EMOJI_INPUT_SELECTOR: &str = ".film-details__emoji-item";
const EMOJI_PREVIEW_SELECTOR: &str = ".film-details__add-emoji-label";

/// The three flag toggles in the popup's control strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupControl {
    Watchlist,
    Watched,
    Favorite,
}

impl PopupControl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Watchlist => "watchlist",
            Self::Watched => "watched",
            Self::Favorite => "favorite",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Watchlist => "Add to watchlist",
            Self::Watched => "Already watched",
            Self::Favorite => "Add to favorites",
        }
    }

    fn is_set(&self, film: &Film) -> bool {
        match self {
            Self::Watchlist => film.is_added_to_watchlist,
            Self::Watched => film.is_marked_as_watched,
            Self::Favorite => film.is_favorite,
        }
    }
}

pub struct FilmPopupComponent {
    base: ComponentBase,
    film: Film,
}

impl FilmPopupComponent {
    pub fn new(document: &Rc<Document>, film: &Film) -> Self {
        Self {
            base: ComponentBase::new(document),
            film: film.clone(),
        }
    }

    pub fn set_close_handler(&self, handler: Rc<dyn Fn()>) {
        self.on_click(".film-details__close-btn", handler);
    }

    pub fn set_control_handler(&self, control: PopupControl, handler: Rc<dyn Fn()>) {
        let selector = format!(".film-details__control-label--{}", control.as_str());
        self.on_click(&selector, handler);
    }

    /// Clicking an emoji checks it and shows it in the preview slot.
    pub fn enable_emoji_picker(&self) {
        let element = self.element();
        for input in self.document().query_selector_all(element, EMOJI_INPUT_SELECTOR) {
            let document = weak_document(self);
            self.document()
                .add_event_listener(input, EventKind::Click, move |_| {
                    if let Some(document) = document.upgrade() {
                        select_emoji(&document, element, input);
                    }
                });
        }
    }

    /// Comments list container the comment rows render into
    pub fn comments_list(&self) -> Option<NodeId> {
        self.document()
            .query_selector(self.element(), ".film-details__comments-list")
    }

    /// Targeted update of the counter text, leaving the rest untouched.
    pub fn update_comments_count(&self, count: usize) {
        let element = self.element();
        if let Some(counter) = self
            .document()
            .query_selector(element, ".film-details__comments-count")
        {
            self.document().set_text_content(counter, &count.to_string());
        }
    }

    fn control_input(&self, control: PopupControl) -> Option<NodeId> {
        let document = self.document();
        document
            .query_selector_all(self.element(), ".film-details__control-input")
            .into_iter()
            .find(|input| document.attribute(*input, "id").as_deref() == Some(control.as_str()))
    }

    pub fn set_control_checked(&self, control: PopupControl, checked: bool) {
        if let Some(input) = self.control_input(control) {
            self.document().set_checked(input, checked);
        }
    }

    pub fn is_control_checked(&self, control: PopupControl) -> bool {
        self.control_input(control)
            .is_some_and(|input| self.document().is_checked(input))
    }

    pub fn current_comment_text(&self) -> String {
        self.document()
            .query_selector(self.element(), ".film-details__comment-input")
            .map(|input| self.document().value(input))
            .unwrap_or_default()
    }

    pub fn current_emotion(&self) -> Option<Emotion> {
        let document = self.document();
        document
            .query_selector_all(self.element(), EMOJI_INPUT_SELECTOR)
            .into_iter()
            .find(|input| document.is_checked(*input))
            .and_then(|input| document.value(input).parse().ok())
    }

    /// Clear the message, the emoji selection and its preview.
    pub fn reset_form(&self) {
        let document = self.document();
        let element = self.element();
        if let Some(input) = document.query_selector(element, ".film-details__comment-input") {
            document.set_value(input, "");
        }
        for emoji in document.query_selector_all(element, EMOJI_INPUT_SELECTOR) {
            document.set_checked(emoji, false);
        }
        if let Some(preview) = document.query_selector(element, EMOJI_PREVIEW_SELECTOR) {
            document.set_text_content(preview, "");
        }
    }

    fn details_markup(&self) -> String {
        let film = &self.film;
        let genre_title = if film.genres.len() > 1 { "Genres" } else { "Genre" };
        let genres = film
            .genres
            .iter()
            .map(|genre| format!(r#"<span class="film-details__genre">{}</span>"#, escape_html(genre)))
            .join("");
        let rows = [
            ("Director", film.director.clone().unwrap_or_default()),
            ("Writers", film.writers.join(", ")),
            ("Actors", film.actors.join(", ")),
            ("Release Date", format_release_date(film.release_date)),
            ("Runtime", format_runtime(film.runtime)),
            ("Country", film.country.clone().unwrap_or_default()),
        ];
        let rows = rows
            .iter()
            .map(|(term, value)| {
                format!(
                    r#"<tr class="film-details__row"><td class="film-details__term">{}</td><td class="film-details__cell">{}</td></tr>"#,
                    term,
                    escape_html(value)
                )
            })
            .join("");
        format!(
            r#"{rows}<tr class="film-details__row"><td class="film-details__term">{genre_title}</td><td class="film-details__cell">{genres}</td></tr>"#
        )
    }

    fn controls_markup(&self) -> String {
        [PopupControl::Watchlist, PopupControl::Watched, PopupControl::Favorite]
            .iter()
            .map(|control| {
                let name = control.as_str();
                format!(
                    r#"<input type="checkbox" class="film-details__control-input visually-hidden" id="{name}" name="{name}" {checked}>
                    <label for="{name}" class="film-details__control-label film-details__control-label--{name}">{label}</label>"#,
                    name = name,
                    checked = if control.is_set(&self.film) { "checked" } else { "" },
                    label = control.label(),
                )
            })
            .join("")
    }

    fn emoji_markup() -> String {
        Emotion::ALL
            .iter()
            .map(|emotion| {
                format!(
                    r#"<input class="film-details__emoji-item visually-hidden" name="comment-emoji" type="radio" id="emoji-{name}" value="{name}">
                    <label class="film-details__emoji-label" for="emoji-{name}"><img src="{image}" width="30" height="30" alt="emoji"></label>"#,
                    name = emotion.as_str(),
                    image = emotion.image(),
                )
            })
            .join("")
    }
}

fn select_emoji(document: &Document, popup: NodeId, input: NodeId) {
    document.set_checked(input, true);
    let Ok(emotion) = document.value(input).parse::<Emotion>() else {
        return;
    };
    let Some(preview) = document.query_selector(popup, EMOJI_PREVIEW_SELECTOR) else {
        return;
    };
    document.set_text_content(preview, "");
    let image = document.create_element(&format!(
        r#"<img src="{}" width="55" height="55" alt="emoji-{}">"#,
        emotion.image(),
        emotion.as_str()
    ));
    document.insert(preview, image, RenderPosition::BeforeEnd);
}

impl Component for FilmPopupComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn template(&self) -> String {
        let film = &self.film;
        let name = escape_html(&film.name);
        let original_name = escape_html(film.original_name.as_deref().unwrap_or(&film.name));
        let age = film
            .age_rating
            .map(|age| format!("{}+", age))
            .unwrap_or_default();
        format!(
            r#"<section class="film-details" data-film-id="{id}">
              <form class="film-details__inner" action="" method="get">
                <div class="film-details__top-container">
                  <div class="film-details__close">
                    <button class="film-details__close-btn" type="button">close</button>
                  </div>
                  <div class="film-details__info-wrap">
                    <div class="film-details__poster">
                      <img class="film-details__poster-img" src="{poster}" alt="">
                      <p class="film-details__age">{age}</p>
                    </div>
                    <div class="film-details__info">
                      <div class="film-details__info-head">
                        <div class="film-details__title-wrap">
                          <h3 class="film-details__title">{name}</h3>
                          <p class="film-details__title-original">Original: {original_name}</p>
                        </div>
                        <div class="film-details__rating">
                          <p class="film-details__total-rating">{rating}</p>
                        </div>
                      </div>
                      <table class="film-details__table">{details}</table>
                      <p class="film-details__film-description">{description}</p>
                    </div>
                  </div>
                  <section class="film-details__controls">{controls}</section>
                </div>
                <div class="film-details__bottom-container">
                  <section class="film-details__comments-wrap">
                    <h3 class="film-details__comments-title">Comments <span class="film-details__comments-count">{count}</span></h3>
                    <ul class="film-details__comments-list"></ul>
                    <div class="film-details__new-comment">
                      <div class="film-details__add-emoji-label"></div>
                      <label class="film-details__comment-label">
                        <textarea class="film-details__comment-input" placeholder="Select reaction below and write comment here" name="comment"></textarea>
                      </label>
                      <div class="film-details__emoji-list">{emoji}</div>
                    </div>
                  </section>
                </div>
              </form>
            </section>"#,
            id = film.id,
            poster = escape_html(&film.poster),
            age = age,
            name = name,
            original_name = original_name,
            rating = film.formatted_rating(),
            details = self.details_markup(),
            description = escape_html(&film.description),
            controls = self.controls_markup(),
            count = film.comments.len(),
            emoji = Self::emoji_markup(),
        )
    }
}
