use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;
use cinemaddict_model::{Comment, Emotion, Film, FilmId, FilmsModel, FilterType};

use crate::app::Page;
use crate::controllers::{FilmController, Mode};
use crate::dom::{Document, NodeId};
use crate::input::{Key, KeyEvent};
use crate::settings::Settings;

/// Drives a mounted page the way a user would: clicks, typing, key presses
/// and the passage of time.
pub struct TestPage {
    page: Page,
}

impl TestPage {
    pub fn new(films: Vec<Film>) -> Self {
        Self::with_settings(films, Settings::default())
    }

    pub fn with_settings(films: Vec<Film>, settings: Settings) -> Self {
        Self {
            page: Page::mount(settings, Rc::new(FilmsModel::with_films(films))),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn document(&self) -> &Rc<Document> {
        self.page.document()
    }

    pub fn films_model(&self) -> &Rc<FilmsModel> {
        self.page.films_model()
    }

    /// Canonical snapshot of a film
    pub fn film(&self, id: u32) -> Film {
        self.films_model()
            .film(FilmId::new(id))
            .unwrap_or_else(|| panic!("film {} is not in the model", id))
    }

    pub fn controller(&self, id: u32) -> FilmController {
        self.page
            .board()
            .controller(FilmId::new(id))
            .unwrap_or_else(|| panic!("film {} has no rendered card", id))
    }

    /// Card element for a film
    pub fn card(&self, id: u32) -> NodeId {
        self.controller(id)
            .card_element()
            .unwrap_or_else(|| panic!("film {} card is not rendered", id))
    }

    pub fn cards(&self) -> Vec<NodeId> {
        self.query_all(".film-card")
    }

    pub fn popup(&self) -> Option<NodeId> {
        self.query(".film-details")
    }

    pub fn query(&self, selector: &str) -> Option<NodeId> {
        self.document().query_selector(self.page.body(), selector)
    }

    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.document().query_selector_all(self.page.body(), selector)
    }

    pub fn text(&self, node: NodeId) -> String {
        self.document().text_content(node)
    }

    /// Click the part of a film's card matching `selector`
    pub fn click_card_part(&self, id: u32, selector: &str) {
        let card = self.card(id);
        let target = self
            .document()
            .query_selector(card, selector)
            .unwrap_or_else(|| panic!("card {} has no {}", id, selector));
        self.document().click(target);
    }

    pub fn open_popup(&self, id: u32) {
        self.click_card_part(id, ".film-card__poster");
    }

    /// Click the part of the open popup matching `selector`
    pub fn click_popup_part(&self, selector: &str) {
        let popup = self.popup().expect("no popup is open");
        let target = self
            .document()
            .query_selector(popup, selector)
            .unwrap_or_else(|| panic!("popup has no {}", selector));
        self.document().click(target);
    }

    pub fn type_comment(&self, text: &str) {
        let popup = self.popup().expect("no popup is open");
        let input = self
            .document()
            .query_selector(popup, ".film-details__comment-input")
            .expect("popup has no comment input");
        self.document().set_value(input, text);
    }

    pub fn select_emotion(&self, emotion: Emotion) {
        let popup = self.popup().expect("no popup is open");
        let input = self
            .document()
            .query_selector_all(popup, ".film-details__emoji-item")
            .into_iter()
            .find(|input| self.document().value(*input) == emotion.as_str())
            .expect("popup has no such emoji");
        self.document().click(input);
    }

    pub fn press(&self, key: KeyEvent) {
        self.document().key_down(key);
    }

    pub fn press_escape(&self) {
        self.press(KeyEvent::new(Key::Escape));
    }

    pub fn press_submit(&self) {
        self.press(KeyEvent::with_ctrl(Key::Enter));
    }

    pub fn click_filter(&self, filter: FilterType) {
        let item = self
            .query_all(".main-navigation__item")
            .into_iter()
            .find(|item| {
                self.document().attribute(*item, "data-filter-type").as_deref()
                    == Some(filter.as_str())
            })
            .expect("filter bar has no such item");
        self.document().click(item);
    }

    pub fn show_more(&self) {
        let button = self
            .query(".films-list__show-more")
            .expect("no show more button");
        self.document().click(button);
    }

    pub fn advance(&self, millis: u64) {
        self.page.ui().timers().advance(Duration::from_millis(millis));
    }

    /// Count shown next to a filter in the navigation bar
    pub fn filter_count(&self, filter: FilterType) -> Option<usize> {
        self.page
            .filter_controller()
            .items()
            .into_iter()
            .find(|item| item.filter == filter)
            .map(|item| item.count)
    }

    pub fn popup_comments_count(&self) -> Option<String> {
        let popup = self.popup()?;
        self.document()
            .query_selector(popup, ".film-details__comments-count")
            .map(|count| self.text(count))
    }

    pub fn assert_popup_open_for(&self, id: u32) {
        let popups = self.query_all(".film-details");
        assert_eq!(popups.len(), 1, "Expected exactly one popup, found {}", popups.len());
        assert_eq!(
            self.document().attribute(popups[0], "data-film-id"),
            Some(id.to_string()),
            "Popup belongs to another film"
        );
        assert_eq!(self.controller(id).mode(), Mode::Popup);
        assert_eq!(self.page.board().open_popup_owner(), Some(FilmId::new(id)));
        assert!(
            self.document().has_class(self.page.body(), "hide-overflow"),
            "Body should not scroll while a popup is open"
        );
        assert_eq!(
            self.document().document_listener_count(),
            1,
            "Exactly one key capture should be active"
        );
    }

    pub fn assert_no_popup(&self) {
        assert!(self.popup().is_none(), "Expected no popup");
        assert_eq!(self.page.board().open_popup_owner(), None);
        assert!(!self.document().has_class(self.page.body(), "hide-overflow"));
        assert_eq!(
            self.document().document_listener_count(),
            0,
            "Key capture should be released"
        );
    }
}

/// Builds a catalogue of `count` films with distinct dates and ratings
pub fn sample_films(count: u32) -> Vec<Film> {
    (1..=count)
        .map(|id| {
            let comments = (0..id % 3)
                .map(|n| {
                    Comment::new(
                        "Tim Macoveev",
                        chrono::DateTime::from_timestamp(1_577_836_800 + i64::from(n) * 3600, 0)
                            .unwrap_or_default(),
                        Emotion::ALL[n as usize % Emotion::ALL.len()],
                        "Interesting setting and a good cast",
                    )
                    .with_id(format!("{}-{}", id, n))
                })
                .collect();
            Film::new(id, &format!("Film {}", id))
                .poster(format!("./images/posters/film-{}.jpg", id))
                .description("A film about films.")
                .rating(f64::from(id % 10) + 0.5)
                .release_date(
                    NaiveDate::from_ymd_opt(1920 + id as i32, 1, 1).unwrap_or_default(),
                )
                .runtime(60 + id)
                .genres(["Drama"])
                .comments(comments)
        })
        .collect()
}
