//! Card and popup orchestration for a single film.
//!
//! A controller owns a working copy of its film. The card and the popup both
//! render from that copy; changes reach canonical state only through the
//! data-change callback. The popup is modal: while it is open the controller
//! holds the document's key capture, and every exit path releases it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use chrono::Utc;
use cinemaddict_model::{Comment, Film, FilmId};

use super::comment_controller::{CommentChange, CommentController};
use crate::components::{self, Component, FilmCardComponent, FilmPopupComponent, PopupControl};
use crate::context::UiContext;
use crate::dom::{KeyCapture, NodeId, RenderPosition};
use crate::input::KeyEvent;
use crate::models::CommentsModel;
use crate::utils::escape_html;

pub const SHAKE_ANIMATION_TIMEOUT: Duration = Duration::from_millis(600);
pub const SHAKE_CLASS: &str = "shake";
const HIDE_OVERFLOW_CLASS: &str = "hide-overflow";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Default,
    Popup,
}

/// `(controller, old, new)`: `new` is a full replacement snapshot for `old`
pub type DataChangeHandler = Rc<dyn Fn(&FilmController, &Film, &Film)>;
pub type ViewChangeHandler = Rc<dyn Fn(&FilmController)>;

struct PopupView {
    component: FilmPopupComponent,
    comment_controllers: Vec<CommentController>,
    key_capture: KeyCapture,
}

struct State {
    film: Option<Film>,
    mode: Mode,
    card: Option<FilmCardComponent>,
    popup: Option<PopupView>,
}

struct Shared {
    ui: UiContext,
    container: NodeId,
    on_data_change: DataChangeHandler,
    on_view_change: ViewChangeHandler,
    comments: CommentsModel,
    state: RefCell<State>,
}

/// Cheap handle; clones refer to the same controller.
#[derive(Clone)]
pub struct FilmController {
    shared: Rc<Shared>,
}

impl FilmController {
    pub fn new(
        ui: &UiContext,
        container: NodeId,
        on_data_change: DataChangeHandler,
        on_view_change: ViewChangeHandler,
    ) -> Self {
        let controller = Self {
            shared: Rc::new(Shared {
                ui: ui.clone(),
                container,
                on_data_change,
                on_view_change,
                comments: CommentsModel::new(),
                state: RefCell::new(State {
                    film: None,
                    mode: Mode::Default,
                    card: None,
                    popup: None,
                }),
            }),
        };

        let weak = Rc::downgrade(&controller.shared);
        controller.shared.comments.set_data_change_handler(move || {
            if let Some(shared) = weak.upgrade() {
                FilmController { shared }.refresh_comments_count();
            }
        });
        controller
    }

    pub fn mode(&self) -> Mode {
        self.shared.state.borrow().mode
    }

    pub fn film_id(&self) -> Option<FilmId> {
        self.shared.state.borrow().film.as_ref().map(|film| film.id)
    }

    /// Current working copy
    pub fn film(&self) -> Option<Film> {
        self.shared.state.borrow().film.clone()
    }

    pub fn card_element(&self) -> Option<NodeId> {
        self.shared
            .state
            .borrow()
            .card
            .as_ref()
            .and_then(|card| card.rendered_element())
    }

    pub fn popup_element(&self) -> Option<NodeId> {
        self.shared
            .state
            .borrow()
            .popup
            .as_ref()
            .and_then(|popup| popup.component.rendered_element())
    }

    pub fn ptr_eq(&self, other: &FilmController) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Show `film`: reseed the working copy and comments, then swap in a fresh
    /// card (or insert the first one). An open popup stays open and its
    /// controls follow the new snapshot.
    ///
    /// Card toggles start from the working copy, so toggles made in an open
    /// popup are committed along with them rather than lost.
    pub fn render(&self, film: &Film) {
        let document = self.shared.ui.document();
        let card = FilmCardComponent::new(document, film);
        card.set_open_handler(self.callback(|controller| controller.open_popup()));
        card.set_watchlist_handler(self.callback(|controller| {
            controller.commit_card_toggle(Film::toggle_watchlist)
        }));
        card.set_watched_handler(self.callback(|controller| {
            controller.commit_card_toggle(|film| film.toggle_watched(Utc::now()))
        }));
        card.set_favorite_handler(self.callback(|controller| {
            controller.commit_card_toggle(Film::toggle_favorite)
        }));

        let old_card = {
            let mut state = self.shared.state.borrow_mut();
            state.film = Some(film.clone());
            state.card.take()
        };
        self.shared.comments.set_comments(film.comments.clone());

        match old_card {
            Some(old_card) => components::replace(&card, &old_card),
            None => components::render(self.shared.container, &card, RenderPosition::BeforeEnd),
        }
        let mut state = self.shared.state.borrow_mut();
        state.card = Some(card);
        if let Some(popup) = state.popup.as_ref() {
            let controls = [
                (PopupControl::Watchlist, film.is_added_to_watchlist),
                (PopupControl::Watched, film.is_marked_as_watched),
                (PopupControl::Favorite, film.is_favorite),
            ];
            for (control, checked) in controls {
                popup.component.set_control_checked(control, checked);
            }
        }
    }

    /// Close the popup if it is open.
    pub fn set_default_view(&self) {
        self.close_popup();
    }

    /// Remove the card and any popup without committing the working copy.
    pub fn destroy(&self) {
        let (card, popup) = {
            let mut state = self.shared.state.borrow_mut();
            state.mode = Mode::Default;
            (state.card.take(), state.popup.take())
        };
        if let Some(card) = card {
            components::remove(&card);
        }
        if let Some(popup) = popup {
            self.teardown_popup(popup);
        }
        tracing::debug!("Destroyed film controller {:?}", self.film_id());
    }

    /// Flash the card to signal a rejected update.
    pub fn shake(&self) {
        let Some(element) = self.card_element() else {
            return;
        };
        let document = self.shared.ui.document();
        document.add_class(element, SHAKE_CLASS);

        let document = Rc::downgrade(document);
        self.shared
            .ui
            .timers()
            .set_timeout(SHAKE_ANIMATION_TIMEOUT, move || {
                if let Some(document) = document.upgrade() {
                    document.remove_class(element, SHAKE_CLASS);
                }
            });
    }

    fn callback<F>(&self, action: F) -> Rc<dyn Fn()>
    where
        F: Fn(&FilmController) + 'static,
    {
        let shared: Weak<Shared> = Rc::downgrade(&self.shared);
        Rc::new(move || {
            if let Some(shared) = shared.upgrade() {
                action(&FilmController { shared });
            }
        })
    }

    fn notify_data_change(&self, old: &Film, new: &Film) {
        let handler = self.shared.on_data_change.clone();
        handler(self, old, new);
    }

    fn commit_card_toggle<F>(&self, toggle: F)
    where
        F: Fn(&mut Film),
    {
        let Some(old) = self.film() else {
            return;
        };
        let mut new = old.clone();
        toggle(&mut new);
        self.notify_data_change(&old, &new);
    }

    fn open_popup(&self) {
        if self.mode() == Mode::Popup {
            return;
        }
        let on_view_change = self.shared.on_view_change.clone();
        on_view_change(self);

        let Some(film) = self.film() else {
            return;
        };
        let document = self.shared.ui.document();
        let popup = FilmPopupComponent::new(document, &film);
        popup.set_close_handler(self.callback(|controller| controller.close_popup()));
        for control in [PopupControl::Watchlist, PopupControl::Watched, PopupControl::Favorite] {
            popup.set_control_handler(
                control,
                self.callback(move |controller| controller.toggle_popup_control(control)),
            );
        }
        popup.enable_emoji_picker();

        let body = document.body();
        match document.query_selector(body, ".footer") {
            Some(footer) => components::render(footer, &popup, RenderPosition::AfterEnd),
            None => components::render(body, &popup, RenderPosition::BeforeEnd),
        }
        document.add_class(body, HIDE_OVERFLOW_CLASS);
        let comment_controllers = self.render_comments(popup.element());

        let weak = Rc::downgrade(&self.shared);
        let key_capture = document.capture_keys(move |key| {
            if let Some(shared) = weak.upgrade() {
                FilmController { shared }.handle_key(key);
            }
        });

        let mut state = self.shared.state.borrow_mut();
        state.mode = Mode::Popup;
        state.popup = Some(PopupView {
            component: popup,
            comment_controllers,
            key_capture,
        });
        tracing::debug!("Opened popup for film {}", film.id);
    }

    /// Leave popup mode and commit the working copy. No-op in default mode.
    fn close_popup(&self) {
        let (popup, film) = {
            let mut state = self.shared.state.borrow_mut();
            if state.mode != Mode::Popup {
                return;
            }
            state.mode = Mode::Default;
            (state.popup.take(), state.film.clone())
        };
        if let Some(popup) = popup {
            self.teardown_popup(popup);
        }
        if let Some(film) = film {
            tracing::debug!("Closed popup for film {}", film.id);
            let committed = film.clone();
            self.notify_data_change(&film, &committed);
        }
    }

    fn teardown_popup(&self, popup: PopupView) {
        let PopupView {
            component,
            comment_controllers,
            key_capture,
        } = popup;
        drop(key_capture);
        for mut controller in comment_controllers {
            controller.destroy();
        }
        components::remove(&component);
        let document = self.shared.ui.document();
        document.remove_class(document.body(), HIDE_OVERFLOW_CLASS);
    }

    fn handle_key(&self, key: &KeyEvent) {
        if key.is_escape() {
            self.close_popup();
        } else if key.is_submit() {
            self.submit_comment();
        }
    }

    fn toggle_popup_control(&self, control: PopupControl) {
        let mut state = self.shared.state.borrow_mut();
        let State { film, popup, .. } = &mut *state;
        let Some(film) = film.as_mut() else {
            return;
        };
        let checked = match control {
            PopupControl::Watchlist => {
                film.toggle_watchlist();
                film.is_added_to_watchlist
            }
            PopupControl::Watched => {
                film.toggle_watched(Utc::now());
                film.is_marked_as_watched
            }
            PopupControl::Favorite => {
                film.toggle_favorite();
                film.is_favorite
            }
        };
        if let Some(popup) = popup.as_ref() {
            popup.component.set_control_checked(control, checked);
        }
    }

    fn render_comments(&self, popup: NodeId) -> Vec<CommentController> {
        let document = self.shared.ui.document();
        let weak = Rc::downgrade(&self.shared);
        let on_change: Rc<dyn Fn(CommentChange)> = Rc::new(move |change: CommentChange| {
            if let Some(shared) = weak.upgrade() {
                FilmController { shared }.on_comments_data_change(change);
            }
        });
        self.shared
            .comments
            .comments()
            .iter()
            .map(|comment| {
                let mut controller = CommentController::new(document, popup, on_change.clone());
                controller.render(comment);
                controller
            })
            .collect()
    }

    fn update_comments(&self) {
        let (element, old) = {
            let mut state = self.shared.state.borrow_mut();
            let Some(popup) = state.popup.as_mut() else {
                return;
            };
            (
                popup.component.element(),
                std::mem::take(&mut popup.comment_controllers),
            )
        };
        for mut controller in old {
            controller.destroy();
        }
        let controllers = self.render_comments(element);
        if let Some(popup) = self.shared.state.borrow_mut().popup.as_mut() {
            popup.comment_controllers = controllers;
        }
    }

    fn refresh_comments_count(&self) {
        let count = self.shared.comments.len();
        if let Some(popup) = self.shared.state.borrow().popup.as_ref() {
            popup.component.update_comments_count(count);
        }
    }

    /// Apply a comment change; on success rebuild the rows and push the new
    /// comment collection upward.
    fn on_comments_data_change(&self, change: CommentChange) -> bool {
        let changed = match &change {
            CommentChange::Delete(comment) => self.shared.comments.remove_comment(&comment.id),
            CommentChange::Add(comment) => self.shared.comments.add_comment(comment.clone()),
        };
        if !changed {
            tracing::debug!("Ignored comment change {:?}", change);
            return false;
        }

        self.update_comments();
        if let Some(old) = self.film() {
            let new = old.with_comments(self.shared.comments.comments());
            self.notify_data_change(&old, &new);
        }
        true
    }

    /// Ctrl/Cmd+Enter: needs a message and an emotion, otherwise nothing
    /// happens and the input is kept.
    fn submit_comment(&self) {
        let draft = self.shared.state.borrow().popup.as_ref().map(|popup| {
            (
                popup.component.current_comment_text(),
                popup.component.current_emotion(),
            )
        });
        let Some((text, Some(emotion))) = draft else {
            return;
        };
        let message = escape_html(text.trim());
        if message.is_empty() {
            return;
        }

        let comment = Comment::new(&self.shared.ui.settings().author, Utc::now(), emotion, &message);
        if self.on_comments_data_change(CommentChange::Add(comment)) {
            if let Some(popup) = self.shared.state.borrow().popup.as_ref() {
                popup.component.reset_form();
            }
        }
    }
}

impl std::fmt::Debug for FilmController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("FilmController")
            .field("film", &state.film.as_ref().map(|film| film.id))
            .field("mode", &state.mode)
            .field("comments", &self.shared.comments)
            .finish()
    }
}
