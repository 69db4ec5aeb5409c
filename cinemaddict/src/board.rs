//! The film list orchestrator.
//!
//! Owns one [`FilmController`] per rendered card, merges their snapshots into
//! the films model and enforces that at most one popup is open. The popup
//! owner is tracked explicitly: before a controller opens its popup the board
//! closes the current owner's popup and records the requester as the new owner.
//!
//! Every model change re-syncs the card list with the filtered, sorted films,
//! keeping the number of cards on screen.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use cinemaddict_model::{sort_films, Film, FilmId, FilmsModel, SortType};

use crate::components::{
    self, FilmsListComponent, LoadMoreButtonComponent, NoFilmsComponent, SortComponent,
};
use crate::context::UiContext;
use crate::controllers::{DataChangeHandler, FilmController, Mode, ViewChangeHandler};
use crate::dom::{NodeId, RenderPosition};

#[derive(Default)]
struct BoardState {
    sort: SortType,
    controllers: Vec<FilmController>,
    popup_owner: Option<FilmId>,
    sort_component: Option<SortComponent>,
    films_list: Option<FilmsListComponent>,
    no_films: Option<NoFilmsComponent>,
    load_more: Option<LoadMoreButtonComponent>,
}

struct Shared {
    ui: UiContext,
    container: NodeId,
    films_model: Rc<FilmsModel>,
    on_data_change: DataChangeHandler,
    on_view_change: ViewChangeHandler,
    state: RefCell<BoardState>,
}

#[derive(Clone)]
pub struct Board {
    shared: Rc<Shared>,
}

impl Board {
    pub fn new(ui: &UiContext, container: NodeId, films_model: Rc<FilmsModel>) -> Self {
        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let data_weak = weak.clone();
            let view_weak = weak.clone();
            let on_data_change: DataChangeHandler =
                Rc::new(move |controller: &FilmController, old: &Film, new: &Film| {
                    if let Some(board) = Self::upgrade(&data_weak) {
                        board.on_data_change(controller, old, new);
                    }
                });
            let on_view_change: ViewChangeHandler = Rc::new(move |controller: &FilmController| {
                if let Some(board) = Self::upgrade(&view_weak) {
                    board.on_view_change(controller);
                }
            });
            Shared {
                ui: ui.clone(),
                container,
                films_model,
                on_data_change,
                on_view_change,
                state: RefCell::new(BoardState::default()),
            }
        });

        let weak = Rc::downgrade(&shared);
        shared.films_model.set_filter_change_handler(move || {
            if let Some(board) = Self::upgrade(&weak) {
                board.reset_list();
            }
        });
        let weak = Rc::downgrade(&shared);
        shared.films_model.set_data_change_handler(move || {
            if let Some(board) = Self::upgrade(&weak) {
                board.sync_list();
            }
        });
        Self { shared }
    }

    fn upgrade(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    fn cards_per_page(&self) -> usize {
        self.shared.ui.settings().cards_per_page.max(1)
    }

    pub fn sort(&self) -> SortType {
        self.shared.state.borrow().sort
    }

    /// Controllers for the cards currently on screen, in display order
    pub fn controllers(&self) -> Vec<FilmController> {
        self.shared.state.borrow().controllers.clone()
    }

    pub fn controller(&self, id: FilmId) -> Option<FilmController> {
        self.shared
            .state
            .borrow()
            .controllers
            .iter()
            .find(|controller| controller.film_id() == Some(id))
            .cloned()
    }

    pub fn has_more(&self) -> bool {
        self.shared.state.borrow().load_more.is_some()
    }

    /// Film whose popup is open, if any
    pub fn open_popup_owner(&self) -> Option<FilmId> {
        let owner = self.shared.state.borrow().popup_owner?;
        self.controller(owner)
            .filter(|controller| controller.mode() == Mode::Popup)
            .map(|_| owner)
    }

    /// Mount the sort bar and the films list, then show the first page.
    /// Rendering again rebuilds the list from the model.
    pub fn render(&self) {
        if self.shared.state.borrow().films_list.is_some() {
            self.reset_list();
            return;
        }
        self.render_sort();

        let document = self.shared.ui.document();
        let films_list = FilmsListComponent::new(document);
        components::render(self.shared.container, &films_list, RenderPosition::BeforeEnd);
        self.shared.state.borrow_mut().films_list = Some(films_list);

        self.render_list_content();
    }

    /// Reveal the next page of cards: the first films in list order that have
    /// no card yet.
    pub fn show_more(&self) {
        let films = self.sorted_films();
        let rendered: HashSet<FilmId> = self
            .shared
            .state
            .borrow()
            .controllers
            .iter()
            .filter_map(FilmController::film_id)
            .collect();
        let next: Vec<Film> = films
            .iter()
            .filter(|film| !rendered.contains(&film.id))
            .take(self.cards_per_page())
            .cloned()
            .collect();
        self.render_cards(&next);

        if rendered.len() + next.len() >= films.len() {
            let load_more = self.shared.state.borrow_mut().load_more.take();
            if let Some(load_more) = load_more {
                components::remove(&load_more);
            }
        }
    }

    pub fn set_sort(&self, sort: SortType) {
        if self.sort() == sort {
            return;
        }
        tracing::info!("Sort selected: {}", sort.as_str());
        self.shared.state.borrow_mut().sort = sort;
        self.render_sort();
        self.reset_list();
    }

    /// Merge a controller's snapshot into the model. A rejected update leaves
    /// the card as it is and shakes it.
    pub fn on_data_change(&self, controller: &FilmController, old: &Film, new: &Film) {
        if let Err(err) = self.shared.films_model.update_film(new.clone()) {
            tracing::warn!("Update of film {} rejected: {}", old.id, err);
            controller.shake();
            return;
        }
        // The model change already re-rendered default-mode cards whose film
        // changed; a popup commit or a change made from an open popup still
        // needs its card refreshed.
        let refresh = controller.mode() == Mode::Popup || old == new;
        if refresh && self.is_rendered(controller) {
            if let Some(film) = self.shared.films_model.film(new.id) {
                controller.render(&film);
            }
        }
    }

    /// Close the current owner's popup before `requester` opens its own.
    pub fn on_view_change(&self, requester: &FilmController) {
        let owner = {
            let state = self.shared.state.borrow();
            state.popup_owner.and_then(|owner| {
                state
                    .controllers
                    .iter()
                    .find(|controller| {
                        controller.film_id() == Some(owner) && !controller.ptr_eq(requester)
                    })
                    .cloned()
            })
        };
        if let Some(owner) = owner {
            owner.set_default_view();
        }
        self.shared.state.borrow_mut().popup_owner = requester.film_id();
    }

    fn is_rendered(&self, controller: &FilmController) -> bool {
        self.shared
            .state
            .borrow()
            .controllers
            .iter()
            .any(|rendered| rendered.ptr_eq(controller))
    }

    fn sorted_films(&self) -> Vec<Film> {
        sort_films(self.shared.films_model.filtered_films(), self.sort())
    }

    fn list_nodes(&self) -> Option<(NodeId, NodeId)> {
        let state = self.shared.state.borrow();
        let films_list = state.films_list.as_ref()?;
        match (films_list.list(), films_list.cards_container()) {
            (Some(list), Some(cards)) => Some((list, cards)),
            _ => {
                tracing::error!("Films list markup is missing its containers");
                None
            }
        }
    }

    fn render_sort(&self) {
        let document = self.shared.ui.document();
        let component = SortComponent::new(document, self.sort());
        let weak = Rc::downgrade(&self.shared);
        component.set_sort_change_handler(Rc::new(move |sort: SortType| {
            if let Some(board) = Self::upgrade(&weak) {
                board.set_sort(sort);
            }
        }));

        let old = self.shared.state.borrow_mut().sort_component.take();
        match old {
            Some(old) => components::replace(&component, &old),
            None => components::render(self.shared.container, &component, RenderPosition::BeforeEnd),
        }
        self.shared.state.borrow_mut().sort_component = Some(component);
    }

    fn render_list_content(&self) {
        let Some((list, _)) = self.list_nodes() else {
            return;
        };
        let total = self.sorted_films().len();
        if total > 0 {
            self.show_more();
        }
        let shown = self.shared.state.borrow().controllers.len();
        self.update_list_extras(list, total == 0, shown < total);
    }

    /// Show the empty message and the show-more button only when they apply.
    fn update_list_extras(&self, list: NodeId, empty: bool, has_more: bool) {
        let document = self.shared.ui.document();

        let no_films = self.shared.state.borrow_mut().no_films.take();
        match (empty, no_films) {
            (true, Some(no_films)) => self.shared.state.borrow_mut().no_films = Some(no_films),
            (true, None) => {
                let no_films = NoFilmsComponent::new(document);
                components::render(list, &no_films, RenderPosition::AfterBegin);
                self.shared.state.borrow_mut().no_films = Some(no_films);
            }
            (false, Some(no_films)) => components::remove(&no_films),
            (false, None) => {}
        }

        let load_more = self.shared.state.borrow_mut().load_more.take();
        match (has_more, load_more) {
            (true, Some(load_more)) => self.shared.state.borrow_mut().load_more = Some(load_more),
            (true, None) => {
                let load_more = LoadMoreButtonComponent::new(document);
                let weak = Rc::downgrade(&self.shared);
                load_more.set_click_handler(Rc::new(move || {
                    if let Some(board) = Self::upgrade(&weak) {
                        board.show_more();
                    }
                }));
                components::render(list, &load_more, RenderPosition::BeforeEnd);
                self.shared.state.borrow_mut().load_more = Some(load_more);
            }
            (false, Some(load_more)) => components::remove(&load_more),
            (false, None) => {}
        }
    }

    fn create_controller(&self, container: NodeId, film: &Film) -> FilmController {
        let controller = FilmController::new(
            &self.shared.ui,
            container,
            self.shared.on_data_change.clone(),
            self.shared.on_view_change.clone(),
        );
        controller.render(film);
        controller
    }

    fn render_cards(&self, films: &[Film]) {
        let Some((_, container)) = self.list_nodes() else {
            return;
        };
        let controllers: Vec<FilmController> = films
            .iter()
            .map(|film| self.create_controller(container, film))
            .collect();
        self.shared
            .state
            .borrow_mut()
            .controllers
            .extend(controllers);
    }

    /// Bring the cards in line with the model without closing the open popup.
    ///
    /// The list keeps at least as many cards as it showed before (a full page
    /// at minimum). Cards whose film left the list are destroyed, missing ones
    /// are created, and default-mode cards whose film changed are re-rendered.
    fn sync_list(&self) {
        let Some((list, container)) = self.list_nodes() else {
            return;
        };
        let films = self.sorted_films();
        let current = self.controllers();
        let target_len = current.len().max(self.cards_per_page()).min(films.len());
        let target = &films[..target_len];

        let (kept, stale): (Vec<FilmController>, Vec<FilmController>) =
            current.into_iter().partition(|controller| {
                controller
                    .film_id()
                    .is_some_and(|id| target.iter().any(|film| film.id == id))
            });

        let controllers: Vec<FilmController> = target
            .iter()
            .map(|film| match kept.iter().find(|c| c.film_id() == Some(film.id)) {
                Some(controller) => {
                    if controller.mode() == Mode::Default && controller.film().as_ref() != Some(film)
                    {
                        controller.render(film);
                    }
                    controller.clone()
                }
                None => self.create_controller(container, film),
            })
            .collect();

        {
            let mut state = self.shared.state.borrow_mut();
            if state
                .popup_owner
                .is_some_and(|owner| !target.iter().any(|film| film.id == owner))
            {
                state.popup_owner = None;
            }
            state.controllers = controllers.clone();
        }
        for controller in &stale {
            controller.destroy();
        }

        // Re-append in list order; inserting an attached card moves it.
        let document = self.shared.ui.document();
        for card in controllers.iter().filter_map(FilmController::card_element) {
            document.insert(container, card, RenderPosition::BeforeEnd);
        }

        if !stale.is_empty() {
            tracing::debug!("Synced film list ({} cards dropped)", stale.len());
        }
        self.update_list_extras(list, films.is_empty(), target_len < films.len());
    }

    /// Drop every card and start again from the first page.
    fn reset_list(&self) {
        let owner = self.shared.state.borrow_mut().popup_owner.take();
        if let Some(owner) = owner.and_then(|owner| self.controller(owner)) {
            owner.set_default_view();
        }

        let (controllers, no_films, load_more) = {
            let mut state = self.shared.state.borrow_mut();
            (
                std::mem::take(&mut state.controllers),
                state.no_films.take(),
                state.load_more.take(),
            )
        };
        for controller in &controllers {
            controller.destroy();
        }
        if let Some(no_films) = no_films {
            components::remove(&no_films);
        }
        if let Some(load_more) = load_more {
            components::remove(&load_more);
        }
        tracing::debug!("Reset film list ({} cards removed)", controllers.len());

        self.render_list_content();
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Board")
            .field("sort", &state.sort)
            .field("shown", &state.controllers.len())
            .field("popup_owner", &state.popup_owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::SHAKE_CLASS;
    use crate::dom::Document;
    use crate::settings::Settings;
    use crate::timers::Timers;
    use chrono::NaiveDate;
    use cinemaddict_model::FilterType;
    use std::time::Duration;

    fn create_test_films(count: u32) -> Vec<Film> {
        (1..=count)
            .map(|id| {
                Film::new(id, &format!("Film {}", id))
                    .rating(f64::from(id))
                    .release_date(NaiveDate::from_ymd_opt(1930 + id as i32, 1, 1).unwrap())
                    .genres(["Drama"])
            })
            .collect()
    }

    fn create_board(count: u32) -> (Board, Rc<FilmsModel>, UiContext) {
        let document = Rc::new(Document::new());
        let main = document.create_element(r#"<main class="main"></main>"#);
        document.insert(document.body(), main, RenderPosition::BeforeEnd);
        let ui = UiContext::new(document, Rc::new(Timers::new()), Settings::default());
        let model = Rc::new(FilmsModel::with_films(create_test_films(count)));
        let board = Board::new(&ui, main, model.clone());
        board.render();
        (board, model, ui)
    }

    fn card_titles(ui: &UiContext) -> Vec<String> {
        let document = ui.document();
        document
            .query_selector_all(document.body(), ".film-card__title")
            .into_iter()
            .map(|title| document.text_content(title))
            .collect()
    }

    fn click(ui: &UiContext, root: NodeId, selector: &str) {
        let target = ui.document().query_selector(root, selector).unwrap();
        ui.document().click(target);
    }

    #[test]
    fn test_pagination() {
        let (board, _, ui) = create_board(7);
        assert_eq!(board.controllers().len(), 5);
        assert!(board.has_more());

        click(&ui, ui.document().body(), ".films-list__show-more");

        assert_eq!(board.controllers().len(), 7);
        assert!(!board.has_more());
        assert!(ui
            .document()
            .query_selector(ui.document().body(), ".films-list__show-more")
            .is_none());
    }

    #[test]
    fn test_empty_catalogue_shows_message() {
        let (board, _, ui) = create_board(0);
        assert!(board.controllers().is_empty());
        assert!(!board.has_more());
        let text = ui.document().text_content(ui.document().body());
        assert!(text.contains("There are no movies in our database"));
    }

    #[test]
    fn test_single_popup_owner() {
        let (board, model, ui) = create_board(3);
        let first = board.controller(FilmId::new(1)).unwrap();
        let second = board.controller(FilmId::new(2)).unwrap();

        click(&ui, first.card_element().unwrap(), ".film-card__poster");
        assert_eq!(board.open_popup_owner(), Some(FilmId::new(1)));
        click(&ui, first.popup_element().unwrap(), ".film-details__control-label--favorite");

        click(&ui, second.card_element().unwrap(), ".film-card__title");

        assert_eq!(board.open_popup_owner(), Some(FilmId::new(2)));
        assert_eq!(first.mode(), Mode::Default);
        let popups = ui
            .document()
            .query_selector_all(ui.document().body(), ".film-details");
        assert_eq!(popups.len(), 1);
        // The revoked popup committed its working copy
        assert!(model.film(FilmId::new(1)).unwrap().is_favorite);
        assert_eq!(ui.document().document_listener_count(), 1);
    }

    #[test]
    fn test_owner_cleared_after_escape() {
        let (board, _, ui) = create_board(2);
        let first = board.controller(FilmId::new(1)).unwrap();
        click(&ui, first.card_element().unwrap(), ".film-card__poster");

        ui.document()
            .key_down(crate::input::KeyEvent::new(crate::input::Key::Escape));

        assert_eq!(board.open_popup_owner(), None);
    }

    #[test]
    fn test_rejected_update_shakes_card() {
        let (board, _, ui) = create_board(2);
        // A card for a film the model has never heard of
        board.render_cards(&[Film::new(99, "Ghost")]);
        let controller = board.controller(FilmId::new(99)).unwrap();
        let card = controller.card_element().unwrap();

        click(&ui, card, ".film-card__controls-item--favorite");

        assert!(ui.document().has_class(card, SHAKE_CLASS));
        assert!(!controller.film().unwrap().is_favorite);
        ui.timers().advance(Duration::from_millis(600));
        assert!(!ui.document().has_class(card, SHAKE_CLASS));
    }

    fn watchlist_board(count: u32) -> (Board, Rc<FilmsModel>, UiContext) {
        let (board, model, ui) = create_board(count);
        let films = model
            .all_films()
            .into_iter()
            .map(|mut film| {
                film.toggle_watchlist();
                film
            })
            .collect();
        model.set_films(films);
        model.set_filter(FilterType::Watchlist);
        (board, model, ui)
    }

    #[test]
    fn test_card_leaving_filter_is_removed() {
        let (board, model, ui) = watchlist_board(3);
        assert_eq!(board.controllers().len(), 3);

        let card = board.controller(FilmId::new(1)).unwrap().card_element().unwrap();
        click(&ui, card, ".film-card__controls-item--add-to-watchlist");

        assert!(!model.film(FilmId::new(1)).unwrap().is_added_to_watchlist);
        assert_eq!(card_titles(&ui), vec!["Film 2", "Film 3"]);
        assert!(board.controller(FilmId::new(1)).is_none());
        assert!(!ui.document().contains(card));
    }

    #[test]
    fn test_show_more_after_card_left_filter_skips_nothing() {
        let (board, _, ui) = watchlist_board(7);
        assert_eq!(board.controllers().len(), 5);

        let card = board.controller(FilmId::new(1)).unwrap().card_element().unwrap();
        click(&ui, card, ".film-card__controls-item--add-to-watchlist");

        // The page stays full: Film 6 slides in
        assert_eq!(
            card_titles(&ui),
            vec!["Film 2", "Film 3", "Film 4", "Film 5", "Film 6"]
        );
        assert!(board.has_more());

        board.show_more();

        assert_eq!(
            card_titles(&ui),
            vec!["Film 2", "Film 3", "Film 4", "Film 5", "Film 6", "Film 7"]
        );
        assert!(!board.has_more());
    }

    #[test]
    fn test_replacing_catalogue_resyncs_list() {
        let (board, model, ui) = create_board(3);

        model.set_films(vec![]);
        assert!(board.controllers().is_empty());
        let text = ui.document().text_content(ui.document().body());
        assert!(text.contains("There are no movies in our database"));

        model.set_films(create_test_films(7));
        assert_eq!(board.controllers().len(), 5);
        assert!(board.has_more());
        let text = ui.document().text_content(ui.document().body());
        assert!(!text.contains("There are no movies in our database"));
    }

    #[test]
    fn test_open_popup_survives_other_card_update() {
        let (board, model, ui) = create_board(3);
        let first = board.controller(FilmId::new(1)).unwrap();
        click(&ui, first.card_element().unwrap(), ".film-card__poster");
        click(&ui, first.popup_element().unwrap(), ".film-details__control-label--favorite");

        let mut film = model.film(FilmId::new(2)).unwrap();
        film.toggle_favorite();
        model.update_film(film).unwrap();

        assert_eq!(board.open_popup_owner(), Some(FilmId::new(1)));
        // The popup's pending toggle is still in its working copy
        assert!(first.film().unwrap().is_favorite);
        assert!(board
            .controller(FilmId::new(2))
            .unwrap()
            .film()
            .unwrap()
            .is_favorite);
    }

    #[test]
    fn test_sort_by_rating() {
        let (board, _, ui) = create_board(3);
        assert_eq!(card_titles(&ui), vec!["Film 1", "Film 2", "Film 3"]);

        let buttons = ui
            .document()
            .query_selector_all(ui.document().body(), ".sort__button");
        ui.document().click(buttons[2]);

        assert_eq!(board.sort(), SortType::Rating);
        assert_eq!(card_titles(&ui), vec!["Film 3", "Film 2", "Film 1"]);
        let active = ui
            .document()
            .query_selector(ui.document().body(), ".sort__button--active")
            .unwrap();
        assert_eq!(
            ui.document().attribute(active, "data-sort-type").as_deref(),
            Some("rating")
        );
    }

    #[test]
    fn test_filter_change_rebuilds_list_and_closes_popup() {
        let (board, model, ui) = create_board(3);
        let mut film = model.film(FilmId::new(3)).unwrap();
        film.toggle_watchlist();
        model.update_film(film).unwrap();
        let first = board.controller(FilmId::new(1)).unwrap();
        click(&ui, first.card_element().unwrap(), ".film-card__poster");

        model.set_filter(FilterType::Watchlist);

        assert_eq!(card_titles(&ui), vec!["Film 3"]);
        assert_eq!(board.open_popup_owner(), None);
        assert!(ui
            .document()
            .query_selector(ui.document().body(), ".film-details")
            .is_none());
        assert_eq!(ui.document().document_listener_count(), 0);
    }
}
