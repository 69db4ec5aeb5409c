use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use cinemaddict_model::{films_by_filter, FilterType, FilmsModel};

use crate::components::{self, FilterComponent, FilterItem};
use crate::dom::{Document, NodeId, RenderPosition};

struct Shared {
    document: Rc<Document>,
    container: NodeId,
    films_model: Rc<FilmsModel>,
    active_filter: Cell<FilterType>,
    component: RefCell<Option<FilterComponent>>,
}

/// Keeps the navigation bar in step with the films model.
#[derive(Clone)]
pub struct FilterController {
    shared: Rc<Shared>,
}

impl FilterController {
    /// Subscribes to model data changes; every change re-renders the bar.
    pub fn new(document: &Rc<Document>, container: NodeId, films_model: Rc<FilmsModel>) -> Self {
        let controller = Self {
            shared: Rc::new(Shared {
                document: document.clone(),
                container,
                active_filter: Cell::new(films_model.active_filter()),
                films_model,
                component: RefCell::new(None),
            }),
        };

        let weak = Rc::downgrade(&controller.shared);
        controller
            .shared
            .films_model
            .set_data_change_handler(move || {
                if let Some(controller) = Self::upgrade(&weak) {
                    controller.render();
                }
            });
        controller
    }

    fn upgrade(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    pub fn active_filter(&self) -> FilterType {
        self.shared.active_filter.get()
    }

    /// Filter entries in navigation order with their current counts
    pub fn items(&self) -> Vec<FilterItem> {
        let films = self.shared.films_model.all_films();
        let active = self.shared.active_filter.get();
        FilterType::ALL
            .into_iter()
            .map(|filter| FilterItem {
                filter,
                count: films_by_filter(&films, filter).len(),
                is_active: filter == active,
            })
            .collect()
    }

    pub fn render(&self) {
        let component = FilterComponent::new(&self.shared.document, self.items());
        let weak = Rc::downgrade(&self.shared);
        component.set_filter_change_handler(Rc::new(move |filter: FilterType| {
            if let Some(controller) = Self::upgrade(&weak) {
                controller.on_filter_change(filter);
            }
        }));

        let old = self.shared.component.borrow_mut().take();
        match old {
            Some(old) => components::replace(&component, &old),
            None => components::render(self.shared.container, &component, RenderPosition::AfterBegin),
        }
        self.shared.component.replace(Some(component));
    }

    fn on_filter_change(&self, filter: FilterType) {
        tracing::info!("Filter selected: {}", filter.as_str());
        self.shared.films_model.set_filter(filter);
        self.shared.active_filter.set(filter);
        self.render();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Component;
    use cinemaddict_model::{Film, FilmId};

    fn create_test_model() -> Rc<FilmsModel> {
        let mut watched = Film::new(2, "The Man with the Golden Arm").genres(["Drama"]);
        watched.is_marked_as_watched = true;
        watched.is_favorite = true;
        Rc::new(FilmsModel::with_films(vec![
            Film::new(1, "Sagebrush Trail").genres(["Western"]),
            watched,
        ]))
    }

    fn nav(document: &Document) -> NodeId {
        document
            .query_selector(document.body(), ".main-navigation")
            .unwrap()
    }

    #[test]
    fn test_counts_follow_model_changes() {
        let document = Rc::new(Document::new());
        let model = create_test_model();
        let controller = FilterController::new(&document, document.body(), model.clone());
        controller.render();

        let counts: Vec<_> = controller.items().iter().map(|item| item.count).collect();
        assert_eq!(counts, vec![2, 0, 1, 1]);

        let mut film = model.film(FilmId::new(1)).unwrap();
        film.toggle_watchlist();
        model.update_film(film).unwrap();

        let navs = document.query_selector_all(document.body(), ".main-navigation");
        assert_eq!(navs.len(), 1);
        let item = document.query_selector_all(navs[0], ".main-navigation__item")[1];
        assert_eq!(document.text_content(item), "Watchlist 1");
    }

    #[test]
    fn test_click_sets_filter() {
        let document = Rc::new(Document::new());
        let model = create_test_model();
        let controller = FilterController::new(&document, document.body(), model.clone());
        controller.render();

        let favorites = document.query_selector_all(nav(&document), ".main-navigation__item")[3];
        document.click(favorites);

        assert_eq!(model.active_filter(), FilterType::Favorites);
        assert_eq!(controller.active_filter(), FilterType::Favorites);
        let active = document
            .query_selector(nav(&document), ".main-navigation__item--active")
            .unwrap();
        assert_eq!(
            document.attribute(active, "data-filter-type").as_deref(),
            Some("favorites")
        );
        let rendered = controller.shared.component.borrow();
        assert_eq!(rendered.as_ref().and_then(|c| c.rendered_element()), Some(nav(&document)));
    }
}
