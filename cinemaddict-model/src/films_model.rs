use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::ModelError;
use crate::film::{Film, FilmId};
use crate::filter::{FilterType, films_by_filter};

type ChangeHandler = Rc<dyn Fn()>;

/// Canonical film collection plus the active navigation filter.
///
/// Lives on the UI thread behind an `Rc`. Every method takes `&self`, and
/// handlers run only after internal borrows are released, so a handler may
/// read the model it was notified by.
#[derive(Default)]
pub struct FilmsModel {
    films: RefCell<Vec<Film>>,
    active_filter: Cell<FilterType>,
    data_change_handlers: RefCell<Vec<ChangeHandler>>,
    filter_change_handlers: RefCell<Vec<ChangeHandler>>,
}

impl FilmsModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_films(films: Vec<Film>) -> Self {
        let model = Self::new();
        model.films.replace(films);
        model
    }

    /// Parse and validate a JSON catalogue (an array of films).
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let films: Vec<Film> = serde_json::from_str(json)?;
        for film in &films {
            film.validate()?;
        }
        tracing::info!("Loaded {} films from catalogue", films.len());
        Ok(Self::with_films(films))
    }

    pub fn all_films(&self) -> Vec<Film> {
        self.films.borrow().clone()
    }

    /// Films matching the active filter, in catalogue order.
    pub fn filtered_films(&self) -> Vec<Film> {
        let films = self.films.borrow();
        films_by_filter(&films, self.active_filter.get())
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn film(&self, id: FilmId) -> Option<Film> {
        self.films.borrow().iter().find(|f| f.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.films.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.films.borrow().is_empty()
    }

    pub fn active_filter(&self) -> FilterType {
        self.active_filter.get()
    }

    pub fn set_films(&self, films: Vec<Film>) {
        self.films.replace(films);
        Self::call_handlers(&self.data_change_handlers);
    }

    pub fn set_filter(&self, filter: FilterType) {
        tracing::debug!("Filter changed: {:?} -> {:?}", self.active_filter.get(), filter);
        self.active_filter.set(filter);
        Self::call_handlers(&self.filter_change_handlers);
    }

    /// Replace the stored snapshot with the same id.
    ///
    /// Fails without notifying anyone when the film is not in the collection.
    pub fn update_film(&self, film: Film) -> Result<(), ModelError> {
        {
            let mut films = self.films.borrow_mut();
            let Some(index) = films.iter().position(|f| f.is_same(&film)) else {
                return Err(ModelError::FilmNotFound(film.id));
            };
            films[index] = film;
        }
        Self::call_handlers(&self.data_change_handlers);
        Ok(())
    }

    pub fn set_data_change_handler<F>(&self, handler: F)
    where
        F: Fn() + 'static,
    {
        self.data_change_handlers.borrow_mut().push(Rc::new(handler));
    }

    pub fn set_filter_change_handler<F>(&self, handler: F)
    where
        F: Fn() + 'static,
    {
        self.filter_change_handlers.borrow_mut().push(Rc::new(handler));
    }

    fn call_handlers(handlers: &RefCell<Vec<ChangeHandler>>) {
        let handlers: Vec<ChangeHandler> = handlers.borrow().clone();
        for handler in handlers {
            handler();
        }
    }
}

impl std::fmt::Debug for FilmsModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilmsModel")
            .field("films", &self.films.borrow().len())
            .field("active_filter", &self.active_filter.get())
            .finish()
    }
}
