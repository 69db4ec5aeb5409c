use anyhow::Result;
use std::rc::Rc;

use cinemaddict_model::FilmsModel;

use crate::board::Board;
use crate::context::UiContext;
use crate::controllers::FilterController;
use crate::dom::{Document, NodeId, RenderPosition};
use crate::error::Error;
use crate::logging::init_logging;
use crate::settings::Settings;
use crate::timers::Timers;

const PAGE_SKELETON: [&str; 3] = [
    r#"<header class="header"><h1 class="header__logo logo">Cinemaddict</h1></header>"#,
    r#"<main class="main"></main>"#,
    r#"<footer class="footer">
         <section class="footer__logo logo logo--smaller">Cinemaddict</section>
         <section class="footer__statistics"></section>
       </footer>"#,
];

/// A mounted page: document skeleton, filter bar and film board wired to one
/// films model. Independent of any terminal or process concerns so tests can
/// drive it directly.
pub struct Page {
    ui: UiContext,
    films_model: Rc<FilmsModel>,
    filter_controller: FilterController,
    board: Board,
}

impl Page {
    pub fn mount(settings: Settings, films_model: Rc<FilmsModel>) -> Self {
        let document = Rc::new(Document::new());
        let body = document.body();
        for markup in PAGE_SKELETON {
            let element = document.create_element(markup);
            document.insert(body, element, RenderPosition::BeforeEnd);
        }
        let ui = UiContext::new(document, Rc::new(Timers::new()), settings);
        let main = ui
            .document()
            .query_selector(body, ".main")
            .unwrap_or(body);

        if let Some(statistics) = ui.document().query_selector(body, ".footer__statistics") {
            ui.document()
                .set_text_content(statistics, &format!("{} movies inside", films_model.len()));
        }

        let filter_controller = FilterController::new(ui.document(), main, films_model.clone());
        let board = Board::new(&ui, main, films_model.clone());
        filter_controller.render();
        board.render();

        Self {
            ui,
            films_model,
            filter_controller,
            board,
        }
    }

    pub fn ui(&self) -> &UiContext {
        &self.ui
    }

    pub fn document(&self) -> &Rc<Document> {
        self.ui.document()
    }

    pub fn body(&self) -> NodeId {
        self.ui.document().body()
    }

    pub fn films_model(&self) -> &Rc<FilmsModel> {
        &self.films_model
    }

    pub fn filter_controller(&self) -> &FilterController {
        &self.filter_controller
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn html(&self) -> String {
        self.document().outer_html(self.body())
    }
}

pub struct App {
    settings: Settings,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn run(&self) -> Result<()> {
        let (log_path, _guard) = init_logging()?;
        tracing::info!("cinemaddict starting, logging to {}", log_path.display());

        let films_model = Rc::new(self.load_films()?);
        let page = Page::mount(self.settings.clone(), films_model);
        tracing::info!(
            "Rendered {} cards ({} films in catalogue)",
            page.board().controllers().len(),
            page.films_model().len()
        );

        println!("{}", page.html());
        Ok(())
    }

    /// Load the configured catalogue; no path means an empty board.
    pub fn load_films(&self) -> Result<FilmsModel, Error> {
        let Some(path) = self.settings.films_path.as_ref() else {
            tracing::warn!("No films_path configured, starting with an empty catalogue");
            return Ok(FilmsModel::new());
        };
        tracing::info!("Loading films from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Ok(FilmsModel::from_json(&json)?)
    }
}
