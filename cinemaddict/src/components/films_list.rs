use std::rc::Rc;

use super::{Component, ComponentBase};
use crate::dom::{Document, NodeId};

/// Films section with the card container the board renders into
pub struct FilmsListComponent {
    base: ComponentBase,
}

impl FilmsListComponent {
    pub fn new(document: &Rc<Document>) -> Self {
        Self {
            base: ComponentBase::new(document),
        }
    }

    pub fn list(&self) -> Option<NodeId> {
        self.document().query_selector(self.element(), ".films-list")
    }

    pub fn cards_container(&self) -> Option<NodeId> {
        self.document()
            .query_selector(self.element(), ".films-list__container")
    }
}

impl Component for FilmsListComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn template(&self) -> String {
        r#"<section class="films">
          <section class="films-list">
            <h2 class="films-list__title visually-hidden">All movies. Upcoming</h2>
            <div class="films-list__container"></div>
          </section>
        </section>"#
            .to_string()
    }
}
