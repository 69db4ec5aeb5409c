use std::rc::Rc;

use super::{Component, ComponentBase};
use crate::dom::Document;

pub struct NoFilmsComponent {
    base: ComponentBase,
}

impl NoFilmsComponent {
    pub fn new(document: &Rc<Document>) -> Self {
        Self {
            base: ComponentBase::new(document),
        }
    }
}

impl Component for NoFilmsComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn template(&self) -> String {
        r#"<h2 class="films-list__title">There are no movies in our database</h2>"#.to_string()
    }
}
