use std::rc::Rc;

use super::{Component, ComponentBase};
use crate::dom::{Document, EventKind};

pub struct LoadMoreButtonComponent {
    base: ComponentBase,
}

impl LoadMoreButtonComponent {
    pub fn new(document: &Rc<Document>) -> Self {
        Self {
            base: ComponentBase::new(document),
        }
    }

    pub fn set_click_handler(&self, handler: Rc<dyn Fn()>) {
        self.document()
            .add_event_listener(self.element(), EventKind::Click, move |_| handler());
    }
}

impl Component for LoadMoreButtonComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn template(&self) -> String {
        r#"<button class="films-list__show-more">Show more</button>"#.to_string()
    }
}
