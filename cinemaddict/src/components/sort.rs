use std::rc::Rc;

use cinemaddict_model::SortType;
use itertools::Itertools;

use super::{weak_document, Component, ComponentBase};
use crate::dom::{Document, EventKind};

pub struct SortComponent {
    base: ComponentBase,
    active: SortType,
}

impl SortComponent {
    pub fn new(document: &Rc<Document>, active: SortType) -> Self {
        Self {
            base: ComponentBase::new(document),
            active,
        }
    }

    pub fn set_sort_change_handler(&self, handler: Rc<dyn Fn(SortType)>) {
        let element = self.element();
        let document = weak_document(self);
        self.document()
            .add_event_listener(element, EventKind::Click, move |event| {
                let (Some(document), Some(target)) = (document.upgrade(), event.target) else {
                    return;
                };
                let sort = document
                    .closest(target, ".sort__button")
                    .and_then(|button| document.attribute(button, "data-sort-type"))
                    .and_then(|name| name.parse::<SortType>().ok());
                if let Some(sort) = sort {
                    handler(sort);
                }
            });
    }
}

impl Component for SortComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn template(&self) -> String {
        let buttons = SortType::ALL
            .iter()
            .map(|sort| {
                let active = if *sort == self.active {
                    " sort__button--active"
                } else {
                    ""
                };
                format!(
                    r##"<li><a href="#" data-sort-type="{}" class="sort__button{}">Sort by {}</a></li>"##,
                    sort.as_str(),
                    active,
                    sort.as_str()
                )
            })
            .join("");
        format!(r#"<ul class="sort">{}</ul>"#, buttons)
    }
}
