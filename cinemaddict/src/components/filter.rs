use std::rc::Rc;

use cinemaddict_model::FilterType;
use itertools::Itertools;

use super::{weak_document, Component, ComponentBase};
use crate::dom::{Document, EventKind};

const ITEM_SELECTOR: &str = ".main-navigation__item";

/// One navigation entry: filter, matching film count, whether it is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterItem {
    pub filter: FilterType,
    pub count: usize,
    pub is_active: bool,
}

pub struct FilterComponent {
    base: ComponentBase,
    items: Vec<FilterItem>,
}

impl FilterComponent {
    pub fn new(document: &Rc<Document>, items: Vec<FilterItem>) -> Self {
        Self {
            base: ComponentBase::new(document),
            items,
        }
    }

    /// Delegated click handler: one listener on the bar resolves which item
    /// was hit.
    pub fn set_filter_change_handler(&self, handler: Rc<dyn Fn(FilterType)>) {
        let element = self.element();
        let document = weak_document(self);
        self.document()
            .add_event_listener(element, EventKind::Click, move |event| {
                let (Some(document), Some(target)) = (document.upgrade(), event.target) else {
                    return;
                };
                let filter = document
                    .closest(target, ITEM_SELECTOR)
                    .and_then(|item| document.attribute(item, "data-filter-type"))
                    .and_then(|name| name.parse::<FilterType>().ok());
                if let Some(filter) = filter {
                    handler(filter);
                }
            });
    }
}

fn item_markup(item: &FilterItem) -> String {
    let name = item.filter.as_str();
    let active = if item.is_active {
        " main-navigation__item--active"
    } else {
        ""
    };
    let count = if item.filter == FilterType::All {
        String::new()
    } else {
        format!(r#" <span class="main-navigation__item-count">{}</span>"#, item.count)
    };
    format!(
        r##"<a href="#{name}" data-filter-type="{name}" class="main-navigation__item{active}">{title}{count}</a>"##,
        name = name,
        active = active,
        title = item.filter.title(),
        count = count,
    )
}

impl Component for FilterComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn template(&self) -> String {
        format!(
            r##"<nav class="main-navigation">
              <div class="main-navigation__items">{}</div>
              <a href="#stats" class="main-navigation__additional">Stats</a>
            </nav>"##,
            self.items.iter().map(item_markup).join("")
        )
    }
}
