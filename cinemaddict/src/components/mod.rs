//! View components: each wraps one rendered fragment built from markup.
//!
//! There is no diffing. A visible state change means building a fresh
//! component and swapping it in with [`replace`].

mod comment;
mod film_card;
mod film_popup;
mod films_list;
mod filter;
mod load_more;
mod no_films;
mod sort;

pub use comment::CommentComponent;
pub use film_card::FilmCardComponent;
pub use film_popup::{FilmPopupComponent, PopupControl};
pub use films_list::FilmsListComponent;
pub use filter::{FilterComponent, FilterItem};
pub use load_more::LoadMoreButtonComponent;
pub use no_films::NoFilmsComponent;
pub use sort::SortComponent;

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::dom::{Document, EventKind, NodeId, RenderPosition};

/// State every component carries: the document it renders into and the
/// lazily built element.
#[derive(Debug)]
pub struct ComponentBase {
    document: Rc<Document>,
    element: Cell<Option<NodeId>>,
}

impl ComponentBase {
    pub fn new(document: &Rc<Document>) -> Self {
        Self {
            document: document.clone(),
            element: Cell::new(None),
        }
    }
}

pub trait Component {
    fn base(&self) -> &ComponentBase;

    /// Markup for the current state
    fn template(&self) -> String;

    fn document(&self) -> &Rc<Document> {
        &self.base().document
    }

    /// The live element, built from `template()` on first access and cached.
    fn element(&self) -> NodeId {
        let base = self.base();
        if let Some(element) = base.element.get() {
            return element;
        }
        let element = base.document.create_element(&self.template());
        base.element.set(Some(element));
        element
    }

    /// Drop the cached element so the next `element()` call rebuilds it.
    fn remove_element(&self) {
        self.base().element.set(None);
    }

    /// The cached element, without building one
    fn rendered_element(&self) -> Option<NodeId> {
        self.base().element.get()
    }

    /// Attach a click listener to the first descendant matching `selector`.
    fn on_click(&self, selector: &str, handler: Rc<dyn Fn()>) {
        let element = self.element();
        if let Some(target) = self.document().query_selector(element, selector) {
            self.document()
                .add_event_listener(target, EventKind::Click, move |_| handler());
        } else {
            tracing::warn!("No element matches {} for click handler", selector);
        }
    }
}

/// Insert `component` relative to `container`.
pub fn render(container: NodeId, component: &dyn Component, position: RenderPosition) {
    let element = component.element();
    if !component.document().insert(container, element, position) {
        tracing::warn!("Failed to render component at {:?}", container);
    }
}

/// Swap `old` out for `new` in place. Nothing happens when `old` was never
/// attached.
pub fn replace(new: &dyn Component, old: &dyn Component) {
    let Some(old_element) = old.rendered_element() else {
        return;
    };
    let new_element = new.element();
    if new.document().replace(new_element, old_element) {
        old.remove_element();
    }
}

/// Detach and free the component's element. Safe to call twice.
pub fn remove(component: &dyn Component) {
    if let Some(element) = component.base().element.take() {
        component.document().remove(element);
    }
}

pub(crate) fn weak_document(component: &dyn Component) -> Weak<Document> {
    Rc::downgrade(component.document())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeting {
        base: ComponentBase,
        name: String,
    }

    impl Component for Greeting {
        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn template(&self) -> String {
            format!(r#"<p class="greeting">Hello, {}</p>"#, self.name)
        }
    }

    fn greeting(document: &Rc<Document>, name: &str) -> Greeting {
        Greeting {
            base: ComponentBase::new(document),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_element_is_cached_until_removed() {
        let document = Rc::new(Document::new());
        let component = greeting(&document, "Ana");

        let first = component.element();
        assert_eq!(component.element(), first);

        component.remove_element();
        assert_ne!(component.element(), first);
    }

    #[test]
    fn test_replace_and_double_remove() {
        let document = Rc::new(Document::new());
        let old = greeting(&document, "Ana");
        render(document.body(), &old, RenderPosition::BeforeEnd);

        let new = greeting(&document, "Ben");
        replace(&new, &old);

        assert_eq!(document.children(document.body()), vec![new.element()]);
        assert_eq!(old.rendered_element(), None);
        assert_eq!(document.text_content(document.body()), "Hello, Ben");

        remove(&new);
        remove(&new);
        assert!(document.children(document.body()).is_empty());
    }

    #[test]
    fn test_replace_unrendered_is_noop() {
        let document = Rc::new(Document::new());
        let old = greeting(&document, "Ana");
        let new = greeting(&document, "Ben");

        replace(&new, &old);

        assert!(document.children(document.body()).is_empty());
    }
}
