use std::rc::Rc;

use cinemaddict_model::Comment;

use crate::components::{self, CommentComponent, Component};
use crate::dom::{Document, NodeId, RenderPosition};

/// Change requested by a comment row or the new-comment form
#[derive(Debug, Clone, PartialEq)]
pub enum CommentChange {
    Delete(Comment),
    Add(Comment),
}

pub type CommentChangeHandler = Rc<dyn Fn(CommentChange)>;

/// Owns one rendered comment row inside an open popup.
pub struct CommentController {
    document: Rc<Document>,
    container: Option<NodeId>,
    on_change: CommentChangeHandler,
    component: Option<CommentComponent>,
}

impl CommentController {
    /// `popup` is the popup element; rows go into its comments list.
    pub fn new(document: &Rc<Document>, popup: NodeId, on_change: CommentChangeHandler) -> Self {
        let container = document.query_selector(popup, ".film-details__comments-list");
        if container.is_none() {
            tracing::warn!("Popup {:?} has no comments list", popup);
        }
        Self {
            document: document.clone(),
            container,
            on_change,
            component: None,
        }
    }

    pub fn render(&mut self, comment: &Comment) {
        let component = CommentComponent::new(&self.document, comment);
        let on_change = self.on_change.clone();
        let deleted = comment.clone();
        component.set_delete_handler(Rc::new(move || {
            on_change(CommentChange::Delete(deleted.clone()))
        }));

        match (self.component.take(), self.container) {
            (Some(old), _) => components::replace(&component, &old),
            (None, Some(container)) => {
                components::render(container, &component, RenderPosition::BeforeEnd)
            }
            (None, None) => {}
        }
        self.component = Some(component);
    }

    pub fn destroy(&mut self) {
        if let Some(component) = self.component.take() {
            components::remove(&component);
        }
    }
}

impl std::fmt::Debug for CommentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentController")
            .field("container", &self.container)
            .field(
                "element",
                &self.component.as_ref().and_then(|c| c.rendered_element()),
            )
            .finish()
    }
}
