use std::cell::RefCell;
use std::rc::Rc;

use cinemaddict_model::{Comment, CommentId};
use itertools::Itertools;

type ChangeHandler = Rc<dyn Fn()>;

/// Comments of the film whose popup is open.
///
/// Handlers fire after every successful add or remove and never after a
/// rejected one. `set_comments` is a silent reseed.
#[derive(Default)]
pub struct CommentsModel {
    comments: RefCell<Vec<Comment>>,
    data_change_handlers: RefCell<Vec<ChangeHandler>>,
}

impl CommentsModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot ordered oldest first
    pub fn comments(&self) -> Vec<Comment> {
        self.comments
            .borrow()
            .iter()
            .sorted_by_key(|comment| comment.date)
            .cloned()
            .collect()
    }

    pub fn set_comments(&self, comments: Vec<Comment>) {
        self.comments.replace(comments);
    }

    pub fn len(&self) -> usize {
        self.comments.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.borrow().is_empty()
    }

    /// Append `comment`. Rejects empty messages and ids already present.
    pub fn add_comment(&self, comment: Comment) -> bool {
        {
            let mut comments = self.comments.borrow_mut();
            if !comment.is_valid() || comments.iter().any(|c| c.id == comment.id) {
                tracing::debug!("Rejected comment {}", comment.id);
                return false;
            }
            comments.push(comment);
        }
        self.call_handlers();
        true
    }

    /// Remove the first comment with `id`; false when there is none.
    pub fn remove_comment(&self, id: &CommentId) -> bool {
        {
            let mut comments = self.comments.borrow_mut();
            let Some(index) = comments.iter().position(|c| &c.id == id) else {
                return false;
            };
            comments.remove(index);
        }
        self.call_handlers();
        true
    }

    pub fn set_data_change_handler<F>(&self, handler: F)
    where
        F: Fn() + 'static,
    {
        self.data_change_handlers.borrow_mut().push(Rc::new(handler));
    }

    fn call_handlers(&self) {
        let handlers: Vec<ChangeHandler> = self.data_change_handlers.borrow().clone();
        for handler in handlers {
            handler();
        }
    }
}

impl std::fmt::Debug for CommentsModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentsModel")
            .field("comments", &self.comments.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cinemaddict_model::Emotion;
    use std::cell::Cell;

    fn comment_at(id: &str, day: u32) -> Comment {
        Comment::new(
            "Tim Macoveev",
            Utc.with_ymd_and_hms(2019, 12, day, 12, 0, 0).unwrap(),
            Emotion::Smile,
            "Interesting setting and a good cast",
        )
        .with_id(id)
    }

    fn counting_model() -> (CommentsModel, Rc<Cell<usize>>) {
        let model = CommentsModel::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        model.set_data_change_handler(move || counter.set(counter.get() + 1));
        (model, calls)
    }

    #[test]
    fn test_comments_sorted_by_date() {
        let model = CommentsModel::new();
        model.set_comments(vec![comment_at("c", 20), comment_at("a", 1), comment_at("b", 10)]);

        let ids: Vec<_> = model
            .comments()
            .into_iter()
            .map(|comment| comment.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_set_comments_is_silent() {
        let (model, calls) = counting_model();
        model.set_comments(vec![comment_at("a", 1)]);
        assert_eq!(calls.get(), 0);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_add_notifies_once_and_rejects_duplicates() {
        let (model, calls) = counting_model();

        assert!(model.add_comment(comment_at("a", 1)));
        assert_eq!(calls.get(), 1);

        assert!(!model.add_comment(comment_at("a", 2)));
        assert_eq!(calls.get(), 1);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_add_rejects_empty_message() {
        let (model, calls) = counting_model();
        let mut comment = comment_at("a", 1);
        comment.message = "   ".to_string();

        assert!(!model.add_comment(comment));
        assert_eq!(calls.get(), 0);
        assert!(model.is_empty());
    }

    #[test]
    fn test_remove_notifies_only_on_success() {
        let (model, calls) = counting_model();
        model.set_comments(vec![comment_at("a", 1), comment_at("b", 2)]);

        assert!(model.remove_comment(&CommentId::from("a")));
        assert_eq!(calls.get(), 1);
        assert_eq!(model.len(), 1);

        assert!(!model.remove_comment(&CommentId::from("a")));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_handler_can_read_model() {
        let model = Rc::new(CommentsModel::new());
        let seen = Rc::new(Cell::new(usize::MAX));
        let weak = Rc::downgrade(&model);
        let sink = seen.clone();
        model.set_data_change_handler(move || {
            if let Some(model) = weak.upgrade() {
                sink.set(model.comments().len());
            }
        });

        model.add_comment(comment_at("a", 1));
        assert_eq!(seen.get(), 1);
    }
}
