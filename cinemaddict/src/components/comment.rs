use std::rc::Rc;

use cinemaddict_model::Comment;

use super::{Component, ComponentBase};
use crate::dom::Document;
use crate::utils::{escape_html, format_comment_date};

/// One row in the popup's comment list
pub struct CommentComponent {
    base: ComponentBase,
    comment: Comment,
}

impl CommentComponent {
    pub fn new(document: &Rc<Document>, comment: &Comment) -> Self {
        Self {
            base: ComponentBase::new(document),
            comment: comment.clone(),
        }
    }

    pub fn set_delete_handler(&self, handler: Rc<dyn Fn()>) {
        self.on_click(".film-details__comment-delete", handler);
    }
}

impl Component for CommentComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn template(&self) -> String {
        let comment = &self.comment;
        // message is stored escaped already
        format!(
            r#"<li class="film-details__comment" data-comment-id="{id}">
              <span class="film-details__comment-emoji">
                <img src="{image}" width="55" height="55" alt="emoji-{emotion}">
              </span>
              <div>
                <p class="film-details__comment-text">{message}</p>
                <p class="film-details__comment-info">
                  <span class="film-details__comment-author">{author}</span>
                  <span class="film-details__comment-day">{date}</span>
                  <button class="film-details__comment-delete">Delete</button>
                </p>
              </div>
            </li>"#,
            id = escape_html(comment.id.as_str()),
            image = comment.emotion.image(),
            emotion = comment.emotion,
            message = comment.message,
            author = escape_html(&comment.author),
            date = format_comment_date(comment.date),
        )
    }
}
