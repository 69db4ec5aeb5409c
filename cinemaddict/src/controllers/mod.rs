mod comment_controller;
mod film_controller;
mod filter_controller;

pub use comment_controller::{CommentChange, CommentController};
pub use film_controller::{
    DataChangeHandler, FilmController, Mode, ViewChangeHandler, SHAKE_ANIMATION_TIMEOUT,
    SHAKE_CLASS,
};
pub use filter_controller::FilterController;
