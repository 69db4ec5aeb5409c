mod comments_model;

pub use cinemaddict_model::FilmsModel;
pub use comments_model::CommentsModel;
