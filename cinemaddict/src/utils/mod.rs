mod format;

pub use format::{
    escape_html, format_comment_date, format_release_date, format_runtime, pluralize,
    truncate_description,
};
