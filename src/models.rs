mod author;
mod post;
mod timestamps;

pub use author::Author;
pub use post::{Post, MAX_TITLE_LENGTH};
pub use timestamps::{Timestampable, Timestamps};
