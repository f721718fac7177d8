mod memory;
mod postgres;

use async_trait::async_trait;

use crate::{
    models::{Author, Post},
    Result,
};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn find_author(&self, id: i64) -> Result<Option<Author>>;

    /// Inserts or updates the author, assigning an id on first save.
    async fn save_author(&self, author: &mut Author) -> Result<()>;
}

/// Persistence for posts. `save_post` runs the post's lifecycle hooks, so
/// timestamps and slug are up to date once it returns.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_post(&self, id: i64) -> Result<Option<Post>>;

    /// Slugs are not unique, so several posts may match.
    async fn find_posts_by_slug(&self, slug: &str) -> Result<Vec<Post>>;

    async fn find_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>>;

    async fn save_post(&self, post: &mut Post) -> Result<()>;

    async fn delete_post(&self, id: i64) -> Result<()>;
}

pub(crate) fn require_author_id(post: &Post) -> Result<i64> {
    post.author_id().ok_or_else(|| {
        crate::Error::Internal("post author must be saved before the post".to_string())
    })
}
