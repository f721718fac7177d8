//! In-memory repository, for tests and tooling. Data is lost on drop.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{require_author_id, AuthorRepository, PostRepository};
use crate::{
    models::{Author, Post, Timestampable},
    Error, Result,
};

#[derive(Default)]
struct Store {
    authors: BTreeMap<i64, Author>,
    posts: BTreeMap<i64, Post>,
    next_author_id: i64,
    next_post_id: i64,
}

impl Store {
    /// Copies a stored post with its author refreshed from the author table,
    /// so later author edits show up on read.
    fn load_post(&self, stored: &Post) -> Post {
        let mut post = stored.clone();
        if let Some(author) = stored.author_id().and_then(|id| self.authors.get(&id)) {
            post.set_author(author.clone());
        }
        post
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorRepository for MemoryRepository {
    async fn find_author(&self, id: i64) -> Result<Option<Author>> {
        Ok(self.store.read().await.authors.get(&id).cloned())
    }

    async fn save_author(&self, author: &mut Author) -> Result<()> {
        let mut store = self.store.write().await;
        let now = Utc::now();

        let id = match author.id() {
            Some(id) => {
                author.on_update(now);
                id
            }
            None => {
                author.on_create(now);
                store.next_author_id += 1;
                let id = store.next_author_id;
                author.assign_id(id);
                id
            }
        };

        store.authors.insert(id, author.clone());
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryRepository {
    async fn find_post(&self, id: i64) -> Result<Option<Post>> {
        let store = self.store.read().await;
        Ok(store.posts.get(&id).map(|p| store.load_post(p)))
    }

    async fn find_posts_by_slug(&self, slug: &str) -> Result<Vec<Post>> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .values()
            .filter(|p| p.slug() == slug)
            .map(|p| store.load_post(p))
            .collect())
    }

    async fn find_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .values()
            .filter(|p| p.author_id() == Some(author_id))
            .map(|p| store.load_post(p))
            .collect())
    }

    async fn save_post(&self, post: &mut Post) -> Result<()> {
        let author_id = require_author_id(post)?;
        let mut store = self.store.write().await;
        if !store.authors.contains_key(&author_id) {
            return Err(Error::NotFound);
        }

        let now = Utc::now();
        let id = match post.id() {
            Some(id) => {
                if !store.posts.contains_key(&id) {
                    return Err(Error::NotFound);
                }
                post.before_update(now);
                id
            }
            None => {
                post.before_insert(now);
                store.next_post_id += 1;
                let id = store.next_post_id;
                post.assign_id(id);
                id
            }
        };

        let mut stored = post.clone();
        stored.set_file(None);
        store.posts.insert(id, stored);
        tracing::debug!(post_id = id, slug = post.slug(), "Post saved");
        Ok(())
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        self.store
            .write()
            .await
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::NotFound)
    }
}
