use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{require_author_id, AuthorRepository, PostRepository};
use crate::{
    models::{Author, Post, Timestampable, Timestamps},
    schema::{AUTHOR_TABLE, POST_TABLE},
    Error, Result,
};

#[derive(Debug, sqlx::FromRow)]
struct AuthorRow {
    id: i64,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author::hydrate(
            row.id,
            row.name,
            row.email,
            Timestamps {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    author_id: i64,
    cover: Option<String>,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self, author: Author) -> Post {
        Post::hydrate(
            self.id,
            self.title,
            self.content,
            author,
            self.cover,
            self.slug,
            Timestamps {
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        )
    }
}

#[derive(Clone)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn load_posts(&self, rows: Vec<PostRow>) -> Result<Vec<Post>> {
        let mut author_ids: Vec<i64> = rows.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<i64, Author> = sqlx::query_as::<_, AuthorRow>(&format!(
            "{} WHERE id = ANY($1)",
            AUTHOR_TABLE.select_sql()
        ))
        .bind(author_ids)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|row| (row.id, Author::from(row)))
        .collect();

        rows.into_iter()
            .map(|row| -> Result<Post> {
                let author = authors.get(&row.author_id).cloned().ok_or_else(|| {
                    Error::Internal(format!("post {} references a missing author", row.id))
                })?;
                Ok(row.into_post(author))
            })
            .collect()
    }
}

#[async_trait]
impl AuthorRepository for PgRepository {
    async fn find_author(&self, id: i64) -> Result<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(&format!(
            "{} WHERE id = $1",
            AUTHOR_TABLE.select_sql()
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Author::from))
    }

    async fn save_author(&self, author: &mut Author) -> Result<()> {
        let now = Utc::now();

        match author.id() {
            Some(id) => {
                author.on_update(now);
                let result = sqlx::query(&AUTHOR_TABLE.update_sql())
                    .bind(&author.name)
                    .bind(&author.email)
                    .bind(author.created_at())
                    .bind(author.updated_at())
                    .bind(id)
                    .execute(&self.db)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(Error::NotFound);
                }
            }
            None => {
                author.on_create(now);
                let id: i64 = sqlx::query_scalar(&AUTHOR_TABLE.insert_sql())
                    .bind(&author.name)
                    .bind(&author.email)
                    .bind(author.created_at())
                    .bind(author.updated_at())
                    .fetch_one(&self.db)
                    .await?;
                author.assign_id(id);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PgRepository {
    async fn find_post(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{} WHERE id = $1", POST_TABLE.select_sql()))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some(row) => Ok(self.load_posts(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_posts_by_slug(&self, slug: &str) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{} WHERE slug = $1 ORDER BY created_at DESC",
            POST_TABLE.select_sql()
        ))
        .bind(slug)
        .fetch_all(&self.db)
        .await?;

        self.load_posts(rows).await
    }

    async fn find_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{} WHERE author_id = $1 ORDER BY created_at DESC",
            POST_TABLE.select_sql()
        ))
        .bind(author_id)
        .fetch_all(&self.db)
        .await?;

        self.load_posts(rows).await
    }

    async fn save_post(&self, post: &mut Post) -> Result<()> {
        let author_id = require_author_id(post)?;
        let now = Utc::now();

        match post.id() {
            Some(id) => {
                post.before_update(now);
                let result = sqlx::query(&POST_TABLE.update_sql())
                    .bind(post.title())
                    .bind(post.content())
                    .bind(author_id)
                    .bind(post.cover())
                    .bind(post.slug())
                    .bind(post.created_at())
                    .bind(post.updated_at())
                    .bind(id)
                    .execute(&self.db)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(Error::NotFound);
                }
            }
            None => {
                post.before_insert(now);
                let id: i64 = sqlx::query_scalar(&POST_TABLE.insert_sql())
                    .bind(post.title())
                    .bind(post.content())
                    .bind(author_id)
                    .bind(post.cover())
                    .bind(post.slug())
                    .bind(post.created_at())
                    .bind(post.updated_at())
                    .fetch_one(&self.db)
                    .await?;
                post.assign_id(id);
            }
        }

        tracing::debug!(post_id = ?post.id(), slug = post.slug(), "Post saved");
        Ok(())
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", POST_TABLE.name))
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}
