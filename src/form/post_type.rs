use super::{FormBuilder, FormType, Submission};
use crate::{models::Post, repository::AuthorRepository, Result};

/// Form adapter for [`Post`]: exposes title, content and author.
/// Timestamps and slug are maintained by the persistence hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostType;

impl FormType for PostType {
    type Data = Post;

    fn build_form(&self, builder: &mut FormBuilder) {
        builder.add("title").add("content").add("author");
    }

    fn block_prefix(&self) -> &'static str {
        "modelbundle_post"
    }
}

impl PostType {
    /// Copies the submitted values of the declared fields onto `post`.
    ///
    /// Fields missing from the submission leave the post untouched. Text
    /// values are trimmed. The author value is an author id; an empty,
    /// malformed or unknown id detaches the author so validation reports it.
    pub async fn submit(
        &self,
        post: &mut Post,
        submission: &Submission,
        authors: &dyn AuthorRepository,
    ) -> Result<()> {
        let form = self.builder();

        if let Some(title) = form.value(submission, "title") {
            post.set_title(title.trim());
        }
        if let Some(content) = form.value(submission, "content") {
            post.set_content(content.trim());
        }

        if let Some(raw) = form.value(submission, "author") {
            let author = match raw.trim().parse::<i64>() {
                Ok(id) => {
                    let author = authors.find_author(id).await?;
                    if author.is_none() {
                        tracing::debug!(author_id = id, "Submitted author does not exist");
                    }
                    author
                }
                Err(_) => {
                    tracing::debug!(value = raw, "Submitted author id is not a number");
                    None
                }
            };

            match author {
                Some(author) => post.set_author(author),
                None => post.clear_author(),
            };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::Author,
        repository::{AuthorRepository, MemoryRepository},
    };
    use validator::Validate;

    fn submission(pairs: &[(&str, &str)]) -> Submission {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_declares_exactly_three_fields() {
        let form = PostType.builder();
        let names: Vec<&str> = form.fields().iter().map(|f| f.name()).collect();

        assert_eq!(names, vec!["title", "content", "author"]);
        assert_eq!(PostType.block_prefix(), "modelbundle_post");
        assert!(PostType.data_class().ends_with("models::post::Post"));
        assert_eq!(form.field("title").unwrap().id(), "modelbundle_post_title");
    }

    #[tokio::test]
    async fn test_submit_populates_post() {
        let repo = MemoryRepository::new();
        let mut author = Author::new("Ana", "ana@example.com");
        repo.save_author(&mut author).await.unwrap();
        let author_id = author.id().unwrap().to_string();

        let data = submission(&[
            ("modelbundle_post[title]", "  A Title "),
            ("modelbundle_post[content]", "\n Some content \n"),
            ("modelbundle_post[author]", author_id.as_str()),
            ("modelbundle_post[slug]", "ignored"),
        ]);

        let mut post = Post::new();
        PostType.submit(&mut post, &data, &repo).await.unwrap();

        assert_eq!(post.title(), "A Title");
        assert_eq!(post.content(), "Some content");
        assert_eq!(post.author(), Some(&author));
        assert_eq!(post.slug(), "");
        assert!(post.validate().is_ok());
    }

    #[tokio::test]
    async fn test_submit_with_unknown_author_fails_validation() {
        let repo = MemoryRepository::new();
        let data = submission(&[
            ("modelbundle_post[title]", ""),
            ("modelbundle_post[content]", "Some content"),
            ("modelbundle_post[author]", "42"),
        ]);

        let mut post = Post::new();
        PostType.submit(&mut post, &data, &repo).await.unwrap();

        assert!(post.author().is_none());
        let errors = post.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(errors.field_errors().contains_key("author"));
    }

    #[tokio::test]
    async fn test_submit_ignores_malformed_author() {
        let repo = MemoryRepository::new();
        let data = submission(&[("modelbundle_post[author]", "not-a-number")]);

        let mut post = Post::new();
        PostType.submit(&mut post, &data, &repo).await.unwrap();
        assert!(post.author().is_none());
    }

    #[tokio::test]
    async fn test_editing_with_unresolvable_author_detaches_it() {
        let repo = MemoryRepository::new();
        let mut author = Author::new("Ana", "ana@example.com");
        repo.save_author(&mut author).await.unwrap();

        for raw in ["999", "", "abc"] {
            let mut post = Post::new();
            post.set_title("Existing")
                .set_content("Body")
                .set_author(author.clone());
            assert!(post.validate().is_ok());

            let data = submission(&[("modelbundle_post[author]", raw)]);
            PostType.submit(&mut post, &data, &repo).await.unwrap();

            assert!(post.author().is_none(), "author kept for {:?}", raw);
            let errors = post.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("author"));
        }
    }

    #[tokio::test]
    async fn test_absent_author_field_keeps_author() {
        let repo = MemoryRepository::new();
        let mut author = Author::new("Ana", "ana@example.com");
        repo.save_author(&mut author).await.unwrap();

        let mut post = Post::new();
        post.set_title("Existing").set_content("Body").set_author(author.clone());

        let data = submission(&[("modelbundle_post[title]", "Renamed")]);
        PostType.submit(&mut post, &data, &repo).await.unwrap();

        assert_eq!(post.title(), "Renamed");
        assert_eq!(post.author(), Some(&author));
    }
}
