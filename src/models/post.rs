use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::{Validate, ValidationErrors};

use super::{Author, Timestampable, Timestamps};
use crate::{
    slug::{slugify, MAX_SLUG_LENGTH},
    upload::{CoverStorage, UploadedFile, COVER_UPLOAD_PATH, MAX_COVER_BYTES},
    validation::{validate_constraints, Constrained, Constraint, FieldConstraints, FieldValue},
};

pub const MAX_TITLE_LENGTH: usize = 150;

const POST_CONSTRAINTS: &[FieldConstraints] = &[
    FieldConstraints {
        field: "title",
        constraints: &[Constraint::NotBlank, Constraint::MaxLength(MAX_TITLE_LENGTH)],
    },
    FieldConstraints {
        field: "content",
        constraints: &[Constraint::NotBlank],
    },
    FieldConstraints {
        field: "author",
        constraints: &[Constraint::NotBlank],
    },
    FieldConstraints {
        field: "cover",
        constraints: &[Constraint::MaxLength(255)],
    },
    FieldConstraints {
        field: "file",
        constraints: &[Constraint::MaxFileSize(MAX_COVER_BYTES)],
    },
    FieldConstraints {
        field: "slug",
        constraints: &[Constraint::MaxLength(MAX_SLUG_LENGTH)],
    },
];

/// A blog post, mirroring one row of the `post` table.
///
/// Mutators return `&mut Self` so calls can be chained. The uploaded `file`
/// only lives for the current request and is never serialized or stored.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Post {
    id: Option<i64>,
    title: String,
    content: String,
    author: Option<Author>,
    cover: Option<String>,
    #[serde(skip)]
    file: Option<UploadedFile>,
    slug: String,
    #[serde(skip)]
    slug_changed: bool,
    #[serde(skip)]
    title_changed: bool,
    #[serde(flatten)]
    timestamps: Timestamps,
}

impl Post {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn hydrate(
        id: i64,
        title: String,
        content: String,
        author: Author,
        cover: Option<String>,
        slug: String,
        timestamps: Timestamps,
    ) -> Self {
        Self {
            id: Some(id),
            title,
            content,
            author: Some(author),
            cover,
            file: None,
            slug,
            slug_changed: false,
            title_changed: false,
            timestamps,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        debug_assert!(self.id.is_none(), "post id is immutable once assigned");
        self.id.get_or_insert(id);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        let title = title.into();
        if title != self.title {
            self.title = title;
            self.title_changed = true;
        }
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> &mut Self {
        self.content = content.into();
        self
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }

    pub fn author_id(&self) -> Option<i64> {
        self.author.as_ref().and_then(Author::id)
    }

    pub fn set_author(&mut self, author: Author) -> &mut Self {
        self.author = Some(author);
        self
    }

    /// Detaches the author; validation then reports the post as incomplete.
    pub fn clear_author(&mut self) -> &mut Self {
        self.author = None;
        self
    }

    pub fn cover(&self) -> Option<&str> {
        self.cover.as_deref()
    }

    pub fn set_cover(&mut self, cover: Option<String>) -> &mut Self {
        self.cover = cover;
        self
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn set_file(&mut self, file: Option<UploadedFile>) -> &mut Self {
        self.file = file;
        self
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Overrides the slug; it is normalized when the post is next saved.
    pub fn set_slug(&mut self, slug: impl Into<String>) -> &mut Self {
        self.slug = slug.into();
        self.slug_changed = true;
        self
    }

    /// Web path to the cover, relative to the document root.
    pub fn cover_web(&self) -> Option<String> {
        self.cover()
            .map(|cover| format!("{}/{}", COVER_UPLOAD_PATH, cover))
    }

    /// Location of the cover on disk.
    pub fn cover_absolute(&self, storage: &CoverStorage) -> Option<PathBuf> {
        self.cover().map(|cover| storage.absolute_path(cover))
    }

    /// Moves the attached file into the cover directory under the client's
    /// file name and records that name as the cover.
    ///
    /// Does nothing when no file is attached. A cover with the same name is
    /// overwritten. If the move fails the file stays attached and `cover` is
    /// untouched.
    pub async fn upload(&mut self, storage: &CoverStorage) -> crate::Result<()> {
        let Some(file) = self.file.as_ref() else {
            tracing::debug!(post_id = ?self.id, "No cover attached, skipping upload");
            return Ok(());
        };

        let filename = file.client_original_name().to_string();
        let target = file.move_to(&storage.absolute_dir(), &filename).await?;
        tracing::info!(post_id = ?self.id, path = %target.display(), "Cover uploaded");

        self.set_cover(Some(filename));
        self.set_file(None);
        Ok(())
    }

    pub fn preview(&self, length: usize) -> String {
        let chars: String = self.content.chars().take(length).collect();
        if self.content.chars().count() > length {
            format!("{}...", chars)
        } else {
            chars
        }
    }

    /// Runs before the first insert.
    pub fn before_insert(&mut self, now: DateTime<Utc>) {
        self.on_create(now);
        self.refresh_slug(true);
    }

    /// Runs before every update. The slug is only recomputed when the title
    /// or the slug changed since the last save.
    pub fn before_update(&mut self, now: DateTime<Utc>) {
        self.on_update(now);
        self.refresh_slug(false);
    }

    fn refresh_slug(&mut self, inserting: bool) {
        if self.slug_changed && !self.slug.trim().is_empty() {
            self.slug = slugify(&self.slug);
        } else if inserting || self.title_changed || self.slug_changed || self.slug.is_empty() {
            self.slug = slugify(&self.title);
        }
        self.slug_changed = false;
        self.title_changed = false;
    }
}

impl Timestampable for Post {
    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}

impl Constrained for Post {
    fn constraints() -> &'static [FieldConstraints] {
        POST_CONSTRAINTS
    }

    fn field_value(&self, field: &str) -> Option<FieldValue<'_>> {
        let value = match field {
            "title" => FieldValue::Text(&self.title),
            "content" => FieldValue::Text(&self.content),
            "author" => FieldValue::Reference(self.author.is_some()),
            "cover" => FieldValue::OptionalText(self.cover.as_deref()),
            "file" => FieldValue::File(self.file.as_ref()),
            "slug" => FieldValue::Text(&self.slug),
            _ => return None,
        };
        Some(value)
    }
}

impl Validate for Post {
    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_constraints(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::path::Path;

    fn valid_post() -> Post {
        let mut post = Post::new();
        post.set_title("First post")
            .set_content("Hello from the blog")
            .set_author(Author::new("Ana", "ana@example.com"));
        post
    }

    #[test]
    fn test_accessors_return_what_was_set() {
        let author = Author::new("Ana", "ana@example.com");
        let mut post = Post::new();
        post.set_title("Title")
            .set_content("Body")
            .set_author(author.clone())
            .set_slug("custom");

        assert_eq!(post.id(), None);
        assert_eq!(post.title(), "Title");
        assert_eq!(post.content(), "Body");
        assert_eq!(post.author(), Some(&author));
        assert_eq!(post.slug(), "custom");
        assert_eq!(post.cover(), None);
        assert!(post.file().is_none());
    }

    #[test]
    fn test_cover_paths() {
        let storage = CoverStorage::new("/srv/blog");
        let mut post = valid_post();

        assert_eq!(post.cover_web(), None);
        assert_eq!(post.cover_absolute(&storage), None);

        post.set_cover(Some("photo.png".to_string()));
        assert_eq!(post.cover_web().as_deref(), Some("uploads/covers/photo.png"));
        assert_eq!(
            post.cover_absolute(&storage),
            Some(PathBuf::from("/srv/blog/web/uploads/covers/photo.png"))
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = CoverStorage::new(tmp.path());
        let mut post = valid_post();

        post.upload(&storage).await.unwrap();
        post.upload(&storage).await.unwrap();

        assert_eq!(post.cover(), None);
        assert!(!storage.absolute_dir().exists());
    }

    #[tokio::test]
    async fn test_upload_moves_file_and_records_cover() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = CoverStorage::new(tmp.path());
        let received = tmp.path().join("tmp-upload");
        tokio::fs::write(&received, b"png bytes").await.unwrap();

        let mut post = valid_post();
        post.set_file(Some(UploadedFile::from_path(&received, "photo.png").await.unwrap()));
        post.upload(&storage).await.unwrap();

        assert_eq!(post.cover(), Some("photo.png"));
        assert!(post.file().is_none());
        assert!(!received.exists());

        let stored = post.cover_absolute(&storage).unwrap();
        assert_eq!(stored, tmp.path().join("web/uploads/covers/photo.png"));
        assert_eq!(tokio::fs::read(&stored).await.unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_file_attached() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = CoverStorage::new(tmp.path());
        let mut post = valid_post();
        post.set_file(Some(UploadedFile::new(
            Path::new("/nonexistent/upload"),
            "photo.png",
            3,
        )));

        assert!(post.upload(&storage).await.is_err());
        assert_eq!(post.cover(), None);
        assert!(post.file().is_some());
    }

    #[test]
    fn test_validation_flags_blank_fields() {
        let mut post = Post::new();
        post.set_title("   ").set_content("Body");

        let errors = post.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("author"));
        assert!(!fields.contains_key("content"));

        assert!(valid_post().validate().is_ok());
    }

    #[test]
    fn test_validation_flags_blank_content() {
        for content in ["", "  \n\t "] {
            let mut post = valid_post();
            post.set_content(content);

            let errors = post.validate().unwrap_err();
            let fields = errors.field_errors();
            assert_eq!(fields["content"][0].code, "not_blank");
            assert_eq!(fields.len(), 1);
        }
    }

    #[test]
    fn test_cleared_author_fails_validation() {
        let mut post = valid_post();
        post.clear_author();

        assert!(post.author().is_none());
        let errors = post.validate().unwrap_err();
        assert_eq!(errors.field_errors()["author"][0].code, "not_blank");
    }

    #[test]
    fn test_blank_slug_and_missing_cover_are_allowed() {
        let post = valid_post();
        assert_eq!(post.slug(), "");
        assert_eq!(post.cover(), None);
        assert!(post.validate().is_ok());

        let mut post = valid_post();
        post.set_cover(Some("c".repeat(256)));
        let errors = post.validate().unwrap_err();
        assert_eq!(errors.field_errors()["cover"][0].code, "max_length");
    }

    #[test]
    fn test_validation_limits() {
        let mut post = valid_post();
        post.set_title("x".repeat(MAX_TITLE_LENGTH + 1))
            .set_file(Some(UploadedFile::new("/tmp/big", "big.png", MAX_COVER_BYTES + 1)));

        let errors = post.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["title"][0].code, "max_length");
        assert_eq!(fields["file"][0].code, "max_file_size");
    }

    #[test]
    fn test_slug_derived_from_title() {
        let now = Utc::now();
        let mut post = valid_post();
        post.before_insert(now);
        assert_eq!(post.slug(), "first-post");
        assert_eq!(post.created_at(), now);

        post.set_title("Renamed Post");
        let later = now + Duration::seconds(30);
        post.before_update(later);
        assert_eq!(post.slug(), "renamed-post");
        assert_eq!(post.created_at(), now);
        assert_eq!(post.updated_at(), later);
    }

    #[test]
    fn test_explicit_slug_is_normalized_and_kept() {
        let mut post = valid_post();
        post.set_slug("My Custom Slug");
        post.before_insert(Utc::now());
        assert_eq!(post.slug(), "my-custom-slug");

        post.set_slug("");
        post.before_update(Utc::now());
        assert_eq!(post.slug(), "first-post");
    }

    #[test]
    fn test_custom_slug_survives_unrelated_edits() {
        let mut post = valid_post();
        post.set_slug("my-custom");
        post.before_insert(Utc::now());
        assert_eq!(post.slug(), "my-custom");

        post.set_content("Edited body");
        post.before_update(Utc::now());
        assert_eq!(post.slug(), "my-custom");

        post.set_title("First post");
        post.before_update(Utc::now());
        assert_eq!(post.slug(), "my-custom");

        post.set_title("Brand New Title");
        post.before_update(Utc::now());
        assert_eq!(post.slug(), "brand-new-title");
    }

    #[test]
    fn test_hydrated_post_keeps_stored_slug() {
        let mut post = Post::hydrate(
            7,
            "Stored Title".to_string(),
            "Body".to_string(),
            Author::new("Ana", "ana@example.com"),
            None,
            "hand-picked".to_string(),
            Timestamps::now(),
        );

        post.set_content("Changed");
        post.before_update(Utc::now());
        assert_eq!(post.slug(), "hand-picked");
    }

    #[test]
    fn test_file_is_not_serialized() {
        let mut post = valid_post();
        post.set_file(Some(UploadedFile::new("/tmp/x", "x.png", 1)));

        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("file").is_none());
        assert_eq!(json["title"], "First post");
        assert!(json.get("created_at").is_some());
    }

    #[test]
    fn test_preview() {
        let mut post = valid_post();
        post.set_content("héllo world");
        assert_eq!(post.preview(5), "héllo...");
        assert_eq!(post.preview(50), "héllo world");
    }
}
