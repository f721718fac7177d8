use heck::ToKebabCase;

/// Longest slug the `post.slug` column holds.
pub const MAX_SLUG_LENGTH: usize = 255;

/// Turns free text into a lower-case, dash-separated permalink segment.
pub fn slugify(text: &str) -> String {
    let slug = text.to_kebab_case();
    if slug.chars().count() <= MAX_SLUG_LENGTH {
        return slug;
    }

    let truncated: String = slug.chars().take(MAX_SLUG_LENGTH).collect();
    truncated.trim_end_matches('-').to_string()
}
