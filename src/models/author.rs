use serde::{Deserialize, Serialize};

use super::{Timestampable, Timestamps};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    id: Option<i64>,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    timestamps: Timestamps,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            timestamps: Timestamps::now(),
        }
    }

    pub(crate) fn hydrate(id: i64, name: String, email: String, timestamps: Timestamps) -> Self {
        Self {
            id: Some(id),
            name,
            email,
            timestamps,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        debug_assert!(self.id.is_none(), "author id is immutable once assigned");
        self.id.get_or_insert(id);
    }

    pub fn gravatar_url(&self, size: u32) -> String {
        let email_hash = format!(
            "{:x}",
            md5::compute(self.email.trim().to_lowercase().as_bytes())
        );
        format!(
            "https://www.gravatar.com/avatar/{}?s={}&d=identicon",
            email_hash, size
        )
    }
}

impl Timestampable for Author {
    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravatar_normalizes_email() {
        let a = Author::new("Ana", "  Ana@Example.COM ");
        let b = Author::new("Ana", "ana@example.com");

        assert_eq!(a.gravatar_url(80), b.gravatar_url(80));
        assert!(a.gravatar_url(80).ends_with("?s=80&d=identicon"));
    }
}
