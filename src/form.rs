//! Declarative form types: which entity fields a form exposes and how the
//! submitted values are named.

mod post_type;

use std::collections::HashMap;

pub use post_type::PostType;

/// Raw submitted values keyed by full field name, e.g. `modelbundle_post[title]`.
pub type Submission = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    prefix: &'static str,
    name: &'static str,
}

impl FormField {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name used for the input element and the submitted key.
    pub fn full_name(&self) -> String {
        format!("{}[{}]", self.prefix, self.name)
    }

    /// Identifier used for the element's `id` attribute.
    pub fn id(&self) -> String {
        format!("{}_{}", self.prefix, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct FormBuilder {
    prefix: &'static str,
    fields: Vec<FormField>,
}

impl FormBuilder {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            fields: Vec::new(),
        }
    }

    pub fn add(&mut self, name: &'static str) -> &mut Self {
        self.fields.push(FormField {
            prefix: self.prefix,
            name,
        });
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up the submitted value for a declared field.
    pub fn value<'a>(&self, submission: &'a Submission, name: &str) -> Option<&'a str> {
        let field = self.field(name)?;
        submission.get(&field.full_name()).map(String::as_str)
    }
}

pub trait FormType {
    /// The entity the form populates.
    type Data;

    fn build_form(&self, builder: &mut FormBuilder);

    fn block_prefix(&self) -> &'static str;

    fn data_class(&self) -> &'static str {
        std::any::type_name::<Self::Data>()
    }

    fn builder(&self) -> FormBuilder {
        let mut builder = FormBuilder::new(self.block_prefix());
        self.build_form(&mut builder);
        builder
    }
}
