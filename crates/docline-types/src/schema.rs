use serde::{Deserialize, Serialize};

/// Declared field layout of a document type.
///
/// Holds the dotted paths of every declared field, primary key included.
/// Restores use it to give reconstructed values the document's full shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::default();
        for field in fields {
            schema = schema.with_field(field);
        }
        schema
    }

    /// Add a declared field. Duplicates are ignored.
    pub fn with_field(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.fields.contains(&path) {
            self.fields.push(path);
        }
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.iter().any(|f| f == path)
    }

    /// Declared paths in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
