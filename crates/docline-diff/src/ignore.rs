use docline_types::{is_within, remove_at_path, Map};

/// Dotted paths excluded from delta patches.
///
/// An ignored path also covers everything beneath it: ignoring `meta`
/// ignores `meta.editor`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    paths: Vec<String>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.paths.iter().any(|ignored| is_within(path, ignored))
    }

    /// Remove every ignored path from `map` in place.
    pub fn strip(&self, map: &mut Map) {
        for path in &self.paths {
            remove_at_path(map, path);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut paths: Vec<String> = Vec::new();
        for path in iter {
            let path = path.into();
            if !path.is_empty() && !paths.contains(&path) {
                paths.push(path);
            }
        }
        Self { paths }
    }
}
