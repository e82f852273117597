//! Dictionary model and its text serialization
//!
//! Values are stored pre-rendered. The dictionary only pairs keys with value
//! strings and brackets them; it does not know about PDF value types, so the
//! caller is responsible for producing valid literals (numbers, `/Names`,
//! `[ arrays ]`, `N 0 R` references or nested dictionaries).

/// Mapping from key (including the leading `/`) to a rendered value.
///
/// Keys are unique. Entries render in insertion order; replacing the value of
/// an existing key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: Vec<(String, String)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `<< ... >>` with one entry per line.
    ///
    /// Entries are indented two spaces deeper than `level`; the closing
    /// brackets line up with `level`. The opening brackets are not indented so
    /// a nested dictionary can follow its key on the same line:
    /// `parent.set("/Resources", child.render(1))`.
    pub fn render(&self, level: usize) -> String {
        let mut out = String::from("<<\n");
        let inner = "  ".repeat(level + 1);
        for (key, value) in &self.entries {
            out.push_str(&inner);
            out.push_str(key);
            out.push(' ');
            out.push_str(value);
            out.push('\n');
        }
        out.push_str(&"  ".repeat(level));
        out.push_str(">>");
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (key, value) in iter {
            dict.set(key, value);
        }
        dict
    }
}

/// `[ a b c ]`
pub fn array<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: ToString,
{
    let mut out = String::from("[");
    for item in items {
        out.push(' ');
        out.push_str(&item.to_string());
    }
    out.push_str(" ]");
    out
}

/// Literal string `( ... )` with backslash escapes
pub fn literal_string(s: &str) -> String {
    format!("({})", escape_pdf_string(s))
}

/// Escape special characters in PDF literal strings
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}
