//! Defines the [`Tag`] type, which represents a [`crate::post::Post`]
//! category label.

use gtmpl_value::Value;
use std::hash::{Hash, Hasher};

/// Represents a [`crate::post::Post`] tag. The `text` field is the
/// author's spelling, kept verbatim for display; the `url` field points at
/// the tag's index page and is derived from a configured pattern with the
/// text percent-encoded, so a name like `C++` stays readable on the page
/// while its URL stays well-formed.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag's display text, exactly as written in the source header.
    pub text: String,

    /// The URL of the tag's index page. Given a pattern like
    /// `/tags/%s.html`, this looks like `/tags/C%2B%2B.html`.
    pub url: String,
}

impl Tag {
    /// Builds a tag from its text and a URL pattern whose `%s` placeholder
    /// receives the percent-encoded text.
    pub fn new(text: &str, url_pattern: &str) -> Tag {
        Tag {
            text: text.to_owned(),
            url: url_pattern.replacen("%s", &urlencoding::encode(text), 1),
        }
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the
    /// `text` field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating
    /// directly to the `text` field, so equal-text tags collapse into one
    /// group during aggregation.
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}
impl Eq for Tag {}

impl From<&Tag> for Value {
    /// Converts [`Tag`]s into [`Value`]s for templating.
    fn from(tag: &Tag) -> Value {
        use std::collections::HashMap;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("text".to_owned(), Value::String(tag.text.clone()));
        m.insert("url".to_owned(), Value::String(tag.url.clone()));
        Value::Object(m)
    }
}
