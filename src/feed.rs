//! The feed view over the recency-ordered posts: HTML-escaped copies of
//! each entry plus the feed's `updated` timestamp.
//!
//! Page templates need unescaped HTML, so escaping here works on derived
//! copies and never touches the shared [`Post`] values. The escape pass
//! runs exactly once per build, when the feed context is assembled.

use std::collections::HashMap;
use std::fmt;

use gtmpl_value::Value;

use crate::post::Post;

/// Escapes HTML special characters so markup can be embedded as feed
/// text. Ampersands go first; otherwise entities produced by the earlier
/// replacements would be escaped a second time.
pub fn escape_html(html: &str) -> String {
    html.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Builds the feed template context from recency-ordered posts: escaped
/// entry copies under `posts`, the feed's own path under `url`, and
/// `updated` set to the most recent post's timestamp.
pub fn context(ordered: &[Post], feed_url: &str) -> Result<Value> {
    let newest = ordered.first().ok_or(Error::Empty)?;
    let updated = newest
        .posted
        .as_ref()
        .ok_or_else(|| Error::MissingPosted(newest.url.clone()))?
        .isotime
        .clone();

    let entries: Vec<Value> = ordered.iter().map(entry_value).collect();

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("posts".to_owned(), Value::Array(entries));
    m.insert("url".to_owned(), Value::String(feed_url.to_owned()));
    m.insert("updated".to_owned(), Value::String(updated));
    Ok(Value::Object(m))
}

/// One feed entry: a copy of the post with `content` and `summary`
/// escaped.
fn entry_value(post: &Post) -> Value {
    let mut copy = post.clone();
    copy.content = escape_html(&post.content);
    copy.summary = escape_html(&post.summary);
    copy.to_value()
}

/// Represents the result of a feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem assembling the feed view.
#[derive(Debug)]
pub enum Error {
    /// Returned when there are no posts to build a feed from.
    Empty,

    /// Returned when the most recent post has no `posted` date for the
    /// feed's `updated` element.
    MissingPosted(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Empty => write!(f, "cannot build a feed from zero posts"),
            Error::MissingPosted(url) => {
                write!(f, "post `{}` has no `posted` date for the feed", url)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::date::Date;

    fn post(url: &str, posted: &str, content: &str) -> Post {
        Post {
            url: url.to_owned(),
            tags: Vec::new(),
            posted: Some(Date::parse(posted).unwrap()),
            created: None,
            extra: HashMap::new(),
            content: content.to_owned(),
            summary: content.to_owned(),
        }
    }

    fn field<'a>(value: &'a Value, name: &str) -> &'a Value {
        match value {
            Value::Object(m) => &m[name],
            other => panic!("expected an object, got {:?}", other),
        }
    }

    fn string(value: &Value) -> &str {
        match value {
            Value::String(s) => s,
            other => panic!("expected a string, got {:?}", other),
        }
    }

    #[test]
    fn test_escaping_twice_is_not_idempotent() {
        let once = escape_html("a & b");
        let twice = escape_html(&once);
        assert_eq!(once, "a &amp; b");
        assert_eq!(twice, "a &amp;amp; b");
        assert_ne!(once, twice);
    }

    #[test]
    fn test_entries_are_escaped_exactly_once() -> Result<()> {
        let posts = vec![post("p", "2020-01-05", "<p>a &amp; b</p>")];
        let ctx = context(&posts, "/atom.xml")?;

        let entries = match field(&ctx, "posts") {
            Value::Array(entries) => entries,
            other => panic!("expected an array, got {:?}", other),
        };
        let content = string(field(&entries[0], "content"));
        assert_eq!(content, "&lt;p&gt;a &amp;amp; b&lt;/p&gt;");
        // no double pass: the escaped ampersands were not re-escaped
        assert!(!content.contains("&amp;lt;"));

        // the shared post is untouched for page rendering
        assert_eq!(posts[0].content, "<p>a &amp; b</p>");
        Ok(())
    }

    #[test]
    fn test_updated_is_the_most_recent_timestamp() -> Result<()> {
        let posts = vec![
            post("new", "2021-03-02", ""),
            post("old", "2020-01-05", ""),
        ];
        let ctx = context(&posts, "/atom.xml")?;
        assert_eq!(string(field(&ctx, "updated")), "2021-03-02T00:00:00Z");
        assert_eq!(string(field(&ctx, "url")), "/atom.xml");
        Ok(())
    }

    #[test]
    fn test_zero_posts_is_an_error() {
        assert!(matches!(context(&[], "/atom.xml"), Err(Error::Empty)));
    }
}
