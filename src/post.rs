//! Defines the [`Post`], [`Parser`], and [`Error`] types, and the logic
//! for parsing posts from source documents into memory. A source document
//! is a metadata header, a blank line, and a markdown body:
//!
//! ```text
//! title: Hello, world!
//! tags: greeting, meta
//! posted: 2021-04-16
//!
//! # Hello
//!
//! World
//! ```
//!
//! Parsing is all-or-nothing: a malformed header or date fails the whole
//! post (and with it the build) rather than producing a partial record
//! that downstream indexes would silently drop.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::Path;

use gtmpl_value::Value;

use crate::date::Date;
use crate::markdown;
use crate::summary;
use crate::tag::Tag;

/// One blog entry, parsed from a single source document. Immutable once
/// constructed; the feed view derives escaped copies rather than touching
/// these.
#[derive(Clone, Debug)]
pub struct Post {
    /// The site-root-relative path at which the rendered page is viewable.
    /// Supplied by the caller, since it reflects the output layout rather
    /// than anything in the document.
    pub url: String,

    /// Tags from the `tags` header field, in source order. Empty when the
    /// field is absent.
    pub tags: Vec<Tag>,

    /// Publication date from the `posted` header field.
    pub posted: Option<Date>,

    /// Original authoring date from the `created` header field.
    pub created: Option<Date>,

    /// All unrecognized header fields: lower-cased keys, trimmed raw
    /// values. The field set is open-ended so templates can use custom
    /// metadata without code changes here.
    pub extra: HashMap<String, String>,

    /// Full-body HTML.
    pub content: String,

    /// HTML of the leading excerpt, bounded by [`crate::summary`].
    pub summary: String,
}

impl Post {
    /// Converts the post into a template context [`Value`]. Open-ended
    /// header fields appear as top-level keys next to the typed ones;
    /// `tags`, `posted`, and `created` are present only when the post
    /// carries them.
    pub fn to_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        for (key, value) in &self.extra {
            m.insert(key.clone(), Value::String(value.clone()));
        }
        m.insert("url".to_owned(), Value::String(self.url.clone()));
        m.insert("content".to_owned(), Value::String(self.content.clone()));
        m.insert("summary".to_owned(), Value::String(self.summary.clone()));
        if !self.tags.is_empty() {
            m.insert(
                "tags".to_owned(),
                Value::Array(self.tags.iter().map(Value::from).collect()),
            );
        }
        if let Some(posted) = &self.posted {
            m.insert("posted".to_owned(), posted.into());
        }
        if let Some(created) = &self.created {
            m.insert("created".to_owned(), created.into());
        }
        Value::Object(m)
    }
}

/// Parses [`Post`] objects from source documents.
pub struct Parser<'a> {
    /// URL pattern for tag index pages; `%s` receives the percent-encoded
    /// tag text.
    tag_url_pattern: &'a str,

    /// Number of body paragraphs in a summary when no explicit marker is
    /// present.
    summary_paragraphs: usize,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(tag_url_pattern: &'a str, summary_paragraphs: usize) -> Parser<'a> {
        Parser {
            tag_url_pattern,
            summary_paragraphs,
        }
    }

    /// Reads and parses the document at `path`. Errors are annotated with
    /// the path, so a failing post is identifiable from the build output.
    pub fn parse_file(&self, path: &Path, url: &str) -> Result<Post> {
        match self.read_and_parse(path, url) {
            Ok(post) => Ok(post),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn read_and_parse(&self, path: &Path, url: &str) -> Result<Post> {
        use std::io::Read;
        let mut source = String::new();
        File::open(path)?.read_to_string(&mut source)?;
        self.parse(&source, url)
    }

    /// Parses a full source document. `url` is the destination the
    /// rendered page will be served from.
    pub fn parse(&self, source: &str, url: &str) -> Result<Post> {
        let (header, body) = split_document(source)?;

        let mut post = Post {
            url: url.to_owned(),
            tags: Vec::new(),
            posted: None,
            created: None,
            extra: HashMap::new(),
            content: String::new(),
            summary: String::new(),
        };

        for line in header.lines() {
            let (key, value) = split_field(line)?;
            // Recognized keys get typed values; everything else passes
            // through for templates. Duplicate keys: last one wins.
            match key.as_str() {
                "tags" => post.tags = self.parse_tags(value),
                "posted" => post.posted = Some(parse_date("posted", value)?),
                "created" => post.created = Some(parse_date("created", value)?),
                _ => {
                    post.extra.insert(key, value.to_owned());
                }
            }
        }

        post.content = markdown::to_html(body)?;
        post.summary = markdown::to_html(summary::extract(body, self.summary_paragraphs))?;
        Ok(post)
    }

    /// Splits a raw `tags` value into tags: on commas when any comma is
    /// present, otherwise on whitespace. `foo, bar baz` is two tags and
    /// `foo bar` is also two; the two rules never mix within one field.
    fn parse_tags(&self, raw: &str) -> Vec<Tag> {
        let tokens: Vec<&str> = if raw.contains(',') {
            raw.split(',').map(str::trim).collect()
        } else {
            raw.split_whitespace().collect()
        };
        tokens
            .into_iter()
            .filter(|token| !token.is_empty())
            .map(|token| Tag::new(token, self.tag_url_pattern))
            .collect()
    }
}

/// Splits a document at the first blank (whitespace-only) line: metadata
/// header above, body below. The split is purely positional, so a body
/// that happens to open with `[label]: url` reference lines is never
/// mistaken for more metadata.
fn split_document(source: &str) -> Result<(&str, &str)> {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        if line.trim().is_empty() {
            return Ok((&source[..offset], &source[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(Error::MissingSeparator)
}

/// Splits one `key: value` header line at the first colon only; values
/// are free to contain further colons (URLs, times). The key is
/// case-folded to lower case and both sides are trimmed.
fn split_field(line: &str) -> Result<(String, &str)> {
    match line.split_once(':') {
        Some((key, value)) => Ok((key.trim().to_lowercase(), value.trim())),
        None => Err(Error::MetadataSyntax(line.trim_end().to_owned())),
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<Date> {
    Date::parse(value).map_err(|_| Error::Date {
        field,
        value: value.to_owned(),
    })
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a document has no blank line separating the metadata
    /// header from the body.
    MissingSeparator,

    /// Returned when a metadata line is missing its colon.
    MetadataSyntax(String),

    /// Returned when a `posted`/`created` value is not a `YYYY-MM-DD`
    /// date.
    Date {
        field: &'static str,
        value: String,
    },

    /// Returned when the markdown engine failed on this post's body.
    Markdown(markdown::Error),

    /// Returned for I/O errors reading the source file.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingSeparator => {
                write!(f, "missing blank line between metadata and body")
            }
            Error::MetadataSyntax(line) => {
                write!(f, "metadata line without `:`: `{}`", line)
            }
            Error::Date { field, value } => {
                write!(f, "invalid `{}` date `{}`, expected YYYY-MM-DD", field, value)
            }
            Error::Markdown(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingSeparator => None,
            Error::MetadataSyntax(_) => None,
            Error::Date { .. } => None,
            Error::Markdown(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<markdown::Error> for Error {
    /// Converts a [`markdown::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator around the conversion calls.
    fn from(err: markdown::Error) -> Error {
        Error::Markdown(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
