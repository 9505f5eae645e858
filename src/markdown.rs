//! The markdown collaborator: a pure function from body text to HTML.
//! Everything else in the crate treats conversion as opaque; the only
//! contract is that a non-blank source produces non-empty HTML.

use pulldown_cmark::{html, Options, Parser};
use std::fmt;

/// Converts markdown `source` to an HTML string. Smart punctuation covers
/// the curly quotes and dashes posts rely on; footnotes, strikethrough,
/// tables, and task lists are enabled as well.
pub fn to_html(source: &str) -> Result<String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut output = String::new();
    html::push_html(&mut output, Parser::new_ext(source, options));
    if output.is_empty() && !source.trim().is_empty() {
        return Err(Error::EmptyOutput);
    }
    Ok(output)
}

/// Represents the result of a markdown conversion.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure of the markdown engine.
#[derive(Debug)]
pub enum Error {
    /// Returned when conversion produced no HTML for a non-blank source.
    EmptyOutput,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EmptyOutput => {
                write!(f, "markdown conversion produced no output")
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
