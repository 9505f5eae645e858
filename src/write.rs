//! Writes the rendered site to disk. Thin by design: everything here maps
//! already-aggregated data onto output paths and hands contexts to the
//! template engine. Every context receives the `blog` globals next to its
//! page-specific data.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use gtmpl::{Context, Template};
use gtmpl_value::Value;
use log::info;

use crate::config::Site;
use crate::feed;
use crate::index::TagEntry;
use crate::post::Post;

/// The templates for every page kind, loaded from the templates
/// directory by [`crate::build`].
pub struct Templates {
    pub post: Template,
    pub index: Template,
    pub tag: Template,
    pub nav: Template,
    pub footer: Template,
    pub feed: Template,
}

/// Responsible for templating and writing HTML pages, fragments, and the
/// feed to disk.
pub struct Writer<'a> {
    pub templates: &'a Templates,

    /// Site-wide values injected into every context as `blog`.
    pub site: &'a Site,

    /// Root directory of the output tree.
    pub output_root: &'a Path,

    /// Output path pattern for tag pages, relative to the output root;
    /// `%s` receives the percent-encoded tag text.
    pub tag_path: &'a str,

    /// Output path of the feed, relative to the output root.
    pub feed_path: &'a str,
}

impl Writer<'_> {
    /// Renders one context into `relative` under the output root,
    /// creating parent directories as needed.
    fn render(&self, template: &Template, mut value: Value, relative: &str) -> Result<()> {
        if let Value::Object(m) = &mut value {
            m.insert("blog".to_owned(), Value::from(self.site));
        }
        let path = self.output_root.join(relative.trim_start_matches('/'));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let context = Context::from(value)?;
        template.execute(&mut File::create(&path)?, &context)?;
        Ok(())
    }

    /// Renders one post page at `{url}.html`.
    pub fn write_post(&self, post: &Post) -> Result<()> {
        info!("writing {}", post.url);
        let relative = format!("{}.html", post.url);
        self.render(&self.templates.post, post.to_value(), &relative)
    }

    /// Renders the landing page with the most recent posts.
    pub fn write_landing(&self, posts: &[Post]) -> Result<()> {
        info!("writing landing page");
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String("Index".to_owned()));
        m.insert(
            "posts".to_owned(),
            Value::Array(posts.iter().map(|p| p.to_value()).collect()),
        );
        self.render(&self.templates.index, Value::Object(m), "index.html")
    }

    /// Renders one page per tag, listing the posts carrying that tag.
    pub fn write_tag_pages(&self, entries: &[TagEntry]) -> Result<()> {
        for entry in entries {
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("title".to_owned(), Value::String(entry.tag.text.clone()));
            m.insert("tag".to_owned(), entry.to_value());
            m.insert(
                "posts".to_owned(),
                Value::Array(entry.posts.iter().map(|p| p.to_value()).collect()),
            );
            let relative = self
                .tag_path
                .replacen("%s", &urlencoding::encode(&entry.tag.text), 1);
            self.render(&self.templates.tag, Value::Object(m), &relative)?;
        }
        Ok(())
    }

    /// Renders the navigation fragment with the tag cloud.
    pub fn write_nav(&self, entries: &[TagEntry]) -> Result<()> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "tags".to_owned(),
            Value::Array(entries.iter().map(|e| e.to_value()).collect()),
        );
        self.render(&self.templates.nav, Value::Object(m), "nav.html")
    }

    /// Renders the footer fragment from the site globals alone.
    pub fn write_footer(&self) -> Result<()> {
        self.render(
            &self.templates.footer,
            Value::Object(HashMap::new()),
            "footer.html",
        )
    }

    /// Renders the feed from recency-ordered posts. The entries are
    /// escaped copies, so this can run after the pages without touching
    /// what they rendered from.
    pub fn write_feed(&self, ordered: &[Post]) -> Result<()> {
        info!("writing feed");
        let context = feed::context(ordered, &self.site.feed)?;
        self.render(&self.templates.feed, context, self.feed_path)
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error assembling the feed view.
    Feed(feed::Error),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`].
    /// This allows us to use the `?` operator for fallible template
    /// operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<feed::Error> for Error {
    /// Converts a [`feed::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator when assembling the feed context.
    fn from(err: feed::Error) -> Error {
        Error::Feed(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
