//! Exports the [`build_site`] function which stitches together the
//! high-level steps of a build: discovering and parsing the post sources,
//! aggregating them into the ordered and tag-grouped views, and writing
//! post pages, the landing page, tag pages, the navigation and footer
//! fragments, and the feed.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use gtmpl::Template;
use log::info;
use walkdir::WalkDir;

use crate::config::Config;
use crate::index;
use crate::post::{self, Parser};
use crate::write::{Error as WriteError, Templates, Writer};

/// Source files are recognized by extension.
const SOURCE_EXTENSIONS: &[&str] = &["md", "txt"];

/// Builds the whole site from a [`Config`]. Any failure aborts the build;
/// a half-built site with broken cross-links is worse than no build.
pub fn build_site(config: &Config) -> Result<()> {
    let parser = Parser::new(&config.tag_url_pattern, config.summary_paragraphs);

    let mut posts = Vec::new();
    for (path, url) in find_sources(&config.posts_source_directory, "posts")? {
        posts.push(parser.parse_file(&path, &url)?);
    }
    info!("parsed {} posts", posts.len());

    let posts = index::order_by_posted(posts)?;

    let templates = load_templates(&config.templates_directory)?;
    let writer = Writer {
        templates: &templates,
        site: &config.site,
        output_root: &config.output_directory,
        tag_path: &config.tag_path,
        feed_path: &config.feed_path,
    };

    for post in &posts {
        writer.write_post(post)?;
    }

    // drafts become pages too, but no aggregate view sees them
    if let Some(drafts_directory) = &config.drafts_source_directory {
        for (path, url) in find_sources(drafts_directory, "drafts")? {
            writer.write_post(&parser.parse_file(&path, &url)?)?;
        }
    }

    let entries = index::tag_index(&posts);
    writer.write_tag_pages(&entries)?;
    writer.write_nav(&entries)?;
    writer.write_footer()?;
    writer.write_landing(index::landing(&posts, config.landing_page_size))?;
    writer.write_feed(&posts)?;

    Ok(())
}

/// Walks `dir` for source files and derives each destination URL from the
/// source layout: `{dir}/2021/foo.txt` becomes `{prefix}/2021/foo`. The
/// result is sorted by path, so same-day posts order deterministically
/// between builds.
fn find_sources(dir: &Path, prefix: &str) -> Result<Vec<(PathBuf, String)>> {
    let mut sources = Vec::new();
    for result in WalkDir::new(dir) {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some(extension) if SOURCE_EXTENSIONS.contains(&extension) => {}
            _ => continue,
        }

        // strip_prefix can't fail: the walk is rooted at `dir`
        let relative = path.strip_prefix(dir).unwrap().with_extension("");
        let mut url = String::from(prefix);
        for component in relative.components() {
            let part = component
                .as_os_str()
                .to_str()
                .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?;
            url.push('/');
            url.push_str(part);
        }
        sources.push((path.to_owned(), url));
    }
    sources.sort();
    Ok(sources)
}

fn load_templates(dir: &Path) -> Result<Templates> {
    Ok(Templates {
        post: load_template(dir, "post.html")?,
        index: load_template(dir, "index.html")?,
        tag: load_template(dir, "tag.html")?,
        nav: load_template(dir, "nav.html")?,
        footer: load_template(dir, "footer.html")?,
        feed: load_template(dir, "atom.xml")?,
    })
}

// Loads one template file from the templates directory and parses it.
fn load_template(dir: &Path, name: &str) -> Result<Template> {
    use std::io::Read;
    let path = dir.join(name);
    let mut contents = String::new();
    File::open(&path)
        .map_err(|e| Error::OpenTemplateFile {
            path: path.clone(),
            err: e,
        })?
        .read_to_string(&mut contents)?;

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// The result of a site-building operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing,
/// ordering, writing, loading template files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(post::Error),

    /// Returned for errors building the aggregate views.
    Index(index::Error),

    /// Returned for errors writing pages, fragments, or the feed.
    Write(WriteError),

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(PathBuf),

    /// Returned for I/O errors while walking the source directories.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Index(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::OpenTemplateFile { path, err } => {
                write!(f, "opening template file `{}`: {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::InvalidFileName(path) => {
                write!(f, "source file name isn't valid UTF-8: `{}`", path.display())
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Index(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::InvalidFileName(_) => None,
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<post::Error> for Error {
    /// Converts a [`post::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator.
    fn from(err: post::Error) -> Error {
        Error::Parse(err)
    }
}

impl From<index::Error> for Error {
    /// Converts an [`index::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator.
    fn from(err: index::Error) -> Error {
        Error::Index(err)
    }
}

impl From<WriteError> for Error {
    /// Converts a [`WriteError`] into an [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator while walking source directories.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Site;
    use std::fs;
    use url::Url;

    fn write_file(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn write_theme(project: &Path) {
        write_file(
            &project.join("templates/post.html"),
            "<h2>{{.title}}</h2>\n{{.content}}",
        );
        write_file(
            &project.join("templates/index.html"),
            "<h1>{{.blog.title}}</h1>{{range .posts}}{{.summary}}{{end}}",
        );
        write_file(
            &project.join("templates/tag.html"),
            "<h1>{{.title}}</h1>{{range .posts}}{{.url}} {{end}}",
        );
        write_file(
            &project.join("templates/nav.html"),
            "{{range .tags}}<a href=\"{{.url}}\">{{.text}}</a>{{end}}",
        );
        write_file(
            &project.join("templates/footer.html"),
            "<footer>{{.blog.title}}</footer>",
        );
        write_file(
            &project.join("templates/atom.xml"),
            "<updated>{{.updated}}</updated>{{range .posts}}{{.content}}{{end}}",
        );
    }

    fn config(project: &Path, out: &Path) -> Config {
        Config {
            posts_source_directory: project.join("posts"),
            drafts_source_directory: Some(project.join("drafts")),
            templates_directory: project.join("templates"),
            output_directory: out.to_owned(),
            site: Site {
                root: String::new(),
                base: Url::parse("https://example.org").unwrap(),
                title: "example".to_owned(),
                feed: "/atom.xml".to_owned(),
            },
            tag_url_pattern: "/tags/%s.html".to_owned(),
            tag_path: "/tags/%s.html".to_owned(),
            feed_path: "/atom.xml".to_owned(),
            landing_page_size: 5,
            summary_paragraphs: 1,
        }
    }

    #[test]
    fn test_build_site() {
        let project_dir = tempfile::tempdir().unwrap();
        let project = project_dir.path();
        write_theme(project);
        write_file(
            &project.join("posts/2020/first.txt"),
            "title: First\ntags: a, b\nposted: 2020-01-05\n\n\
             First paragraph.\n\nSecond paragraph.\n",
        );
        write_file(
            &project.join("posts/2021/second.txt"),
            "title: Second\ntags: a\nposted: 2021-03-02\n\nOnly paragraph.\n",
        );
        write_file(
            &project.join("drafts/wip.txt"),
            "title: Work in progress\n\nDraft body.\n",
        );

        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path();
        build_site(&config(project, out)).unwrap();

        let post_page = fs::read_to_string(out.join("posts/2020/first.html")).unwrap();
        assert!(post_page.contains("<h2>First</h2>"));
        assert!(post_page.contains("Second paragraph."));
        assert!(out.join("posts/2021/second.html").exists());

        // drafts get pages and nothing else
        assert!(out.join("drafts/wip.html").exists());
        let landing = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(!landing.contains("Draft body."));

        // the landing page holds summaries, not full bodies
        assert!(landing.contains("First paragraph."));
        assert!(!landing.contains("Second paragraph."));

        let tag_a = fs::read_to_string(out.join("tags/a.html")).unwrap();
        assert!(tag_a.contains("posts/2021/second"));
        assert!(tag_a.contains("posts/2020/first"));
        assert!(out.join("tags/b.html").exists());

        let nav = fs::read_to_string(out.join("nav.html")).unwrap();
        assert!(nav.contains("/tags/a.html"));
        let footer = fs::read_to_string(out.join("footer.html")).unwrap();
        assert_eq!(footer, "<footer>example</footer>");

        let atom = fs::read_to_string(out.join("atom.xml")).unwrap();
        assert!(atom.contains("<updated>2021-03-02T00:00:00Z</updated>"));
        // feed entries carry escaped markup
        assert!(atom.contains("&lt;p&gt;Only paragraph.&lt;/p&gt;"));
    }

    #[test]
    fn test_build_fails_on_malformed_post() {
        let project_dir = tempfile::tempdir().unwrap();
        let project = project_dir.path();
        write_theme(project);
        write_file(
            &project.join("posts/bad.txt"),
            "title broken line\n\nBody.\n",
        );

        let out_dir = tempfile::tempdir().unwrap();
        let mut config = config(project, out_dir.path());
        config.drafts_source_directory = None;
        let err = build_site(&config).unwrap_err();
        // the offending source is named in the error
        assert!(format!("{}", err).contains("bad.txt"));
    }

    #[test]
    fn test_sources_are_sorted_and_urls_derived() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("2021/b.txt"), "x");
        write_file(&dir.path().join("2020/a.md"), "x");
        write_file(&dir.path().join("2020/skip.png"), "x");

        let sources = find_sources(dir.path(), "posts").unwrap();
        let urls: Vec<&str> = sources.iter().map(|(_, url)| url.as_str()).collect();
        assert_eq!(urls, vec!["posts/2020/a", "posts/2021/b"]);
    }
}
