//! Build configuration: the `skald.yaml` project file and the paths and
//! site-wide values derived from it.

use anyhow::{anyhow, Result};
use gtmpl_value::Value;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Deserialize)]
struct LandingPageSize(usize);
impl Default for LandingPageSize {
    fn default() -> Self {
        LandingPageSize(5)
    }
}

#[derive(Deserialize)]
struct SummaryParagraphs(usize);
impl Default for SummaryParagraphs {
    fn default() -> Self {
        SummaryParagraphs(1)
    }
}

#[derive(Deserialize)]
struct TagPath(String);
impl Default for TagPath {
    fn default() -> Self {
        TagPath("/tags/%s.html".to_owned())
    }
}

#[derive(Deserialize)]
struct FeedPath(String);
impl Default for FeedPath {
    fn default() -> Self {
        FeedPath("/atom.xml".to_owned())
    }
}

/// The shape of the `skald.yaml` project file.
#[derive(Deserialize)]
struct Project {
    /// Path prefix under which the site is served, e.g. `/blog`. Empty
    /// for sites served at the domain root.
    #[serde(default)]
    site_root: String,

    /// Absolute site URL, for places that need absolute links (the feed).
    base_url: Url,

    /// Site title, available to every template.
    title: String,

    #[serde(default)]
    tag_path: TagPath,

    #[serde(default)]
    feed_path: FeedPath,

    #[serde(default)]
    landing_page_size: LandingPageSize,

    #[serde(default)]
    summary_paragraphs: SummaryParagraphs,
}

/// Site-wide values handed to every template as the `blog` global.
pub struct Site {
    /// Path prefix under which the site is served.
    pub root: String,

    /// Absolute site URL.
    pub base: Url,

    /// Site title.
    pub title: String,

    /// Site-root-relative URL of the feed, e.g. `/blog/atom.xml`.
    pub feed: String,
}

impl From<&Site> for Value {
    /// Converts the site globals into a template [`Value`].
    fn from(site: &Site) -> Value {
        use std::collections::HashMap;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("root".to_owned(), Value::String(site.root.clone()));
        m.insert("base".to_owned(), Value::String(site.base.to_string()));
        m.insert("title".to_owned(), Value::String(site.title.clone()));
        m.insert("feed".to_owned(), Value::String(site.feed.clone()));
        Value::Object(m)
    }
}

/// Everything a build needs: source and output locations, the site
/// globals, and the knobs for summaries and the landing page.
pub struct Config {
    /// Directory of post sources.
    pub posts_source_directory: PathBuf,

    /// Optional directory of draft sources; drafts are rendered as pages
    /// but excluded from every aggregate view.
    pub drafts_source_directory: Option<PathBuf>,

    /// Directory holding the page, fragment, and feed templates.
    pub templates_directory: PathBuf,

    /// Root of the generated output tree.
    pub output_directory: PathBuf,

    pub site: Site,

    /// URL pattern for tag pages (site root + tag path); `%s` receives
    /// the percent-encoded tag text.
    pub tag_url_pattern: String,

    /// Output path pattern for tag pages, relative to the output root.
    pub tag_path: String,

    /// Output path of the feed, relative to the output root.
    pub feed_path: String,

    /// Number of posts on the landing page.
    pub landing_page_size: usize,

    /// Number of body paragraphs in a summary when no marker is present.
    pub summary_paragraphs: usize,
}

impl Config {
    /// Finds `skald.yaml` in `dir` or the nearest parent directory and
    /// loads it.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let path = dir.join("skald.yaml");
        if path.exists() {
            Config::from_project_file(&path, output_directory)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "could not find `skald.yaml` in any parent directory"
                )),
            }
        }
    }

    /// Loads configuration from a project file. Source, drafts, and
    /// template directories are resolved relative to the file's parent.
    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("opening project file `{}`: {}", path.display(), e))?;
        let project: Project = serde_yaml::from_reader(file)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "cannot get parent directory of project file `{}`",
                path.display()
            )
        })?;

        let drafts = project_root.join("drafts");
        let tag_url_pattern = format!("{}{}", project.site_root, project.tag_path.0);
        let feed = format!("{}{}", project.site_root, project.feed_path.0);
        Ok(Config {
            posts_source_directory: project_root.join("posts"),
            drafts_source_directory: if drafts.is_dir() { Some(drafts) } else { None },
            templates_directory: project_root.join("templates"),
            output_directory: output_directory.to_owned(),
            tag_url_pattern,
            tag_path: project.tag_path.0,
            feed_path: project.feed_path.0,
            site: Site {
                root: project.site_root,
                base: project.base_url,
                title: project.title,
                feed,
            },
            landing_page_size: project.landing_page_size.0,
            summary_paragraphs: project.summary_paragraphs.0,
        })
    }
}
