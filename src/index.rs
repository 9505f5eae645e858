//! Aggregated views over parsed posts: the recency ordering behind the
//! landing page and feed, and the tag-weighted index behind per-tag pages
//! and the navigation tag cloud.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use gtmpl_value::Value;

use crate::post::Post;
use crate::tag::Tag;

/// Font-scale bounds for the tag cloud.
pub const MIN_SCALE: f64 = 0.75;
pub const MAX_SCALE: f64 = 1.6;

/// Sorts posts most-recent-first by `posted`. The sort is stable, so
/// same-day posts keep their input order. Every post must carry `posted`;
/// a missing date is reported with the post's URL instead of quietly
/// shortening the site.
pub fn order_by_posted(mut posts: Vec<Post>) -> Result<Vec<Post>> {
    for post in &posts {
        if post.posted.is_none() {
            return Err(Error::MissingPosted(post.url.clone()));
        }
    }
    posts.sort_by(|a, b| {
        // both present, checked above
        let a = a.posted.as_ref().unwrap().date;
        let b = b.posted.as_ref().unwrap().date;
        b.cmp(&a)
    });
    Ok(posts)
}

/// The slice of most recent posts shown on the landing page.
pub fn landing(ordered: &[Post], size: usize) -> &[Post] {
    &ordered[..ordered.len().min(size)]
}

/// One tag's aggregate entry: the posts carrying the tag, the post count,
/// and the font scale derived from that count.
pub struct TagEntry<'a> {
    pub tag: Tag,
    pub weight: usize,
    pub scale: f64,
    pub posts: Vec<&'a Post>,
}

impl TagEntry<'_> {
    /// Converts the entry for the navigation tag cloud: the tag's own
    /// fields plus `weight` and `scale`.
    pub fn to_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("text".to_owned(), Value::String(self.tag.text.clone()));
        m.insert("url".to_owned(), Value::String(self.tag.url.clone()));
        m.insert("weight".to_owned(), Value::from(self.weight as u64));
        m.insert("scale".to_owned(), Value::from(self.scale));
        Value::Object(m)
    }
}

/// Groups recency-ordered posts by tag. Posts without tags contribute to
/// no group. Entries come back ordered by tag text so nav and tag-page
/// output is deterministic; within each entry the posts keep their
/// recency order.
pub fn tag_index<'a>(ordered: &'a [Post]) -> Vec<TagEntry<'a>> {
    let mut groups: BTreeMap<&str, (&Tag, Vec<&'a Post>)> = BTreeMap::new();
    for post in ordered {
        for tag in &post.tags {
            groups
                .entry(tag.text.as_str())
                .or_insert_with(|| (tag, Vec::new()))
                .1
                .push(post);
        }
    }

    let max_weight = groups
        .values()
        .map(|(_, posts)| posts.len())
        .max()
        .unwrap_or(0);

    groups
        .into_iter()
        .map(|(_, (tag, posts))| {
            let weight = posts.len();
            TagEntry {
                tag: tag.clone(),
                weight,
                scale: scale(weight, max_weight),
                posts,
            }
        })
        .collect()
}

/// Linear weight-to-scale interpolation over `[MIN_SCALE, MAX_SCALE]`.
/// When the heaviest tag has a single post the relative-weight denominator
/// would be zero; that build renders every tag at [`MIN_SCALE`].
fn scale(weight: usize, max_weight: usize) -> f64 {
    let relative = if max_weight <= 1 {
        0.0
    } else {
        (weight - 1) as f64 / (max_weight - 1) as f64
    };
    MIN_SCALE + relative * (MAX_SCALE - MIN_SCALE)
}

/// Represents the result of an aggregation operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error building the aggregate views.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post reaches aggregation without a `posted` date.
    MissingPosted(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingPosted(url) => {
                write!(f, "post `{}` has no `posted` date to order it by", url)
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

    const PATTERN: &str = "/tags/%s.html";

    fn post(url: &str, posted: &str, tags: &[&str]) -> Post {
        Post {
            url: url.to_owned(),
            tags: tags.iter().map(|t| Tag::new(t, PATTERN)).collect(),
            posted: Some(Date::parse(posted).unwrap()),
            created: None,
            extra: HashMap::new(),
            content: String::new(),
            summary: String::new(),
        }
    }

    #[test]
    fn test_order_is_most_recent_first() -> Result<()> {
        let ordered = order_by_posted(vec![
            post("a", "2020-01-05", &[]),
            post("b", "2021-06-01", &[]),
            post("c", "2019-12-31", &[]),
        ])?;
        let urls: Vec<&str> = ordered.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "a", "c"]);
        Ok(())
    }

    #[test]
    fn test_order_is_stable_for_same_day_posts() -> Result<()> {
        let ordered = order_by_posted(vec![
            post("first", "2020-01-05", &[]),
            post("second", "2020-01-05", &[]),
            post("older", "2019-01-05", &[]),
            post("third", "2020-01-05", &[]),
        ])?;
        let urls: Vec<&str> = ordered.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["first", "second", "third", "older"]);
        Ok(())
    }

    #[test]
    fn test_order_requires_posted() {
        let mut missing = post("undated", "2020-01-05", &[]);
        missing.posted = None;
        match order_by_posted(vec![missing]) {
            Err(Error::MissingPosted(url)) => assert_eq!(url, "undated"),
            Ok(_) => panic!("expected a missing-date error"),
        }
    }

    #[test]
    fn test_landing_subset() -> Result<()> {
        let ordered = order_by_posted(vec![
            post("a", "2020-01-01", &[]),
            post("b", "2020-01-02", &[]),
            post("c", "2020-01-03", &[]),
        ])?;
        assert_eq!(landing(&ordered, 2).len(), 2);
        assert_eq!(landing(&ordered, 2)[0].url, "c");
        assert_eq!(landing(&ordered, 10).len(), 3);
        Ok(())
    }

    #[test]
    fn test_tag_weights_and_scales() {
        // weights {a: 3, b: 1, c: 1}; a spans the scale range
        let posts = vec![
            post("p1", "2020-01-03", &["a", "b"]),
            post("p2", "2020-01-02", &["a"]),
            post("p3", "2020-01-01", &["a", "c"]),
            post("p4", "2020-01-01", &[]),
        ];
        let entries = tag_index(&posts);
        let names: Vec<&str> = entries.iter().map(|e| e.tag.text.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        assert_eq!(entries[0].weight, 3);
        assert!((entries[0].scale - MAX_SCALE).abs() < 1e-9);
        assert_eq!(entries[1].weight, 1);
        assert!((entries[1].scale - MIN_SCALE).abs() < 1e-9);

        // group posts keep recency order
        let urls: Vec<&str> = entries[0].posts.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_every_tag_weighing_one_is_not_an_error() {
        let posts = vec![
            post("p1", "2020-01-01", &["a"]),
            post("p2", "2020-01-02", &["b"]),
        ];
        let entries = tag_index(&posts);
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert!((entry.scale - MIN_SCALE).abs() < 1e-9);
        }
    }

    #[test]
    fn test_equal_text_tags_share_a_group() {
        let posts = vec![
            post("p1", "2020-01-02", &["rust"]),
            post("p2", "2020-01-01", &["rust"]),
        ];
        let entries = tag_index(&posts);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].weight, 2);
    }

    #[test]
    fn test_empty_input_builds_an_empty_index() {
        assert!(tag_index(&[]).is_empty());
    }
}
