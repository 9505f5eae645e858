//! The library code for the `skald` static blog generator. A build is a
//! pure batch transform over a set of plain-text sources, broken into
//! three distinct steps:
//!
//! 1. Parsing posts from source files ([`crate::post`]): a metadata
//!    header is split from a markdown body, recognized fields get typed
//!    values ([`crate::date`], [`crate::tag`]), and the body becomes HTML
//!    content plus a bounded summary ([`crate::summary`],
//!    [`crate::markdown`]).
//! 2. Aggregating the parsed posts ([`crate::index`]): the
//!    recency-ordered sequence, the landing-page subset, and the
//!    tag-weighted index, plus the escaped feed view ([`crate::feed`]).
//! 3. Rendering everything through the template engine onto the output
//!    tree ([`crate::write`]), orchestrated by [`crate::build`].
//!
//! Of the three, the first carries the interesting invariants: parsing is
//! all-or-nothing per post and fail-fast per build, and a post's summary
//! is always derived from a prefix of the same body its content came
//! from.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod date;
pub mod feed;
pub mod index;
pub mod markdown;
pub mod post;
pub mod summary;
pub mod tag;
pub mod write;
