//! The library code for the `mdpress` blog generator. The architecture can
//! be generally broken down into three distinct steps:
//!
//! 1. Parsing posts from source files on disk ([`crate::post`]): each
//!    source splits into a metadata block and a markdown body, and the body
//!    is converted into a classed HTML fragment ([`crate::markdown`]) in
//!    which every recognized element kind carries a semantic CSS class, so
//!    the stylesheets can target `heading1`, `paragraph`, `codeBlock`, and
//!    friends instead of bare tag names.
//! 2. Rendering pages to disk ([`crate::write`]): each post goes through
//!    the post template, and the collected post summaries go through the
//!    index template.
//! 3. Orchestration ([`crate::build`]): full-rebuild semantics, where the
//!    output directory is wiped and regenerated, then the external CSS
//!    builder is invoked for the site's stylesheets.
//!
//! Alongside the pipeline, [`crate::draft`] stubs out new posts in the
//! drafts directory and [`crate::config`] carries the site settings and
//! project layout, loaded once and passed by reference.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod draft;
pub mod markdown;
pub mod post;
pub mod write;
