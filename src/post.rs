//! Defines the [`Post`], [`Metadata`], and [`PostSummary`] types, and the
//! logic for parsing a post source into them. A post source is a metadata
//! block of `key: value` lines, a line containing exactly `---`, and a
//! markdown body; [`split_front_matter`] separates the two and
//! [`Post::from_str`] deserializes the metadata and converts the body into
//! its classed-HTML form.

use crate::markdown;
use gtmpl::Value;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

const SEPARATOR: &str = "---";

/// Splits a post source into its metadata block and markdown body at the
/// first line containing only `---`. Returns the text before the separator
/// line and the text after it; the separator line itself belongs to neither.
pub fn split_front_matter(input: &str) -> Result<(&str, &str)> {
    let mut offset = 0;
    for line in input.split_inclusive('\n') {
        if line.trim_end() == SEPARATOR {
            return Ok((&input[..offset], &input[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(Error::MissingSeparator)
}

/// The parsed metadata block of a post. Keys beyond `title` and `date` are
/// collected in `extra` and handed through to the post template.
#[derive(Deserialize, Default, Debug, PartialEq)]
pub struct Metadata {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub date: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Metadata {
    /// Parses a metadata block. An all-whitespace block is valid and yields
    /// empty-string fields rather than an error.
    pub fn from_str(input: &str) -> Result<Metadata> {
        if input.trim().is_empty() {
            return Ok(Metadata::default());
        }
        Ok(serde_yaml::from_str(input)?)
    }
}

/// A fully parsed post: metadata plus the classed-HTML rendition of the
/// markdown body. The `slug` is the source file's stem and names the output
/// file.
#[derive(Debug, PartialEq)]
pub struct Post {
    pub slug: String,
    pub metadata: Metadata,
    pub body: String,
}

impl Post {
    /// Parses a single [`Post`] from a `slug` and the source text.
    pub fn from_str(slug: &str, input: &str) -> Result<Post> {
        let (metadata, body) = split_front_matter(input)?;
        let mut post = Post {
            slug: slug.to_owned(),
            metadata: Metadata::from_str(metadata)?,
            body: String::new(),
        };
        markdown::push_html(&mut post.body, body)?;
        Ok(post)
    }

    pub fn summarize(&self) -> PostSummary {
        PostSummary {
            title: self.metadata.title.clone(),
            date: self.metadata.date.clone(),
            link: format!("posts/{}.html", self.slug),
        }
    }
}

/// The index-page record for one post.
#[derive(Clone, Debug, PartialEq)]
pub struct PostSummary {
    pub title: String,
    pub date: String,
    pub link: String,
}

impl From<&PostSummary> for Value {
    /// Converts [`PostSummary`]s into [`Value`]s for templating.
    fn from(summary: &PostSummary) -> Value {
        use std::collections::HashMap;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(summary.title.clone()));
        m.insert("date".to_owned(), Value::String(summary.date.clone()));
        m.insert("link".to_owned(), Value::String(summary.link.clone()));
        Value::Object(m)
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] from its source text.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source has no line containing only `---`.
    MissingSeparator,

    /// Returned when the metadata block doesn't parse as a mapping.
    Metadata(serde_yaml::Error),

    /// Returned for I/O errors reading a source file.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingSeparator => {
                write!(f, "missing `{}` separator line", SEPARATOR)
            }
            Error::Metadata(err) => write!(f, "parsing metadata: {}", err),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingSeparator => None,
            Error::Metadata(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for metadata deserialization.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Metadata(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
