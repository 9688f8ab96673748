//! Responsible for templating and writing HTML pages to disk: one page per
//! [`Post`] under `posts/`, plus the site index. Templates are `gtmpl`
//! templates; the context shapes handed to them are the crate's public
//! contract (see [`Writer::write_post`] and [`Writer::write_index`]).

use crate::config::SiteConfig;
use crate::post::{Post, PostSummary};
use gtmpl::{Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

/// Renders [`Post`]s and the index through their templates and writes the
/// results into the output directory.
pub struct Writer<'a> {
    /// The template for post pages.
    pub post_template: &'a Template,

    /// The template for the index page.
    pub index_template: &'a Template,

    /// The site settings exposed to both templates.
    pub site: &'a SiteConfig,

    /// The output root. Post pages land in `posts/` beneath it; the index
    /// lands directly in it.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Templates a single [`Post`] and writes it to
    /// `{output_directory}/posts/{slug}.html`. The template sees a `post`
    /// object with fields `title`, `date`, `content` (the classed HTML
    /// fragment, inserted raw), `author_name`, and `author_website`, plus
    /// any scalar extra metadata keys. An existing file with the same name
    /// is overwritten silently.
    pub fn write_post(&self, post: &Post) -> Result<()> {
        let path = self
            .output_directory
            .join("posts")
            .join(format!("{}.html", post.slug));
        self.render(self.post_template, self.post_value(post), &path)
    }

    /// Templates the index page and writes it to
    /// `{output_directory}/index.html`. The template sees `site_name`,
    /// `author_name`, `author_website`, and `posts` (a list of objects with
    /// `title`, `date`, and `link`).
    pub fn write_index(&self, posts: &[PostSummary]) -> Result<()> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "site_name".to_owned(),
            Value::String(self.site.site_name.clone()),
        );
        m.insert(
            "author_name".to_owned(),
            Value::String(self.site.author_name.clone()),
        );
        m.insert(
            "author_website".to_owned(),
            Value::String(self.site.author_website.clone()),
        );
        m.insert(
            "posts".to_owned(),
            Value::Array(posts.iter().map(Value::from).collect()),
        );
        let path = self.output_directory.join("index.html");
        self.render(self.index_template, Value::Object(m), &path)
    }

    fn render(
        &self,
        template: &Template,
        value: Value,
        path: &Path,
    ) -> Result<()> {
        template.execute(
            &mut File::create(path)?,
            &gtmpl::Context::from(value).unwrap(),
        )?;
        Ok(())
    }

    fn post_value(&self, post: &Post) -> Value {
        let mut fields: HashMap<String, Value> = HashMap::new();
        for (key, value) in &post.metadata.extra {
            if let Some(value) = scalar_value(value) {
                fields.insert(key.clone(), value);
            }
        }
        fields.insert(
            "title".to_owned(),
            Value::String(post.metadata.title.clone()),
        );
        fields.insert(
            "date".to_owned(),
            Value::String(post.metadata.date.clone()),
        );
        fields.insert("content".to_owned(), Value::String(post.body.clone()));
        fields.insert(
            "author_name".to_owned(),
            Value::String(self.site.author_name.clone()),
        );
        fields.insert(
            "author_website".to_owned(),
            Value::String(self.site.author_website.clone()),
        );

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("post".to_owned(), Value::Object(fields));
        Value::Object(m)
    }
}

/// Converts a scalar metadata value into a template [`Value`]. Nested
/// sequences and mappings aren't exposed to templates.
fn scalar_value(value: &serde_yaml::Value) -> Option<Value> {
    match value {
        serde_yaml::Value::String(s) => Some(Value::String(s.clone())),
        serde_yaml::Value::Bool(b) => Some(Value::from(*b)),
        serde_yaml::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(Value::from(i)),
            (None, Some(f)) => Some(Value::from(f)),
            (None, None) => None,
        },
        _ => None,
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

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

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
