use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Site-level settings from `config/config.json`. Every field is optional
/// and defaults to the empty string.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct SiteConfig {
    #[serde(default)]
    pub site_name: String,

    #[serde(default)]
    pub author_name: String,

    #[serde(default)]
    pub author_website: String,
}

impl SiteConfig {
    /// Loads the site config from a JSON file. Unlike post metadata, a
    /// missing or unparsable config file fails the whole command.
    pub fn from_file(path: &Path) -> Result<SiteConfig> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// The conventional project layout. Loaded once at process start and passed
/// by reference into each component.
pub struct Project {
    pub config_file: PathBuf,
    pub posts_directory: PathBuf,
    pub drafts_directory: PathBuf,
    pub output_directory: PathBuf,
    pub post_template: PathBuf,
    pub index_template: PathBuf,
    pub styles: Vec<Stylesheet>,
}

/// One stylesheet for the external CSS builder: a source file and its
/// output path relative to the output directory.
pub struct Stylesheet {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl Default for Project {
    fn default() -> Project {
        Project {
            config_file: PathBuf::from("config/config.json"),
            posts_directory: PathBuf::from("markdown/post"),
            drafts_directory: PathBuf::from("markdown/draft"),
            output_directory: PathBuf::from("output"),
            post_template: PathBuf::from("templates/post.html"),
            index_template: PathBuf::from("templates/index.html"),
            styles: vec![
                Stylesheet {
                    source: PathBuf::from("style/post.css"),
                    output: PathBuf::from("posts/post.css"),
                },
                Stylesheet {
                    source: PathBuf::from("style/index.css"),
                    output: PathBuf::from("index.css"),
                },
            ],
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the site config.
#[derive(Debug)]
pub enum Error {
    /// Returned when the config file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the config file isn't valid JSON.
    Parse(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "opening config file `{}`: {}", path.display(), err)
            }
            Error::Parse(err) => write!(f, "parsing config file: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Parse(err)
    }
}
