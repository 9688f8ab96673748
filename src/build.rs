//! Exports the [`build_site`] function which stitches together the
//! high-level steps of building the output site: parsing the post sources
//! ([`crate::post`]), rendering post and index pages ([`crate::write`]),
//! and invoking the external CSS builder for the configured stylesheets.
//!
//! The output directory is wholly destroyed and regenerated on every build.
//! Source and template parsing happen before the destructive step so a
//! broken template can't take the previous build down with it.

use crate::config::{Project, SiteConfig};
use crate::post::{self, Post};
use crate::write::{Error as WriteError, Writer};
use gtmpl::Template;
use std::fmt;
use std::fs::{self, read_dir, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{info, warn};

const MARKDOWN_EXTENSION: &str = ".md";

/// Builds the site described by `project` and `site`. This parses every
/// post source (reporting and skipping malformed ones), wipes the output
/// directory, writes one page per post plus the index (posts sorted by date,
/// most recent first), and finally runs the external CSS build. The HTML is
/// on disk before the CSS step runs, so a CSS failure leaves a usable tree.
pub fn build_site(project: &Project, site: &SiteConfig) -> Result<()> {
    let mut posts = collect_posts(&project.posts_directory)?;

    let post_template = parse_template(&project.post_template)?;
    let index_template = parse_template(&project.index_template)?;

    clean_directory(&project.output_directory);
    fs::create_dir_all(project.output_directory.join("posts"))?;

    posts.sort_by(|a, b| b.metadata.date.cmp(&a.metadata.date));

    let writer = Writer {
        post_template: &post_template,
        index_template: &index_template,
        site,
        output_directory: &project.output_directory,
    };
    for post in &posts {
        writer.write_post(post)?;
    }
    let summaries: Vec<_> = posts.iter().map(Post::summarize).collect();
    writer.write_index(&summaries)?;
    info!(
        "rendered {} posts into `{}`",
        posts.len(),
        project.output_directory.display(),
    );

    for style in &project.styles {
        build_css(
            &style.source,
            &project.output_directory.join(&style.output),
        )?;
    }

    Ok(())
}

/// Enumerates the `.md` files in `source_directory` and parses each into a
/// [`Post`]. A source that fails to parse is logged and left out; the rest
/// of the build proceeds without it.
fn collect_posts(source_directory: &Path) -> Result<Vec<Post>> {
    let mut posts = Vec::new();
    for result in read_dir(source_directory)? {
        let entry = result?;
        let os_file_name = entry.file_name();
        let file_name = os_file_name.to_string_lossy();
        if !file_name.ends_with(MARKDOWN_EXTENSION) {
            continue;
        }
        match parse_entry(&file_name, &entry.path()) {
            Ok(post) => posts.push(post),
            Err(err) => warn!("skipping `{}`: {}", file_name, err),
        }
    }
    Ok(posts)
}

fn parse_entry(file_name: &str, path: &Path) -> post::Result<Post> {
    let slug = file_name.trim_end_matches(MARKDOWN_EXTENSION);
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    Post::from_str(slug, &contents)
}

// Loads the template file contents and parses them into a template.
fn parse_template(path: &Path) -> Result<Template> {
    let mut contents = String::new();
    File::open(path)
        .map_err(|err| Error::OpenTemplate {
            path: path.to_owned(),
            err,
        })?
        .read_to_string(&mut contents)?;

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// Deletes every entry in `dir`, files and subdirectories alike. Failures
/// are logged per entry and never abort the build; a directory that doesn't
/// exist yet has nothing to clean.
fn clean_directory(dir: &Path) {
    let entries = match read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("listing `{}`: {}", dir.display(), err);
            }
            return;
        }
    };
    for result in entries {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("reading entry in `{}`: {}", dir.display(), err);
                continue;
            }
        };
        let path = entry.path();
        let removed = match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => fs::remove_dir_all(&path),
            _ => fs::remove_file(&path),
        };
        if let Err(err) = removed {
            warn!("deleting `{}`: {}", path.display(), err);
        }
    }
}

/// Runs the external CSS builder for one stylesheet.
fn build_css(source: &Path, output: &Path) -> Result<()> {
    let status = Command::new("npx")
        .arg("tailwindcss")
        .arg("build")
        .arg(source)
        .arg("-o")
        .arg(output)
        .status()
        .map_err(|err| Error::Css {
            stylesheet: source.to_owned(),
            err,
        })?;
    match status.success() {
        true => Ok(()),
        false => Err(Error::CssExit {
            stylesheet: source.to_owned(),
            status,
        }),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during writing pages,
/// loading or parsing template files, running the CSS builder, and other
/// I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while opening template files.
    OpenTemplate { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned when the CSS builder can't be spawned.
    Css {
        stylesheet: PathBuf,
        err: std::io::Error,
    },

    /// Returned when the CSS builder exits with a failure status.
    CssExit {
        stylesheet: PathBuf,
        status: ExitStatus,
    },

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Write(err) => err.fmt(f),
            Error::OpenTemplate { path, err } => {
                write!(f, "opening template file `{}`: {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Css { stylesheet, err } => write!(
                f,
                "building stylesheet `{}`: {}",
                stylesheet.display(),
                err,
            ),
            Error::CssExit { stylesheet, status } => write!(
                f,
                "building stylesheet `{}`: builder exited with {}",
                stylesheet.display(),
                status,
            ),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write(err) => Some(err),
            Error::OpenTemplate { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Css { stylesheet: _, err } => Some(err),
            Error::CssExit { .. } => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scaffold(root: &Path) -> Project {
        let project = Project {
            config_file: root.join("config/config.json"),
            posts_directory: root.join("markdown/post"),
            drafts_directory: root.join("markdown/draft"),
            output_directory: root.join("output"),
            post_template: root.join("templates/post.html"),
            index_template: root.join("templates/index.html"),
            // no external tool runs in tests
            styles: Vec::new(),
        };
        fs::create_dir_all(&project.posts_directory).unwrap();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::write(
            &project.post_template,
            "<article data-title=\"{{.post.title}}\">\
             {{.post.content}}</article>",
        )
        .unwrap();
        fs::write(
            &project.index_template,
            "{{range .posts}}<a href=\"{{.link}}\">{{.title}}</a>{{end}}",
        )
        .unwrap();
        project
    }

    #[test]
    fn test_build_site() {
        let dir = tempfile::tempdir().unwrap();
        let project = scaffold(dir.path());
        fs::write(
            project.posts_directory.join("hello-world.md"),
            "title: Hello World\ndate: 2024-01-01\n---\n\n\
             # Hi\n\nSome *text*.\n",
        )
        .unwrap();

        // stale entries from a previous build must not survive
        fs::create_dir_all(project.output_directory.join("stale")).unwrap();
        fs::write(project.output_directory.join("old.txt"), "old").unwrap();

        build_site(&project, &SiteConfig::default()).unwrap();

        let page = fs::read_to_string(
            project.output_directory.join("posts/hello-world.html"),
        )
        .unwrap();
        assert!(page.contains("<h1 class=\"heading1\">Hi</h1>"));
        assert!(page.contains("<em class=\"italic\">text</em>"));

        let index = fs::read_to_string(
            project.output_directory.join("index.html"),
        )
        .unwrap();
        assert_eq!(
            index,
            "<a href=\"posts/hello-world.html\">Hello World</a>",
        );

        assert!(!project.output_directory.join("old.txt").exists());
        assert!(!project.output_directory.join("stale").exists());
    }

    #[test]
    fn test_malformed_post_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let project = scaffold(dir.path());
        fs::write(
            project.posts_directory.join("good.md"),
            "title: Good\ndate: 2024-01-01\n---\nfine\n",
        )
        .unwrap();
        fs::write(
            project.posts_directory.join("bad.md"),
            "title: Bad\nno separator here\n",
        )
        .unwrap();

        build_site(&project, &SiteConfig::default()).unwrap();

        let index = fs::read_to_string(
            project.output_directory.join("index.html"),
        )
        .unwrap();
        assert!(index.contains("Good"));
        assert!(!index.contains("Bad"));
        assert!(project
            .output_directory
            .join("posts/good.html")
            .exists());
        assert!(!project
            .output_directory
            .join("posts/bad.html")
            .exists());
    }

    #[test]
    fn test_index_sorted_by_date_descending() {
        let dir = tempfile::tempdir().unwrap();
        let project = scaffold(dir.path());
        fs::write(
            project.posts_directory.join("older.md"),
            "title: Older\ndate: 2023-06-15\n---\nold\n",
        )
        .unwrap();
        fs::write(
            project.posts_directory.join("newer.md"),
            "title: Newer\ndate: 2024-02-29\n---\nnew\n",
        )
        .unwrap();

        build_site(&project, &SiteConfig::default()).unwrap();

        let index = fs::read_to_string(
            project.output_directory.join("index.html"),
        )
        .unwrap();
        assert_eq!(
            index,
            "<a href=\"posts/newer.html\">Newer</a>\
             <a href=\"posts/older.html\">Older</a>",
        );
    }
}
