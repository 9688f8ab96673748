//! Creates draft post stubs. A draft is a metadata block with the given
//! title and today's date, the `---` separator, and an empty body, named
//! after the slugified title. Drafts don't participate in the build.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Creates `{drafts_directory}/{slug}.md` and returns its path. The drafts
/// directory is created if absent; an existing draft with the same slug is
/// overwritten silently.
pub fn create_draft(
    title: &str,
    drafts_directory: &Path,
) -> io::Result<PathBuf> {
    fs::create_dir_all(drafts_directory)?;

    let path = drafts_directory.join(format!("{}.md", slug::slugify(title)));
    let date = chrono::Local::now().format("%Y-%m-%d");
    fs::write(&path, format!("title: {}\ndate: {}\n---\n\n", title, date))?;
    Ok(path)
}
