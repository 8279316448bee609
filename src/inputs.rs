/*!
Expands the command line inputs into the list of files to scan.

Files are taken as given. Directories are walked recursively with entries in
name order, keeping files whose name matches the pattern (all files when there's
no pattern). Links to files are scanned, links to directories are not followed.
*/

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};

pub fn collect_inputs<P : AsRef<Path>>(inputs : &[P], pattern : Option<&Regex>) -> Result<Vec<PathBuf>> {
  let mut files = vec![];
  for input in inputs {
    let input = input.as_ref();
    if input.is_dir() {
      walk_dir(input, pattern, &mut files)?
    } else {
      // includes "-" for stdin, and files that turn out not to exist, which fail when opened
      files.push(input.to_path_buf())
    }
  }
  Ok(files)
}

fn walk_dir(dir : &Path, pattern : Option<&Regex>, files : &mut Vec<PathBuf>) -> Result<()> {
  // links are not followed, so a link back up the tree can't loop
  for entry in WalkDir::new(dir).sort_by_file_name() {
    let entry = entry.map_err(|err| {
      let path = err.path().unwrap_or(dir).to_path_buf();
      Error::Io{ path, source: err.into() }
    })?;
    let path = entry.path();
    if entry.file_type().is_dir() { continue }
    if entry.path_is_symlink() && path.is_dir() {
      tracing::debug!(?path, "skipping link to a directory");
      continue
    }
    if pattern.map_or(true, |re| re.is_match(&entry.file_name().to_string_lossy())) {
      files.push(entry.into_path())
    } else {
      tracing::trace!(?path, "skipping, name doesn't match pattern")
    }
  }
  Ok(())
}
