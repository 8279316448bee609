/*!
Per-path statistics for large collections of json documents.

Every leaf of every document is assigned to a path (its position in the document
shape, with array indexes dropped), and each path accumulates a compact summary
of the values seen there.
*/

// paths, values and the walker
pub mod jsonpath;
pub mod leaf;
pub mod sender;
pub mod fn_snd;
pub mod walker;

// accumulation and reporting
pub mod field;
pub mod counts;
pub mod registry;
pub mod report;

// input, threads and setup
pub mod parser;
pub mod inputs;
pub mod channel;
pub mod config;
pub mod error;

use std::path::PathBuf;

pub use config::{Config, Profile};
pub use error::{Error, Result};

use registry::Registry;
use report::Render;
use walker::Walker;

/// What a run produces.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Output {
  /// the report rows for the configured profile
  Rows,
  /// just the sorted list of paths
  Paths,
}

/// Scan `inputs` (files or directories, no inputs means stdin) and return the output lines.
///
/// Nothing comes back unless every document was accumulated, so a failed run has no partial output.
pub fn profile<P : AsRef<std::path::Path>>(config : &Config, inputs : &[P], output : Output) -> Result<Vec<String>> {
  config.validate()?;
  let pattern = config.pattern.as_deref().map(regex::Regex::new).transpose()?;
  let files = if inputs.is_empty() {
    vec![PathBuf::from(parser::STDIN)]
  } else {
    inputs::collect_inputs(inputs, pattern.as_ref())?
  };
  tracing::info!(files = files.len(), profile = ?config.profile, style = %config.style(), "starting scan");

  match config.profile {
    Profile::Summary => profile_with::<field::Field>(config, &files, output),
    Profile::Counts => profile_with::<counts::ValueCounts>(config, &files, output),
  }
}

fn profile_with<A : Render>(config : &Config, files : &[PathBuf], output : Output) -> Result<Vec<String>> {
  let walker = Walker::new(config.style(), config.root(), config.nulls());
  let registry = Registry::<A>::new(config.root(), config.limits());

  let stats = channel::scan(files, config.workers(), &walker, &registry)?;
  tracing::info!(files = stats.files, documents = stats.documents, bytes = stats.bytes, paths = registry.len(), "scan finished");

  Ok(match output {
    Output::Rows => report::rows(registry),
    Output::Paths => registry.paths().into_iter().collect(),
  })
}
