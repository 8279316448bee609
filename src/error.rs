/*!
Errors for a profiling run.

Everything raised while accumulating is fatal: the run stops and nothing is reported.
*/

use std::path::PathBuf;

use thiserror::Error;

use crate::field::FieldKind;
use crate::leaf::LeafKind;

#[derive(Error, Debug)]
pub enum Error {
  /// A leaf of a kind that has no accumulator reached the registry.
  #[error("unhandled {kind} value at path '{path}'")]
  UnhandledType { path : String, kind : LeafKind },

  /// A path already concretized as one kind received a value of another kind.
  #[error("type mismatch at path '{path}': {field} field cannot accept a {kind} value")]
  TypeMismatch { path : String, field : FieldKind, kind : LeafKind },

  /// The walker produced a path that doesn't hang off the root label.
  #[error("malformed path '{path}': {reason}")]
  MalformedPath { path : String, reason : String },

  #[error("cannot read {path:?}: {source}")]
  Io { path : PathBuf, #[source] source : std::io::Error },

  #[error("cannot decode json from {path:?}: {source}")]
  Decode { path : PathBuf, #[source] source : serde_json::Error },

  #[error("invalid configuration: {0}")]
  Config(String),

  #[error("cannot load configuration {path:?}: {source}")]
  ConfigFile { path : PathBuf, #[source] source : serde_yaml::Error },

  #[error("invalid file name pattern: {0}")]
  Pattern(#[from] regex::Error),

  #[error("cannot write report: {0}")]
  Output(#[source] std::io::Error),

  #[error("a scan worker panicked")]
  WorkerPanic,
}

/// Failure of a single accumulator `add`. Doesn't know which path it's at,
/// the registry fills that in with [`AddError::at`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddError {
  #[error("no accumulator for {0} values")]
  UnhandledType(LeafKind),

  #[error("{field} field cannot accept a {kind} value")]
  TypeMismatch { field : FieldKind, kind : LeafKind },
}

impl AddError {
  pub fn at(self, path : &str) -> Error {
    match self {
      AddError::UnhandledType(kind) => Error::UnhandledType { path : path.into(), kind },
      AddError::TypeMismatch { field, kind } => Error::TypeMismatch { path : path.into(), field, kind },
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
