/*!
Run configuration.

Can be loaded from a yaml file, and every field can be overridden from the command line.
Fields left out take the defaults of the chosen profile.
*/

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field::MAX_ENUM;
use crate::jsonpath::PathStyle;

/// Default number of distinct values a path may collect before it's ignored.
pub const PATH_CAP : usize = 100;

/// What gets reported for each path.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Deserialize,Serialize,clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
  /// one `path;"value";count` row per distinct value
  Counts,
  /// one `path;summary` row per path
  #[default]
  Summary,
}

/// What the walker does with json null.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Deserialize,Serialize,clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
  /// nulls never reach the registry
  Ignore,
  /// nulls are leaves like any other, and no accumulator takes them
  Reject,
}

impl Profile {
  pub fn default_style(&self) -> PathStyle {
    match self {
      Profile::Counts => PathStyle::Trailing,
      Profile::Summary => PathStyle::Leading,
    }
  }

  pub fn default_nulls(&self) -> NullPolicy {
    match self {
      Profile::Counts => NullPolicy::Ignore,
      Profile::Summary => NullPolicy::Reject,
    }
  }
}

/// The two independent caps.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct Limits {
  /// distinct values enumerated per accumulator
  pub max_enum : usize,
  /// distinct values per path before the path is ignored
  pub path_cap : usize,
}

impl Default for Limits {
  fn default() -> Self {
    Self{ max_enum: MAX_ENUM, path_cap: PATH_CAP }
  }
}

#[derive(Debug,Clone,Default,PartialEq,Eq,Deserialize,Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub profile : Profile,
  pub style : Option<PathStyle>,
  pub root : Option<String>,
  pub nulls : Option<NullPolicy>,
  pub max_enum : Option<usize>,
  pub path_cap : Option<usize>,
  pub workers : Option<usize>,
  /// regex matched against file names when scanning directories
  pub pattern : Option<String>,
}

impl Config {
  pub fn load(path : &Path) -> Result<Self> {
    let file = std::fs::File::open(path).map_err(|source| Error::Io{ path: path.into(), source })?;
    serde_yaml::from_reader(file).map_err(|source| Error::ConfigFile{ path: path.into(), source })
  }

  pub fn style(&self) -> PathStyle {
    self.style.unwrap_or_else(|| self.profile.default_style())
  }

  pub fn root(&self) -> &str {
    self.root.as_deref().unwrap_or(".")
  }

  pub fn nulls(&self) -> NullPolicy {
    self.nulls.unwrap_or_else(|| self.profile.default_nulls())
  }

  pub fn limits(&self) -> Limits {
    let default = Limits::default();
    Limits{
      max_enum: self.max_enum.unwrap_or(default.max_enum),
      path_cap: self.path_cap.unwrap_or(default.path_cap),
    }
  }

  pub fn workers(&self) -> usize {
    self.workers.unwrap_or_else(|| std::thread::available_parallelism().map(usize::from).unwrap_or(1))
  }

  /// Catch settings that would make the run meaningless before any file is read.
  pub fn validate(&self) -> Result<()> {
    let limits = self.limits();
    if limits.max_enum == 0 { return Err(Error::Config("max_enum must be at least 1".into())) }
    if limits.path_cap == 0 { return Err(Error::Config("path_cap must be at least 1".into())) }
    if self.workers == Some(0) { return Err(Error::Config("workers must be at least 1".into())) }
    if self.root().contains(crate::jsonpath::ARRAY_MARKER) {
      return Err(Error::Config(format!("root label '{}' contains the array marker", self.root())))
    }
    if let Some(pattern) = &self.pattern {
      regex::Regex::new(pattern)?;
    }
    Ok(())
  }
}
