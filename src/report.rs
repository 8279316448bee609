/*!
Turns a finished registry into output rows.

Paths come out in byte-wise order. Rows are only rendered once accumulation is
complete, so a run that fails never writes a partial report.
*/

use std::io::Write;

use crate::counts::ValueCounts;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::registry::{Accumulator, Registry};

/// How an accumulator is reported.
pub trait Render : Accumulator {
  /// Whether paths over the path cap are dropped from the report.
  const DROP_CAPPED : bool;

  fn rows(&self, path : &str, max_enum : usize) -> Vec<String>;
}

impl Render for Field {
  const DROP_CAPPED : bool = false;

  fn rows(&self, path : &str, max_enum : usize) -> Vec<String> {
    vec![format!("{path};{}", self.render(max_enum))]
  }
}

impl Render for ValueCounts {
  const DROP_CAPPED : bool = true;

  // one row per value, most frequent first
  fn rows(&self, path : &str, _max_enum : usize) -> Vec<String> {
    self.counts()
      .into_iter()
      .map(|(value, count)| format!("{path};{};{count}", serde_json::Value::from(value)))
      .collect()
  }
}

/// Drain the registry into rows.
pub fn rows<A : Render>(registry : Registry<A>) -> Vec<String> {
  let limits = registry.limits();
  let mut dropped = 0usize;
  let rows = registry
    .into_sorted()
    .into_iter()
    .filter(|(path, accumulator)| {
      let keep = !A::DROP_CAPPED || accumulator.distinct() <= limits.path_cap;
      if !keep {
        tracing::debug!(%path, distinct = accumulator.distinct(), "dropping path over the cap");
        dropped += 1
      }
      keep
    })
    .flat_map(|(path, accumulator)| accumulator.rows(&path, limits.max_enum))
    .collect();
  if dropped > 0 { tracing::info!(dropped, "paths over the cap left out of the report") }
  rows
}

/// One row per line.
pub fn write_rows<W : Write>(rows : &[String], out : &mut W) -> Result<()> {
  for row in rows {
    writeln!(out, "{row}").map_err(Error::Output)?;
  }
  out.flush().map_err(Error::Output)
}
