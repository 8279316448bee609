/*!
The path => accumulator store, shared by every scan worker.

`dashmap` shards the map, so workers updating different paths only contend when
the paths land in the same shard, and an update to one path holds that shard's
lock for the whole take/add/store.
*/

use std::collections::BTreeSet;
use std::hash::BuildHasherDefault;

use dashmap::DashMap;
use rustc_hash::FxHasher;

use crate::config::Limits;
use crate::counts::ValueCounts;
use crate::error::{AddError, Error, Result};
use crate::field::Field;
use crate::leaf::Leaf;
use crate::sender::Sender;

/// What the registry keeps per path.
pub trait Accumulator : Default + Send + Sync {
  /// Refuse a leaf this accumulator can't take, leaving it unchanged.
  fn check(&self, leaf : &Leaf<'_>) -> std::result::Result<(), AddError>;
  /// Fold in a leaf that passed [`Accumulator::check`], returning the replacement accumulator.
  fn fold(self, leaf : Leaf<'_>, max_enum : usize) -> Self;
  /// Number of distinct values collected so far.
  fn distinct(&self) -> usize;
}

impl Accumulator for Field {
  fn check(&self, leaf : &Leaf<'_>) -> std::result::Result<(), AddError> { Field::check(self, leaf) }

  fn fold(self, leaf : Leaf<'_>, max_enum : usize) -> Self { Field::fold(self, leaf, max_enum) }

  fn distinct(&self) -> usize { Field::distinct(self) }
}

impl Accumulator for ValueCounts {
  fn check(&self, leaf : &Leaf<'_>) -> std::result::Result<(), AddError> { ValueCounts::check(self, leaf) }

  // raw counts enumerate everything, the path cap is what bounds them
  fn fold(self, leaf : Leaf<'_>, _max_enum : usize) -> Self { ValueCounts::fold(self, leaf) }

  fn distinct(&self) -> usize { ValueCounts::distinct(self) }
}

type FxBuild = BuildHasherDefault<FxHasher>;

pub struct Registry<A> {
  root : String,
  limits : Limits,
  fields : DashMap<String, A, FxBuild>,
}

impl<A : Accumulator> Registry<A> {
  pub fn new(root : impl Into<String>, limits : Limits) -> Self {
    Self{ root: root.into(), limits, fields: DashMap::with_hasher(FxBuild::default()) }
  }

  pub fn limits(&self) -> Limits { self.limits }

  /// Add `leaf` to the accumulator at `path`, creating it if needed.
  ///
  /// Once a path has collected more than `path_cap` distinct values, this is a no-op for that path.
  pub fn update(&self, path : &str, leaf : Leaf<'_>) -> Result<()> {
    if !path.starts_with(self.root.as_str()) {
      return Err(Error::MalformedPath{ path: path.into(), reason: format!("not under root label '{}'", self.root) })
    }

    // only allocate the key the first time a path shows up
    let mut entry = match self.fields.get_mut(path) {
      Some(entry) => entry,
      None => self.fields.entry(path.to_owned()).or_default(),
    };

    if entry.distinct() > self.limits.path_cap { return Ok(()) }

    entry.check(&leaf).map_err(|err| err.at(path))?;
    // replace rather than mutate, so Unobserved can turn into something else
    let accumulator = std::mem::take(&mut *entry);
    *entry = accumulator.fold(leaf, self.limits.max_enum);
    Ok(())
  }

  /// All registered paths, sorted.
  pub fn paths(&self) -> BTreeSet<String> {
    self.fields.iter().map(|entry| entry.key().clone()).collect()
  }

  pub fn len(&self) -> usize { self.fields.len() }

  pub fn is_empty(&self) -> bool { self.fields.is_empty() }

  /// Consume the registry, paths in byte-wise ascending order.
  pub fn into_sorted(self) -> Vec<(String, A)> {
    let mut fields = self.fields.into_iter().collect::<Vec<_>>();
    fields.sort_unstable_by(|(a,_),(b,_)| a.as_bytes().cmp(b.as_bytes()));
    fields
  }
}

impl<A : Accumulator> Sender for &Registry<A> {
  type SendError = Error;

  fn send(&mut self, path : &str, leaf : Leaf<'_>) -> Result<()> {
    self.update(path, leaf)
  }
}
