/*!
Raw `value => count` tally for one path.

Unlike [`crate::field::Field`] this doesn't care about kinds: booleans, numbers
and strings at one path all go into the same table, keyed by their text.
*/

use rustc_hash::FxHashMap;

use crate::error::AddError;
use crate::leaf::{Leaf, LeafKind};

#[derive(Debug,Clone,Default,PartialEq)]
pub struct ValueCounts {
  seen : FxHashMap<String, u64>,
}

/// The text a leaf is counted under.
/// Numbers are printed with six decimals, so 1 and 1.0 are the same key.
pub fn value_key(leaf : &Leaf<'_>) -> Option<String> {
  match leaf {
    Leaf::Boolean(b) => Some(b.to_string()),
    Leaf::Number(v) => Some(format!("{v:.6}")),
    Leaf::String(s) => Some(s.to_string()),
    Leaf::Null => None,
  }
}

impl ValueCounts {
  /// Anything but null can be counted.
  pub fn check(&self, leaf : &Leaf<'_>) -> Result<(), AddError> {
    match leaf {
      Leaf::Null => Err(AddError::UnhandledType(LeafKind::Null)),
      _ => Ok(()),
    }
  }

  pub fn add(self, leaf : Leaf<'_>) -> Result<Self, AddError> {
    self.check(&leaf)?;
    Ok(self.fold(leaf))
  }

  pub fn fold(mut self, leaf : Leaf<'_>) -> Self {
    // avoid allocating for strings that are already counted
    if let Leaf::String(s) = leaf {
      if let Some(count) = self.seen.get_mut(s) {
        *count += 1;
        return self
      }
    }
    if let Some(key) = value_key(&leaf) {
      *self.seen.entry(key).or_insert(0) += 1;
    }
    self
  }

  pub fn distinct(&self) -> usize { self.seen.len() }

  /// Most frequent first, ties by key.
  pub fn counts(&self) -> Vec<(&str, u64)> {
    let mut pairs = self.seen.iter().map(|(k,&c)| (k.as_str(),c)).collect::<Vec<_>>();
    pairs.sort_by(|(ka,ca),(kb,cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
    pairs
  }
}
