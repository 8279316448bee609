/*!
Per-path summary of the leaf values seen at that path.

A [`Field`] starts out [`Field::Unobserved`] and becomes one of the concrete
variants with the first leaf. After that it never changes kind: a leaf of another
kind is a [`AddError::TypeMismatch`], which is fatal for the run.

Accumulators are consumed and returned by [`Field::add`] rather than mutated in
place, because the first add replaces an `Unobserved` with something else.
[`Field::check`] is separate so a rejected leaf leaves the field as it was.
*/

use std::borrow::Borrow;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::AddError;
use crate::leaf::{Leaf, LeafKind};

/// Largest number of distinct values tracked per field before it stops
/// being reported as an enum.
pub const MAX_ENUM : usize = 20;

#[derive(Debug,Clone,Default,PartialEq)]
pub enum Field {
  #[default]
  Unobserved,
  Boolean { true_count : u64, false_count : u64 },
  Numeric(Numeric),
  Textual(Textual),
}

#[derive(Debug,Clone,PartialEq)]
pub struct Numeric {
  pub min : f64,
  pub max : f64,
  /// every value so far equals its own rounding
  pub integral : bool,
  /// every value so far has no bits in the part of the significand a float32 drops
  pub float32 : bool,
  // keyed by f64 bit pattern, because f64 isn't Hash
  seen : FxHashMap<u64, u64>,
}

#[derive(Debug,Clone,Default,PartialEq)]
pub struct Textual {
  seen : FxHashMap<String, u64>,
}

/// Which variant a field is, for diagnostics.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum FieldKind {
  Unobserved,
  Boolean,
  Numeric,
  Textual,
}

impl std::fmt::Display for FieldKind {
  fn fmt(&self, f : &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      FieldKind::Unobserved => "unobserved",
      FieldKind::Boolean => "boolean",
      FieldKind::Numeric => "numeric",
      FieldKind::Textual => "textual",
    };
    write!(f, "{name}")
  }
}

/// Count one occurrence of `key`.
///
/// Keys already present always count. A new key is only admitted while the
/// table holds no more than `max_enum` entries. The check is before the insert,
/// so the table can hold `max_enum + 1` keys, which is what marks it as no
/// longer enumerable.
fn tally<K,Q>(seen : &mut FxHashMap<K,u64>, key : &Q, max_enum : usize)
where
  K : Borrow<Q> + Hash + Eq,
  Q : Hash + Eq + ToOwned<Owned = K> + ?Sized,
{
  if let Some(count) = seen.get_mut(key) {
    *count += 1
  } else if seen.len() <= max_enum {
    seen.insert(key.to_owned(), 1);
  }
}

/// `(key, count)` ordered by count descending, ties by key ascending.
fn by_count<K, F>(seen : &FxHashMap<K,u64>, cmp_keys : F) -> Vec<(&K, u64)>
where F : Fn(&K, &K) -> std::cmp::Ordering
{
  let mut pairs = seen.iter().map(|(k,&c)| (k,c)).collect::<Vec<_>>();
  pairs.sort_by(|(ka,ca),(kb,cb)| cb.cmp(ca).then_with(|| cmp_keys(*ka,*kb)));
  pairs
}

pub fn is_integral(v : f64) -> bool {
  v.round() == v
}

/// The 52-bit float64 significand less the 23 bits a float32 has.
const FLOAT32_DROPPED_BITS : u32 = 52 - 23;
const FLOAT32_DROPPED_MASK : u64 = (1 << FLOAT32_DROPPED_BITS) - 1;

/// True when none of the significand bits that a float32 can't hold are set.
///
/// Does not look at the exponent, so magnitudes outside the float32 range
/// can still pass.
pub fn is_exact_float32(v : f64) -> bool {
  v.to_bits() & FLOAT32_DROPPED_MASK == 0
}

/// Smallest representation that holds every value seen at a numeric path.
#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub enum Width {
  Int8, Int16, Int32, Int64,
  UInt8, UInt16, UInt32, UInt64,
  Float32, Float64,
}

impl Width {
  pub fn infer(min : f64, max : f64, integral : bool, float32 : bool) -> Self {
    match (integral, float32) {
      (false, true) => Width::Float32,
      (false, false) => Width::Float64,
      (true, _) if min < 0.0 => {
        let fits = |lo : f64, hi : f64| min >= lo && max <= hi;
        if fits(i8::MIN.into(), i8::MAX.into()) { Width::Int8 }
        else if fits(i16::MIN.into(), i16::MAX.into()) { Width::Int16 }
        else if fits(i32::MIN.into(), i32::MAX.into()) { Width::Int32 }
        else { Width::Int64 }
      }
      (true, _) => {
        if max <= u8::MAX.into() { Width::UInt8 }
        else if max <= u16::MAX.into() { Width::UInt16 }
        else if max <= u32::MAX.into() { Width::UInt32 }
        else { Width::UInt64 }
      }
    }
  }
}

impl std::fmt::Display for Width {
  fn fmt(&self, f : &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Width::Int8 => "int8",
      Width::Int16 => "int16",
      Width::Int32 => "int32",
      Width::Int64 => "int64",
      Width::UInt8 => "uint8",
      Width::UInt16 => "uint16",
      Width::UInt32 => "uint32",
      Width::UInt64 => "uint64",
      Width::Float32 => "float32",
      Width::Float64 => "float64",
    };
    write!(f, "{name}")
  }
}

impl Numeric {
  fn new(first : f64) -> Self {
    // flags start true and are and-ed with every value, including this one
    Self{ min: first, max: first, integral: true, float32: true, seen: FxHashMap::default() }
  }

  fn add(mut self, v : f64, max_enum : usize) -> Self {
    self.min = self.min.min(v);
    self.max = self.max.max(v);
    self.integral = self.integral && is_integral(v);
    self.float32 = self.float32 && is_exact_float32(v);
    // -0.0 and 0.0 are the same value
    let v = if v == 0.0 { 0.0 } else { v };
    tally(&mut self.seen, &v.to_bits(), max_enum);
    self
  }

  pub fn width(&self) -> Width {
    Width::infer(self.min, self.max, self.integral, self.float32)
  }

  pub fn distinct(&self) -> usize { self.seen.len() }

  /// The enum table, most frequent first.
  pub fn counts(&self) -> Vec<(f64, u64)> {
    by_count(&self.seen, |a,b| f64::from_bits(*a).total_cmp(&f64::from_bits(*b)))
      .into_iter()
      .map(|(bits,count)| (f64::from_bits(*bits), count))
      .collect()
  }

  fn format_value(&self, v : f64) -> String {
    if self.integral {
      // Display writes integral doubles in full, with no decimals and no exponent
      let v = if v == 0.0 { 0.0 } else { v };
      format!("{v}")
    } else {
      format!("{v:.6}")
    }
  }

  fn render(&self, max_enum : usize) -> String {
    let mut rendered = format!("{};{};{}", self.width(), self.format_value(self.min), self.format_value(self.max));
    if self.seen.len() <= max_enum {
      for (value, count) in self.counts() {
        rendered.push_str(&format!(";{}:{count}", self.format_value(value)));
      }
    }
    rendered
  }
}

impl Textual {
  fn add(mut self, v : &str, max_enum : usize) -> Self {
    tally(&mut self.seen, v, max_enum);
    self
  }

  pub fn distinct(&self) -> usize { self.seen.len() }

  pub fn counts(&self) -> Vec<(&str, u64)> {
    by_count(&self.seen, |a,b| a.cmp(b))
      .into_iter()
      .map(|(value,count)| (value.as_str(), count))
      .collect()
  }

  fn render(&self, max_enum : usize) -> String {
    if self.seen.len() > max_enum { return "string;".into() }
    let mut rendered = format!("enum;{};", self.seen.len());
    for (value, count) in self.counts() {
      rendered.push_str(&format!("{value}:{count};"));
    }
    rendered
  }
}

impl Field {
  pub fn kind(&self) -> FieldKind {
    match self {
      Field::Unobserved => FieldKind::Unobserved,
      Field::Boolean{..} => FieldKind::Boolean,
      Field::Numeric(_) => FieldKind::Numeric,
      Field::Textual(_) => FieldKind::Textual,
    }
  }

  /// Whether `leaf` can be added, without touching the field.
  pub fn check(&self, leaf : &Leaf<'_>) -> Result<(), AddError> {
    match (self, leaf) {
      (Field::Unobserved, Leaf::Null) => Err(AddError::UnhandledType(LeafKind::Null)),
      (Field::Unobserved, _)
      | (Field::Boolean{..}, Leaf::Boolean(_))
      | (Field::Numeric(_), Leaf::Number(_))
      | (Field::Textual(_), Leaf::String(_)) => Ok(()),
      (field, leaf) => Err(AddError::TypeMismatch{ field: field.kind(), kind: leaf.kind() }),
    }
  }

  /// Fold one leaf into the field, returning its replacement.
  pub fn add(self, leaf : Leaf<'_>, max_enum : usize) -> Result<Self, AddError> {
    self.check(&leaf)?;
    Ok(self.fold(leaf, max_enum))
  }

  /// [`Field::add`] for a leaf that already passed [`Field::check`].
  pub fn fold(self, leaf : Leaf<'_>, max_enum : usize) -> Self {
    match (self, leaf) {
      // concretize, then add to the concrete field
      (Field::Unobserved, Leaf::Boolean(_)) => Field::Boolean{ true_count: 0, false_count: 0 }.fold(leaf, max_enum),
      (Field::Unobserved, Leaf::Number(v)) => Field::Numeric(Numeric::new(v)).fold(leaf, max_enum),
      (Field::Unobserved, Leaf::String(_)) => Field::Textual(Textual::default()).fold(leaf, max_enum),

      (Field::Boolean{ true_count, false_count }, Leaf::Boolean(b)) =>
        if b {
          Field::Boolean{ true_count: true_count + 1, false_count }
        } else {
          Field::Boolean{ true_count, false_count: false_count + 1 }
        },
      (Field::Numeric(numeric), Leaf::Number(v)) => Field::Numeric(numeric.add(v, max_enum)),
      (Field::Textual(textual), Leaf::String(v)) => Field::Textual(textual.add(v, max_enum)),

      // check turns these away
      (field, _) => field,
    }
  }

  /// Number of distinct values this field enumerates.
  pub fn distinct(&self) -> usize {
    match self {
      Field::Unobserved => 0,
      Field::Boolean{ true_count, false_count } => usize::from(*true_count > 0) + usize::from(*false_count > 0),
      Field::Numeric(numeric) => numeric.distinct(),
      Field::Textual(textual) => textual.distinct(),
    }
  }

  /// The canonical text form. Per-value breakdowns are only included while
  /// the field holds no more than `max_enum` distinct values.
  pub fn render(&self, max_enum : usize) -> String {
    match self {
      Field::Unobserved => "null".into(),
      Field::Boolean{ true_count, false_count } => format!("true:{true_count};false:{false_count}"),
      Field::Numeric(numeric) => numeric.render(max_enum),
      Field::Textual(textual) => textual.render(max_enum),
    }
  }
}

impl std::fmt::Display for Field {
  fn fmt(&self, f : &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.render(MAX_ENUM))
  }
}

#[cfg(test)]
mod test_field {
  use super::*;

  fn fold<'a>(leafs : impl IntoIterator<Item = Leaf<'a>>) -> Result<Field, AddError> {
    leafs.into_iter().try_fold(Field::default(), |field, leaf| field.add(leaf, MAX_ENUM))
  }

  fn numbers(vs : &[f64]) -> Field {
    fold(vs.iter().map(|v| Leaf::Number(*v))).unwrap()
  }

  fn numeric(field : &Field) -> &Numeric {
    match field {
      Field::Numeric(n) => n,
      other => panic!("not numeric {other:?}"),
    }
  }

  #[test]
  fn integers_past_64_bits_render_in_full() {
    assert_eq!(numbers(&[1e20]).to_string(), "uint64;100000000000000000000;100000000000000000000;100000000000000000000:1");
    assert_eq!(
      numbers(&[1e20, -1e20]).to_string(),
      "int64;-100000000000000000000;100000000000000000000;-100000000000000000000:1;100000000000000000000:1",
    );
  }

  #[test]
  fn lone_negative_zero_renders_as_zero() {
    assert_eq!(numbers(&[-0.0]).to_string(), "uint8;0;0;0:1");
  }

  #[test]
  fn booleans() {
    let field = fold([true, false, true, true].map(Leaf::Boolean)).unwrap();
    assert_eq!(field, Field::Boolean{ true_count: 3, false_count: 1 });
    assert_eq!(field.to_string(), "true:3;false:1");
    assert_eq!(field.distinct(), 2);
  }

  #[test]
  fn width_grows() {
    let field = numbers(&[0.0, 100.0]);
    assert_eq!(numeric(&field).width(), Width::UInt8);
    let field = field.add(Leaf::Number(300.0), MAX_ENUM).unwrap();
    assert_eq!(numeric(&field).width(), Width::UInt16);
  }

  #[test]
  fn signed_widths() {
    assert_eq!(numeric(&numbers(&[-1.0, 127.0])).width(), Width::Int8);
    assert_eq!(numeric(&numbers(&[-129.0, 5.0])).width(), Width::Int16);
    assert_eq!(numeric(&numbers(&[-1.0, 40000.0])).width(), Width::Int32);
    assert_eq!(numeric(&numbers(&[-1.0, 3e9])).width(), Width::Int64);
  }

  #[test]
  fn unsigned_widths() {
    assert_eq!(numeric(&numbers(&[0.0, 255.0])).width(), Width::UInt8);
    assert_eq!(numeric(&numbers(&[70000.0])).width(), Width::UInt32);
    assert_eq!(numeric(&numbers(&[5e9])).width(), Width::UInt64);
  }

  #[test]
  fn float_widths() {
    assert_eq!(numeric(&numbers(&[1.0, 0.5, 0.25])).width(), Width::Float32);
    assert_eq!(numeric(&numbers(&[0.5, 0.1])).width(), Width::Float64);
    // flags never come back
    assert_eq!(numeric(&numbers(&[0.1, 0.5, 0.5])).width(), Width::Float64);
  }

  #[test]
  fn float32_exactness() {
    assert!(is_exact_float32(0.5));
    assert!(!is_exact_float32(0.1));
    // integral, but 2^24+1 needs 25 bits of significand
    assert!(!is_exact_float32(16777217.0));
    assert!(is_exact_float32(16777216.0));
    // exponent range is not checked, 2^200 has no significand bits at all
    assert!(is_exact_float32(2f64.powi(200)));
  }

  #[test]
  fn integral() {
    assert!(is_integral(3.0));
    assert!(is_integral(-0.0));
    assert!(!is_integral(2.5));
  }

  #[test]
  fn min_max_bound_everything() {
    let vs = [5.0, -2.0, 17.5, 3.0, -2.0];
    let mut field = Field::default();
    for (i, v) in vs.iter().enumerate() {
      field = field.add(Leaf::Number(*v), MAX_ENUM).unwrap();
      let n = numeric(&field);
      assert!(vs[..=i].iter().all(|seen| n.min <= *seen && *seen <= n.max));
    }
  }

  #[test]
  fn numeric_render() {
    let field = numbers(&[1.0, 2.0, 300.0, 1.0]);
    assert_eq!(field.to_string(), "uint16;1;300;1:2;2:1;300:1");
  }

  #[test]
  fn numeric_render_fractional() {
    let field = numbers(&[0.5, -1.25, 0.5]);
    assert_eq!(field.to_string(), "float32;-1.250000;0.500000;0.500000:2;-1.250000:1");
  }

  #[test]
  fn negative_zero_is_zero() {
    let field = numbers(&[0.0, -0.0]);
    assert_eq!(field.distinct(), 1);
    assert_eq!(field.to_string(), "uint8;0;0;0:2");
  }

  #[test]
  fn textual_render() {
    let field = fold(["x", "y", "x"].map(Leaf::String)).unwrap();
    assert_eq!(field.to_string(), "enum;2;x:2;y:1;");
  }

  #[test]
  fn enum_cap_crossing() {
    let values = (0..30).map(|i| format!("v{i:02}")).collect::<Vec<_>>();
    let field = fold(values.iter().map(|v| Leaf::String(v))).unwrap();
    // admitted up to and including the crossing, then closed
    assert_eq!(field.distinct(), MAX_ENUM + 1);
    assert_eq!(field.to_string(), "string;");

    // existing keys still count, new ones don't get in
    let field = field
      .add(Leaf::String("v00"), MAX_ENUM).unwrap()
      .add(Leaf::String("never"), MAX_ENUM).unwrap();
    assert_eq!(field.distinct(), MAX_ENUM + 1);
    let Field::Textual(textual) = &field else { panic!("not textual") };
    assert_eq!(textual.counts()[0], ("v00", 2));
    assert!(textual.counts().iter().all(|(v,_)| *v != "never"));
  }

  #[test]
  fn exactly_max_enum_is_enumerable() {
    let values = (0..MAX_ENUM).map(|i| i as f64).collect::<Vec<_>>();
    let field = numbers(&values);
    assert_eq!(field.distinct(), MAX_ENUM);
    assert!(field.to_string().ends_with(";19:1"));

    let field = field.add(Leaf::Number(99.0), MAX_ENUM).unwrap();
    assert_eq!(field.to_string(), "uint8;0;99");
  }

  #[test]
  fn tunable_max_enum() {
    let field = ["a", "b", "c"].iter()
      .try_fold(Field::default(), |f, v| f.add(Leaf::String(v), 1))
      .unwrap();
    assert_eq!(field.distinct(), 2);
    assert_eq!(field.render(1), "string;");
    assert_eq!(field.render(2), "enum;2;a:1;b:1;");
  }

  #[test]
  fn mismatch() {
    let field = numbers(&[1.0]);
    assert_eq!(
      field.add(Leaf::String("x"), MAX_ENUM),
      Err(AddError::TypeMismatch{ field: FieldKind::Numeric, kind: LeafKind::String })
    );
  }

  #[test]
  fn null_rejected() {
    assert_eq!(Field::default().add(Leaf::Null, MAX_ENUM), Err(AddError::UnhandledType(LeafKind::Null)));
    let field = fold([Leaf::Boolean(true)]).unwrap();
    assert_eq!(
      field.add(Leaf::Null, MAX_ENUM),
      Err(AddError::TypeMismatch{ field: FieldKind::Boolean, kind: LeafKind::Null })
    );
  }

  #[test]
  fn check_leaves_field_alone() {
    let field = numbers(&[1.0, 2.0]);
    assert!(field.check(&Leaf::String("x")).is_err());
    assert!(field.check(&Leaf::Number(3.0)).is_ok());
    assert_eq!(field.to_string(), "uint8;1;2;1:1;2:1");
  }

  #[test]
  fn unobserved_renders_null() {
    assert_eq!(Field::default().to_string(), "null");
    assert_eq!(Field::default().distinct(), 0);
  }
}

#[cfg(test)]
mod test_width_order {
  use super::*;
  use proptest::prelude::*;

  fn fold(vs : &[f64]) -> Numeric {
    let field = vs.iter().try_fold(Field::default(), |f, v| f.add(Leaf::Number(*v), MAX_ENUM)).unwrap();
    match field {
      Field::Numeric(n) => n,
      other => panic!("not numeric {other:?}"),
    }
  }

  fn value() -> impl Strategy<Value = f64> {
    prop_oneof![
      (-70000i64..70000).prop_map(|i| i as f64),
      (-1000.0f64..1000.0),
      (0u32..64).prop_map(|i| f64::from(i) / 4.0),
    ]
  }

  proptest! {
    #[test]
    fn width_ignores_insertion_order(vs in prop::collection::vec(value(), 1..50), seed in any::<u64>()) {
      let forward = fold(&vs);
      let mut shuffled = vs.clone();
      // cheap deterministic permutation
      let len = shuffled.len();
      for i in 0..len {
        let j = (seed.wrapping_mul(i as u64 + 1) % len as u64) as usize;
        shuffled.swap(i, j);
      }
      let permuted = fold(&shuffled);
      prop_assert_eq!(forward.width(), permuted.width());
      prop_assert_eq!(forward.min, permuted.min);
      prop_assert_eq!(forward.max, permuted.max);
      prop_assert_eq!(forward.integral, permuted.integral);
      prop_assert_eq!(forward.float32, permuted.float32);
    }

    #[test]
    fn width_never_shrinks(vs in prop::collection::vec(value(), 1..50)) {
      let mut field = Field::default();
      let mut last : Option<Width> = None;
      for v in vs {
        field = field.add(Leaf::Number(v), MAX_ENUM).unwrap();
        let Field::Numeric(n) = &field else { unreachable!() };
        let width = n.width();
        if let Some(last) = last {
          prop_assert!(capacity(width) >= capacity(last), "{last} -> {width}");
        }
        last = Some(width);
      }
    }
  }

  // rough ordering of how much each width can hold
  fn capacity(w : Width) -> u8 {
    match w {
      Width::UInt8 => 0,
      Width::Int8 => 1,
      Width::UInt16 => 2,
      Width::Int16 => 3,
      Width::UInt32 => 4,
      Width::Int32 => 5,
      Width::UInt64 => 6,
      Width::Int64 => 7,
      Width::Float32 => 8,
      Width::Float64 => 9,
    }
  }
}
