/*!
The scalar values that the walker hands over to the registry.

Containers never get this far, the walker flattens them into paths.
*/

/// A leaf value, borrowed from the document it came from.
#[derive(Debug,Clone,Copy,PartialEq)]
pub enum Leaf<'a> {
  Null,
  Boolean(bool),
  // json numbers are all doubles as far as the statistics are concerned
  Number(f64),
  String(&'a str),
}

impl Leaf<'_> {
  pub fn kind(&self) -> LeafKind {
    match self {
      Leaf::Null => LeafKind::Null,
      Leaf::Boolean(_) => LeafKind::Boolean,
      Leaf::Number(_) => LeafKind::Number,
      Leaf::String(_) => LeafKind::String,
    }
  }
}

/// Kind of a json value, for diagnostics.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum LeafKind {
  Null,
  Boolean,
  Number,
  String,
}

impl std::fmt::Display for LeafKind {
  fn fmt(&self, f : &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      LeafKind::Null => "null",
      LeafKind::Boolean => "boolean",
      LeafKind::Number => "number",
      LeafKind::String => "string",
    };
    write!(f, "{name}")
  }
}
