/*!
This is a json path, ie an ordered set of steps,
where each step is either a key name or the array marker.
It must be optimised for add/remove the last element,
and cloning should be cheap, because the walker keeps one per pending value.

`rpds::Vector` meets those requirements.

Array indexes are not kept: every element of an array shares one path,
because we want the shape of the documents not the full tree.
*/

/// One step in the path, which is either a tag name, or an array element.
#[derive(Debug,Clone,Ord,PartialEq,Eq,PartialOrd,Hash)]
pub enum Step {
  Key(String),
  Index,
}

impl std::fmt::Display for Step {
  fn fmt(&self, f : &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
    match &self {
      Step::Key(v) => write!(f, "{v}"),
      Step::Index => write!(f, "{ARRAY_MARKER}"),
    }
  }
}

/// What an array element contributes to a path.
pub const ARRAY_MARKER : &str = "[]";

// These are all effectively AsRef
// But E0119 prevents implementing them using a trait.
impl From<&str> for Step {
  fn from(s: &str) -> Self { Self::Key(s.into()) }
}

impl From<String> for Step {
  fn from(s: String) -> Self { Self::Key(s) }
}

impl From<&String> for Step {
  fn from(s: &String) -> Self { Self::Key(s.into()) }
}

// https://docs.rs/rpds/latest/rpds/vector/struct.Vector.html
pub type JsonPath = rpds::Vector<Step>;

/// The two segment conventions for rendering a path as a string.
#[derive(Debug,Clone,Copy,PartialEq,Eq,serde::Deserialize,serde::Serialize,clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
  /// `.a.b[]` - the key follows its dot
  Leading,
  /// `.a.b.[]` - the key is followed by its dot
  Trailing,
}

impl PathStyle {
  /// Append one step to an already-rendered path.
  pub fn push(&self, rendered : &mut String, step : &Step) {
    match (self, step) {
      (_, Step::Index) => rendered.push_str(ARRAY_MARKER),
      (PathStyle::Leading, Step::Key(key)) => {
        // so a root of "." doesn't end up as "..key"
        if !rendered.ends_with('.') { rendered.push('.') }
        rendered.push_str(key)
      }
      (PathStyle::Trailing, Step::Key(key)) => {
        rendered.push_str(key);
        rendered.push('.')
      }
    }
  }

  /// Render the whole path, starting from the root label.
  pub fn render(&self, root : &str, path : &JsonPath) -> String {
    let mut rendered = String::from(root);
    for step in path.iter() {
      self.push(&mut rendered, step)
    }
    rendered
  }
}

impl std::fmt::Display for PathStyle {
  fn fmt(&self, f : &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PathStyle::Leading => write!(f, "leading"),
      PathStyle::Trailing => write!(f, "trailing"),
    }
  }
}
