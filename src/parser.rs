/*!
Source of decoded json documents.

A file can hold one document, or many separated by whitespace (which covers
json lines). Either way the documents come out one at a time, so a file is never
held in memory as a whole.

Nesting depth is only limited by memory. Parsing grows the stack on demand, and
[`discard`] takes a finished document apart without recursing.
*/

use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};

pub type StrCon<T> = Box<T>;

/// Stand-in input name for stdin.
pub const STDIN : &str = "-";

/// A document parsed on a stack that grows as deep as the document goes.
struct Deep(Value);

impl<'de> Deserialize<'de> for Deep {
  fn deserialize<D : Deserializer<'de>>(deserializer : D) -> std::result::Result<Self, D::Error> {
    Value::deserialize(serde_stacker::Deserializer::new(deserializer)).map(Deep)
  }
}

pub struct JsonDocuments {
  name : PathBuf,
  stream : serde_json::StreamDeserializer<'static, serde_json::de::IoRead<StrCon<dyn BufRead + Send>>, Deep>,
}

impl JsonDocuments {
  /// `name` is only used for error messages and logging.
  pub fn new(name : impl Into<PathBuf>, istream : StrCon<dyn BufRead + Send>) -> Self {
    let mut de = serde_json::Deserializer::from_reader(istream);
    de.disable_recursion_limit();
    let stream = de.into_iter::<Deep>();
    Self{ name: name.into(), stream }
  }

  pub fn name(&self) -> &Path { &self.name }

  /// Bytes consumed so far, after decompression.
  pub fn byte_offset(&self) -> usize { self.stream.byte_offset() }
}

impl Iterator for JsonDocuments {
  type Item = Result<Value>;

  fn next(&mut self) -> Option<Self::Item> {
    self.stream.next().map(|doc| match doc {
      Ok(Deep(value)) => Ok(value),
      Err(source) => Err(Error::Decode{ path: self.name.clone(), source }),
    })
  }
}

/// Open a file for reading, through a gzip decoder when the name ends in `.gz`.
/// `-` is stdin.
pub fn open_input(path : &Path) -> Result<StrCon<dyn BufRead + Send>> {
  if path.as_os_str() == STDIN {
    return Ok(Box::new(std::io::BufReader::new(std::io::stdin())))
  }

  let file = std::fs::File::open(path).map_err(|source| Error::Io{ path: path.into(), source })?;
  let gzipped = path.extension().is_some_and(|ext| ext == "gz");
  if gzipped {
    Ok(Box::new(std::io::BufReader::new(flate2::read::MultiGzDecoder::new(file))))
  } else {
    Ok(Box::new(std::io::BufReader::new(file)))
  }
}

/// Drop a document one container at a time.
///
/// The `Drop` for `Value` recurses, which overflows on documents nested a few
/// tens of thousands deep.
pub fn discard(doc : Value) {
  let mut pending = vec![doc];
  while let Some(value) = pending.pop() {
    match value {
      Value::Array(elements) => pending.extend(elements),
      Value::Object(entries) => pending.extend(entries.into_iter().map(|(_, v)| v)),
      _ => (),
    }
  }
}

/// Documents from the file at `path`.
pub fn documents(path : &Path) -> Result<JsonDocuments> {
  Ok(JsonDocuments::new(path, open_input(path)?))
}
