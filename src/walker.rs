/*!
This walks a decoded json document and sends every leaf, with its path, to a Sender.

The walk uses an explicit stack rather than recursion, so deeply nested
documents cost heap not call stack. Children are pushed in reverse so they come
off the stack, and get sent, in document order.
*/

use serde_json::Value;

use crate::config::NullPolicy;
use crate::jsonpath::{JsonPath, PathStyle, Step};
use crate::leaf::Leaf;
use crate::sender::Sender;

#[derive(Debug,Clone)]
pub struct Walker {
  pub style : PathStyle,
  pub root : String,
  pub nulls : NullPolicy,
}

impl Walker {
  pub fn new(style : PathStyle, root : impl Into<String>, nulls : NullPolicy) -> Self {
    Self{ style, root: root.into(), nulls }
  }

  /// Send every leaf of `doc`. Stops at the first send error.
  pub fn walk<Snd : Sender>(&self, doc : &Value, tx : &mut Snd) -> Result<(), Snd::SendError> {
    let mut pending : Vec<(JsonPath, &Value)> = vec![(JsonPath::new(), doc)];

    while let Some((path, value)) = pending.pop() {
      let leaf = match value {
        Value::Null => match self.nulls {
          NullPolicy::Ignore => continue,
          NullPolicy::Reject => Leaf::Null,
        },
        Value::Bool(b) => Leaf::Boolean(*b),
        // always Some unless serde_json has arbitrary_precision, which we don't enable
        Value::Number(n) => Leaf::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Leaf::String(s),

        Value::Array(elements) => {
          // NOTE rpds persistent vector, so this is cheap
          let element_path = path.push_back(Step::Index);
          pending.extend(elements.iter().rev().map(|element| (element_path.clone(), element)));
          continue
        }
        Value::Object(entries) => {
          pending.extend(entries.iter().rev().map(|(key, v)| (path.push_back(key.into()), v)));
          continue
        }
      };

      tx.send(&self.style.render(&self.root, &path), leaf)?
    }
    Ok(())
  }
}

#[cfg(test)]
mod test_walker {
  use super::*;
  use crate::fn_snd::FnSnd;
  use serde_json::json;

  // (path, leaf as text) in the order they were sent
  fn collect(walker : &Walker, doc : &Value) -> Vec<(String, String)> {
    let mut sent = vec![];
    let mut tx = FnSnd::new(|path : &str, leaf : Leaf<'_>| {
      sent.push((path.to_string(), format!("{leaf:?}")));
      Ok::<(),()>(())
    });
    walker.walk(doc, &mut tx).unwrap();
    sent
  }

  fn leading() -> Walker { Walker::new(PathStyle::Leading, ".", NullPolicy::Ignore) }

  #[test]
  fn document_order() {
    let doc = json!({"a": 1, "b": {"c": "x", "d": [true, false]}});
    let sent = collect(&leading(), &doc);
    assert_eq!(sent, vec![
      (".a".into(), "Number(1.0)".into()),
      (".b.c".into(), "String(\"x\")".into()),
      (".b.d[]".into(), "Boolean(true)".into()),
      (".b.d[]".into(), "Boolean(false)".into()),
    ]);
  }

  #[test]
  fn trailing_style() {
    let walker = Walker::new(PathStyle::Trailing, ".", NullPolicy::Ignore);
    let doc = json!({"tags": [{"name": "x"}], "n": 2});
    let paths = collect(&walker, &doc).into_iter().map(|(p,_)| p).collect::<Vec<_>>();
    assert_eq!(paths, vec![".n.", ".tags.[]name."]);
  }

  #[test]
  fn nested_arrays() {
    let doc = json!([[1, 2], [3]]);
    let paths = collect(&leading(), &doc).into_iter().map(|(p,_)| p).collect::<Vec<_>>();
    assert_eq!(paths, vec![".[][]", ".[][]", ".[][]"]);
  }

  #[test]
  fn top_level_scalar_is_root() {
    assert_eq!(collect(&leading(), &json!("hi")), vec![(".".to_string(), "String(\"hi\")".to_string())]);
  }

  #[test]
  fn nulls_ignored() {
    let doc = json!({"a": null, "b": [null]});
    assert!(collect(&leading(), &doc).is_empty());
  }

  #[test]
  fn nulls_sent() {
    let walker = Walker::new(PathStyle::Leading, ".", NullPolicy::Reject);
    let doc = json!({"a": null});
    assert_eq!(collect(&walker, &doc), vec![(".a".to_string(), "Null".to_string())]);
  }

  #[test]
  fn empty_containers_send_nothing() {
    assert!(collect(&leading(), &json!({"a": [], "b": {}})).is_empty());
  }

  #[test]
  fn stops_at_first_error() {
    let doc = json!({"a": 1, "b": 2, "c": 3});
    let mut seen = 0;
    let mut tx = FnSnd::new(|path : &str, _leaf : Leaf<'_>| {
      seen += 1;
      if path == ".b" { Err(path.to_string()) } else { Ok(()) }
    });
    assert_eq!(leading().walk(&doc, &mut tx), Err(".b".to_string()));
    assert_eq!(seen, 2);
  }

  #[test]
  fn deep_nesting() {
    let mut doc = json!(1);
    for _ in 0..10_000 {
      doc = Value::Array(vec![doc]);
    }
    let sent = collect(&leading(), &doc);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.len(), 1 + 2 * 10_000);
    crate::parser::discard(doc);
  }
}
