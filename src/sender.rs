/*!
The Sender trait.

The walker will ultimately send every leaf, along with its rendered path, to an
implementation of Sender.

Parameterised over the error, because the registry fails with a type mismatch
but a plain function might not fail at all.
*/

use crate::leaf::Leaf;

/// This can be implemented by anything from a function call to the registry.
pub trait Sender {
  type SendError : std::fmt::Debug;
  fn send(&mut self, path : &str, leaf : Leaf<'_>) -> Result<(), Self::SendError>;
}
