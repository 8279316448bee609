use crate::leaf::Leaf;

// This is a lot of machinery just to call a function :-\
pub struct FnSnd<F>(pub F);

impl<F> FnSnd<F> {
  // the bound is here so closures passed in get the higher-ranked signature
  pub fn new<E>(f : F) -> Self
  where F : FnMut(&str, Leaf<'_>) -> Result<(),E>
  {
    Self(f)
  }
}

impl<F,E> crate::sender::Sender for FnSnd<F>
where
  F : FnMut(&str, Leaf<'_>) -> Result<(),E>,
  E : std::fmt::Debug,
{
  type SendError = E;

  fn send(&mut self, path : &str, leaf : Leaf<'_>) -> Result<(), E> {
    (self.0)(path, leaf)
  }
}
