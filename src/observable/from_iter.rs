use std::convert::Infallible;

use crate::{observable::CoreObservable, observer::Observer};

/// Emits every item of an iterator, then completes.
///
/// Stops early once the observer reports itself closed, which is how a
/// downstream `take_until` cuts off a synchronous source.
#[derive(Clone)]
pub struct FromIter<I>(I);

pub fn from_iter<I: IntoIterator>(iter: I) -> FromIter<I> { FromIter(iter) }

impl<I: IntoIterator> CoreObservable for FromIter<I> {
  type Item = I::Item;
  type Err = Infallible;
  type Unsub = ();

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<I::Item, Infallible> + 'static,
  {
    for v in self.0 {
      if observer.is_closed() {
        return;
      }
      observer.next(v);
    }
    if !observer.is_closed() {
      observer.complete();
    }
  }
}
