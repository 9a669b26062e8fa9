use crate::{observable::CoreObservable, observer::Observer};

/// Transforms each value with a closure.
#[derive(Clone)]
pub struct Map<S, F> {
  pub source: S,
  pub func: F,
}

pub struct MapObserver<O, F> {
  observer: O,
  map: F,
}

impl<S, F, B> CoreObservable for Map<S, F>
where
  S: CoreObservable,
  F: FnMut(S::Item) -> B + 'static,
{
  type Item = B;
  type Err = S::Err;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<B, S::Err> + 'static,
  {
    self
      .source
      .actual_subscribe(MapObserver { observer, map: self.func })
  }
}

impl<Item, Err, O, F, B> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  fn next(&mut self, value: Item) { self.observer.next((self.map)(value)) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[take_until_destroy_macro::test]
  fn primitive_type() {
    let i = Rc::new(RefCell::new(0));
    let c_i = i.clone();
    observable::from_iter(100..101)
      .map(|v| v * 2)
      .subscribe(move |v| *c_i.borrow_mut() = v);
    assert_eq!(*i.borrow(), 200);
  }

  #[take_until_destroy_macro::test]
  fn map_types_mixed() {
    let i = Rc::new(RefCell::new(0));
    let c_i = i.clone();
    observable::from_iter(vec!['a', 'b', 'c'])
      .map(|_| 1)
      .subscribe(move |v| *c_i.borrow_mut() += v);
    assert_eq!(*i.borrow(), 3);
  }
}
