use std::convert::Infallible;

use crate::{observable::CoreObservable, observer::Observer};

/// Emits a single value, then completes.
#[derive(Clone)]
pub struct Of<T>(pub T);

pub fn of<T>(v: T) -> Of<T> { Of(v) }

impl<T> CoreObservable for Of<T> {
  type Item = T;
  type Err = Infallible;
  type Unsub = ();

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<T, Infallible> + 'static,
  {
    if !observer.is_closed() {
      observer.next(self.0);
    }
    if !observer.is_closed() {
      observer.complete();
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[take_until_destroy_macro::test]
  fn emits_once_then_completes() {
    let values = Rc::new(RefCell::new(vec![]));
    let completed = Rc::new(RefCell::new(false));
    let c_values = values.clone();
    let c_completed = completed.clone();

    observable::of(100)
      .on_complete(move || *c_completed.borrow_mut() = true)
      .subscribe(move |v| c_values.borrow_mut().push(v));

    assert_eq!(*values.borrow(), vec![100]);
    assert!(*completed.borrow());
  }
}
