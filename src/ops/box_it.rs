use crate::{
  observable::CoreObservable,
  observer::{BoxedObserver, Observer},
  subscription::BoxedSubscription,
};

type SubscribeFn<Item, Err> = Box<dyn FnOnce(BoxedObserver<Item, Err>) -> BoxedSubscription>;

/// A type-erased observable.
///
/// Handy as the concrete return type of a method that builds different
/// pipelines, e.g. a `#[take_until_destroy]` member.
pub struct BoxedObservable<Item, Err>(SubscribeFn<Item, Err>);

impl<Item: 'static, Err: 'static> BoxedObservable<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: CoreObservable<Item = Item, Err = Err> + 'static,
  {
    Self(Box::new(move |observer| BoxedSubscription::new(source.actual_subscribe(observer))))
  }
}

impl<Item: 'static, Err: 'static> CoreObservable for BoxedObservable<Item, Err> {
  type Item = Item;
  type Err = Err;
  type Unsub = BoxedSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item, Err> + 'static,
  {
    (self.0)(Box::new(observer))
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  #[take_until_destroy_macro::test]
  fn box_erases_pipeline_type() {
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();

    let boxed: BoxedObservable<i32, Infallible> =
      observable::from_iter(1..4).map(|v| v * 10).box_it();
    boxed.subscribe(move |v| c_values.borrow_mut().push(v));

    assert_eq!(*values.borrow(), vec![10, 20, 30]);
  }

  #[take_until_destroy_macro::test]
  fn boxed_subject_unsubscribes() {
    let subject = Subject::<i32, Infallible>::new();
    let subscription = subject.clone().box_it().subscribe(|_| {});
    assert_eq!(subject.observer_count(), 1);
    subscription.unsubscribe();
    assert_eq!(subject.observer_count(), 0);
  }
}
