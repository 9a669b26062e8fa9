//! TakeUntil operator implementation
//!
//! This module contains the TakeUntil operator, which emits values from the
//! source Observable until a second Observable (the notifier) emits a value.

use crate::{
  observable::CoreObservable,
  observer::{Observer, ObserverSlot},
  rc::MutRc,
  subscription::{Subscription, TupleSubscription},
};

/// TakeUntil operator
///
/// Emits the values emitted by the source Observable until a `notifier`
/// Observable emits a value.
#[derive(Clone)]
pub struct TakeUntil<S, N> {
  pub source: S,
  pub notifier: N,
}

/// Observer for the source observable
pub struct TakeUntilObserver<O, NUnsub> {
  observer: ObserverSlot<O>,
  notifier_proxy: MutRc<Option<NUnsub>>,
}

/// Observer for the notifier observable
///
/// Uses a function pointer to erase Item/Err type dependencies while
/// maintaining the ability to call complete() on the underlying Observer.
pub struct TakeUntilNotifierObserver<O, SUnsub> {
  observer: ObserverSlot<O>,
  source_proxy: MutRc<Option<SUnsub>>,
  complete_fn: fn(ObserverSlot<O>),
}

impl<O, SUnsub> TakeUntilNotifierObserver<O, SUnsub> {
  /// The Item and Err type parameters are only used to pick the `complete`
  /// implementation; they are erased behind `complete_fn`.
  pub fn new<Item, Err>(observer: ObserverSlot<O>, source_proxy: MutRc<Option<SUnsub>>) -> Self
  where
    O: Observer<Item, Err> + 'static,
    Err: 'static,
  {
    Self { observer, source_proxy, complete_fn: |o| Observer::<Item, Err>::complete(o) }
  }
}

impl<S, N> CoreObservable for TakeUntil<S, N>
where
  S: CoreObservable,
  N: CoreObservable,
  S::Item: 'static,
  S::Err: 'static,
{
  type Item = S::Item;
  type Err = S::Err;
  type Unsub = TupleSubscription<MutRc<Option<S::Unsub>>, MutRc<Option<N::Unsub>>>;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    let TakeUntil { source, notifier } = self;

    let observer = ObserverSlot::new(observer);
    let source_proxy: MutRc<Option<S::Unsub>> = MutRc::own(None);

    // Subscribe to the notifier first: an already-fired notifier terminates
    // the downstream before the source gets a chance to emit.
    let notifier_observer =
      TakeUntilNotifierObserver::new::<S::Item, S::Err>(observer.clone(), source_proxy.clone());
    let notifier_unsub = notifier.actual_subscribe(notifier_observer);
    let notifier_proxy = MutRc::own(Some(notifier_unsub));

    if !observer.is_terminated() {
      let source_observer =
        TakeUntilObserver { observer: observer.clone(), notifier_proxy: notifier_proxy.clone() };
      let source_unsub = source.actual_subscribe(source_observer);
      if observer.is_terminated() {
        // Terminated while subscribing (source completed, or the notifier
        // fired synchronously from inside the source).
        source_unsub.unsubscribe();
      } else {
        *source_proxy.rc_deref_mut() = Some(source_unsub);
      }
    }

    TupleSubscription::new(source_proxy, notifier_proxy)
  }
}

impl<Item, Err, O, NUnsub> Observer<Item, Err> for TakeUntilObserver<O, NUnsub>
where
  O: Observer<Item, Err> + 'static,
  Err: 'static,
  NUnsub: Subscription,
{
  fn next(&mut self, value: Item) { Observer::<Item, Err>::next(&mut self.observer, value); }

  fn error(self, err: Err) {
    Observer::<Item, Err>::error(self.observer, err);
    self.notifier_proxy.unsubscribe();
  }

  fn complete(self) {
    Observer::<Item, Err>::complete(self.observer);
    self.notifier_proxy.unsubscribe();
  }

  fn is_closed(&self) -> bool { Observer::<Item, Err>::is_closed(&self.observer) }
}

impl<NotifyItem, NotifyErr, O, SUnsub> Observer<NotifyItem, NotifyErr>
  for TakeUntilNotifierObserver<O, SUnsub>
where
  SUnsub: Subscription,
{
  fn next(&mut self, _value: NotifyItem) {
    (self.complete_fn)(self.observer.clone());
    self.source_proxy.clone().unsubscribe();
  }

  fn error(self, _err: NotifyErr) {
    // Errors of the notifier do not terminate the source.
  }

  fn complete(self) {
    // Completion of the notifier does not terminate the source.
  }

  fn is_closed(&self) -> bool { self.observer.is_terminated() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  #[take_until_destroy_macro::test]
  fn test_take_until_emits_until_notifier_emits() {
    let result = Rc::new(RefCell::new(Vec::new()));
    let result_clone = result.clone();

    let mut notifier = Subject::<(), Infallible>::new();
    let mut source = Subject::<i32, Infallible>::new();

    source
      .clone()
      .take_until(notifier.clone())
      .subscribe(move |v| {
        result_clone.borrow_mut().push(v);
      });

    source.next(1);
    source.next(2);
    notifier.next(());
    source.next(3);

    assert_eq!(*result.borrow(), vec![1, 2]);
    assert_eq!(source.observer_count(), 0);
  }

  #[take_until_destroy_macro::test]
  fn test_take_until_complete() {
    let completed = Rc::new(RefCell::new(false));
    let completed_clone = completed.clone();

    let mut notifier = Subject::<(), Infallible>::new();
    let mut source = Subject::<i32, Infallible>::new();

    source
      .clone()
      .take_until(notifier.clone())
      .on_complete(move || *completed_clone.borrow_mut() = true)
      .subscribe(|_: i32| {});

    source.next(1);
    notifier.next(());

    assert!(*completed.borrow());
  }

  #[take_until_destroy_macro::test]
  fn test_take_until_source_complete() {
    let completed = Rc::new(RefCell::new(false));
    let completed_clone = completed.clone();

    let notifier = Subject::<(), Infallible>::new();
    let mut source = Subject::<i32, Infallible>::new();

    source
      .clone()
      .take_until(notifier.clone())
      .on_complete(move || *completed_clone.borrow_mut() = true)
      .subscribe(|_: i32| {});

    source.next(1);
    source.complete();

    assert!(*completed.borrow());
    assert_eq!(notifier.observer_count(), 0);
  }

  #[take_until_destroy_macro::test]
  fn test_take_until_notifier_complete_does_nothing() {
    let result = Rc::new(RefCell::new(Vec::new()));
    let result_clone = result.clone();

    let notifier = Subject::<(), Infallible>::new();
    let mut source = Subject::<i32, Infallible>::new();

    source
      .clone()
      .take_until(notifier.clone())
      .subscribe(move |v| result_clone.borrow_mut().push(v));

    source.next(1);
    notifier.complete();
    source.next(2);

    assert_eq!(*result.borrow(), vec![1, 2]);
  }

  #[take_until_destroy_macro::test]
  fn test_unsubscribe_releases_both_sides() {
    let notifier = Subject::<(), Infallible>::new();
    let source = Subject::<i32, Infallible>::new();

    let subscription = source
      .clone()
      .take_until(notifier.clone())
      .subscribe(|_| {});
    assert_eq!(source.observer_count(), 1);
    assert_eq!(notifier.observer_count(), 1);

    subscription.unsubscribe();
    assert_eq!(source.observer_count(), 0);
    assert_eq!(notifier.observer_count(), 0);
  }

  #[take_until_destroy_macro::test]
  fn notifier_fired_by_a_synchronous_source_subscriber() {
    let result = Rc::new(RefCell::new(Vec::new()));
    let completed = Rc::new(RefCell::new(false));
    let mut notifier = Subject::<(), Infallible>::new();

    let c_result = result.clone();
    let c_completed = completed.clone();
    let c_notifier = notifier.clone();
    observable::from_iter(0..5)
      .take_until(notifier.clone())
      .on_complete(move || *c_completed.borrow_mut() = true)
      .subscribe(move |v| {
        c_result.borrow_mut().push(v);
        c_notifier.clone().next(());
      });

    assert_eq!(*result.borrow(), vec![0]);
    assert!(*completed.borrow());
    assert_eq!(notifier.observer_count(), 0);
    notifier.next(());
  }

  #[take_until_destroy_macro::test]
  fn notifier_fired_from_inside_a_subject_broadcast() {
    let result = Rc::new(RefCell::new(Vec::new()));
    let completed = Rc::new(RefCell::new(false));
    let notifier = Subject::<(), Infallible>::new();
    let mut source = Subject::<i32, Infallible>::new();

    let c_result = result.clone();
    let c_completed = completed.clone();
    let c_notifier = notifier.clone();
    source
      .clone()
      .take_until(notifier.clone())
      .on_complete(move || *c_completed.borrow_mut() = true)
      .subscribe(move |v| {
        c_result.borrow_mut().push(v);
        c_notifier.clone().next(());
      });

    source.next(1);
    source.next(2);

    assert_eq!(*result.borrow(), vec![1]);
    assert!(*completed.borrow());
    assert_eq!(source.observer_count(), 0);
  }
}
