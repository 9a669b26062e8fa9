//! Consumers of stream events.
//!
//! [`Observer`] is what every operator and subscriber implements. Subjects
//! store observers boxed as [`BoxedObserver`]; multi-input operators such as
//! `take_until` share one downstream through an [`ObserverSlot`].

use std::convert::Infallible;

use crate::rc::MutRc;

/// Receives the events of one subscription.
///
/// `error` and `complete` consume the observer: nothing is delivered after a
/// terminal event.
pub trait Observer<Item, Err> {
  fn next(&mut self, value: Item);

  fn error(self, err: Err);

  fn complete(self);

  /// `true` once the observer accepts no more values. Synchronous sources
  /// poll it to stop early; subjects use it to prune their list.
  fn is_closed(&self) -> bool;
}

/// Object-safe mirror of [`Observer`], implemented for every observer.
///
/// The terminal methods take `Box<Self>` so they can be called through a
/// vtable.
pub trait DynObserver<Item, Err> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: Err) { self.error(err); }
  fn box_complete(self: Box<Self>) { self.complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// How a subject stores its observers.
pub type BoxedObserver<Item, Err> = Box<dyn DynObserver<Item, Err>>;

impl<Item, Err> Observer<Item, Err> for BoxedObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: Err) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).box_is_closed() }
}

/// The `next` closure handed to `subscribe`.
///
/// Only infallible streams can be subscribed with a bare closure, so the
/// error arm is unreachable.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item> Observer<Item, Infallible> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  #[inline]
  fn error(self, err: Infallible) { match err {} }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

enum SlotState<O> {
  Ready(O),
  /// The observer is out of the slot, running `next`.
  Busy,
  /// Terminated while busy; applied when `next` returns.
  Terminating(Box<dyn FnOnce(O)>),
  Closed,
}

/// A downstream observer shared between several upstream observers.
///
/// The observer is moved out of the slot for the duration of `next`, so an
/// upstream may terminate the slot from inside that call: the terminal event
/// is recorded, the slot reports itself closed at once, and the observer
/// receives the event right after its `next` returns. The first terminal
/// event wins.
pub struct ObserverSlot<O>(MutRc<SlotState<O>>);

impl<O> ObserverSlot<O> {
  pub fn new(observer: O) -> Self { Self(MutRc::own(SlotState::Ready(observer))) }

  /// Whether a terminal event was accepted, delivered or not.
  pub fn is_terminated(&self) -> bool {
    matches!(*self.0.rc_deref(), SlotState::Terminating(_) | SlotState::Closed)
  }

  fn terminate(&self, terminal: impl FnOnce(O) + 'static) {
    let state = std::mem::replace(&mut *self.0.rc_deref_mut(), SlotState::Closed);
    match state {
      SlotState::Ready(observer) => terminal(observer),
      SlotState::Busy => *self.0.rc_deref_mut() = SlotState::Terminating(Box::new(terminal)),
      pending @ SlotState::Terminating(_) => *self.0.rc_deref_mut() = pending,
      SlotState::Closed => {}
    }
  }
}

impl<O> Clone for ObserverSlot<O> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<O, Item, Err> Observer<Item, Err> for ObserverSlot<O>
where
  O: Observer<Item, Err> + 'static,
  Err: 'static,
{
  fn next(&mut self, value: Item) {
    let state = std::mem::replace(&mut *self.0.rc_deref_mut(), SlotState::Busy);
    let SlotState::Ready(mut observer) = state else {
      // Re-entrant or late value: nobody is ready to take it.
      *self.0.rc_deref_mut() = state;
      return;
    };

    observer.next(value);

    let state = std::mem::replace(&mut *self.0.rc_deref_mut(), SlotState::Ready(observer));
    if let SlotState::Terminating(terminal) = state {
      let SlotState::Ready(observer) =
        std::mem::replace(&mut *self.0.rc_deref_mut(), SlotState::Closed)
      else {
        return;
      };
      terminal(observer);
    }
  }

  fn error(self, err: Err) { self.terminate(move |o: O| o.error(err)); }

  fn complete(self) { self.terminate(|o: O| o.complete()); }

  fn is_closed(&self) -> bool {
    match &*self.0.rc_deref() {
      SlotState::Ready(observer) => observer.is_closed(),
      SlotState::Busy => false,
      SlotState::Terminating(_) | SlotState::Closed => true,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  /// Logs every event it receives.
  struct Recorder(Rc<RefCell<Vec<String>>>);

  impl Observer<i32, &'static str> for Recorder {
    fn next(&mut self, value: i32) { self.0.borrow_mut().push(format!("next {value}")); }

    fn error(self, err: &'static str) { self.0.borrow_mut().push(format!("error {err}")); }

    fn complete(self) { self.0.borrow_mut().push("complete".to_owned()); }

    fn is_closed(&self) -> bool { false }
  }

  #[take_until_destroy_macro::test]
  fn boxed_observer_forwards_through_the_vtable() {
    let log = Rc::new(RefCell::new(vec![]));
    let mut boxed: BoxedObserver<i32, &'static str> = Box::new(Recorder(log.clone()));

    boxed.next(3);
    assert!(!boxed.is_closed());
    boxed.error("lost");

    assert_eq!(*log.borrow(), vec!["next 3", "error lost"]);
  }

  #[take_until_destroy_macro::test]
  fn fn_mut_observer_only_handles_values() {
    let sum = Rc::new(RefCell::new(0));
    let c_sum = sum.clone();
    let mut observer = FnMutObserver(move |v: i32| *c_sum.borrow_mut() += v);

    observer.next(4);
    observer.next(5);
    assert!(!observer.is_closed());
    Observer::<i32, Infallible>::complete(observer);

    assert_eq!(*sum.borrow(), 9);
  }

  #[take_until_destroy_macro::test]
  fn slot_delivers_the_first_terminal_event_only() {
    let log = Rc::new(RefCell::new(vec![]));
    let mut slot = ObserverSlot::new(Recorder(log.clone()));

    slot.next(1);
    slot.clone().complete();
    Observer::<i32, &'static str>::error(slot.clone(), "late");
    slot.next(2);

    assert!(slot.is_terminated());
    assert!(Observer::<i32, &'static str>::is_closed(&slot));
    assert_eq!(*log.borrow(), vec!["next 1", "complete"]);
  }

  /// Completes its own slot from inside `next`, the way a notifier does when
  /// a subscriber triggers teardown.
  struct SelfClosing {
    log: Rc<RefCell<Vec<String>>>,
    slot: Rc<RefCell<Option<ObserverSlot<SelfClosing>>>>,
  }

  impl Observer<i32, &'static str> for SelfClosing {
    fn next(&mut self, value: i32) {
      self.log.borrow_mut().push(format!("next {value}"));
      let slot = self.slot.borrow().clone();
      if let Some(slot) = slot {
        assert!(!Observer::<i32, &'static str>::is_closed(&slot));
        Observer::<i32, &'static str>::complete(slot.clone());
        assert!(Observer::<i32, &'static str>::is_closed(&slot));
        self.log.borrow_mut().push("completion requested".to_owned());
      }
    }

    fn error(self, err: &'static str) { self.log.borrow_mut().push(format!("error {err}")); }

    fn complete(self) { self.log.borrow_mut().push("complete".to_owned()); }

    fn is_closed(&self) -> bool { false }
  }

  #[take_until_destroy_macro::test]
  fn slot_defers_termination_requested_during_next() {
    let log = Rc::new(RefCell::new(vec![]));
    let cell = Rc::new(RefCell::new(None));
    let mut slot = ObserverSlot::new(SelfClosing { log: log.clone(), slot: cell.clone() });
    *cell.borrow_mut() = Some(slot.clone());

    slot.next(1);
    slot.next(2);

    assert_eq!(*log.borrow(), vec!["next 1", "completion requested", "complete"]);
    assert!(slot.is_terminated());
  }
}
