//! Multicast subject.
//!
//! A [`Subject`] is both an observer and an observable: values pushed into it
//! are broadcast to every current subscriber. Clones share the subscriber
//! list, so a host can keep one handle for emitting and hand out others for
//! subscribing.

mod subscribers;

use std::fmt::{Debug, Formatter};

pub use subscribers::Subscribers;
use subscribers::{broadcast_complete, broadcast_error, broadcast_value, Event, SubjectState};

use crate::{
  observable::CoreObservable,
  observer::Observer,
  rc::MutRc,
  subscription::Subscription,
};

pub struct Subject<Item, Err> {
  observers: MutRc<Subscribers<Item, Err>>,
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Self { observers: MutRc::own(Subscribers::default()) } }

  /// Number of observers currently registered.
  pub fn observer_count(&self) -> usize { self.observers.rc_deref().len() }

  /// `true` once the subject completed or errored.
  pub fn is_stopped(&self) -> bool { self.observers.rc_deref().is_stopped() }

  fn emit(&self, event: Event<Item, Err>)
  where
    Item: Clone,
    Err: Clone,
  {
    if !self.observers.rc_deref_mut().enqueue(event) {
      return;
    }
    loop {
      let next = self.observers.rc_deref_mut().take_next();
      let Some((event, mut taken)) = next else { return };
      match event {
        Event::Next(value) => {
          broadcast_value(&mut taken, value);
          self.observers.rc_deref_mut().restore(taken);
        }
        Event::Error(err) => {
          let observers = self
            .observers
            .rc_deref_mut()
            .terminate(SubjectState::Errored(err.clone()), taken);
          broadcast_error(observers, err);
        }
        Event::Complete => {
          let observers = self
            .observers
            .rc_deref_mut()
            .terminate(SubjectState::Completed, taken);
          broadcast_complete(observers);
        }
      }
    }
  }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Self { observers: self.observers.clone() } }
}

impl<Item, Err> Debug for Subject<Item, Err> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subject")
      .field("observers", &self.observer_count())
      .field("stopped", &self.is_stopped())
      .finish()
  }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for Subject<Item, Err> {
  fn next(&mut self, value: Item) { self.emit(Event::Next(value)); }

  fn error(self, err: Err) { self.emit(Event::Error(err)); }

  fn complete(self) { self.emit(Event::Complete); }

  fn is_closed(&self) -> bool { self.is_stopped() }
}

impl<Item, Err> CoreObservable for Subject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;
  type Unsub = SubjectSubscription<Item, Err>;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item, Err> + 'static,
  {
    let mut inner = self.observers.rc_deref_mut();
    match inner.state() {
      SubjectState::Active => {
        let id = inner.add(Box::new(observer));
        drop(inner);
        SubjectSubscription { observers: self.observers, id: Some(id) }
      }
      SubjectState::Completed => {
        drop(inner);
        observer.complete();
        SubjectSubscription { observers: self.observers, id: None }
      }
      SubjectState::Errored(err) => {
        let err = err.clone();
        drop(inner);
        observer.error(err);
        SubjectSubscription { observers: self.observers, id: None }
      }
    }
  }
}

/// Subscription handle for a Subject.
///
/// Unsubscribing removes the observer from the subject; it is safe to do so
/// from inside one of the subject's own broadcasts.
pub struct SubjectSubscription<Item, Err> {
  observers: MutRc<Subscribers<Item, Err>>,
  id: Option<usize>,
}

impl<Item, Err> Subscription for SubjectSubscription<Item, Err> {
  fn unsubscribe(self) {
    if let Some(id) = self.id {
      // Bind the removed observer so it is dropped after the borrow ends.
      let _removed = self.observers.rc_deref_mut().remove(id);
    }
  }

  fn is_closed(&self) -> bool {
    let Some(id) = self.id else { return true };
    let inner = self.observers.rc_deref();
    inner.is_stopped() || (!inner.is_emitting() && !inner.contains(id))
  }
}
