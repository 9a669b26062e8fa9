//! The single-fire destroy signal.

use std::{
  convert::Infallible,
  fmt::{Debug, Formatter},
};

use crate::{
  observable::CoreObservable,
  observer::Observer,
  rc::MutRc,
  subject::{Subject, SubjectSubscription},
  subscription::Subscription,
};

enum SignalState {
  Armed(Subject<(), Infallible>),
  Fired,
}

/// A broadcast notifier that fires at most once.
///
/// Firing emits `()` to every stream bound to the signal and then completes,
/// after which the signal is exhausted. Subscribing to an exhausted signal
/// receives the `()` right away, so a stream bound after teardown is cancelled
/// as soon as it is subscribed.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct DestroySignal(MutRc<SignalState>);

impl DestroySignal {
  pub fn new() -> Self { Self(MutRc::own(SignalState::Armed(Subject::new()))) }

  /// A signal that is already exhausted.
  pub fn fired() -> Self { Self(MutRc::own(SignalState::Fired)) }

  /// Notify every bound stream, then exhaust the signal.
  ///
  /// Returns `false` if the signal had already fired.
  pub fn fire(&self) -> bool {
    let previous = std::mem::replace(&mut *self.0.rc_deref_mut(), SignalState::Fired);
    let SignalState::Armed(subject) = previous else { return false };

    tracing::debug!(
      target: "take_until_destroy",
      observers = subject.observer_count(),
      "destroy signal fired"
    );
    subject.clone().next(());
    subject.complete();
    true
  }

  pub fn is_fired(&self) -> bool { matches!(*self.0.rc_deref(), SignalState::Fired) }

  /// Number of streams currently waiting on the signal.
  pub fn observer_count(&self) -> usize {
    match &*self.0.rc_deref() {
      SignalState::Armed(subject) => subject.observer_count(),
      SignalState::Fired => 0,
    }
  }

  /// Whether both handles share the same state.
  pub fn ptr_eq(&self, other: &Self) -> bool { self.0.ptr_eq(&other.0) }
}

impl Default for DestroySignal {
  fn default() -> Self { Self::new() }
}

impl Debug for DestroySignal {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DestroySignal")
      .field("fired", &self.is_fired())
      .field("observers", &self.observer_count())
      .finish()
  }
}

impl CoreObservable for DestroySignal {
  type Item = ();
  type Err = Infallible;
  type Unsub = DestroySubscription;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<(), Infallible> + 'static,
  {
    let armed = match &*self.0.rc_deref() {
      SignalState::Armed(subject) => Some(subject.clone()),
      SignalState::Fired => None,
    };
    match armed {
      Some(subject) => DestroySubscription(Some(subject.actual_subscribe(observer))),
      None => {
        observer.next(());
        observer.complete();
        DestroySubscription(None)
      }
    }
  }
}

/// Subscription to a [`DestroySignal`].
pub struct DestroySubscription(Option<SubjectSubscription<(), Infallible>>);

impl Subscription for DestroySubscription {
  fn unsubscribe(self) {
    if let Some(inner) = self.0 {
      inner.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.as_ref().is_none_or(Subscription::is_closed) }
}
