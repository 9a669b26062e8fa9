//! Observable traits.
//!
//! [`CoreObservable`] is the subscription primitive every source and operator
//! implements. [`Observable`] is the user-facing API: it is implemented for
//! every core observable and provides `subscribe` plus the operators.

mod from_iter;
mod of;

use std::convert::Infallible;

pub use from_iter::{from_iter, FromIter};
pub use of::{of, Of};

use crate::{
  observer::{FnMutObserver, Observer},
  ops::{
    box_it::BoxedObservable,
    into_stream::IntoStream,
    map::Map,
    on_complete::OnComplete,
    take_until::TakeUntil,
  },
  subscription::Subscription,
};

/// A representation of any set of values over any amount of time.
pub trait CoreObservable: Sized {
  type Item;
  type Err;
  type Unsub: Subscription + 'static;

  /// Attach `observer`; the returned handle cancels it.
  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Self::Item, Self::Err> + 'static;
}

/// The operator and subscription surface shared by every observable.
pub trait Observable: CoreObservable {
  /// Subscribe with a `next` closure. Only available for streams that cannot
  /// error.
  fn subscribe<F>(self, next: F) -> Self::Unsub
  where
    Self: CoreObservable<Err = Infallible>,
    F: FnMut(Self::Item) + 'static,
  {
    self.actual_subscribe(FnMutObserver(next))
  }

  /// Subscribe with a full observer.
  fn subscribe_with<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Self::Item, Self::Err> + 'static,
  {
    self.actual_subscribe(observer)
  }

  /// Emit values until `notifier` emits, then complete.
  ///
  /// A notifier that errors or completes without emitting is ignored.
  fn take_until<N>(self, notifier: N) -> TakeUntil<Self, N>
  where
    N: CoreObservable,
  {
    TakeUntil { source: self, notifier }
  }

  fn map<B, F>(self, f: F) -> Map<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    Map { source: self, func: f }
  }

  /// Run `callback` when the stream completes, before forwarding the
  /// completion.
  fn on_complete<F>(self, callback: F) -> OnComplete<Self, F>
  where
    F: FnOnce(),
  {
    OnComplete::new(self, callback)
  }

  /// Erase the concrete observable type.
  fn box_it(self) -> BoxedObservable<Self::Item, Self::Err>
  where
    Self: 'static,
    Self::Item: 'static,
    Self::Err: 'static,
  {
    BoxedObservable::new(self)
  }

  /// Bridge into an async `Stream` of `Result<Item, Err>`.
  fn into_stream(self) -> IntoStream<Self::Item, Self::Err, Self::Unsub>
  where
    Self::Item: 'static,
    Self::Err: 'static,
  {
    IntoStream::new(self)
  }
}

impl<T: CoreObservable> Observable for T {}
