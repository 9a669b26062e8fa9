//! IntoStream Operator
//!
//! Converts an observable into a `futures::Stream`, so values of a bound
//! stream can be consumed with `while let Some(..) = stream.next().await`.
//!
//! # Example
//!
//! ```rust
//! use futures::StreamExt;
//! use take_until_destroy::prelude::*;
//!
//! # async fn example() {
//! let mut stream = observable::of(1).into_stream();
//!
//! if let Some(Ok(value)) = stream.next().await {
//!   println!("Received: {}", value);
//! }
//! # }
//! ```

use std::{
  collections::VecDeque,
  pin::Pin,
  task::{Context, Poll, Waker},
};

use futures::Stream;

use crate::{observable::CoreObservable, observer::Observer, rc::MutRc, subscription::Subscription};

/// State shared between the subscription and the stream consumer.
#[doc(hidden)]
pub struct IntoStreamState<T, E> {
  /// Items and errors waiting to be polled.
  queue: VecDeque<Result<T, E>>,
  /// The task waiting on the stream.
  waker: Option<Waker>,
  /// Set once the observable completed or errored.
  is_closed: bool,
}

impl<T, E> Default for IntoStreamState<T, E> {
  fn default() -> Self { Self { queue: VecDeque::new(), waker: None, is_closed: false } }
}

impl<T, E> IntoStreamState<T, E> {
  fn wake(&mut self) {
    if let Some(waker) = self.waker.take() {
      waker.wake();
    }
  }
}

/// A `Stream` that yields values emitted by an observable.
///
/// - `Ok(T)`: Emitted for each `next` value from the observable.
/// - `Err(E)`: Emitted when the observable signals an `error`.
/// - `None`: End of stream, after `complete` or after an error.
///
/// Dropping the stream unsubscribes from the observable.
pub struct IntoStream<T, E, U: Subscription> {
  state: MutRc<IntoStreamState<T, E>>,
  unsub: Option<U>,
}

impl<T: 'static, E: 'static, U: Subscription> IntoStream<T, E, U> {
  pub fn new<S>(observable: S) -> Self
  where
    S: CoreObservable<Item = T, Err = E, Unsub = U>,
  {
    let state = MutRc::own(IntoStreamState::default());
    let unsub = observable.actual_subscribe(IntoStreamObserver { state: state.clone() });
    IntoStream { state, unsub: Some(unsub) }
  }
}

impl<T, E, U: Subscription> Unpin for IntoStream<T, E, U> {}

impl<T, E, U: Subscription> Stream for IntoStream<T, E, U> {
  type Item = Result<T, E>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let mut state = self.state.rc_deref_mut();

    if let Some(item) = state.queue.pop_front() {
      return Poll::Ready(Some(item));
    }

    if state.is_closed {
      return Poll::Ready(None);
    }

    state.waker = Some(cx.waker().clone());
    Poll::Pending
  }
}

impl<T, E, U: Subscription> Drop for IntoStream<T, E, U> {
  fn drop(&mut self) {
    if let Some(unsub) = self.unsub.take() {
      unsub.unsubscribe();
    }
  }
}

/// An `Observer` that forwards emissions into the shared state.
#[doc(hidden)]
pub struct IntoStreamObserver<T, E> {
  state: MutRc<IntoStreamState<T, E>>,
}

impl<T, E> Observer<T, E> for IntoStreamObserver<T, E> {
  fn next(&mut self, value: T) {
    let mut state = self.state.rc_deref_mut();
    state.queue.push_back(Ok(value));
    state.wake();
  }

  fn error(self, err: E) {
    let mut state = self.state.rc_deref_mut();
    state.queue.push_back(Err(err));
    state.is_closed = true;
    state.wake();
  }

  fn complete(self) {
    let mut state = self.state.rc_deref_mut();
    state.is_closed = true;
    state.wake();
  }

  fn is_closed(&self) -> bool { self.state.rc_deref().is_closed }
}
