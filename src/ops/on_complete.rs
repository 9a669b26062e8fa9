//! `on_complete`: a side effect on normal completion.
//!
//! Hosts use it to observe the termination notice a bound stream receives when
//! its host is torn down.

use crate::{observable::CoreObservable, observer::Observer};

#[derive(Clone)]
pub struct OnComplete<S, F> {
  source: S,
  callback: F,
}

impl<S, F> OnComplete<S, F> {
  pub fn new(source: S, callback: F) -> Self { Self { source, callback } }
}

/// Runs the callback, then completes the downstream. Errors and early
/// unsubscription skip the callback.
pub struct CompletionHook<O, F> {
  downstream: O,
  callback: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for CompletionHook<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { self.downstream.next(value); }

  #[inline]
  fn error(self, err: Err) { self.downstream.error(err); }

  fn complete(self) {
    let Self { downstream, callback } = self;
    callback();
    downstream.complete();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<S, F> CoreObservable for OnComplete<S, F>
where
  S: CoreObservable,
  F: FnOnce() + 'static,
{
  type Item = S::Item;
  type Err = S::Err;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, downstream: O) -> Self::Unsub
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    self
      .source
      .actual_subscribe(CompletionHook { downstream, callback: self.callback })
  }
}
