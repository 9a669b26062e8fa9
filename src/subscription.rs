//! Subscription handles returned by `subscribe`.
//!
//! Subscriptions are control handles: `unsubscribe` consumes the handle, and
//! every handle is `'static` so it can be stored and called at an arbitrary
//! later time (e.g. inside a `TakeUntil` slot or a `SubscriptionGuard`).

/// Handle to cancel an active subscription.
pub trait Subscription {
  /// Deregister the observer before the stream has finished emitting.
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;
}

/// Synchronous sources finish inside `subscribe`, so their handle is `()` and
/// is always closed.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

/// Helper trait for calling unsubscribe on boxed trait objects
///
/// Since `Subscription::unsubscribe(self)` requires `Sized`, we need this
/// workaround trait to enable `Box<dyn Subscription>` to call unsubscribe.
pub trait BoxedSubscriptionInner {
  fn boxed_unsubscribe(self: Box<Self>);
  fn boxed_is_closed(&self) -> bool;
}

impl<T: Subscription> BoxedSubscriptionInner for T {
  #[inline]
  fn boxed_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn boxed_is_closed(&self) -> bool { self.is_closed() }
}

/// A type-erased subscription, used by `box_it` and for storing
/// heterogeneous handles in collections.
pub struct BoxedSubscription(Box<dyn BoxedSubscriptionInner>);

impl BoxedSubscription {
  #[inline]
  pub fn new(subscription: impl Subscription + 'static) -> Self { Self(Box::new(subscription)) }
}

impl Subscription for BoxedSubscription {
  #[inline]
  fn unsubscribe(self) { self.0.boxed_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.boxed_is_closed() }
}

/// Two subscriptions managed as one, e.g. a source and its notifier.
pub struct TupleSubscription<U1, U2> {
  unsub1: U1,
  unsub2: U2,
}

impl<U1, U2> TupleSubscription<U1, U2> {
  pub fn new(unsub1: U1, unsub2: U2) -> Self { TupleSubscription { unsub1, unsub2 } }
}

impl<U1, U2> Subscription for TupleSubscription<U1, U2>
where
  U1: Subscription,
  U2: Subscription,
{
  fn unsubscribe(self) {
    self.unsub1.unsubscribe();
    self.unsub2.unsubscribe();
  }

  /// Closed only when both halves are closed.
  fn is_closed(&self) -> bool { self.unsub1.is_closed() && self.unsub2.is_closed() }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(Option<T>);

impl<T: Subscription> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(Some(subscription)) }

  /// Disarm the guard and give the subscription back.
  pub fn into_inner(mut self) -> Option<T> { self.0.take() }

  pub fn is_closed(&self) -> bool { self.0.as_ref().is_none_or(Subscription::is_closed) }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.unsubscribe();
    }
  }
}

/// Extension used at call sites: `source.subscribe(..).unsubscribe_when_dropped()`.
pub trait SubscriptionExt: Subscription + Sized {
  /// Activates "RAII" behavior for this subscription.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self> { SubscriptionGuard::new(self) }
}

impl<T: Subscription> SubscriptionExt for T {}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  /// A mock subscription for testing
  struct MockSubscription {
    closed: Rc<RefCell<bool>>,
  }

  impl MockSubscription {
    fn new() -> (Self, Rc<RefCell<bool>>) {
      let closed = Rc::new(RefCell::new(false));
      (Self { closed: closed.clone() }, closed)
    }
  }

  impl Subscription for MockSubscription {
    fn unsubscribe(self) { *self.closed.borrow_mut() = true; }

    fn is_closed(&self) -> bool { *self.closed.borrow() }
  }

  #[take_until_destroy_macro::test]
  fn test_boxed_subscription() {
    let (mock, closed) = MockSubscription::new();
    let boxed = BoxedSubscription::new(mock);

    assert!(!boxed.is_closed());
    boxed.unsubscribe();
    assert!(*closed.borrow());
  }

  #[take_until_destroy_macro::test]
  fn test_boxed_subscription_with_unit() {
    let boxed = BoxedSubscription::new(());
    assert!(boxed.is_closed());
    boxed.unsubscribe();
  }

  #[take_until_destroy_macro::test]
  fn test_tuple_subscription() {
    let (mock1, closed1) = MockSubscription::new();
    let (mock2, closed2) = MockSubscription::new();

    let tuple_sub = TupleSubscription::new(mock1, mock2);
    assert!(!tuple_sub.is_closed());

    tuple_sub.unsubscribe();
    assert!(*closed1.borrow());
    assert!(*closed2.borrow());
  }

  #[take_until_destroy_macro::test]
  fn test_guard_unsubscribes_on_drop() {
    let (mock, closed) = MockSubscription::new();
    {
      let _guard = mock.unsubscribe_when_dropped();
      assert!(!*closed.borrow());
    }
    assert!(*closed.borrow());
  }

  #[take_until_destroy_macro::test]
  fn test_guard_into_inner_disarms() {
    let (mock, closed) = MockSubscription::new();
    let guard = SubscriptionGuard::new(mock);
    let inner = guard.into_inner();
    assert!(!*closed.borrow());
    assert!(inner.is_some());
  }
}
