//! Shared mutable cells used by the runtime.
//!
//! Everything in this crate runs on a single logical thread, so sharing is
//! `Rc<RefCell<_>>` behind a small newtype that reads like the rest of the
//! runtime (`rc_deref` / `rc_deref_mut`).

use std::{
  cell::{Ref, RefCell, RefMut},
  rc::Rc,
};

use crate::subscription::Subscription;

#[derive(Default)]
pub struct MutRc<T>(Rc<RefCell<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  #[inline]
  pub fn rc_deref(&self) -> Ref<'_, T> { self.0.borrow() }

  #[inline]
  pub fn rc_deref_mut(&self) -> RefMut<'_, T> { self.0.borrow_mut() }

  /// Whether both handles point at the same cell.
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> From<T> for MutRc<T> {
  #[inline]
  fn from(t: T) -> Self { Self::own(t) }
}

/// A shared slot subscription, filled in after the upstream subscribe returns.
impl<U: Subscription> Subscription for MutRc<Option<U>> {
  fn unsubscribe(self) {
    let inner = self.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.rc_deref().as_ref().is_none_or(Subscription::is_closed) }
}
