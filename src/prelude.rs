//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Destroy binding
pub use crate::destroy::{
  intercept, is_stream_like, DestroyMethod, DestroyProperty, DestroySignal, Destroyable,
  DiagnosticSink, Lifecycle, Member, MemberKind, MemberValue, OnDestroy, Phase, Teardown,
  TracingSink,
};
// Attribute and derive macros
#[cfg(feature = "macros")]
pub use take_until_destroy_macro::{take_until_destroy, MemberValue};
// Observer trait
pub use crate::observer::{FnMutObserver, Observer, ObserverSlot};
// Operators
pub use crate::ops::{
  box_it::BoxedObservable, into_stream::IntoStream, on_complete::OnComplete, map::Map,
  take_until::TakeUntil,
};
// Subject
pub use crate::subject::{Subject, SubjectSubscription};
// Subscription
pub use crate::subscription::*;
pub use crate::{
  observable,
  observable::{CoreObservable, FromIter, Observable, Of},
};
