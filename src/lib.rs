//! # take-until-destroy: streams that end with their host
//!
//! Marks methods and properties of a host object whose streams should be
//! cancelled automatically when the host is torn down. The first access of a
//! decorated member lazily installs a destroy signal on the host; every stream
//! the member produces is wrapped with `take_until(signal)`, and the host's
//! teardown fires the signal once, completing all of them.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::{cell::RefCell, convert::Infallible, rc::Rc};
//!
//! use take_until_destroy::prelude::*;
//!
//! #[derive(Default)]
//! struct Counter {
//!   lifecycle: Lifecycle,
//!   values: Subject<u32, Infallible>,
//! }
//!
//! impl Destroyable for Counter {
//!   fn lifecycle(&self) -> &Lifecycle { &self.lifecycle }
//! }
//!
//! impl OnDestroy for Counter {}
//!
//! impl Counter {
//!   #[take_until_destroy]
//!   fn values(&self) -> Subject<u32, Infallible> { self.values.clone() }
//! }
//!
//! let mut counter = Counter::default();
//! let seen = Rc::new(RefCell::new(vec![]));
//! let c_seen = seen.clone();
//! counter.values().subscribe(move |v| c_seen.borrow_mut().push(v));
//!
//! counter.values.next(1);
//! counter.destroy(());
//! counter.values.next(2);
//!
//! assert_eq!(*seen.borrow(), vec![1]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Lifecycle`] | Per-host binding state, exposed through [`Destroyable`] |
//! | [`OnDestroy`] / [`Teardown`] | The host's own teardown logic, and the composed teardown that also fires the signal |
//! | [`DestroySignal`] | Single-fire notifier shared by every bound stream of a host |
//! | [`DestroyMethod`] / [`DestroyProperty`] | Decorating members without the attribute macro |
//! | [`DiagnosticSink`] | Where warnings about non-stream members go |
//!
//! ## Feature Flags
//!
//! - **`macros`** (default): re-exports the `#[take_until_destroy]` attribute
//!
//! [`Lifecycle`]: destroy::Lifecycle
//! [`Destroyable`]: destroy::Destroyable
//! [`OnDestroy`]: destroy::OnDestroy
//! [`Teardown`]: destroy::Teardown
//! [`DestroySignal`]: destroy::DestroySignal
//! [`DestroyMethod`]: destroy::DestroyMethod
//! [`DestroyProperty`]: destroy::DestroyProperty
//! [`DiagnosticSink`]: destroy::DiagnosticSink

// Lets `::take_until_destroy::..` paths emitted by the attribute resolve inside
// this crate's own tests.
extern crate self as take_until_destroy;

pub mod destroy;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod subject;
pub mod subscription;

// Re-export the prelude module
pub use prelude::*;
#[doc(hidden)]
pub use destroy::intercept_method;

#[cfg(all(doctest, not(target_arch = "wasm32")))]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
