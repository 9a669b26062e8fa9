//! Binding streams to the lifetime of the host that exposes them.
//!
//! A host composes a [`Lifecycle`] and implements [`Destroyable`] plus
//! [`OnDestroy`]. Members that produce streams are decorated with the
//! `#[take_until_destroy]` attribute, a [`DestroyMethod`] or a
//! [`DestroyProperty`]. The first access of any decorated member installs one
//! [`DestroySignal`] for the host; every stream a decorated member produces
//! is wrapped with `take_until(signal)`. [`Teardown::destroy`] runs the host's
//! own teardown logic and then fires the signal, completing all of those
//! streams at once.

mod diagnostic;
mod lifecycle;
mod member;
mod signal;

pub use diagnostic::{DiagnosticSink, Member, MemberKind, TracingSink};
pub use lifecycle::{Destroyable, Lifecycle, OnDestroy, Phase, Teardown};
#[doc(hidden)]
pub use member::intercept_method;
pub use member::{intercept, is_stream_like, DestroyMethod, DestroyProperty, MemberValue};
pub use signal::{DestroySignal, DestroySubscription};
