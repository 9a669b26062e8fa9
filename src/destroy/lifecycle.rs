//! Per-host binding state and the teardown traits.

use std::{
  cell::RefCell,
  fmt::{Debug, Formatter},
  rc::Rc,
};

use super::{
  diagnostic::{DiagnosticSink, TracingSink},
  signal::DestroySignal,
};

/// Where a host is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
  /// No decorated member has been accessed yet.
  Unbound,
  /// A destroy signal is installed and armed.
  Bound,
  /// Teardown ran. Terminal.
  Fired,
}

enum Binding {
  Unbound,
  Bound(DestroySignal),
  Fired(Option<DestroySignal>),
}

/// The state a host composes to take part in destroy binding.
///
/// A host stores one `Lifecycle` and exposes it through [`Destroyable`]. The
/// destroy signal is created lazily by the first decorated member access and
/// fired by [`Teardown::destroy`].
pub struct Lifecycle {
  binding: RefCell<Binding>,
  diagnostics: Rc<dyn DiagnosticSink>,
}

impl Lifecycle {
  /// A lifecycle that reports misuse through `tracing`.
  pub fn new() -> Self { Self::with_diagnostics(TracingSink) }

  /// A lifecycle that reports misuse to `sink`.
  pub fn with_diagnostics(sink: impl DiagnosticSink + 'static) -> Self {
    Self { binding: RefCell::new(Binding::Unbound), diagnostics: Rc::new(sink) }
  }

  /// The current phase. Never installs anything.
  pub fn phase(&self) -> Phase {
    match &*self.binding.borrow() {
      Binding::Unbound => Phase::Unbound,
      Binding::Bound(_) => Phase::Bound,
      Binding::Fired(_) => Phase::Fired,
    }
  }

  /// `true` between the first decorated access and teardown.
  pub fn is_bound(&self) -> bool { self.phase() == Phase::Bound }

  /// `true` once [`finalize`](Self::finalize) ran, whether or not a signal
  /// was ever installed.
  pub fn is_destroyed(&self) -> bool { self.phase() == Phase::Fired }

  /// The installed signal, without installing one.
  ///
  /// After teardown this is the exhausted signal, if one was ever installed.
  pub fn signal(&self) -> Option<DestroySignal> {
    match &*self.binding.borrow() {
      Binding::Unbound | Binding::Fired(None) => None,
      Binding::Bound(signal) | Binding::Fired(Some(signal)) => Some(signal.clone()),
    }
  }

  /// Install the destroy signal if needed and return a handle to it.
  ///
  /// Every call before teardown returns the same signal. After teardown the
  /// returned signal has already fired.
  pub fn ensure_bound(&self) -> DestroySignal {
    let mut binding = self.binding.borrow_mut();
    match &*binding {
      Binding::Bound(signal) | Binding::Fired(Some(signal)) => signal.clone(),
      Binding::Fired(None) => DestroySignal::fired(),
      Binding::Unbound => {
        let signal = DestroySignal::new();
        *binding = Binding::Bound(signal.clone());
        tracing::trace!(target: "take_until_destroy", "destroy signal installed");
        signal
      }
    }
  }

  /// Mark the host destroyed and fire the signal if one was installed.
  ///
  /// Safe to call more than once.
  pub fn finalize(&self) {
    let signal = {
      let mut binding = self.binding.borrow_mut();
      match std::mem::replace(&mut *binding, Binding::Fired(None)) {
        Binding::Unbound => None,
        Binding::Bound(signal) => {
          *binding = Binding::Fired(Some(signal.clone()));
          Some(signal)
        }
        previous @ Binding::Fired(_) => {
          *binding = previous;
          return;
        }
      }
    };

    match signal {
      Some(signal) => {
        signal.fire();
      }
      None => {
        tracing::debug!(target: "take_until_destroy", "host destroyed before any decorated access");
      }
    }
  }

  /// Where members of this host report values that are not streams.
  pub fn diagnostics(&self) -> &dyn DiagnosticSink { &*self.diagnostics }
}

impl Default for Lifecycle {
  fn default() -> Self { Self::new() }
}

impl Debug for Lifecycle {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Lifecycle")
      .field("phase", &self.phase())
      .finish_non_exhaustive()
  }
}

/// A host of decorated members.
pub trait Destroyable {
  fn lifecycle(&self) -> &Lifecycle;
}

impl Destroyable for Lifecycle {
  fn lifecycle(&self) -> &Lifecycle { self }
}

/// The host's own teardown logic.
///
/// The default body does nothing, so a host without teardown logic only
/// needs an empty `impl OnDestroy for Host {}`. `Args` is whatever the host
/// framework passes to teardown.
pub trait OnDestroy<Args = ()>: Destroyable {
  fn on_destroy(&mut self, _args: Args) {}
}

/// The composed teardown: the host's [`OnDestroy::on_destroy`] with the given
/// arguments, then [`Lifecycle::finalize`].
///
/// Implemented for every [`OnDestroy`] host. The host's own logic runs on
/// every call; firing happens once.
pub trait Teardown<Args = ()> {
  fn destroy(&mut self, args: Args);
}

impl<H, Args> Teardown<Args> for H
where
  H: OnDestroy<Args> + ?Sized,
{
  fn destroy(&mut self, args: Args) {
    self.on_destroy(args);
    self.lifecycle().finalize();
  }
}
