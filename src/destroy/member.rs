//! Decorated members: classifying what they produce and binding it to the
//! host's destroy signal.

use std::{
  collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
  fmt::{Debug, Formatter},
  path::PathBuf,
  rc::Rc,
  sync::Arc,
  time::Duration,
};

use super::{
  diagnostic::{not_stream_like, Member},
  lifecycle::{Destroyable, Lifecycle},
  signal::DestroySignal,
};
use crate::{
  observable::{CoreObservable, Observable},
  ops::take_until::TakeUntil,
};

/// A value a decorated member can produce.
///
/// Stream-like values are bound to the destroy signal; everything else is
/// handed back unchanged.
pub trait MemberValue: Sized {
  /// What the decorated member returns instead.
  type Output;

  fn is_stream_like(&self) -> bool;

  /// A failure of the underlying member. Failures pass through untouched,
  /// without a diagnostic.
  fn is_failure(&self) -> bool { false }

  fn bind(self, signal: DestroySignal) -> Self::Output;

  /// Hand the value back without binding it.
  fn pass_through(self) -> Self::Output;
}

impl<S> MemberValue for S
where
  S: CoreObservable,
  S::Item: 'static,
  S::Err: 'static,
{
  type Output = TakeUntil<S, DestroySignal>;

  fn is_stream_like(&self) -> bool { true }

  fn bind(self, signal: DestroySignal) -> Self::Output { self.take_until(signal) }

  // An armed signal nobody fires.
  fn pass_through(self) -> Self::Output { self.take_until(DestroySignal::new()) }
}

impl<V: MemberValue> MemberValue for Option<V> {
  type Output = Option<V::Output>;

  fn is_stream_like(&self) -> bool { self.as_ref().is_some_and(V::is_stream_like) }

  fn is_failure(&self) -> bool { self.as_ref().is_some_and(V::is_failure) }

  fn bind(self, signal: DestroySignal) -> Self::Output { self.map(|v| v.bind(signal)) }

  fn pass_through(self) -> Self::Output { self.map(V::pass_through) }
}

impl<V: MemberValue, E> MemberValue for Result<V, E> {
  type Output = Result<V::Output, E>;

  fn is_stream_like(&self) -> bool { self.as_ref().is_ok_and(V::is_stream_like) }

  fn is_failure(&self) -> bool {
    match self {
      Ok(v) => v.is_failure(),
      Err(_) => true,
    }
  }

  fn bind(self, signal: DestroySignal) -> Self::Output { self.map(|v| v.bind(signal)) }

  fn pass_through(self) -> Self::Output { self.map(V::pass_through) }
}

macro_rules! plain_member_value {
  ($(impl<$($g:ident),+> $ty:ty),* $(,)?) => {
    $(
      impl<$($g),+> MemberValue for $ty {
        type Output = Self;

        fn is_stream_like(&self) -> bool { false }

        fn bind(self, _signal: DestroySignal) -> Self { self }

        fn pass_through(self) -> Self { self }
      }
    )*
  };
  ($($ty:ty),* $(,)?) => {
    $(
      impl MemberValue for $ty {
        type Output = $ty;

        fn is_stream_like(&self) -> bool { false }

        fn bind(self, _signal: DestroySignal) -> $ty { self }

        fn pass_through(self) -> $ty { self }
      }
    )*
  };
}

plain_member_value!(
  (),
  bool,
  char,
  i8,
  i16,
  i32,
  i64,
  i128,
  isize,
  u8,
  u16,
  u32,
  u64,
  u128,
  usize,
  f32,
  f64,
  String,
  &'static str,
  Box<str>,
  PathBuf,
  Duration,
);

plain_member_value!(
  impl<T> Vec<T>,
  impl<T> VecDeque<T>,
  impl<T> BTreeSet<T>,
  impl<K, V> BTreeMap<K, V>,
  impl<T, S> HashSet<T, S>,
  impl<K, V, S> HashMap<K, V, S>,
  impl<A, B> (A, B),
  impl<A, B, C> (A, B, C),
  impl<A, B, C, D> (A, B, C, D),
  impl<A, B, C, D, E> (A, B, C, D, E),
  impl<A, B, C, D, E, F> (A, B, C, D, E, F),
  impl<A, B, C, D, E, F, G> (A, B, C, D, E, F, G),
  impl<A, B, C, D, E, F, G, H> (A, B, C, D, E, F, G, H),
);

// Shared handles are never bound, even around a stream.
impl<T: ?Sized> MemberValue for Rc<T> {
  type Output = Self;

  fn is_stream_like(&self) -> bool { false }

  fn bind(self, _signal: DestroySignal) -> Self { self }

  fn pass_through(self) -> Self { self }
}

impl<T: ?Sized> MemberValue for Arc<T> {
  type Output = Self;

  fn is_stream_like(&self) -> bool { false }

  fn bind(self, _signal: DestroySignal) -> Self { self }

  fn pass_through(self) -> Self { self }
}

/// Whether `value` would be bound by a decorated member.
pub fn is_stream_like<V: MemberValue>(value: &V) -> bool { value.is_stream_like() }

/// Run the interception for one produced `value`.
///
/// Failures and non-stream values come back unchanged (the latter with one
/// diagnostic). Streams install the destroy signal if needed and come back
/// bound to it.
pub fn intercept<V: MemberValue>(lifecycle: &Lifecycle, member: Member, value: V) -> V::Output {
  if value.is_failure() {
    return value.pass_through();
  }
  if !value.is_stream_like() {
    lifecycle.diagnostics().warn(&not_stream_like(member));
    return value.pass_through();
  }
  value.bind(lifecycle.ensure_bound())
}

/// Entry point of the `#[take_until_destroy]` attribute.
#[doc(hidden)]
pub fn intercept_method<H, V>(host: &H, name: &'static str, value: V) -> V::Output
where
  H: Destroyable + ?Sized,
  V: MemberValue,
{
  intercept(host.lifecycle(), Member::method(name), value)
}

/// A method wrapped so its result is bound to the host's destroy signal.
///
/// ```rust
/// use std::convert::Infallible;
/// use take_until_destroy::prelude::*;
///
/// #[derive(Default)]
/// struct Clock {
///   lifecycle: Lifecycle,
///   ticks: Subject<u32, Infallible>,
/// }
///
/// impl Destroyable for Clock {
///   fn lifecycle(&self) -> &Lifecycle { &self.lifecycle }
/// }
/// impl OnDestroy for Clock {}
///
/// const TICKS: DestroyMethod<fn(&Clock, ()) -> Subject<u32, Infallible>> =
///   DestroyMethod::new("ticks", |clock, ()| clock.ticks.clone());
///
/// let mut clock = Clock::default();
/// TICKS.call(&clock, ()).subscribe(|t| println!("tick {t}"));
/// clock.destroy(());
/// ```
pub struct DestroyMethod<F> {
  name: &'static str,
  method: F,
}

impl<F> DestroyMethod<F> {
  pub const fn new(name: &'static str, method: F) -> Self { Self { name, method } }

  pub fn name(&self) -> &'static str { self.name }

  /// Call the method with a shared receiver. Multiple arguments are passed as
  /// one tuple.
  pub fn call<H, A, R>(&self, host: &H, args: A) -> R::Output
  where
    H: Destroyable + ?Sized,
    F: Fn(&H, A) -> R,
    R: MemberValue,
  {
    let value = (self.method)(host, args);
    intercept(host.lifecycle(), Member::method(self.name), value)
  }

  /// Call the method with an exclusive receiver.
  pub fn call_mut<H, A, R>(&self, host: &mut H, args: A) -> R::Output
  where
    H: Destroyable + ?Sized,
    F: Fn(&mut H, A) -> R,
    R: MemberValue,
  {
    let value = (self.method)(&mut *host, args);
    intercept(host.lifecycle(), Member::method(self.name), value)
  }
}

impl<F> Debug for DestroyMethod<F> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DestroyMethod")
      .field("name", &self.name)
      .finish_non_exhaustive()
  }
}

/// A host field whose reads are bound to the host's destroy signal.
///
/// Each read clones the stored value, so every read yields an independent
/// bound stream. Reading before anything was assigned reports a diagnostic
/// and yields `None`.
#[derive(Clone)]
pub struct DestroyProperty<V> {
  name: &'static str,
  value: Option<V>,
}

impl<V> DestroyProperty<V> {
  pub const fn new(name: &'static str) -> Self { Self { name, value: None } }

  pub fn with_value(name: &'static str, value: V) -> Self { Self { name, value: Some(value) } }

  pub fn name(&self) -> &'static str { self.name }

  /// Store `value` verbatim, replacing any previous one.
  pub fn set(&mut self, value: V) { self.value = Some(value); }

  pub fn take(&mut self) -> Option<V> { self.value.take() }

  pub fn is_set(&self) -> bool { self.value.is_some() }

  pub fn get<H>(&self, host: &H) -> <Option<V> as MemberValue>::Output
  where
    H: Destroyable + ?Sized,
    V: MemberValue + Clone,
  {
    intercept(host.lifecycle(), Member::property(self.name), self.value.clone())
  }
}

impl<V> Debug for DestroyProperty<V> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DestroyProperty")
      .field("name", &self.name)
      .field("set", &self.is_set())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use super::*;
  use crate::prelude::*;

  fn recording_lifecycle() -> (Lifecycle, Rc<RefCell<Vec<String>>>) {
    let messages = Rc::new(RefCell::new(vec![]));
    let c_messages = messages.clone();
    let lifecycle =
      Lifecycle::with_diagnostics(move |msg: &str| c_messages.borrow_mut().push(msg.to_owned()));
    (lifecycle, messages)
  }

  #[take_until_destroy_macro::test]
  fn classification() {
    assert!(is_stream_like(&observable::of(1)));
    assert!(is_stream_like(&Subject::<i32, Infallible>::new()));
    assert!(is_stream_like(&Some(observable::of(1))));
    assert!(is_stream_like(&Ok::<_, ()>(observable::of(1))));

    assert!(!is_stream_like(&5));
    assert!(!is_stream_like(&"text"));
    assert!(!is_stream_like(&String::from("text")));
    assert!(!is_stream_like(&vec![1, 2]));
    assert!(!is_stream_like(&(1, "pair")));
    assert!(!is_stream_like(&Rc::new(observable::of(1))));
    assert!(!is_stream_like(&std::collections::HashMap::<u8, u8>::new()));
    assert!(!is_stream_like(&None::<observable::Of<i32>>));
    assert!(!is_stream_like(&Err::<observable::Of<i32>, _>("failed")));
    assert!(Err::<observable::Of<i32>, _>("failed").is_failure());
  }

  #[take_until_destroy_macro::test]
  fn stream_values_are_bound() {
    let (lifecycle, messages) = recording_lifecycle();
    let mut source = Subject::<i32, Infallible>::new();
    let values = Rc::new(RefCell::new(vec![]));

    let c_values = values.clone();
    intercept(&lifecycle, Member::method("numbers"), source.clone())
      .subscribe(move |v| c_values.borrow_mut().push(v));
    assert!(lifecycle.is_bound());

    source.next(1);
    lifecycle.finalize();
    source.next(2);

    assert_eq!(*values.borrow(), vec![1]);
    assert_eq!(source.observer_count(), 0);
    assert!(messages.borrow().is_empty());
  }

  #[take_until_destroy_macro::test]
  fn plain_values_pass_through_with_one_diagnostic() {
    let (lifecycle, messages) = recording_lifecycle();
    let value = intercept(&lifecycle, Member::method("get_number"), 5);

    assert_eq!(value, 5);
    assert_eq!(lifecycle.phase(), Phase::Unbound);
    assert_eq!(
      *messages.borrow(),
      vec![
        "take_until_destroy has been used on a method `get_number` whose return value isn't an \
         observable"
      ]
    );
  }

  #[take_until_destroy_macro::test]
  fn failures_pass_through_silently() {
    let (lifecycle, messages) = recording_lifecycle();
    let value: Result<_, &str> = Err("boom");
    let out = intercept(&lifecycle, Member::method("load"), value.map(|()| observable::of(1)));

    assert!(matches!(out, Err("boom")));
    assert_eq!(lifecycle.phase(), Phase::Unbound);
    assert!(messages.borrow().is_empty());
  }

  #[take_until_destroy_macro::test]
  fn method_combinator_forwards_arguments() {
    struct Host {
      lifecycle: Lifecycle,
      calls: RefCell<Vec<(i32, &'static str)>>,
    }
    impl Destroyable for Host {
      fn lifecycle(&self) -> &Lifecycle { &self.lifecycle }
    }

    let repeat = DestroyMethod::new("repeat", |host: &Host, (n, tag): (i32, &'static str)| {
      host.calls.borrow_mut().push((n, tag));
      observable::from_iter(0..n)
    });

    let host = Host { lifecycle: Lifecycle::new(), calls: RefCell::new(vec![]) };
    assert!(!host.lifecycle.is_bound());

    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    repeat
      .call(&host, (3, "a"))
      .subscribe(move |v| c_values.borrow_mut().push(v));

    assert_eq!(*host.calls.borrow(), vec![(3, "a")]);
    assert_eq!(*values.borrow(), vec![0, 1, 2]);
    assert!(host.lifecycle.is_bound());
    assert_eq!(repeat.name(), "repeat");
  }

  #[take_until_destroy_macro::test]
  fn method_combinator_with_exclusive_receiver() {
    struct Host {
      lifecycle: Lifecycle,
      made: u32,
    }
    impl Destroyable for Host {
      fn lifecycle(&self) -> &Lifecycle { &self.lifecycle }
    }

    let make = DestroyMethod::new("make", |host: &mut Host, ()| {
      host.made += 1;
      Subject::<u32, Infallible>::new()
    });

    let mut host = Host { lifecycle: Lifecycle::new(), made: 0 };
    let _first = make.call_mut(&mut host, ());
    let _second = make.call_mut(&mut host, ());
    assert_eq!(host.made, 2);
  }

  #[take_until_destroy_macro::test]
  fn property_reads_are_independent_streams() {
    let (lifecycle, messages) = recording_lifecycle();
    let mut source = Subject::<i32, Infallible>::new();
    let mut property = DestroyProperty::new("values");
    property.set(source.clone());

    let hits = Rc::new(RefCell::new(0));
    for _ in 0..2 {
      let c_hits = hits.clone();
      if let Some(bound) = property.get(&lifecycle) {
        bound.subscribe(move |_| *c_hits.borrow_mut() += 1);
      }
    }
    assert_eq!(source.observer_count(), 2);

    source.next(1);
    assert_eq!(*hits.borrow(), 2);

    lifecycle.finalize();
    assert_eq!(source.observer_count(), 0);
    assert!(messages.borrow().is_empty());
  }

  #[take_until_destroy_macro::test]
  fn unset_property_reports_and_yields_none() {
    let (lifecycle, messages) = recording_lifecycle();
    let property = DestroyProperty::<Subject<i32, Infallible>>::new("pending");

    assert!(property.get(&lifecycle).is_none());
    assert_eq!(lifecycle.phase(), Phase::Unbound);
    assert_eq!(
      *messages.borrow(),
      vec!["take_until_destroy has been used on a property `pending` whose value isn't an observable"]
    );
  }

  #[take_until_destroy_macro::test]
  fn plain_property_is_returned_verbatim() {
    let (lifecycle, messages) = recording_lifecycle();
    let mut property = DestroyProperty::with_value("title", String::from("a"));
    assert_eq!(property.get(&lifecycle).as_deref(), Some("a"));
    assert_eq!(messages.borrow().len(), 1);

    assert_eq!(property.take().as_deref(), Some("a"));
    assert!(!property.is_set());
  }
}
