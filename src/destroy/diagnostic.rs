//! Where misuse warnings go.

use std::fmt::{Display, Formatter};

/// A one-argument text consumer for non-fatal warnings.
///
/// Any `Fn(&str)` closure is a sink, which is what tests use to capture
/// messages.
pub trait DiagnosticSink {
  fn warn(&self, message: &str);
}

impl<F: Fn(&str)> DiagnosticSink for F {
  fn warn(&self, message: &str) { self(message) }
}

/// The default sink: forwards to `tracing::warn!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
  fn warn(&self, message: &str) { tracing::warn!(target: "take_until_destroy", "{message}"); }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
  Method,
  Property,
}

/// Identifies a decorated member in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Member {
  pub kind: MemberKind,
  pub name: &'static str,
}

impl Member {
  pub const fn method(name: &'static str) -> Self { Self { kind: MemberKind::Method, name } }

  pub const fn property(name: &'static str) -> Self { Self { kind: MemberKind::Property, name } }
}

impl Display for Member {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.kind {
      MemberKind::Method => write!(f, "method `{}`", self.name),
      MemberKind::Property => write!(f, "property `{}`", self.name),
    }
  }
}

pub(crate) fn not_stream_like(member: Member) -> String {
  let produced = match member.kind {
    MemberKind::Method => "return value",
    MemberKind::Property => "value",
  };
  format!("take_until_destroy has been used on a {member} whose {produced} isn't an observable")
}
