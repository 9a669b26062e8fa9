use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::observer::{BoxedObserver, DynObserver, Observer};

/// Terminal state of a subject.
pub(crate) enum SubjectState<Err> {
  Active,
  Completed,
  Errored(Err),
}

/// An event waiting to be broadcast.
pub(crate) enum Event<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

/// Subscribers container with ID-based add/remove.
///
/// While a broadcast is running the observer list is moved out of the
/// container, so observers may subscribe, unsubscribe or emit on the same
/// subject from inside their callbacks:
///
/// - new observers land in `items` and are merged back afterwards;
/// - removals of in-flight observers are parked in `cancelled`;
/// - emissions are appended to `queue` and drained in order by the outermost
///   emitter.
pub struct Subscribers<Item, Err> {
  next_id: usize,
  items: SmallVec<[(usize, BoxedObserver<Item, Err>); 2]>,
  cancelled: SmallVec<[usize; 1]>,
  queue: VecDeque<Event<Item, Err>>,
  emitting: bool,
  closing: bool,
  state: SubjectState<Err>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self {
    Self {
      next_id: 0,
      items: SmallVec::new(),
      cancelled: SmallVec::new(),
      queue: VecDeque::new(),
      emitting: false,
      closing: false,
      state: SubjectState::Active,
    }
  }
}

impl<Item, Err> Subscribers<Item, Err> {
  /// Add an observer and return its unique ID.
  pub(crate) fn add(&mut self, observer: BoxedObserver<Item, Err>) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, observer));
    id
  }

  /// Remove an observer by ID.
  ///
  /// If the observer is currently being broadcast to, the removal is parked
  /// and applied when the broadcast hands the list back.
  pub(crate) fn remove(&mut self, id: usize) -> Option<BoxedObserver<Item, Err>> {
    let pos = self.items.iter().position(|(i, _)| *i == id);
    match pos {
      Some(pos) => Some(self.items.remove(pos).1),
      None => {
        if self.emitting {
          self.cancelled.push(id);
        }
        None
      }
    }
  }

  #[inline]
  pub(crate) fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub(crate) fn is_emitting(&self) -> bool { self.emitting }

  /// `true` once a terminal event was accepted, even if it is still queued.
  #[inline]
  pub(crate) fn is_stopped(&self) -> bool {
    self.closing || !matches!(self.state, SubjectState::Active)
  }

  #[inline]
  pub(crate) fn state(&self) -> &SubjectState<Err> { &self.state }

  /// Queue an event. Returns `true` if the caller must drain the queue,
  /// `false` if an outer broadcast is already draining it or the subject has
  /// stopped.
  pub(crate) fn enqueue(&mut self, event: Event<Item, Err>) -> bool {
    if self.is_stopped() {
      return false;
    }
    if !matches!(event, Event::Next(_)) {
      self.closing = true;
    }
    self.queue.push_back(event);
    if self.emitting {
      false
    } else {
      self.emitting = true;
      true
    }
  }

  /// Pop the next event and move the observer list out for broadcasting.
  /// Ends the emitting phase when the queue is empty.
  pub(crate) fn take_next(
    &mut self,
  ) -> Option<(Event<Item, Err>, SmallVec<[(usize, BoxedObserver<Item, Err>); 2]>)> {
    match self.queue.pop_front() {
      Some(event) => Some((event, std::mem::take(&mut self.items))),
      None => {
        self.emitting = false;
        None
      }
    }
  }

  /// Hand the observer list back after a `Next` broadcast.
  pub(crate) fn restore(&mut self, mut taken: SmallVec<[(usize, BoxedObserver<Item, Err>); 2]>) {
    let cancelled = std::mem::take(&mut self.cancelled);
    taken.retain(|(id, observer)| !cancelled.contains(id) && !observer.box_is_closed());
    taken.extend(self.items.drain(..));
    self.items = taken;
  }

  /// Record the terminal state and hand out everything that must receive it,
  /// including observers that subscribed during the last broadcast.
  pub(crate) fn terminate(
    &mut self, state: SubjectState<Err>,
    mut taken: SmallVec<[(usize, BoxedObserver<Item, Err>); 2]>,
  ) -> SmallVec<[BoxedObserver<Item, Err>; 2]> {
    self.state = state;
    self.queue.clear();
    let cancelled = std::mem::take(&mut self.cancelled);
    taken.retain(|(id, _)| !cancelled.contains(id));
    taken.extend(self.items.drain(..));
    taken.into_iter().map(|(_, observer)| observer).collect()
  }
}

/// Broadcast value to all observers with optimal cloning.
///
/// The value is cloned for all observers except the last one, which receives
/// the moved value.
pub(crate) fn broadcast_value<Item, Err>(
  observers: &mut [(usize, BoxedObserver<Item, Err>)], value: Item,
) where
  Item: Clone,
{
  let mut iter = observers
    .iter_mut()
    .filter(|(_, o)| !o.box_is_closed())
    .peekable();
  while let Some((_, observer)) = iter.next() {
    if iter.peek().is_some() {
      observer.next(value.clone());
    } else {
      observer.next(value);
      break;
    }
  }
}

/// Broadcast error to all observers, cloning for all but the last one.
pub(crate) fn broadcast_error<Item, Err>(observers: SmallVec<[BoxedObserver<Item, Err>; 2]>, err: Err)
where
  Err: Clone,
{
  let mut iter = observers.into_iter().peekable();
  while let Some(observer) = iter.next() {
    if iter.peek().is_some() {
      observer.error(err.clone());
    } else {
      observer.error(err);
      break;
    }
  }
}

pub(crate) fn broadcast_complete<Item, Err>(observers: SmallVec<[BoxedObserver<Item, Err>; 2]>) {
  for observer in observers {
    observer.complete();
  }
}
