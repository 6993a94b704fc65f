use std::fmt;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::range::{LOG_FALLBACK_MAX, LOG_FALLBACK_RATIO};
use crate::core::{Range, ScaleMode, Unit, Value};
use crate::error::{AxisError, AxisResult};

/// Tuning for range state bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeStateConfig {
    /// Number of entries returned by [`RangeState::history`].
    ///
    /// The undo stack itself is unbounded.
    pub history_limit: usize,
}

impl Default for RangeStateConfig {
    fn default() -> Self {
        Self { history_limit: 10 }
    }
}

/// Change notification delivered to subscribers after a committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RangeEvent {
    MinimumChanged { old: f64, new: f64 },
    MaximumChanged { old: f64, new: f64 },
    LogChanged { log: bool },
    /// Emitted last for every committed change, carrying the new state.
    Updated { range: Range, log: bool },
}

/// Handle returned by [`RangeState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Synchronous range change observer.
///
/// Observers receive events by value of the new state and hold no reference
/// back to the [`RangeState`] that produced them.
pub trait RangeObserver {
    fn on_range_event(&mut self, event: &RangeEvent);
}

impl<F> RangeObserver for F
where
    F: FnMut(&RangeEvent),
{
    fn on_range_event(&mut self, event: &RangeEvent) {
        self(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Minimum,
    Maximum,
}

/// Half-updates that could not be applied on their own.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct BoundProposal {
    min: Option<f64>,
    max: Option<f64>,
}

impl BoundProposal {
    fn propose(&mut self, bound: Bound, value: f64) {
        match bound {
            Bound::Minimum => self.min = Some(value),
            Bound::Maximum => self.max = Some(value),
        }
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    /// Pairs the proposed `bound` with a consistent counterpart.
    ///
    /// A pending counterpart wins over the committed one.
    fn resolve(&self, bound: Bound, committed: Range) -> Option<(f64, f64)> {
        match bound {
            Bound::Minimum => {
                let min = self.min?;
                match self.max {
                    Some(max) if min <= max => Some((min, max)),
                    _ => (min <= committed.max()).then_some((min, committed.max())),
                }
            }
            Bound::Maximum => {
                let max = self.max?;
                match self.min {
                    Some(min) if min <= max => Some((min, max)),
                    _ => (committed.min() <= max).then_some((committed.min(), max)),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LockSnapshot {
    range: Range,
    log: bool,
}

/// Mutable domain of one axis.
///
/// Owns the current range, its linear/log mode, undo/redo stacks, favorites,
/// pending bound proposals and the mutator lock. Every committed change is
/// pushed synchronously to the subscribed [`RangeObserver`]s.
pub struct RangeState {
    config: RangeStateConfig,
    range: Range,
    log: bool,
    transformed: (f64, f64),
    proposal: BoundProposal,
    history: Vec<Range>,
    redo: Vec<Range>,
    favorites: Vec<Range>,
    lock: Option<LockSnapshot>,
    observers: IndexMap<SubscriptionId, Box<dyn RangeObserver>>,
    next_subscription_id: u64,
}

impl RangeState {
    #[must_use]
    pub fn new(range: Range) -> Self {
        Self::with_config(range, RangeStateConfig::default())
    }

    #[must_use]
    pub fn with_config(range: Range, config: RangeStateConfig) -> Self {
        Self {
            config,
            range,
            log: false,
            transformed: (range.min(), range.max()),
            proposal: BoundProposal::default(),
            history: Vec::new(),
            redo: Vec::new(),
            favorites: Vec::new(),
            lock: None,
            observers: IndexMap::new(),
            next_subscription_id: 0,
        }
    }

    /// Builds a state from raw bounds, failing on non-finite or reversed input.
    pub fn from_bounds(min: f64, max: f64, unit: Unit) -> AxisResult<Self> {
        Ok(Self::new(Range::new(min, max, unit)?))
    }

    #[must_use]
    pub fn config(&self) -> RangeStateConfig {
        self.config
    }

    #[must_use]
    pub fn range(&self) -> Range {
        self.range
    }

    #[must_use]
    pub fn minimum(&self) -> Value {
        self.range.min_value()
    }

    #[must_use]
    pub fn maximum(&self) -> Value {
        self.range.max_value()
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.range.unit()
    }

    #[must_use]
    pub fn is_log(&self) -> bool {
        self.log
    }

    #[must_use]
    pub fn scale_mode(&self) -> ScaleMode {
        if self.log {
            ScaleMode::Log
        } else {
            ScaleMode::Linear
        }
    }

    /// Bounds in the space the axis is mapped linearly in (`log10` when log).
    #[must_use]
    pub fn transformed_bounds(&self) -> (f64, f64) {
        self.transformed
    }

    /// `true` while a [`MutatorLock`] is held.
    #[must_use]
    pub fn is_adjusting(&self) -> bool {
        self.lock.is_some()
    }

    #[must_use]
    pub fn pending_minimum(&self) -> Option<Value> {
        self.proposal.min.map(|min| Value::new(min, self.unit()))
    }

    #[must_use]
    pub fn pending_maximum(&self) -> Option<Value> {
        self.proposal.max.map(|max| Value::new(max, self.unit()))
    }

    /// Replaces the range.
    ///
    /// The incoming range is converted into the current unit. Pending bound
    /// proposals are discarded once the new range is accepted.
    pub fn set_range(&mut self, range: Range) -> AxisResult<()> {
        let range = self.conform(range)?;
        self.proposal.clear();
        self.commit(range, true);
        Ok(())
    }

    /// Replaces the range from two values given in either order.
    pub fn set_bounds(&mut self, a: Value, b: Value) -> AxisResult<()> {
        self.set_range(Range::from_values(a, b)?)
    }

    /// Proposes a new minimum.
    ///
    /// A minimum above the current (or pending) maximum is held back without
    /// notification until [`RangeState::set_maximum`] supplies a consistent
    /// counterpart.
    pub fn set_minimum(&mut self, value: Value) -> AxisResult<()> {
        self.propose_bound(Bound::Minimum, value)
    }

    /// Proposes a new maximum; see [`RangeState::set_minimum`].
    pub fn set_maximum(&mut self, value: Value) -> AxisResult<()> {
        self.propose_bound(Bound::Maximum, value)
    }

    /// Switches between linear and log mapping.
    ///
    /// Entering log mode with non-positive bounds forces `max = 100` and
    /// `min = max / 1000`. History does not survive a toggle.
    pub fn set_log(&mut self, log: bool) {
        if log == self.log {
            return;
        }

        if log {
            let unit = self.unit();
            let (min, max) = (self.range.min(), self.range.max());
            if max <= 0.0 {
                self.range = Range::from_parts(min, LOG_FALLBACK_MAX, unit);
                self.emit(RangeEvent::MaximumChanged {
                    old: max,
                    new: LOG_FALLBACK_MAX,
                });
            }
            if min <= 0.0 {
                let forced_min = self.range.max() / LOG_FALLBACK_RATIO;
                self.range = Range::from_parts(forced_min, self.range.max(), unit);
                self.emit(RangeEvent::MinimumChanged {
                    old: min,
                    new: forced_min,
                });
            }
        }

        self.log = log;
        self.history.clear();
        self.redo.clear();
        self.proposal.clear();
        self.refresh_transformed();
        debug!(
            log,
            min = self.range.min(),
            max = self.range.max(),
            "range log mode toggled"
        );
        self.emit(RangeEvent::LogChanged { log });
        self.emit(RangeEvent::Updated {
            range: self.range,
            log,
        });
    }

    /// Restores the previous range. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.redo.push(self.range);
        self.proposal.clear();
        trace!(depth = self.history.len(), "range undo");
        self.commit(previous, false);
        true
    }

    /// Re-applies the last undone range. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.push_history(self.range);
        self.proposal.clear();
        trace!(depth = self.redo.len(), "range redo");
        self.commit(next, false);
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.redo.clear();
    }

    /// Most recent prior ranges first, capped at `history_limit`.
    #[must_use]
    pub fn history(&self) -> Vec<Range> {
        self.history
            .iter()
            .rev()
            .take(self.config.history_limit)
            .copied()
            .collect()
    }

    /// Starts an atomic multi-field update.
    ///
    /// While the returned guard lives, mutations record no history and emit
    /// no events. Dropping it pushes at most one history entry and emits a
    /// single [`RangeEvent::Updated`] when anything changed. The lock is not
    /// reentrant: a nested acquisition is ignored and only the outer guard
    /// releases.
    pub fn mutator_lock(&mut self) -> MutatorLock<'_> {
        let owns = if self.lock.is_some() {
            warn!("range mutator lock is not reentrant; nested acquisition ignored");
            false
        } else {
            self.lock = Some(LockSnapshot {
                range: self.range,
                log: self.log,
            });
            trace!("range mutator lock acquired");
            true
        };
        MutatorLock { state: self, owns }
    }

    /// Stores the current range as a favorite. Returns `false` if already present.
    pub fn add_to_favorites(&mut self) -> bool {
        if self.favorites.contains(&self.range) {
            return false;
        }
        self.favorites.push(self.range);
        true
    }

    #[must_use]
    pub fn favorites(&self) -> &[Range] {
        &self.favorites
    }

    pub fn remove_favorite(&mut self, range: &Range) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|favorite| favorite != range);
        self.favorites.len() != before
    }

    pub fn apply_favorite(&mut self, index: usize) -> AxisResult<()> {
        let Some(range) = self.favorites.get(index).copied() else {
            return Err(AxisError::InvalidData(format!(
                "favorite index {index} out of bounds ({} stored)",
                self.favorites.len()
            )));
        };
        self.set_range(range)
    }

    /// Shifts the range by `fraction` of its width in transformed space.
    pub fn pan_by_fraction(&mut self, fraction: f64) -> AxisResult<()> {
        if !fraction.is_finite() {
            return Err(AxisError::InvalidData(
                "pan fraction must be finite".to_owned(),
            ));
        }
        let (start, end) = self.transformed;
        let delta = (end - start) * fraction;
        self.set_transformed(start + delta, end + delta)
    }

    /// Zooms around an anchor given as a fraction of the current width.
    ///
    /// `factor > 1.0` zooms in, `0.0 < factor < 1.0` zooms out.
    pub fn zoom_by_factor(&mut self, factor: f64, anchor_fraction: f64) -> AxisResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(AxisError::InvalidData(
                "zoom factor must be finite and > 0".to_owned(),
            ));
        }
        if !anchor_fraction.is_finite() {
            return Err(AxisError::InvalidData(
                "zoom anchor must be finite".to_owned(),
            ));
        }

        let (start, end) = self.transformed;
        let span = end - start;
        let target_span = span / factor;
        let anchor = start + anchor_fraction * span;
        let new_start = anchor - anchor_fraction * target_span;
        self.set_transformed(new_start, new_start + target_span)
    }

    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: RangeObserver + 'static,
    {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.observers.insert(id, Box::new(observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.shift_remove(&id).is_some()
    }

    fn conform(&self, range: Range) -> AxisResult<Range> {
        let range = range.convert_to(self.unit())?;
        if self.log && range.min() <= 0.0 {
            return Err(AxisError::InvalidData(format!(
                "log axis bounds must be > 0, got min={}",
                range.min()
            )));
        }
        Ok(range)
    }

    fn propose_bound(&mut self, bound: Bound, value: Value) -> AxisResult<()> {
        let magnitude = value.convert_to(self.unit())?.magnitude();
        if !magnitude.is_finite() {
            return Err(AxisError::InvalidData(
                "range bound must be finite".to_owned(),
            ));
        }
        if self.log && magnitude <= 0.0 {
            return Err(AxisError::InvalidData(format!(
                "log axis bounds must be > 0, got {magnitude}"
            )));
        }

        let mut proposal = self.proposal;
        proposal.propose(bound, magnitude);
        match proposal.resolve(bound, self.range) {
            Some((min, max)) => {
                self.proposal.clear();
                self.commit(Range::from_parts(min, max, self.unit()), true);
            }
            None => {
                trace!(?bound, value = magnitude, "holding inconsistent range bound");
                self.proposal = proposal;
            }
        }
        Ok(())
    }

    fn set_transformed(&mut self, start: f64, end: f64) -> AxisResult<()> {
        let (start, end) = if self.log {
            (10f64.powf(start), 10f64.powf(end))
        } else {
            (start, end)
        };
        self.set_range(Range::ordered(start, end, self.unit())?)
    }

    fn commit(&mut self, range: Range, record_history: bool) {
        let previous = self.range;
        if previous == range {
            return;
        }

        if record_history && self.lock.is_none() {
            self.push_history(previous);
            self.redo.clear();
        }

        self.range = range;
        self.refresh_transformed();

        if previous.min() != range.min() {
            self.emit(RangeEvent::MinimumChanged {
                old: previous.min(),
                new: range.min(),
            });
        }
        if previous.max() != range.max() {
            self.emit(RangeEvent::MaximumChanged {
                old: previous.max(),
                new: range.max(),
            });
        }
        self.emit(RangeEvent::Updated {
            range,
            log: self.log,
        });
    }

    fn push_history(&mut self, range: Range) {
        if self.history.last() == Some(&range) {
            return;
        }
        self.history.push(range);
        trace!(depth = self.history.len(), "range history push");
    }

    fn refresh_transformed(&mut self) {
        self.transformed = if self.log {
            (self.range.min().log10(), self.range.max().log10())
        } else {
            (self.range.min(), self.range.max())
        };
    }

    fn release_lock(&mut self) {
        let Some(snapshot) = self.lock.take() else {
            return;
        };

        let range_changed = snapshot.range != self.range;
        let log_toggled = snapshot.log != self.log;
        if range_changed && !log_toggled {
            self.push_history(snapshot.range);
            self.redo.clear();
        }
        debug!(range_changed, log_toggled, "range mutator lock released");

        if range_changed || log_toggled {
            self.emit(RangeEvent::Updated {
                range: self.range,
                log: self.log,
            });
        }
    }

    fn emit(&mut self, event: RangeEvent) {
        if self.lock.is_some() {
            return;
        }
        for observer in self.observers.values_mut() {
            observer.on_range_event(&event);
        }
    }
}

impl fmt::Debug for RangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeState")
            .field("range", &self.range)
            .field("log", &self.log)
            .field("proposal", &self.proposal)
            .field("history_len", &self.history.len())
            .field("redo_len", &self.redo.len())
            .field("favorites", &self.favorites)
            .field("adjusting", &self.lock.is_some())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

/// Guard returned by [`RangeState::mutator_lock`].
///
/// Dereferences to the locked state; the lock is released when the guard is
/// dropped, including on early returns and unwinding.
pub struct MutatorLock<'a> {
    state: &'a mut RangeState,
    owns: bool,
}

impl MutatorLock<'_> {
    /// Releases the lock now instead of at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for MutatorLock<'_> {
    type Target = RangeState;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for MutatorLock<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

impl Drop for MutatorLock<'_> {
    fn drop(&mut self) {
        if self.owns {
            self.state.release_lock();
        }
    }
}
