pub mod animated_range;
pub mod range;
pub mod range_state;
pub mod units;

pub use animated_range::AnimatedRange;
pub use range::{LOG_FALLBACK_MAX, LOG_FALLBACK_RATIO, Range, ScaleMode, Value, log_safe_bounds};
pub use range_state::{
    MutatorLock, RangeEvent, RangeObserver, RangeState, RangeStateConfig, SubscriptionId,
};
pub use units::{Unit, UnitFamily};
