//! Utility Module
//!
//! - [`time`]: the millisecond time base used by tracks and queries,
//!   with conversions to and from seconds.

pub mod time;

pub use time::{AnimTime, millis_to_time, secs_to_time, time_to_millis, time_to_secs};
