//! Timeline defaults.

use serde::{Deserialize, Serialize};

use crate::time_range::TimeRange;

/// Initial playback properties for a new timeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Frames per second; must be positive.
    pub framerate: u32,
    /// Authored clip span.
    pub full_clip_range: TimeRange,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            framerate: 24,
            full_clip_range: TimeRange::from_time(0, 100),
        }
    }
}
