//! Scroll configuration

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

/// Lowest accepted momentum decay.
pub const MIN_DECAY: f64 = 0.8;
/// Highest accepted momentum decay.
pub const MAX_DECAY: f64 = 0.95;

/// Physics and gesture settings of a [`ScrollController`](super::ScrollController).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use panelkit::widgets::scroll::ScrollConfig;
///
/// let config = ScrollConfig::default()
///     .with_decay(0.85)
///     .with_frame_interval(Duration::from_millis(8));
/// assert_eq!(config.decay, 0.85);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollConfig {
    /// Fraction of momentum carried into the next frame.
    ///
    /// Default: 0.9, clamped into `[0.8, 0.95]`
    pub decay: f64,

    /// Pixels per wheel line.
    ///
    /// Default: 20
    pub line_height: f64,

    /// Multiplier applied to release velocity (px/ms) to get momentum.
    ///
    /// Default: 8.0
    pub fling_multiplier: f64,

    /// Device pixel ratio, scales the fling multiplier.
    ///
    /// Default: 1.0
    pub device_pixel_ratio: f64,

    /// How far back pointer samples count toward release velocity.
    ///
    /// Default: 100 ms
    #[serde(with = "millis")]
    pub sample_window: Duration,

    /// Shortest scrollbar handle.
    ///
    /// Default: 20 px
    pub min_handle_length: u32,

    /// Thickness of the scrollbar tracks.
    ///
    /// Default: 8 px
    pub track_thickness: u32,

    /// Physics tick interval of the frame ticker.
    ///
    /// Default: 16 ms
    #[serde(with = "millis")]
    pub frame_interval: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            decay: 0.9,
            line_height: 20.0,
            fling_multiplier: 8.0,
            device_pixel_ratio: 1.0,
            sample_window: Duration::from_millis(100),
            min_handle_length: 20,
            track_thickness: 8,
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl ScrollConfig {
    /// Creates a scroll config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the momentum decay, clamped into the accepted range.
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay.clamp(MIN_DECAY, MAX_DECAY);
        self
    }

    /// Sets the pixels per wheel line.
    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = line_height;
        self
    }

    /// Sets the fling multiplier.
    pub fn with_fling_multiplier(mut self, multiplier: f64) -> Self {
        self.fling_multiplier = multiplier;
        self
    }

    /// Sets the device pixel ratio.
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Sets the velocity sample window.
    pub fn with_sample_window(mut self, window: Duration) -> Self {
        self.sample_window = window;
        self
    }

    /// Sets the shortest handle length.
    pub fn with_min_handle_length(mut self, length: u32) -> Self {
        self.min_handle_length = length;
        self
    }

    /// Sets the ticker interval.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Decay in effect, clamped into the accepted range.
    pub(crate) fn effective_decay(&self) -> f64 {
        self.decay.clamp(MIN_DECAY, MAX_DECAY)
    }
}

mod millis {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_is_clamped() {
        assert_eq!(ScrollConfig::default().with_decay(0.5).decay, MIN_DECAY);
        assert_eq!(ScrollConfig::default().with_decay(0.99).decay, MAX_DECAY);

        let parsed: ScrollConfig = serde_json::from_str(r#"{"decay": 2.0}"#).unwrap();
        assert_eq!(parsed.effective_decay(), MAX_DECAY);
    }

    #[test]
    fn test_durations_parse_as_millis() {
        let parsed: ScrollConfig = serde_json::from_str(r#"{"frameInterval": 8}"#).unwrap();
        assert_eq!(parsed.frame_interval, Duration::from_millis(8));
        assert_eq!(parsed.sample_window, Duration::from_millis(100));
    }
}
