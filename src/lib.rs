//! Skate Race - seeded skateboard race with a mock betting lobby
//!
//! Core modules:
//! - `lobby`: Games, bets, finalization and the mock transaction ledger
//! - `sim`: Deterministic race simulation (agents, events, scoring)
//! - `app`: Scene manager routing UI actions between lobby and race
//! - `view`: Plain-data render descriptions for the host renderer
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven race balance

pub mod app;
pub mod error;
pub mod lobby;
pub mod platform;
pub mod roster;
pub mod sim;
pub mod tuning;
pub mod view;

pub use app::{App, Notice, Response, Scene, SceneRequest, UiAction};
pub use error::{LobbyError, RaceError, TuningError};
pub use roster::{AGENTS, AgentDescriptor, AgentId};
pub use tuning::RaceTuning;

use glam::Vec2;

/// Track and layout constants
pub mod consts {
    /// Track ellipse center (canvas pixels)
    pub const TRACK_CENTER_X: f32 = 400.0;
    pub const TRACK_CENTER_Y: f32 = 300.0;
    /// Full ellipse extents; radii are half of these
    pub const TRACK_WIDTH: f32 = 480.0;
    pub const TRACK_HEIGHT: f32 = 240.0;

    /// Degrees between neighbouring agents' starting marks
    pub const START_ANGLE_STEP: f64 = 90.0;

    /// Vertical offset of the tracking dot above the sprite
    pub const DOT_OFFSET_Y: f32 = 40.0;
    /// Offset of transient icons relative to the sprite
    pub const ICON_OFFSET_X: f32 = 10.0;
    pub const ICON_OFFSET_Y: f32 = 40.0;

    /// Countdown labels shown one per second before the start
    pub const COUNTDOWN_LABELS: [&str; 4] = ["3", "2", "1", "GO!"];
    /// Interval between countdown labels (ms)
    pub const COUNTDOWN_INTERVAL_MS: f64 = 1000.0;
    /// Pause between "GO!" and the race actually starting (ms)
    pub const COUNTDOWN_GO_HOLD_MS: f64 = 500.0;

    /// Event log capacity
    pub const LOG_CAPACITY: usize = 5;
    /// Log entries stay opaque this long, then fade (ms)
    pub const LOG_HOLD_MS: f64 = 2000.0;
    pub const LOG_FADE_MS: f64 = 1000.0;

    /// First-lap celebration banner fade duration (ms)
    pub const CELEBRATION_FADE_MS: f64 = 2000.0;
    pub const CELEBRATION_TEXT: &str = "🌐 SkateConnect 🛹";
}

/// Average of the two ellipse radii, used to turn degrees into track length
#[inline]
pub fn average_track_radius() -> f64 {
    (consts::TRACK_WIDTH as f64 + consts::TRACK_HEIGHT as f64) / 4.0
}

/// Track length covered by one degree of travel
#[inline]
pub fn distance_per_degree() -> f64 {
    2.0 * std::f64::consts::PI * average_track_radius() / 360.0
}

/// Convert a track angle (degrees, unbounded) to a point on the ellipse
#[inline]
pub fn ellipse_point(angle_deg: f64) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(
        consts::TRACK_CENTER_X + (consts::TRACK_WIDTH / 2.0) * rad.cos() as f32,
        consts::TRACK_CENTER_Y + (consts::TRACK_HEIGHT / 2.0) * rad.sin() as f32,
    )
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle % 360.0;
    if a < 0.0 { a + 360.0 } else { a }
}

/// Format an elapsed time in ms as `MM:SS:mmm`
pub fn format_race_clock(elapsed_ms: f64) -> String {
    let total = if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
        elapsed_ms.floor() as u64
    } else {
        0
    };
    let minutes = total / 60_000;
    let seconds = (total % 60_000) / 1000;
    let millis = total % 1000;
    format!("{:02}:{:02}:{:03}", minutes, seconds, millis)
}

/// Uppercase hex encoding of raw bytes
pub fn to_hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_clock_format() {
        assert_eq!(format_race_clock(0.0), "00:00:000");
        assert_eq!(format_race_clock(61_234.9), "01:01:234");
        assert_eq!(format_race_clock(-5.0), "00:00:000");
        assert_eq!(format_race_clock(f64::NAN), "00:00:000");
    }

    #[test]
    fn test_ellipse_extremes() {
        let right = ellipse_point(0.0);
        assert!((right.x - 640.0).abs() < 1e-3);
        assert!((right.y - 300.0).abs() < 1e-3);

        let bottom = ellipse_point(90.0);
        assert!((bottom.x - 400.0).abs() < 1e-3);
        assert!((bottom.y - 420.0).abs() < 1e-3);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }

    #[test]
    fn test_hex_upper() {
        assert_eq!(to_hex_upper(&[0x41, 0x0a, 0xff]), "410AFF");
    }
}
