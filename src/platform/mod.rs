//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (mock transaction block times)
//! - The `wasm-bindgen` entry point for browser hosts

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Current unix time in whole seconds
#[cfg(target_arch = "wasm32")]
pub fn unix_time_secs() -> u64 {
    (js_sys::Date::now() / 1000.0).floor() as u64
}

/// Current unix time in whole seconds
#[cfg(not(target_arch = "wasm32"))]
pub fn unix_time_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_after_2020() {
        assert!(unix_time_secs() > 1_577_836_800);
    }
}
