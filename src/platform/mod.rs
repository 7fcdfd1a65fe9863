//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key codes and touch zones -> game actions)
//! - Orientation checks on mobile
//! - Calendar date for the daily high score
//! - Bookkeeping for the one outstanding animation frame
//! - Browser bindings (`web`, wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::game::FrameHandle;

/// Action bound to a keyboard key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Jump,
    Duck,
}

/// The one key that starts or restarts a run
pub const START_KEY: &str = "Space";

/// Map a `KeyboardEvent.code` to a game action
pub fn key_action(code: &str) -> Option<KeyAction> {
    match code {
        "Space" | "ArrowUp" => Some(KeyAction::Jump),
        "ArrowDown" => Some(KeyAction::Duck),
        _ => None,
    }
}

/// Half of the canvas a touch landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchZone {
    Jump,
    Duck,
}

/// Upper half jumps, lower half ducks
///
/// `y` is relative to the canvas top, `height` is the canvas' on-screen height.
pub fn touch_zone(y: f32, height: f32) -> TouchZone {
    if y > height / 2.0 {
        TouchZone::Duck
    } else {
        TouchZone::Jump
    }
}

/// User agent sniffing for phones and tablets
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    const MARKERS: [&str; 8] = [
        "Android",
        "webOS",
        "iPhone",
        "iPad",
        "iPod",
        "BlackBerry",
        "IEMobile",
        "Opera Mini",
    ];
    MARKERS.iter().any(|m| user_agent.contains(m))
}

/// What the browser reports about the screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrientationInfo {
    pub is_mobile: bool,
    /// `screen.orientation.type`, when the API exists
    pub orientation_type: Option<String>,
    /// Legacy `window.orientation` angle
    pub legacy_angle: Option<i32>,
    pub width: f32,
    pub height: f32,
}

/// Whether the game may run: desktops always, mobiles only in landscape
pub fn is_landscape(info: &OrientationInfo) -> bool {
    if !info.is_mobile {
        return true;
    }
    if let Some(kind) = &info.orientation_type {
        return kind.contains("landscape");
    }
    if let Some(angle) = info.legacy_angle {
        return angle.abs() == 90;
    }
    info.width > info.height
}

/// The one outstanding browser frame request, as game handle and native id
///
/// Cleared when its frame fires or is cancelled, so nothing accumulates over
/// a long session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameSlot {
    current: Option<(FrameHandle, i32)>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new request; returns the native id it displaced, if any
    pub fn arm(&mut self, handle: FrameHandle, native_id: i32) -> Option<i32> {
        self.current.replace((handle, native_id)).map(|(_, id)| id)
    }

    /// The frame for `handle` is running; forget it
    pub fn fired(&mut self, handle: FrameHandle) {
        if self.current.is_some_and(|(h, _)| h == handle) {
            self.current = None;
        }
    }

    /// Native id to cancel for `handle`, if it is still outstanding
    pub fn take(&mut self, handle: FrameHandle) -> Option<i32> {
        match self.current {
            Some((h, id)) if h == handle => {
                self.current = None;
                Some(id)
            }
            _ => None,
        }
    }

    pub fn current(&self) -> Option<FrameHandle> {
        self.current.map(|(h, _)| h)
    }
}

/// Today's date in the browser's `Date.toDateString()` shape
#[cfg(target_arch = "wasm32")]
pub fn today() -> String {
    String::from(js_sys::Date::new_0().to_date_string())
}

/// Today's date in the browser's `Date.toDateString()` shape
///
/// Native builds have no local time zone, so the date is the UTC one and the
/// daily high score rolls over at UTC midnight rather than local midnight.
#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    utc_date_string(secs)
}

/// UTC calendar date of a Unix timestamp
pub fn utc_date_string(unix_secs: u64) -> String {
    date_string((unix_secs / 86_400) as i64)
}

/// Format days since the Unix epoch as e.g. `Mon Jan 05 2026`
pub fn date_string(days: i64) -> String {
    const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    // 1970-01-01 was a Thursday
    let weekday = (days + 4).rem_euclid(7) as usize;

    // Civil-from-days over 400-year eras
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };

    format!(
        "{} {} {:02} {}",
        WEEKDAYS[weekday],
        MONTHS[(month - 1) as usize],
        day,
        year
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_slot_holds_one_request() {
        let mut slot = FrameSlot::new();
        assert_eq!(slot.arm(1, 100), None);
        slot.fired(1);
        assert_eq!(slot.current(), None);

        // Thousands of fired frames leave nothing behind
        for handle in 2..5000 {
            assert_eq!(slot.arm(handle, handle as i32 + 100), None);
            slot.fired(handle);
        }
        assert_eq!(slot, FrameSlot::new());
    }

    #[test]
    fn test_frame_slot_cancel_matches_handle() {
        let mut slot = FrameSlot::new();
        slot.arm(7, 70);
        // A stale handle neither cancels nor clears the live request
        assert_eq!(slot.take(6), None);
        slot.fired(6);
        assert_eq!(slot.current(), Some(7));
        assert_eq!(slot.take(7), Some(70));
        assert_eq!(slot.take(7), None);

        slot.arm(8, 80);
        assert_eq!(slot.arm(9, 90), Some(80));
        assert_eq!(slot.current(), Some(9));
    }

    #[test]
    fn test_utc_date_rolls_at_utc_midnight() {
        // 2026-01-05 23:59:59 UTC, then one second later
        assert_eq!(utc_date_string(1_767_657_599), "Mon Jan 05 2026");
        assert_eq!(utc_date_string(1_767_657_600), "Tue Jan 06 2026");
        assert_eq!(utc_date_string(0), "Thu Jan 01 1970");
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_action("Space"), Some(KeyAction::Jump));
        assert_eq!(key_action("ArrowUp"), Some(KeyAction::Jump));
        assert_eq!(key_action("ArrowDown"), Some(KeyAction::Duck));
        assert_eq!(key_action("KeyA"), None);
        assert_eq!(key_action("Escape"), None);
        assert_eq!(START_KEY, "Space");
    }

    #[test]
    fn test_touch_zones() {
        assert_eq!(touch_zone(10.0, 400.0), TouchZone::Jump);
        assert_eq!(touch_zone(200.0, 400.0), TouchZone::Jump);
        assert_eq!(touch_zone(201.0, 400.0), TouchZone::Duck);
    }

    #[test]
    fn test_mobile_user_agents() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"
        ));
        assert!(is_mobile_user_agent("Mozilla/5.0 (Linux; Android 14; Pixel 8)"));
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
        ));
    }

    #[test]
    fn test_desktop_is_always_landscape() {
        let info = OrientationInfo {
            is_mobile: false,
            width: 300.0,
            height: 800.0,
            ..Default::default()
        };
        assert!(is_landscape(&info));
    }

    #[test]
    fn test_mobile_orientation_fallbacks() {
        let mut info = OrientationInfo {
            is_mobile: true,
            orientation_type: Some("portrait-primary".into()),
            legacy_angle: Some(90),
            width: 800.0,
            height: 400.0,
        };
        // The orientation API wins over everything else
        assert!(!is_landscape(&info));

        info.orientation_type = None;
        assert!(is_landscape(&info));
        info.legacy_angle = Some(-90);
        assert!(is_landscape(&info));
        info.legacy_angle = Some(0);
        assert!(!is_landscape(&info));

        info.legacy_angle = None;
        assert!(is_landscape(&info));
        info.width = 390.0;
        assert!(!is_landscape(&info));
    }

    #[test]
    fn test_date_string() {
        assert_eq!(date_string(0), "Thu Jan 01 1970");
        assert_eq!(date_string(20_458), "Mon Jan 05 2026");
        assert_eq!(date_string(11_016), "Tue Feb 29 2000");
        assert_eq!(date_string(-1), "Wed Dec 31 1969");
    }
}
