/// Horizontal extent of the rendered timeline strip, in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimelineRect {
    pub left: f64,
    pub width: f64,
}

impl TimelineRect {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// Pointer x coordinate for a percentage of the width.
    pub fn x_at(&self, percent: f64) -> f64 {
        self.left + self.width * percent / 100.0
    }
}

/// Time to percentage of the timeline width. Not clamped: times past the
/// duration land beyond 100 and are clipped by the renderer.
///
/// Returns 0 until a usable duration is known, never NaN.
pub fn time_to_position(time: f64, duration: f64) -> f64 {
    if !has_duration(duration) {
        return 0.0;
    }
    (time / duration) * 100.0
}

/// Pointer x coordinate to time. The pointer may be anywhere on screen during a
/// drag; the result is always inside `[0, duration]`.
pub fn position_to_time(pixel_x: f64, rect: TimelineRect, duration: f64) -> f64 {
    if !has_duration(duration) || !(rect.width > 0.0) {
        return 0.0;
    }
    let fraction = ((pixel_x - rect.left) / rect.width).clamp(0.0, 1.0);
    if fraction.is_nan() {
        return 0.0;
    }
    fraction * duration
}

fn has_duration(duration: f64) -> bool {
    duration.is_finite() && duration > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: TimelineRect = TimelineRect { left: 40.0, width: 800.0 };

    #[test]
    fn zero_duration_maps_to_zero() {
        for t in [0.0, 1.0, 59.5, 1e9, -3.0] {
            assert_eq!(time_to_position(t, 0.0), 0.0);
        }
        assert_eq!(position_to_time(400.0, RECT, 0.0), 0.0);
        assert_eq!(time_to_position(10.0, f64::NAN), 0.0);
    }

    #[test]
    fn position_is_unclamped() {
        assert_eq!(time_to_position(150.0, 100.0), 150.0);
        assert_eq!(time_to_position(25.0, 100.0), 25.0);
    }

    #[test]
    fn round_trip_through_pixels() {
        let duration = 1423.7;
        let mut t = 0.0;
        while t <= duration {
            let x = RECT.x_at(time_to_position(t, duration));
            let back = position_to_time(x, RECT, duration);
            assert!((back - t).abs() < 1e-9, "t={t} back={back}");
            t += 17.3;
        }
    }

    #[test]
    fn pointer_outside_rect_is_clamped() {
        assert_eq!(position_to_time(-500.0, RECT, 120.0), 0.0);
        assert_eq!(position_to_time(RECT.left - 1.0, RECT, 120.0), 0.0);
        assert_eq!(position_to_time(RECT.left + RECT.width + 300.0, RECT, 120.0), 120.0);
        assert_eq!(position_to_time(RECT.left + RECT.width / 2.0, RECT, 120.0), 60.0);
    }

    #[test]
    fn collapsed_rect_maps_to_zero() {
        let rect = TimelineRect::new(10.0, 0.0);
        assert_eq!(position_to_time(10.0, rect, 120.0), 0.0);
    }
}
