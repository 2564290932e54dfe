//! Raw-to-pixel coordinate mapping.

use crate::config::{Calibration, Orientation, Resolution};

/// Touch point coordinates in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coordinates {
    pub x: u16,
    pub y: u16,
}

impl Coordinates {
    /// Single scalar for grid lookups: `x + y * width`
    pub fn zone(&self, width: u16) -> u32 {
        u32::from(self.x) + u32::from(self.y) * u32::from(width)
    }
}

/// Linearly map `value` from `[in_min, in_max]` onto `[0, out_max]`.
///
/// Integer arithmetic truncating toward zero; the result is clamped to
/// `[0, out_max]`. An empty input range maps everything to 0.
pub fn map_range(value: u16, in_min: u16, in_max: u16, out_max: u16) -> u16 {
    let span = i64::from(in_max) - i64::from(in_min);
    if span == 0 {
        return 0;
    }

    let mapped = (i64::from(value) - i64::from(in_min)) * i64::from(out_max) / span;
    // Clamped into u16 range above, the cast cannot truncate
    mapped.clamp(0, i64::from(out_max)) as u16
}

/// Map a raw sample to screen pixels under the given orientation.
///
/// Raw X always maps into `[0, width]` and raw Y into `[0, height]`. When the
/// axes are swapped those results land in the opposite pixel axis, and a flip
/// mirrors across the bound the value was mapped into.
pub fn raw_to_screen(
    raw_x: u16,
    raw_y: u16,
    calibration: &Calibration,
    resolution: &Resolution,
    orientation: Orientation,
) -> Coordinates {
    let from_x = map_range(raw_x, calibration.x_min, calibration.x_max, resolution.width);
    let from_y = map_range(raw_y, calibration.y_min, calibration.y_max, resolution.height);

    let (mut x, mut y, x_bound, y_bound) = if orientation.swap_axes() {
        (from_y, from_x, resolution.height, resolution.width)
    } else {
        (from_x, from_y, resolution.width, resolution.height)
    };

    if orientation.flip_x() {
        x = x_bound.saturating_sub(x);
    }
    if orientation.flip_y() {
        y = y_bound.saturating_sub(y);
    }

    Coordinates { x, y }
}
