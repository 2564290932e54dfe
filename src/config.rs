//! Calibration, screen geometry and orientation settings.
//!
//! The `DEFAULT_*` constants are the values a freshly constructed driver
//! starts with. If they match your panel, no calibration call is needed.

/// Raw X reading at the left edge of the visible screen
pub const DEFAULT_X_MIN: u16 = 0;
/// Raw X reading at the right edge of the visible screen
pub const DEFAULT_X_MAX: u16 = 4095;
/// Raw Y reading at the top edge of the visible screen
pub const DEFAULT_Y_MIN: u16 = 0;
/// Raw Y reading at the bottom edge of the visible screen
pub const DEFAULT_Y_MAX: u16 = 4095;

/// Screen width in pixels, portrait orientation
pub const DEFAULT_X_RES: u16 = 320;
/// Screen height in pixels, portrait orientation
pub const DEFAULT_Y_RES: u16 = 240;

/// Rotation applied at construction
pub const DEFAULT_ROTATION: Rotation = Rotation::Rotate90;

/// Maximum difference, in raw units, between repeated reads of one axis
/// for a press to count as stable. About 10 works well for most panels.
pub const DEFAULT_NOISE_TOLERANCE: u16 = 10;

/// Settle time between the repeated reads of a press check
pub const SETTLE_DELAY_MS: u32 = 1;

/// Raw sensor bounds of the touch-sensitive region.
///
/// Both bounds are exclusive: a raw value equal to `x_min` or `x_max` is
/// treated as outside the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub x_min: u16,
    pub x_max: u16,
    pub y_min: u16,
    pub y_max: u16,
}

impl Calibration {
    /// Bounds from raw readings taken at the screen edges
    pub const fn new(x_min: u16, x_max: u16, y_min: u16, y_max: u16) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Check that both raw values lie strictly inside the range
    pub fn contains(&self, raw_x: u16, raw_y: u16) -> bool {
        raw_x > self.x_min && raw_x < self.x_max && raw_y > self.y_min && raw_y < self.y_max
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new(DEFAULT_X_MIN, DEFAULT_X_MAX, DEFAULT_Y_MIN, DEFAULT_Y_MAX)
    }
}

/// Target screen resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolution {
    pub width: u16,
    pub height: u16,
}

impl Resolution {
    /// Resolution of `width` by `height` pixels
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(DEFAULT_X_RES, DEFAULT_Y_RES)
    }
}

/// Display rotation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    Rotate0 = 0,
    Rotate90 = 1,
    Rotate180 = 2,
    Rotate270 = 3,
}

impl Rotation {
    /// Look up a rotation by its selector, `None` for anything outside 0..=3
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Rotation::Rotate0),
            1 => Some(Rotation::Rotate90),
            2 => Some(Rotation::Rotate180),
            3 => Some(Rotation::Rotate270),
            _ => None,
        }
    }

    /// Selector of this rotation, 0 to 3
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Axis routing and mirroring for this rotation.
    ///
    /// | rotation | swap | x flip | y flip |
    /// |----------|------|--------|--------|
    /// | 0        | yes  | yes    | no     |
    /// | 1        | no   | no     | no     |
    /// | 2        | yes  | no     | yes    |
    /// | 3        | no   | yes    | yes    |
    pub const fn orientation(self) -> Orientation {
        match self {
            Rotation::Rotate0 => Orientation {
                swap_axes: true,
                flip_x: true,
                flip_y: false,
            },
            Rotation::Rotate90 => Orientation {
                swap_axes: false,
                flip_x: false,
                flip_y: false,
            },
            Rotation::Rotate180 => Orientation {
                swap_axes: true,
                flip_x: false,
                flip_y: true,
            },
            Rotation::Rotate270 => Orientation {
                swap_axes: false,
                flip_x: true,
                flip_y: true,
            },
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        DEFAULT_ROTATION
    }
}

impl TryFrom<u8> for Rotation {
    type Error = u8;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Rotation::from_index(index).ok_or(index)
    }
}

/// Orientation flags derived from a [`Rotation`].
///
/// There is no way to build one except through [`Rotation::orientation`],
/// so the flags always agree with the rotation they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Orientation {
    swap_axes: bool,
    flip_x: bool,
    flip_y: bool,
}

impl Orientation {
    /// Raw X feeds the Y pixel and raw Y feeds the X pixel
    pub const fn swap_axes(&self) -> bool {
        self.swap_axes
    }

    /// X pixel is mirrored
    pub const fn flip_x(&self) -> bool {
        self.flip_x
    }

    /// Y pixel is mirrored
    pub const fn flip_y(&self) -> bool {
        self.flip_y
    }
}

/// Driver settings applied in one go.
///
/// ```ignore
/// let config = TouchConfig::default()
///     .with_calibration(Calibration::new(200, 3900, 300, 3800))
///     .with_rotation(Rotation::Rotate0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchConfig {
    pub calibration: Calibration,
    pub resolution: Resolution,
    pub rotation: Rotation,
    pub noise_tolerance: u16,
}

impl TouchConfig {
    /// Replace the raw calibration bounds
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Replace the screen resolution
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Replace the rotation
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Replace the noise tolerance
    pub fn with_noise_tolerance(mut self, noise_tolerance: u16) -> Self {
        self.noise_tolerance = noise_tolerance;
        self
    }
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            resolution: Resolution::default(),
            rotation: Rotation::default(),
            noise_tolerance: DEFAULT_NOISE_TOLERANCE,
        }
    }
}
