//! XPT2046 resistive touch controller driver.
//!
//! Talks to the controller over a bit-banged [`SerialBus`], debounces each
//! press by sampling three times, and maps the raw 12-bit readings onto
//! screen pixels.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::bus::{BitBangBus, SerialBus};
use crate::config::{
    Calibration, Orientation, Resolution, Rotation, SETTLE_DELAY_MS, TouchConfig,
};
use crate::transform::{Coordinates, raw_to_screen};

/// XPT2046 control bytes: start bit, channel select, 12-bit differential
/// conversion, power down between conversions.
mod cmd {
    pub const READ_X: u8 = 0xD0;
    pub const READ_Y: u8 = 0x90;
}

const COMMAND_BITS: u32 = 8;
const DATA_BITS: u32 = 12;
const TRAILING_CLOCKS: u32 = 3;

/// Repeat reads compared against the first sample of a press
const CONFIRM_READS: usize = 2;

/// Controller measurement channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X = 0,
    Y = 1,
}

impl Axis {
    /// Control byte that starts a conversion on this channel
    pub const fn command(self) -> u8 {
        match self {
            Axis::X => cmd::READ_X,
            Axis::Y => cmd::READ_Y,
        }
    }
}

/// XPT2046 touch controller driver
pub struct Xpt2046<BUS, D> {
    bus: BUS,
    delay: D,
    calibration: Calibration,
    resolution: Resolution,
    rotation: Rotation,
    orientation: Orientation,
    noise_tolerance: u16,
    raw_x: u16,
    raw_y: u16,
    point: Coordinates,
}

impl<CS, CLK, DIN, DOUT, D> Xpt2046<BitBangBus<CS, CLK, DIN, DOUT>, D>
where
    CS: OutputPin,
    CLK: OutputPin<Error = CS::Error>,
    DIN: OutputPin<Error = CS::Error>,
    DOUT: InputPin<Error = CS::Error>,
    D: DelayNs,
{
    /// Create a driver that bit-bangs the controller on four GPIO lines
    ///
    /// # Arguments
    /// * `cs` - Chip select output (active low)
    /// * `clk` - Clock output
    /// * `din` - Output wired to the controller's DIN
    /// * `dout` - Input wired to the controller's DOUT
    /// * `delay` - Delay provider for the settle time between samples
    pub fn from_pins(cs: CS, clk: CLK, din: DIN, dout: DOUT, delay: D) -> Result<Self, CS::Error> {
        let bus = BitBangBus::new(cs, clk, din, dout)?;
        Ok(Self::new(bus, delay))
    }
}

impl<BUS, D> Xpt2046<BUS, D>
where
    BUS: SerialBus,
    D: DelayNs,
{
    /// Create a driver on an already idle bus with the default settings
    pub fn new(bus: BUS, delay: D) -> Self {
        Self::with_config(bus, delay, TouchConfig::default())
    }

    /// Create a driver on an already idle bus with the given settings
    pub fn with_config(bus: BUS, delay: D, config: TouchConfig) -> Self {
        Self {
            bus,
            delay,
            calibration: config.calibration,
            resolution: config.resolution,
            rotation: config.rotation,
            orientation: config.rotation.orientation(),
            noise_tolerance: config.noise_tolerance,
            raw_x: 0,
            raw_y: 0,
            point: Coordinates::default(),
        }
    }

    /// Give back the bus and delay provider
    pub fn release(self) -> (BUS, D) {
        (self.bus, self.delay)
    }

    /// Run one conversion on `axis` and return the 12-bit result.
    ///
    /// The frame is 24 clocks: 8 command bits, one acquisition clock,
    /// 12 data bits sampled before each clock, then 3 trailing clocks.
    ///
    /// # Errors
    /// Returns the first pin error. Chip select is still released and
    /// data-in idled if a pin fails part-way through the frame.
    pub fn read_axis(&mut self, axis: Axis) -> Result<u16, BUS::Error> {
        self.bus.select()?;
        let conversion = self.clock_frame(axis.command());

        let released = self
            .bus
            .deselect()
            .and_then(|()| self.bus.write_bit(false));
        let value = conversion?;
        released?;

        Ok(value)
    }

    fn clock_frame(&mut self, command: u8) -> Result<u16, BUS::Error> {
        for bit in (0..COMMAND_BITS).rev() {
            self.bus.write_bit((command >> bit) & 1 == 1)?;
            self.bus.pulse_clock()?;
        }
        self.bus.pulse_clock()?;

        let mut value = 0u16;
        for _ in 0..DATA_BITS {
            value = (value << 1) | u16::from(self.bus.read_bit()?);
            self.bus.pulse_clock()?;
        }

        for _ in 0..TRAILING_CLOCKS {
            self.bus.pulse_clock()?;
        }

        Ok(value)
    }

    /// Check whether the screen is pressed right now.
    ///
    /// Takes a sample, then re-reads both axes twice with a settle delay
    /// before each round. Any re-read further than the noise tolerance from
    /// the first sample rejects the press, as does a first sample on or
    /// outside the calibration bounds. On acceptance the pixel position is
    /// updated and can be read back with [`x`](Self::x) and [`y`](Self::y).
    ///
    /// The raw position is cached on every call, accepted or not.
    pub fn pressed(&mut self) -> Result<bool, BUS::Error> {
        let raw_x = self.read_axis(Axis::X)?;
        let raw_y = self.read_axis(Axis::Y)?;
        self.raw_x = raw_x;
        self.raw_y = raw_y;

        for _ in 0..CONFIRM_READS {
            self.delay.delay_ms(SETTLE_DELAY_MS);
            if !self.is_stable(Axis::X, raw_x)? || !self.is_stable(Axis::Y, raw_y)? {
                return Ok(false);
            }
        }

        if !self.calibration.contains(raw_x, raw_y) {
            #[cfg(feature = "defmt")]
            defmt::trace!("touch: raw ({}, {}) outside calibration", raw_x, raw_y);
            return Ok(false);
        }

        self.point = raw_to_screen(
            raw_x,
            raw_y,
            &self.calibration,
            &self.resolution,
            self.orientation,
        );

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "touch: raw ({}, {}) -> ({}, {})",
            raw_x,
            raw_y,
            self.point.x,
            self.point.y
        );

        Ok(true)
    }

    /// Run a press check and return the new position if it was accepted
    pub fn poll(&mut self) -> Result<Option<Coordinates>, BUS::Error> {
        Ok(self.pressed()?.then_some(self.point))
    }

    fn is_stable(&mut self, axis: Axis, reference: u16) -> Result<bool, BUS::Error> {
        let value = self.read_axis(axis)?;
        let stable = reference.abs_diff(value) <= self.noise_tolerance;

        #[cfg(feature = "defmt")]
        {
            if !stable {
                defmt::trace!("touch: noisy {} read {} vs {}", axis, value, reference);
            }
        }

        Ok(stable)
    }

    /// Read the raw channel feeding the X pixel, without touching the cache.
    ///
    /// With the axes swapped this is the controller's Y channel.
    pub fn read_raw_x(&mut self) -> Result<u16, BUS::Error> {
        let axis = if self.orientation.swap_axes() {
            Axis::Y
        } else {
            Axis::X
        };
        self.read_axis(axis)
    }

    /// Read the raw channel feeding the Y pixel, without touching the cache.
    ///
    /// With the axes swapped this is the controller's X channel.
    pub fn read_raw_y(&mut self) -> Result<u16, BUS::Error> {
        let axis = if self.orientation.swap_axes() {
            Axis::X
        } else {
            Axis::Y
        };
        self.read_axis(axis)
    }

    /// Raw X from the last press check
    pub fn raw_x(&self) -> u16 {
        self.raw_x
    }

    /// Raw Y from the last press check
    pub fn raw_y(&self) -> u16 {
        self.raw_y
    }

    /// X pixel of the last accepted press
    pub fn x(&self) -> u16 {
        self.point.x
    }

    /// Y pixel of the last accepted press
    pub fn y(&self) -> u16 {
        self.point.y
    }

    /// Pixel position of the last accepted press
    pub fn coordinates(&self) -> Coordinates {
        self.point
    }

    /// Last accepted press as `x + y * width`
    pub fn zone(&self) -> u32 {
        self.point.zone(self.resolution.width)
    }

    /// Set the screen resolution in pixels, keeping the calibration
    pub fn set_resolution(&mut self, width: u16, height: u16) {
        self.resolution = Resolution::new(width, height);
    }

    /// Set the raw calibration bounds together with the resolution
    pub fn set_calibration(
        &mut self,
        x_min: u16,
        x_max: u16,
        y_min: u16,
        y_max: u16,
        width: u16,
        height: u16,
    ) {
        self.calibration = Calibration::new(x_min, x_max, y_min, y_max);
        self.resolution = Resolution::new(width, height);
    }

    /// Select rotation 0 to 3. Other values are ignored.
    pub fn set_rotation(&mut self, rotation: u8) {
        if let Some(rotation) = Rotation::from_index(rotation) {
            self.apply_rotation(rotation);
        }
    }

    /// Select a rotation and derive its orientation flags
    pub fn apply_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.orientation = rotation.orientation();
    }

    /// Set the allowed raw difference between repeated reads of one axis
    pub fn set_noise_tolerance(&mut self, noise_tolerance: u16) {
        self.noise_tolerance = noise_tolerance;
    }

    /// Current raw calibration bounds
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Current screen resolution
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Current rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Orientation flags derived from the current rotation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Current noise tolerance in raw units
    pub fn noise_tolerance(&self) -> u16 {
        self.noise_tolerance
    }
}
