//! Driver for XPT2046-style resistive touch controllers wired to plain GPIO.
//!
//! The controller is bit-banged over four lines (chip select, clock, data
//! in, data out). Each press check samples both axes three times and only
//! accepts readings that agree with each other and fall inside the
//! calibration range; accepted readings are mapped to pixels for one of
//! four screen rotations.
//!
//! ```ignore
//! let mut touch = Xpt2046::from_pins(cs, clk, din, dout, delay)?;
//! touch.set_rotation(1);
//! if touch.pressed()? {
//!     println!("x={} y={}", touch.x(), touch.y());
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod config;
pub mod transform;
pub mod xpt2046;

pub use bus::{BitBangBus, SerialBus};
pub use config::{Calibration, Orientation, Resolution, Rotation, TouchConfig};
pub use transform::Coordinates;
pub use xpt2046::{Axis, Xpt2046};
