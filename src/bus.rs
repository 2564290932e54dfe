//! Synchronous serial bus used to talk to the touch controller.
//!
//! The controller speaks a plain clocked protocol: active-low chip select,
//! clock idling low, MSB first. [`SerialBus`] exposes the handful of line
//! operations the driver needs, so the sampling code does not care whether
//! the lines are toggled by hand or by a peripheral.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Line-level operations on a synchronous serial bus
pub trait SerialBus {
    type Error;

    /// Assert chip select (drive it low)
    fn select(&mut self) -> Result<(), Self::Error>;

    /// Release chip select (drive it high)
    fn deselect(&mut self) -> Result<(), Self::Error>;

    /// One clock period: high, then back to low
    fn pulse_clock(&mut self) -> Result<(), Self::Error>;

    /// Drive the controller's data-in line
    fn write_bit(&mut self, bit: bool) -> Result<(), Self::Error>;

    /// Sample the controller's data-out line
    fn read_bit(&mut self) -> Result<bool, Self::Error>;
}

impl<T: SerialBus + ?Sized> SerialBus for &mut T {
    type Error = T::Error;

    fn select(&mut self) -> Result<(), Self::Error> {
        T::select(self)
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        T::deselect(self)
    }

    fn pulse_clock(&mut self) -> Result<(), Self::Error> {
        T::pulse_clock(self)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), Self::Error> {
        T::write_bit(self, bit)
    }

    fn read_bit(&mut self) -> Result<bool, Self::Error> {
        T::read_bit(self)
    }
}

/// [`SerialBus`] driven over four GPIO lines.
///
/// `din` and `dout` are named from the controller's side: the driver writes
/// commands on `din` and reads conversions from `dout`. All four pins must
/// share one error type, which for most HALs is `Infallible`.
pub struct BitBangBus<CS, CLK, DIN, DOUT> {
    cs: CS,
    clk: CLK,
    din: DIN,
    dout: DOUT,
}

impl<CS, CLK, DIN, DOUT> BitBangBus<CS, CLK, DIN, DOUT>
where
    CS: OutputPin,
    CLK: OutputPin<Error = CS::Error>,
    DIN: OutputPin<Error = CS::Error>,
    DOUT: InputPin<Error = CS::Error>,
{
    /// Take ownership of the pins and put the lines in their idle state:
    /// chip select high, clock low, data-in low.
    pub fn new(mut cs: CS, mut clk: CLK, mut din: DIN, dout: DOUT) -> Result<Self, CS::Error> {
        cs.set_high()?;
        clk.set_low()?;
        din.set_low()?;

        Ok(Self { cs, clk, din, dout })
    }

    /// Give the pins back
    pub fn release(self) -> (CS, CLK, DIN, DOUT) {
        (self.cs, self.clk, self.din, self.dout)
    }
}

impl<CS, CLK, DIN, DOUT> SerialBus for BitBangBus<CS, CLK, DIN, DOUT>
where
    CS: OutputPin,
    CLK: OutputPin<Error = CS::Error>,
    DIN: OutputPin<Error = CS::Error>,
    DOUT: InputPin<Error = CS::Error>,
{
    type Error = <CS as ErrorType>::Error;

    fn select(&mut self) -> Result<(), Self::Error> {
        self.cs.set_low()
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.cs.set_high()
    }

    #[inline]
    fn pulse_clock(&mut self) -> Result<(), Self::Error> {
        self.clk.set_high()?;
        self.clk.set_low()
    }

    #[inline]
    fn write_bit(&mut self, bit: bool) -> Result<(), Self::Error> {
        if bit {
            self.din.set_high()
        } else {
            self.din.set_low()
        }
    }

    #[inline]
    fn read_bit(&mut self) -> Result<bool, Self::Error> {
        self.dout.is_high()
    }
}
