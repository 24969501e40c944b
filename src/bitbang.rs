//! "Bit bang" implementation of the HT1632 serial bus
//!
//! The HT1632 listens on a shared clock ("WR") and data line while its chip select line is low.
//! Data is set up while the clock is low and taken over by the chip on the rising edge of the
//! clock. Depending on the field the bits go out most or least significant bit first, which
//! is why this isn't a plain SPI implementation (SPI peripherals only do whole bytes in one
//! order).
//!
//! Use `BitBangBus::new()` for slow boards who do not need a delay
//! and `BitBangBus::new_with_delay()` for fast(er) boards.

use hal::blocking::delay::DelayUs;
use hal::digital::v2::OutputPin;

use crate::instructions::{Command, ModeId};

/// Used to run without delay on a slow enough clock speed
///
/// The HT1632 needs about 1.7µs per write clock, a 16Mhz AVR toggling pins is slow enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay {}

impl DelayUs<u8> for NoDelay {
    #[inline]
    fn delay_us(&mut self, _us: u8) {}
}

/// The shared clock and data lines of a chain of HT1632 displays.
#[derive(Debug)]
pub struct BitBangBus<CLK, DATA, DELAY> {
    clk: CLK,
    data: DATA,
    delay: DELAY,
}

impl<ERR, CLK, DATA> BitBangBus<CLK, DATA, NoDelay>
where
    CLK: OutputPin<Error = ERR>,
    DATA: OutputPin<Error = ERR>,
{
    /// Constructs the bus from the "data" and "clock" (WR) pins, both lines are left high.
    /// If your core toggles pins faster than the HT1632 can follow please consider
    /// `new_with_delay`, otherwise the display will show garbage.
    pub fn new(clk: CLK, data: DATA) -> Result<BitBangBus<CLK, DATA, NoDelay>, ERR> {
        BitBangBus::new_with_delay(clk, data, NoDelay {})
    }
}

impl<ERR, CLK, DATA, DELAY> BitBangBus<CLK, DATA, DELAY>
where
    CLK: OutputPin<Error = ERR>,
    DATA: OutputPin<Error = ERR>,
    DELAY: DelayUs<u8>,
{
    /// Constructs the bus from the "data" and "clock" (WR) pins
    /// with a clock delay, the delay is applied after every clock edge.
    pub fn new_with_delay(
        clk: CLK,
        data: DATA,
        delay: DELAY,
    ) -> Result<BitBangBus<CLK, DATA, DELAY>, ERR> {
        let mut bus = BitBangBus { clk, data, delay };
        bus.idle()?;
        Ok(bus)
    }

    /// Put clock and data in their idle (high) state
    pub fn idle(&mut self) -> Result<(), ERR> {
        self.data.set_high()?;
        self.clk.set_high()
    }

    /// Clock a single bit to the selected chip(s)
    #[inline]
    pub fn write_bit(&mut self, high: bool) -> Result<(), ERR> {
        self.clk.set_low()?;
        if high {
            self.data.set_high()?;
        } else {
            self.data.set_low()?;
        }
        self.delay.delay_us(1);
        self.clk.set_high()?;
        self.delay.delay_us(1);
        Ok(())
    }

    /// Write the lowest `bits` bits of `value`, most significant bit first
    pub fn write_msb_first(&mut self, bits: u8, value: u8) -> Result<(), ERR> {
        for i in (0..bits.min(8)).rev() {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }

    /// Write the lowest `bits` bits of `value`, least significant bit first
    pub fn write_lsb_first(&mut self, bits: u8, value: u8) -> Result<(), ERR> {
        for i in 0..bits.min(8) {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }

    /// Start a transfer by sending the three bit mode id
    pub fn write_id(&mut self, id: ModeId) -> Result<(), ERR> {
        self.write_msb_first(ModeId::BITS, id.bits())
    }

    /// Send a 7 bit display RAM address
    pub fn write_address(&mut self, address: u8) -> Result<(), ERR> {
        self.write_msb_first(7, address)
    }

    /// Send one command: 8 bits and the trailing "don't care" bit
    pub fn write_command(&mut self, command: Command) -> Result<(), ERR> {
        self.write_msb_first(8, command.byte())?;
        self.write_bit(false)
    }

    /// Send one 4 bit RAM cell
    pub fn write_nibble(&mut self, nibble: u8) -> Result<(), ERR> {
        self.write_lsb_first(4, nibble)
    }

    /// Send a framebuffer byte, it fills two consecutive RAM cells (low nibble first)
    pub fn write_byte(&mut self, value: u8) -> Result<(), ERR> {
        self.write_lsb_first(8, value)
    }

    /// Give the pins and the delay back
    pub fn release(self) -> (CLK, DATA, DELAY) {
        (self.clk, self.data, self.delay)
    }
}

/// Activate a chip, chip select is active low
#[inline]
pub fn select<CS: OutputPin>(cs: &mut CS) -> Result<(), CS::Error> {
    cs.set_low()
}

/// Deactivate a chip, it ignores the bus afterwards
#[inline]
pub fn deselect<CS: OutputPin>(cs: &mut CS) -> Result<(), CS::Error> {
    cs.set_high()
}
