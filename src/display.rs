//! # Main driver for a chain of HT1632 displays
//!
//! In here most of the data structures and functions care about state keeping of the displays
//! and sending raw bits to the devices. The drawing functions that span several displays live
//! in the `toolbox` module.
//!
//! All displays share the clock and data line, every display has its own chip select pin. A
//! display is addressed by its position in the chain, display 0 being the leftmost.
//!
//! Typically you want to look into the following funcions:
//!  - MatrixDisplay.new() to create a new driver instance
//!  - MatrixDisplay.init_display() to bring up every display, exactly one of them as master
//!  - MatrixDisplay.set_pixel() and MatrixDisplay.sync() to draw
//!  - MatrixDisplay.set_brightness() to change the PWM duty of a display
//!
//! Pixels end up in an in-memory framebuffer first. They reach the displays either with a
//! `sync()` (all displays), a `flush()` (only displays that changed), or immediately when they
//! are set with `paint`. Painting costs 14 bits on the wire per pixel, a sync 266 bits per
//! display, so painting is the better choice for a handful of pixels only.
//!
//! The shadow buffer is never sent anywhere. Setting a pixel in the shadow buffer with `paint`
//! only changes the shadow buffer.
use hal::blocking::delay::DelayUs;
use hal::digital::v2::OutputPin;

use crate::{
    bitbang::{deselect, select, BitBangBus},
    error::*,
    framebuffer::{nibble_address, nibble_of, Buffer, Framebuffer},
    instructions::prelude::*,
    HEIGHT, MAX_BRIGHTNESS, NIBBLES, WIDTH,
};

/// Settings that are fixed for the lifetime of a driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// keep a shadow buffer next to the live framebuffer
    pub shadow: bool,
}

impl Config {
    pub fn with_shadow(mut self, shadow: bool) -> Config {
        self.shadow = shadow;
        self
    }
}

// state of a configured display
#[derive(Debug)]
struct Chip<CS> {
    cs: CS,
    role: Role,
    brightness: u8,
}

/// main struct for state keeping of the displays in a chain of `N`
#[derive(Debug)]
pub struct MatrixDisplay<CLK, DATA, CS, DELAY, const N: usize> {
    bus: BitBangBus<CLK, DATA, DELAY>,
    chips: [Option<Chip<CS>>; N],
    framebuffer: Framebuffer<N>,
    dirty: [bool; N],
}

type Bus<CLK, DATA, DELAY> = BitBangBus<CLK, DATA, DELAY>;

impl<CLK, DATA, CS, DELAY, ERR, const N: usize> MatrixDisplay<CLK, DATA, CS, DELAY, N>
where
    CLK: OutputPin<Error = ERR>,
    DATA: OutputPin<Error = ERR>,
    CS: OutputPin<Error = ERR>,
    DELAY: DelayUs<u8>,
{
    /// Create a new instance of the driver for `N` displays
    ///
    /// Arguments:
    ///
    /// - clk: the shared clock (WR) line, a GPIO OutputPin
    /// - data: the shared data line, a GPIO OutputPin
    /// - delay: waits after every clock edge, use `NoDelay` on slow cores
    /// - config: see [`Config`]
    ///
    /// No display is usable until it got its chip select pin with `init_display()`.
    pub fn new(
        clk: CLK,
        data: DATA,
        delay: DELAY,
        config: Config,
    ) -> Result<MatrixDisplay<CLK, DATA, CS, DELAY, N>, Error<ERR>> {
        let framebuffer = Framebuffer::new(config.shadow)?;
        let bus = Error::pin(BitBangBus::new_with_delay(clk, data, delay))?;

        debug!("driver for {} displays, shadow buffer: {}", N, config.shadow);

        Ok(MatrixDisplay {
            bus,
            chips: core::array::from_fn(|_| None),
            framebuffer,
            dirty: [false; N],
        })
    }

    /// Bring up a display and associate it with its chip select pin.
    ///
    /// Sends the fixed configuration sequence (system off, 32x8 commons, master or slave mode,
    /// system on, LEDs on, blinking off, full brightness) and clears the display.
    /// Calling it again for the same display replaces the pin and runs the sequence again.
    /// Only one display of a chain may be master.
    pub fn init_display(
        &mut self,
        display: usize,
        mut cs: CS,
        role: Role,
    ) -> Result<(), Error<ERR>> {
        Self::check(display)?;
        if role == Role::Master {
            let other = self.chips.iter().enumerate().find(|(index, chip)| {
                *index != display && matches!(chip, Some(Chip { role: Role::Master, .. }))
            });
            if let Some((master, _)) = other {
                warn!("display {} can't be master, display {} already is", display, master);
                return Err(ConfigError::DuplicateMaster { display, master }.into());
            }
        }

        // idle the new chip before anything else happens on the bus
        Error::pin(deselect(&mut cs))?;
        self.chips[display] = Some(Chip { cs, role, brightness: MAX_BRIGHTNESS });

        self.write_commands(display, &bring_up_sequence(role))?;
        info!("display {} up, master: {}", display, role == Role::Master);

        self.clear(display, Buffer::Live, true)
    }

    pub fn display_count(&self) -> usize {
        N
    }

    /// width of a single display in pixels
    pub fn width(&self) -> u8 {
        WIDTH
    }

    /// height of a single display in pixels
    pub fn height(&self) -> u8 {
        HEIGHT
    }

    pub fn is_configured(&self, display: usize) -> bool {
        matches!(self.chips.get(display), Some(Some(_)))
    }

    pub fn role(&self, display: usize) -> Option<Role> {
        self.chips.get(display)?.as_ref().map(|chip| chip.role)
    }

    /// last brightness sent to a display
    pub fn brightness(&self, display: usize) -> Option<u8> {
        self.chips.get(display)?.as_ref().map(|chip| chip.brightness)
    }

    /// true if the framebuffer of the display changed since it was last sent
    pub fn is_dirty(&self, display: usize) -> bool {
        self.dirty.get(display).copied().unwrap_or(false)
    }

    pub fn framebuffer(&self) -> &Framebuffer<N> {
        &self.framebuffer
    }

    /// Set the brightness (PWM duty) of a display in range of 0..16
    ///
    /// the value automatically gets capped to max value (15) if it is 16 or higher
    pub fn set_brightness(&mut self, display: usize, pwm: u8) -> Result<(), Error<ERR>> {
        let level = pwm.min(MAX_BRIGHTNESS);
        self.write_commands(display, &[Pwm(level)])?;
        if let Some(chip) = self.chips[display].as_mut() {
            chip.brightness = level;
        }
        Ok(())
    }

    /// Turn the LEDs of a display on or off, the display RAM is kept
    pub fn set_led(&mut self, display: usize, on: bool) -> Result<(), Error<ERR>> {
        self.write_commands(display, &[if on { LedOn } else { LedOff }])
    }

    /// Let the whole display blink
    pub fn set_blink(&mut self, display: usize, on: bool) -> Result<(), Error<ERR>> {
        self.write_commands(display, &[if on { BlinkOn } else { BlinkOff }])
    }

    /// Switch the oscillator of a display on or off ("sleep mode").
    ///
    /// Switching it back on leaves the LEDs off, follow up with `set_led()`.
    pub fn set_enabled(&mut self, display: usize, on: bool) -> Result<(), Error<ERR>> {
        self.write_commands(display, &[if on { SystemEnable } else { SystemDisable }])
    }

    /// Write 4 bit cells straight to the display RAM, starting at `address`.
    ///
    /// Only the lowest 4 bits of every entry in `nibbles` are sent. The framebuffer is not
    /// touched, so the next sync overwrites whatever was written here.
    pub fn write_nibbles(
        &mut self,
        display: usize,
        address: u8,
        nibbles: &[u8],
    ) -> Result<(), Error<ERR>> {
        trace!("display {}: {} nibbles at {}", display, nibbles.len(), address);
        self.transaction(display, |bus| {
            bus.write_id(ModeId::Write)?;
            bus.write_address(address)?;
            for nibble in nibbles {
                bus.write_nibble(*nibble)?;
            }
            Ok(())
        })
    }

    /// Send the framebuffer of every configured display to its display RAM
    pub fn sync(&mut self) -> Result<(), Error<ERR>> {
        for display in 0..N {
            if self.is_configured(display) {
                self.push(display)?;
            }
        }
        debug!("synced {} displays", N);
        Ok(())
    }

    /// Like `sync()`, but only for displays whose framebuffer changed since they were last sent
    pub fn flush(&mut self) -> Result<(), Error<ERR>> {
        for display in 0..N {
            if self.dirty[display] && self.is_configured(display) {
                self.push(display)?;
            }
        }
        Ok(())
    }

    /// Set a pixel of a single display
    ///
    /// With `paint` a live pixel is sent to the display right away, see the module documentation.
    pub fn set_pixel(
        &mut self,
        display: usize,
        x: u8,
        y: u8,
        on: bool,
        buffer: Buffer,
        paint: bool,
    ) -> Result<(), Error<ERR>> {
        let paint = paint && buffer == Buffer::Live;
        if paint {
            self.chip(display)?;
        }

        self.framebuffer.set_pixel(display, x, y, on, buffer)?;

        match (buffer, paint) {
            (Buffer::Shadow, _) => Ok(()),
            (Buffer::Live, false) => {
                self.dirty[display] = true;
                Ok(())
            }
            (Buffer::Live, true) => {
                let column = self.framebuffer.column(display, x, Buffer::Live)?;
                self.write_nibbles(display, nibble_address(x, y), &[nibble_of(column, y)])
            }
        }
    }

    pub fn get_pixel(
        &self,
        display: usize,
        x: u8,
        y: u8,
        buffer: Buffer,
    ) -> Result<bool, Error<ERR>> {
        Ok(self.framebuffer.get_pixel(display, x, y, buffer)?)
    }

    /// Clear the framebuffer of one display, with `paint` the display RAM is cleared as well
    pub fn clear(&mut self, display: usize, buffer: Buffer, paint: bool) -> Result<(), Error<ERR>> {
        if paint && buffer == Buffer::Live {
            self.chip(display)?;
        }
        self.framebuffer.clear(display, buffer)?;
        if buffer == Buffer::Live {
            self.dirty[display] = true;
            if paint {
                self.push(display)?;
            }
        }
        Ok(())
    }

    /// Clear the framebuffer of all displays.
    ///
    /// With `paint` all configured displays are selected at once and get their RAM cleared in
    /// a single transfer.
    pub fn clear_all(&mut self, buffer: Buffer, paint: bool) -> Result<(), Error<ERR>> {
        self.framebuffer.clear_all(buffer)?;
        if buffer != Buffer::Live {
            return Ok(());
        }
        self.dirty = [true; N];
        if paint {
            self.broadcast(|bus| {
                bus.write_id(ModeId::Write)?;
                bus.write_address(0)?;
                for _ in 0..NIBBLES {
                    bus.write_nibble(0)?;
                }
                Ok(())
            })?;
            for (dirty, chip) in self.dirty.iter_mut().zip(self.chips.iter()) {
                *dirty = chip.is_none();
            }
        }
        Ok(())
    }

    /// Copy the live framebuffer into the shadow buffer, if there is one
    pub fn copy_snapshot(&mut self) {
        self.framebuffer.copy_snapshot();
    }

    /// Scroll the live framebuffer of the whole chain one column to the left
    pub fn shift_left(&mut self) {
        self.framebuffer.shift_left();
        self.dirty = [true; N];
    }

    /// Scroll the live framebuffer of the whole chain one column to the right
    pub fn shift_right(&mut self) {
        self.framebuffer.shift_right();
        self.dirty = [true; N];
    }

    /// Give back the bus pins, the delay and the chip select pins of all configured displays
    pub fn release(self) -> (CLK, DATA, DELAY, [Option<CS>; N]) {
        let (clk, data, delay) = self.bus.release();
        (clk, data, delay, self.chips.map(|chip| chip.map(|chip| chip.cs)))
    }

    fn check(display: usize) -> Result<(), ConfigError> {
        if display < N {
            Ok(())
        } else {
            Err(ConfigError::DisplayOutOfRange { display, count: N })
        }
    }

    fn chip(&self, display: usize) -> Result<&Chip<CS>, ConfigError> {
        Self::check(display)?;
        self.chips[display].as_ref().ok_or(ConfigError::Unconfigured(display))
    }

    // Send the live framebuffer of one display, starting at RAM address 0
    fn push(&mut self, display: usize) -> Result<(), Error<ERR>> {
        let region = *self.framebuffer.region(display, Buffer::Live)?;
        self.transaction(display, |bus| {
            bus.write_id(ModeId::Write)?;
            bus.write_address(0)?;
            for byte in region.iter() {
                bus.write_byte(*byte)?;
            }
            Ok(())
        })?;
        self.dirty[display] = false;
        Ok(())
    }

    // Several commands behind a single command id
    fn write_commands(&mut self, display: usize, commands: &[Command]) -> Result<(), Error<ERR>> {
        self.transaction(display, |bus| {
            bus.write_id(ModeId::Command)?;
            for command in commands {
                bus.write_command(*command)?;
            }
            Ok(())
        })
    }

    // Select one display, let `f` talk to it, deselect it again.
    // The display is deselected even if `f` fails, the first error is returned.
    fn transaction<F>(&mut self, display: usize, f: F) -> Result<(), Error<ERR>>
    where
        F: FnOnce(&mut Bus<CLK, DATA, DELAY>) -> Result<(), ERR>,
    {
        Self::check(display)?;
        let chip = self.chips[display]
            .as_mut()
            .ok_or(ConfigError::Unconfigured(display))?;

        let result = select(&mut chip.cs).and_then(|_| f(&mut self.bus));
        let released = deselect(&mut chip.cs);
        Error::pin(result)?;
        Error::pin(released)
    }

    // Like transaction(), but with all configured displays selected at the same time
    fn broadcast<F>(&mut self, f: F) -> Result<(), Error<ERR>>
    where
        F: FnOnce(&mut Bus<CLK, DATA, DELAY>) -> Result<(), ERR>,
    {
        if self.chips.iter().all(Option::is_none) {
            return Ok(());
        }

        let mut result = Ok(());
        for chip in self.chips.iter_mut().flatten() {
            result = select(&mut chip.cs);
            if result.is_err() {
                break;
            }
        }
        let result = result.and_then(|_| f(&mut self.bus));

        let mut released = Ok(());
        for chip in self.chips.iter_mut().flatten() {
            let deselected = deselect(&mut chip.cs);
            if released.is_ok() {
                released = deselected;
            }
        }
        Error::pin(result)?;
        Error::pin(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitbang::NoDelay;
    use crate::testing::{Line, Transaction, Wire, WireFault, WirePin};
    use crate::BUFFER_SIZE;

    type TestDisplay<const N: usize> = MatrixDisplay<WirePin, WirePin, WirePin, NoDelay, N>;

    fn display<const N: usize>(wire: &Wire, shadow: bool) -> TestDisplay<N> {
        MatrixDisplay::new(
            wire.pin(Line::Clk),
            wire.pin(Line::Data),
            NoDelay {},
            Config::default().with_shadow(shadow),
        )
        .unwrap()
    }

    fn chain<const N: usize>(wire: &Wire, shadow: bool) -> TestDisplay<N> {
        let mut display = display::<N>(wire, shadow);
        for index in 0..N {
            let role = if index == 0 { Role::Master } else { Role::Slave };
            display.init_display(index, wire.pin(Line::Cs(index)), role).unwrap();
        }
        wire.reset();
        display
    }

    fn commands(transaction: &Transaction) -> Vec<u8> {
        let mut reader = transaction.reader();
        assert_eq!(reader.msb(3), 0b100);
        let mut bytes = Vec::new();
        while !reader.is_empty() {
            bytes.push(reader.msb(8));
            assert_eq!(reader.msb(1), 0);
        }
        bytes
    }

    fn ram_bytes(transaction: &Transaction) -> (u8, Vec<u8>) {
        let mut reader = transaction.reader();
        assert_eq!(reader.msb(3), 0b101);
        let address = reader.msb(7);
        let mut bytes = Vec::new();
        while !reader.is_empty() {
            bytes.push(reader.lsb(8));
        }
        (address, bytes)
    }

    #[test]
    fn zero_displays_is_rejected() {
        let wire = Wire::new();
        let result: Result<TestDisplay<0>, _> =
            MatrixDisplay::new(
                wire.pin(Line::Clk),
                wire.pin(Line::Data),
                NoDelay {},
                Config::default(),
            );
        assert_eq!(result.err(), Some(Error::Config(ConfigError::NoDisplays)));
    }

    #[test]
    fn init_sends_bring_up_then_clears() {
        let wire = Wire::new();
        let mut display = display::<1>(&wire, false);
        display.init_display(0, wire.pin(Line::Cs(0)), Role::Master).unwrap();

        let transactions = wire.transactions();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].chips, vec![0]);
        assert_eq!(commands(&transactions[0]), vec![0x00, 0x28, 0x14, 0x01, 0x03, 0x08, 0xAF]);

        let (address, bytes) = ram_bytes(&transactions[1]);
        assert_eq!(address, 0);
        assert_eq!(bytes, vec![0; BUFFER_SIZE]);

        assert!(display.is_configured(0));
        assert_eq!(display.role(0), Some(Role::Master));
        assert_eq!(display.brightness(0), Some(MAX_BRIGHTNESS));
        assert!(!wire.any_selected());
    }

    #[test]
    fn slave_gets_slave_mode() {
        let wire = Wire::new();
        let mut display = display::<2>(&wire, false);
        display.init_display(1, wire.pin(Line::Cs(1)), Role::Slave).unwrap();
        assert_eq!(commands(&wire.transactions()[0])[2], 0x10);
        assert!(!display.is_configured(0));
    }

    #[test]
    fn only_one_master() {
        let wire = Wire::new();
        let mut display = display::<2>(&wire, false);
        display.init_display(0, wire.pin(Line::Cs(0)), Role::Master).unwrap();
        assert_eq!(
            display.init_display(1, wire.pin(Line::Cs(1)), Role::Master),
            Err(Error::Config(ConfigError::DuplicateMaster { display: 1, master: 0 }))
        );
        assert!(!display.is_configured(1));

        // running the bring-up again for the master itself is fine
        display.init_display(0, wire.pin(Line::Cs(0)), Role::Master).unwrap();
    }

    #[test]
    fn unconfigured_display_is_an_error() {
        let wire = Wire::new();
        let mut display = display::<2>(&wire, false);
        assert_eq!(
            display.write_nibbles(0, 0, &[0xF]),
            Err(Error::Config(ConfigError::Unconfigured(0)))
        );
        assert_eq!(
            display.set_brightness(2, 3),
            Err(Error::Config(ConfigError::DisplayOutOfRange { display: 2, count: 2 }))
        );
        assert_eq!(
            display.set_pixel(1, 0, 0, true, Buffer::Live, true),
            Err(Error::Config(ConfigError::Unconfigured(1)))
        );
        assert!(wire.transactions().is_empty());
    }

    #[test]
    fn brightness_is_clamped() {
        let wire = Wire::new();
        let mut display = chain::<1>(&wire, false);

        display.set_brightness(0, 20).unwrap();
        display.set_brightness(0, 15).unwrap();
        display.set_brightness(0, 3).unwrap();

        let transactions = wire.transactions();
        assert_eq!(transactions[0], transactions[1]);
        assert_eq!(commands(&transactions[0]), vec![0xAF]);
        assert_eq!(commands(&transactions[2]), vec![0xA3]);
        assert_eq!(display.brightness(0), Some(3));
    }

    #[test]
    fn painting_a_pixel_writes_one_nibble() {
        let wire = Wire::new();
        let mut display = chain::<1>(&wire, false);

        display.set_pixel(0, 5, 3, true, Buffer::Live, true).unwrap();

        let transactions = wire.transactions();
        assert_eq!(transactions.len(), 1);
        let mut reader = transactions[0].reader();
        assert_eq!(reader.msb(3), 0b101);
        assert_eq!(reader.msb(7), 10);
        assert_eq!(reader.lsb(4), 0b1000);
        assert!(reader.is_empty());
        assert!(display.get_pixel(0, 5, 3, Buffer::Live).unwrap());
    }

    #[test]
    fn painting_the_lower_half_sends_the_high_nibble() {
        let wire = Wire::new();
        let mut display = chain::<1>(&wire, false);

        display.set_pixel(0, 2, 1, true, Buffer::Live, false).unwrap();
        display.set_pixel(0, 2, 6, true, Buffer::Live, true).unwrap();

        let transactions = wire.transactions();
        let mut reader = transactions[0].reader();
        reader.msb(3);
        assert_eq!(reader.msb(7), 5);
        assert_eq!(reader.lsb(4), 0b0100);
    }

    #[test]
    fn sync_streams_every_configured_display() {
        let wire = Wire::new();
        let mut display = chain::<2>(&wire, false);

        display.set_pixel(0, 0, 0, true, Buffer::Live, false).unwrap();
        display.set_pixel(1, 31, 7, true, Buffer::Live, false).unwrap();
        assert!(wire.transactions().is_empty());

        display.sync().unwrap();

        let transactions = wire.transactions();
        assert_eq!(transactions.len(), 2);
        for (index, transaction) in transactions.iter().enumerate() {
            assert_eq!(transaction.chips, vec![index]);
            let (address, bytes) = ram_bytes(transaction);
            assert_eq!(address, 0);
            assert_eq!(&bytes[..], &display.framebuffer().region(index, Buffer::Live).unwrap()[..]);
        }
        assert_eq!(ram_bytes(&transactions[0]).1[0], 0x01);
        assert_eq!(ram_bytes(&transactions[1]).1[31], 0x80);
        assert!(!display.is_dirty(0));
    }

    #[test]
    fn sync_skips_unconfigured_displays() {
        let wire = Wire::new();
        let mut display = display::<3>(&wire, false);
        display.init_display(1, wire.pin(Line::Cs(1)), Role::Master).unwrap();
        wire.reset();

        display.sync().unwrap();
        let transactions = wire.transactions();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].chips, vec![1]);
    }

    #[test]
    fn shadow_is_never_sent() {
        let wire = Wire::new();
        let mut display = chain::<1>(&wire, true);

        display.set_pixel(0, 4, 4, true, Buffer::Shadow, true).unwrap();
        assert!(wire.transactions().is_empty());
        assert!(display.get_pixel(0, 4, 4, Buffer::Shadow).unwrap());
        assert!(!display.get_pixel(0, 4, 4, Buffer::Live).unwrap());
        assert!(!display.is_dirty(0));

        display.sync().unwrap();
        assert_eq!(ram_bytes(&wire.transactions()[0]).1, vec![0; BUFFER_SIZE]);
    }

    #[test]
    fn shadow_without_allocation_is_an_error() {
        let wire = Wire::new();
        let mut display = chain::<1>(&wire, false);
        assert_eq!(
            display.set_pixel(0, 0, 0, true, Buffer::Shadow, false),
            Err(Error::Config(ConfigError::NoShadowBuffer))
        );
    }

    #[test]
    fn flush_only_sends_changed_displays() {
        let wire = Wire::new();
        let mut display = chain::<2>(&wire, false);

        display.set_pixel(1, 3, 3, true, Buffer::Live, false).unwrap();
        display.flush().unwrap();
        display.flush().unwrap();

        let transactions = wire.transactions();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].chips, vec![1]);
    }

    #[test]
    fn clear_with_paint_sends_one_display() {
        let wire = Wire::new();
        let mut display = chain::<2>(&wire, false);
        display.set_pixel(0, 1, 1, true, Buffer::Live, false).unwrap();
        display.set_pixel(1, 1, 1, true, Buffer::Live, false).unwrap();

        display.clear(1, Buffer::Live, true).unwrap();

        let transactions = wire.transactions();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].chips, vec![1]);
        assert_eq!(ram_bytes(&transactions[0]).1, vec![0; BUFFER_SIZE]);
        assert!(display.get_pixel(0, 1, 1, Buffer::Live).unwrap());
    }

    #[test]
    fn failed_painted_clear_keeps_the_framebuffer() {
        let wire = Wire::new();
        let mut display = display::<2>(&wire, false);
        display.set_pixel(1, 4, 4, true, Buffer::Live, false).unwrap();
        display.flush().unwrap();
        let dirty = display.is_dirty(1);

        assert_eq!(
            display.clear(1, Buffer::Live, true),
            Err(Error::Config(ConfigError::Unconfigured(1)))
        );
        assert!(display.get_pixel(1, 4, 4, Buffer::Live).unwrap());
        assert_eq!(display.is_dirty(1), dirty);
        assert!(wire.transactions().is_empty());
    }

    #[test]
    fn clear_all_with_paint_selects_all_displays_at_once() {
        let wire = Wire::new();
        let mut display = chain::<3>(&wire, false);
        display.set_pixel(2, 9, 2, true, Buffer::Live, false).unwrap();

        display.clear_all(Buffer::Live, true).unwrap();

        let transactions = wire.transactions();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].chips, vec![0, 1, 2]);
        let mut reader = transactions[0].reader();
        assert_eq!(reader.msb(3), 0b101);
        assert_eq!(reader.msb(7), 0);
        assert_eq!(reader.remaining(), NIBBLES * 4);
        assert!(transactions[0].bits[10..].iter().all(|bit| !bit));
        assert!(!display.get_pixel(2, 9, 2, Buffer::Live).unwrap());
        assert!(!display.is_dirty(2));
    }

    #[test]
    fn clear_all_shadow_sends_nothing() {
        let wire = Wire::new();
        let mut display = chain::<2>(&wire, true);
        display.set_pixel(0, 1, 1, true, Buffer::Shadow, false).unwrap();
        display.clear_all(Buffer::Shadow, true).unwrap();
        assert!(wire.transactions().is_empty());
        assert!(!display.get_pixel(0, 1, 1, Buffer::Shadow).unwrap());
    }

    #[test]
    fn chip_is_released_when_the_bus_fails() {
        let wire = Wire::new();
        let mut display = chain::<2>(&wire, false);
        wire.break_line(Line::Data);

        assert_eq!(
            display.set_pixel(0, 0, 0, true, Buffer::Live, true),
            Err(Error::Pin(WireFault))
        );
        assert_eq!(display.sync(), Err(Error::Pin(WireFault)));
        assert_eq!(display.clear_all(Buffer::Live, true), Err(Error::Pin(WireFault)));
        assert!(!wire.any_selected());
        assert!(wire.deselected().contains(&1));
    }

    #[test]
    fn led_blink_and_power_commands() {
        let wire = Wire::new();
        let mut display = chain::<1>(&wire, false);
        display.set_led(0, false).unwrap();
        display.set_blink(0, true).unwrap();
        display.set_enabled(0, false).unwrap();
        display.set_enabled(0, true).unwrap();

        let sent: Vec<Vec<u8>> = wire.transactions().iter().map(commands).collect();
        assert_eq!(sent, vec![vec![0x02], vec![0x09], vec![0x00], vec![0x01]]);
    }

    #[test]
    fn shifting_marks_everything_dirty() {
        let wire = Wire::new();
        let mut display = chain::<2>(&wire, false);
        display.set_pixel(0, 31, 0, true, Buffer::Live, false).unwrap();
        display.sync().unwrap();

        display.shift_right();
        assert!(display.is_dirty(0) && display.is_dirty(1));
        assert!(display.get_pixel(1, 0, 0, Buffer::Live).unwrap());

        display.shift_left();
        assert!(display.get_pixel(0, 31, 0, Buffer::Live).unwrap());
    }

    #[test]
    fn release_hands_back_the_pins() {
        let wire = Wire::new();
        let display = chain::<2>(&wire, false);
        let (_clk, _data, _delay, chips) = display.release();
        assert!(chips.iter().all(Option::is_some));
    }
}
