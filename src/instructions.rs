//! # Module defining the instruction set of the HT1632
//!
//! All commands are implemented as enums and most arguments as well.
//! The source code is written to resemble the data sheet as close as possible.
//!
//! Every transfer to the HT1632 starts with a three bit mode id, sent most significant bit first.
//! What follows depends on the id:
//!
//! ## Command mode (id `100`)
//! A sequence of 9 bit commands: 8 command bits, most significant bit first, and a trailing
//! "don't care" bit. As long as chip select stays low, more commands may follow without sending
//! the id again. The bring-up of a display is sent this way.
//!
//! ## Write mode (id `101`)
//! A 7 bit RAM address, most significant bit first, followed by 4 bit data cells ("nibbles"),
//! least significant bit first. The address increments after every nibble, so a whole display can
//! be written with a single address and a stream of data.
//!
//! ## Read mode (id `110`)
//! Reading the display RAM needs a bidirectional data line. This driver only drives outputs and
//! never reads, the in-memory framebuffer is the source of truth.
//!
//! ## Commons option
//! The HT1632 drives either 32x8 or 24x16 LEDs, with N-MOS or P-MOS common drivers. The 0832
//! modules this driver is made for are wired as 32 rows x 8 commons with P-MOS drivers.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
/// Mode id sent at the start of every transfer.
pub enum ModeId {
    /// read display RAM
    Read = 0b110,
    /// write display RAM
    Write = 0b101,
    /// write commands
    Command = 0b100,
}

impl ModeId {
    /// number of bits of a mode id on the wire
    pub const BITS: u8 = 3;

    pub fn bits(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
/// Commons options, how the LED matrix is wired to the chip.
pub enum CommonsOption {
    /// 32 rows x 8 commons, N-MOS open drain
    NMos8Common = 0b00,
    /// 24 rows x 16 commons, N-MOS open drain
    NMos16Common = 0b01,
    /// 32 rows x 8 commons, P-MOS open drain
    PMos8Common = 0b10,
    /// 24 rows x 16 commons, P-MOS open drain
    PMos16Common = 0b11,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Role of a display in the chain.
///
/// Exactly one HT1632 generates the clock and common sync signals (master), all others follow
/// it (slave).
pub enum Role {
    /// uses the on-chip RC oscillator and drives the sync line
    Master,
    /// takes clock and sync from the master
    Slave,
}

/// HT1632 command set, see data sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// turn off system oscillator and LED duty cycle generator
    // translates to: 0x00
    SystemDisable,

    /// turn on system oscillator
    // translates to: 0x01
    SystemEnable,

    /// turn off LED duty cycle generator
    // translates to: 0x02
    LedOff,

    /// turn on LED duty cycle generator
    // translates to: 0x03
    LedOn,

    /// turn off blinking function
    // translates to: 0x08
    BlinkOff,

    /// turn on blinking function
    // translates to: 0x09
    BlinkOn,

    /// slave mode, clock source from external clock
    // translates to: 0x10
    SlaveMode,

    /// master mode, clock source from on-chip RC oscillator
    // translates to: 0x14
    MasterMode,

    /// master mode, clock source from an external clock
    // translates to: 0x1C
    ExternalClock,

    /// select the commons option
    // translates to: 0x20 OR with two bit CommonsOption shifted by two
    Commons(CommonsOption),

    /// set the PWM duty, 16 levels
    // translates to: 0xA0 OR with 0 <= level <= 15
    Pwm(u8),
}

use Command::*;

// Use full binary presentation instead of hex, to look the same as data sheet
impl Command {
    /// number of bits of a command on the wire, including the trailing "don't care" bit
    pub const BITS: u8 = 9;

    /// Returns the specific command as a byte (u8), without the trailing "don't care" bit
    ///
    /// The PWM level is capped at 15, higher values would overflow into the command bits.
    pub fn byte(self) -> u8 {
        match self {
            SystemDisable => 0b0000_0000,
            SystemEnable => 0b0000_0001,
            LedOff => 0b0000_0010,
            LedOn => 0b0000_0011,
            BlinkOff => 0b0000_1000,
            BlinkOn => 0b0000_1001,
            SlaveMode => 0b0001_0000,
            MasterMode => 0b0001_0100,
            ExternalClock => 0b0001_1100,
            Commons(option) => 0b0010_0000 | ((option as u8) << 2),
            Pwm(level) => 0b1010_0000 | level.min(crate::MAX_BRIGHTNESS),
        }
    }

    /// The mode command for a role in the chain
    pub fn mode(role: Role) -> Command {
        match role {
            Role::Master => MasterMode,
            Role::Slave => SlaveMode,
        }
    }
}

/// Commands sent to every display when it is initialized, in this order
pub fn bring_up_sequence(role: Role) -> [Command; 7] {
    [
        SystemDisable,
        Commons(CommonsOption::PMos8Common),
        Command::mode(role),
        SystemEnable,
        LedOn,
        BlinkOff,
        Pwm(crate::MAX_BRIGHTNESS),
    ]
}

/// A prelude for convenience, it pulls all enums into scope.
pub mod prelude {
    pub use super::{
        bring_up_sequence, Command, Command::*, CommonsOption, ModeId, Role,
    };
}
