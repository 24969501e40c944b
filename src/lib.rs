//! # Driver for chained HT1632 LED matrix displays
//!
//! The HT1632 is the controller found on the common 32x8 "0832" LED dot matrix modules. Several
//! of these modules can share one clock and one data line, every module gets its own chip select
//! line. This crate bit-bangs the HT1632 serial protocol over plain `embedded_hal` output pins.
//!
//! The driver keeps an in-memory framebuffer with exactly the layout of the HT1632 display RAM,
//! so pushing it out is a straight byte stream. Pixels can either be written to the framebuffer
//! and pushed in one go with [`MatrixDisplay::sync`], or "painted" to the hardware one at a time.
//!
//! Typically you want to look into the following:
//!  - [`MatrixDisplay::new`] to create a driver instance for `N` chained displays
//!  - [`MatrixDisplay::init_display`] once per display with its chip select pin
//!  - [`Toolbox`] to draw on all displays as if they were one wide display
//!
//! ```ignore
//! let mut display: MatrixDisplay<_, _, _, _, 2> =
//!     MatrixDisplay::new(clk, data, NoDelay {}, Config::default())?;
//! display.init_display(0, cs0, Role::Master)?;
//! display.init_display(1, cs1, Role::Slave)?;
//!
//! let mut toolbox = Toolbox::new(&mut display);
//! toolbox.draw_circle(32, 4, 3, true)?;
//! toolbox.sync()?;
//! ```
#![cfg_attr(not(test), no_std)]

extern crate embedded_hal as hal;

// must come first, the logging macros are used by the modules below
#[macro_use]
mod fmt;

pub mod bitbang;
pub mod display;
pub mod dummypins;
pub mod error;
pub mod framebuffer;
pub mod instructions;
pub mod toolbox;

#[cfg(feature = "graphics")]
pub mod drawtarget;

#[cfg(test)]
mod testing;

/// width of a single display in pixels (columns)
pub const WIDTH: u8 = 32;
/// height of a single display in pixels (rows)
pub const HEIGHT: u8 = 8;
/// bytes of framebuffer per display, one byte per column
pub const BUFFER_SIZE: usize = WIDTH as usize;
/// number of 4 bit cells in the HT1632 display RAM that are used in 32x8 mode
pub const NIBBLES: usize = BUFFER_SIZE * 2;
/// highest brightness (PWM duty) level of the HT1632
pub const MAX_BRIGHTNESS: u8 = 15;

pub use crate::{
    bitbang::{BitBangBus, NoDelay},
    display::{Config, MatrixDisplay},
    error::{ConfigError, Error},
    framebuffer::{Buffer, Framebuffer},
    instructions::Role,
    toolbox::{Fill, Toolbox},
};
