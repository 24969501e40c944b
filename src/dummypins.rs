//! # A "fake" output pin
//!
//! Useful when the driver should run without hardware attached, for example to render into the
//! framebuffer on a host and inspect the result, or when a module's chip select line is tied low
//! on the board and there is no GPIO left to hand to `init_display()`.
//!
//! Writes to a [`DummyOutputPin`] always succeed and do nothing.

use hal::digital::v2::OutputPin;

/// provides a dummy OutputPin.
///
/// Clock, data and chip select of a [`MatrixDisplay`](crate::MatrixDisplay) can all be dummies,
/// its error type is then `Infallible`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyOutputPin;

impl OutputPin for DummyOutputPin {
    type Error = core::convert::Infallible;
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
