//! [`embedded_graphics_core`] support, the whole chain of displays is one `DrawTarget`
//!
//! Drawing only touches the live framebuffer, call [`Toolbox::sync`] to make it visible.
use embedded_graphics_core::{pixelcolor::BinaryColor, prelude::*};
use hal::blocking::delay::DelayUs;
use hal::digital::v2::OutputPin;

use crate::{error::Error, toolbox::Toolbox};

impl<'a, CLK, DATA, CS, DELAY, ERR, const N: usize> DrawTarget
    for Toolbox<'a, CLK, DATA, CS, DELAY, N>
where
    CLK: OutputPin<Error = ERR>,
    DATA: OutputPin<Error = ERR>,
    CS: OutputPin<Error = ERR>,
    DELAY: DelayUs<u8>,
{
    type Error = Error<ERR>;
    type Color = BinaryColor;

    fn clear(&mut self, color: BinaryColor) -> Result<(), Self::Error> {
        Toolbox::clear(self, false)?;
        if color.is_on() {
            let right = self.width() as i32 - 1;
            for row in 0..self.height() as i32 {
                self.draw_line(0, row, right, row, true)?;
            }
        }
        Ok(())
    }

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            // out of bounds pixels are dropped by set_pixel
            self.set_pixel(coord.x, coord.y, color.is_on(), false)?;
        }
        Ok(())
    }
}

impl<'a, CLK, DATA, CS, DELAY, ERR, const N: usize> OriginDimensions
    for Toolbox<'a, CLK, DATA, CS, DELAY, N>
where
    CLK: OutputPin<Error = ERR>,
    DATA: OutputPin<Error = ERR>,
    CS: OutputPin<Error = ERR>,
    DELAY: DelayUs<u8>,
{
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}
