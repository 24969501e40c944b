//! Drawing on a chain of displays as if it were one wide display
//!
//! The displays are expected side by side, display 0 on the left. Virtual column `x` belongs to
//! display `x / 32`, where it is column `x % 32`. Rows are shared by all displays.
//!
//! Everything outside of the virtual display is clipped: pixels there are silently dropped on
//! write and read back as off. That makes it possible to draw shapes that only partially fit.
//!
//! The typical workflow for (animated) graphics is:
//!  - clear the framebuffer with Toolbox.clear()
//!  - draw "stuff" into the framebuffer (lines, circles, rectangles)
//!  - Toolbox.sync() the framebuffer to the displays, it now gets visible
//!  - rinse and repeat
use core::ops::RangeInclusive;

use hal::blocking::delay::DelayUs;
use hal::digital::v2::OutputPin;

use crate::{
    display::MatrixDisplay,
    error::Error,
    framebuffer::Buffer,
    HEIGHT, WIDTH,
};

/// Whether a rectangle is only outlined or filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fill {
    #[default]
    Outline,
    Solid,
}

/// Map a virtual column to `(display, column on that display)`.
///
/// Returns `None` for columns left of display 0 or right of the last display.
pub fn resolve_x(x: i32, display_count: usize) -> Option<(usize, u8)> {
    if x < 0 {
        return None;
    }
    let display = (x / WIDTH as i32) as usize;
    if display >= display_count {
        return None;
    }
    Some((display, (x % WIDTH as i32) as u8))
}

fn resolve_y(y: i32) -> Option<u8> {
    if (0..HEIGHT as i32).contains(&y) {
        Some(y as u8)
    } else {
        None
    }
}

// Steps `i` in `0..=len` for which `start + step * i` lies in `0..limit`, `step` is 1 or -1
fn visible_steps(start: i64, step: i64, len: i64, limit: i64) -> RangeInclusive<i64> {
    if step > 0 {
        (-start).max(0)..=len.min(limit - 1 - start)
    } else {
        (start - (limit - 1)).max(0)..=len.min(start)
    }
}

// How far Bresenham's walk got on the minor axis after `i` steps on the major axis.
// The error term starts at `major / 2` and gains `minor` per step.
fn minor_offset(i: i64, major: i64, minor: i64) -> i64 {
    if major == 0 {
        return 0;
    }
    ((i128::from(major / 2) + i128::from(i) * i128::from(minor)) / i128::from(major)) as i64
}

/// Draws on all displays of a [`MatrixDisplay`] through one coordinate space
pub struct Toolbox<'a, CLK, DATA, CS, DELAY, const N: usize> {
    display: &'a mut MatrixDisplay<CLK, DATA, CS, DELAY, N>,
}

impl<'a, CLK, DATA, CS, DELAY, ERR, const N: usize> Toolbox<'a, CLK, DATA, CS, DELAY, N>
where
    CLK: OutputPin<Error = ERR>,
    DATA: OutputPin<Error = ERR>,
    CS: OutputPin<Error = ERR>,
    DELAY: DelayUs<u8>,
{
    pub fn new(display: &'a mut MatrixDisplay<CLK, DATA, CS, DELAY, N>) -> Self {
        Toolbox { display }
    }

    /// The driver underneath, for per display settings and the shadow buffer
    pub fn display(&mut self) -> &mut MatrixDisplay<CLK, DATA, CS, DELAY, N> {
        self.display
    }

    /// width of the virtual display, all displays together
    pub fn width(&self) -> u32 {
        WIDTH as u32 * N as u32
    }

    pub fn height(&self) -> u32 {
        HEIGHT as u32
    }

    /// Set a pixel in virtual coordinates.
    ///
    /// With `paint` the pixel is sent to its display right away instead of waiting for a sync.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool, paint: bool) -> Result<(), Error<ERR>> {
        match (resolve_x(x, N), resolve_y(y)) {
            (Some((display, x)), Some(y)) => {
                self.display.set_pixel(display, x, y, on, Buffer::Live, paint)
            }
            _ => Ok(()),
        }
    }

    /// Read a pixel in virtual coordinates, from the live or the shadow buffer
    pub fn get_pixel(&self, x: i32, y: i32, buffer: Buffer) -> Result<bool, Error<ERR>> {
        match (resolve_x(x, N), resolve_y(y)) {
            (Some((display, x)), Some(y)) => self.display.get_pixel(display, x, y, buffer),
            _ => Ok(false),
        }
    }

    /// Draw a line from `(x1, y1)` to `(x2, y2)`, both ends included.
    ///
    /// The same pixels are drawn no matter which end is given first. Only the part of the line
    /// that crosses the virtual display is walked, so far away ends cost nothing extra.
    pub fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        on: bool,
    ) -> Result<(), Error<ERR>> {
        self.line(
            (i64::from(x1), i64::from(y1)),
            (i64::from(x2), i64::from(y2)),
            on,
        )
    }

    /// Draw the outline of a circle around `(x, y)`, using the midpoint circle algorithm
    pub fn draw_circle(&mut self, x: i32, y: i32, radius: u16, on: bool) -> Result<(), Error<ERR>> {
        let (x, y) = (i64::from(x), i64::from(y));
        let mut x_off: i64 = 0;
        let mut y_off = i64::from(radius);
        let mut balance = -y_off;

        while x_off <= y_off {
            self.plot(x + x_off, y + y_off, on)?;
            self.plot(x - x_off, y + y_off, on)?;
            self.plot(x - x_off, y - y_off, on)?;
            self.plot(x + x_off, y - y_off, on)?;
            self.plot(x + y_off, y + x_off, on)?;
            self.plot(x - y_off, y + x_off, on)?;
            self.plot(x - y_off, y - x_off, on)?;
            self.plot(x + y_off, y - x_off, on)?;

            balance += 2 * x_off + 1;
            x_off += 1;
            if balance >= 0 {
                y_off -= 1;
                balance -= 2 * y_off;
            }
        }
        Ok(())
    }

    /// Draw a rectangle from `(x, y)` to `(x + width, y + height)`, all corners included.
    ///
    /// A zero `width` or `height` degenerates into a line, both zero into a single pixel.
    pub fn draw_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: u16,
        height: u16,
        on: bool,
        fill: Fill,
    ) -> Result<(), Error<ERR>> {
        let (left, top) = (i64::from(x), i64::from(y));
        let right = left + i64::from(width);
        let bottom = top + i64::from(height);

        match fill {
            Fill::Outline => {
                self.line((left, top), (left, bottom), on)?;
                self.line((right, top), (right, bottom), on)?;
                self.line((left, top), (right, top), on)?;
                self.line((left, bottom), (right, bottom), on)
            }
            Fill::Solid => {
                for row in top.max(0)..=bottom.min(i64::from(HEIGHT) - 1) {
                    self.line((left, row), (right, row), on)?;
                }
                Ok(())
            }
        }
    }

    // Everything that does not fit the virtual display is dropped
    fn plot(&mut self, x: i64, y: i64, on: bool) -> Result<(), Error<ERR>> {
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(x), Ok(y)) => self.set_pixel(x, y, on, false),
            _ => Ok(()),
        }
    }

    // Bresenham's line algorithm
    fn line(&mut self, from: (i64, i64), to: (i64, i64), on: bool) -> Result<(), Error<ERR>> {
        // always walk from the smaller end, rounding would differ between the two directions
        let (from, to) = if to < from { (to, from) } else { (from, to) };

        let dx = to.0 - from.0;
        let dy = (to.1 - from.1).abs();
        let step_y = if to.1 >= from.1 { 1 } else { -1 };

        if dx >= dy {
            // at least one x value for every y value
            for i in visible_steps(from.0, 1, dx, i64::from(self.width())) {
                let y = from.1 + step_y * minor_offset(i, dx, dy);
                self.plot(from.0 + i, y, on)?;
            }
        } else {
            for i in visible_steps(from.1, step_y, dy, i64::from(HEIGHT)) {
                let x = from.0 + minor_offset(i, dy, dx);
                self.plot(x, from.1 + step_y * i, on)?;
            }
        }
        Ok(())
    }

    /// Set the same brightness on every configured display, capped at 15
    pub fn set_brightness(&mut self, pwm: u8) -> Result<(), Error<ERR>> {
        for display in 0..N {
            if self.display.is_configured(display) {
                self.display.set_brightness(display, pwm)?;
            }
        }
        Ok(())
    }

    /// Clear the live framebuffer, with `paint` the displays get cleared as well
    pub fn clear(&mut self, paint: bool) -> Result<(), Error<ERR>> {
        self.display.clear_all(Buffer::Live, paint)
    }

    /// Send the framebuffer to all displays
    pub fn sync(&mut self) -> Result<(), Error<ERR>> {
        self.display.sync()
    }
}
