//! In-memory framebuffer for a chain of HT1632 displays
//!
//! Every display owns a region of `BUFFER_SIZE` bytes, one byte per column. Bit `n` of a byte is
//! row `n` of that column, row 0 being the top row. This is exactly how the HT1632 display RAM
//! is laid out in 32x8 mode: the RAM consists of 4 bit cells, the low nibble of a column byte is
//! cell `2 * column` (rows 0..4), the high nibble cell `2 * column + 1` (rows 4..8). So a region
//! can be streamed to the display byte by byte without any conversion.
//!
//! Optionally a second "shadow" buffer with the same layout is kept. It is meant as a read-only
//! snapshot of a previous state (for example the last generation of a cellular automaton) and is
//! never sent to a display.

use crate::{error::ConfigError, BUFFER_SIZE, HEIGHT, WIDTH};

/// Selects which of the two buffers an operation works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Buffer {
    /// the buffer that is sent to the displays
    #[default]
    Live,
    /// the snapshot buffer, only present if requested at construction
    Shadow,
}

type Region = [u8; BUFFER_SIZE];

/// Byte of a display region holding column `x`. Columns past the display width wrap around.
#[inline]
pub fn column_index(x: u8) -> usize {
    (x & (WIDTH - 1)) as usize
}

/// Bit inside a column byte holding row `y`. Rows past the display height wrap around.
#[inline]
pub fn row_mask(y: u8) -> u8 {
    1 << (y % HEIGHT)
}

/// Address of the HT1632 RAM cell ("nibble") holding the pixel at `x`, `y`.
///
/// Must stay consistent with [`column_index`] and [`row_mask`]: the cell covers the low nibble of
/// the column byte for the upper half of the rows and the high nibble for the lower half.
#[inline]
pub fn nibble_address(x: u8, y: u8) -> u8 {
    let column = column_index(x) as u8;
    (column << 1) | ((y % HEIGHT) >= HEIGHT / 2) as u8
}

/// The 4 bit value of the RAM cell holding row `y`, taken from its column byte.
#[inline]
pub fn nibble_of(column: u8, y: u8) -> u8 {
    if (y % HEIGHT) >= HEIGHT / 2 {
        column >> 4
    } else {
        column & 0x0F
    }
}

/// Framebuffer for `N` displays, plus an optional shadow copy
#[derive(Debug, Clone)]
pub struct Framebuffer<const N: usize> {
    live: [Region; N],
    shadow: Option<[Region; N]>,
}

impl<const N: usize> Framebuffer<N> {
    /// Create a zeroed framebuffer, with a shadow buffer if `shadow` is set
    pub fn new(shadow: bool) -> Result<Framebuffer<N>, ConfigError> {
        if N == 0 {
            return Err(ConfigError::NoDisplays);
        }
        Ok(Framebuffer {
            live: [[0; BUFFER_SIZE]; N],
            shadow: if shadow { Some([[0; BUFFER_SIZE]; N]) } else { None },
        })
    }

    pub fn display_count(&self) -> usize {
        N
    }

    pub fn has_shadow(&self) -> bool {
        self.shadow.is_some()
    }

    fn check(display: usize) -> Result<(), ConfigError> {
        if display < N {
            Ok(())
        } else {
            Err(ConfigError::DisplayOutOfRange { display, count: N })
        }
    }

    fn regions(&self, buffer: Buffer) -> Result<&[Region; N], ConfigError> {
        match buffer {
            Buffer::Live => Ok(&self.live),
            Buffer::Shadow => self.shadow.as_ref().ok_or(ConfigError::NoShadowBuffer),
        }
    }

    fn regions_mut(&mut self, buffer: Buffer) -> Result<&mut [Region; N], ConfigError> {
        match buffer {
            Buffer::Live => Ok(&mut self.live),
            Buffer::Shadow => self.shadow.as_mut().ok_or(ConfigError::NoShadowBuffer),
        }
    }

    /// The bytes of one display, as they are sent to it
    pub fn region(
        &self,
        display: usize,
        buffer: Buffer,
    ) -> Result<&[u8; BUFFER_SIZE], ConfigError> {
        Self::check(display)?;
        Ok(&self.regions(buffer)?[display])
    }

    /// All displays back to back, display 0 first
    pub fn live(&self) -> &[u8] {
        self.live.as_flattened()
    }

    /// Set or clear a single pixel, `x` and `y` are coordinates on the display
    pub fn set_pixel(
        &mut self,
        display: usize,
        x: u8,
        y: u8,
        on: bool,
        buffer: Buffer,
    ) -> Result<(), ConfigError> {
        Self::check(display)?;
        let byte = &mut self.regions_mut(buffer)?[display][column_index(x)];
        if on {
            *byte |= row_mask(y);
        } else {
            *byte &= !row_mask(y);
        }
        Ok(())
    }

    pub fn get_pixel(
        &self,
        display: usize,
        x: u8,
        y: u8,
        buffer: Buffer,
    ) -> Result<bool, ConfigError> {
        Self::check(display)?;
        let byte = self.regions(buffer)?[display][column_index(x)];
        Ok(byte & row_mask(y) != 0)
    }

    /// The byte holding column `x` of a display
    pub fn column(&self, display: usize, x: u8, buffer: Buffer) -> Result<u8, ConfigError> {
        Self::check(display)?;
        Ok(self.regions(buffer)?[display][column_index(x)])
    }

    /// Zero the region of one display
    pub fn clear(&mut self, display: usize, buffer: Buffer) -> Result<(), ConfigError> {
        Self::check(display)?;
        self.regions_mut(buffer)?[display] = [0; BUFFER_SIZE];
        Ok(())
    }

    /// Zero the regions of all displays
    pub fn clear_all(&mut self, buffer: Buffer) -> Result<(), ConfigError> {
        *self.regions_mut(buffer)? = [[0; BUFFER_SIZE]; N];
        Ok(())
    }

    /// Take a snapshot of the live buffer into the shadow buffer.
    ///
    /// Does nothing if there is no shadow buffer.
    pub fn copy_snapshot(&mut self) {
        if let Some(shadow) = self.shadow.as_mut() {
            *shadow = self.live;
        }
    }

    /// Move every column of the live buffer one to the left, across display borders.
    ///
    /// The first column falls off, the last column of the last display is cleared.
    /// Every call moves by exactly one column (one byte), call it twice to move two.
    pub fn shift_left(&mut self) {
        let bytes = self.live.as_flattened_mut();
        bytes.copy_within(1.., 0);
        if let Some(last) = bytes.last_mut() {
            *last = 0;
        }
    }

    /// Move every column of the live buffer one to the right, across display borders.
    ///
    /// The last column falls off, the first column of the first display is cleared.
    /// Every call moves by exactly one column (one byte), call it twice to move two.
    pub fn shift_right(&mut self) {
        let bytes = self.live.as_flattened_mut();
        let len = bytes.len();
        bytes.copy_within(..len - 1, 1);
        bytes[0] = 0;
    }
}
