//! Error types of the driver.
//!
//! Pin errors come straight from the `embedded_hal` pins and are handed back untouched.
//! Everything else is a configuration problem: a display index that does not exist, a display
//! that was never initialized, or a shadow buffer that was not requested.

/// Mistakes in how the chain of displays is set up or addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// the driver was created for zero displays
    NoDisplays,
    /// the display index is not smaller than the number of displays
    DisplayOutOfRange { display: usize, count: usize },
    /// the display was never set up with `init_display`
    Unconfigured(usize),
    /// the shadow buffer was used but not requested in the `Config`
    NoShadowBuffer,
    /// a chain has exactly one master, `master` already is
    DuplicateMaster { display: usize, master: usize },
}

/// Error returned by every operation that touches the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<PinErr> {
    /// setting an output pin failed
    Pin(PinErr),
    /// see [`ConfigError`]
    Config(ConfigError),
}

impl<PinErr> Error<PinErr> {
    /// Maps the result of a pin operation into the driver's error type
    pub fn pin<T>(result: Result<T, PinErr>) -> Result<T, Error<PinErr>> {
        result.map_err(Error::Pin)
    }
}

impl<PinErr> From<ConfigError> for Error<PinErr> {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NoDisplays => write!(f, "at least one display is required"),
            ConfigError::DisplayOutOfRange { display, count } => {
                write!(f, "display {} does not exist, there are {}", display, count)
            }
            ConfigError::Unconfigured(display) => {
                write!(f, "display {} is not initialized", display)
            }
            ConfigError::NoShadowBuffer => write!(f, "no shadow buffer was allocated"),
            ConfigError::DuplicateMaster { display, master } => write!(
                f,
                "display {} can't be master, display {} already is",
                display, master
            ),
        }
    }
}
