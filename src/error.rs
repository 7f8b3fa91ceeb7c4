use core::fmt;

/// Errors reported by the driver.
///
/// None of these come from the display itself: the R/W line is grounded, so
/// nothing is ever read back. They only describe arguments the driver refused
/// to put on the bus.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// Column is not in `0..16`
    ColumnOutOfRange(u8),
    /// Row is not in `0..2`
    RowOutOfRange(u8),
    /// Custom glyph slot is not in `0..8`
    GlyphIndexOutOfRange(u8),
    /// RS, Enable or a data line resolve to the same output bit
    PinConflict,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ColumnOutOfRange(col) => write!(f, "column {} out of range", col),
            Error::RowOutOfRange(row) => write!(f, "row {} out of range", row),
            Error::GlyphIndexOutOfRange(index) => write!(f, "glyph index {} out of range", index),
            Error::PinConflict => f.write_str("pins share an output line"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::ColumnOutOfRange(col) => defmt::write!(fmt, "Column {} out of range", col),
            Error::RowOutOfRange(row) => defmt::write!(fmt, "Row {} out of range", row),
            Error::GlyphIndexOutOfRange(index) => {
                defmt::write!(fmt, "Glyph index {} out of range", index)
            }
            Error::PinConflict => defmt::write!(fmt, "Pins share an output line"),
        }
    }
}

/// Shorthand used across the crate.
pub type Result<T> = core::result::Result<T, Error>;
