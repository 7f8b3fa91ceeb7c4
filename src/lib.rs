#![no_std]
//! Driver to write characters to 16x2 HD44780 LCD displays wired straight to
//! GPIO lines, with either a 4-bit (DB4-DB7) or 8-bit (DB0-DB7) data bus.
//! The R/W line must be tied to ground: the driver only ever writes, so every
//! instruction is followed by a fixed worst-case wait instead of a busy-flag
//! poll.
//!
//! Register access goes through [`Registers`] and waits through
//! [`embedded_hal::blocking::delay::DelayUs`] /
//! [`embedded_hal::blocking::delay::DelayMs`]. [`Timer`] provides the latter
//! on top of the Cortex-M SysTick counter, which it takes over completely.
//!
//! Usage:
//! ```ignore
//! // TM4C123 at 50 MHz: RS on PA2, Enable on PA3, DB4-DB7 on PB0-PB3.
//! // All of these must already be configured as digital outputs.
//! let timer = Timer::new(unsafe { Mmio::new() });
//!
//! let mut lcd = LcdUninit::from_pins(unsafe { Mmio::new() }, timer, Pin::PA2, Pin::PA3, Port::B)
//!     .interface(Interface::FourBit)
//!     .init()
//!     .unwrap();
//!
//! lcd.create_glyph(0, &[0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00]).unwrap();
//!
//! loop {
//!     // Write without ufmt
//!     _ = lcd.clear();
//!     _ = lcd.print("hello");
//!     _ = lcd.set_cursor(0, 1);
//!     _ = lcd.write_char(0);
//!
//!     // Delay half second
//!     for _ in 0..2 {
//!         lcd.delay_ms(250);
//!     }
//!
//!     // Write with ufmt
//!     _ = lcd.home();
//!     _ = uwrite!(lcd, "ufmt {}", 42u8);
//! }
//! ```
//! Datasheet used link [here](https://www.sparkfun.com/datasheets/LCD/HD44780.pdf)

#[cfg(test)]
extern crate std;

mod error;
mod instruction;
mod lcd;
mod pin;
mod register;
mod timer;

pub use error::{Error, Result};
pub use instruction::{Direction, Font, Instruction, Interface, Lines};
pub use lcd::{Lcd, LcdUninit, COLUMNS, GLYPH_SLOTS, ROWS};
pub use pin::{DataBus, Pin, PinRef, Port};
pub use register::{Mmio, Registers};
pub use timer::{Timer, DEFAULT_CORE_CLOCK_HZ};
