use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use log::{debug, trace};
use ufmt_write::uWrite;

use crate::error::{Error, Result};
use crate::instruction::{Direction, Font, Instruction, Interface, Lines};
use crate::pin::{DataBus, Pin, PinRef, Port};
use crate::register::Registers;

pub const COLUMNS: u8 = 16;
pub const ROWS: u8 = 2;

/// DDRAM address of column 0 on each row.
const ROW_OFFSETS: [u8; ROWS as usize] = [0x00, 0x40];

/// Custom glyph slots in CGRAM.
pub const GLYPH_SLOTS: u8 = 8;

// Waits in microseconds / milliseconds, worst case from the datasheet
const POWER_ON_MS: u8 = 20;
const FIRST_WAKE_MS: u8 = 5;
const SECOND_WAKE_US: u16 = 200;
const ENABLE_SETUP_US: u16 = 1;
const ENABLE_WIDTH_US: u16 = 1;
const EXECUTION_US: u16 = 45;
const LONG_EXECUTION_MS: u8 = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mode {
    Instruction,
    Data,
}

const DEFAULT_INTERFACE: Interface = Interface::FourBit;
const DEFAULT_LINES: Lines = Lines::Two;
const DEFAULT_FONT: Font = Font::Dots5x8;

/// Display configuration before the controller has been brought up.
pub struct LcdUninit<R, D>
where
    R: Registers,
    D: DelayUs<u16> + DelayMs<u8>,
{
    registers: R,
    delay: D,
    rs: PinRef,
    enable: PinRef,
    data_bus: DataBus,
    interface: Interface,
    lines: Lines,
    font: Font,
    symbolic: Option<(Pin, Pin, Port)>,
}

impl<R, D> LcdUninit<R, D>
where
    R: Registers,
    D: DelayUs<u16> + DelayMs<u8>,
{
    /// Create new instance from already resolved lines.
    ///
    /// All of them must have been configured as digital outputs beforehand.
    pub fn new(registers: R, delay: D, rs: PinRef, enable: PinRef, data_bus: DataBus) -> Self {
        Self {
            registers,
            delay,
            rs,
            enable,
            data_bus,
            interface: DEFAULT_INTERFACE,
            lines: DEFAULT_LINES,
            font: DEFAULT_FONT,
            symbolic: None,
        }
    }

    /// Create new instance from symbolic pin names. The data lines are the
    /// low-order bits of `data_port`.
    pub fn from_pins(registers: R, delay: D, rs: Pin, enable: Pin, data_port: Port) -> Self {
        let mut lcd = Self::new(
            registers,
            delay,
            rs.resolve(),
            enable.resolve(),
            data_port.data_bus(),
        );
        lcd.symbolic = Some((rs, enable, data_port));
        lcd
    }

    pub fn interface(mut self, interface: Interface) -> Self {
        self.interface = interface;
        self
    }

    pub fn lines(mut self, lines: Lines) -> Self {
        self.lines = lines;
        self
    }

    pub fn font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    fn check_pins(&self) -> Result<()> {
        let bus_mask = bus_mask(self.interface);
        let on_bus = |pin: &PinRef| self.data_bus.carries(bus_mask, pin);
        if self.rs.overlaps(&self.enable) || on_bus(&self.rs) || on_bus(&self.enable) {
            return Err(Error::PinConflict);
        }

        if let Some((rs, enable, port)) = self.symbolic {
            let width = match self.interface {
                Interface::FourBit => 4,
                Interface::EightBit => 8,
            };
            let on_bus = |pin: Pin| pin.port() == port && pin.bit() < width;
            if rs == enable || on_bus(rs) || on_bus(enable) {
                return Err(Error::PinConflict);
            }
        }
        Ok(())
    }

    /// Runs the power-on initialization and hands back a ready display.
    ///
    /// The controller's state after power-up is unknown, so it is first forced
    /// into 8-bit mode by three raw function-set writes (the "initializing by
    /// instruction" procedure of the datasheet), then switched to the
    /// requested interface and configured: display off, clear, entry mode
    /// increment without shift, display on, cursor at (0, 0).
    pub fn init(self) -> Result<Lcd<R, D>> {
        self.check_pins()?;

        let mut lcd = Lcd {
            registers: self.registers,
            delay: self.delay,
            rs: self.rs,
            enable: self.enable,
            data_bus: self.data_bus,
            interface: self.interface,
        };

        debug!("LCD power-on, {:?} interface", lcd.interface);
        lcd.rs.set_low(&mut lcd.registers);
        lcd.enable.set_low(&mut lcd.registers);
        lcd.delay.delay_ms(POWER_ON_MS);

        debug!("LCD configuring");
        let wake = Instruction::FunctionSet {
            interface: Interface::EightBit,
            lines: Lines::One,
            font: Font::Dots5x8,
        }
        .encode();
        lcd.write_raw(wake);
        lcd.delay.delay_ms(FIRST_WAKE_MS);
        lcd.write_raw(wake);
        lcd.delay.delay_us(SECOND_WAKE_US);
        lcd.write_raw(wake);

        if lcd.interface == Interface::FourBit {
            let switch = Instruction::FunctionSet {
                interface: Interface::FourBit,
                lines: Lines::One,
                font: Font::Dots5x8,
            }
            .encode();
            lcd.write_raw(switch);
        }

        lcd.command(Instruction::FunctionSet {
            interface: self.interface,
            lines: self.lines,
            font: self.font,
        });
        lcd.command(Instruction::DisplayControl {
            display: false,
            cursor: false,
            blink: false,
        });
        lcd.command(Instruction::ClearDisplay);
        lcd.command(Instruction::EntryModeSet {
            increment: true,
            shift: false,
        });
        lcd.command(Instruction::DisplayControl {
            display: true,
            cursor: false,
            blink: false,
        });
        lcd.set_cursor(0, 0)?;

        debug!("LCD ready");
        Ok(lcd)
    }
}

/// An initialized display. Every operation blocks until the controller has
/// had time to execute it.
pub struct Lcd<R, D>
where
    R: Registers,
    D: DelayUs<u16> + DelayMs<u8>,
{
    registers: R,
    delay: D,
    rs: PinRef,
    enable: PinRef,
    data_bus: DataBus,
    interface: Interface,
}

impl<R, D> Lcd<R, D>
where
    R: Registers,
    D: DelayUs<u16> + DelayMs<u8>,
{
    /// Write one character code from the controller's character ROM.
    /// Codes 0-7 are the custom glyphs.
    pub fn write_char(&mut self, code: u8) -> Result<()> {
        self.send(code, Mode::Data);
        Ok(())
    }

    /// Write bytes up to the first NUL. There is no line wrapping: past the
    /// last column the text goes wherever the controller's address counter
    /// takes it.
    pub fn print<T: AsRef<[u8]> + ?Sized>(&mut self, text: &T) -> Result<()> {
        for &byte in text.as_ref().iter().take_while(|&&byte| byte != 0) {
            self.send(byte, Mode::Data);
        }
        Ok(())
    }

    /// Move the cursor to `(col, row)`, zero-based. Out of range positions
    /// put nothing on the bus.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<()> {
        if col >= COLUMNS {
            debug!("Rejected cursor column {}", col);
            return Err(Error::ColumnOutOfRange(col));
        }
        if row >= ROWS {
            debug!("Rejected cursor row {}", row);
            return Err(Error::RowOutOfRange(row));
        }
        self.command(Instruction::SetDdramAddress(
            ROW_OFFSETS[row as usize] + col,
        ));
        Ok(())
    }

    /// Return cursor to upper left corner, i.e. (0,0).
    pub fn home(&mut self) -> Result<()> {
        self.set_cursor(0, 0)
    }

    /// Clear the display and return the cursor to (0,0).
    pub fn clear(&mut self) -> Result<()> {
        self.command(Instruction::ClearDisplay);
        self.set_cursor(0, 0)
    }

    /// Shift text and cursor one column to the left.
    pub fn scroll_left(&mut self) -> Result<()> {
        self.command(Instruction::Shift {
            display: true,
            direction: Direction::Left,
        });
        Ok(())
    }

    /// Shift text and cursor one column to the right.
    pub fn scroll_right(&mut self) -> Result<()> {
        self.command(Instruction::Shift {
            display: true,
            direction: Direction::Right,
        });
        Ok(())
    }

    pub fn set_cursor_visible(&mut self, blinking: bool) -> Result<()> {
        self.command(Instruction::DisplayControl {
            display: true,
            cursor: true,
            blink: blinking,
        });
        Ok(())
    }

    pub fn set_cursor_hidden(&mut self) -> Result<()> {
        self.command(Instruction::DisplayControl {
            display: true,
            cursor: false,
            blink: false,
        });
        Ok(())
    }

    /// Store a 5x8 glyph in slot `index` (0-7), written later as character
    /// code `index`. Only the top seven rows come from `pattern`; the eighth
    /// is the cursor line and is always blanked.
    ///
    /// Leaves the address counter in CGRAM, so set the cursor before writing
    /// text again.
    pub fn create_glyph(&mut self, index: u8, pattern: &[u8; 7]) -> Result<()> {
        if index >= GLYPH_SLOTS {
            debug!("Rejected glyph index {}", index);
            return Err(Error::GlyphIndexOutOfRange(index));
        }
        self.command(Instruction::SetCgramAddress(index * 8));
        for &row in pattern {
            self.send(row, Mode::Data);
        }
        self.send(0x00, Mode::Data);
        Ok(())
    }

    pub fn delay_ms(&mut self, ms: u8) {
        self.delay.delay_ms(ms);
    }

    /// Give back the register handle and the delay. The controller keeps its
    /// state.
    pub fn release(self) -> (R, D) {
        (self.registers, self.delay)
    }

    // Private funcs
    fn command(&mut self, instruction: Instruction) {
        self.send(instruction.encode(), Mode::Instruction);
        if instruction.needs_long_settle() {
            self.delay.delay_ms(LONG_EXECUTION_MS);
        }
    }

    fn send(&mut self, byte: u8, mode: Mode) {
        trace!("Sending {:?}: {:#04x}", mode, byte);

        match mode {
            Mode::Instruction => self.rs.set_low(&mut self.registers),
            Mode::Data => self.rs.set_high(&mut self.registers),
        }

        match self.interface {
            Interface::EightBit => {
                self.write_bus(byte);
                self.pulse_enable();
            }
            Interface::FourBit => {
                trace!("Writing HN: {:04b}", byte >> 4);
                self.write_bus(byte >> 4);
                self.pulse_enable();
                trace!("Writing LN: {:04b}", byte & 0x0F);
                self.write_bus(byte & 0x0F);
                self.pulse_enable();
            }
        }
    }

    /// One bus write and pulse with RS left as is. In 4-bit mode only the
    /// high nibble of `byte` goes out, the controller is still reading
    /// DB4-DB7 as the top of an 8-bit word at this point.
    fn write_raw(&mut self, byte: u8) {
        trace!("Sending raw: {:#04x}", byte);
        match self.interface {
            Interface::EightBit => self.write_bus(byte),
            Interface::FourBit => self.write_bus(byte >> 4),
        }
        self.pulse_enable();
    }

    fn write_bus(&mut self, value: u8) {
        self.data_bus
            .write(&mut self.registers, bus_mask(self.interface), value);
    }

    fn pulse_enable(&mut self) {
        self.delay.delay_us(ENABLE_SETUP_US);
        self.enable.set_high(&mut self.registers);
        self.delay.delay_us(ENABLE_WIDTH_US);
        self.enable.set_low(&mut self.registers);
        self.delay.delay_us(EXECUTION_US);
    }
}

impl<R, D> uWrite for Lcd<R, D>
where
    R: Registers,
    D: DelayUs<u16> + DelayMs<u8>,
{
    type Error = Error;

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.print(s)
    }
}

fn bus_mask(interface: Interface) -> u8 {
    match interface {
        Interface::FourBit => 0x0F,
        Interface::EightBit => 0xFF,
    }
}
