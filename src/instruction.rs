//! HD44780 instruction set.
//!
//! Opcodes follow table 6 of the Hitachi HD44780U datasheet. Only the bit
//! combinations defined there are ever produced by [`Instruction::encode`].

const CLEAR_DISPLAY: u8 = 0b0000_0001;
const RETURN_HOME: u8 = 0b0000_0010;
const ENTRY_MODE_SET: u8 = 0b0000_0100;
const DISPLAY_CONTROL: u8 = 0b0000_1000;
const SHIFT: u8 = 0b0001_0000;
const FUNCTION_SET: u8 = 0b0010_0000;
const SET_CGRAM_ADDRESS: u8 = 0b0100_0000;
const SET_DDRAM_ADDRESS: u8 = 0b1000_0000;

// Entry mode flags
const ENTRY_INCREMENT: u8 = 0b0000_0010;
const ENTRY_SHIFT: u8 = 0b0000_0001;

// Display control flags
const DISPLAY_ON: u8 = 0b0000_0100;
const CURSOR_ON: u8 = 0b0000_0010;
const BLINK_ON: u8 = 0b0000_0001;

// Shift flags
const SHIFT_DISPLAY: u8 = 0b0000_1000;
const SHIFT_RIGHT: u8 = 0b0000_0100;

// Function set flags
const EIGHT_BIT: u8 = 0b0001_0000;
const TWO_LINES: u8 = 0b0000_1000;
const FONT_5X10: u8 = 0b0000_0100;

/// Width of the parallel data interface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Interface {
    /// Only DB4-DB7 are wired, every byte goes out as two nibbles.
    FourBit,
    EightBit,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lines {
    One,
    Two,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Font {
    Dots5x8,
    Dots5x10,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// One controller instruction, before encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Instruction {
    ClearDisplay,
    ReturnHome,
    EntryModeSet {
        increment: bool,
        shift: bool,
    },
    DisplayControl {
        display: bool,
        cursor: bool,
        blink: bool,
    },
    /// Moves the cursor, or the whole display when `display` is set.
    Shift {
        display: bool,
        direction: Direction,
    },
    FunctionSet {
        interface: Interface,
        lines: Lines,
        font: Font,
    },
    /// 6-bit CGRAM address, upper bits are dropped.
    SetCgramAddress(u8),
    /// 7-bit DDRAM address, upper bit is dropped.
    SetDdramAddress(u8),
}

impl Instruction {
    pub fn encode(self) -> u8 {
        match self {
            Instruction::ClearDisplay => CLEAR_DISPLAY,
            Instruction::ReturnHome => RETURN_HOME,
            Instruction::EntryModeSet { increment, shift } => {
                let mut command = ENTRY_MODE_SET;
                if increment {
                    command |= ENTRY_INCREMENT;
                }
                if shift {
                    command |= ENTRY_SHIFT;
                }
                command
            }
            Instruction::DisplayControl {
                display,
                cursor,
                blink,
            } => {
                let mut command = DISPLAY_CONTROL;
                if display {
                    command |= DISPLAY_ON;
                }
                if cursor {
                    command |= CURSOR_ON;
                }
                if blink {
                    command |= BLINK_ON;
                }
                command
            }
            Instruction::Shift { display, direction } => {
                let mut command = SHIFT;
                if display {
                    command |= SHIFT_DISPLAY;
                }
                if direction == Direction::Right {
                    command |= SHIFT_RIGHT;
                }
                command
            }
            Instruction::FunctionSet {
                interface,
                lines,
                font,
            } => {
                let mut command = FUNCTION_SET;
                if interface == Interface::EightBit {
                    command |= EIGHT_BIT;
                }
                if lines == Lines::Two {
                    command |= TWO_LINES;
                }
                if font == Font::Dots5x10 {
                    command |= FONT_5X10;
                }
                command
            }
            Instruction::SetCgramAddress(address) => SET_CGRAM_ADDRESS | (address & 0b0011_1111),
            Instruction::SetDdramAddress(address) => SET_DDRAM_ADDRESS | (address & 0b0111_1111),
        }
    }

    /// Clear display and return home take milliseconds to execute, everything
    /// else finishes well within the regular post-pulse wait.
    pub fn needs_long_settle(self) -> bool {
        matches!(self, Instruction::ClearDisplay | Instruction::ReturnHome)
    }
}

impl From<Instruction> for u8 {
    fn from(instruction: Instruction) -> u8 {
        instruction.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_and_setup_opcodes() {
        let function_set = |interface| Instruction::FunctionSet {
            interface,
            lines: Lines::Two,
            font: Font::Dots5x8,
        };
        assert_eq!(function_set(Interface::EightBit).encode(), 0x38);
        assert_eq!(function_set(Interface::FourBit).encode(), 0x28);
        assert_eq!(
            Instruction::FunctionSet {
                interface: Interface::FourBit,
                lines: Lines::One,
                font: Font::Dots5x10,
            }
            .encode(),
            0x24
        );
        assert_eq!(
            Instruction::EntryModeSet {
                increment: true,
                shift: false
            }
            .encode(),
            0x06
        );
    }

    #[test]
    fn display_control_opcodes() {
        let control = |display, cursor, blink| {
            Instruction::DisplayControl {
                display,
                cursor,
                blink,
            }
            .encode()
        };
        assert_eq!(control(false, false, false), 0x08);
        assert_eq!(control(true, false, false), 0x0C);
        assert_eq!(control(true, true, false), 0x0E);
        assert_eq!(control(true, true, true), 0x0F);
    }

    #[test]
    fn display_shift_opcodes() {
        let shift = |direction| {
            Instruction::Shift {
                display: true,
                direction,
            }
            .encode()
        };
        assert_eq!(shift(Direction::Left), 0x18);
        assert_eq!(shift(Direction::Right), 0x1C);
    }

    #[test]
    fn addresses_are_masked_to_defined_bits() {
        assert_eq!(Instruction::SetCgramAddress(0x58 - 0x40).encode(), 0x58);
        assert_eq!(Instruction::SetCgramAddress(0xFF).encode(), 0x7F);
        assert_eq!(Instruction::SetDdramAddress(0x40).encode(), 0xC0);
        assert_eq!(Instruction::SetDdramAddress(0xFF).encode(), 0xFF);
    }

    #[test]
    fn only_clear_and_home_need_long_settle() {
        assert!(Instruction::ClearDisplay.needs_long_settle());
        assert!(Instruction::ReturnHome.needs_long_settle());
        assert!(!Instruction::EntryModeSet {
            increment: false,
            shift: false
        }
        .needs_long_settle());
        assert!(!Instruction::SetDdramAddress(0).needs_long_settle());
    }
}
