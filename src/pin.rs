//! Symbolic GPIO identifiers and their resolved register handles.
//!
//! The lookup tables describe the TM4C123 GPIO block on the APB bus. Each
//! port exposes bit-specific alias addresses: writing through
//! `base + (1 << (bit + 2))` only touches `bit`, and `base + 0x3FC` aliases
//! the low eight data bits at once. Boards with a different register layout
//! can skip [`Pin`] and [`Port`] and build [`PinRef`] / [`DataBus`] directly.

use crate::register::Registers;

const PORT_BASE: [u32; 6] = [
    0x4000_4000, // A
    0x4000_5000, // B
    0x4000_6000, // C
    0x4000_7000, // D
    0x4002_4000, // E
    0x4002_5000, // F
];

const DATA_REGISTER_OFFSET: u32 = 0x03FC;
const PORT_BLOCK_MASK: u32 = !0x0FFF;

/// Physical `(register, bits)` touched by an access through `address` with
/// `mask`. Inside a port's alias window, address bits 2-9 gate which data
/// bits the access reaches, so every alias maps onto the port's base.
/// Addresses outside the table are taken literally.
fn physical_lines(address: u32, mask: u32) -> (u32, u32) {
    let block = address & PORT_BLOCK_MASK;
    let offset = address & !PORT_BLOCK_MASK;
    if PORT_BASE.contains(&block) && offset <= DATA_REGISTER_OFFSET {
        (block, mask & (offset >> 2) & 0xFF)
    } else {
        (address, mask)
    }
}

/// True when two accesses can drive a common physical bit.
fn lines_overlap(a: (u32, u32), b: (u32, u32)) -> bool {
    let (a_register, a_bits) = physical_lines(a.0, a.1);
    let (b_register, b_bits) = physical_lines(b.0, b.1);
    a_register == b_register && a_bits & b_bits != 0
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Port {
    pub fn base(self) -> u32 {
        PORT_BASE[self as usize]
    }

    /// Data register covering the low eight lines of this port.
    pub fn data_bus(self) -> DataBus {
        DataBus::new(self.base() + DATA_REGISTER_OFFSET)
    }
}

/// A single GPIO line. The high byte of the discriminant is the port index,
/// the low byte the bit number.
#[rustfmt::skip]
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pin {
    PA0 = 0x000, PA1, PA2, PA3, PA4, PA5, PA6, PA7,
    PB0 = 0x100, PB1, PB2, PB3, PB4, PB5, PB6, PB7,
    PC0 = 0x200, PC1, PC2, PC3, PC4, PC5, PC6, PC7,
    PD0 = 0x300, PD1, PD2, PD3, PD4, PD5, PD6, PD7,
    PE0 = 0x400, PE1, PE2, PE3, PE4, PE5,
    PF0 = 0x500, PF1, PF2, PF3, PF4,
}

impl Pin {
    pub fn port(self) -> Port {
        match (self as u16) >> 8 {
            0 => Port::A,
            1 => Port::B,
            2 => Port::C,
            3 => Port::D,
            4 => Port::E,
            _ => Port::F,
        }
    }

    pub fn bit(self) -> u8 {
        (self as u16 & 0xFF) as u8
    }

    /// Resolves to the bit-specific alias register and the bit's mask.
    pub fn resolve(self) -> PinRef {
        let bit = u32::from(self.bit());
        PinRef::new(self.port().base() + (1 << (bit + 2)), 1 << bit)
    }
}

/// Resolved output line: register address plus the bit it drives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PinRef {
    address: u32,
    mask: u32,
}

impl PinRef {
    pub const fn new(address: u32, mask: u32) -> Self {
        PinRef { address, mask }
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Two handles conflict when they would drive a common physical bit,
    /// whether through the same register or two aliases of one port.
    pub fn overlaps(&self, other: &PinRef) -> bool {
        lines_overlap((self.address, self.mask), (other.address, other.mask))
    }

    pub fn set_high<R: Registers>(&self, registers: &mut R) {
        registers.modify(self.address, self.mask, self.mask);
    }

    pub fn set_low<R: Registers>(&self, registers: &mut R) {
        registers.modify(self.address, self.mask, 0);
    }
}

/// Data register of the port whose low-order lines carry DB0-DB7 (8-bit
/// interface) or DB4-DB7 (4-bit interface).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DataBus {
    address: u32,
}

impl DataBus {
    pub const fn new(address: u32) -> Self {
        DataBus { address }
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    /// True when `pin` drives one of the bus lines selected by `mask`.
    pub fn carries(&self, mask: u8, pin: &PinRef) -> bool {
        lines_overlap((self.address, u32::from(mask)), (pin.address(), pin.mask()))
    }

    /// Drives the lines under `mask` with `value`, leaving the other bits of
    /// the port untouched.
    pub fn write<R: Registers>(&self, registers: &mut R, mask: u8, value: u8) {
        registers.modify(self.address, u32::from(mask), u32::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_resolve_to_bit_specific_aliases() {
        assert_eq!(Pin::PA0.resolve(), PinRef::new(0x4000_4004, 0x01));
        assert_eq!(Pin::PB3.resolve(), PinRef::new(0x4000_5020, 0x08));
        assert_eq!(Pin::PE5.resolve(), PinRef::new(0x4002_4080, 0x20));
        assert_eq!(Pin::PF4.resolve(), PinRef::new(0x4002_5040, 0x10));
        assert_eq!(Pin::PD7.resolve(), PinRef::new(0x4000_7200, 0x80));
    }

    #[test]
    fn pin_splits_into_port_and_bit() {
        assert_eq!(Pin::PC6.port(), Port::C);
        assert_eq!(Pin::PC6.bit(), 6);
        assert_eq!(Pin::PF0.port(), Port::F);
        assert_eq!(Pin::PF0.bit(), 0);
    }

    #[test]
    fn ports_resolve_to_data_register() {
        assert_eq!(Port::A.data_bus().address(), 0x4000_43FC);
        assert_eq!(Port::E.data_bus().address(), 0x4002_43FC);
    }

    #[test]
    fn overlap_requires_same_register_and_bit() {
        let a = PinRef::new(0x100, 0b01);
        assert!(a.overlaps(&PinRef::new(0x100, 0b11)));
        assert!(!a.overlaps(&PinRef::new(0x100, 0b10)));
        assert!(!a.overlaps(&PinRef::new(0x104, 0b01)));
    }

    #[test]
    fn aliases_of_one_port_share_lines() {
        let pb0 = Pin::PB0.resolve();
        assert!(pb0.overlaps(&PinRef::new(Port::B.base() + 0x3FC, 0x01)));
        assert!(!pb0.overlaps(&Pin::PB1.resolve()));
        assert!(!pb0.overlaps(&Pin::PA0.resolve()));

        let bus = Port::B.data_bus();
        assert!(bus.carries(0x0F, &pb0));
        assert!(bus.carries(0x0F, &Pin::PB3.resolve()));
        assert!(!bus.carries(0x0F, &Pin::PB4.resolve()));
        assert!(bus.carries(0xFF, &Pin::PB4.resolve()));
        assert!(!bus.carries(0xFF, &Pin::PA0.resolve()));
    }
}
