//! Raw 32-bit register access.
//!
//! Every pin, port and timer access in this crate goes through [`Registers`],
//! so a test build can swap the memory-mapped peripherals for a fake backing
//! store.

use core::ptr;

/// Word-sized register file addressed by absolute address.
pub trait Registers {
    fn read(&mut self, address: u32) -> u32;

    fn write(&mut self, address: u32, value: u32);

    /// Read-modify-write touching only the bits in `mask`.
    fn modify(&mut self, address: u32, mask: u32, value: u32) {
        let current = self.read(address);
        self.write(address, (current & !mask) | (value & mask));
    }
}

/// Memory-mapped registers, accessed with volatile loads and stores.
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Every address later passed to [`Registers::read`] or
    /// [`Registers::write`] must be a valid, word-aligned peripheral register
    /// on the running chip, and nothing else may drive those registers
    /// concurrently.
    pub const unsafe fn new() -> Self {
        Mmio { _private: () }
    }
}

impl Registers for Mmio {
    fn read(&mut self, address: u32) -> u32 {
        unsafe { ptr::read_volatile(address as usize as *const u32) }
    }

    fn write(&mut self, address: u32, value: u32) {
        unsafe { ptr::write_volatile(address as usize as *mut u32, value) }
    }
}

impl<R: Registers + ?Sized> Registers for &mut R {
    fn read(&mut self, address: u32) -> u32 {
        (**self).read(address)
    }

    fn write(&mut self, address: u32, value: u32) {
        (**self).write(address, value)
    }
}
