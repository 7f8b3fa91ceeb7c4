//! Busy-wait delays on the Cortex-M SysTick down-counter.
//!
//! The timer is claimed for good once initialized: nothing else in the
//! program may reconfigure SysTick while a [`Timer`] is alive. Waits poll the
//! COUNT flag, cannot be cancelled and never time out.

use core::hint::spin_loop;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use log::debug;

use crate::register::Registers;

const SYST_CTRL: u32 = 0xE000_E010;
const SYST_RELOAD: u32 = 0xE000_E014;
const SYST_CURRENT: u32 = 0xE000_E018;

const CTRL_COUNT: u32 = 1 << 16;
const CTRL_CLK_SRC: u32 = 1 << 2;
const CTRL_ENABLE: u32 = 1 << 0;
const RELOAD_MAX: u32 = 0x00FF_FFFF;

/// Core clock the default tick counts are calibrated for.
pub const DEFAULT_CORE_CLOCK_HZ: u32 = 50_000_000;

pub struct Timer<R: Registers> {
    registers: R,
    ticks_per_us: u32,
    ticks_per_ms: u32,
}

impl<R: Registers> Timer<R> {
    /// Claims SysTick, assuming a 50 MHz core clock.
    pub fn new(registers: R) -> Self {
        Self::with_clock(registers, DEFAULT_CORE_CLOCK_HZ)
    }

    /// Claims SysTick, calibrating the unit waits for a `core_clock_hz` core clock.
    /// Tick counts round up so a unit wait never comes out short.
    pub fn with_clock(registers: R, core_clock_hz: u32) -> Self {
        let mut timer = Timer {
            registers,
            ticks_per_us: ceil_div(core_clock_hz, 1_000_000).max(1),
            ticks_per_ms: ceil_div(core_clock_hz, 1_000).max(1),
        };
        timer.initialize();
        timer
    }

    /// Free-running from the core clock, maximum reload, counter cleared.
    /// Safe to call again; it just restarts the counter.
    pub fn initialize(&mut self) {
        debug!(
            "SysTick: {} ticks/us, {} ticks/ms",
            self.ticks_per_us, self.ticks_per_ms
        );
        self.registers.write(SYST_CTRL, 0);
        self.registers.write(SYST_RELOAD, RELOAD_MAX);
        // Any write clears the current value
        self.registers.write(SYST_CURRENT, 0);
        self.registers.write(SYST_CTRL, CTRL_CLK_SRC | CTRL_ENABLE);
    }

    /// Blocks for `period` core clock ticks. Periods above the 24-bit reload
    /// range are truncated to it.
    pub fn wait_ticks(&mut self, period: u32) {
        if period == 0 {
            return;
        }
        self.registers
            .write(SYST_RELOAD, (period - 1).min(RELOAD_MAX));
        self.registers.write(SYST_CURRENT, 0);
        while self.registers.read(SYST_CTRL) & CTRL_COUNT == 0 {
            spin_loop();
        }
    }

    /// `us` back-to-back one microsecond waits.
    pub fn wait_us(&mut self, us: u32) {
        for _ in 0..us {
            self.wait_ticks(self.ticks_per_us);
        }
    }

    /// `ms` back-to-back one millisecond waits.
    pub fn wait_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.wait_ticks(self.ticks_per_ms);
        }
    }

    /// Gives the register handle back. SysTick keeps running.
    pub fn free(self) -> R {
        self.registers
    }
}

fn ceil_div(value: u32, divisor: u32) -> u32 {
    value / divisor + u32::from(value % divisor != 0)
}

macro_rules! impl_delay {
    ($($ty:ty),*) => {
        $(
            impl<R: Registers> DelayUs<$ty> for Timer<R> {
                fn delay_us(&mut self, us: $ty) {
                    self.wait_us(u32::from(us));
                }
            }

            impl<R: Registers> DelayMs<$ty> for Timer<R> {
                fn delay_ms(&mut self, ms: $ty) {
                    self.wait_ms(u32::from(ms));
                }
            }
        )*
    };
}

impl_delay!(u8, u16, u32);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::vec::Vec;

    /// SysTick stand-in: the COUNT flag shows up after `polls` reads of CTRL
    /// following a write to CURRENT.
    struct FakeSysTick {
        values: HashMap<u32, u32>,
        writes: Vec<(u32, u32)>,
        polls: u32,
        remaining: u32,
        ctrl_reads: u32,
    }

    impl FakeSysTick {
        fn new(polls: u32) -> Self {
            FakeSysTick {
                values: HashMap::new(),
                writes: Vec::new(),
                polls,
                remaining: polls,
                ctrl_reads: 0,
            }
        }

        fn reloads(&self) -> Vec<u32> {
            self.writes
                .iter()
                .filter(|(address, _)| *address == SYST_RELOAD)
                .map(|(_, value)| *value)
                .collect()
        }
    }

    impl Registers for FakeSysTick {
        fn read(&mut self, address: u32) -> u32 {
            let value = self.values.get(&address).copied().unwrap_or(0);
            if address != SYST_CTRL {
                return value;
            }
            self.ctrl_reads += 1;
            if self.remaining > 0 {
                self.remaining -= 1;
            }
            if self.remaining == 0 {
                value | CTRL_COUNT
            } else {
                value
            }
        }

        fn write(&mut self, address: u32, value: u32) {
            if address == SYST_CURRENT {
                self.remaining = self.polls;
            }
            self.writes.push((address, value));
            self.values.insert(address, value);
        }
    }

    #[test]
    fn initialize_claims_free_running_counter() {
        let timer = Timer::new(FakeSysTick::new(1));
        let fake = timer.free();
        assert_eq!(
            fake.writes,
            [
                (SYST_CTRL, 0),
                (SYST_RELOAD, RELOAD_MAX),
                (SYST_CURRENT, 0),
                (SYST_CTRL, CTRL_CLK_SRC | CTRL_ENABLE),
            ]
        );
    }

    #[test]
    fn wait_ticks_loads_period_minus_one_and_polls_flag() {
        let mut timer = Timer::new(FakeSysTick::new(3));
        timer.wait_ticks(1000);
        let fake = timer.free();
        assert_eq!(&fake.writes[4..], &[(SYST_RELOAD, 999), (SYST_CURRENT, 0)]);
        assert_eq!(fake.ctrl_reads, 3);
    }

    #[test]
    fn zero_ticks_does_not_touch_the_counter() {
        let mut timer = Timer::new(FakeSysTick::new(1));
        timer.wait_ticks(0);
        assert_eq!(timer.free().writes.len(), 4);
    }

    #[test]
    fn long_periods_clamp_to_reload_range() {
        let mut timer = Timer::new(FakeSysTick::new(1));
        timer.wait_ticks(u32::MAX);
        assert_eq!(timer.free().reloads(), [RELOAD_MAX, RELOAD_MAX]);
    }

    #[test]
    fn unit_waits_compose_per_call() {
        let mut timer = Timer::new(FakeSysTick::new(1));
        timer.wait_us(3);
        timer.wait_ms(2);
        let reloads = timer.free().reloads();
        assert_eq!(reloads, [RELOAD_MAX, 49, 49, 49, 49_999, 49_999]);
    }

    #[test]
    fn delay_traits_use_calibrated_units() {
        let mut timer = Timer::with_clock(FakeSysTick::new(1), 16_000_000);
        DelayUs::<u16>::delay_us(&mut timer, 2);
        DelayMs::<u8>::delay_ms(&mut timer, 1);
        let reloads = timer.free().reloads();
        assert_eq!(reloads, [RELOAD_MAX, 15, 15, 15_999]);
    }

    #[test]
    fn fractional_mhz_clock_rounds_ticks_up() {
        // 7.3728 MHz: 7.37 ticks per microsecond, 7372.8 per millisecond
        let mut timer = Timer::with_clock(FakeSysTick::new(1), 7_372_800);
        timer.wait_us(1);
        timer.wait_ms(1);
        let reloads = timer.free().reloads();
        assert_eq!(reloads, [RELOAD_MAX, 7, 7_372]);
        // (reload + 1) ticks must last at least one unit
        assert!(u64::from(reloads[1] + 1) * 1_000_000 >= 7_372_800);
        assert!(u64::from(reloads[2] + 1) * 1_000 >= 7_372_800);
    }
}
