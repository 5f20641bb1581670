//! Shared test doubles: a countdown peripheral model and recording
//! clients, driven tick by tick from the tests.

#![allow(dead_code)]

use std::cell::Cell;

use tickmux::capabilities::InterruptMaskedCapability;
use tickmux::hil::time::{Countdown, TimerClient};
use tickmux::TimerMux;

/// Test capability: the tests are single threaded and never run the drain
/// concurrently with mutations, which is exactly what the capability
/// attests.
pub struct Masked;
unsafe impl InterruptMaskedCapability for Masked {}

/// Countdown model: `arm` loads the counter, `tick` decrements it and
/// reports when it elapses, `remaining` reads it back.
pub struct FakeCountdown {
    remaining: Cell<u32>,
    armed: Cell<bool>,
    last_arm: Cell<u32>,
    arm_calls: Cell<usize>,
}

impl FakeCountdown {
    pub fn new() -> FakeCountdown {
        FakeCountdown {
            remaining: Cell::new(0),
            armed: Cell::new(false),
            last_arm: Cell::new(0),
            arm_calls: Cell::new(0),
        }
    }

    /// Advances one tick; true when the armed countdown elapses.
    pub fn tick(&self) -> bool {
        if !self.armed.get() {
            return false;
        }
        let left = self.remaining.get() - 1;
        self.remaining.set(left);
        if left == 0 {
            self.armed.set(false);
            true
        } else {
            false
        }
    }

    /// Jumps straight to the pending expiry, if any.
    pub fn expire(&self) -> bool {
        if !self.armed.get() {
            return false;
        }
        self.remaining.set(0);
        self.armed.set(false);
        true
    }

    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }

    pub fn last_arm(&self) -> u32 {
        self.last_arm.get()
    }

    pub fn arm_calls(&self) -> usize {
        self.arm_calls.get()
    }
}

impl Countdown for FakeCountdown {
    fn arm(&self, ticks: u32) {
        self.last_arm.set(ticks);
        self.arm_calls.set(self.arm_calls.get() + 1);
        self.remaining.set(ticks);
        self.armed.set(ticks != 0);
    }

    fn remaining(&self) -> u32 {
        self.remaining.get()
    }
}

/// Counts expiries and remembers the last token seen.
pub struct CountingClient {
    pub fired: Cell<usize>,
    pub last_token: Cell<usize>,
}

impl CountingClient {
    pub fn new() -> CountingClient {
        CountingClient {
            fired: Cell::new(0),
            last_token: Cell::new(0),
        }
    }
}

impl TimerClient for CountingClient {
    fn fired(&self, token: usize) {
        self.fired.set(self.fired.get() + 1);
        self.last_token.set(token);
    }
}

/// Drives `ticks` ticks of virtual time, dispatching the expiry interrupt
/// whenever the countdown elapses.
pub fn run<'a>(hw: &'a FakeCountdown, mux: &TimerMux<'a, FakeCountdown>, ticks: u32) {
    for _ in 0..ticks {
        if hw.tick() {
            mux.handle_interrupt();
        }
    }
}

/// Remaining ticks of every scheduled record, in schedule order.
pub fn remaining_in_order<'a>(mux: &TimerMux<'a, FakeCountdown>) -> Vec<u32> {
    mux.iter()
        .map(|t| mux.ticks_remaining(t).expect("scheduled record"))
        .collect()
}
