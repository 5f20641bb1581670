//! Multiplex many software-defined timers onto a single hardware countdown.
//!
//! Embedded applications need dozens of independent expiry events
//! (protocol timeouts, debounce windows, periodic polling) but usually
//! have one countdown peripheral able to interrupt. [`TimerMux`] keeps a
//! time-ordered schedule of caller-owned [`SoftTimer`] records, keeps the
//! peripheral armed for the nearest pending expiry, and drains bursts of
//! coincident expiries from a single interrupt with one re-arm decision
//! per distinct instant. Nothing is allocated; every record lives in
//! storage the caller supplies.
//!
//! The mutation API performs multi-step updates that must not be
//! interleaved with the expiry interrupt, so every mutating call takes an
//! [`InterruptMaskedCapability`](capabilities::InterruptMaskedCapability)
//! attesting that the interrupt is masked (see [`capabilities`]).
//!
//! ```
//! use core::cell::Cell;
//! use tickmux::capabilities::InterruptMaskedCapability;
//! use tickmux::hil::time::Countdown;
//! use tickmux::{Mode, SoftTimer, TimerMux};
//!
//! // A stand-in for the countdown peripheral driver.
//! struct Hardware {
//!     loaded: Cell<u32>,
//! }
//!
//! impl Countdown for Hardware {
//!     fn arm(&self, ticks: u32) {
//!         self.loaded.set(ticks);
//!     }
//!     fn remaining(&self) -> u32 {
//!         self.loaded.get()
//!     }
//! }
//!
//! // Board init runs with the expiry interrupt masked.
//! struct ExpiryMasked;
//! unsafe impl InterruptMaskedCapability for ExpiryMasked {}
//!
//! let hardware = Hardware { loaded: Cell::new(0) };
//! let mux = TimerMux::new();
//! mux.register_hardware(&hardware, &ExpiryMasked);
//!
//! let blink = SoftTimer::new(500, Mode::Repeating);
//! mux.start(&blink, &ExpiryMasked).unwrap();
//! assert_eq!(hardware.loaded.get(), 500);
//! ```
//!
//! The countdown's interrupt handler calls
//! [`TimerMux::handle_interrupt`], which runs the due clients and
//! re-arms the peripheral for the next distinct expiry.

#![warn(unreachable_pub)]
#![no_std]

#[cfg(test)]
extern crate std;

pub mod capabilities;
pub mod hil;
pub mod utilities;

mod errorcode;
mod mux;
mod timer;

pub use errorcode::ErrorCode;
pub use mux::{ScheduleIter, TimerMux};
pub use timer::{Mode, SoftTimer};
