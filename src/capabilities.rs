//! Special restricted capabilities.
//!
//! The mux performs multi-step, non-atomic updates (splice a record, then
//! re-arm the countdown) that are invalid if the expiry interrupt runs
//! mid-sequence. Rather than documenting "call this with interrupts
//! disabled" as a comment-only convention, the requirement is expressed in
//! the type system: every mutating call demands a capability object.
//!
//! A capability is an `unsafe` trait. Only code willing to write an
//! `unsafe impl` can mint one, and that is exactly the code in a position
//! to actually mask the countdown's expiry interrupt:
//!
//! ```
//! use tickmux::capabilities::InterruptMaskedCapability;
//!
//! struct ExpiryMasked;
//! unsafe impl InterruptMaskedCapability for ExpiryMasked {}
//! ```
//!
//! With the `critical-section` feature enabled, [`with_masked`] mints the
//! capability inside a `critical_section::with` region so applications on
//! standard embedded runtimes never write `unsafe` themselves.

/// Attests that the expiry interrupt of the countdown hardware driving a
/// [`TimerMux`](crate::TimerMux) cannot fire for the duration of the call
/// this capability is passed to.
///
/// The expiry drain itself never takes one: hardware interrupt entry
/// already suppresses re-entry of the handler.
pub unsafe trait InterruptMaskedCapability {}

#[cfg(feature = "critical-section")]
mod section {
    use super::InterruptMaskedCapability;

    struct SectionMasked;
    unsafe impl InterruptMaskedCapability for SectionMasked {}

    /// Runs `f` inside a critical section, handing it the capability that
    /// the section grants.
    pub fn with_masked<R>(f: impl FnOnce(&dyn InterruptMaskedCapability) -> R) -> R {
        critical_section::with(|_| f(&SectionMasked))
    }
}

#[cfg(feature = "critical-section")]
pub use section::with_masked;
