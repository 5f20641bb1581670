//! Interfaces for the countdown resource and for tick-unit conversion.

/// The single hardware countdown peripheral being multiplexed.
///
/// The application supplies one implementation per
/// [`TimerMux`](crate::TimerMux) and registers it once via
/// [`TimerMux::register_hardware`](crate::TimerMux::register_hardware).
/// The peripheral must interrupt when an armed countdown elapses and route
/// that interrupt to
/// [`TimerMux::handle_interrupt`](crate::TimerMux::handle_interrupt).
pub trait Countdown {
    /// Load the countdown to interrupt after `ticks` ticks from now.
    ///
    /// `ticks == 0` disarms the countdown instead.
    fn arm(&self, ticks: u32);

    /// Ticks left on the current arming.
    ///
    /// Must return `0` while the countdown is disarmed, and `0` once an
    /// armed countdown has elapsed and has not yet been re-armed. The mux
    /// reads this to locate "now" between the arm instant and the expiry.
    fn remaining(&self) -> u32;
}

/// A client of a [`SoftTimer`](crate::SoftTimer).
pub trait TimerClient {
    /// Signaled when the timer expires.
    ///
    /// `token` is the opaque value supplied at
    /// [`SoftTimer::set_client`](crate::SoftTimer::set_client), so one
    /// client implementation can serve many timers. The schedule is
    /// consistent at this point; the client may start or stop timers,
    /// provided it holds an
    /// [`InterruptMaskedCapability`](crate::capabilities::InterruptMaskedCapability)
    /// of its own.
    fn fired(&self, token: usize);
}

/// Trait to represent the tick rate of the countdown hardware in Hz.
///
/// Used by the conversion helpers below so callers can portably express
/// delays in real-time units. Pick the marker type matching the clock the
/// countdown peripheral actually runs from.
pub trait Frequency {
    /// Returns the tick rate in Hz.
    fn frequency() -> u32;
}

/// 1MHz `Frequency`, one tick per microsecond.
#[derive(Debug)]
pub struct Freq1MHz;
impl Frequency for Freq1MHz {
    fn frequency() -> u32 {
        1_000_000
    }
}

/// 32KHz `Frequency`
#[derive(Debug)]
pub struct Freq32KHz;
impl Frequency for Freq32KHz {
    fn frequency() -> u32 {
        32768
    }
}

/// 1KHz `Frequency`
#[derive(Debug)]
pub struct Freq1KHz;
impl Frequency for Freq1KHz {
    fn frequency() -> u32 {
        1000
    }
}

/// Converts whole seconds to ticks, saturating at `u32::MAX`.
pub fn ticks_from_seconds<F: Frequency>(seconds: u32) -> u32 {
    saturate(seconds as u64 * F::frequency() as u64)
}

/// Converts milliseconds to ticks, saturating at `u32::MAX`.
pub fn ticks_from_ms<F: Frequency>(ms: u32) -> u32 {
    saturate(ms as u64 * F::frequency() as u64 / 1000)
}

/// Converts microseconds to ticks, saturating at `u32::MAX`.
pub fn ticks_from_us<F: Frequency>(us: u32) -> u32 {
    saturate(us as u64 * F::frequency() as u64 / 1_000_000)
}

fn saturate(ticks: u64) -> u32 {
    ticks.min(u32::MAX as u64) as u32
}
