//! Standard error enum for invoking scheduling operations.

/// Errors returned by the scheduling calls on a
/// [`TimerMux`](crate::TimerMux).
///
/// The taxonomy is flat and exhaustive. Every failing call leaves the
/// schedule exactly as it found it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum ErrorCode {
    /// No countdown hardware has been registered with the mux
    NOHARDWARE = 1,
    /// The record claims to be scheduled but is not a member of this
    /// mux's schedule
    NOTIMER = 2,
    /// An invalid parameter was passed (a zero period)
    INVAL = 3,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}
