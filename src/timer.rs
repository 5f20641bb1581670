//! Software timer records.

use core::cell::Cell;

use crate::capabilities::InterruptMaskedCapability;
use crate::hil::time::TimerClient;
use crate::utilities::cells::OptionalCell;

/// Expiry behavior of a software timer.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Fire once after `period` ticks, then return to the stopped state.
    OneShot,
    /// Fire every `period` ticks until stopped.
    Repeating,
}

/// One logical timer.
///
/// The caller owns the storage: place a `SoftTimer` on the stack, inside
/// an outer struct, or in whatever long-lived location board init code
/// uses, and hand the mux a reference. Construction is `const`, so no
/// runtime init is needed. A record starts out stopped and unlinked; it
/// only becomes part of a schedule through
/// [`TimerMux::start`](crate::TimerMux::start).
///
/// All fields use interior mutability so the mux can manipulate records
/// through shared references, including from the expiry interrupt.
pub struct SoftTimer<'a> {
    /// Position on the shared virtual timeline. Zero means not scheduled.
    pub(crate) time: Cell<u32>,
    /// Delay before the first expiry, and for repeating timers the re-arm
    /// interval. A schedulable period is nonzero.
    pub(crate) period: Cell<u32>,
    pub(crate) mode: Cell<Mode>,
    /// Expiry callback and its opaque token. Absent client means expiry is
    /// a no-op.
    pub(crate) client: OptionalCell<&'a dyn TimerClient>,
    pub(crate) token: Cell<usize>,
    /// Schedule links. Both `None` while the record is unscheduled.
    pub(crate) next: Cell<Option<&'a SoftTimer<'a>>>,
    pub(crate) prev: Cell<Option<&'a SoftTimer<'a>>>,
}

impl<'a> SoftTimer<'a> {
    /// Creates a stopped, unlinked record with no client bound.
    pub const fn new(period: u32, mode: Mode) -> SoftTimer<'a> {
        SoftTimer {
            time: Cell::new(0),
            period: Cell::new(period),
            mode: Cell::new(mode),
            client: OptionalCell::empty(),
            token: Cell::new(0),
            next: Cell::new(None),
            prev: Cell::new(None),
        }
    }

    /// Binds the expiry client and its token.
    ///
    /// The token is forwarded verbatim to
    /// [`TimerClient::fired`](crate::hil::time::TimerClient::fired), so a
    /// single client can distinguish the timers it serves. Takes effect at
    /// the next expiry.
    pub fn set_client(
        &self,
        client: &'a dyn TimerClient,
        token: usize,
        _capability: &dyn InterruptMaskedCapability,
    ) {
        self.client.set(client);
        self.token.set(token);
    }

    /// The configured tick interval.
    pub fn period(&self) -> u32 {
        self.period.get()
    }

    /// The configured expiry behavior.
    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    /// Whether the record is currently part of a schedule.
    pub fn is_scheduled(&self) -> bool {
        self.time.get() != 0
    }
}
