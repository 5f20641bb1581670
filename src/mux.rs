//! Multiplex many software timers over a single hardware countdown.
//!
//! The mux keeps every scheduled [`SoftTimer`] on a doubly linked list
//! sorted ascending by expiry, always has the countdown armed for the
//! head, and drains every record due at the serviced instant from one
//! interrupt with a single re-arm per distinct instant.
//!
//! Scheduled times live on a shared virtual timeline anchored near the
//! countdown: "now" is `head.time - remaining()`. Differences between any
//! two scheduled times are true tick distances, and a whole-schedule
//! rebase keeps every stored value far from the `u32` wrap boundary.

use core::ptr;

use crate::capabilities::InterruptMaskedCapability;
use crate::errorcode::ErrorCode;
use crate::hil::time::{Countdown, TimerClient};
use crate::timer::{Mode, SoftTimer};
use crate::utilities::cells::OptionalCell;

/// Projections whose bit 31 would be set trigger a whole-schedule rebase,
/// collapsing every stored time back toward the current countdown before
/// any value can approach the wrap boundary.
const REBASE_GUARD: u32 = 0x8000_0000;

/// Schedules caller-owned [`SoftTimer`] records onto one [`Countdown`].
///
/// The mux is an explicit context object: instantiate one per countdown
/// peripheral and pass it around. There is no process-global state, so
/// independent instances (and deterministic tests) coexist freely.
///
/// All mutating calls must be protected from the expiry interrupt; they
/// take an [`InterruptMaskedCapability`] to prove it. The read-side calls
/// ([`iter`](Self::iter), [`ticks_remaining`](Self::ticks_remaining))
/// need the same exclusion to observe a consistent schedule.
pub struct TimerMux<'a, C: Countdown> {
    /// The earliest-expiring record, or `None` when nothing is scheduled.
    head: OptionalCell<&'a SoftTimer<'a>>,
    /// Registered countdown peripheral; absent until
    /// [`register_hardware`](Self::register_hardware).
    hardware: OptionalCell<&'a C>,
}

impl<'a, C: Countdown> TimerMux<'a, C> {
    pub const fn new() -> TimerMux<'a, C> {
        TimerMux {
            head: OptionalCell::empty(),
            hardware: OptionalCell::empty(),
        }
    }

    /// Registers the countdown peripheral. Must happen before the first
    /// [`start`](Self::start); until then scheduling fails with
    /// [`ErrorCode::NOHARDWARE`].
    pub fn register_hardware(
        &self,
        hardware: &'a C,
        _capability: &dyn InterruptMaskedCapability,
    ) {
        #[cfg(feature = "defmt")]
        defmt::debug!("countdown hardware registered");
        self.hardware.set(hardware);
    }

    /// Inserts `timer` into the schedule and keeps the countdown armed for
    /// the earliest expiry.
    ///
    /// The first expiry comes `timer.period()` ticks from now. A record
    /// that is already running is restarted: it re-enters the schedule at
    /// a freshly computed position.
    pub fn start(
        &self,
        timer: &'a SoftTimer<'a>,
        capability: &dyn InterruptMaskedCapability,
    ) -> Result<(), ErrorCode> {
        let hardware = self.hardware.ok_or(ErrorCode::NOHARDWARE)?;
        if timer.period.get() == 0 {
            return Err(ErrorCode::INVAL);
        }
        if timer.is_scheduled() {
            if !self.is_member(timer) {
                return Err(ErrorCode::NOTIMER);
            }
            self.stop(timer, capability)?;
        }

        match self.head.extract() {
            None => {
                timer.time.set(timer.period.get());
                self.head.set(timer);
                self.arm(hardware, timer.period.get());
            }
            Some(head) => {
                let now = self.timeline_now(head, hardware);
                timer
                    .time
                    .set(self.project(hardware, now, timer.period.get()));
                // project() may have rebased the whole schedule; take the
                // head's time again before comparing.
                if timer.time.get() < head.time.get() {
                    self.arm(
                        hardware,
                        timer
                            .time
                            .get()
                            .wrapping_sub(self.timeline_now(head, hardware)),
                    );
                    timer.next.set(Some(head));
                    head.prev.set(Some(timer));
                    self.head.set(timer);
                } else {
                    self.insert_after(head, timer);
                }
            }
        }
        Ok(())
    }

    /// Removes `timer` from the schedule.
    ///
    /// Stopping a record that is not scheduled (never started, or an
    /// already-expired one-shot) succeeds without touching anything.
    pub fn stop(
        &self,
        timer: &'a SoftTimer<'a>,
        _capability: &dyn InterruptMaskedCapability,
    ) -> Result<(), ErrorCode> {
        let head = match self.head.extract() {
            Some(head) => head,
            None => return Ok(()),
        };
        if !timer.is_scheduled() {
            return Ok(());
        }

        if ptr::eq(head, timer) {
            let hardware = self.hardware.ok_or(ErrorCode::NOHARDWARE)?;
            match timer.next.get() {
                Some(follow) => {
                    // Re-arm for the successor before rewriting links: the
                    // remaining interval is still expressed against the
                    // outgoing head.
                    self.arm(
                        hardware,
                        follow
                            .time
                            .get()
                            .wrapping_sub(self.timeline_now(head, hardware)),
                    );
                    follow.prev.set(None);
                    self.head.set(follow);
                }
                None => {
                    self.head.clear();
                    self.arm(hardware, 0);
                }
            }
            timer.time.set(0);
            timer.next.set(None);
        } else {
            if !self.is_member(timer) {
                return Err(ErrorCode::NOTIMER);
            }
            if let Some(prev) = timer.prev.get() {
                prev.next.set(timer.next.get());
            }
            if let Some(next) = timer.next.get() {
                next.prev.set(timer.prev.get());
            }
            timer.time.set(0);
            timer.next.set(None);
            timer.prev.set(None);
        }
        Ok(())
    }

    /// Replaces a record's parameters.
    ///
    /// A stopped record is updated in place. A running record is stopped,
    /// updated, and started again, so it re-enters the schedule at a
    /// position computed from the new period.
    pub fn update(
        &self,
        timer: &'a SoftTimer<'a>,
        period: u32,
        mode: Mode,
        client: Option<&'a dyn TimerClient>,
        token: usize,
        capability: &dyn InterruptMaskedCapability,
    ) -> Result<(), ErrorCode> {
        if period == 0 {
            return Err(ErrorCode::INVAL);
        }
        let running = timer.is_scheduled();
        if running {
            if !self.is_member(timer) {
                return Err(ErrorCode::NOTIMER);
            }
            self.stop(timer, capability)?;
        }

        timer.period.set(period);
        timer.mode.set(mode);
        timer.client.insert(client);
        timer.token.set(token);

        if running {
            self.start(timer, capability)?;
        }
        Ok(())
    }

    /// Drains every record due at the serviced instant.
    ///
    /// The countdown's expiry interrupt handler must call this. One-shot
    /// records are removed; repeating records are advanced by their period
    /// and rotated back into sorted position. The countdown is re-armed
    /// once per distinct instant, for the delta to the next one, and
    /// disarmed when the schedule empties. Clients run after the schedule
    /// bookkeeping of their record, so a client that starts or stops
    /// timers observes a consistent schedule.
    ///
    /// A spurious interrupt while nothing is scheduled is ignored.
    pub fn handle_interrupt(&self) {
        let hardware = match self.hardware.extract() {
            Some(hardware) => hardware,
            None => return,
        };
        let mut time = match self.head.extract() {
            Some(head) => head.time.get(),
            None => return,
        };

        while let Some(head) = self.head.extract() {
            if head.time.get() != time {
                break;
            }
            let client = head.client.extract();
            let token = head.token.get();

            match head.mode.get() {
                Mode::OneShot => {
                    head.time.set(0);
                    let follow = head.next.get();
                    head.next.set(None);
                    match follow {
                        Some(follow) => {
                            follow.prev.set(None);
                            self.head.set(follow);
                        }
                        None => self.head.clear(),
                    }
                }
                Mode::Repeating => {
                    let base = head.time.get();
                    let period = head.period.get();
                    let advanced = self.project(hardware, base, period);
                    // A rebase inside project() shifted every stored time;
                    // carry the serviced instant along with them.
                    time = time.wrapping_sub(base.wrapping_add(period).wrapping_sub(advanced));
                    head.time.set(advanced);
                    if let Some(follow) = head.next.get() {
                        if head.time.get() > follow.time.get() {
                            self.head.set(follow);
                            self.insert_after(follow, head);
                            follow.prev.set(None);
                        }
                    }
                }
            }

            // One arm decision per distinct instant: nothing is programmed
            // while further records share the serviced time.
            match self.head.extract() {
                Some(next_head) => {
                    if next_head.time.get() != time {
                        self.arm(hardware, next_head.time.get().wrapping_sub(time));
                    }
                }
                None => self.arm(hardware, 0),
            }

            if let Some(client) = client {
                client.fired(token);
            }
        }
    }

    /// Ticks until `timer` expires, or `None` when it is not scheduled
    /// here. Requires the same exclusion as the mutating calls.
    pub fn ticks_remaining(&self, timer: &'a SoftTimer<'a>) -> Option<u32> {
        let head = self.head.extract()?;
        let hardware = self.hardware.extract()?;
        if !timer.is_scheduled() || !self.is_member(timer) {
            return None;
        }
        Some(
            timer
                .time
                .get()
                .wrapping_sub(self.timeline_now(head, hardware)),
        )
    }

    /// Iterates the scheduled records in expiry order. Requires the same
    /// exclusion as the mutating calls.
    pub fn iter(&self) -> ScheduleIter<'a> {
        ScheduleIter {
            cursor: self.head.extract(),
        }
    }

    /// "Now" on the shared timeline: the head's stored time minus whatever
    /// is left on the countdown. Only meaningful while the schedule is
    /// non-empty.
    fn timeline_now(&self, head: &'a SoftTimer<'a>, hardware: &'a C) -> u32 {
        head.time.get().wrapping_sub(hardware.remaining())
    }

    /// Projects `base + delta` onto the shared timeline, rebasing the
    /// whole schedule first when bit 31 of the projection would be set.
    /// The result is expressed against the post-rebase timeline.
    fn project(&self, hardware: &'a C, base: u32, delta: u32) -> u32 {
        let projected = base.wrapping_add(delta);
        if projected & REBASE_GUARD == 0 {
            projected
        } else {
            projected.wrapping_sub(self.rebase(hardware))
        }
    }

    /// Subtracts the distance from the timeline origin to "now" from every
    /// scheduled record, restoring headroom below the rebase guard.
    /// Returns the applied shift.
    fn rebase(&self, hardware: &'a C) -> u32 {
        let head = match self.head.extract() {
            Some(head) => head,
            None => return 0,
        };
        let shift = self.timeline_now(head, hardware);
        #[cfg(feature = "defmt")]
        defmt::debug!("rebasing schedule by {=u32} ticks", shift);
        let mut cursor = Some(head);
        while let Some(timer) = cursor {
            timer.time.set(timer.time.get().wrapping_sub(shift));
            cursor = timer.next.get();
        }
        shift
    }

    /// Walks the schedule from `anchor` (exclusive) and splices `node`
    /// before the first follower whose time is strictly greater, or onto
    /// the tail. Equal times keep arrival order. `anchor` must sort at or
    /// before every slot `node` can take; both call sites guarantee it.
    fn insert_after(&self, anchor: &'a SoftTimer<'a>, node: &'a SoftTimer<'a>) {
        let mut at = anchor;
        loop {
            match at.next.get() {
                Some(follow) if node.time.get() < follow.time.get() => {
                    node.next.set(Some(follow));
                    node.prev.set(Some(at));
                    at.next.set(Some(node));
                    follow.prev.set(Some(node));
                    return;
                }
                Some(follow) => at = follow,
                None => {
                    at.next.set(Some(node));
                    node.next.set(None);
                    node.prev.set(Some(at));
                    return;
                }
            }
        }
    }

    fn is_member(&self, timer: &'a SoftTimer<'a>) -> bool {
        self.iter().any(|t| ptr::eq(t, timer))
    }

    fn arm(&self, hardware: &'a C, ticks: u32) {
        #[cfg(feature = "defmt")]
        defmt::trace!("arm countdown: {=u32} ticks", ticks);
        hardware.arm(ticks);
    }
}

/// Iterator over a schedule's records in expiry order.
pub struct ScheduleIter<'a> {
    cursor: Option<&'a SoftTimer<'a>>,
}

impl<'a> Iterator for ScheduleIter<'a> {
    type Item = &'a SoftTimer<'a>;

    fn next(&mut self) -> Option<&'a SoftTimer<'a>> {
        let timer = self.cursor?;
        self.cursor = timer.next.get();
        Some(timer)
    }
}
