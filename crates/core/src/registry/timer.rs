use slidesync_protocol::Millis;

/// Deferred work an instance can have pending. At most one of each kind is
/// armed at a time; re-arming replaces the previous deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Deferred first initialization, then the engine-load poll.
    Init,
    /// Next autoplay advance.
    Autoplay,
    /// Re-enable interaction after a reveal has settled.
    Unlock,
    /// Force-complete a transition the engine never reported finished.
    Watchdog,
    /// Re-measure overlays after a slide change.
    Settle,
    /// Debounced viewport resize.
    Resize,
}

impl Timer {
    const ALL: [Timer; 6] = [
        Timer::Init,
        Timer::Autoplay,
        Timer::Unlock,
        Timer::Watchdog,
        Timer::Settle,
        Timer::Resize,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Cancellable deadlines for one instance, fired by the host's clock.
#[derive(Debug, Default)]
pub struct Timers {
    due: [Option<Millis>; Timer::ALL.len()],
}

impl Timers {
    pub fn arm(&mut self, timer: Timer, at: Millis) {
        self.due[timer.slot()] = Some(at);
    }

    pub fn cancel(&mut self, timer: Timer) {
        self.due[timer.slot()] = None;
    }

    pub fn is_armed(&self, timer: Timer) -> bool {
        self.due[timer.slot()].is_some()
    }

    pub fn clear(&mut self) {
        self.due = Default::default();
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.due.iter().flatten().copied().min()
    }

    /// Disarm and return the earliest timer due at or before `now`.
    /// Ties fire in declaration order.
    pub fn take_due(&mut self, now: Millis) -> Option<Timer> {
        let timer = Timer::ALL
            .into_iter()
            .filter_map(|t| self.due[t.slot()].map(|at| (at, t)))
            .filter(|&(at, _)| at <= now)
            .min_by_key(|&(at, t)| (at, t.slot()))
            .map(|(_, t)| t)?;
        self.cancel(timer);
        Some(timer)
    }
}
