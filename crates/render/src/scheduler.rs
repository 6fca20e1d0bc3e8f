/// Whether a frame callback is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderState {
    #[default]
    Idle,
    Pending,
}

/// The host's "run a frame before the next display refresh" primitive:
/// `requestAnimationFrame` in a browser, `Window::request_redraw` under winit.
///
/// Scheduling is fire-and-forget; the host later delivers one frame callback
/// which the owner answers with [`RenderScheduler::run_if_pending`].
pub trait FrameHost {
    fn schedule_frame(&self);
}

impl<F: Fn()> FrameHost for F {
    fn schedule_frame(&self) {
        self()
    }
}

/// Result of [`RenderScheduler::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A new frame callback was scheduled with the host.
    Scheduled,
    /// A frame was already pending and will serve this request too.
    Coalesced,
}

/// Counters for instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub requests: u64,
    pub scheduled: u64,
    pub coalesced: u64,
    pub frames: u64,
}

/// Single-slot coalescing render request queue.
///
/// Every trigger (input, resize, texture load) calls [`request`]; only the
/// first request after a frame reaches the host. The frame callback calls
/// [`run_if_pending`] first thing, before drawing.
///
/// [`request`]: RenderScheduler::request
/// [`run_if_pending`]: RenderScheduler::run_if_pending
#[derive(Debug, Default)]
pub struct RenderScheduler {
    state: RenderState,
    stats: SchedulerStats,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == RenderState::Pending
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Ask for a frame. Schedules one with `host` unless one is already pending.
    pub fn request<H: FrameHost + ?Sized>(&mut self, host: &H) -> RequestOutcome {
        self.stats.requests += 1;
        match self.state {
            RenderState::Pending => {
                self.stats.coalesced += 1;
                tracing::trace!("render request coalesced");
                RequestOutcome::Coalesced
            }
            RenderState::Idle => {
                self.state = RenderState::Pending;
                self.stats.scheduled += 1;
                host.schedule_frame();
                tracing::trace!("render frame scheduled");
                RequestOutcome::Scheduled
            }
        }
    }

    /// Frame callback entry: returns `true` and goes back to `Idle` if a
    /// frame was pending. Call before drawing.
    pub fn run_if_pending(&mut self) -> bool {
        match self.state {
            RenderState::Idle => false,
            RenderState::Pending => {
                self.state = RenderState::Idle;
                self.stats.frames += 1;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn starts_idle() {
        let scheduler = RenderScheduler::new();
        assert_eq!(scheduler.state(), RenderState::Idle);
        assert_eq!(scheduler.stats(), SchedulerStats::default());
    }

    #[test]
    fn burst_of_requests_schedules_once() {
        let scheduled = Cell::new(0);
        let host = || scheduled.set(scheduled.get() + 1);
        let mut scheduler = RenderScheduler::new();

        assert_eq!(scheduler.request(&host), RequestOutcome::Scheduled);
        for _ in 0..9 {
            assert_eq!(scheduler.request(&host), RequestOutcome::Coalesced);
        }
        assert_eq!(scheduled.get(), 1);

        assert!(scheduler.run_if_pending());
        assert!(!scheduler.run_if_pending());

        let stats = scheduler.stats();
        assert_eq!(stats.requests, 10);
        assert_eq!(stats.scheduled, 1);
        assert_eq!(stats.coalesced, 9);
        assert_eq!(stats.frames, 1);
    }

    #[test]
    fn request_while_pending_changes_nothing() {
        let scheduled = Cell::new(0);
        let host = || scheduled.set(scheduled.get() + 1);
        let mut scheduler = RenderScheduler::new();

        scheduler.request(&host);
        let before = scheduler.state();
        scheduler.request(&host);
        assert_eq!(scheduler.state(), before);
        assert_eq!(scheduled.get(), 1);
    }

    #[test]
    fn request_during_frame_schedules_another() {
        let scheduled = Cell::new(0);
        let host = || scheduled.set(scheduled.get() + 1);
        let mut scheduler = RenderScheduler::new();

        scheduler.request(&host);
        assert!(scheduler.run_if_pending());
        // Still inside the frame: drawing raised another request.
        assert_eq!(scheduler.request(&host), RequestOutcome::Scheduled);
        assert_eq!(scheduled.get(), 2);

        assert!(scheduler.run_if_pending());
        assert!(!scheduler.run_if_pending());
        assert_eq!(scheduler.stats().frames, 2);
    }

    #[test]
    fn unrequested_callback_is_ignored() {
        let mut scheduler = RenderScheduler::new();
        assert!(!scheduler.run_if_pending());
        assert_eq!(scheduler.state(), RenderState::Idle);
    }
}
