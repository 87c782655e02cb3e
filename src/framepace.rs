use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use winit::window::Window;

use crate::driver::{FrameHandle, FrameScheduler};

/// Schedules ticks on the window's redraw requests.
///
/// Holds a single pending slot, the host claims it with `take_due` when the
/// window reports `RedrawRequested`.
#[derive(Default)]
pub struct DisplayScheduler {
    window: Option<Arc<Window>>,
    next: u64,
    pending: Option<FrameHandle>,
}

impl DisplayScheduler {
    pub fn attach(&mut self, window: Arc<Window>) {
        if self.pending.is_some() {
            window.request_redraw();
        }
        self.window = Some(window);
    }

    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for DisplayScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);

        if let Some(window) = &self.window {
            window.request_redraw();
        }

        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

pub struct Framepacer {
    instants: [Instant; 2],
    current: usize,
}

impl Framepacer {
    pub fn new() -> Self {
        Self {
            instants: [Instant::now(); 2],
            current: 0,
        }
    }

    pub fn frametime(&self) -> f32 {
        self.instants[self.current].elapsed().as_secs_f32()
    }

    /// Rate measured over the last full frame
    pub fn framerate(&self) -> f32 {
        let last = self.instants[self.current]
            .saturating_duration_since(self.instants[self.next()])
            .as_secs_f32();

        if last > 0.0 {
            1.0 / last
        } else {
            0.0
        }
    }

    pub fn begin_frame(&mut self) {
        self.current = self.next();
        self.instants[self.current] = Instant::now();
    }

    /// Sleeps out the rest of the frame when a cap is set
    pub fn end_frame(&mut self, framerate: Option<u32>) {
        let Some(limit_frametime) = framerate.filter(|f| *f > 0).map(|f| 1.0 / f as f32) else {
            return;
        };

        const ACCURACY: f32 = 0.0001; // 100 microseconds
        let sleep_time = limit_frametime - self.frametime() - ACCURACY;

        if sleep_time > 0.0 {
            std::thread::sleep(Duration::from_secs_f32(sleep_time));

            while self.frametime() < limit_frametime {
                std::thread::yield_now();
            }
        }
    }

    fn next(&self) -> usize {
        (self.current + 1) % 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_keeps_one_pending_frame() {
        let mut scheduler = DisplayScheduler::default();
        let first = scheduler.request_frame();
        let second = scheduler.request_frame();
        assert_ne!(first, second);

        // cancelling a superseded handle leaves the newer one alone
        scheduler.cancel_frame(first);
        assert_eq!(scheduler.take_due(), Some(second));
        assert_eq!(scheduler.take_due(), None);
    }

    #[test]
    fn cancelled_frame_is_never_due() {
        let mut scheduler = DisplayScheduler::default();
        let handle = scheduler.request_frame();
        scheduler.cancel_frame(handle);
        assert_eq!(scheduler.take_due(), None);
    }

    #[test]
    fn frame_cap_paces_frames() {
        let mut pacer = Framepacer::new();
        pacer.begin_frame();
        pacer.end_frame(Some(100));
        assert!(pacer.frametime() >= 0.01);

        pacer.begin_frame();
        assert!(pacer.framerate() > 0.0 && pacer.framerate() <= 100.5);
    }

    #[test]
    fn no_rate_before_the_first_frame() {
        assert_eq!(Framepacer::new().framerate(), 0.0);
    }
}
