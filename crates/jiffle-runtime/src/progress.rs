//! Progress reporting.
//!
//! A pass over the evaluation bounds reports to a [`ProgressListener`].
//! For a pass that completes, the listener sees:
//!
//! ```text
//! set_task_size(total) → start() → update(n)+ → finish()
//! ```
//!
//! `start` and `finish` are called exactly once, `update` at least once,
//! and the last `update` always carries the final pixel count. Calls are
//! made on the evaluating thread.

use crate::config::UpdateInterval;

/// Receives progress from an evaluation pass.
pub trait ProgressListener: Send {
    /// Total number of pixels the pass will evaluate. Called before `start`.
    fn set_task_size(&mut self, _total: u64) {}

    /// Update granularity; `None` uses the unit's configured interval.
    fn update_interval(&self) -> Option<UpdateInterval> {
        None
    }

    fn start(&mut self);

    /// Pixels processed so far.
    fn update(&mut self, done: u64);

    fn finish(&mut self);
}

/// Listener that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressListener;

impl ProgressListener for NullProgressListener {
    fn start(&mut self) {}
    fn update(&mut self, _done: u64) {}
    fn finish(&mut self) {}
}

/// Drives a listener through one pass.
pub(crate) struct Progress<'a> {
    listener: &'a mut dyn ProgressListener,
    step: u64,
    done: u64,
    last_reported: Option<u64>,
}

impl<'a> Progress<'a> {
    /// Announce the task and call `start`.
    pub(crate) fn start(
        listener: &'a mut dyn ProgressListener,
        total: u64,
        default_interval: UpdateInterval,
    ) -> Self {
        let interval = listener.update_interval().unwrap_or(default_interval);
        listener.set_task_size(total);
        listener.start();
        Self {
            listener,
            step: interval.step(total),
            done: 0,
            last_reported: None,
        }
    }

    /// Count one pixel.
    pub(crate) fn tick(&mut self) {
        self.done += 1;
        if self.done % self.step == 0 {
            self.listener.update(self.done);
            self.last_reported = Some(self.done);
        }
    }

    /// Report the final count if it has not been reported, then `finish`.
    pub(crate) fn finish(self) {
        if self.last_reported != Some(self.done) {
            self.listener.update(self.done);
        }
        self.listener.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        interval: Option<UpdateInterval>,
        events: Vec<String>,
    }

    impl ProgressListener for Recorder {
        fn set_task_size(&mut self, total: u64) {
            self.events.push(format!("size {}", total));
        }
        fn update_interval(&self) -> Option<UpdateInterval> {
            self.interval
        }
        fn start(&mut self) {
            self.events.push("start".into());
        }
        fn update(&mut self, done: u64) {
            self.events.push(format!("update {}", done));
        }
        fn finish(&mut self) {
            self.events.push("finish".into());
        }
    }

    fn drive(recorder: &mut Recorder, total: u64) {
        let mut progress = Progress::start(recorder, total, UpdateInterval::Fraction(0.5));
        for _ in 0..total {
            progress.tick();
        }
        progress.finish();
    }

    #[test]
    fn test_fraction_interval() {
        let mut recorder = Recorder::default();
        drive(&mut recorder, 4);
        assert_eq!(
            recorder.events,
            vec!["size 4", "start", "update 2", "update 4", "finish"]
        );
    }

    #[test]
    fn test_final_count_always_reported() {
        let mut recorder = Recorder {
            interval: Some(UpdateInterval::Pixels(3)),
            ..Default::default()
        };
        drive(&mut recorder, 7);
        assert_eq!(
            recorder.events,
            vec!["size 7", "start", "update 3", "update 6", "update 7", "finish"]
        );
    }

    #[test]
    fn test_empty_task_still_updates_once() {
        let mut recorder = Recorder::default();
        drive(&mut recorder, 0);
        assert_eq!(recorder.events, vec!["size 0", "start", "update 0", "finish"]);
    }
}
