use std::time::Duration;

pub const PAGE_DELAY: Duration = Duration::from_millis(500);
pub const DELETE_DELAY: Duration = Duration::from_secs(1);

/// Blocking delay between remote calls.
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pub pauses: Vec<Duration>,
}

#[cfg(test)]
impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}
