/// Elapsed-seconds counter shown between sets.
///
/// The counter is advanced by calling [`RestTimer::tick`] once per second; it
/// only moves while running. It is never persisted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RestTimer {
    elapsed: u32,
    running: bool,
}

impl RestTimer {
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
        self.running = false;
    }

    pub fn tick(&mut self) {
        if self.running {
            self.elapsed = self.elapsed.saturating_add(1);
        }
    }

    /// `MM:SS`, minutes are not wrapped at one hour.
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:02}:{:02}", self.elapsed / 60, self.elapsed % 60)
    }
}
