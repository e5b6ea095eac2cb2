use std::time::Duration;

use log::debug;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

pub const REST_TIMER_PERIOD: Duration = Duration::from_secs(1);

/// Periodic tick source driving the rest timer.
///
/// One `()` is sent per period, the first one after a full period. The
/// schedule is cancelled when the task is dropped or the receiver is closed.
pub struct TimerTask {
    handle: JoinHandle<()>,
}

impl TimerTask {
    #[must_use]
    pub fn spawn(period: Duration) -> (Self, mpsc::Receiver<()>) {
        let (sender, receiver) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if sender.send(()).await.is_err() {
                    debug!("timer receiver closed");
                    break;
                }
            }
        });
        (Self { handle }, receiver)
    }

    #[must_use]
    pub fn rest_timer() -> (Self, mpsc::Receiver<()>) {
        Self::spawn(REST_TIMER_PERIOD)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TimerTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use gymbook_domain::RestTimer;
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_drive_rest_timer() {
        let (_task, mut ticks) = TimerTask::rest_timer();
        let mut timer = RestTimer::default();
        let start = Instant::now();

        ticks.recv().await.unwrap();
        timer.tick();
        assert_eq!(timer.elapsed(), 0);
        assert_eq!(start.elapsed(), REST_TIMER_PERIOD);

        timer.start();
        for _ in 0..65 {
            ticks.recv().await.unwrap();
            timer.tick();
        }
        assert_eq!(timer.format(), "01:05");

        timer.reset();
        ticks.recv().await.unwrap();
        timer.tick();
        assert_eq!(timer.elapsed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_schedule() {
        let (task, mut ticks) = TimerTask::spawn(Duration::from_millis(10));
        ticks.recv().await.unwrap();
        drop(task);
        assert_eq!(ticks.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_receiver_stops_task() {
        let (task, ticks) = TimerTask::spawn(Duration::from_millis(10));
        drop(ticks);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(task.is_finished());
    }
}
