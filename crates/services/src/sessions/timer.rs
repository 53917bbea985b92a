use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use trivia_core::session::QuestionTicket;

use super::events::SessionEvent;

/// A spawned task that can be silenced and aborted.
///
/// Once `cancel` returns, the task never sends another event: the flag is checked right
/// before every send and the task is aborted at its next await point.
#[derive(Debug)]
struct ScheduledTask {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    fn spawn<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Arc<AtomicBool>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(body(Arc::clone(&cancelled)));
        Self { cancelled, handle }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.handle.abort();
    }

    fn is_running(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire) && !self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn send_unless_cancelled(
    cancelled: &AtomicBool,
    events: &UnboundedSender<SessionEvent>,
    event: SessionEvent,
) -> bool {
    if cancelled.load(Ordering::Acquire) {
        return false;
    }
    events.send(event).is_ok()
}

/// Per-question countdown. Holds at most one running task.
#[derive(Debug, Default)]
pub struct CountdownTimer {
    task: Option<ScheduledTask>,
}

impl CountdownTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `SessionEvent::Tick { ticket }` once per second, `seconds` times.
    ///
    /// Any countdown already running is cancelled first. Must be called inside a tokio
    /// runtime.
    pub fn start(
        &mut self,
        seconds: u32,
        ticket: QuestionTicket,
        events: UnboundedSender<SessionEvent>,
    ) {
        self.cancel();
        self.task = Some(ScheduledTask::spawn(move |cancelled| async move {
            let period = Duration::from_secs(1);
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            for _ in 0..seconds {
                interval.tick().await;
                if !send_unless_cancelled(&cancelled, &events, SessionEvent::Tick { ticket }) {
                    return;
                }
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(ScheduledTask::is_running)
    }
}

/// The short pause between locking an answer and showing the next question.
#[derive(Debug, Default)]
pub struct DelayedAdvance {
    task: Option<ScheduledTask>,
}

impl DelayedAdvance {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `SessionEvent::AdvanceDue { ticket }` after `delay`, replacing any pending one.
    pub fn start(
        &mut self,
        delay: Duration,
        ticket: QuestionTicket,
        events: UnboundedSender<SessionEvent>,
    ) {
        self.cancel();
        self.task = Some(ScheduledTask::spawn(move |cancelled| async move {
            tokio::time::sleep(delay).await;
            send_unless_cancelled(&cancelled, &events, SessionEvent::AdvanceDue { ticket });
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(ScheduledTask::is_running)
    }
}
