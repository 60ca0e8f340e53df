// ── Notification poller ──
//
// One background task per signed-in user. The task owns the unread tracker
// and is the only writer of the snapshot channel; the handle reads
// snapshots, forwards mutations to the source, and asks the task for an
// immediate re-fetch through a `Notify`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use assetly_api::{Notification, NotificationId, UserId};

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::CoreError;
use crate::fetch::NotificationSource;
use crate::route::Route;

use super::tone::{Chime, Tone};
use super::tracker::UnreadTracker;

/// How many notifications the dropdown preview shows.
pub const RECENT_LIMIT: usize = 5;

/// Latest view of the user's notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationSnapshot {
    pub unread: Vec<Notification>,
    /// Read and unread. Loaded on start and after every mutation.
    pub all: Vec<Notification>,
    /// When the last successful fetch completed.
    pub fetched_at: Option<DateTime<Utc>>,
    /// Successful fetches so far.
    pub refreshes: u64,
    /// Alerts raised so far.
    pub alerts: u64,
}

impl NotificationSnapshot {
    pub fn unread_count(&self) -> usize {
        self.unread.len()
    }

    /// Up to `limit` unread notifications, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Notification> {
        newest_first(self.unread.clone(), limit)
    }
}

/// Sort by creation time, newest first, and keep at most `limit`.
/// Notifications without a timestamp sort last.
pub fn newest_first(mut notifications: Vec<Notification>, limit: usize) -> Vec<Notification> {
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notifications.truncate(limit);
    notifications
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling { user: UserId },
}

// ── NotificationPoller ───────────────────────────────────────────────

/// Spawns polling tasks.
pub struct NotificationPoller<S, C> {
    source: Arc<S>,
    chime: Arc<C>,
    interval: Duration,
}

impl<S: NotificationSource, C: Chime> NotificationPoller<S, C> {
    pub fn new(source: Arc<S>, chime: Arc<C>) -> Self {
        Self {
            source,
            chime,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Poll period. A zero period falls back to the default.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling for `user`. The first fetch happens right away.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(&self, user: UserId) -> PollHandle<S> {
        let cancel = CancellationToken::new();
        let refresh = Arc::new(Notify::new());
        let full_refresh = Arc::new(AtomicBool::new(true));
        let (tx, rx) = watch::channel(NotificationSnapshot::default());

        let task = tokio::spawn(poll_task(PollTask {
            user,
            source: Arc::clone(&self.source),
            chime: Arc::clone(&self.chime),
            tone: Tone::default(),
            period: self.interval,
            refresh: Arc::clone(&refresh),
            full_refresh: Arc::clone(&full_refresh),
            snapshot: tx,
            cancel: cancel.clone(),
        }));
        info!(user, interval = ?self.interval, "notification polling started");

        PollHandle {
            user,
            source: Arc::clone(&self.source),
            refresh,
            full_refresh,
            snapshot: rx,
            cancel,
            task: Some(task),
        }
    }
}

// ── PollHandle ───────────────────────────────────────────────────────

/// Owner of a running poll task. Dropping the handle cancels polling.
pub struct PollHandle<S> {
    user: UserId,
    source: Arc<S>,
    refresh: Arc<Notify>,
    full_refresh: Arc<AtomicBool>,
    snapshot: watch::Receiver<NotificationSnapshot>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<S: NotificationSource> PollHandle<S> {
    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn state(&self) -> PollerState {
        let running = !self.cancel.is_cancelled()
            && self.task.as_ref().is_some_and(|t| !t.is_finished());
        if running {
            PollerState::Polling { user: self.user }
        } else {
            PollerState::Idle
        }
    }

    /// Request an immediate fetch, as regaining window focus would.
    pub fn focus(&self) {
        self.refresh.notify_one();
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that sees every snapshot the task publishes.
    pub fn subscribe(&self) -> watch::Receiver<NotificationSnapshot> {
        self.snapshot.clone()
    }

    pub fn unread_count(&self) -> usize {
        self.snapshot.borrow().unread_count()
    }

    /// Up to `limit` unread notifications, newest first. The dropdown
    /// preview uses [`RECENT_LIMIT`].
    pub fn recent_unread(&self, limit: usize) -> Vec<Notification> {
        self.snapshot.borrow().recent(limit)
    }

    /// Read and unread notifications as of the last full fetch.
    pub fn all_notifications(&self) -> Vec<Notification> {
        self.snapshot.borrow().all.clone()
    }

    /// Re-fetch both lists on the next wake-up, and wake the task now.
    fn refetch_all(&self) {
        self.full_refresh.store(true, Ordering::Release);
        self.refresh.notify_one();
    }

    /// Mark one notification read, then re-fetch both lists.
    ///
    /// The local snapshot is left alone until the re-fetch lands, so a
    /// failure leaves the list exactly as it was.
    pub async fn mark_as_read(&self, id: NotificationId) -> Result<(), CoreError> {
        match self.source.mark_read(id).await {
            Ok(()) => {
                debug!(id, "notification marked read");
                self.refetch_all();
                Ok(())
            }
            Err(e) => {
                warn!(id, error = %e, "failed to mark notification read");
                Err(e)
            }
        }
    }

    /// Delete one notification, then re-fetch both lists.
    pub async fn delete(&self, id: NotificationId) -> Result<(), CoreError> {
        match self.source.delete(id).await {
            Ok(()) => {
                debug!(id, "notification deleted");
                self.refetch_all();
                Ok(())
            }
            Err(e) => {
                warn!(id, error = %e, "failed to delete notification");
                Err(e)
            }
        }
    }

    /// Where "view all" leads.
    pub fn open_all(&self) -> Route {
        Route::Notifications
    }

    /// Cancel polling and wait for the task to wind down.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "notification poll task ended abnormally");
            }
        }
        info!(user = self.user, "notification polling stopped");
    }
}

impl<S> Drop for PollHandle<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background task ──────────────────────────────────────────────────

struct PollTask<S, C> {
    user: UserId,
    source: Arc<S>,
    chime: Arc<C>,
    tone: Tone,
    period: Duration,
    refresh: Arc<Notify>,
    /// Set when the next fetch must include the full list.
    full_refresh: Arc<AtomicBool>,
    snapshot: watch::Sender<NotificationSnapshot>,
    cancel: CancellationToken,
}

async fn poll_task<S: NotificationSource, C: Chime>(task: PollTask<S, C>) {
    let PollTask {
        user,
        source,
        chime,
        tone,
        period,
        refresh,
        full_refresh,
        snapshot,
        cancel,
    } = task;

    let mut tracker = UnreadTracker::new();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // The first interval tick completes immediately: fetch on start.
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = refresh.notified() => {}
            _ = interval.tick() => {}
        }

        let include_all = full_refresh.swap(false, Ordering::AcqRel);

        // A response still in flight when cancelled is dropped unseen.
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = fetch(&*source, user, include_all) => result,
        };

        match result {
            Ok((unread, all)) => {
                let alert = tracker.observe(unread.len());
                if alert {
                    debug!(user, count = unread.len(), "new notifications");
                    if let Err(e) = chime.play(&tone) {
                        debug!(error = %e, "alert tone failed");
                    }
                }
                snapshot.send_modify(|snap| {
                    snap.unread = unread;
                    if let Some(all) = all {
                        snap.all = all;
                    }
                    snap.fetched_at = Some(Utc::now());
                    snap.refreshes += 1;
                    if alert {
                        snap.alerts += 1;
                    }
                });
            }
            Err(e) => {
                if include_all {
                    full_refresh.store(true, Ordering::Release);
                }
                warn!(user, error = %e, "notification poll failed");
            }
        }
    }
    debug!(user, "notification poll task exiting");
}

/// Unread list, plus the full list when `include_all` is set. Either
/// failing fails the whole fetch.
async fn fetch<S: NotificationSource>(
    source: &S,
    user: UserId,
    include_all: bool,
) -> Result<(Vec<Notification>, Option<Vec<Notification>>), CoreError> {
    if include_all {
        let (unread, all) = tokio::join!(
            source.unread_notifications(user),
            source.notifications(user)
        );
        Ok((unread?, Some(all?)))
    } else {
        Ok((source.unread_notifications(user).await?, None))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assetly_api::NotificationType;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use crate::notify::tone::{ChimeError, SilentChime};
    use super::*;

    fn note(id: NotificationId, minute: u32) -> Notification {
        Notification {
            id,
            user_id: 1,
            title: format!("n{id}"),
            message: String::new(),
            kind: NotificationType::MaintenanceDue,
            is_read: false,
            created_at: Some(Utc.with_ymd_and_hms(2025, 7, 1, 8, minute, 0).unwrap()),
            link: None,
        }
    }

    fn notes(count: usize) -> Vec<Notification> {
        (0..count)
            .map(|i| note(i64::try_from(i).unwrap(), u32::try_from(i % 60).unwrap()))
            .collect()
    }

    /// Replays scripted unread counts; the last entry repeats forever.
    #[derive(Default)]
    struct ScriptedSource {
        script: Mutex<VecDeque<Option<usize>>>,
        last: Mutex<Option<usize>>,
        calls: AtomicUsize,
        full_calls: AtomicUsize,
        marked: Mutex<Vec<NotificationId>>,
        fail_mutations: bool,
        latency: Option<Duration>,
    }

    impl ScriptedSource {
        fn new(script: &[Option<usize>]) -> Self {
            Self {
                script: Mutex::new(script.iter().copied().collect()),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn full_calls(&self) -> usize {
            self.full_calls.load(Ordering::SeqCst)
        }

        fn next(&self) -> Option<usize> {
            let mut script = self.script.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            if let Some(step) = script.pop_front() {
                *last = step;
                step
            } else {
                *last
            }
        }
    }

    impl NotificationSource for ScriptedSource {
        async fn notifications(&self, _user_id: UserId) -> Result<Vec<Notification>, CoreError> {
            let call = self.full_calls.fetch_add(1, Ordering::SeqCst);
            Ok(notes(call + 1))
        }

        async fn unread_notifications(
            &self,
            _user_id: UserId,
        ) -> Result<Vec<Notification>, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            self.next().map(notes).ok_or(CoreError::Timeout)
        }

        async fn mark_read(&self, id: NotificationId) -> Result<(), CoreError> {
            if self.fail_mutations {
                return Err(CoreError::Api {
                    message: "boom".into(),
                    status: Some(500),
                });
            }
            self.marked.lock().unwrap().push(id);
            Ok(())
        }

        async fn delete(&self, id: NotificationId) -> Result<(), CoreError> {
            self.mark_read(id).await
        }
    }

    #[derive(Default)]
    struct CountingChime {
        plays: AtomicUsize,
        fail: bool,
    }

    impl Chime for CountingChime {
        fn play(&self, _tone: &Tone) -> Result<(), ChimeError> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ChimeError::Unavailable("no device".into()))
            } else {
                Ok(())
            }
        }
    }

    fn poller(
        source: ScriptedSource,
        chime: CountingChime,
    ) -> (
        NotificationPoller<ScriptedSource, CountingChime>,
        Arc<ScriptedSource>,
        Arc<CountingChime>,
    ) {
        let source = Arc::new(source);
        let chime = Arc::new(chime);
        let poller = NotificationPoller::new(Arc::clone(&source), Arc::clone(&chime))
            .with_interval(Duration::from_secs(10));
        (poller, source, chime)
    }

    #[tokio::test(start_paused = true)]
    async fn one_alert_for_one_increase() {
        let (poller, _source, chime) =
            poller(ScriptedSource::new(&[Some(3), Some(5), Some(5), Some(2)]), CountingChime::default());
        let handle = poller.start(1);
        let mut rx = handle.subscribe();

        rx.wait_for(|s| s.refreshes >= 4).await.unwrap();

        assert_eq!(chime.plays.load(Ordering::SeqCst), 1);
        assert_eq!(handle.snapshot().alerts, 1);
        assert_eq!(handle.unread_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn first_load_never_alerts() {
        let (poller, _source, chime) =
            poller(ScriptedSource::new(&[Some(12)]), CountingChime::default());
        let handle = poller.start(1);
        let mut rx = handle.subscribe();

        rx.wait_for(|s| s.refreshes >= 3).await.unwrap();
        assert_eq!(chime.plays.load(Ordering::SeqCst), 0);
        assert_eq!(handle.state(), PollerState::Polling { user: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_previous_state() {
        let (poller, source, chime) =
            poller(ScriptedSource::new(&[Some(2), None]), CountingChime::default());
        let handle = poller.start(1);

        tokio::time::sleep(Duration::from_secs(35)).await;

        assert!(source.calls() >= 3);
        assert_eq!(handle.unread_count(), 2);
        assert_eq!(handle.snapshot().refreshes, 1);
        assert_eq!(chime.plays.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_does_not_reset_change_detection() {
        let (poller, _source, chime) = poller(
            ScriptedSource::new(&[Some(2), None, Some(3)]),
            CountingChime::default(),
        );
        let handle = poller.start(1);
        let mut rx = handle.subscribe();

        rx.wait_for(|s| s.refreshes >= 2).await.unwrap();
        assert_eq!(chime.plays.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn chime_failure_is_swallowed() {
        let chime = CountingChime {
            fail: true,
            ..CountingChime::default()
        };
        let (poller, _source, chime) =
            poller(ScriptedSource::new(&[Some(1), Some(2), Some(3)]), chime);
        let handle = poller.start(1);
        let mut rx = handle.subscribe();

        rx.wait_for(|s| s.refreshes >= 3).await.unwrap();
        assert_eq!(chime.plays.load(Ordering::SeqCst), 2);
        assert_eq!(handle.state(), PollerState::Polling { user: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn focus_fetches_immediately() {
        let (poller, source, _chime) =
            poller(ScriptedSource::new(&[Some(1)]), CountingChime::default());
        let handle = poller.start(1);
        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.refreshes >= 1).await.unwrap();

        handle.focus();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| s.refreshes >= 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_polling() {
        let (poller, source, _chime) =
            poller(ScriptedSource::new(&[Some(1)]), CountingChime::default());
        let handle = poller.start(1);
        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.refreshes >= 1).await.unwrap();

        handle.stop().await;
        let calls = source.calls();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_and_discards_in_flight_response() {
        let source = ScriptedSource {
            latency: Some(Duration::from_secs(5)),
            ..ScriptedSource::new(&[Some(4)])
        };
        let (poller, source, _chime) = poller(source, CountingChime::default());
        let handle = poller.start(1);
        let rx = handle.subscribe();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 1);
        drop(handle);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(rx.borrow().refreshes, 0);
        assert!(rx.borrow().unread.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn mark_as_read_refetches() {
        let (poller, source, _chime) =
            poller(ScriptedSource::new(&[Some(3), Some(2)]), CountingChime::default());
        let handle = poller.start(1);
        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.refreshes >= 1).await.unwrap();

        handle.mark_as_read(2).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| s.refreshes >= 2))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(*source.marked.lock().unwrap(), vec![2]);
        assert_eq!(handle.unread_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn full_list_loads_on_start_and_after_mutations_only() {
        let (poller, source, _chime) =
            poller(ScriptedSource::new(&[Some(3)]), CountingChime::default());
        let handle = poller.start(1);
        let mut rx = handle.subscribe();

        rx.wait_for(|s| s.refreshes >= 3).await.unwrap();
        assert_eq!(source.full_calls(), 1);
        assert_eq!(handle.all_notifications().len(), 1);

        handle.delete(0).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| s.refreshes >= 4))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(source.full_calls(), 2);
        assert_eq!(handle.all_notifications().len(), 2);

        handle.focus();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| s.refreshes >= 5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(source.full_calls(), 2);

        handle.mark_as_read(1).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| s.refreshes >= 6))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(source.full_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn recent_unread_is_newest_first_from_live_handle() {
        let (poller, _source, _chime) =
            poller(ScriptedSource::new(&[Some(8)]), CountingChime::default());
        let handle = poller.start(1);
        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.refreshes >= 1).await.unwrap();

        let ids: Vec<_> = handle
            .recent_unread(RECENT_LIMIT)
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
        assert_eq!(handle.recent_unread(20).len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_mutation_leaves_snapshot_untouched() {
        let source = ScriptedSource {
            fail_mutations: true,
            ..ScriptedSource::new(&[Some(3)])
        };
        let (poller, _source, _chime) = poller(source, CountingChime::default());
        let handle = poller.start(1);
        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.refreshes >= 1).await.unwrap();

        assert!(handle.mark_as_read(0).await.is_err());
        assert!(handle.delete(1).await.is_err());
        assert_eq!(handle.unread_count(), 3);
        assert_eq!(handle.open_all(), Route::Notifications);
    }

    #[test]
    fn newest_first_puts_undated_last() {
        let mut undated = note(99, 0);
        undated.created_at = None;
        let mut list = notes(3);
        list.insert(0, undated);

        let ids: Vec<_> = newest_first(list, RECENT_LIMIT).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 1, 0, 99]);
    }

    #[test]
    fn zero_interval_uses_default() {
        let poller = NotificationPoller::new(
            Arc::new(ScriptedSource::default()),
            Arc::new(SilentChime),
        )
        .with_interval(Duration::ZERO);
        assert_eq!(poller.interval(), DEFAULT_POLL_INTERVAL);
    }
}
