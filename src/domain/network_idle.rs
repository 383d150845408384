//! Network-idle detection used as the page-load completion signal.
//!
//! Page scripts keep fetching data after the `load` event, so a page is only
//! considered ready once the number of in-flight requests has stayed at or
//! below a threshold for a continuous window.

use std::collections::HashSet;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::Instant;

/// A network event observed on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkActivity {
    /// A request with the given id was issued.
    Started(String),
    /// A request finished, failed or was served from cache.
    Settled(String),
}

/// Tracks in-flight requests and decides when the page went quiet.
#[derive(Debug)]
pub struct NetworkIdleTracker {
    in_flight: HashSet<String>,
    max_in_flight: usize,
    window: Duration,
    quiet_since: Option<Instant>,
}

impl NetworkIdleTracker {
    /// Creates a tracker that starts quiet at `now`.
    pub fn new(max_in_flight: usize, window: Duration, now: Instant) -> Self {
        Self {
            in_flight: HashSet::new(),
            max_in_flight,
            window,
            quiet_since: Some(now),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn observe(&mut self, activity: NetworkActivity, now: Instant) {
        match activity {
            NetworkActivity::Started(id) => {
                self.in_flight.insert(id);
            }
            NetworkActivity::Settled(id) => {
                self.in_flight.remove(&id);
            }
        }

        if self.in_flight.len() > self.max_in_flight {
            self.quiet_since = None;
        } else if self.quiet_since.is_none() {
            self.quiet_since = Some(now);
        }
    }

    /// Instant at which the page becomes idle if nothing else happens.
    ///
    /// `None` while too many requests are in flight.
    pub fn idle_at(&self) -> Option<Instant> {
        self.quiet_since.map(|since| since + self.window)
    }

    pub fn is_idle(&self, now: Instant) -> bool {
        self.idle_at().is_some_and(|at| now >= at)
    }
}

/// Waits until `activity` has been quiet long enough.
///
/// Returns early if the stream ends, which happens when the page goes away.
/// Callers bound the total wait with their own timeout.
pub async fn wait_for_idle<S>(mut activity: S, max_in_flight: usize, window: Duration)
where
    S: Stream<Item = NetworkActivity> + Unpin,
{
    let mut tracker = NetworkIdleTracker::new(max_in_flight, window, Instant::now());

    loop {
        let now = Instant::now();
        if tracker.is_idle(now) {
            return;
        }

        let wake = tracker.idle_at().unwrap_or(now + window);

        tokio::select! {
            event = activity.next() => match event {
                Some(event) => tracker.observe(event, Instant::now()),
                None => return,
            },
            _ = tokio::time::sleep_until(wake) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;

    const WINDOW: Duration = Duration::from_millis(500);

    fn started(id: &str) -> NetworkActivity {
        NetworkActivity::Started(id.to_string())
    }

    fn settled(id: &str) -> NetworkActivity {
        NetworkActivity::Settled(id.to_string())
    }

    #[test]
    fn test_quiet_page_becomes_idle_after_window() {
        let t0 = Instant::now();
        let tracker = NetworkIdleTracker::new(0, WINDOW, t0);

        assert!(!tracker.is_idle(t0));
        assert!(!tracker.is_idle(t0 + Duration::from_millis(499)));
        assert!(tracker.is_idle(t0 + WINDOW));
    }

    #[test]
    fn test_request_in_flight_blocks_idle() {
        let t0 = Instant::now();
        let mut tracker = NetworkIdleTracker::new(0, WINDOW, t0);

        tracker.observe(started("1"), t0 + Duration::from_millis(100));

        assert_eq!(tracker.in_flight(), 1);
        assert!(tracker.idle_at().is_none());
        assert!(!tracker.is_idle(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_window_restarts_when_last_request_settles() {
        let t0 = Instant::now();
        let mut tracker = NetworkIdleTracker::new(0, WINDOW, t0);

        tracker.observe(started("1"), t0 + Duration::from_millis(100));
        let t_done = t0 + Duration::from_millis(300);
        tracker.observe(settled("1"), t_done);

        assert_eq!(tracker.idle_at(), Some(t_done + WINDOW));
        assert!(!tracker.is_idle(t0 + WINDOW));
        assert!(tracker.is_idle(t_done + WINDOW));
    }

    #[test]
    fn test_threshold_allows_some_requests_in_flight() {
        let t0 = Instant::now();
        let mut tracker = NetworkIdleTracker::new(2, WINDOW, t0);

        tracker.observe(started("a"), t0);
        tracker.observe(started("b"), t0);
        assert!(tracker.is_idle(t0 + WINDOW));

        let t1 = t0 + Duration::from_millis(200);
        tracker.observe(started("c"), t1);
        assert!(tracker.idle_at().is_none());

        let t2 = t0 + Duration::from_millis(400);
        tracker.observe(settled("a"), t2);
        assert_eq!(tracker.idle_at(), Some(t2 + WINDOW));
    }

    #[test]
    fn test_unknown_settle_is_ignored() {
        let t0 = Instant::now();
        let mut tracker = NetworkIdleTracker::new(0, WINDOW, t0);

        tracker.observe(settled("never-started"), t0 + Duration::from_millis(50));

        assert_eq!(tracker.in_flight(), 0);
        assert_eq!(tracker.idle_at(), Some(t0 + WINDOW));
    }

    #[test]
    fn test_duplicate_start_counts_once() {
        let t0 = Instant::now();
        let mut tracker = NetworkIdleTracker::new(0, WINDOW, t0);

        tracker.observe(started("redirected"), t0);
        tracker.observe(started("redirected"), t0);
        tracker.observe(settled("redirected"), t0);

        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_page_waits_one_window() {
        let start = Instant::now();

        wait_for_idle(futures::stream::pending(), 0, WINDOW).await;

        assert!(start.elapsed() >= WINDOW);
        assert!(start.elapsed() < WINDOW + Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_outstanding_request() {
        let (tx, rx) = mpsc::unbounded();
        tx.unbounded_send(NetworkActivity::Started("xhr-1".to_string()))
            .unwrap();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            tx.unbounded_send(NetworkActivity::Settled("xhr-1".to_string()))
                .unwrap();
            // keep the stream open so only the window ends the wait
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(tx);
        });

        let start = Instant::now();
        wait_for_idle(rx, 0, WINDOW).await;

        assert!(start.elapsed() >= Duration::from_secs(2) + WINDOW);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_stream_ends_wait() {
        let (tx, rx) = mpsc::unbounded::<NetworkActivity>();
        tx.unbounded_send(NetworkActivity::Started("doc".to_string()))
            .unwrap();
        drop(tx);

        let start = Instant::now();
        wait_for_idle(rx, 0, WINDOW).await;

        assert!(start.elapsed() < WINDOW);
    }
}
