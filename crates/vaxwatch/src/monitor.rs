use std::time::Duration;

use chrono::{DateTime, Local};

use crate::notify::{Notifier, NotifyError};
use crate::poll::{Decision, PollState};
use crate::scraper::{AppointmentSource, ScraperError};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Source of wall-clock time and of the pause between cycles.
#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Polls a source and notifies whenever its snapshot changes.
pub struct Monitor<S, N, C = SystemClock> {
    source: S,
    notifier: N,
    clock: C,
    interval: Duration,
}

impl<S: AppointmentSource, N: Notifier> Monitor<S, N, SystemClock> {
    pub fn new(source: S, notifier: N) -> Self {
        Self::with_clock(source, notifier, SystemClock)
    }
}

impl<S: AppointmentSource, N: Notifier, C: Clock> Monitor<S, N, C> {
    pub fn with_clock(source: S, notifier: N, clock: C) -> Self {
        Self {
            source,
            notifier,
            clock,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// One fetch, compare and notify step.
    pub async fn cycle(&self, state: PollState) -> Result<PollState, MonitorError> {
        let current = self.source.fetch().await?;
        let (state, decision) = state.advance(current);

        match decision {
            Decision::Notify(snapshot) => {
                log::info!(
                    "Appointments changed: {} location(s) with open dates",
                    snapshot.len()
                );
                self.notifier.notify(&snapshot, &self.clock).await?;
            }
            Decision::Unchanged => log::debug!("No change in appointments"),
        }

        Ok(state)
    }

    /// Runs `cycles` cycles, sleeping the interval after each one.
    pub async fn run_cycles(
        &self,
        state: PollState,
        cycles: usize,
    ) -> Result<PollState, MonitorError> {
        let mut state = state;
        for _ in 0..cycles {
            state = self.cycle(state).await?;
            self.clock.sleep(self.interval).await;
        }
        Ok(state)
    }

    /// Polls until a fetch, parse or key file error occurs.
    pub async fn run(&self) -> Result<std::convert::Infallible, MonitorError> {
        log::info!("Polling every {}s", self.interval.as_secs());
        let mut state = PollState::default();
        loop {
            state = self.cycle(state).await?;
            self.clock.sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_appointments;
    use crate::types::Snapshot;
    use chrono::TimeZone;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Serves canned pages in order.
    struct ScriptedSource {
        pages: Mutex<VecDeque<String>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<&str>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().map(String::from).collect()),
            }
        }
    }

    impl AppointmentSource for ScriptedSource {
        async fn fetch(&self) -> Result<Snapshot, ScraperError> {
            let page = self
                .pages
                .lock()
                .unwrap()
                .pop_front()
                .expect("Source ran out of pages");
            Ok(parse_appointments(&page)?)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<Snapshot>>,
    }

    impl Notifier for RecordingNotifier {
        async fn notify<C: Clock>(
            &self,
            snapshot: &Snapshot,
            _clock: &C,
        ) -> Result<(), NotifyError> {
            self.seen.lock().unwrap().push(snapshot.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeClock {
        slept: Mutex<Vec<Duration>>,
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Local> {
            Local
                .with_ymd_and_hms(2021, 2, 5, 9, 0, 0)
                .single()
                .expect("Unambiguous local time")
        }

        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    fn page(dates: &[&str]) -> String {
        let rows: String = dates
            .iter()
            .map(|d| format!("<tr><td>{d}</td></tr>"))
            .collect();
        format!(
            "<table><tbody><tr><td>nav</td></tr></tbody></table>\
             <b>Appointments for Clinic X</b>\
             <table><tbody><tr><th>Date</th></tr>{rows}</tbody></table>"
        )
    }

    #[tokio::test]
    async fn test_notifies_only_on_change() {
        let pages = [
            page(&["1/3/2022"]),
            page(&["1/3/2022"]),
            page(&["1/3/2022", "1/4/2022"]),
            page(&["1/3/2022", "1/4/2022"]),
        ];
        let source = ScriptedSource::new(pages.iter().map(String::as_str).collect());
        let monitor =
            Monitor::with_clock(source, RecordingNotifier::default(), FakeClock::default());

        let state = monitor
            .run_cycles(PollState::default(), 4)
            .await
            .expect("Cycles should succeed");

        let seen = monitor.notifier().seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].get("Appointments for Clinic X").unwrap().len(), 1);
        assert_eq!(seen[1].get("Appointments for Clinic X").unwrap().len(), 2);
        assert_eq!(state.previous(), Some(&seen[1]));
    }

    #[tokio::test]
    async fn test_first_cycle_notifies_empty_page() {
        let source = ScriptedSource::new(vec![page(&[]).as_str()]);
        let monitor =
            Monitor::with_clock(source, RecordingNotifier::default(), FakeClock::default());

        monitor
            .cycle(PollState::default())
            .await
            .expect("Cycle should succeed");

        let seen = monitor.notifier().seen.lock().unwrap();
        assert_eq!(*seen, [Snapshot::new()]);
    }

    #[tokio::test]
    async fn test_sleeps_interval_after_each_cycle() {
        let pages = [page(&["1/3/2022"]), page(&["1/3/2022"]), page(&[])];
        let source = ScriptedSource::new(pages.iter().map(String::as_str).collect());
        let monitor =
            Monitor::with_clock(source, RecordingNotifier::default(), FakeClock::default());

        monitor
            .run_cycles(PollState::default(), 3)
            .await
            .expect("Cycles should succeed");

        assert_eq!(*monitor.clock().slept.lock().unwrap(), [DEFAULT_INTERVAL; 3]);
        assert_eq!(DEFAULT_INTERVAL, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_custom_interval() {
        let source = ScriptedSource::new(vec![page(&[]).as_str()]);
        let monitor = Monitor::with_clock(source, RecordingNotifier::default(), FakeClock::default())
            .interval(Duration::from_secs(5));

        monitor
            .run_cycles(PollState::default(), 1)
            .await
            .expect("Cycle should succeed");

        assert_eq!(
            *monitor.clock().slept.lock().unwrap(),
            [Duration::from_secs(5)]
        );
    }

    #[tokio::test]
    async fn test_parse_error_stops_the_run() {
        let broken = "<table><tbody></tbody></table>\
                      <b>Appointments for Clinic X</b>\
                      <table><tbody><tr><th>Date</th></tr><tr><th>oops</th></tr></tbody></table>";
        let pages = [page(&["1/3/2022"]), broken.to_string(), page(&["1/3/2022"])];
        let source = ScriptedSource::new(pages.iter().map(String::as_str).collect());
        let monitor =
            Monitor::with_clock(source, RecordingNotifier::default(), FakeClock::default());

        let err = monitor
            .run()
            .await
            .expect_err("Parse error should end the run");

        assert!(matches!(
            err,
            MonitorError::Scraper(ScraperError::ParseError(_))
        ));
        assert_eq!(monitor.notifier().seen.lock().unwrap().len(), 1);
        assert_eq!(monitor.clock().slept.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_error_status_page_does_not_stop_the_run() {
        let mut server = mockito::Server::new_async().await;
        let _page = server
            .mock("GET", "/vaccines")
            .with_status(503)
            .with_body("<html><body><h1>Service Unavailable</h1></body></html>")
            .expect(3)
            .create_async()
            .await;

        let scraper = crate::scraper::WebScraper::with_url(format!("{}/vaccines", server.url()))
            .expect("Failed to build scraper");
        let monitor =
            Monitor::with_clock(scraper, RecordingNotifier::default(), FakeClock::default());

        monitor
            .run_cycles(PollState::default(), 3)
            .await
            .expect("Error status pages should not stop the run");

        assert_eq!(*monitor.notifier().seen.lock().unwrap(), [Snapshot::new()]);
        assert_eq!(monitor.clock().slept.lock().unwrap().len(), 3);
    }
}
