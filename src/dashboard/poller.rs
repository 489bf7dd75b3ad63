//! Polling controller — periodic fetch → transform → render.
//!
//! One cycle runs immediately on [`Poller::start`], then one per interval.
//! Each cycle fetches stats and history independently; a failure in one
//! leaves the other untouched and leaves the failed panel showing whatever
//! it showed before.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use super::view::{Applied, DashboardView};
use crate::analytics::logger::{EventLog, PollOutcome};
use crate::api::{DashboardSource, FetchError};

/// Default refresh cadence.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30_000);

/// Monotonically increasing poll cycle identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(pub u64);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two independently refreshed panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Stats,
    History,
}

impl Panel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::History => "history",
        }
    }
}

/// What happened to one panel during a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelOutcome {
    Applied,
    Stale,
    Failed(FetchError),
}

impl PanelOutcome {
    fn from_applied(applied: Applied) -> Self {
        match applied {
            Applied::Rendered => Self::Applied,
            Applied::Stale => Self::Stale,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Summary of one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: CycleId,
    pub stats: PanelOutcome,
    pub history: PanelOutcome,
}

impl CycleReport {
    /// Failed panels with their errors.
    pub fn failures(&self) -> Vec<(Panel, &FetchError)> {
        [(Panel::Stats, &self.stats), (Panel::History, &self.history)]
            .into_iter()
            .filter_map(|(panel, outcome)| outcome.error().map(|err| (panel, err)))
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.failures().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

pub struct Poller<S: DashboardSource> {
    source: S,
    view: DashboardView,
    interval: Duration,
    last_cycle: u64,
    log: EventLog,
}

impl<S: DashboardSource> Poller<S> {
    pub fn new(source: S, view: DashboardView, interval: Duration) -> Self {
        Self {
            source,
            view,
            interval,
            last_cycle: 0,
            log: EventLog::disabled(),
        }
    }

    pub fn with_event_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one full cycle: stats, then history.
    pub fn run_cycle(&mut self) -> CycleReport {
        self.last_cycle += 1;
        let cycle = CycleId(self.last_cycle);

        let stats = self.poll_panel(cycle, Panel::Stats);
        let history = self.poll_panel(cycle, Panel::History);

        CycleReport {
            cycle,
            stats,
            history,
        }
    }

    fn poll_panel(&mut self, cycle: CycleId, panel: Panel) -> PanelOutcome {
        let start = Instant::now();
        let outcome = match panel {
            Panel::Stats => self
                .source
                .fetch_stats()
                .map(|snapshot| self.view.apply_stats(cycle, &snapshot)),
            Panel::History => self
                .source
                .fetch_history()
                .map(|records| self.view.apply_history(cycle, &records)),
        }
        .map_or_else(PanelOutcome::Failed, PanelOutcome::from_applied);
        let latency_ms = start.elapsed().as_millis() as u64;

        let (logged, error) = match &outcome {
            PanelOutcome::Applied => (PollOutcome::Applied, None),
            PanelOutcome::Stale => (PollOutcome::Stale, None),
            PanelOutcome::Failed(err) => (PollOutcome::Failed, Some(err)),
        };
        self.log
            .log_poll(cycle.0, panel.as_str(), logged, latency_ms, error);

        outcome
    }

    /// Poll forever: one cycle now, then one per interval.
    ///
    /// `on_cycle` runs after every cycle with the updated view. Ticks keep a
    /// fixed cadence; a cycle that overruns its slot starts the next one
    /// immediately instead of queueing extra cycles.
    pub fn start(&mut self, mut on_cycle: impl FnMut(&DashboardView, &CycleReport)) -> ! {
        let mut deadline = Instant::now();
        loop {
            let report = self.run_cycle();
            on_cycle(&self.view, &report);

            let now = Instant::now();
            deadline = next_deadline(deadline, self.interval, now);
            thread::sleep(deadline.saturating_duration_since(now));
        }
    }
}

/// The next tick after `previous`, skipping ticks already missed by `now`.
fn next_deadline(previous: Instant, interval: Duration, now: Instant) -> Instant {
    let next = previous + interval;
    if next < now { now } else { next }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{PredictionRecord, StatsSnapshot};
    use crate::dashboard::view::ViewSettings;
    use std::cell::RefCell;

    /// Source that replays queued responses.
    struct Scripted {
        stats: RefCell<Vec<Result<StatsSnapshot, FetchError>>>,
        history: RefCell<Vec<Result<Vec<PredictionRecord>, FetchError>>>,
    }

    impl DashboardSource for Scripted {
        fn fetch_stats(&self) -> Result<StatsSnapshot, FetchError> {
            self.stats.borrow_mut().remove(0)
        }

        fn fetch_history(&self) -> Result<Vec<PredictionRecord>, FetchError> {
            self.history.borrow_mut().remove(0)
        }
    }

    fn view() -> DashboardView {
        DashboardView::new(ViewSettings {
            color: false,
            ..ViewSettings::default()
        })
    }

    #[test]
    fn cycle_ids_increase() {
        let source = Scripted {
            stats: RefCell::new(vec![Ok(StatsSnapshot::default()), Ok(StatsSnapshot::default())]),
            history: RefCell::new(vec![Ok(vec![]), Ok(vec![])]),
        };
        let mut poller = Poller::new(source, view(), DEFAULT_INTERVAL);

        assert_eq!(poller.run_cycle().cycle, CycleId(1));
        let report = poller.run_cycle();
        assert_eq!(report.cycle, CycleId(2));
        assert!(report.is_clean());
        assert_eq!(poller.view().stats_cycle(), Some(CycleId(2)));
    }

    #[test]
    fn panels_fail_independently() {
        let source = Scripted {
            stats: RefCell::new(vec![Err(FetchError::Transport("refused".to_string()))]),
            history: RefCell::new(vec![Ok(vec![PredictionRecord::default()])]),
        };
        let mut poller = Poller::new(source, view(), DEFAULT_INTERVAL);
        let report = poller.run_cycle();

        assert_eq!(report.history, PanelOutcome::Applied);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].0, Panel::Stats);
        assert_eq!(poller.view().history().rows().len(), 1);
        assert!(poller.view().summary().is_none());
    }

    #[test]
    fn next_deadline_keeps_cadence() {
        let start = Instant::now();
        let interval = Duration::from_secs(30);

        let next = next_deadline(start, interval, start + Duration::from_secs(2));
        assert_eq!(next, start + interval);

        let late = start + Duration::from_secs(45);
        assert_eq!(next_deadline(start, interval, late), late);
    }

    #[test]
    fn panel_names() {
        assert_eq!(Panel::Stats.as_str(), "stats");
        assert_eq!(Panel::History.as_str(), "history");
        assert_eq!(CycleId(7).to_string(), "7");
    }
}
