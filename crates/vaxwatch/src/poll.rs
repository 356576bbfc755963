use crate::types::Snapshot;

/// True when `current` differs from `previous`, or when there is no
/// previous snapshot yet.
pub fn changed(previous: Option<&Snapshot>, current: &Snapshot) -> bool {
    previous != Some(current)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Notify(Snapshot),
    Unchanged,
}

/// The last snapshot that triggered a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    previous: Option<Snapshot>,
}

impl PollState {
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    pub fn advance(self, current: Snapshot) -> (PollState, Decision) {
        if changed(self.previous.as_ref(), &current) {
            let next = PollState {
                previous: Some(current.clone()),
            };
            (next, Decision::Notify(current))
        } else {
            (self, Decision::Unchanged)
        }
    }
}
