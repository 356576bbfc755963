use std::fmt::Display;

/// Open appointment dates keyed by location header, in the order the page
/// lists them.
///
/// Two snapshots are equal only when they hold the same locations with the
/// same dates in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    locations: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub dates: Vec<String>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a date under `location`, creating the location on first use.
    pub fn push(&mut self, location: &str, date: String) {
        match self.locations.iter_mut().find(|l| l.name == location) {
            Some(existing) => existing.dates.push(date),
            None => self.locations.push(Location {
                name: location.to_string(),
                dates: vec![date],
            }),
        }
    }

    pub fn get(&self, location: &str) -> Option<&[String]> {
        self.locations
            .iter()
            .find(|l| l.name == location)
            .map(|l| l.dates.as_slice())
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Flattens the snapshot into the single line sent as a push body.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for location in &self.locations {
            out.push_str(&location.name);
            out.push_str(": ");
            for date in &location.dates {
                out.push_str(date);
                out.push(' ');
            }
            out.push(' ');
        }
        out
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<S>)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (S, Vec<S>)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for (name, dates) in iter {
            let name = name.into();
            for date in dates {
                snapshot.push(&name, date.into());
            }
        }
        snapshot
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.locations.is_empty() {
            return writeln!(f, "No appointments currently available.");
        }
        for location in &self.locations {
            writeln!(f, "{}", location.name)?;
            for date in &location.dates {
                writeln!(f, "   * {}", date)?;
            }
        }
        Ok(())
    }
}
