pub mod push;
pub mod sound;

pub use push::{PushError, PushService, Pushbullet};
pub use sound::{AlertSound, SoundError};

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::monitor::Clock;
use crate::types::Snapshot;

pub const PUSH_TITLE: &str = "Open appointments";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to read API key from {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Reacts to a snapshot that differs from the last one seen.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify<C: Clock>(&self, snapshot: &Snapshot, clock: &C) -> Result<(), NotifyError>;
}

/// Reads the push API key: the first line of `path`, trailing whitespace removed.
pub fn read_api_key(path: &Path) -> Result<String, NotifyError> {
    let contents = fs::read_to_string(path).map_err(|source| NotifyError::KeyFile {
        path: path.to_path_buf(),
        source,
    })?;
    let key = contents.lines().next().unwrap_or_default().trim_end();
    Ok(key.to_string())
}

/// Timestamped console report for a snapshot.
pub struct Report<'a> {
    pub snapshot: &'a Snapshot,
    pub at: DateTime<Local>,
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Appointments as of {} at {}",
            self.at.format("%B %d, %Y"),
            self.at.format("%H:%M:%S")
        )?;
        write!(f, "{}", self.snapshot)
    }
}

/// Console line for a push that could not be delivered.
fn push_failure_message(err: &PushError) -> String {
    match err {
        PushError::InvalidKey => "Invalid Pushbullet key".to_string(),
        other => format!("Failed to send push notification: {}", other),
    }
}

/// Plays the alert sound, prints the report and, when a key file is
/// configured, pushes the summary through `P`.
#[derive(Debug, Clone)]
pub struct AlertNotifier<P> {
    sound: AlertSound,
    push: P,
    key_file: Option<PathBuf>,
}

impl<P: PushService> AlertNotifier<P> {
    pub fn new(sound: AlertSound, push: P) -> Self {
        Self {
            sound,
            push,
            key_file: None,
        }
    }

    /// Enables push delivery, reading the key from `key_file` on every send.
    pub fn with_push_key_file(mut self, key_file: impl Into<PathBuf>) -> Self {
        self.key_file = Some(key_file.into());
        self
    }

    pub fn push_enabled(&self) -> bool {
        self.key_file.is_some()
    }

    pub fn push_service(&self) -> &P {
        &self.push
    }

    async fn send_push(&self, key_file: &Path, snapshot: &Snapshot) -> Result<(), NotifyError> {
        let key = read_api_key(key_file)?;
        if snapshot.is_empty() {
            log::debug!("No open appointments, skipping push");
            return Ok(());
        }

        let body = snapshot.summary();
        println!("{}", body);

        if let Err(e) = self.push.push_note(&key, PUSH_TITLE, &body).await {
            let message = push_failure_message(&e);
            println!("{}", message);
            log::error!("{}", message);
        }
        Ok(())
    }
}

impl<P: PushService> Notifier for AlertNotifier<P> {
    async fn notify<C: Clock>(&self, snapshot: &Snapshot, clock: &C) -> Result<(), NotifyError> {
        if let Err(e) = self.sound.play().await {
            log::warn!("Could not play alert sound: {}", e);
        }

        let at = clock.now();
        print!("{}", Report { snapshot, at });

        if let Some(key_file) = &self.key_file {
            self.send_push(key_file, snapshot).await?;
        }
        Ok(())
    }
}
