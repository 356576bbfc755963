use std::path::PathBuf;

use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("Sound file not found: {0}")]
    MissingFile(PathBuf),
    #[error("Failed to start player '{player}': {source}")]
    Spawn {
        player: String,
        source: std::io::Error,
    },
    #[error("Player '{player}' exited with {status}")]
    PlayerFailed {
        player: String,
        status: std::process::ExitStatus,
    },
}

#[cfg(target_os = "macos")]
const DEFAULT_PLAYER: &[&str] = &["afplay"];
#[cfg(not(target_os = "macos"))]
const DEFAULT_PLAYER: &[&str] = &["mpg123", "-q"];

/// Plays an audio file through an external command-line player.
///
/// The file path is appended as the last argument of the player command.
#[derive(Debug, Clone)]
pub struct AlertSound {
    path: PathBuf,
    program: String,
    args: Vec<String>,
    muted: bool,
}

impl AlertSound {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            program: DEFAULT_PLAYER[0].to_string(),
            args: DEFAULT_PLAYER[1..].iter().map(|s| s.to_string()).collect(),
            muted: false,
        }
    }

    pub fn muted() -> Self {
        Self {
            muted: true,
            ..Self::new(crate::DEFAULT_SOUND_FILE)
        }
    }

    /// Replaces the player, given as a whitespace separated command line.
    pub fn with_player(mut self, command: &str) -> Self {
        let mut parts = command.split_whitespace().map(String::from);
        if let Some(program) = parts.next() {
            self.program = program;
            self.args = parts.collect();
        }
        self
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub async fn play(&self) -> Result<(), SoundError> {
        if self.muted {
            return Ok(());
        }
        if !self.path.is_file() {
            return Err(SoundError::MissingFile(self.path.clone()));
        }

        let player = self.program.clone();

        log::debug!("Playing {} with {}", self.path.display(), player);
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.path)
            .status()
            .await
            .map_err(|source| SoundError::Spawn {
                player: player.clone(),
                source,
            })?;

        if !status.success() {
            return Err(SoundError::PlayerFailed { player, status });
        }
        Ok(())
    }
}
