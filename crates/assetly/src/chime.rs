//! Alert playback for `notifications watch`.
//!
//! The tone is handed to an external player as a WAV stream on stdin. With
//! no player configured the terminal bell stands in.

use std::io::Write;
use std::process::{Command, Stdio};

use assetly_core::{Chime, ChimeError, Tone};
use tracing::debug;

use crate::config::AlertSettings;

/// How alerts are played for this run.
#[derive(Debug)]
pub enum CliChime {
    Silent,
    Bell,
    Player(PlayerChime),
}

impl CliChime {
    pub fn from_settings(settings: &AlertSettings, silent: bool) -> Self {
        if silent || !settings.enabled {
            return Self::Silent;
        }
        settings
            .player
            .as_deref()
            .and_then(PlayerChime::parse)
            .map_or(Self::Bell, Self::Player)
    }
}

impl Chime for CliChime {
    fn play(&self, tone: &Tone) -> Result<(), ChimeError> {
        match self {
            Self::Silent => Ok(()),
            Self::Bell => {
                let mut stderr = std::io::stderr().lock();
                stderr.write_all(b"\x07")?;
                stderr.flush()?;
                Ok(())
            }
            Self::Player(player) => player.play(tone),
        }
    }
}

/// Spawns a command such as `aplay -q` and writes the tone to its stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerChime {
    program: String,
    args: Vec<String>,
}

impl PlayerChime {
    /// Split a whitespace-separated command line. `None` when blank.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    fn play(&self, tone: &Tone) -> Result<(), ChimeError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChimeError::Unavailable(format!("{} has no stdin", self.program)))?;
        let wav = tone.to_wav();

        // Feed and reap off the async runtime; the poll loop never waits.
        std::thread::spawn(move || {
            if let Err(e) = stdin.write_all(&wav) {
                debug!(error = %e, "alert player closed stdin early");
            }
            drop(stdin);
            match child.wait() {
                Ok(status) if !status.success() => {
                    debug!(%status, "alert player exited with failure");
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "failed to wait for alert player"),
            }
        });
        Ok(())
    }
}
