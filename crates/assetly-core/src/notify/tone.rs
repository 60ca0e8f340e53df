// ── Alert tone ──
//
// The alert is a short sine beep with an exponential fade. Samples are
// synthesized here; playing them is left to a `Chime` implementation so the
// core stays free of audio backends.

use std::f32::consts::TAU;
use std::time::Duration;

use thiserror::Error;

/// Sample rate used for synthesized tones.
pub const SAMPLE_RATE: u32 = 44_100;

/// A mono sine tone with an exponential gain ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub start_gain: f32,
    pub end_gain: f32,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            frequency_hz: 800.0,
            duration: Duration::from_millis(500),
            start_gain: 0.3,
            end_gain: 0.01,
        }
    }
}

impl Tone {
    /// Signed 16-bit mono PCM at [`SAMPLE_RATE`].
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::as_conversions
    )]
    pub fn samples(&self) -> Vec<i16> {
        let rate = SAMPLE_RATE as f32;
        let total = (self.duration.as_secs_f32() * rate).round() as usize;
        if total == 0 {
            return Vec::new();
        }
        let ratio = if self.start_gain > 0.0 {
            (self.end_gain / self.start_gain).max(0.0)
        } else {
            0.0
        };

        (0..total)
            .map(|i| {
                let t = i as f32 / rate;
                let progress = i as f32 / total as f32;
                let gain = self.start_gain * ratio.powf(progress);
                let value = (TAU * self.frequency_hz * t).sin() * gain;
                (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
            })
            .collect()
    }

    /// The tone as a complete RIFF/WAVE file (PCM, 16-bit, mono).
    pub fn to_wav(&self) -> Vec<u8> {
        let samples = self.samples();
        let data_len = u32::try_from(samples.len() * 2).unwrap_or(u32::MAX);
        let byte_rate = SAMPLE_RATE * 2;

        let mut out = Vec::with_capacity(44 + samples.len() * 2);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes()); // block align
        out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }
}

#[derive(Debug, Error)]
pub enum ChimeError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Plays the alert tone.
///
/// Implementations must not block the caller for the length of the tone.
/// The poller logs and otherwise ignores any error returned.
pub trait Chime: Send + Sync + 'static {
    fn play(&self, tone: &Tone) -> Result<(), ChimeError>;
}

/// A chime that never makes a sound.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentChime;

impl Chime for SilentChime {
    fn play(&self, _tone: &Tone) -> Result<(), ChimeError> {
        Ok(())
    }
}
