//! Frame Replay Driver
//!
//! Feeds recorded biometric frames (one JSON object per line) through a
//! [`DmsSession`] and writes one JSON [`FrameReport`] per frame.

use alerting::WarningKind;
use config::{Config, Environment, File};
use dms::{BiometricSample, DmsConfig, DmsError, DmsSession, FrameInput, FrameReport, SessionCommand};
use face_geometry::{IrisPosition, Point2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Environment prefix for configuration overrides, e.g.
/// `FACE_GUARD__TIME_TO_SLEEP_MS=1200`
pub const ENV_PREFIX: &str = "FACE_GUARD";

/// Replay errors
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Malformed record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid timestamp {0}")]
    InvalidTime(f64),

    #[error("Frame at t={0} has only some of ear/mar/pitch/yaw")]
    IncompleteFrame(f64),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Dms(#[from] DmsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Built-in threshold presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    #[default]
    Default,
    Strict,
    Lenient,
}

impl Preset {
    pub fn config(self) -> DmsConfig {
        match self {
            Self::Default => DmsConfig::default(),
            Self::Strict => DmsConfig::strict(),
            Self::Lenient => DmsConfig::lenient(),
        }
    }
}

/// Layer the preset, an optional file, and `FACE_GUARD__*` variables
pub fn load_config(path: Option<&Path>, preset: Preset) -> Result<DmsConfig, ReplayError> {
    let mut builder = Config::builder().add_source(Config::try_from(&preset.config())?);
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    let config: DmsConfig = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}

/// One line of a recording as written by the capture side
#[derive(Debug, Deserialize)]
struct RawRecord {
    t: f64,
    ear: Option<f64>,
    mar: Option<f64>,
    pitch: Option<f64>,
    yaw: Option<f64>,
    #[serde(default)]
    iris: IrisPosition,
    nose: Option<Point2>,
    iris_center: Option<Point2>,
    command: Option<SessionCommand>,
}

/// Parsed recording line
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Face {
        t: f64,
        ear: f64,
        mar: f64,
        pitch: f64,
        yaw: f64,
        iris: IrisPosition,
        nose: Option<Point2>,
        iris_center: Option<Point2>,
    },
    NoFace {
        t: f64,
    },
    Command {
        t: f64,
        command: SessionCommand,
    },
}

impl Record {
    pub fn parse(line: &str) -> Result<Self, ReplayError> {
        let raw: RawRecord = serde_json::from_str(line)?;
        if !raw.t.is_finite() || raw.t < 0.0 {
            return Err(ReplayError::InvalidTime(raw.t));
        }

        if let Some(command) = raw.command {
            return Ok(Self::Command { t: raw.t, command });
        }

        match (raw.ear, raw.mar, raw.pitch, raw.yaw) {
            (Some(ear), Some(mar), Some(pitch), Some(yaw)) => Ok(Self::Face {
                t: raw.t,
                ear,
                mar,
                pitch,
                yaw,
                iris: raw.iris,
                nose: raw.nose,
                iris_center: raw.iris_center,
            }),
            (None, None, None, None) => Ok(Self::NoFace { t: raw.t }),
            _ => Err(ReplayError::IncompleteFrame(raw.t)),
        }
    }

    /// Seconds from the start of the recording
    pub fn time(&self) -> f64 {
        match self {
            Self::Face { t, .. } | Self::NoFace { t } | Self::Command { t, .. } => *t,
        }
    }
}

/// Totals for one replay run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub frames: usize,
    pub commands: usize,
    pub skipped: usize,
    pub frames_with_warning: usize,
    pub peak_score: u8,
    /// Rising edges per warning kind, e.g. `{"yawn": 2}`
    pub warnings_raised: BTreeMap<&'static str, usize>,
}

/// Drives a session from a recording
pub struct Replayer {
    session: DmsSession,
    origin: Instant,
    last_t: f64,
    summary: ReplaySummary,
}

impl Replayer {
    pub fn new(config: DmsConfig) -> Result<Self, ReplayError> {
        Ok(Self {
            session: DmsSession::new(config)?,
            origin: Instant::now(),
            last_t: 0.0,
            summary: ReplaySummary::default(),
        })
    }

    pub fn session(&self) -> &DmsSession {
        &self.session
    }

    pub fn summary(&self) -> &ReplaySummary {
        &self.summary
    }

    fn instant(&self, t: f64) -> Result<Instant, ReplayError> {
        Duration::try_from_secs_f64(t)
            .ok()
            .and_then(|offset| self.origin.checked_add(offset))
            .ok_or(ReplayError::InvalidTime(t))
    }

    /// Apply one record, returning a report for frame records.
    ///
    /// Records older than the previous one are skipped; a timestamp too far
    /// out to represent is an error and leaves the session untouched.
    pub fn apply(&mut self, record: Record) -> Result<Option<FrameReport>, ReplayError> {
        let t = record.time();
        if t < self.last_t {
            warn!("Record at t={} is older than t={}, skipping", t, self.last_t);
            self.summary.skipped += 1;
            return Ok(None);
        }
        let now = self.instant(t)?;
        self.last_t = t;

        let input = match record {
            Record::Command { command, .. } => {
                self.summary.commands += 1;
                match self.session.command(command, now) {
                    Ok(mode) => info!("t={:.2}s {} -> {}", t, command, mode),
                    Err(e) => warn!("t={:.2}s {}", t, e),
                }
                return Ok(None);
            }
            Record::NoFace { .. } => FrameInput::NoFace { timestamp: now },
            Record::Face {
                ear,
                mar,
                pitch,
                yaw,
                iris,
                nose,
                iris_center,
                ..
            } => {
                let mut sample = BiometricSample::new(now, ear, mar, pitch, yaw, iris);
                sample.nose = nose;
                sample.iris_center = iris_center;
                FrameInput::Face(sample)
            }
        };

        let report = self.session.process(&input);
        self.summary.frames += 1;
        if report.has_warning() {
            self.summary.frames_with_warning += 1;
        }
        self.summary.peak_score = self.summary.peak_score.max(report.fatigue_score);
        Ok(Some(report))
    }

    fn tally_warnings(&mut self) {
        self.summary.warnings_raised = WarningKind::ALL
            .iter()
            .map(|&kind| (kind.as_str(), self.session.warning_count(kind)))
            .filter(|&(_, count)| count > 0)
            .collect();
    }

    /// Replay every line of `reader`, writing one JSON report per frame
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<ReplaySummary, ReplayError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut line_no = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let applied = Record::parse(line).and_then(|record| self.apply(record));
            let report = match applied {
                Ok(report) => report,
                Err(e) => {
                    warn!("Line {}: {}", line_no, e);
                    self.summary.skipped += 1;
                    continue;
                }
            };

            if let Some(report) = report {
                let mut out = serde_json::to_vec(&report)?;
                out.push(b'\n');
                writer.write_all(&out).await?;
            }
        }

        writer.flush().await?;
        self.tally_warnings();
        debug!("Replay finished after {} lines", line_no);
        Ok(self.summary.clone())
    }
}
