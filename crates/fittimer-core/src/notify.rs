//! Audio/haptic pulses for timer events.
//!
//! The engine only emits [`TimerEvent`]s. A [`NotificationDispatcher`] sits
//! between the engine's host and the platform: it maps events to pulses and
//! swallows every sink failure so nothing here can affect timer state.

use std::io::Write;
use std::sync::Mutex;

use thiserror::Error;

use crate::events::{PulseKind, TimerEvent};
use crate::storage::NotificationsConfig;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("{sink}: {message}")]
    Sink { sink: String, message: String },
}

/// Something that can play a short sound or vibration.
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    fn pulse(&self, kind: PulseKind) -> Result<(), NotifyError>;
}

/// Rings the terminal bell (BEL). Warnings ring once, completions twice.
pub struct TerminalBell<W: Write + Send> {
    out: Mutex<W>,
}

impl TerminalBell<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> NotificationSink for TerminalBell<W> {
    fn name(&self) -> &str {
        "bell"
    }

    fn pulse(&self, kind: PulseKind) -> Result<(), NotifyError> {
        let mut out = self.out.lock().map_err(|_| NotifyError::Sink {
            sink: self.name().to_string(),
            message: "output lock poisoned".into(),
        })?;
        let bells: &[u8] = match kind {
            PulseKind::Warning => b"\x07",
            PulseKind::Complete => b"\x07\x07",
        };
        out.write_all(bells)?;
        out.flush()?;
        Ok(())
    }
}

/// Writes each pulse to the log instead of making noise.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn pulse(&self, kind: PulseKind) -> Result<(), NotifyError> {
        tracing::info!(?kind, "pulse");
        Ok(())
    }
}

/// Fans timer events out to sinks according to [`NotificationsConfig`].
pub struct NotificationDispatcher {
    config: NotificationsConfig,
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl NotificationDispatcher {
    pub fn new(config: NotificationsConfig) -> Self {
        Self {
            config,
            sinks: Vec::new(),
        }
    }

    /// Dispatcher with no sinks.
    pub fn silent() -> Self {
        Self::new(NotificationsConfig {
            enabled: false,
            ..NotificationsConfig::default()
        })
    }

    /// Sinks implied by the config: the terminal bell when enabled, plus
    /// the log sink.
    pub fn from_config(config: NotificationsConfig) -> Self {
        let bell = config.bell;
        let mut dispatcher = Self::new(config).with_sink(LogSink);
        if bell {
            dispatcher = dispatcher.with_sink(TerminalBell::stderr());
        }
        dispatcher
    }

    pub fn with_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Pulse every sink for every pulse-worthy event. Returns the number of
    /// successful pulses. Failures are logged and dropped.
    pub fn dispatch(&self, events: &[TimerEvent]) -> usize {
        if !self.config.enabled {
            return 0;
        }
        let mut delivered = 0;
        for kind in events.iter().filter_map(TimerEvent::pulse) {
            if kind == PulseKind::Warning && !self.config.warning_pulse {
                continue;
            }
            for sink in &self.sinks {
                match sink.pulse(kind) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(sink = sink.name(), ?kind, "pulse failed: {e}");
                    }
                }
            }
        }
        delivered
    }
}
