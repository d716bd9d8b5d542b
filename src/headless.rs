//! Run the startup sequence and the page's startup calls without a terminal
//! window.

use std::io::Write;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::app::host_activity;
use crate::bridge::dispatch::CallOutcome;
use crate::content::ContentSource;
use crate::model::config::AppConfig;
use crate::msg::Msg;

const CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
pub struct HeadlessReport {
    pub capabilities: Vec<String>,
    pub title: String,
    pub missing: Vec<String>,
    pub warnings: Vec<String>,
    pub outcomes: Vec<CallOutcome>,
    pub exit_requested: bool,
}

impl HeadlessReport {
    pub fn failed(&self) -> bool {
        !self.missing.is_empty() || self.outcomes.iter().any(|outcome| !outcome.is_ok())
    }
}

pub fn run(config: &AppConfig, source: ContentSource, out: &mut impl Write) -> Result<HeadlessReport> {
    let (tx, rx) = mpsc::channel::<Msg>();
    let mut activity = host_activity(config, source, tx);
    activity.on_start(None)?;

    let mut report = HeadlessReport::default();
    if let Some(renderer) = activity.base().renderer() {
        report.capabilities = renderer
            .plugins()
            .names()
            .iter()
            .map(ToString::to_string)
            .collect();
        writeln!(out, "{}", renderer.plugins().summary())?;
    }

    let mut pending: Option<usize> = None;
    while pending != Some(0) {
        let msg = rx
            .recv_timeout(CALL_TIMEOUT)
            .context("waiting for the bridge")?;

        match msg {
            Msg::LoadContent { session } => {
                let Some(load) = activity.base_mut().load_content(session)? else {
                    continue;
                };
                writeln!(out, "page: {}", load.title)?;
                for warning in &load.warnings {
                    writeln!(out, "warning: {warning}")?;
                }
                pending = Some(load.calls.len());
                report.title = load.title;
                report.missing = load.missing;
                report.warnings = load.warnings;
            }
            Msg::CallCompleted(outcome) => {
                if !activity.base().is_current(outcome.call.session) {
                    continue;
                }
                writeln!(out, "{}", outcome.summary())?;
                report.outcomes.push(outcome);
                pending = pending.map(|n| n.saturating_sub(1));
            }
            Msg::Quit => report.exit_requested = true,
            _ => {}
        }
    }

    activity.on_destroy();
    Ok(report)
}
