use std::collections::VecDeque;
use std::sync::mpsc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::activity::{ActivityState, HostActivity};
use crate::bridge::renderer::Renderer;
use crate::content::ContentSource;
use crate::model::config::AppConfig;
use crate::msg::Msg;
use crate::plugin::{self, System};
use crate::window::WindowBridgeHost;

const LOG_CAPACITY: usize = 200;

/// Build the activity for this window: the application's capability set
/// plus the terminal bridge host.
pub fn host_activity(
    config: &AppConfig,
    source: ContentSource,
    events: mpsc::Sender<Msg>,
) -> HostActivity<WindowBridgeHost> {
    let exit_tx = events.clone();
    let system = System::new(config.general.app_name.clone()).with_exit_hook(move || {
        let _ = exit_tx.send(Msg::Quit);
    });

    HostActivity::new(WindowBridgeHost::new(events, source), move |registrar| {
        plugin::register_all(registrar, system.clone())
    })
}

/// Developer-facing line printed when the window cannot start.
pub fn startup_diagnostic(err: &anyhow::Error) -> String {
    format!("axion: startup failed: {err:#}")
}

pub struct App {
    pub config: AppConfig,
    source: ContentSource,
    events: mpsc::Sender<Msg>,
    activity: HostActivity<WindowBridgeHost>,
    /// Bridge call log, newest last.
    pub log: VecDeque<String>,
    pending_calls: usize,
    pub should_quit: bool,
}

impl App {
    /// Create the window's activity and run its start callback. A
    /// registration conflict is fatal and returned to the caller.
    pub fn new(config: AppConfig, source: ContentSource, events: mpsc::Sender<Msg>) -> Result<Self> {
        let mut activity = host_activity(&config, source.clone(), events.clone());
        activity.on_start(None)?;

        let mut app = Self {
            config,
            source,
            events,
            activity,
            log: VecDeque::new(),
            pending_calls: 0,
            should_quit: false,
        };
        app.push_log(format!("started: {}", app.capability_summary()));
        Ok(app)
    }

    pub fn activity_state(&self) -> ActivityState {
        self.activity.state()
    }

    pub fn renderer(&self) -> Option<&Renderer> {
        self.activity.base().renderer()
    }

    pub fn pending_calls(&self) -> usize {
        self.pending_calls
    }

    fn capability_summary(&self) -> String {
        self.renderer()
            .map(|renderer| renderer.plugins().summary())
            .unwrap_or_else(|| "capabilities: bridge not running".to_string())
    }

    fn push_log(&mut self, line: String) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Resize(_, _) | Msg::Tick => {}
            Msg::LoadContent { session } => self.load_content(session),
            Msg::CallCompleted(outcome) => {
                if !self.activity.base().is_current(outcome.call.session) {
                    tracing::debug!(call = %outcome.call, "dropping outcome from a destroyed session");
                    return Ok(());
                }
                self.pending_calls = self.pending_calls.saturating_sub(1);
                self.push_log(outcome.summary());
            }
            Msg::Recreate => self.recreate()?,
            Msg::Quit => self.should_quit = true,
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') => {
                if self.events.send(Msg::Recreate).is_err() {
                    tracing::warn!("event channel closed, cannot recreate");
                }
            }
            _ => {}
        }
    }

    fn load_content(&mut self, session: u64) {
        match self.activity.base_mut().load_content(session) {
            Ok(None) => {}
            Ok(Some(report)) => {
                self.pending_calls += report.calls.len();
                self.push_log(format!(
                    "loaded \"{}\" ({} startup calls)",
                    report.title,
                    report.calls.len()
                ));
                for warning in report.warnings {
                    self.push_log(format!("warning: {warning}"));
                }
            }
            Err(err) => {
                tracing::error!("content load failed: {err}");
                self.push_log(format!("content load failed: {err}"));
            }
        }
    }

    /// Tear the activity down and start a fresh one with the renderer's
    /// snapshot, the way the platform does on a configuration change.
    fn recreate(&mut self) -> Result<()> {
        let snapshot = self.renderer().map(Renderer::save_state);
        self.activity.on_destroy();

        let mut activity = host_activity(&self.config, self.source.clone(), self.events.clone());
        activity.on_start(snapshot)?;
        self.activity = activity;
        self.pending_calls = 0;

        let generation = self.renderer().map(Renderer::generation).unwrap_or(0);
        tracing::info!(generation, "activity recreated");
        self.push_log(format!(
            "recreated (generation {generation}): {}",
            self.capability_summary()
        ));
        Ok(())
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(rows[1]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        self.render_title_bar(frame, rows[0]);
        self.render_capabilities(frame, columns[0]);
        self.render_page(frame, right[0]);
        self.render_bridge_log(frame, right[1]);
        self.render_status_bar(frame, rows[2]);
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let platform = self
            .renderer()
            .map(|renderer| {
                let native = if renderer.is_native_platform() {
                    "native"
                } else {
                    "web"
                };
                format!("{} ({native})", renderer.platform())
            })
            .unwrap_or_else(|| "-".to_string());

        let title = Line::from(vec![
            Span::styled(
                format!(" {} ", self.config.window.title),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {platform}  content: {}", self.source)),
        ]);

        frame.render_widget(
            Paragraph::new(title).style(Style::default().bg(Color::Rgb(20, 20, 30))),
            area,
        );
    }

    fn render_capabilities(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();

        if let Some(renderer) = self.renderer() {
            let mut descriptors: Vec<_> = renderer.plugins().descriptors().collect();
            descriptors.sort_by(|a, b| a.name().cmp(b.name()));

            for descriptor in descriptors {
                lines.push(Line::from(Span::styled(
                    descriptor.name().to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )));
                for method in descriptor.methods() {
                    lines.push(Line::from(format!("  {method}")));
                }
            }
        }

        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "none registered",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let panel = Paragraph::new(lines).block(
            Block::default()
                .title(" Capabilities ")
                .borders(Borders::ALL),
        );
        frame.render_widget(panel, area);
    }

    fn render_page(&self, frame: &mut Frame, area: Rect) {
        let (title, body) = match self.renderer().and_then(Renderer::page) {
            Some(page) => (page.page.title.clone(), page.page.body.clone()),
            None => ("loading".to_string(), String::new()),
        };

        let panel = Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!(" {title} "))
                    .borders(Borders::ALL),
            );
        frame.render_widget(panel, area);
    }

    fn render_bridge_log(&self, frame: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let skip = self.log.len().saturating_sub(visible);
        let lines: Vec<Line> = self
            .log
            .iter()
            .skip(skip)
            .map(|entry| {
                let style = if entry.contains(" failed") || entry.starts_with("warning:") {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(entry.clone(), style))
            })
            .collect();

        let panel = Paragraph::new(lines)
            .style(Style::default().bg(Color::Rgb(12, 12, 18)))
            .block(Block::default().title(" Bridge ").borders(Borders::ALL));
        frame.render_widget(panel, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let state = self.activity.state();
        let state_style = match state {
            ActivityState::Running => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            ActivityState::Failed => Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
            _ => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        };

        let generation = self.renderer().map(Renderer::generation).unwrap_or(0);
        let bar = Line::from(vec![
            Span::styled(format!(" {} ", state.label()), state_style),
            Span::raw(format!(
                " gen {generation} | pending {} | q: quit  r: recreate ",
                self.pending_calls
            )),
        ]);

        frame.render_widget(
            Paragraph::new(bar).style(Style::default().bg(Color::DarkGray)),
            area,
        );
    }
}
