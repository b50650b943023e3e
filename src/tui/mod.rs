//! Interactive explorer — edit a harmonic series and watch its waveform
//! and polar fold update on every keystroke.
//!
//! `App` owns all state. Every edit produces a new [`HarmonicSeries`],
//! recomputes the waveform and radial bins from scratch, schedules a
//! debounced save and, while playing, pushes the series to the
//! [`AudioEngine`].

pub mod keybindings;
pub mod message_log;
pub mod session;
pub mod status;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::audio::{normalization_factor, AudioEngine};
use crate::config::AppConfig;
use crate::harmonic::{save_series, HarmonicSeries};
use crate::plot::{polar_plot, waveform_plot, POLAR_REFERENCE_RADIUS};
use crate::polar::{gap_count, remap_to_polar, RadialBin, MAX_COMPRESSION};
use crate::synth::{synthesize, Waveform};

use keybindings::{map_key, Action, KEY_HELP};
use message_log::MessageLog;
use session::{load_state, save_state, ExplorerState};
use status::StatusInfo;

/// Plot box of the waveform canvas, in canvas units.
const WAVE_WIDTH: f64 = 800.0;
const WAVE_HEIGHT: f64 = 250.0;

/// Input poll interval.
const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Width of the amplify/shift gauges in the harmonic list.
const GAUGE_WIDTH: usize = 10;

pub struct App {
    series: HarmonicSeries,
    selected: usize,
    compression: f64,
    waveform: Waveform,
    radial: Vec<RadialBin>,
    config: AppConfig,
    is_playing: bool,
    help_visible: bool,
    log_visible: bool,
    messages: MessageLog,
    should_quit: bool,
    series_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
    audio_engine: Option<AudioEngine>,
    pending_save: Option<Instant>,
}

impl App {
    /// An explorer over `series` that never writes to disk.
    pub fn new(series: HarmonicSeries, config: AppConfig) -> Self {
        let config = config.sanitized();
        let discretization = config.waveform_discretization.max(1);
        let waveform = synthesize(series.as_slice(), discretization);
        let mut app = Self {
            series,
            selected: 0,
            compression: 0.0,
            waveform,
            radial: Vec::new(),
            config,
            is_playing: false,
            help_visible: false,
            log_visible: false,
            messages: MessageLog::default(),
            should_quit: false,
            series_path: None,
            state_path: None,
            audio_engine: None,
            pending_save: None,
        };
        app.recompute();
        app
    }

    /// Persist edits to `path` after the configured debounce.
    pub fn with_series_path(mut self, path: PathBuf) -> Self {
        self.series_path = Some(path);
        self
    }

    /// Restore the compression saved at `path` and keep it up to date.
    pub fn with_state_path(mut self, path: PathBuf) -> Self {
        match load_state(&path) {
            Ok(Some(state)) if state.compression.is_finite() => {
                self.compression = state.compression.clamp(0.0, self.compression_limit());
                self.recompute();
            }
            Ok(Some(state)) => {
                log::warn!("ignoring saved compression {}", state.compression);
            }
            Ok(None) => {}
            Err(e) => self
                .messages
                .push(format!("could not read {}: {e}", path.display())),
        }
        self.state_path = Some(path);
        self
    }

    pub fn series(&self) -> &HarmonicSeries {
        &self.series
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn compression(&self) -> f64 {
        self.compression
    }

    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    pub fn radial(&self) -> &[RadialBin] {
        &self.radial
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn log_visible(&self) -> bool {
        self.log_visible
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending_save.is_some()
    }

    fn overlay_visible(&self) -> bool {
        self.help_visible || self.log_visible
    }

    fn compression_limit(&self) -> f64 {
        self.config.max_compression.clamp(0.0, MAX_COMPRESSION)
    }

    pub fn status(&self) -> StatusInfo {
        StatusInfo {
            is_playing: self.is_playing,
            compression: self.compression,
            peak: self.waveform.peak,
            mean_abs: self.waveform.mean_abs_with(self.config.mean_divisor),
            gaps: gap_count(&self.radial),
            unsaved: self.pending_save.is_some(),
        }
    }

    /// Rebuild the waveform and polar bins from the current series.
    ///
    /// A failed remap keeps the previous bins and records the error.
    pub fn recompute(&mut self) {
        let discretization = self.config.waveform_discretization.max(1);
        self.waveform = synthesize(self.series.as_slice(), discretization);

        match remap_to_polar(&self.waveform.samples, self.compression, &self.config.polar()) {
            Ok(bins) => self.radial = bins,
            Err(e) => self.messages.push(format!("polar remap failed: {e}")),
        }

        if self.is_playing {
            self.push_to_engine();
        }
    }

    fn push_to_engine(&mut self) {
        let volume =
            normalization_factor(self.waveform.mean_abs_with(self.config.mean_divisor));
        if let Some(engine) = self.audio_engine.as_mut() {
            if let Err(e) = engine.apply(&self.series, volume) {
                self.messages.push(format!("audio update failed: {e}"));
            }
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePlayback => self.toggle_playback(),
            Action::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
            }
            Action::SelectNext => {
                if self.selected + 1 < self.series.len() {
                    self.selected += 1;
                }
            }
            Action::AdjustAmplify(delta) => {
                if let Some(h) = self.series.get(self.selected) {
                    let series = self.series.with_amplify(self.selected, h.amplify + delta);
                    self.replace_series(series);
                }
            }
            Action::AdjustShift(delta) => {
                if let Some(h) = self.series.get(self.selected) {
                    let series = self.series.with_shift(self.selected, h.shift + delta);
                    self.replace_series(series);
                }
            }
            Action::MuteSelected => {
                let series = self.series.with_amplify(self.selected, 0.0);
                self.replace_series(series);
            }
            Action::AdjustCompression(steps) => {
                let next = self.compression + steps * self.config.compression_step;
                // Snap to micro-units so repeated steps don't accumulate drift.
                let next = (next * 1e6).round() / 1e6;
                let next = next.clamp(0.0, self.compression_limit());
                if next != self.compression {
                    self.compression = next;
                    if self.state_path.is_some() {
                        self.pending_save = Some(Instant::now());
                    }
                    self.recompute();
                }
            }
            Action::LoadPreset(preset) => {
                log::debug!("loading preset {}", preset.name());
                let series = preset.series();
                self.selected = self.selected.min(series.len().saturating_sub(1));
                self.replace_series(series);
            }
            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
                if self.help_visible {
                    self.log_visible = false;
                }
            }
            Action::ToggleMessages => {
                self.log_visible = !self.log_visible;
                if self.log_visible {
                    self.help_visible = false;
                }
            }
            Action::Escape => {
                self.help_visible = false;
                self.log_visible = false;
            }
        }
    }

    fn replace_series(&mut self, series: HarmonicSeries) {
        if series == self.series {
            return;
        }
        self.series = series;
        if self.series_path.is_some() {
            self.pending_save = Some(Instant::now());
        }
        self.recompute();
    }

    fn toggle_playback(&mut self) {
        if self.is_playing {
            if let Some(engine) = self.audio_engine.as_mut() {
                if let Err(e) = engine.silence() {
                    self.messages.push(format!("audio stop failed: {e}"));
                }
                if let Err(e) = engine.pause() {
                    self.messages.push(format!("audio stop failed: {e}"));
                }
            }
            self.is_playing = false;
            return;
        }

        if self.audio_engine.is_none() {
            match AudioEngine::new() {
                Ok(mut engine) => {
                    engine.set_base_frequency(self.config.base_frequency);
                    self.audio_engine = Some(engine);
                }
                Err(e) => {
                    self.messages.push(format!("audio unavailable: {e}"));
                    return;
                }
            }
        }

        if let Some(engine) = self.audio_engine.as_ref() {
            if let Err(e) = engine.play() {
                self.messages.push(format!("audio start failed: {e}"));
                return;
            }
        }
        self.is_playing = true;
        self.push_to_engine();
    }

    /// Write the series and session state if an edit is older than the
    /// debounce interval.
    pub fn flush_pending_save(&mut self) {
        let debounce = Duration::from_millis(self.config.persist_debounce_ms);
        if let Some(edited) = self.pending_save {
            if edited.elapsed() >= debounce {
                self.save_now();
            }
        }
    }

    /// Write any pending edit immediately.
    pub fn save_now(&mut self) {
        if self.pending_save.take().is_none() {
            return;
        }
        if let Some(path) = self.series_path.as_ref() {
            if let Err(e) = save_series(path, &self.series) {
                self.messages
                    .push(format!("could not save {}: {e}", path.display()));
            }
        }
        if let Some(path) = self.state_path.as_ref() {
            let state = ExplorerState {
                compression: self.compression,
            };
            if let Err(e) = save_state(path, &state) {
                self.messages
                    .push(format!("could not save {}: {e}", path.display()));
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        let list_height = (self.series.len() as u16 + 2).clamp(3, 12);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),
                Constraint::Length(list_height),
                Constraint::Length(1),
            ])
            .split(area);

        let plots = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);

        self.draw_waveform(frame, plots[0]);
        self.draw_polar(frame, plots[1]);
        self.draw_harmonics(frame, rows[1]);
        self.draw_status(frame, rows[2]);

        if self.help_visible {
            self.draw_help(frame, area);
        } else if self.log_visible {
            self.draw_messages(frame, area);
        }
    }

    fn draw_waveform(&self, frame: &mut Frame, area: Rect) {
        let plot = waveform_plot(&self.waveform, WAVE_WIDTH, WAVE_HEIGHT);
        let half = WAVE_HEIGHT / 2.0;

        let canvas = Canvas::default()
            .block(Block::default().borders(Borders::ALL).title(" Waveform "))
            .marker(Marker::Braille)
            .x_bounds([0.0, WAVE_WIDTH])
            .y_bounds([-half, half])
            .paint(|ctx| {
                for &y in plot.gridlines.iter().filter(|y| **y <= half) {
                    for level in [y, -y] {
                        ctx.draw(&CanvasLine::new(0.0, level, WAVE_WIDTH, level, Color::DarkGray));
                    }
                }
                ctx.draw(&CanvasLine::new(0.0, 0.0, WAVE_WIDTH, 0.0, Color::Gray));
                for pair in plot.trace.windows(2) {
                    let (x1, y1) = pair[0];
                    let (x2, y2) = pair[1];
                    ctx.draw(&CanvasLine::new(x1, y1, x2, y2, Color::Cyan));
                }
            });
        frame.render_widget(canvas, area);
    }

    fn draw_polar(&self, frame: &mut Frame, area: Rect) {
        let plot = polar_plot(&self.radial);
        let title = format!(" Polar  period {:.2} ", 1.0 - self.compression);

        let canvas = Canvas::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .marker(Marker::Braille)
            .x_bounds([-1.0, 1.0])
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| {
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: POLAR_REFERENCE_RADIUS,
                    color: Color::DarkGray,
                });
                for ((x1, y1), (x2, y2)) in plot.segments() {
                    ctx.draw(&CanvasLine::new(x1, y1, x2, y2, Color::Yellow));
                }
                ctx.draw(&Points {
                    coords: &plot.gaps,
                    color: Color::Red,
                });
            });
        frame.render_widget(canvas, area);
    }

    fn draw_harmonics(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .series
            .iter()
            .map(|h| {
                let label_style = if h.is_audible() {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:>3} ", h.order()), label_style),
                    Span::raw("amp "),
                    Span::styled(gauge(h.amplify), Style::default().fg(Color::Cyan)),
                    Span::raw(format!(" {:.2}  shift ", h.amplify)),
                    Span::styled(gauge(h.shift), Style::default().fg(Color::Magenta)),
                    Span::raw(format!(" {:.2}", h.shift)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" Harmonics "))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let status = self.status();
        let color = if status.is_playing {
            Color::Green
        } else {
            Color::Gray
        };
        let mut spans = vec![Span::styled(status.line(), Style::default().fg(color))];
        if let Some(latest) = self.messages.latest() {
            spans.push(Span::styled(
                format!("  | {}", latest.message),
                Style::default().fg(Color::Red),
            ));
        }
        let paragraph =
            Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
        frame.render_widget(paragraph, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered(area, 60, 70, 44, 17);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .style(Style::default().bg(Color::Black))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keys (? or Esc to close) ");
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let lines: Vec<Line> = KEY_HELP
            .iter()
            .map(|(keys, desc)| {
                Line::from(vec![
                    Span::styled(format!("{keys:<22}"), Style::default().fg(Color::Yellow)),
                    Span::raw(*desc),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_messages(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered(area, 70, 50, 40, 8);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .style(Style::default().bg(Color::Black))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Messages (m or Esc to close) ");
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        if self.messages.is_empty() {
            let paragraph =
                Paragraph::new("(no messages)").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, inner);
            return;
        }

        let lines: Vec<Line> = self
            .messages
            .recent(inner.height as usize)
            .map(|entry| {
                let elapsed = entry
                    .timestamp
                    .elapsed()
                    .map(|d| format!("{:.0}s ago", d.as_secs_f64()))
                    .unwrap_or_else(|_| "?".to_string());
                Line::from(vec![
                    Span::styled(format!("[{elapsed}] "), Style::default().fg(Color::DarkGray)),
                    Span::styled(entry.message.as_str(), Style::default().fg(Color::Red)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    /// Main event loop: draw, poll input, flush debounced saves.
    pub fn run(
        &mut self,
        terminal: &mut ratatui::Terminal<impl ratatui::backend::Backend>,
    ) -> io::Result<()> {
        while !self.should_quit {
            terminal
                .draw(|frame| self.draw(frame))
                .map_err(|e| io::Error::other(e.to_string()))?;

            if event::poll(POLL_INTERVAL)? {
                if let CrosstermEvent::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(action) = map_key(key, self.overlay_visible()) {
                            self.handle_action(action);
                        }
                    }
                }
            }

            self.flush_pending_save();
        }

        self.save_now();
        if self.is_playing {
            self.toggle_playback();
        }
        Ok(())
    }
}

/// A rectangle of `pct_w` x `pct_h` percent of `area`, at least
/// `min_w` x `min_h`, centred.
fn centered(area: Rect, pct_w: u16, pct_h: u16, min_w: u16, min_h: u16) -> Rect {
    let width = (area.width * pct_w / 100).max(min_w).min(area.width);
    let height = (area.height * pct_h / 100).max(min_h).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// A text bar filled in proportion to a `[0, 1]` value.
fn gauge(value: f64) -> String {
    let filled = ((value.clamp(0.0, 1.0) * GAUGE_WIDTH as f64).round() as usize).min(GAUGE_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(GAUGE_WIDTH - filled))
}
