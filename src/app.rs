use crate::anchor::{build_anchors, AnchorTable};
use crate::animate::{InputEvent, InputKind, Scheduler};
use crate::buffer::{SourceBuffer, SourceDocument};
use crate::config::Config;
use crate::error::SyncError;
use crate::export;
use crate::format::{apply_format, Format};
use crate::preview::{
    self, find_selections, highlight_range, ordinal_of, CodeHighlighter, PreviewLayout, PreviewStyles,
    Selection,
};
use crate::protocol::{self, Endpoint, Message};
use crate::render::render_markdown;
use crate::sync::{PositionTable, ScrollOrigin, ScrollPhase, SyncCoordinator, Throttle, Viewport};
use crate::theme::{styles_from_palette, ThemeManager, UiPalette};
use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::execute;
use notify::{RecursiveMode, Watcher};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Paragraph};
use ratatui::Terminal;
use std::fs;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const IDLE_TICK: Duration = Duration::from_millis(250);
const WHEEL_ROWS: usize = 3;

pub fn run_app(path: PathBuf, config: Config) -> Result<()> {
    let mut app = App::new(path, config, ThemeManager::load())?;

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;
    watcher.watch(&app.file_path, RecursiveMode::NonRecursive)?;
    info!(path = %app.file_path.display(), "opened");

    loop {
        let size = terminal.size()?;
        let layout = app.layout(size);
        app.ensure_layout(layout.preview_width, layout.preview_height, layout.source_height);
        app.pump(Instant::now());

        terminal.draw(|f| ui(f, &app, &layout))?;

        if event::poll(app.next_wakeup(Instant::now()))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key, Instant::now()) {
                        break;
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse, &layout, Instant::now()),
                _ => {}
            }
        }

        while let Ok(msg) = rx.try_recv() {
            if let Ok(event) = msg {
                app.on_fs_event(event);
            }
        }

        app.handle_pending_reload();
    }

    info!("closed");
    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

#[derive(Default)]
struct FsReload {
    pending: bool,
    deadline: Option<Instant>,
}

/// Animation frames as a deadline checked from the event loop.
struct FrameClock {
    period: Duration,
    next: Option<Instant>,
}

impl FrameClock {
    fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    fn take_due(&mut self, now: Instant) -> bool {
        match self.next {
            Some(at) if at <= now => {
                self.next = None;
                true
            }
            _ => false,
        }
    }
}

impl Scheduler for FrameClock {
    fn schedule(&mut self) {
        if self.next.is_none() {
            self.next = Some(Instant::now() + self.period);
        }
    }

    fn cancel(&mut self) {
        self.next = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    SearchInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Source,
    Preview,
}

struct LayoutInfo {
    status: Rect,
    source: Rect,
    preview: Rect,
    source_height: u16,
    preview_width: u16,
    preview_height: u16,
}

struct App {
    file_path: PathBuf,
    config: Config,
    theme_manager: ThemeManager,
    ui: UiPalette,
    base_style: Style,
    preview_styles: PreviewStyles,

    buffer: SourceBuffer,
    source_lines: Vec<String>,
    highlighted: Vec<Line<'static>>,
    source_scroll: usize,
    source_height: usize,
    scroll_to: Throttle<(usize, usize)>,

    view: PreviewLayout,
    anchors: AnchorTable,
    positions: PositionTable,
    viewport: Viewport,
    preview_width: u16,
    sync: SyncCoordinator,
    frames: FrameClock,

    source_end: Endpoint,
    preview_end: Endpoint,

    selections: Vec<Selection>,
    current_selection: usize,
    search_query: String,
    search_input: String,
    focus: Focus,
    mode: Mode,
    status: Option<String>,
    reload: FsReload,
    suppress_reload_until: Option<Instant>,
    render_dirty: bool,
    quit_armed: bool,
}

impl App {
    fn new(path: PathBuf, config: Config, theme_manager: ThemeManager) -> Result<Self> {
        let markdown =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let ui = theme_manager.ui_palette(&config.theme)?;
        let (base_style, preview_styles) = styles_from_palette(ui);
        let settings = config.sync.settings();
        let (source_end, preview_end) = protocol::channel();

        let mut app = Self {
            file_path: path,
            theme_manager,
            ui,
            base_style,
            preview_styles,
            buffer: SourceBuffer::new(&markdown),
            source_lines: Vec::new(),
            highlighted: Vec::new(),
            source_scroll: 0,
            source_height: 1,
            scroll_to: Throttle::new(settings.throttle),
            view: preview::layout(&[], &preview_styles, None, 1, config.wrap, config.tab_width),
            anchors: AnchorTable::default(),
            positions: PositionTable::default(),
            viewport: Viewport {
                height: 1.0,
                content_height: 0.0,
            },
            preview_width: 80,
            sync: SyncCoordinator::new(settings),
            frames: FrameClock::new(settings.frame),
            source_end,
            preview_end,
            selections: Vec::new(),
            current_selection: 0,
            search_query: String::new(),
            search_input: String::new(),
            focus: Focus::Source,
            mode: Mode::Normal,
            status: Some("Tab switches pane, / selects text in the preview".to_string()),
            reload: FsReload::default(),
            suppress_reload_until: None,
            render_dirty: false,
            quit_armed: false,
            config,
        };
        app.rebuild();
        Ok(app)
    }

    fn layout(&self, size: Rect) -> LayoutInfo {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(size);
        let split = self.config.split_percent.clamp(10, 90);
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(split), Constraint::Percentage(100 - split)])
            .split(vertical[0]);

        LayoutInfo {
            status: vertical[1],
            source: panes[0],
            preview: panes[1],
            source_height: panes[0].height.saturating_sub(2).max(1),
            preview_width: panes[1].width.saturating_sub(2).max(1),
            preview_height: panes[1].height.saturating_sub(2).max(1),
        }
    }

    fn ensure_layout(&mut self, preview_width: u16, preview_height: u16, source_height: u16) {
        self.viewport.height = preview_height as f64;
        self.source_height = source_height as usize;
        if self.preview_width != preview_width || self.render_dirty {
            self.preview_width = preview_width;
            self.rebuild();
        }
        self.source_scroll = self.source_scroll.min(self.max_source_scroll());
    }

    /// Re-render everything derived from the buffer.
    fn rebuild(&mut self) {
        let text = self.buffer.current_text();
        self.source_lines = self.buffer.source_lines();
        self.highlighted = match self
            .theme_manager
            .highlight_source(&self.source_lines, &self.config.theme)
        {
            Ok(lines) => lines,
            Err(err) => {
                warn!(%err, "source highlighting failed");
                self.source_lines.iter().map(|l| Line::from(l.clone())).collect()
            }
        };

        let rendered = render_markdown(&text);
        self.anchors = build_anchors(&self.source_lines, &rendered, &self.config.anchor.settings());
        let code = self
            .theme_manager
            .code_theme(&self.config.theme, self.preview_styles.code_block.bg)
            .ok();
        self.view = preview::layout(
            &rendered,
            &self.preview_styles,
            code.as_ref().map(|c| c as &dyn CodeHighlighter),
            self.preview_width,
            self.config.wrap,
            self.config.tab_width,
        );
        self.positions = PositionTable::new(&self.anchors, &self.view.blocks);
        self.viewport.content_height = self.view.content_height();
        let max = self.viewport.scrollable_height();
        if self.sync.offset() > max {
            self.sync.set_offset(max);
        }

        if !self.search_query.is_empty() {
            self.selections = find_selections(&self.view, &self.search_query, self.config.search_case_sensitive);
            if self.current_selection >= self.selections.len() {
                self.current_selection = 0;
            }
        }
        self.render_dirty = false;
        debug!(
            blocks = self.view.blocks.len(),
            rows = self.view.lines.len(),
            "rebuilt preview"
        );
    }

    /// Animation frames, sync timers and message delivery.
    fn pump(&mut self, now: Instant) {
        if self.frames.take_due(now) {
            self.sync.tick(now, &mut self.frames);
        }
        let poll = self.sync.poll(now, &mut self.frames);
        if let Some(line) = poll.reveal {
            self.preview_end.send(Message::RevealLine { line });
        }
        if let Some((line, total_lines)) = self.scroll_to.flush(now) {
            self.source_end.send(Message::ScrollTo { line, total_lines });
        }

        for msg in self.preview_end.drain() {
            self.on_preview_message(msg, now);
        }
        for msg in self.source_end.drain() {
            self.on_source_message(msg);
        }
    }

    fn on_preview_message(&mut self, msg: Message, now: Instant) {
        match msg {
            Message::ScrollTo { line, total_lines } => {
                if let Err(err) = self.sync.on_scroll_to(
                    line,
                    total_lines,
                    &self.positions,
                    &self.viewport,
                    now,
                    &mut self.frames,
                ) {
                    debug!(%err, "scrollTo dropped");
                }
            }
            other => warn!(?other, "unexpected message for the preview"),
        }
    }

    fn on_source_message(&mut self, msg: Message) {
        let hint = msg.resolve_hint();
        match msg {
            Message::RevealLine { line } => self.reveal_source_line(line),
            Message::ApplyFormat {
                format,
                selected_text,
                ..
            } => {
                let hint = hint.unwrap_or_default();
                match apply_format(
                    &mut self.buffer,
                    &selected_text,
                    format,
                    &hint,
                    &self.config.red_highlight_style,
                ) {
                    Ok(edit) => {
                        self.render_dirty = true;
                        self.reveal_source_line(edit.range().line);
                        self.status = Some(format!("{format:?} applied on line {}", edit.range().line + 1));
                    }
                    Err(err) => {
                        let visible = err
                            .downcast_ref::<SyncError>()
                            .is_some_and(SyncError::is_user_visible);
                        warn!(error = %err, "format not applied");
                        self.status = Some(if visible {
                            err.to_string()
                        } else {
                            format!("Edit failed: {err:#}")
                        });
                    }
                }
            }
            Message::RequestExport => {
                let text = self.buffer.current_text();
                self.status = Some(
                    match export::write_export(&self.file_path, &text, None, &self.config.anchor.settings()) {
                        Ok(path) => format!("Exported {}", path.display()),
                        Err(err) => format!("Export failed: {err:#}"),
                    },
                );
            }
            other => warn!(?other, "unexpected message for the source"),
        }
    }

    fn next_wakeup(&self, now: Instant) -> Duration {
        [
            self.frames.next,
            self.sync.next_deadline(),
            self.scroll_to.next_deadline(),
            self.reload.deadline,
        ]
        .into_iter()
        .flatten()
        .min()
        .map(|at| at.saturating_duration_since(now).min(IDLE_TICK))
        .unwrap_or(IDLE_TICK)
    }

    fn max_source_scroll(&self) -> usize {
        self.source_lines.len().saturating_sub(self.source_height)
    }

    fn scroll_source_to(&mut self, scroll: usize, now: Instant) {
        let scroll = scroll.min(self.max_source_scroll());
        if scroll == self.source_scroll {
            return;
        }
        self.source_scroll = scroll;
        let total = self.buffer.line_count();
        if total == 0 {
            return;
        }
        let center = (scroll + self.source_height / 2).min(total - 1);
        if let Some((line, total_lines)) = self.scroll_to.offer((center, total), now) {
            self.source_end.send(Message::ScrollTo { line, total_lines });
        }
    }

    fn scroll_source(&mut self, delta: isize, now: Instant) {
        let target = self.source_scroll.saturating_add_signed(delta);
        self.scroll_source_to(target, now);
    }

    /// Centre `line` in the source pane without reporting it back.
    fn reveal_source_line(&mut self, line: usize) {
        self.source_scroll = line
            .saturating_sub(self.source_height / 2)
            .min(self.max_source_scroll());
    }

    fn scroll_preview_to(&mut self, offset: f64, now: Instant) {
        let offset = offset.clamp(0.0, self.viewport.scrollable_height());
        self.sync.set_offset(offset);
        if let Some(line) = self.sync.on_rendered_scroll(
            offset,
            ScrollOrigin::User,
            &self.positions,
            &self.viewport,
            self.source_lines.len(),
            now,
        ) {
            self.preview_end.send(Message::RevealLine { line });
        }
    }

    fn scroll_preview(&mut self, delta: f64, now: Instant) {
        let offset = self.sync.offset().round() + delta;
        self.scroll_preview_to(offset, now);
    }

    fn scroll_focused(&mut self, rows: isize, now: Instant) {
        match self.focus {
            Focus::Source => self.scroll_source(rows, now),
            Focus::Preview => self.scroll_preview(rows as f64, now),
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        self.sync
            .on_user_input(InputEvent::user(InputKind::KeyDown), now, &mut self.frames);
        match self.mode {
            Mode::SearchInput => {
                self.handle_search_input(key, now);
                false
            }
            Mode::Normal => self.handle_normal_mode(key, now),
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.search_input.clear();
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                let query = std::mem::take(&mut self.search_input);
                self.run_search(query.trim(), now);
            }
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search_input.push(c);
            }
            _ => {}
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent, now: Instant) -> bool {
        let half_page = (match self.focus {
            Focus::Source => self.source_height,
            Focus::Preview => self.viewport.height as usize,
        } / 2)
            .max(1) as isize;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !matches!(key.code, KeyCode::Char('q')) {
            self.quit_armed = false;
        }

        match key.code {
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Char('q') => {
                if !self.buffer.is_dirty() || self.quit_armed {
                    return true;
                }
                self.quit_armed = true;
                self.status = Some("Unsaved edits: w to save, q again to quit".to_string());
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Source => Focus::Preview,
                    Focus::Preview => Focus::Source,
                };
            }
            KeyCode::Char('d') if ctrl => self.scroll_focused(half_page, now),
            KeyCode::Char('u') if ctrl => self.scroll_focused(-half_page, now),
            KeyCode::PageDown => self.scroll_focused(half_page, now),
            KeyCode::PageUp => self.scroll_focused(-half_page, now),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_focused(1, now),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_focused(-1, now),
            KeyCode::Char('g') | KeyCode::Home => match self.focus {
                Focus::Source => self.scroll_source_to(0, now),
                Focus::Preview => self.scroll_preview_to(0.0, now),
            },
            KeyCode::Char('G') | KeyCode::End => match self.focus {
                Focus::Source => self.scroll_source_to(usize::MAX, now),
                Focus::Preview => self.scroll_preview_to(f64::MAX, now),
            },
            KeyCode::Char('/') => {
                self.mode = Mode::SearchInput;
                self.search_input.clear();
            }
            KeyCode::Char('n') => self.step_selection(1, now),
            KeyCode::Char('N') => self.step_selection(-1, now),
            KeyCode::Esc => {
                self.selections.clear();
                self.search_query.clear();
                self.status = None;
            }
            KeyCode::Char('b') => self.format_selection(Format::Bold),
            KeyCode::Char('h') => self.format_selection(Format::Highlight),
            KeyCode::Char('r') => self.format_selection(Format::RedHighlight),
            KeyCode::Char('x') => self.format_selection(Format::Delete),
            KeyCode::Char('w') => self.save_buffer(),
            KeyCode::Char('e') => self.preview_end.send(Message::RequestExport),
            _ => {}
        }
        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, layout: &LayoutInfo, now: Instant) {
        let over_preview = mouse.column >= layout.preview.x;
        let kind = match mouse.kind {
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => InputKind::Wheel,
            MouseEventKind::Down(_) => InputKind::PointerDown,
            _ => return,
        };
        self.sync.on_user_input(InputEvent::user(kind), now, &mut self.frames);

        let rows = match mouse.kind {
            MouseEventKind::ScrollDown => WHEEL_ROWS as isize,
            MouseEventKind::ScrollUp => -(WHEEL_ROWS as isize),
            _ => {
                self.focus = if over_preview { Focus::Preview } else { Focus::Source };
                return;
            }
        };
        if over_preview {
            self.scroll_preview(rows as f64, now);
        } else {
            self.scroll_source(rows, now);
        }
    }

    fn run_search(&mut self, query: &str, now: Instant) {
        self.search_query = query.to_string();
        self.selections = find_selections(&self.view, query, self.config.search_case_sensitive);
        self.current_selection = 0;
        if self.selections.is_empty() {
            if !query.is_empty() {
                self.status = Some("No matches".to_string());
            }
            return;
        }
        self.focus = Focus::Preview;
        self.focus_selection(now);
    }

    fn step_selection(&mut self, delta: isize, now: Instant) {
        let len = self.selections.len();
        if len == 0 {
            return;
        }
        let idx = self.current_selection as isize + delta;
        self.current_selection = idx.rem_euclid(len as isize) as usize;
        self.focus_selection(now);
    }

    fn focus_selection(&mut self, now: Instant) {
        let Some(selection) = self.selections.get(self.current_selection) else {
            return;
        };
        let offset = selection.row as f64 - (self.viewport.height / 2.0).floor();
        self.status = Some(format!(
            "selection {}/{}",
            self.current_selection + 1,
            self.selections.len()
        ));
        self.scroll_preview_to(offset, now);
    }

    /// Ask the source side to apply `format` to the current selection.
    fn format_selection(&mut self, format: Format) {
        let Some(selection) = self.selections.get(self.current_selection) else {
            self.status = Some("Nothing selected (/ to search the preview)".to_string());
            return;
        };
        let block = selection.block;
        self.preview_end.send(Message::ApplyFormat {
            format,
            selected_text: selection.text.clone(),
            line_hint: block.and_then(|b| preview::data_line(&self.anchors, b)),
            block_text_hint: block
                .and_then(|b| self.view.blocks.get(b))
                .map(|b| b.text_content.clone()),
            ordinal: Some(ordinal_of(&self.selections, self.current_selection)),
        });
    }

    fn save_buffer(&mut self) {
        let text = self.buffer.current_text();
        if let Err(err) = fs::write(&self.file_path, &text) {
            warn!(%err, "save failed");
            self.status = Some(format!("Save failed: {err}"));
            return;
        }
        self.buffer.mark_saved();
        self.suppress_reload_until = Some(Instant::now() + Duration::from_millis(300));
        self.status = Some("Saved".to_string());
        info!(path = %self.file_path.display(), "saved");
    }

    fn request_reload(&mut self) {
        self.reload.pending = true;
        self.reload.deadline = Some(Instant::now() + Duration::from_millis(150));
    }

    fn on_fs_event(&mut self, _event: notify::Event) {
        if self.buffer.is_dirty() {
            self.status = Some("External change ignored (unsaved edits)".to_string());
            return;
        }
        if let Some(until) = self.suppress_reload_until {
            if Instant::now() < until {
                return;
            }
            self.suppress_reload_until = None;
        }
        self.request_reload();
    }

    fn handle_pending_reload(&mut self) {
        if !self.reload.pending {
            return;
        }
        if let Some(deadline) = self.reload.deadline {
            if Instant::now() < deadline {
                return;
            }
        }
        self.reload.pending = false;
        self.reload.deadline = None;
        self.reload_file();
    }

    fn reload_file(&mut self) {
        let markdown = match fs::read_to_string(&self.file_path) {
            Ok(text) => text,
            Err(err) => {
                self.status = Some(format!("Failed to reload: {err}"));
                return;
            }
        };
        self.buffer.reload(&markdown);
        self.sync.reset();
        self.frames.cancel();
        self.rebuild();
        let scroll = self.source_scroll;
        self.source_scroll = usize::MAX;
        self.scroll_source_to(scroll, Instant::now());
        self.status = Some("Reloaded".to_string());
        info!(path = %self.file_path.display(), "reloaded");
    }

    fn preview_rows(&self, height: usize) -> Vec<Line<'static>> {
        let top = self.sync.offset().round().max(0.0) as usize;
        let active = self.selections.get(self.current_selection);
        self.view
            .lines
            .iter()
            .enumerate()
            .skip(top)
            .take(height)
            .map(|(row, line)| match active {
                Some(sel) if sel.row == row => highlight_range(line, sel.start, sel.end),
                _ => line.clone(),
            })
            .collect()
    }

    fn status_line(&self) -> Line<'static> {
        if self.mode == Mode::SearchInput {
            return Line::from(vec![
                Span::styled("/", Style::default().fg(self.ui.accent)),
                Span::styled(self.search_input.clone(), self.base_style),
            ]);
        }
        let sep = || Span::styled(" | ", Style::default().fg(self.ui.muted));
        let mut parts = vec![
            Span::styled(
                "marksync",
                Style::default().fg(self.ui.accent).add_modifier(Modifier::BOLD),
            ),
            sep(),
            Span::styled(
                match self.focus {
                    Focus::Source => "source",
                    Focus::Preview => "preview",
                },
                Style::default().fg(self.ui.accent),
            ),
            sep(),
            Span::styled(self.file_path.to_string_lossy().to_string(), self.base_style),
        ];
        let phase = match self.sync.state().phase {
            ScrollPhase::Idle => None,
            ScrollPhase::AnimatingToTarget => Some("syncing"),
            ScrollPhase::Suppressed => Some("synced"),
        };
        if let Some(phase) = phase {
            parts.push(sep());
            parts.push(Span::styled(phase, Style::default().fg(self.ui.muted)));
        }
        if let Some(msg) = &self.status {
            parts.push(sep());
            parts.push(Span::styled(msg.clone(), Style::default().fg(self.ui.accent)));
        }
        Line::from(parts)
    }

    fn pane_block(&self, title: String, focused: bool) -> Block<'static> {
        let border = if focused { self.ui.accent } else { self.ui.muted };
        Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(self.base_style)
    }
}

fn ui(f: &mut ratatui::Frame, app: &App, layout: &LayoutInfo) {
    f.render_widget(
        Paragraph::new(app.status_line()).style(app.base_style),
        layout.status,
    );

    let file_name = app
        .file_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("marksync");
    let title = if app.buffer.is_dirty() {
        format!(" *{file_name} ")
    } else {
        format!(" {file_name} ")
    };
    let source_rows: Vec<Line<'static>> = app
        .highlighted
        .iter()
        .skip(app.source_scroll)
        .take(layout.source_height as usize)
        .cloned()
        .collect();
    f.render_widget(
        Paragraph::new(Text::from(source_rows))
            .block(app.pane_block(title, app.focus == Focus::Source))
            .style(app.base_style),
        layout.source,
    );

    let preview_rows = app.preview_rows(layout.preview_height as usize);
    f.render_widget(
        Paragraph::new(Text::from(preview_rows))
            .block(app.pane_block(" Preview ".to_string(), app.focus == Focus::Preview))
            .style(app.base_style),
        layout.preview,
    );
}
