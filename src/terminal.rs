// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front end
//!
//! Draws the permissions and camera screens with ratatui and turns mouse
//! input into gestures:
//! - Left button down/drag/up on the capture button: press, pan, release
//! - Scroll wheel over the preview: pinch (ends after a short pause)
//! - Double click on the preview: flip camera

use crate::app::state::{Message, Screen};
use crate::app::{AppModel, Runtime};
use crate::backends::camera::{FlashMode, VirtualCaptureDevice};
use crate::config::Config;
use crate::constants::{PINCH_IDLE_TIMEOUT, PINCH_SCROLL_STEP, ui};
use crate::controls::capture_button::ButtonVisualState;

use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
        EventStream, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Gauge, Paragraph, Widget},
};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Run the terminal camera app
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_async(config))
}

async fn run_async(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let device = Arc::new(VirtualCaptureDevice::new(
        config.virtual_device.clone(),
        config.video_directory(),
    ));
    let model = AppModel::new(config, device.as_ref());
    let mut app = Runtime::new(model, device);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

/// Screen regions, recomputed on every draw and used for hit testing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ScreenLayout {
    header: Rect,
    preview: Rect,
    zoom_bar: Rect,
    button_slot: Rect,
    status: Rect,
}

impl ScreenLayout {
    fn new(area: Rect) -> Self {
        let [header, preview, zoom_bar, controls, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(ui::CAPTURE_BUTTON_CELLS_HIGH + ui::CONTENT_SPACING * 2),
            Constraint::Length(1),
        ])
        .areas(area);

        let width = ui::CAPTURE_BUTTON_CELLS_WIDE.min(controls.width);
        let height = ui::CAPTURE_BUTTON_CELLS_HIGH.min(controls.height);
        let button_slot = Rect {
            x: controls.x + (controls.width - width) / 2,
            y: controls.y + (controls.height - height) / 2,
            width,
            height,
        };

        Self {
            header,
            preview,
            zoom_bar,
            button_slot,
            status,
        }
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

/// Terminal-only input state
#[derive(Debug, Default)]
struct UiState {
    layout: ScreenLayout,
    /// Left button went down on the capture button
    holding_button: bool,
    /// Scale and time of the last scroll of a running pinch
    pinch: Option<(f64, Instant)>,
    last_preview_click: Option<Instant>,
    show_help: bool,
    started: Option<Instant>,
}

impl UiState {
    fn scroll(&mut self, app: &mut Runtime, zoom_in: bool) {
        let scale = match self.pinch {
            Some((scale, _)) => scale,
            None => {
                app.dispatch(Message::PinchStarted);
                1.0
            }
        };
        let scale = if zoom_in {
            scale * PINCH_SCROLL_STEP
        } else {
            scale / PINCH_SCROLL_STEP
        };
        self.pinch = Some((scale, Instant::now()));
        app.dispatch(Message::PinchChanged(scale));
    }

    /// Returns true when this click completes a double click
    fn preview_click(&mut self, now: Instant) -> bool {
        let interval = Duration::from_millis(ui::DOUBLE_CLICK_INTERVAL_MS);
        match self.last_preview_click.take() {
            Some(last) if now.saturating_duration_since(last) <= interval => true,
            _ => {
                self.last_preview_click = Some(now);
                false
            }
        }
    }

    /// Scroll-driven pinches end after a short pause
    fn end_idle_pinch(&mut self, app: &mut Runtime) {
        if let Some((_, last)) = self.pinch
            && last.elapsed() >= PINCH_IDLE_TIMEOUT
        {
            self.pinch = None;
            app.dispatch(Message::PinchEnded);
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut Runtime,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut events = EventStream::new();
    let mut frame_tick = tokio::time::interval(Duration::from_millis(ui::FRAME_INTERVAL_MS));
    let mut state = UiState {
        started: Some(Instant::now()),
        ..Default::default()
    };

    loop {
        let mut layout = state.layout;
        terminal.draw(|f| layout = render(f, app.model(), &state))?;
        state.layout = layout;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => {
                    if handle_event(event, app, &mut state) {
                        break;
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(message) = app.next_message() => app.dispatch(message),
            _ = frame_tick.tick() => state.end_idle_pinch(app),
        }
    }

    info!("Terminal app exiting");
    Ok(())
}

/// Returns true when the app should quit
fn handle_event(event: Event, app: &mut Runtime, state: &mut UiState) -> bool {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C or 'q' to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return true;
            }
            match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('h') => state.show_help = !state.show_help,
                KeyCode::Char('r') | KeyCode::Enter => {
                    if let Some(kind) = app.model().permissions().next_missing() {
                        app.dispatch(Message::RequestPermission(kind));
                    }
                }
                KeyCode::Char('f') => app.dispatch(Message::FlipCamera),
                KeyCode::Char('l') => app.dispatch(Message::ToggleFlash),
                _ => {}
            }
        }
        Event::Mouse(mouse) => handle_mouse(mouse, app, state),
        Event::FocusGained => app.dispatch(Message::FocusChanged(true)),
        Event::FocusLost => app.dispatch(Message::FocusChanged(false)),
        _ => {}
    }
    false
}

fn handle_mouse(mouse: MouseEvent, app: &mut Runtime, state: &mut UiState) {
    if app.model().screen() != Screen::Camera {
        return;
    }
    let y = mouse.row as f64 * ui::CELL_HEIGHT_PX;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left)
            if contains(state.layout.button_slot, mouse.column, mouse.row) =>
        {
            state.holding_button = true;
            app.dispatch(Message::CapturePressed { y });
        }
        MouseEventKind::Down(MouseButton::Left)
            if contains(state.layout.preview, mouse.column, mouse.row) =>
        {
            if state.preview_click(Instant::now()) {
                app.dispatch(Message::FlipCamera);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if state.holding_button => {
            app.dispatch(Message::CaptureDragged { y });
        }
        MouseEventKind::Up(MouseButton::Left) if state.holding_button => {
            state.holding_button = false;
            app.dispatch(Message::CaptureReleased);
        }
        MouseEventKind::ScrollUp if contains(state.layout.preview, mouse.column, mouse.row) => {
            state.scroll(app, true);
        }
        MouseEventKind::ScrollDown if contains(state.layout.preview, mouse.column, mouse.row) => {
            state.scroll(app, false);
        }
        _ => {}
    }
    debug!(kind = ?mouse.kind, row = mouse.row, column = mouse.column, "Mouse event");
}

fn render(f: &mut Frame, model: &AppModel, state: &UiState) -> ScreenLayout {
    let area = f.area();
    match model.screen() {
        Screen::Permissions => {
            render_permissions(f, model, area);
            ScreenLayout::default()
        }
        Screen::Camera => {
            let layout = ScreenLayout::new(area);
            render_camera(f, model, state, &layout);
            layout
        }
    }
}

fn render_permissions(f: &mut Frame, model: &AppModel, area: Rect) {
    let permissions = model.permissions();
    let mut lines = vec![
        Line::from(Span::styled(
            "Welcome to holdcam",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if !permissions.camera.is_authorized() {
        lines.push(Line::from(format!(
            "Camera access: {} - press 'r' to grant",
            permissions.camera
        )));
    }
    if !permissions.microphone.is_authorized() {
        lines.push(Line::from(format!(
            "Microphone access: {} - press 'r' to grant",
            permissions.microphone
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("'q' quit"));

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(" Permissions ");
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn render_camera(f: &mut Frame, model: &AppModel, state: &UiState, layout: &ScreenLayout) {
    let camera = model.camera();

    // Header: device, flash, recording indicator
    let mut header = vec![Span::raw(
        camera
            .active_device
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_else(|| "No camera".to_string()),
    )];
    if camera.supports_flash() {
        let flash = match camera.flash {
            FlashMode::Off => "  flash off",
            FlashMode::On => "  flash on",
        };
        header.push(Span::raw(flash));
    }
    if let Some(elapsed) = camera.button.recording().elapsed(Instant::now()) {
        let seconds = elapsed.as_secs();
        header.push(Span::styled(
            format!("  ● REC {:02}:{:02}", seconds / 60, seconds % 60),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(header)), layout.header);

    f.render_widget(
        Viewfinder {
            model,
            active: model.is_camera_active(),
        },
        layout.preview,
    );

    // Zoom bar
    let range = camera.zoom.range();
    let ratio = if range.span() > 0.0 {
        ((camera.zoom.value() - range.min) / range.span()).clamp(0.0, 1.0)
    } else {
        0.0
    };
    f.render_widget(
        Gauge::default()
            .block(Block::bordered().title(" Zoom "))
            .gauge_style(Style::default().fg(Color::Yellow))
            .ratio(ratio)
            .label(format!(
                "{:.1}x  ({:.0}x - {:.0}x)",
                camera.zoom.value(),
                range.min,
                range.max
            )),
        layout.zoom_bar,
    );

    let pulse_on = state
        .started
        .map(|t| (t.elapsed().as_millis() / 400) % 2 == 0)
        .unwrap_or(true);
    f.render_widget(
        CaptureButtonWidget {
            model,
            pulse_on,
        },
        layout.button_slot,
    );

    let status = if state.show_help {
        "hold button: record | drag up/down while holding: zoom | scroll: pinch | f / double-click: flip | l: flash | q: quit".to_string()
    } else {
        match camera.last_captured() {
            Some(media) => format!("Saved: {} | 'h' help", media.file.path.display()),
            None => "'h' help | 'q' quit".to_string(),
        }
    };
    f.render_widget(StatusBar { message: &status }, layout.status);
}

/// Field-of-view box shrinking as the zoom grows
struct Viewfinder<'a> {
    model: &'a AppModel,
    active: bool,
}

impl Widget for Viewfinder<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let camera = self.model.camera();
        let block = Block::bordered().border_type(BorderType::Rounded);
        let inner = block.inner(area);
        block.render(area, buf);

        let message = if camera.active_device.is_none() {
            Some("No camera available")
        } else if !self.active {
            Some("Camera paused")
        } else {
            None
        };
        if let Some(message) = message {
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .render(centered_row(inner), buf);
            return;
        }

        let range = camera.zoom.range();
        let fov = (range.min / camera.zoom.value()).clamp(0.0, 1.0);
        let width = ((inner.width as f64 * fov).round() as u16).max(2);
        let height = ((inner.height as f64 * fov).round() as u16).max(2);
        let frame = Rect {
            x: inner.x + (inner.width.saturating_sub(width)) / 2,
            y: inner.y + (inner.height.saturating_sub(height)) / 2,
            width: width.min(inner.width),
            height: height.min(inner.height),
        };
        Block::bordered()
            .border_style(Style::default().fg(Color::DarkGray))
            .render(frame, buf);
        Paragraph::new("+")
            .alignment(Alignment::Center)
            .render(centered_row(inner), buf);
    }
}

fn centered_row(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + area.height / 2,
        width: area.width,
        height: area.height.min(1),
    }
}

/// Capture button drawn at its animated scale
struct CaptureButtonWidget<'a> {
    model: &'a AppModel,
    pulse_on: bool,
}

impl Widget for CaptureButtonWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let button = &self.model.camera().button;
        let visual = button.visual();

        let scale = if visual.pulsing && !self.pulse_on {
            visual.scale * 0.9
        } else {
            visual.scale
        };
        let width = ((area.width as f64 * scale).round() as u16).clamp(2, area.width.max(2));
        let height = ((area.height as f64 * scale).round() as u16).clamp(2, area.height.max(2));
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width: width.min(area.width),
            height: height.min(area.height),
        };

        let color = match visual.state {
            ButtonVisualState::Disabled => Color::DarkGray,
            ButtonVisualState::PressedHolding if button.recording().is_recording() => Color::Red,
            ButtonVisualState::PressedHolding => Color::LightRed,
            ButtonVisualState::Idle => Color::White,
        };
        let style = if visual.opacity < 1.0 {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(color)
        };
        let border = if visual.state == ButtonVisualState::PressedHolding {
            BorderType::Thick
        } else {
            BorderType::Rounded
        };

        Block::bordered()
            .border_type(border)
            .border_style(style)
            .render(rect, buf);
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_places_button_inside_screen() {
        let area = Rect::new(0, 0, 80, 30);
        let layout = ScreenLayout::new(area);
        assert!(layout.button_slot.width <= ui::CAPTURE_BUTTON_CELLS_WIDE);
        assert!(layout.button_slot.bottom() <= layout.status.y);
        assert!(layout.preview.height >= 3);
    }

    #[test]
    fn test_double_click_on_preview() {
        let mut state = UiState::default();
        let start = Instant::now();
        assert!(!state.preview_click(start));
        assert!(state.preview_click(start + Duration::from_millis(150)));

        // A third click starts a new pair
        assert!(!state.preview_click(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_slow_clicks_do_not_flip() {
        let mut state = UiState::default();
        let start = Instant::now();
        let gap = Duration::from_millis(ui::DOUBLE_CLICK_INTERVAL_MS + 1);
        assert!(!state.preview_click(start));
        assert!(!state.preview_click(start + gap));
        assert!(state.preview_click(start + gap + Duration::from_millis(100)));
    }

    #[test]
    fn test_contains() {
        let rect = Rect::new(10, 5, 4, 2);
        assert!(contains(rect, 10, 5));
        assert!(contains(rect, 13, 6));
        assert!(!contains(rect, 14, 6));
        assert!(!contains(rect, 10, 7));
    }
}
