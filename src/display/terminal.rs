use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::color::ColorScheme;
use crate::config::Config;
use crate::engine::{PoseFrame, Roundabout};
use crate::ipc::{self, IpcCommand};

/// Release velocity is the last drag step amplified into a flick.
const FLICK_BOOST: f64 = 8.0;

pub async fn run(config: Config, ipc_rx: mpsc::Receiver<IpcCommand>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, config, ipc_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    mut ipc_rx: mpsc::Receiver<IpcCommand>,
) -> Result<()> {
    let (carousel, _frames) = Roundabout::new(&config)?;
    let mut color_scheme = config.display.color_scheme;

    let radius = config.layout.radius;
    let vertical = config.layout.vertical;
    let swiping = !config.motion.disable_swiping;

    let mut drag_anchor: Option<(u16, u16)> = None;
    let mut last_step = 0.0f64;

    let target_fps = Duration::from_secs_f64(1.0 / 60.0);

    loop {
        // Apply pending remote commands
        while let Ok(cmd) = ipc_rx.try_recv() {
            ipc::process_ipc_command(cmd, &carousel, &mut color_scheme);
        }

        let frame_data = carousel.current_frame();

        terminal.draw(|frame| {
            let area = frame.area();

            let block = ratatui::widgets::Block::default().style(Style::default().bg(Color::Reset));
            frame.render_widget(block, area);

            render_carousel(frame, area, &frame_data, &config, &color_scheme);
            render_status(frame, area, &carousel, &color_scheme);
        })?;

        // Handle input
        if event::poll(target_fps)? {
            match event::read()? {
                Event::Key(key) => match key {
                    KeyEvent {
                        code: KeyCode::Char('q'),
                        ..
                    }
                    | KeyEvent {
                        code: KeyCode::Char('c'),
                        modifiers: KeyModifiers::CONTROL,
                        ..
                    } => {
                        break;
                    }
                    KeyEvent {
                        code: KeyCode::Left | KeyCode::Up,
                        ..
                    } => {
                        carousel.scroll_index(-1);
                    }
                    KeyEvent {
                        code: KeyCode::Right | KeyCode::Down,
                        ..
                    } => {
                        carousel.scroll_index(1);
                    }
                    KeyEvent {
                        code: KeyCode::Char('s'),
                        ..
                    } => {
                        carousel.snap();
                    }
                    KeyEvent {
                        code: KeyCode::Char('f'),
                        ..
                    } => {
                        carousel.force_settle();
                    }
                    KeyEvent {
                        code: KeyCode::Char('g'),
                        ..
                    } => {
                        carousel.recompute_geometry();
                    }
                    KeyEvent {
                        code: KeyCode::Char('c'),
                        modifiers: KeyModifiers::NONE,
                        ..
                    } => {
                        color_scheme = color_scheme.next();
                    }
                    _ => {}
                },
                Event::Mouse(mouse) if swiping => {
                    let size = terminal.size()?;
                    handle_mouse(
                        mouse,
                        &carousel,
                        &mut drag_anchor,
                        &mut last_step,
                        radius,
                        vertical,
                        (size.width, size.height),
                    );
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Translate pointer movement into drag samples and a release flick.
fn handle_mouse(
    mouse: MouseEvent,
    carousel: &Roundabout,
    drag_anchor: &mut Option<(u16, u16)>,
    last_step: &mut f64,
    radius: f64,
    vertical: bool,
    terminal_size: (u16, u16),
) {
    // One terminal cell corresponds to this many layout units along the
    // rotation axis.
    let (cols, rows) = terminal_size;
    let span = if vertical { rows } else { cols }.max(1) as f64;
    let cell_units = (2.0 * radius) / span;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            *drag_anchor = Some((mouse.column, mouse.row));
            *last_step = 0.0;
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some((col, row)) = *drag_anchor {
                let delta_cells = if vertical {
                    mouse.row as f64 - row as f64
                } else {
                    mouse.column as f64 - col as f64
                };
                let delta = delta_cells * cell_units;
                if delta != 0.0 {
                    carousel.drag_delta(delta);
                    *last_step = delta;
                }
                *drag_anchor = Some((mouse.column, mouse.row));
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if drag_anchor.take().is_some() && *last_step != 0.0 {
                carousel.spin(*last_step * FLICK_BOOST);
                *last_step = 0.0;
            }
        }
        _ => {}
    }
}

fn render_carousel(
    frame: &mut Frame,
    area: Rect,
    frame_data: &PoseFrame,
    config: &Config,
    color_scheme: &ColorScheme,
) {
    if area.width < 4 || area.height < 4 {
        return;
    }

    let radius = config.layout.radius;
    let pitch = config.layout.pitch;
    let labels = &config.items.labels;
    let count = frame_data.poses.len();

    // Painter's order: far items first so near items overdraw them.
    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|&a, &b| {
        frame_data.poses[a]
            .scale
            .total_cmp(&frame_data.poses[b].scale)
    });

    // Leave the top row for the status bar.
    let canvas = Rect::new(area.x, area.y + 1, area.width, area.height - 1);

    let (axis_offset, depth_offset) = if config.layout.vertical {
        (config.layout.offset_y, config.layout.offset_x)
    } else {
        (config.layout.offset_x, config.layout.offset_y)
    };

    for index in order {
        let pose = &frame_data.poses[index];
        if !pose.visible {
            continue;
        }
        let label = labels.get(index).map(String::as_str).unwrap_or("?");

        // Normalize the pose into the unit square: the lateral coordinate
        // spans [0, 2r] around the ring, the depth coordinate the
        // pitch-scaled band around r·pitch.
        let norm_lateral = ((pose.lateral - axis_offset) / (2.0 * radius)).clamp(0.0, 1.0);
        let depth_span = 2.0 * radius * pitch.abs();
        let norm_depth = if depth_span > 0.0 {
            ((pose.depth - depth_offset - radius * pitch + radius * pitch.abs()) / depth_span)
                .clamp(0.0, 1.0)
        } else {
            0.5
        };

        let (norm_x, norm_y) = if config.layout.vertical {
            (norm_depth, norm_lateral)
        } else {
            (norm_lateral, norm_depth)
        };

        let max_x = canvas.width.saturating_sub(label.len() as u16).max(1) as f64;
        let col = canvas.x + (norm_x * max_x) as u16;
        let row = canvas.y + (norm_y * (canvas.height - 1) as f64) as u16;

        let position = index as f32 / count.max(1) as f32;
        let (r, g, b) = color_scheme.get_color(position, pose.scale as f32);
        let mut style = Style::default().fg(Color::Rgb(r, g, b));
        if pose.scale > 0.75 {
            style = style.add_modifier(Modifier::BOLD);
        }

        for (i, ch) in label.chars().enumerate() {
            let x = col + i as u16;
            if x < canvas.x + canvas.width && row < canvas.y + canvas.height {
                if let Some(cell) = frame.buffer_mut().cell_mut((x, row)) {
                    cell.set_char(ch);
                    cell.set_style(style);
                }
            }
        }
    }
}

fn render_status(frame: &mut Frame, area: Rect, carousel: &Roundabout, color_scheme: &ColorScheme) {
    let status = format!(
        " drag to spin | arrows: step | [s]nap [f]lat [g]eometry | [c]olor: {} | glides: {} | [q]uit ",
        color_scheme.name(),
        carousel.active_glides(),
    );

    for (i, ch) in status.chars().enumerate() {
        if i < area.width as usize {
            let cell = frame.buffer_mut().cell_mut((area.x + i as u16, area.y));
            if let Some(cell) = cell {
                cell.set_char(ch);
                cell.set_fg(Color::DarkGray);
            }
        }
    }
}
