//! TUI rendering — orchestrates all panes.

pub mod messages;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Position, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame. Records the message pane's scroll
/// range on `app`.
pub fn draw(f: &mut Frame, app: &mut App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // messages
      Constraint::Length(3), // input
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0]);
  let limit = messages::draw(f, rows[1], app);
  app.set_scroll_limit(limit);
  draw_input(f, rows[2], app);
  draw_status(f, rows[3], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let time = Local::now().format("%H:%M").to_string();

  let left = Span::styled(
    " murmur  home assistant chat",
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{time} "), Style::default().fg(Color::Gray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);
  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Input ────────────────────────────────────────────────────────────────────

fn draw_input(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Message ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(area);
  f.render_widget(block, area);

  // Keep the tail of long input visible.
  let width = inner.width.saturating_sub(1) as usize;
  let chars: Vec<char> = app.input.chars().collect();
  let visible: String = chars[chars.len().saturating_sub(width)..].iter().collect();
  let cursor_x = inner.x + visible.chars().count() as u16;

  f.render_widget(Paragraph::new(visible), inner);
  f.set_cursor_position(Position::new(cursor_x, inner.y));
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (label, colour) = if app.listening {
    ("LISTENING", Color::Cyan)
  } else {
    ("OFFLINE", Color::Red)
  };

  let mode_span = Span::styled(
    format!(" {label} "),
    Style::default()
      .fg(Color::Black)
      .bg(colour)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {}  Enter send  PgUp/PgDn scroll  Esc quit", app.hub_url),
    Style::default().fg(Color::DarkGray),
  );

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(Color::Black)),
    area,
  );
}
