//! Message pane: the conversation, newest at the bottom.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Message, Speaker};

/// Render the pane and return how many lines it can scroll up.
pub fn draw(f: &mut Frame, area: Rect, app: &App) -> usize {
  let block = Block::default()
    .title(" Conversation ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  if app.messages.is_empty() {
    f.render_widget(
      Paragraph::new(Span::styled(
        "Type a message and press Enter.",
        Style::default().fg(Color::DarkGray),
      )),
      inner,
    );
    return 0;
  }

  let width = inner.width.max(1) as usize;
  let lines: Vec<Line> = app.messages.iter().flat_map(|m| render(m, width)).collect();

  let height = inner.height as usize;
  let max_scroll = lines.len().saturating_sub(height);
  let top = max_scroll - app.scroll.min(max_scroll);

  let visible: Vec<Line> = lines.into_iter().skip(top).take(height).collect();
  f.render_widget(Paragraph::new(visible), inner);
  max_scroll
}

/// One message as wrapped, styled lines followed by a blank separator.
fn render(msg: &Message, width: usize) -> Vec<Line<'static>> {
  let (prefix, style) = match msg.speaker {
    Speaker::You => ("You: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    Speaker::Assistant => ("Assistant: ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
    Speaker::Error => ("", Style::default().fg(Color::Red)),
  };
  let body_style = match msg.speaker {
    Speaker::Error => style,
    _ => Style::default(),
  };

  let stamp = msg.at.format("%H:%M ").to_string();
  let full = format!("{stamp}{prefix}{}", msg.text);
  let head_len = stamp.chars().count() + prefix.chars().count();

  let mut out = Vec::new();
  let mut consumed = 0;
  for chunk in wrap(&full, width) {
    let len = chunk.chars().count();
    if consumed >= head_len {
      out.push(Line::from(Span::styled(chunk, body_style)));
    } else {
      let split = (head_len - consumed).min(len);
      let (head, body): (String, String) = (
        chunk.chars().take(split).collect(),
        chunk.chars().skip(split).collect(),
      );
      let (stamp_part, prefix_part) = split_stamp(&head, stamp.chars().count().saturating_sub(consumed));
      out.push(Line::from(vec![
        Span::styled(stamp_part, Style::default().fg(Color::DarkGray)),
        Span::styled(prefix_part, style),
        Span::styled(body, body_style),
      ]));
    }
    consumed += len;
  }
  out.push(Line::default());
  out
}

fn split_stamp(head: &str, stamp_len: usize) -> (String, String) {
  (head.chars().take(stamp_len).collect(), head.chars().skip(stamp_len).collect())
}

/// Hard-wrap `text` at `width` characters, breaking on newlines too.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
  let width = width.max(1);
  let mut out = Vec::new();
  for line in text.split('\n') {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
      out.push(String::new());
      continue;
    }
    out.extend(chars.chunks(width).map(|c| c.iter().collect::<String>()));
  }
  out
}
