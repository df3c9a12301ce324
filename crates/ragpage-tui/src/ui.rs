use std::time::Instant;

use ragpage_core::markdown::{self, Segment};
use ragpage_core::page::{Card, CardKind, Shadow};
use ragpage_core::{ChatMessage, ConnectionState};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};

use crate::app::{App, FocusPane};
use crate::content::SITE_TITLE;

/// Cards fainter than this are not drawn at all
const MIN_VISIBLE_OPACITY: f32 = 0.15;

/// Parse a line of message text, rendering `**bold**` runs with a bold modifier
fn parse_markdown_line(text: &str) -> Line<'static> {
    let spans: Vec<Span<'static>> = markdown::segments(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(s) => Span::raw(s.to_string()),
            Segment::Strong(s) => Span::styled(
                s.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        })
        .collect();

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame, now: Instant) {
    let area = frame.area();

    // Main layout: navbar, body, footer
    let [navbar_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [page_area, chat_area] = Layout::horizontal([
        Constraint::Percentage(62),
        Constraint::Percentage(38),
    ])
    .areas(body_area);

    render_page(app, frame, page_area, now);
    render_chat(app, frame, chat_area);
    render_navbar(app, frame, navbar_area);
    render_footer(app, frame, footer_area);
}

fn render_navbar(app: &mut App, frame: &mut Frame, area: Rect) {
    let (border_set, border_style) = match app.page.navbar_shadow() {
        Shadow::Pronounced => (border::THICK, Style::default().fg(Color::White).bold()),
        Shadow::Subtle => (border::PLAIN, Style::default().fg(Color::DarkGray)),
    };
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_set(border_set)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let status = if app.probed {
        app.chat.connection()
    } else {
        ConnectionState::Demo
    };
    let status_label = if app.probed { status.label() } else { "Connecting..." };
    let status_style = match (app.probed, status) {
        (false, _) => Style::default().fg(Color::DarkGray),
        (true, ConnectionState::Live) => Style::default().bg(Color::Green).fg(Color::Black).bold(),
        (true, ConnectionState::Demo) => Style::default().bg(Color::Yellow).fg(Color::Black).bold(),
    };
    let status_text = format!(" ● {} ", status_label);
    let status_width = status_text.chars().count() as u16;

    let [links_area, status_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(status_width),
    ])
    .areas(inner);

    // Title then links, recording each link's cell range for mouse hits
    let title = format!(" {} ", SITE_TITLE);
    let mut spans = vec![
        Span::styled(title.clone(), Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
    ];
    let mut x = links_area.x + title.chars().count() as u16 + 1;
    app.link_areas.clear();

    let navbar_focused = app.focus == FocusPane::Navbar;
    for (i, link) in app.nav_links.iter().enumerate() {
        let label = format!(" {} {} ", i + 1, link.label);
        let width = label.chars().count() as u16;
        let style = if i == app.selected_link && navbar_focused {
            Style::default().bg(Color::Cyan).fg(Color::Black).bold()
        } else if i == app.selected_link {
            Style::default().fg(Color::Cyan).underlined()
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));

        let visible = x.saturating_add(width) <= links_area.x + links_area.width;
        app.link_areas.push(if visible {
            Rect::new(x, links_area.y, width, 1)
        } else {
            Rect::default()
        });
        x = x.saturating_add(width + 1);
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), links_area);
    frame.render_widget(
        Paragraph::new(Span::styled(status_text, status_style)),
        status_area,
    );
}

fn card_color(kind: CardKind) -> Color {
    match kind {
        CardKind::Card => Color::Cyan,
        CardKind::FlowStep => Color::Magenta,
        CardKind::MetricCard => Color::Green,
        CardKind::FindingItem => Color::Yellow,
    }
}

/// Draw a card as boxed lines of exactly `width` columns
fn card_lines(card: &Card, width: usize, style: Style, title_style: Style) -> Vec<Line<'static>> {
    let width = width.max(6);
    let inner = width - 4;
    let mut lines = Vec::with_capacity(card.lines.len() + 2);

    let title: String = card.title.chars().take(width.saturating_sub(6)).collect();
    let used = title.chars().count() + 5;
    lines.push(Line::from(vec![
        Span::styled("╭─ ".to_string(), style),
        Span::styled(title, title_style),
        Span::styled(format!(" {}╮", "─".repeat(width.saturating_sub(used))), style),
    ]));

    for text in &card.lines {
        let shown: String = text.chars().take(inner).collect();
        let pad = inner - shown.chars().count();
        lines.push(Line::from(vec![
            Span::styled("│ ".to_string(), style),
            Span::raw(shown),
            Span::raw(" ".repeat(pad)),
            Span::styled(" │".to_string(), style),
        ]));
    }

    lines.push(Line::from(Span::styled(
        format!("╰{}╯", "─".repeat(width - 2)),
        style,
    )));
    lines
}

fn render_page(app: &mut App, frame: &mut Frame, area: Rect, now: Instant) {
    let focused = app.focus == FocusPane::Page;
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    app.page_area = Some(inner);
    app.page.set_viewport(inner.height, now);

    let content_width = inner.width.saturating_sub(3) as usize; // 1 col margin + scrollbar
    let total_rows = app.page.content_height() as usize + app.page.metrics().reveal_offset as usize;
    let mut rows: Vec<Line> = vec![Line::default(); total_rows];

    for section in app.page.sections() {
        let top = section.top as usize;
        rows[top] = Line::from(Span::styled(
            format!(" {}", section.title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        for (i, intro) in section.intro.iter().enumerate() {
            rows[top + 2 + i] = Line::from(Span::styled(
                format!(" {}", intro),
                Style::default().fg(Color::Gray),
            ));
        }

        for card in &section.cards {
            let style = app.page.card_style(card, now);
            if style.opacity < MIN_VISIBLE_OPACITY {
                continue;
            }
            let (border_style, title_style) = if style.opacity < 0.6 {
                (Style::default().fg(Color::DarkGray), Style::default().fg(Color::DarkGray))
            } else {
                let color = card_color(card.kind);
                (Style::default().fg(color), Style::default().fg(color).bold())
            };

            let start = card.top as usize + style.offset as usize;
            for (i, line) in card_lines(card, content_width, border_style, title_style)
                .into_iter()
                .enumerate()
            {
                if let Some(row) = rows.get_mut(start + i) {
                    let mut spans = vec![Span::raw(" ")];
                    spans.extend(line.spans);
                    *row = Line::from(spans);
                }
            }
        }
    }

    let page = Paragraph::new(Text::from(rows)).scroll((app.page.scroll(), 0));
    frame.render_widget(page, inner);

    let mut scrollbar_state = ScrollbarState::new(app.page.max_scroll() as usize)
        .position(app.page.scroll() as usize);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        inner,
        &mut scrollbar_state,
    );
}

fn message_lines(msg: &ChatMessage) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if msg.is_user() {
        lines.push(Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for line in msg.content.lines() {
            lines.push(Line::from(Span::styled(line.to_string(), Style::default().fg(Color::Cyan))));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        for line in msg.content.lines() {
            lines.push(parse_markdown_line(line));
        }
    }

    if let Some(sources) = msg.visible_sources() {
        lines.push(Line::from(Span::styled(
            "Sources:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for source in sources {
            lines.push(Line::from(vec![
                Span::raw("  • "),
                Span::styled(source.title.clone(), Style::default().fg(Color::White).bold()),
                Span::styled(format!(" [{}]", source.source_type), Style::default().fg(Color::Magenta)),
                Span::styled(
                    format!(" {}% relevant", markdown::relevance_percent(source.relevance_score)),
                    Style::default().fg(Color::Green),
                ),
            ]));
        }
    }

    lines.push(Line::default());
    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [transcript_area, input_row] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);
    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(10),
    ])
    .areas(input_row);

    // Store areas for mouse hit-testing
    app.chat_area = Some(transcript_area);
    app.input_area = Some(input_area);
    app.send_area = Some(send_area);

    // Inner size minus borders, for scroll calculations
    app.chat_height = transcript_area.height.saturating_sub(2);
    app.chat_width = transcript_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Ask the docs ");

    let chat_text = if app.chat.messages().is_empty() && !app.chat.is_typing() {
        Text::from(Span::styled(
            "Ask a WordPress development question...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for msg in app.chat.messages() {
            lines.extend(message_lines(msg));
        }

        if app.chat.is_typing() {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // One dot brightens per frame
            let dots: Vec<Span> = (0..3u8)
                .map(|i| {
                    let color = if i == app.animation_frame { Color::White } else { Color::DarkGray };
                    Span::styled("●", Style::default().fg(color))
                })
                .collect();
            lines.push(Line::from(dots));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, transcript_area);

    // Input box - highlight when focused, dim while a send is in flight
    let enabled = app.chat.is_input_enabled();
    let input_focused = app.focus == FocusPane::Input;
    let input_border_color = if !enabled {
        Color::DarkGray
    } else if input_focused {
        Color::Yellow
    } else {
        Color::Gray
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Question ");

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat.cursor();

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .chat
        .input()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input_style = if enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(visible_text).style(input_style).block(input_block);
    frame.render_widget(input, input_area);

    let send_style = if enabled {
        Style::default().fg(Color::Black).bg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let send = Paragraph::new(Span::styled(" Send ", send_style))
        .centered()
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(input_border_color)));
    frame.render_widget(send, send_area);

    // Show cursor when the input has focus
    if input_focused && enabled {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match app.focus {
        FocusPane::Navbar => vec![
            Span::styled(" h/l ", key_style),
            Span::styled(" link ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" go ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
        ],
        FocusPane::Page => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" 1-5 ", key_style),
            Span::styled(" jump ", label_style),
            Span::styled(" g/G ", key_style),
            Span::styled(" top/bottom ", label_style),
        ],
        FocusPane::Input => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" ↑/↓ ", key_style),
            Span::styled(" transcript ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" page ", label_style),
        ],
    };

    hints.push(Span::styled(" Tab ", key_style));
    hints.push(Span::styled(" focus ", label_style));
    if app.focus != FocusPane::Input {
        hints.push(Span::styled(" i ", key_style));
        hints.push(Span::styled(" ask ", label_style));
        hints.push(Span::styled(" q ", key_style));
        hints.push(Span::styled(" quit ", label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragpage_core::{Config, RagClient, Source};
    use ratatui::{backend::TestBackend, Terminal};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_bold_spans_get_bold_modifier() {
        let line = parse_markdown_line("Use **add_action** here");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "add_action");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(!line.spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_sources_block_lines() {
        let msg = ChatMessage::assistant(
            "**Hi**",
            Some(vec![Source {
                title: "Doc".to_string(),
                source_type: "guide".to_string(),
                relevance_score: 0.87,
            }]),
        );
        let lines = message_lines(&msg);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["Assistant:", "Hi", "Sources:", "  • Doc [guide] 87% relevant", ""]);
    }

    #[test]
    fn test_empty_sources_render_no_block() {
        let msg = ChatMessage::assistant("plain", Some(Vec::new()));
        let texts: Vec<String> = message_lines(&msg).iter().map(line_text).collect();
        assert_eq!(texts, vec!["Assistant:", "plain", ""]);
    }

    fn render_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|frame| render(app, frame, Instant::now())).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn test_app() -> App {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        App::new(&Config::new(), RagClient::new("http://127.0.0.1:1"), tx)
    }

    #[test]
    fn test_status_indicator_follows_probe() {
        let mut app = test_app();
        assert!(render_text(&mut app).contains("Connecting..."));

        app.apply_probe(ConnectionState::Live);
        let text = render_text(&mut app);
        assert!(text.contains("Live RAG System"));
        assert!(!text.contains("Connecting..."));

        app.apply_probe(ConnectionState::Demo);
        assert!(render_text(&mut app).contains("Demo Mode"));
    }

    #[test]
    fn test_render_records_hit_areas() {
        let mut app = test_app();
        render_text(&mut app);
        assert_eq!(app.link_areas.len(), app.nav_links.len());
        assert!(app.link_areas.iter().all(|r| r.width > 0));
        assert!(app.page_area.is_some());
        assert!(app.send_area.is_some());
        assert!(app.page.viewport() > 0);
    }

    #[test]
    fn test_card_lines_have_fixed_width() {
        let card = Card {
            kind: CardKind::Card,
            title: "Hybrid retrieval".to_string(),
            lines: vec!["short".to_string(), "x".repeat(80)],
            top: 0,
            height: 4,
            reveal: Default::default(),
        };
        let lines = card_lines(&card, 30, Style::default(), Style::default());
        assert_eq!(lines.len(), 4);
        for line in &lines {
            assert_eq!(line_text(line).chars().count(), 30, "line: {:?}", line_text(line));
        }
    }
}
