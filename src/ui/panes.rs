//! Rendering logic for each viewer pane

use crate::snapshot::ThreadSnapshot;
use crate::ui::theme::DEFAULT_THEME;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
};

fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}

/// Bordered, scrollable list; shows `empty` when there are no items
fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: Vec<ListItem<'static>>,
    empty: &str,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if items.is_empty() {
        *scroll_offset = 0;
        let paragraph = Paragraph::new(empty.to_string())
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let total_items = items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1

    // Clamp scroll offset only if content exceeds visible area
    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn key_value_item(key: String, key_color: Color, value: &str) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(key, Style::default().fg(key_color)),
        Span::styled(" -> ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(value.to_string(), Style::default().fg(DEFAULT_THEME.fg)),
    ]))
}

pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    thread: Option<&ThreadSnapshot>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let items: Vec<ListItem<'static>> = thread
        .map(|t| {
            t.stack
                .iter()
                .enumerate()
                .map(|(i, stmt)| {
                    // Highlight the statement that runs next
                    let style = if i == 0 {
                        Style::default()
                            .fg(DEFAULT_THEME.primary)
                            .bg(DEFAULT_THEME.current_line_bg)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(DEFAULT_THEME.fg)
                    };
                    ListItem::new(stmt.clone()).style(style)
                })
                .collect()
        })
        .unwrap_or_default();

    render_list(
        frame,
        area,
        "Execution Stack",
        items,
        "(empty stack)",
        is_focused,
        scroll_offset,
    );
}

pub fn render_symbols_pane(
    frame: &mut Frame,
    area: Rect,
    thread: Option<&ThreadSnapshot>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let items: Vec<ListItem<'static>> = thread
        .map(|t| {
            t.symbols
                .iter()
                .map(|(name, value)| key_value_item(name.clone(), DEFAULT_THEME.variable, value))
                .collect()
        })
        .unwrap_or_default();

    render_list(
        frame,
        area,
        "Symbol Table",
        items,
        "(no variables)",
        is_focused,
        scroll_offset,
    );
}

pub fn render_heap_pane(
    frame: &mut Frame,
    area: Rect,
    thread: Option<&ThreadSnapshot>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let items: Vec<ListItem<'static>> = thread
        .map(|t| {
            t.heap
                .iter()
                .map(|(address, value)| {
                    key_value_item(address.to_string(), DEFAULT_THEME.address, value)
                })
                .collect()
        })
        .unwrap_or_default();

    render_list(
        frame,
        area,
        "Heap",
        items,
        "(no allocations)",
        is_focused,
        scroll_offset,
    );
}

pub fn render_files_pane(
    frame: &mut Frame,
    area: Rect,
    thread: Option<&ThreadSnapshot>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let items: Vec<ListItem<'static>> = thread
        .map(|t| {
            t.files
                .iter()
                .map(|name| {
                    ListItem::new(name.clone()).style(Style::default().fg(DEFAULT_THEME.secondary))
                })
                .collect()
        })
        .unwrap_or_default();

    render_list(
        frame,
        area,
        "File Table",
        items,
        "(no open files)",
        is_focused,
        scroll_offset,
    );
}

pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    thread: Option<&ThreadSnapshot>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let items: Vec<ListItem<'static>> = thread
        .map(|t| {
            t.output
                .iter()
                .map(|line| ListItem::new(line.clone()).style(Style::default().fg(DEFAULT_THEME.fg)))
                .collect()
        })
        .unwrap_or_default();

    render_list(
        frame,
        area,
        "Output",
        items,
        "(no output)",
        is_focused,
        scroll_offset,
    );
}

#[allow(clippy::too_many_arguments)]
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    message: &str,
    current_round: usize,
    total_rounds: usize,
    thread_count: usize,
    thread: Option<&ThreadSnapshot>,
    is_playing: bool,
) {
    let layout = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([
            ratatui::layout::Constraint::Percentage(50),
            ratatui::layout::Constraint::Percentage(50),
        ])
        .split(area);

    let bar_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let mut left_spans = vec![
        Span::styled(
            format!(" Round {}/{} ", current_round + 1, total_rounds),
            Style::default()
                .bg(DEFAULT_THEME.primary)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", sep_style),
    ];

    if let Some(thread) = thread {
        let status_color = if thread.status.starts_with("errored") {
            DEFAULT_THEME.error
        } else if thread.finished {
            DEFAULT_THEME.success
        } else {
            DEFAULT_THEME.secondary
        };
        left_spans.push(Span::styled(
            format!(" Thread #{} ({} in round) ", thread.id, thread_count),
            bar_style,
        ));
        left_spans.push(Span::styled(
            format!(" {} ", thread.status),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(status_color),
        ));
        left_spans.push(Span::styled(" | ", sep_style));
    }
    left_spans.push(Span::styled(format!(" {} ", message), bar_style));

    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            .alignment(Alignment::Left),
        layout[0],
    );

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let mut right_spans = vec![
        Span::styled(" ←/→ ", key_style),
        Span::styled(" round ", bar_style),
        Span::styled("│", sep_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" thread ", bar_style),
        Span::styled("│", sep_style),
        Span::styled(" ⎵ ", key_style),
        Span::styled(" play ", bar_style),
        Span::styled("│", sep_style),
        Span::styled(" ↵ / ⌫ ", key_style),
        Span::styled(" end/start ", bar_style),
        Span::styled("│", sep_style),
        Span::styled("q", key_style),
        Span::styled(" quit ", bar_style),
    ];

    if is_playing {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            " ▶ PLAYING ",
            Style::default()
                .bg(DEFAULT_THEME.secondary)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    } else if current_round + 1 >= total_rounds {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            " END ",
            Style::default()
                .bg(DEFAULT_THEME.error)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            .alignment(Alignment::Right),
        layout[1],
    );
}
