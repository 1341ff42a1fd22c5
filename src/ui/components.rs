//! Panels, bars and popups drawn around the file browser.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppMode, PanelStatus};
use crate::digest::{supported_algorithms, AlgorithmMode};
use crate::task::{Sink, TaskState};

/// Render the help bar with context-sensitive key bindings.
pub fn render_help_bar(f: &mut Frame, area: Rect, app: &App) {
    let bindings: &[(&str, &str)] = match app.mode {
        AppMode::Browse(_) => &[
            ("↑↓", "Navigate"),
            ("Enter", "Open/Choose"),
            ("Bksp", "Up"),
            ("Esc", "Cancel"),
        ],
        AppMode::EditDigest => &[
            ("Type/Paste", "Digest"),
            ("Bksp", "Delete"),
            ("^U", "Clear"),
            ("Enter/Esc", "Done"),
        ],
        AppMode::SelectAlgorithm => &[("↑↓", "Navigate"), ("Enter", "Select"), ("Esc", "Cancel")],
        AppMode::Normal => match app.algorithm_mode {
            AlgorithmMode::Fixed(_) => &[
                ("o", "File"),
                ("Enter", "Digest"),
                ("i", "Expected"),
                ("v", "Verify"),
                ("c", "Compare"),
                ("q", "Quit"),
            ],
            AlgorithmMode::Selectable(_) => &[
                ("o", "File"),
                ("Enter", "Digest"),
                ("a", "Algorithm"),
                ("i", "Expected"),
                ("v", "Verify"),
                ("c", "Compare"),
                ("q", "Quit"),
            ],
        },
    };

    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let sep_style = Style::default().fg(Color::DarkGray);
    let text_style = Style::default().fg(Color::White);

    let mut spans = Vec::new();
    for (i, (key, label)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", sep_style));
        }
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(format!(":{}", label), text_style));
    }

    let help = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(help, area);
}

/// Render the status bar: last message plus the percentage of any running job.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let activity = match app.active_progress() {
        Some(p) => format!(" │ ⏳ {:.0}%", p),
        None => String::new(),
    };
    let text = format!("{}{}", app.message, activity);

    let status = Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White));
    f.render_widget(status, area);
}

fn state_color(state: TaskState) -> Color {
    match state {
        TaskState::Idle => Color::Gray,
        TaskState::Running => Color::Yellow,
        TaskState::Completed => Color::Green,
        TaskState::Failed => Color::Red,
    }
}

fn panel_block(title: &str, state: TaskState) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .border_style(Style::default().fg(state_color(state)))
}

fn render_gauge(f: &mut Frame, area: Rect, status: &PanelStatus) {
    let (ratio, label) = match status {
        PanelStatus::Running { progress } => {
            ((progress / 100.0).clamp(0.0, 1.0), format!("{:.0}%", progress))
        }
        PanelStatus::Done(_) | PanelStatus::Warning(_) => (1.0, "100%".to_string()),
        PanelStatus::Idle | PanelStatus::Error(_) => (0.0, String::new()),
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(ratio)
        .label(label);
    f.render_widget(gauge, area);
}

fn label(name: &str) -> Span<'static> {
    Span::styled(format!("{:<10}", name), Style::default().fg(Color::DarkGray))
}

/// Render the digest panel: chosen file, algorithm, progress and result.
pub fn render_digest_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = panel_block("Digest", app.task_state(Sink::Digest));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let width = inner.width.saturating_sub(10) as usize;
    let file = match &app.selected_file {
        Some(path) => Span::raw(truncate_path(&path.display().to_string(), width)),
        None => Span::styled("none (press o)", Style::default().fg(Color::DarkGray)),
    };
    let algorithm = match app.algorithm_mode {
        AlgorithmMode::Fixed(id) => format!("{} (fixed)", id.info().display_name),
        AlgorithmMode::Selectable(Some(id)) => id.info().display_name.to_string(),
        AlgorithmMode::Selectable(None) => "none".to_string(),
    };
    let info = vec![
        Line::from(vec![label("File"), file]),
        Line::from(vec![label("Algorithm"), Span::raw(algorithm)]),
    ];
    f.render_widget(Paragraph::new(info), rows[0]);

    render_gauge(f, rows[1], &app.digest_status);

    let result: Vec<Line> = match &app.digest_status {
        PanelStatus::Idle => vec![Line::from(Span::styled(
            "Press Enter to compute",
            Style::default().fg(Color::DarkGray),
        ))],
        PanelStatus::Running { .. } => vec![Line::from("Computing...")],
        PanelStatus::Done(summary) | PanelStatus::Warning(summary) => vec![
            Line::from(Span::styled(
                app.digest_value.clone().unwrap_or_default(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(summary.clone(), Style::default().fg(Color::DarkGray))),
        ],
        PanelStatus::Error(msg) => vec![Line::from(Span::styled(
            msg.clone(),
            Style::default().fg(Color::Red),
        ))],
    };
    f.render_widget(Paragraph::new(result).wrap(Wrap { trim: false }), rows[2]);
}

/// Render the comparison panel: expected digest input, progress and verdict.
pub fn render_compare_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = panel_block("Compare", app.task_state(Sink::Compare));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let editing = matches!(app.mode, AppMode::EditDigest);
    let count = app.expected_input.chars().count();
    let length_hint = match app.algorithm_mode {
        AlgorithmMode::Fixed(id) => format!("{}/{} characters", count, id.hex_len()),
        AlgorithmMode::Selectable(_) => format!("{} characters", count),
    };

    let width = inner.width.saturating_sub(11) as usize;
    let mut expected = vec![label("Expected")];
    if app.expected_input.is_empty() && !editing {
        expected.push(Span::styled("empty (press i)", Style::default().fg(Color::DarkGray)));
    } else {
        expected.push(Span::styled(
            truncate_path(&app.expected_input, width),
            Style::default().fg(Color::Cyan),
        ));
    }
    if editing {
        expected.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    }

    let info = vec![
        Line::from(expected),
        Line::from(vec![
            label(""),
            Span::styled(length_hint, Style::default().fg(Color::DarkGray)),
        ]),
    ];
    f.render_widget(Paragraph::new(info), rows[0]);

    render_gauge(f, rows[1], &app.compare_status);

    let result = match &app.compare_status {
        PanelStatus::Idle => Span::styled(
            "v: verify a file against the expected digest, c: compare two files",
            Style::default().fg(Color::DarkGray),
        ),
        PanelStatus::Running { .. } => Span::raw("Comparing..."),
        PanelStatus::Done(verdict) => Span::styled(
            format!("✓ {}", verdict),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        PanelStatus::Warning(verdict) => Span::styled(
            format!("⚠ {}", verdict),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        PanelStatus::Error(msg) => Span::styled(format!("✗ {}", msg), Style::default().fg(Color::Red)),
    };
    f.render_widget(Paragraph::new(Line::from(result)).wrap(Wrap { trim: false }), rows[2]);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

/// Render a centered popup dialog.
pub fn render_popup(f: &mut Frame, title: &str, lines: Vec<Line>, style: Style) {
    let max_line_width = lines.iter().map(|l| l.width()).max().unwrap_or(20) as u16;
    let popup_area = centered(f.area(), (max_line_width + 4).max(40), lines.len() as u16 + 4);

    f.render_widget(Clear, popup_area);

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(title)
                .title_style(style.add_modifier(Modifier::BOLD)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(popup, popup_area);
}

/// Render the algorithm menu over everything else.
pub fn render_algorithm_select(f: &mut Frame, list_state: &mut ListState) {
    let items: Vec<ListItem> = supported_algorithms()
        .iter()
        .map(|id| {
            let info = id.info();
            let mut spans = vec![
                Span::raw(format!("{:<10}", id.name())),
                Span::styled(format!("{:>4} bits", info.output_bits), Style::default().fg(Color::DarkGray)),
            ];
            if !info.recommended {
                spans.push(Span::styled("  legacy", Style::default().fg(Color::Yellow)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let area = centered(f.area(), 36, items.len() as u16 + 2);
    f.render_widget(Clear, area);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Algorithm ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    f.render_stateful_widget(list, area, list_state);
}

/// Render a popup explaining why the terminal is too small to be useful.
pub fn render_too_small(f: &mut Frame) {
    render_popup(
        f,
        " hashcheck ",
        vec![Line::from("Terminal too small"), Line::from("Resize or press q to quit")],
        Style::default().fg(Color::Yellow),
    );
}

/// Keep the tail of a path, prefixing "..." when it does not fit.
pub fn truncate_path(path: &str, max_len: usize) -> String {
    let len = path.chars().count();
    if len <= max_len {
        return path.to_string();
    }
    if max_len <= 3 {
        return path.chars().skip(len - max_len).collect();
    }
    let tail: String = path.chars().skip(len - (max_len - 3)).collect();
    format!("...{}", tail)
}

/// Keep the head of a string, appending "..." when it does not fit.
pub fn truncate_end(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    if max_len <= 3 {
        return text.chars().take(max_len).collect();
    }
    let head: String = text.chars().take(max_len - 3).collect();
    format!("{}...", head)
}
