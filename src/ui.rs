//! UI rendering for subdx

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
};

use subdx::keys;
use subdx::markup::Fragment;
use subdx::selection::{CommentsStatus, EmptyReason, Screen, SortOrder, View};
use subdx::subdivx::Candidate;

use crate::App;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    draw_header(frame, app, layout[0]);

    match app.selection.view() {
        None => draw_results(frame, app, layout[1]),
        Some(View::Description { index, fragments }) => {
            draw_description(frame, app.selection.candidate(*index), fragments, layout[1])
        }
        Some(View::Comments { index, status }) => {
            draw_comments(frame, app.selection.candidate(*index), status, layout[1])
        }
    }

    if let Some(status) = &app.processing_status {
        draw_processing(frame, status, layout[1]);
    }

    draw_status_bar(frame, app, layout[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Paragraph::new(format!("SUBDX - Subtitles for: {}", app.query.display_title()))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));

    frame.render_widget(title, area);
}

fn draw_results(frame: &mut Frame, app: &App, area: Rect) {
    let selection = &app.selection;
    let title_width = area.width.saturating_sub(50) as usize;

    let rows: Vec<Row> = selection
        .page_rows()
        .enumerate()
        .map(|(row, (position, candidate))| {
            let is_selected = row == selection.row();

            let style = if is_selected {
                Style::default().bg(Color::DarkGray).fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let prefix = if is_selected { "> " } else { "  " };

            Row::new(vec![
                format!("{}{:3}", prefix, position + 1),
                truncate(&candidate.title_text(), title_width.max(10)),
                candidate.downloads.to_string(),
                truncate(&candidate.uploader, 14),
                candidate.uploaded_str(),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec!["  #", "Title", "Downloads", "User", "Date"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let order = match selection.sort_order() {
        SortOrder::Default => "",
        SortOrder::DateAsc => " | oldest first",
        SortOrder::DateDesc => " | newest first",
    };
    let title = format!(
        "Page {} of {} of {} result(s){}",
        selection.page_index() + 1,
        selection.page_count().max(1),
        selection.total(),
        order
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(10),
            Constraint::Length(15),
            Constraint::Length(17),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );

    frame.render_widget(table, area);
}

fn draw_description(frame: &mut Frame, candidate: Option<&Candidate>, fragments: &[Fragment], area: Rect) {
    let title = match candidate {
        Some(c) => format!("Description - {}", truncate(&c.title_text(), 60)),
        None => "Description".to_string(),
    };

    let mut text = fragment_lines(fragments);
    if let Some(c) = candidate {
        text.push(Line::default());
        text.push(Line::from(Span::styled(
            format!(
                "Downloads: {}  Comments: {}  User: {}  Date: {}",
                c.downloads,
                c.comment_count,
                c.uploader,
                c.uploaded_str()
            ),
            Style::default().fg(Color::Gray),
        )));
    }

    let description = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    frame.render_widget(description, area);
}

/// Split fragments into lines, with matched tags bold yellow
fn fragment_lines(fragments: &[Fragment]) -> Vec<Line<'static>> {
    let matched = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();

    for fragment in fragments {
        let style = if fragment.matched { matched } else { Style::default() };
        for (i, part) in fragment.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            if !part.is_empty() {
                spans.push(Span::styled(part.to_string(), style));
            }
        }
    }
    lines.push(Line::from(spans));
    lines
}

fn draw_comments(frame: &mut Frame, candidate: Option<&Candidate>, status: &CommentsStatus, area: Rect) {
    let title = match candidate {
        Some(c) => format!("Comments - {}", truncate(&c.title_text(), 60)),
        None => "Comments".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let (pages, page) = match status {
        CommentsStatus::Loaded { pages, page, .. } => (pages, *page),
        CommentsStatus::Loading => return draw_empty(frame, "Loading comments...", block, area),
        CommentsStatus::Empty(EmptyReason::NoComments) => {
            return draw_empty(frame, "No comments for this subtitle", block, area)
        }
        CommentsStatus::Empty(EmptyReason::LoadFailed) => {
            return draw_empty(frame, "Could not load comments", block, area)
        }
    };

    let text_width = area.width.saturating_sub(40) as usize;
    let start = pages.absolute(page, 0);
    let rows: Vec<Row> = pages
        .rows(page)
        .iter()
        .enumerate()
        .map(|(i, comment)| {
            Row::new(vec![
                format!("{:3}", start + i + 1),
                truncate(&comment.text.replace('\n', " "), text_width.max(10)),
                truncate(&comment.author, 14),
                comment.created_str(),
            ])
        })
        .collect();

    let header = Row::new(vec!["  #", "Comment", "User", "Date"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(15),
            Constraint::Length(17),
        ],
    )
    .header(header)
    .block(block.title_bottom(format!(
        " Page {} of {} of {} comment(s) ",
        page + 1,
        pages.page_count,
        pages.total
    )));

    frame.render_widget(table, area);
}

fn draw_empty(frame: &mut Frame, message: &str, block: Block, area: Rect) {
    let text = Paragraph::new(format!("\n\n{}", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray))
        .block(block);

    frame.render_widget(text, area);
}

fn draw_processing(frame: &mut Frame, status: &str, area: Rect) {
    let popup_width = 40.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height.saturating_sub(2));

    let popup_area = Rect::new(
        area.x + (area.width - popup_width) / 2,
        area.y + (area.height - popup_height) / 2,
        popup_width,
        popup_height,
    );

    frame.render_widget(Clear, popup_area);

    let spinner_frames = ["[    ]", "[=   ]", "[==  ]", "[=== ]", "[ ===]", "[  ==]", "[   =]", "[    ]"];
    let frame_idx = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| (d.as_millis() / 100) as usize)
        .unwrap_or(0)
        % spinner_frames.len();

    let text = format!("\n{}\n\n{}", spinner_frames[frame_idx], status);

    let processing = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .title("Working")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );

    frame.render_widget(processing, popup_area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.processing_status.is_some() {
        "Please wait..."
    } else {
        keys::help(app.selection.screen())
    };

    let status_text = match (app.selection.screen(), app.selection.highlighted()) {
        (Screen::Browse, Some(c)) => format!("ID:{} | {}", c.id, help_text),
        _ => help_text.to_string(),
    };

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(Color::Gray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(status, area);
}

/// Truncate string with ellipsis (UTF-8 safe)
fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        s.chars().take(max_len).collect()
    }
}
