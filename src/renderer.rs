use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::chain::{Role, SegmentView};
use crate::features::Distances;
use crate::game::{RoundSnapshot, RoundStatus, StopReason};
use crate::grid::{Grid, Position};
use crate::input::Direction;

const GLYPH_FOOD: &str = "◆";
const GLYPH_SINGLE: &str = "●";
const GLYPH_UNLINKED: &str = "█";

const COLOR_HEAD: Color = Color::White;
const COLOR_BODY: Color = Color::Green;
const COLOR_TAIL: Color = Color::DarkGray;
const COLOR_FOOD: Color = Color::Red;
const COLOR_BORDER: Color = Color::Gray;

/// Values shown in the HUD that live outside the round itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct HudInfo {
    pub autopilot: bool,
    pub best_score: u32,
}

/// Renders the full game frame from an immutable snapshot.
pub fn render(frame: &mut Frame<'_>, snapshot: &RoundSnapshot, hud: HudInfo) {
    let [play_area, hud_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(2)]).areas(frame.area());

    let block = Block::bordered()
        .title(" torus snake ")
        .border_style(Style::new().fg(COLOR_BORDER));
    let inner = block.inner(play_area);
    frame.render_widget(block, play_area);

    render_food(frame, inner, snapshot);
    render_snake(frame, inner, snapshot);
    render_hud(frame, hud_area, snapshot, hud);

    match snapshot.status {
        RoundStatus::Idle => render_message(
            frame,
            play_area,
            " start ",
            &["TORUS SNAKE", "", "[Space] Start", "[Q] Quit"],
        ),
        RoundStatus::Stopped(reason) => render_message(
            frame,
            play_area,
            " round over ",
            &[
                stop_reason_text(reason),
                "",
                "[Space] Play again",
                "[Q] Quit",
            ],
        ),
        RoundStatus::Running => {}
    }
}

fn render_food(frame: &mut Frame<'_>, inner: Rect, snapshot: &RoundSnapshot) {
    let Some(food) = snapshot.food else {
        return;
    };
    let Some((x, y)) = logical_to_terminal(inner, snapshot.grid, food) else {
        return;
    };

    frame
        .buffer_mut()
        .set_string(x, y, GLYPH_FOOD, Style::new().fg(COLOR_FOOD));
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, snapshot: &RoundSnapshot) {
    let buffer = frame.buffer_mut();

    // Tail first so the head wins when segments share a cell.
    for segment in snapshot.segments.iter().rev() {
        let Some((x, y)) = logical_to_terminal(inner, snapshot.grid, segment.position) else {
            continue;
        };

        let style = match segment.role {
            Role::Head | Role::Single => Style::new().fg(COLOR_HEAD).add_modifier(Modifier::BOLD),
            Role::Body => Style::new().fg(COLOR_BODY),
            Role::Tail => Style::new().fg(COLOR_TAIL),
        };
        buffer.set_string(x, y, segment_glyph(segment, snapshot.heading), style);
    }
}

/// Picks the glyph for a segment from its role and link directions.
///
/// Body pieces join the side facing the successor with the side facing
/// the predecessor, so turns render as corners.
#[must_use]
pub fn segment_glyph(segment: &SegmentView, heading: Direction) -> &'static str {
    let directions = segment.directions;
    match segment.role {
        Role::Single => GLYPH_SINGLE,
        Role::Head => head_glyph(directions.incoming.unwrap_or(heading)),
        Role::Tail => directions.outgoing.map_or(GLYPH_UNLINKED, tail_glyph),
        Role::Body => match (directions.incoming, directions.outgoing) {
            (Some(incoming), Some(outgoing)) => body_glyph(incoming.opposite(), outgoing),
            _ => GLYPH_UNLINKED,
        },
    }
}

fn head_glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "▲",
        Direction::Down => "▼",
        Direction::Left => "◀",
        Direction::Right => "▶",
    }
}

fn tail_glyph(toward_body: Direction) -> &'static str {
    match toward_body {
        Direction::Up => "╹",
        Direction::Down => "╻",
        Direction::Left => "╸",
        Direction::Right => "╺",
    }
}

fn body_glyph(side_a: Direction, side_b: Direction) -> &'static str {
    use Direction::{Down, Left, Right, Up};

    match (side_a, side_b) {
        (Up, Down) | (Down, Up) => "│",
        (Left, Right) | (Right, Left) => "─",
        (Up, Right) | (Right, Up) => "└",
        (Up, Left) | (Left, Up) => "┘",
        (Down, Right) | (Right, Down) => "┌",
        (Down, Left) | (Left, Down) => "┐",
        _ => GLYPH_UNLINKED,
    }
}

fn render_hud(frame: &mut Frame<'_>, area: Rect, snapshot: &RoundSnapshot, hud: HudInfo) {
    let [score_row, distance_row] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

    let mut score_spans = vec![
        Span::styled("Score ", Style::new().fg(Color::DarkGray)),
        Span::styled(snapshot.score.to_string(), Style::new().fg(Color::White)),
        Span::styled("  Best ", Style::new().fg(Color::DarkGray)),
        Span::styled(
            hud.best_score.max(snapshot.score).to_string(),
            Style::new().fg(Color::White),
        ),
        Span::styled("  Length ", Style::new().fg(Color::DarkGray)),
        Span::styled(
            snapshot.segments.len().to_string(),
            Style::new().fg(Color::White),
        ),
        Span::styled("  Interval ", Style::new().fg(Color::DarkGray)),
        Span::styled(
            format!("{}ms", snapshot.speed.as_millis()),
            Style::new().fg(Color::White),
        ),
    ];
    if hud.autopilot {
        score_spans.push(Span::styled(
            "  AUTOPILOT",
            Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(score_spans)).alignment(Alignment::Left),
        score_row,
    );
    frame.render_widget(
        Paragraph::new(distance_line(&snapshot.distances))
            .alignment(Alignment::Left)
            .style(Style::new().fg(Color::DarkGray)),
        distance_row,
    );
}

fn distance_line(distances: &Distances) -> String {
    Direction::ALL
        .into_iter()
        .map(|direction| {
            let arrow = match direction {
                Direction::Up => "↑",
                Direction::Down => "↓",
                Direction::Left => "←",
                Direction::Right => "→",
            };
            match distances.get(direction) {
                Some(distance) => format!("{arrow}{distance}"),
                None => format!("{arrow}-"),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn stop_reason_text(reason: StopReason) -> &'static str {
    match reason {
        StopReason::Requested => "STOPPED",
        StopReason::SelfCollision => "GAME OVER",
        StopReason::BoardFull => "BOARD FULL - YOU WIN",
    }
}

fn render_message(frame: &mut Frame<'_>, area: Rect, title: &str, lines: &[&str]) {
    let popup = centered_popup(area, 70, 50);
    frame.render_widget(Clear, popup);

    let lines: Vec<Line<'_>> = lines.iter().map(|line| Line::from(*line)).collect();
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(title)),
        popup,
    );
}

fn centered_popup(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let [_, mid, _] = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .areas(mid);

    center
}

fn logical_to_terminal(inner: Rect, grid: Grid, position: Position) -> Option<(u16, u16)> {
    if !position.is_within(grid) {
        return None;
    }

    let x_offset = u16::try_from(position.x).ok()?;
    let y_offset = u16::try_from(position.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x >= inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}
