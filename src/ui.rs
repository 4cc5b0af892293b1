#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

use crate::app::App;
use crate::assets::{AssetId, AssetStore};
use crate::components::{ActivePieces, Board, GameStats, PieceType, RunPhase};
use crate::game::{BOARD_HEIGHT, BOARD_WIDTH, PREVIEW_SIZE, preview_offset};
use crate::menu::MenuRenderer;
use crate::menu_types::{MenuState, PuzzleControl};
use crate::ui_driving;
use ratatui::{
    layout::Position,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

// Each board cell is two characters wide to look roughly square
const CELL_WIDTH: u16 = 2;
const BOARD_OUTER_WIDTH: u16 = BOARD_WIDTH as u16 * CELL_WIDTH + 2;
const BOARD_OUTER_HEIGHT: u16 = BOARD_HEIGHT as u16 + 2;
const PANEL_WIDTH: u16 = 26;
const PREVIEW_OUTER_WIDTH: u16 = PREVIEW_SIZE as u16 * CELL_WIDTH + 2;
const PREVIEW_OUTER_HEIGHT: u16 = PREVIEW_SIZE as u16 + 2;
// Title line plus one row each for moves and round controls
const BUTTONS_HEIGHT: u16 = 3;

const FALLBACK_CELL: &str = "██";
const GRID_CELL: &str = " ·";

pub fn render(f: &mut Frame, app: &mut App) {
    match app.menu.state {
        MenuState::MainMenu | MenuState::Options => MenuRenderer::render_menu(f, app),
        MenuState::Puzzle => render_puzzle(f, app),
        MenuState::Driving => ui_driving::render_driving(f, app),
    }
}

/// Notice shown instead of a playfield that does not fit.
pub(crate) fn render_too_small(f: &mut Frame, title: &str) {
    let warning = Paragraph::new("Terminal too small!\nPlease resize your terminal\nto continue playing.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    let area = centered_rect(36, 5, f.area());
    f.render_widget(warning, area);
}

pub fn render_puzzle(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let min_width = BOARD_OUTER_WIDTH + PANEL_WIDTH;
    let min_height = BOARD_OUTER_HEIGHT + 1;
    if area.width < min_width || area.height < min_height {
        app.puzzle_buttons.clear();
        render_too_small(f, " Falling Blocks ");
        return;
    }

    let playfield = centered_rect(min_width, min_height, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(BOARD_OUTER_HEIGHT)])
        .split(playfield);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_OUTER_WIDTH),
            Constraint::Length(PANEL_WIDTH),
        ])
        .split(rows[1]);

    let title = Paragraph::new("FALLING BLOCKS")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(title, rows[0]);

    render_board(f, app, columns[0]);
    render_side_panel(f, app, columns[1]);
}

fn cell_symbol(assets: &AssetStore, piece: PieceType) -> String {
    assets
        .sprite(AssetId::Block(piece))
        .map_or_else(|| FALLBACK_CELL.to_string(), |sprite| sprite.glyph(CELL_WIDTH as usize))
}

fn draw_cell(buf: &mut Buffer, x: u16, y: u16, symbol: &str, color: Color) {
    if buf.area.contains(Position::new(x, y)) {
        buf.set_stringn(x, y, symbol, CELL_WIDTH as usize, Style::default().fg(color));
    }
}

fn render_board(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let board = app.puzzle.resource::<Board>();
    let pieces = app.puzzle.resource::<ActivePieces>();
    let show_grid = app.config.puzzle.show_grid;
    let buf = f.buffer_mut();

    for row in 0..board.height {
        for col in 0..board.width {
            let x = inner.x + col as u16 * CELL_WIDTH;
            let y = inner.y + row as u16;
            match board.get(col, row) {
                Some(piece) => {
                    draw_cell(buf, x, y, &cell_symbol(&app.assets, piece), piece.get_color());
                }
                None if show_grid => draw_cell(buf, x, y, GRID_CELL, Color::DarkGray),
                None => {}
            }
        }
    }

    if let Some(piece) = &pieces.current {
        let symbol = cell_symbol(&app.assets, piece.piece_type);
        for (col, row) in piece.cells() {
            if row < 0 || col < 0 || row >= board.height as i32 || col >= board.width as i32 {
                continue;
            }
            let x = inner.x + col as u16 * CELL_WIDTH;
            let y = inner.y + row as u16;
            draw_cell(buf, x, y, &symbol, piece.piece_type.get_color());
        }
    }

    let phase = *app.puzzle.resource::<RunPhase>();
    let overlay = match phase {
        RunPhase::Idle => Some(("Press Enter".to_string(), Color::Yellow)),
        RunPhase::Terminal => Some((
            format!(
                "GAME OVER\nScore: {}\nEnter: restart",
                app.puzzle.resource::<GameStats>().score
            ),
            Color::Red,
        )),
        RunPhase::Running => None,
    };
    if let Some((text, color)) = overlay {
        render_overlay(f, inner, &text, color);
    }
}

/// Boxed message centred over `area`.
pub(crate) fn render_overlay(f: &mut Frame, area: Rect, text: &str, color: Color) {
    let height = text.lines().count() as u16 + 2;
    let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
    let overlay_area = centered_rect(width, height, area);
    f.render_widget(Clear, overlay_area);
    let paragraph = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, overlay_area);
}

fn render_side_panel(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(PREVIEW_OUTER_HEIGHT),
            Constraint::Length(BUTTONS_HEIGHT),
            Constraint::Min(3),
        ])
        .split(area);

    let stats = app.puzzle.resource::<GameStats>();
    let info = Paragraph::new(format!(
        "Score: {}\nLevel: {}\nLines: {}",
        stats.score, stats.level, stats.lines_cleared
    ))
    .block(Block::default().borders(Borders::ALL).title(" Stats "));
    f.render_widget(info, chunks[0]);

    let preview_area = Rect::new(
        chunks[1].x,
        chunks[1].y,
        PREVIEW_OUTER_WIDTH.min(chunks[1].width),
        chunks[1].height,
    );
    render_next_preview(f, app, preview_area);
    render_buttons(f, app, chunks[2]);

    let controls = Paragraph::new(
        "←/→: Move\n\
        ↓: Soft drop\n\
        ↑/Space: Rotate\n\
        Enter: Start\n\
        R: Reset  Esc: Menu\n\
        M: Music  +/-: Volume\n\
        Q: Quit",
    )
    .block(Block::default().borders(Borders::TOP).title(" Controls "))
    .wrap(Wrap { trim: true });
    f.render_widget(controls, chunks[3]);
}

/// Clickable buttons in rows inside `area`: moves first, then round
/// controls. Buttons that do not fit are left out.
#[must_use]
pub fn puzzle_button_layout(area: Rect) -> Vec<(PuzzleControl, Rect)> {
    let mut buttons = Vec::new();
    for (row, controls) in [&PuzzleControl::MOVES[..], &PuzzleControl::ROUND[..]]
        .into_iter()
        .enumerate()
    {
        let y = area.y + row as u16;
        if y >= area.bottom() {
            break;
        }
        let mut x = area.x;
        for &control in controls {
            let width = Line::from(control.label()).width() as u16;
            if x + width > area.right() {
                break;
            }
            buttons.push((control, Rect::new(x, y, width, 1)));
            x += width + 1;
        }
    }
    buttons
}

fn render_buttons(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::TOP).title(" Buttons ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let buttons = puzzle_button_layout(inner);
    let style = Style::default().fg(Color::Black).bg(Color::Gray);
    let buf = f.buffer_mut();
    for (control, rect) in &buttons {
        buf.set_stringn(rect.x, rect.y, control.label(), rect.width as usize, style);
    }
    app.puzzle_buttons = buttons;
}

fn render_next_preview(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Next ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(next) = &app.puzzle.resource::<ActivePieces>().next else {
        return;
    };

    let (offset_x, offset_y) = preview_offset(next.shape.width(), next.shape.height());
    let left = inner.x + (offset_x * f64::from(CELL_WIDTH)).round() as u16;
    let top = inner.y + offset_y.floor() as u16;
    let symbol = cell_symbol(&app.assets, next.piece_type);
    let buf = f.buffer_mut();

    for (col, row) in next.shape.blocks() {
        let x = left + col as u16 * CELL_WIDTH;
        let y = top + row as u16;
        if x + CELL_WIDTH <= inner.right() && y < inner.bottom() {
            draw_cell(buf, x, y, &symbol, next.piece_type.get_color());
        }
    }
}

/// A `width` x `height` rect centred in `r`, clipped to it.
pub(crate) fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + r.width.saturating_sub(width) / 2;
    let y = r.y + r.height.saturating_sub(height) / 2;

    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
