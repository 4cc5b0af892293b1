#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::assets::{AssetId, Sprite};
use crate::components::RunPhase;
use crate::driving::{
    Bounds, LANE_COUNT, Obstacle, Player, ROAD_HEIGHT, ROAD_WIDTH, RunState,
};
use crate::ui::{centered_rect, render_overlay, render_too_small};

const HUD_HEIGHT: u16 = 3;
const MIN_ROAD_HEIGHT: u16 = 16;
const MAX_ROAD_HEIGHT: u16 = 48;
// Terminal cells are about twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;
const DASH_LENGTH: f32 = 20.0;
const DASH_PERIOD: f32 = 40.0;

const PLAYER_COLOR: Color = Color::Cyan;
const OBSTACLE_COLOR: Color = Color::Red;
const HIT_COLOR: Color = Color::Yellow;

/// Size of the road interior for an available area, or `None` when it does
/// not fit.
#[must_use]
pub fn road_size(area: Rect) -> Option<(u16, u16)> {
    let height = area
        .height
        .saturating_sub(HUD_HEIGHT + 2)
        .min(MAX_ROAD_HEIGHT);
    if height < MIN_ROAD_HEIGHT {
        return None;
    }

    let lanes = LANE_COUNT as u16;
    let ideal = f32::from(height) * ROAD_WIDTH / ROAD_HEIGHT * CELL_ASPECT;
    let width = ((ideal as u16) / lanes * lanes).max(lanes * 6);
    if width + 2 > area.width {
        return None;
    }
    Some((width, height))
}

/// Terminal cells covered by `bounds` inside the road interior `road`,
/// clipped to it.
#[must_use]
pub fn project(bounds: &Bounds, road: Rect) -> Option<Rect> {
    let scale_x = f32::from(road.width) / ROAD_WIDTH;
    let scale_y = f32::from(road.height) / ROAD_HEIGHT;

    let left = (bounds.x * scale_x).round();
    let right = ((bounds.x + bounds.width) * scale_x).round();
    let top = (bounds.y * scale_y).round();
    let bottom = ((bounds.y + bounds.height) * scale_y).round();

    let left = left.max(0.0);
    let top = top.max(0.0);
    let right = right.min(f32::from(road.width));
    let bottom = bottom.min(f32::from(road.height));
    if right <= left || bottom <= top {
        return None;
    }

    Some(Rect::new(
        road.x + left as u16,
        road.y + top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

pub fn render_driving(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let Some((road_width, road_height)) = road_size(area) else {
        app.road_area = None;
        render_too_small(f, " Lane Racer ");
        return;
    };

    let outer = centered_rect(road_width + 2, road_height + 2 + HUD_HEIGHT, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HUD_HEIGHT), Constraint::Length(road_height + 2)])
        .split(outer);

    render_hud(f, app, chunks[0]);

    let block = Block::default()
        .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
        .border_style(Style::default().fg(Color::Gray));
    let road = block.inner(chunks[1]);
    f.render_widget(block, chunks[1]);
    app.road_area = Some(road);

    let offset = app.driving.resource::<RunState>().road_offset;
    render_lane_markers(f.buffer_mut(), road, offset);

    let obstacles: Vec<Obstacle> = app
        .driving
        .query::<&Obstacle>()
        .iter(&app.driving)
        .cloned()
        .collect();
    let obstacle_sprite = app.assets.sprite(AssetId::Obstacle);
    for obstacle in obstacles.iter().filter(|o| o.is_visible()) {
        let color = if obstacle.hit { HIT_COLOR } else { OBSTACLE_COLOR };
        if let Some(rect) = project(&obstacle.bounds, road) {
            draw_car(f.buffer_mut(), rect, obstacle_sprite, color);
        }
    }

    let state = app.driving.resource::<RunState>();
    if state.player_visible() {
        let player = app.driving.resource::<Player>();
        if let Some(rect) = project(&player.bounds, road) {
            draw_car(
                f.buffer_mut(),
                rect,
                app.assets.sprite(AssetId::Player),
                PLAYER_COLOR,
            );
        }
    }

    let phase = *app.driving.resource::<RunPhase>();
    match phase {
        RunPhase::Idle => render_overlay(f, road, "Press Enter\n←/→ or mouse to steer", Color::Yellow),
        RunPhase::Terminal => {
            let score = app.driving.resource::<RunState>().score;
            render_overlay(
                f,
                road,
                &format!("GAME OVER\nScore: {score}\nEnter: restart"),
                Color::Red,
            );
        }
        RunPhase::Running => {}
    }
}

fn render_hud(f: &mut Frame, app: &App, area: Rect) {
    let state = app.driving.resource::<RunState>();
    let hearts: String = "♥".repeat(state.lives as usize);
    let line = Line::from(vec![
        Span::styled(format!("Score: {}", state.score), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!("Lives: {hearts}"), Style::default().fg(Color::Red)),
        Span::raw("  "),
        Span::raw(format!("Speed: {:.1}", state.game_speed)),
    ]);
    let hud = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Lane Racer "));
    f.render_widget(hud, area);
}

/// Dashed lines between lanes, shifted down by the scroll offset.
fn render_lane_markers(buf: &mut Buffer, road: Rect, offset: f32) {
    for lane in 1..LANE_COUNT {
        let x = road.x + (f32::from(road.width) * lane as f32 / LANE_COUNT as f32) as u16;
        for row in 0..road.height {
            let road_y = (f32::from(row) + 0.5) / f32::from(road.height) * ROAD_HEIGHT;
            if (road_y - offset).rem_euclid(DASH_PERIOD) < DASH_LENGTH {
                if let Some(cell) = buf.cell_mut((x, road.y + row)) {
                    cell.set_char('┊');
                    cell.set_fg(Color::White);
                }
            }
        }
    }
}

/// Draws a sprite clipped to `rect`, or a solid block when there is none.
fn draw_car(buf: &mut Buffer, rect: Rect, sprite: Option<&Sprite>, color: Color) {
    match sprite {
        Some(sprite) => {
            for (dy, line) in sprite.lines().iter().take(rect.height as usize).enumerate() {
                for (dx, ch) in line.chars().take(rect.width as usize).enumerate() {
                    if ch == ' ' {
                        continue;
                    }
                    if let Some(cell) = buf.cell_mut((rect.x + dx as u16, rect.y + dy as u16)) {
                        cell.set_char(ch);
                        cell.set_fg(color);
                    }
                }
            }
        }
        None => {
            for y in rect.top()..rect.bottom() {
                for x in rect.left()..rect.right() {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_char('█');
                        cell.set_fg(color);
                    }
                }
            }
        }
    }
}
