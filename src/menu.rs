#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use std::time::{Duration, Instant};

use crate::app::App;
use crate::menu_types::{Menu, MenuOption, MenuState, OptionsOption, cycle};
use crate::ui::centered_rect;

// Block letters for the "ARCADE" title
const TITLE_LETTERS: [&str; 6] = [
    // A
    " ██ \n█  █\n████\n█  █\n█  █",
    // R
    "███ \n█  █\n███ \n█ █ \n█  █",
    // C
    " ███\n█   \n█   \n█   \n ███",
    // A
    " ██ \n█  █\n████\n█  █\n█  █",
    // D
    "███ \n█  █\n█  █\n█  █\n███ ",
    // E
    "████\n█   \n███ \n█   \n████",
];

const TITLE_HEIGHT: u16 = 5;
const LETTER_GAP: u16 = 1;
const COLOR_STEP: Duration = Duration::from_millis(150);

pub struct MenuRenderer {
    pub title_colors: Vec<Color>,
    pub color_change_time: Instant,
}

impl Default for MenuRenderer {
    fn default() -> Self {
        Self {
            title_colors: vec![
                Color::Rgb(0xFF, 0x0D, 0x72),
                Color::Rgb(0x0D, 0xC2, 0xFF),
                Color::Rgb(0x0D, 0xFF, 0x72),
                Color::Rgb(0xF5, 0x38, 0xFF),
                Color::Rgb(0xFF, 0x8E, 0x0D),
                Color::Rgb(0xFF, 0xE1, 0x38),
            ],
            color_change_time: Instant::now(),
        }
    }
}

impl MenuRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_option(menu: &mut Menu) {
        Self::step(menu, 1);
    }

    pub fn prev_option(menu: &mut Menu) {
        Self::step(menu, -1);
    }

    fn step(menu: &mut Menu, step: isize) {
        match menu.state {
            MenuState::MainMenu => {
                menu.selected_option = cycle(&MenuOption::ALL, menu.selected_option, step);
            }
            MenuState::Options => {
                menu.options_selected = cycle(&OptionsOption::ALL, menu.options_selected, step);
            }
            MenuState::Puzzle | MenuState::Driving => {}
        }
    }

    /// Rotates the title colours once per step.
    pub fn update(&mut self) {
        if self.color_change_time.elapsed() > COLOR_STEP {
            self.color_change_time = Instant::now();
            self.title_colors.rotate_left(1);
        }
    }

    pub fn render_menu(f: &mut Frame, app: &App) {
        let area = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TITLE_HEIGHT + 2),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(area);

        render_title(f, chunks[0], &app.menu_renderer.title_colors);
        match app.menu.state {
            MenuState::MainMenu => render_main_menu_options(f, chunks[1], &app.menu),
            MenuState::Options => render_options_menu(f, chunks[1], app),
            MenuState::Puzzle | MenuState::Driving => {}
        }

        let hint = Paragraph::new("↑/↓ select   Enter confirm   Esc back   q quit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[2]);
    }
}

fn letter_width(letter: &str) -> u16 {
    letter.lines().next().map_or(0, |l| l.chars().count()) as u16
}

fn render_title(f: &mut Frame, area: Rect, colors: &[Color]) {
    let title_width: u16 = TITLE_LETTERS.iter().map(|l| letter_width(l)).sum::<u16>()
        + LETTER_GAP * (TITLE_LETTERS.len() as u16 - 1);

    if area.width < title_width || area.height < TITLE_HEIGHT {
        let title = Paragraph::new(Line::from(Span::styled(
            "ARCADE",
            Style::default()
                .fg(colors.first().copied().unwrap_or(Color::White))
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        f.render_widget(title, area);
        return;
    }

    let title_area = centered_rect(title_width, TITLE_HEIGHT, area);
    let mut x = title_area.x;
    for (i, letter) in TITLE_LETTERS.iter().enumerate() {
        let width = letter_width(letter);
        let color = colors.get(i % colors.len().max(1)).copied().unwrap_or(Color::White);
        let paragraph = Paragraph::new(Text::from(*letter)).style(Style::default().fg(color));
        f.render_widget(paragraph, Rect::new(x, title_area.y, width, TITLE_HEIGHT));
        x += width + LETTER_GAP;
    }
}

fn option_lines(labels: &[String], selected: usize) -> Text<'static> {
    let lines: Vec<Line> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            if i == selected {
                Line::from(Span::styled(
                    format!("> {label} <"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::raw(label.clone()))
            }
        })
        .collect();
    Text::from(lines)
}

fn render_main_menu_options(f: &mut Frame, area: Rect, menu: &Menu) {
    let labels: Vec<String> = MenuOption::ALL.iter().map(|o| o.label().to_string()).collect();
    let selected = MenuOption::ALL
        .iter()
        .position(|&o| o == menu.selected_option)
        .unwrap_or(0);

    let block_area = centered_rect(30, labels.len() as u16 + 2, area);
    let paragraph = Paragraph::new(option_lines(&labels, selected))
        .block(Block::default().borders(Borders::ALL).title(" Main Menu "))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, block_area);
}

fn on_off(value: bool) -> &'static str {
    if value { "ON" } else { "OFF" }
}

fn render_options_menu(f: &mut Frame, area: Rect, app: &App) {
    let labels: Vec<String> = OptionsOption::ALL
        .iter()
        .map(|option| match option {
            OptionsOption::MusicToggle => format!("Music: {}", on_off(app.audio.is_music_enabled())),
            OptionsOption::SoundToggle => format!("Sound: {}", on_off(app.audio.is_sound_enabled())),
            OptionsOption::VolumeUp => format!("Volume +  ({:.1})", app.audio.get_volume()),
            OptionsOption::VolumeDown => format!("Volume -  ({:.1})", app.audio.get_volume()),
            OptionsOption::GridToggle => format!("Grid: {}", on_off(app.config.puzzle.show_grid)),
            OptionsOption::Back => "Back".to_string(),
        })
        .collect();
    let selected = OptionsOption::ALL
        .iter()
        .position(|&o| o == app.menu.options_selected)
        .unwrap_or(0);

    let mut title = " Options ".to_string();
    if !app.audio.is_audio_available() {
        title = " Options (no audio device) ".to_string();
    }

    let block_area = centered_rect(34, labels.len() as u16 + 2, area);
    let paragraph = Paragraph::new(option_lines(&labels, selected))
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, block_area);
}
