#![warn(clippy::all, clippy::pedantic)]

use bevy_ecs::prelude::*;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use log::{debug, error, info};
use ratatui::layout::{Position, Rect};
use std::error;
use std::time::Duration;

use crate::assets::AssetStore;
use crate::components::{GameRng, Input, RunPhase};
use crate::config::Config;
use crate::driving::{FRAME_DURATION, SteeringInput, column_to_road_x};
use crate::driving_systems;
use crate::menu::MenuRenderer;
use crate::menu_types::{Menu, MenuOption, MenuState, OptionsOption, PuzzleControl};
use crate::sound::{AudioState, SoundQueue};
use crate::systems;

pub type AppResult<T> = std::result::Result<T, Box<dyn error::Error>>;

const VOLUME_STEP: f32 = 0.1;

// Catch-up limit for the fixed driving step after a stall
const MAX_DRIVING_LAG: Duration = Duration::from_millis(250);

pub struct App {
    pub puzzle: World,
    pub driving: World,
    pub should_quit: bool,
    pub menu: Menu,
    pub menu_renderer: MenuRenderer,
    pub audio: AudioState,
    pub assets: AssetStore,
    pub config: Config,
    /// Terminal area the road was last drawn into, for pointer steering
    pub road_area: Option<Rect>,
    /// Clickable puzzle buttons from the last frame
    pub puzzle_buttons: Vec<(PuzzleControl, Rect)>,
    persist_settings: bool,
    driving_lag: Duration,
}

impl App {
    /// App with a live audio device and sprites loading from the configured
    /// asset directory.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let audio = AudioState::new(&config.audio);
        let assets = AssetStore::load_in_background(config.assets.directory.clone());
        Self::assemble(config.clone(), audio, assets, GameRng::new(), GameRng::new(), true)
    }

    /// App without audio output, sprites or config writes. Games use
    /// seeded random sources.
    #[must_use]
    pub fn headless(config: Config, seed: u64) -> Self {
        let audio = AudioState::without_device(&config.audio);
        Self::assemble(
            config,
            audio,
            AssetStore::empty(),
            GameRng::with_seed(seed),
            GameRng::with_seed(seed.wrapping_add(1)),
            false,
        )
    }

    fn assemble(
        config: Config,
        audio: AudioState,
        assets: AssetStore,
        puzzle_rng: GameRng,
        driving_rng: GameRng,
        persist_settings: bool,
    ) -> Self {
        Self {
            puzzle: systems::create_puzzle_world(puzzle_rng),
            driving: driving_systems::create_driving_world(driving_rng),
            should_quit: false,
            menu: Menu::new(),
            menu_renderer: MenuRenderer::new(),
            audio,
            assets,
            config,
            road_area: None,
            puzzle_buttons: Vec::new(),
            persist_settings,
            driving_lag: Duration::ZERO,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        debug!("Key event: {key:?}");

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('m') => {
                self.toggle_music();
                return;
            }
            KeyCode::Char('+' | '=') => {
                self.change_volume(VOLUME_STEP);
                return;
            }
            KeyCode::Char('-' | '_') => {
                self.change_volume(-VOLUME_STEP);
                return;
            }
            _ => {}
        }

        match self.menu.state {
            MenuState::MainMenu | MenuState::Options => self.handle_menu_key(key.code),
            MenuState::Puzzle => self.handle_puzzle_key(key.code),
            MenuState::Driving => self.handle_driving_key(key.code),
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('w') => MenuRenderer::prev_option(&mut self.menu),
            KeyCode::Down | KeyCode::Char('s') => MenuRenderer::next_option(&mut self.menu),
            KeyCode::Enter | KeyCode::Char(' ') => self.select_menu_option(),
            KeyCode::Esc => {
                if self.menu.state == MenuState::Options {
                    self.menu.state = MenuState::MainMenu;
                }
            }
            KeyCode::Left => {
                if self.menu.state == MenuState::Options
                    && self.menu.options_selected == OptionsOption::VolumeDown
                {
                    self.change_volume(-VOLUME_STEP);
                }
            }
            KeyCode::Right => {
                if self.menu.state == MenuState::Options
                    && self.menu.options_selected == OptionsOption::VolumeUp
                {
                    self.change_volume(VOLUME_STEP);
                }
            }
            _ => {}
        }
    }

    fn select_menu_option(&mut self) {
        match self.menu.state {
            MenuState::MainMenu => match self.menu.selected_option {
                MenuOption::Puzzle => {
                    info!("Entering falling blocks");
                    self.menu.state = MenuState::Puzzle;
                }
                MenuOption::Driving => {
                    info!("Entering lane racer");
                    self.menu.state = MenuState::Driving;
                    self.driving_lag = Duration::ZERO;
                }
                MenuOption::Options => self.menu.state = MenuState::Options,
                MenuOption::Quit => self.should_quit = true,
            },
            MenuState::Options => match self.menu.options_selected {
                OptionsOption::MusicToggle => self.toggle_music(),
                OptionsOption::SoundToggle => {
                    self.audio.toggle_sound();
                    self.config.audio.sound_enabled = self.audio.is_sound_enabled();
                    self.save_settings();
                }
                OptionsOption::VolumeUp => self.change_volume(VOLUME_STEP),
                OptionsOption::VolumeDown => self.change_volume(-VOLUME_STEP),
                OptionsOption::GridToggle => {
                    self.config.puzzle.show_grid = !self.config.puzzle.show_grid;
                    self.save_settings();
                }
                OptionsOption::Back => self.menu.state = MenuState::MainMenu,
            },
            MenuState::Puzzle | MenuState::Driving => {}
        }
    }

    fn handle_puzzle_key(&mut self, code: KeyCode) {
        let control = match code {
            KeyCode::Esc => {
                self.leave_game();
                return;
            }
            KeyCode::Enter => PuzzleControl::Start,
            KeyCode::Char('r') => PuzzleControl::Reset,
            KeyCode::Left => PuzzleControl::Left,
            KeyCode::Right => PuzzleControl::Right,
            KeyCode::Down => PuzzleControl::Down,
            KeyCode::Up | KeyCode::Char(' ') => PuzzleControl::Rotate,
            _ => return,
        };
        self.apply_puzzle_control(control);
    }

    fn apply_puzzle_control(&mut self, control: PuzzleControl) {
        match control {
            PuzzleControl::Start => systems::start_game(&mut self.puzzle),
            PuzzleControl::Reset => systems::reset_game(&mut self.puzzle),
            PuzzleControl::Restart => systems::restart_game(&mut self.puzzle),
            movement => {
                if !self.puzzle.resource::<RunPhase>().is_running() {
                    return;
                }
                let mut input = self.puzzle.resource_mut::<Input>();
                match movement {
                    PuzzleControl::Left => {
                        input.left = true;
                        input.right = false;
                    }
                    PuzzleControl::Right => {
                        input.right = true;
                        input.left = false;
                    }
                    PuzzleControl::Down => input.down = true,
                    PuzzleControl::Rotate => input.rotate = true,
                    PuzzleControl::Start | PuzzleControl::Reset | PuzzleControl::Restart => {}
                }
            }
        }
        // Input takes effect immediately rather than waiting for the next tick
        systems::input_system(&mut self.puzzle);
    }

    fn handle_driving_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => driving_systems::start_run(&mut self.driving),
            KeyCode::Char('r') => driving_systems::reset_run(&mut self.driving),
            KeyCode::Esc => self.leave_game(),
            KeyCode::Left | KeyCode::Char('a') => self.shift_lane(-1),
            KeyCode::Right | KeyCode::Char('d') => self.shift_lane(1),
            _ => {}
        }
    }

    fn shift_lane(&mut self, delta: i32) {
        if self.driving.resource::<RunPhase>().is_running() {
            self.driving.resource_mut::<SteeringInput>().lane_shift += delta;
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match self.menu.state {
            MenuState::Puzzle => self.handle_puzzle_mouse(mouse),
            MenuState::Driving => self.handle_driving_mouse(mouse),
            MenuState::MainMenu | MenuState::Options => {}
        }
    }

    fn handle_puzzle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Down(_)) {
            return;
        }
        let clicked = Position::new(mouse.column, mouse.row);
        let control = self
            .puzzle_buttons
            .iter()
            .find(|(_, area)| area.contains(clicked))
            .map(|(control, _)| *control);
        if let Some(control) = control {
            debug!("Clicked {control:?}");
            self.apply_puzzle_control(control);
        }
    }

    fn handle_driving_mouse(&mut self, mouse: MouseEvent) {
        if !self.config.driving.mouse_steering {
            return;
        }
        if !matches!(
            mouse.kind,
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_)
        ) {
            return;
        }
        if !self.driving.resource::<RunPhase>().is_running() {
            return;
        }
        let Some(area) = self.road_area else {
            return;
        };
        if mouse.row < area.y || mouse.row >= area.y + area.height {
            return;
        }
        if let Some(x) = column_to_road_x(mouse.column, area.x, area.width) {
            self.driving.resource_mut::<SteeringInput>().pointer_x = Some(x);
        }
    }

    // Stop whichever game is showing and go back to the main menu
    fn leave_game(&mut self) {
        match self.menu.state {
            MenuState::Puzzle => systems::reset_game(&mut self.puzzle),
            MenuState::Driving => driving_systems::reset_run(&mut self.driving),
            MenuState::MainMenu | MenuState::Options => {}
        }
        self.flush_sounds();
        self.menu.state = MenuState::MainMenu;
    }

    /// Advances the visible game by `elapsed` of wall time and forwards queued
    /// sounds to the audio engine.
    pub fn update(&mut self, elapsed: Duration) {
        match self.menu.state {
            MenuState::Puzzle => {
                systems::input_system(&mut self.puzzle);
                systems::tick_system(&mut self.puzzle, elapsed.as_secs_f64() * 1000.0);
            }
            MenuState::Driving => {
                self.driving_lag = (self.driving_lag + elapsed).min(MAX_DRIVING_LAG);
                while self.driving_lag >= FRAME_DURATION {
                    self.driving_lag -= FRAME_DURATION;
                    driving_systems::frame_system(&mut self.driving);
                }
            }
            MenuState::MainMenu | MenuState::Options => self.menu_renderer.update(),
        }

        self.flush_sounds();
        self.assets.poll();
        self.audio.poll_device();
    }

    /// Housekeeping run a few times per second.
    pub fn on_tick(&mut self) {
        if !self.persist_settings {
            return;
        }
        if Config::check_and_reload() {
            let reloaded = Config::current();
            if reloaded != self.config {
                info!("Applying reloaded configuration");
                self.apply_config(reloaded);
            }
        }
    }

    fn apply_config(&mut self, config: Config) {
        if self.audio.is_music_enabled() != config.audio.music_enabled {
            self.audio.toggle_music();
        }
        if self.audio.is_sound_enabled() != config.audio.sound_enabled {
            self.audio.toggle_sound();
        }
        self.audio.set_volume(config.audio.volume);
        self.config = config;
    }

    /// Hands sounds queued by both games to the audio engine.
    pub fn flush_sounds(&mut self) {
        for world in [&mut self.puzzle, &mut self.driving] {
            let (effects, music) = world.resource_mut::<SoundQueue>().drain();
            for effect in effects {
                self.audio.play_sound(effect);
            }
            if let Some(playing) = music {
                self.audio.set_music_playing(playing);
            }
        }
    }

    pub fn toggle_music(&mut self) {
        self.audio.toggle_music();
        self.config.audio.music_enabled = self.audio.is_music_enabled();
        self.save_settings();
    }

    pub fn change_volume(&mut self, delta: f32) {
        let volume = self.audio.get_volume();
        self.audio.set_volume(volume + delta);
        self.config.audio.volume = self.audio.get_volume();
        self.save_settings();
    }

    fn save_settings(&self) {
        if !self.persist_settings {
            return;
        }
        if let Err(e) = self.config.persist() {
            error!("Failed to save configuration: {e}");
        }
    }
}
