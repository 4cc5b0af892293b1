#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]

use bevy_ecs::prelude::*;
use std::time::Duration;

/// Virtual road size in canvas units. The renderer scales this onto
/// whatever terminal area it gets.
pub const ROAD_WIDTH: f32 = 360.0;
pub const ROAD_HEIGHT: f32 = 640.0;
pub const LANE_COUNT: usize = 3;
pub const LANE_WIDTH: f32 = ROAD_WIDTH / LANE_COUNT as f32;

pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_HEIGHT: f32 = 80.0;
/// Distance from the bottom edge of the road to the top of the player car.
pub const PLAYER_BOTTOM_OFFSET: f32 = 100.0;
pub const STEERING_FACTOR: f32 = 0.15;

pub const OBSTACLE_WIDTH: f32 = 50.0;
pub const OBSTACLE_HEIGHT: f32 = 80.0;

pub const INITIAL_GAME_SPEED: f32 = 3.0;
pub const MAX_GAME_SPEED: f32 = 6.0;
pub const SPEED_STEP: f32 = 0.02;

pub const INITIAL_SPAWN_INTERVAL: f32 = 60.0;
pub const MIN_SPAWN_INTERVAL: f32 = 40.0;
pub const SPAWN_INTERVAL_STEP: f32 = 0.3;

pub const STARTING_LIVES: u32 = 3;
pub const BLINK_FRAMES: u32 = 30;
pub const INVINCIBILITY_FRAMES: u32 = 90;
pub const CRASH_SLOWDOWN: f32 = 0.15;
pub const SLOWDOWN_RECOVERY: f32 = 0.01;
pub const DODGE_POINTS: u32 = 10;

/// One frame of the fixed 60 Hz simulation.
pub const FRAME_DURATION: Duration = Duration::from_micros(16_667);

/// Axis-aligned rectangle in road units, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict overlap: rectangles that only touch edges do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Left edge that centres an object of `width` in `lane`.
#[must_use]
pub fn lane_left(lane: usize, width: f32) -> f32 {
    lane_center(lane) - width / 2.0
}

#[must_use]
pub fn lane_center(lane: usize) -> f32 {
    let lane = lane.min(LANE_COUNT - 1);
    LANE_WIDTH * lane as f32 + LANE_WIDTH / 2.0
}

/// Lane containing road coordinate `x`, clamped to the road.
#[must_use]
pub fn lane_of(x: f32) -> usize {
    if x <= 0.0 {
        return 0;
    }
    ((x / LANE_WIDTH) as usize).min(LANE_COUNT - 1)
}

/// Keeps a car of `width` fully on the road.
#[must_use]
pub fn clamp_to_road(x: f32, width: f32) -> f32 {
    x.clamp(0.0, ROAD_WIDTH - width)
}

/// Maps a terminal column inside a road area `[left, left + width)` to a road
/// x coordinate.
#[must_use]
pub fn column_to_road_x(column: u16, left: u16, width: u16) -> Option<f32> {
    if width == 0 || column < left || column >= left + width {
        return None;
    }
    let offset = f32::from(column - left) + 0.5;
    Some(offset / f32::from(width) * ROAD_WIDTH)
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Player {
    pub bounds: Bounds,
    /// Where the car is steering towards (left edge, road units)
    pub target_x: f32,
    pub approach: f32,
    /// Multiplier on scroll speed, dips after a crash
    pub slowdown: f32,
}

impl Default for Player {
    fn default() -> Self {
        let x = lane_left(LANE_COUNT / 2, PLAYER_WIDTH);
        Self {
            bounds: Bounds::new(
                x,
                ROAD_HEIGHT - PLAYER_BOTTOM_OFFSET,
                PLAYER_WIDTH,
                PLAYER_HEIGHT,
            ),
            target_x: x,
            approach: STEERING_FACTOR,
            slowdown: 1.0,
        }
    }
}

impl Player {
    #[must_use]
    pub fn lane(&self) -> usize {
        lane_of(self.bounds.center_x())
    }

    #[must_use]
    pub fn target_lane(&self) -> usize {
        lane_of(self.target_x + self.bounds.width / 2.0)
    }

    /// Steers toward the car being centred on road x `center`.
    pub fn steer_to(&mut self, center: f32) {
        self.target_x = clamp_to_road(center - self.bounds.width / 2.0, self.bounds.width);
    }

    /// Moves the steering target by whole lanes.
    pub fn shift_lane(&mut self, delta: i32) {
        let lane = (self.target_lane() as i32 + delta).clamp(0, LANE_COUNT as i32 - 1);
        self.target_x = lane_left(lane as usize, self.bounds.width);
    }

    /// Eases the car one frame toward its target.
    pub fn approach_target(&mut self) {
        self.bounds.x += (self.target_x - self.bounds.x) * self.approach;
    }

    pub fn recover(&mut self) {
        if self.slowdown < 1.0 {
            self.slowdown = (self.slowdown + SLOWDOWN_RECOVERY).min(1.0);
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub bounds: Bounds,
    pub lane: usize,
    pub hit: bool,
    /// Frames left before a hit obstacle disappears
    pub blink_timer: u32,
}

impl Obstacle {
    /// A fresh obstacle centred in `lane`, just above the top of the road.
    #[must_use]
    pub fn in_lane(lane: usize) -> Self {
        let lane = lane.min(LANE_COUNT - 1);
        Self {
            bounds: Bounds::new(
                lane_left(lane, OBSTACLE_WIDTH),
                -OBSTACLE_HEIGHT,
                OBSTACLE_WIDTH,
                OBSTACLE_HEIGHT,
            ),
            lane,
            hit: false,
            blink_timer: 0,
        }
    }

    #[must_use]
    pub fn is_off_screen(&self) -> bool {
        self.bounds.y > ROAD_HEIGHT
    }

    /// Whether the obstacle should be drawn this frame.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.hit || (self.blink_timer / 5) % 2 == 0
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct RunState {
    pub score: u32,
    pub game_speed: f32,
    pub spawn_timer: u32,
    pub spawn_interval: f32,
    pub lives: u32,
    pub invincible: bool,
    pub invincibility_timer: u32,
    pub road_offset: f32,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            score: 0,
            game_speed: INITIAL_GAME_SPEED,
            spawn_timer: 0,
            spawn_interval: INITIAL_SPAWN_INTERVAL,
            lives: STARTING_LIVES,
            invincible: false,
            invincibility_timer: 0,
            road_offset: 0.0,
        }
    }
}

impl RunState {
    /// Speed-up and interval shrink that follow every spawn.
    pub fn escalate(&mut self) {
        self.spawn_interval = (self.spawn_interval - SPAWN_INTERVAL_STEP).max(MIN_SPAWN_INTERVAL);
        self.game_speed = (self.game_speed + SPEED_STEP).min(MAX_GAME_SPEED);
    }

    /// Advances the spawn counter. True when an obstacle is due.
    pub fn tick_spawn_timer(&mut self) -> bool {
        self.spawn_timer += 1;
        if self.spawn_timer as f32 >= self.spawn_interval {
            self.spawn_timer = 0;
            true
        } else {
            false
        }
    }

    pub fn scroll(&mut self, distance: f32) {
        self.road_offset += distance;
        if self.road_offset >= ROAD_HEIGHT {
            self.road_offset = 0.0;
        }
    }

    pub fn tick_invincibility(&mut self) {
        if !self.invincible {
            return;
        }
        self.invincibility_timer = self.invincibility_timer.saturating_sub(1);
        if self.invincibility_timer == 0 {
            self.invincible = false;
        }
    }

    /// Whether the player car should be drawn this frame.
    #[must_use]
    pub fn player_visible(&self) -> bool {
        !self.invincible || (self.invincibility_timer / 5) % 2 == 0
    }
}

/// Steering intent collected from input between frames.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SteeringInput {
    /// Latest pointer position over the road, in road units
    pub pointer_x: Option<f32>,
    pub lane_shift: i32,
}
