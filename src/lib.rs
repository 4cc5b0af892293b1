pub mod app;
pub mod assets;
pub mod components;
pub mod config;
pub mod driving;
pub mod driving_systems;
pub mod game;
pub mod menu;
pub mod menu_types;
pub mod sound;
pub mod systems;
pub mod ui;
pub mod ui_driving;

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

/// Wall-clock time between loop iterations.
#[derive(Debug, Clone)]
pub struct Time {
    delta: Duration,
    last_update: Instant,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    #[must_use]
    pub fn new() -> Self {
        Self {
            delta: Duration::default(),
            last_update: Instant::now(),
        }
    }

    /// Measures the time since the previous call.
    pub fn update(&mut self) -> Duration {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_update);
        self.last_update = now;
        self.delta
    }

    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    #[must_use]
    pub fn delta_millis(&self) -> f64 {
        self.delta.as_secs_f64() * 1000.0
    }

    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}
