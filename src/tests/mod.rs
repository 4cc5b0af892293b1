#![warn(clippy::all, clippy::pedantic)]

pub mod driving_systems_tests;
pub mod sound_tests;
pub mod systems_tests;
pub mod time_tests;
pub mod ui_tests;
