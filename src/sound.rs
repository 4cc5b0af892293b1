use anyhow::{Context, Result};
use bevy_ecs::prelude::Resource;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};
use fundsp::hacker32::*;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use crate::assets::AssetState;
use crate::config::AudioSettings;

// Length of the pre-rendered background loop, in seconds
const MUSIC_LOOP_SECONDS: f64 = 8.0;

// Sound effects types that can be played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Move,
    Rotate,
    Drop,
    LineClear,
    GameOver,
    Crash,
    Dodge,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 7] = [
        SoundEffect::Move,
        SoundEffect::Rotate,
        SoundEffect::Drop,
        SoundEffect::LineClear,
        SoundEffect::GameOver,
        SoundEffect::Crash,
        SoundEffect::Dodge,
    ];

    /// Playback length in seconds.
    #[must_use]
    pub fn duration(self) -> f64 {
        match self {
            SoundEffect::Move | SoundEffect::Rotate => 0.06,
            SoundEffect::Drop | SoundEffect::Dodge => 0.15,
            SoundEffect::LineClear => 0.5,
            SoundEffect::Crash => 0.4,
            SoundEffect::GameOver => 1.5,
        }
    }
}

/// Sounds requested by game systems during a tick, drained by the app into
/// the audio thread.
#[derive(Resource, Debug, Default)]
pub struct SoundQueue {
    pub effects: Vec<SoundEffect>,
    /// Latest music request: `Some(true)` to start the loop, `Some(false)` to stop it.
    pub music: Option<bool>,
}

impl SoundQueue {
    pub fn push(&mut self, effect: SoundEffect) {
        self.effects.push(effect);
    }

    pub fn set_music(&mut self, playing: bool) {
        self.music = Some(playing);
    }

    pub fn drain(&mut self) -> (Vec<SoundEffect>, Option<bool>) {
        (std::mem::take(&mut self.effects), self.music.take())
    }
}

// Command to control the audio thread
enum AudioCommand {
    PlaySound(SoundEffect),
    PlayMusic(bool),
    SetVolume(f32),
    Quit,
}

pub struct AudioState {
    sender: Option<Sender<AudioCommand>>,
    status: Option<Receiver<bool>>,
    device: AssetState<()>,
    music_enabled: bool,
    sound_enabled: bool,
    music_playing: bool,
    volume: f32,
}

impl AudioState {
    pub fn new(settings: &AudioSettings) -> Self {
        let (sender, receiver) = bounded(64);
        let (status_sender, status_receiver) = bounded(1);
        let mix = Mix::from_settings(settings);

        let spawned = thread::Builder::new()
            .name("audio".to_string())
            .spawn(move || {
                if let Err(e) = run_audio_thread(&receiver, &status_sender, mix) {
                    error!("Audio thread error: {e:#}");
                    let _ = status_sender.try_send(false);
                }
            });

        let mut state = Self::without_device(settings);
        match spawned {
            Ok(_) => {
                state.sender = Some(sender);
                state.status = Some(status_receiver);
                state.device = AssetState::Pending;
            }
            Err(e) => error!("Failed to start audio thread: {e}"),
        }
        state
    }

    /// An audio state with no output device; every request is accepted and dropped.
    #[must_use]
    pub fn without_device(settings: &AudioSettings) -> Self {
        Self {
            sender: None,
            status: None,
            device: AssetState::Unavailable,
            music_enabled: settings.music_enabled,
            sound_enabled: settings.sound_enabled,
            music_playing: false,
            volume: settings.volume.clamp(0.0, 1.0),
        }
    }

    pub fn play_sound(&self, effect: SoundEffect) -> bool {
        if !self.sound_enabled {
            return false;
        }
        if let Some(sender) = &self.sender {
            let _ = sender.try_send(AudioCommand::PlaySound(effect));
        }
        true
    }

    /// Picks up the device status reported by the audio thread.
    pub fn poll_device(&mut self) {
        let Some(status) = &self.status else {
            return;
        };
        match status.try_recv() {
            Ok(true) => {
                info!("Audio device ready");
                self.device = AssetState::Ready(());
                self.status = None;
                // Replay state that may have changed while the device was opening
                self.send(AudioCommand::SetVolume(self.volume));
                self.send_music();
            }
            Ok(false) | Err(TryRecvError::Disconnected) => {
                warn!("Audio unavailable, continuing without sound");
                self.device = AssetState::Unavailable;
                self.status = None;
                self.sender = None;
            }
            Err(TryRecvError::Empty) => {}
        }
    }

    #[must_use]
    pub fn is_audio_available(&self) -> bool {
        !matches!(self.device, AssetState::Unavailable)
    }

    #[must_use]
    pub fn is_music_enabled(&self) -> bool {
        self.music_enabled
    }

    #[must_use]
    pub fn is_sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    #[must_use]
    pub fn is_music_playing(&self) -> bool {
        self.music_playing
    }

    pub fn toggle_sound(&mut self) {
        self.sound_enabled = !self.sound_enabled;
    }

    pub fn toggle_music(&mut self) {
        self.music_enabled = !self.music_enabled;
        self.send_music();
    }

    /// Starts or stops the background loop on behalf of a game. It is only
    /// audible while music is enabled.
    pub fn set_music_playing(&mut self, playing: bool) {
        if self.music_playing != playing {
            debug!("Background music {}", if playing { "started" } else { "stopped" });
        }
        self.music_playing = playing;
        self.send_music();
    }

    #[must_use]
    pub fn get_volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        // Clamp volume between 0.0 and 1.0
        self.volume = volume.clamp(0.0, 1.0);
        self.send(AudioCommand::SetVolume(self.volume));
    }

    fn send_music(&self) {
        self.send(AudioCommand::PlayMusic(
            self.music_enabled && self.music_playing,
        ));
    }

    fn send(&self, command: AudioCommand) {
        if let Some(sender) = &self.sender {
            let _ = sender.try_send(command);
        }
    }
}

impl Drop for AudioState {
    fn drop(&mut self) {
        self.send(AudioCommand::Quit);
    }
}

/// Gains applied when mixing.
#[derive(Debug, Clone, Copy)]
struct Mix {
    master: f32,
    music: f32,
    effects: f32,
}

impl Mix {
    fn from_settings(settings: &AudioSettings) -> Self {
        Self {
            master: settings.volume.clamp(0.0, 1.0),
            music: settings.music_volume.clamp(0.0, 1.0),
            effects: settings.effects_volume.clamp(0.0, 1.0),
        }
    }
}

fn run_audio_thread(
    receiver: &Receiver<AudioCommand>,
    status: &Sender<bool>,
    mix: Mix,
) -> Result<()> {
    // Get the default audio device
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("No audio output device found")?;
    let config = device
        .default_output_config()
        .context("No default output config")?;

    let sample_rate = f64::from(config.sample_rate().0);
    let bank = SoundBank::render(sample_rate);

    // Channel for commands handled inside the audio callback
    let (mixer_sender, mixer_receiver) = bounded::<MixerCommand>(64);

    // Set up audio stream based on the device's sample format
    let _stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            run_audio_stream::<f32>(&device, &config.into(), mixer_receiver, bank, mix)?
        }
        cpal::SampleFormat::I16 => {
            run_audio_stream::<i16>(&device, &config.into(), mixer_receiver, bank, mix)?
        }
        cpal::SampleFormat::U16 => {
            run_audio_stream::<u16>(&device, &config.into(), mixer_receiver, bank, mix)?
        }
        format => return Err(anyhow::anyhow!("Unsupported audio format {format:?}")),
    };

    let _ = status.try_send(true);

    // Keep the thread alive and forward commands to the callback
    while let Ok(command) = receiver.recv() {
        let forwarded = match command {
            AudioCommand::PlaySound(effect) => MixerCommand::Effect(effect),
            AudioCommand::PlayMusic(enabled) => MixerCommand::Music(enabled),
            AudioCommand::SetVolume(volume) => MixerCommand::Volume(volume),
            AudioCommand::Quit => break,
        };
        let _ = mixer_sender.try_send(forwarded);
    }

    Ok(())
}

enum MixerCommand {
    Effect(SoundEffect),
    Music(bool),
    Volume(f32),
}

/// Effects and the music loop rendered once at the device sample rate.
struct SoundBank {
    effects: HashMap<SoundEffect, Arc<Vec<f32>>>,
    music: Vec<f32>,
}

impl SoundBank {
    fn render(sample_rate: f64) -> Self {
        let effects = SoundEffect::ALL
            .iter()
            .map(|&effect| {
                let mut node = create_sound_effect(effect);
                let samples = render_mono(node.as_mut(), sample_rate, effect.duration());
                (effect, Arc::new(samples))
            })
            .collect();

        let mut music = create_background_music();
        let music = render_mono(music.as_mut(), sample_rate, MUSIC_LOOP_SECONDS);

        Self { effects, music }
    }
}

/// Renders a fundsp graph into a mono sample buffer.
#[must_use]
pub fn render_mono(node: &mut dyn AudioUnit, sample_rate: f64, duration: f64) -> Vec<f32> {
    node.set_sample_rate(sample_rate);
    node.reset();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let sample_count = (sample_rate * duration) as usize;
    (0..sample_count).map(|_| node.get_mono()).collect()
}

fn run_audio_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    commands: Receiver<MixerCommand>,
    bank: SoundBank,
    mix: Mix,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = usize::from(config.channels);

    let mut master = mix.master;
    let mut music_on = false;
    let mut music_cursor = 0usize;

    // Playing effects: buffer and read cursor
    let mut active: Vec<(Arc<Vec<f32>>, usize)> = Vec::new();

    let mut next_value = move || {
        while let Ok(command) = commands.try_recv() {
            match command {
                MixerCommand::Effect(effect) => {
                    if let Some(samples) = bank.effects.get(&effect) {
                        active.push((Arc::clone(samples), 0));
                    }
                }
                MixerCommand::Music(enabled) => music_on = enabled,
                MixerCommand::Volume(volume) => master = volume,
            }
        }

        let mut sample = 0.0f32;
        for (samples, cursor) in &mut active {
            if let Some(value) = samples.get(*cursor) {
                sample += value * mix.effects;
            }
            *cursor += 1;
        }
        active.retain(|(samples, cursor)| *cursor < samples.len());

        if music_on && !bank.music.is_empty() {
            sample += bank.music[music_cursor] * mix.music;
            music_cursor = (music_cursor + 1) % bank.music.len();
        }

        (sample * master).clamp(-1.0, 1.0)
    };

    let err_fn = |err| error!("Error in audio stream: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = T::from_sample(next_value());
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok(stream)
}

// Short click for sideways movement
fn create_move_click() -> Box<dyn AudioUnit> {
    Box::new(sine_hz(220.0) * envelope(|t: f32| if t < 0.05 { 1.0 } else { 0.0 }) * 0.3)
}

// Higher pitched click for rotation
fn create_rotate_click() -> Box<dyn AudioUnit> {
    Box::new(sine_hz(440.0) * envelope(|t: f32| if t < 0.05 { 1.0 } else { 0.0 }) * 0.3)
}

// Thud when a piece locks
fn create_drop_thud() -> Box<dyn AudioUnit> {
    let tone = sine_hz(90.0) * 0.5;
    let hiss = noise() * 0.1;
    Box::new((tone + hiss) * envelope(|t: f32| (-20.0 * t).exp()))
}

// Rising sweep for cleared lines
fn create_line_clear() -> Box<dyn AudioUnit> {
    let sweep = envelope(|t: f32| 300.0 + 500.0 * (t * 5.0).min(1.0)) >> sine();
    Box::new(
        sweep
            * envelope(|t: f32| {
                if t < 0.2 {
                    1.0
                } else {
                    (0.5 - t).max(0.0) * 2.0
                }
            })
            * 0.3,
    )
}

// Descending pitch
fn create_game_over() -> Box<dyn AudioUnit> {
    let sweep = envelope(|t: f32| (600.0 - 300.0 * t).max(100.0)) >> sine();
    Box::new(sweep * envelope(|t: f32| (1.5 - t).max(0.0) * 0.5) * 0.4)
}

// Noisy burst when the car hits an obstacle
fn create_crash() -> Box<dyn AudioUnit> {
    let rumble = envelope(|t: f32| 120.0 - 80.0 * (t * 2.5).min(1.0)) >> sine();
    Box::new((rumble * 0.4 + noise() * 0.3) * envelope(|t: f32| (-8.0 * t).exp()))
}

// Soft blip for a dodged obstacle
fn create_dodge() -> Box<dyn AudioUnit> {
    let blip = envelope(|t: f32| if t < 0.06 { 660.0 } else { 880.0 }) >> sine();
    Box::new(blip * envelope(|t: f32| (0.15 - t).max(0.0) * 4.0) * 0.3)
}

// Create a sound effect based on type
fn create_sound_effect(effect: SoundEffect) -> Box<dyn AudioUnit> {
    match effect {
        SoundEffect::Move => create_move_click(),
        SoundEffect::Rotate => create_rotate_click(),
        SoundEffect::Drop => create_drop_thud(),
        SoundEffect::LineClear => create_line_clear(),
        SoundEffect::GameOver => create_game_over(),
        SoundEffect::Crash => create_crash(),
        SoundEffect::Dodge => create_dodge(),
    }
}

// Background loop built from fundamental oscillators
fn create_background_music() -> Box<dyn AudioUnit> {
    // Bass line
    let bass = sine_hz(110.0) * 0.08;

    // Melody cycling through a pentatonic scale
    let melody = lfo(|t: f32| {
        let notes = [220.0, 261.63, 293.66, 349.23, 392.0];
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let idx = ((t * 2.0) % 5.0) as usize;
        notes[idx]
    }) >> sine() * 0.1;

    // Chord pad for harmony
    let chord = sine_hz(220.0) * 0.03 + sine_hz(329.63) * 0.02 + sine_hz(392.0) * 0.02;

    // Rhythmic pulse
    let rhythm = lfo(|t: f32| if (t * 2.0) % 1.0 < 0.1 { 0.05 } else { 0.0 }) * sine_hz(440.0);

    Box::new((bass + melody + chord + rhythm) * 0.6)
}

#[cfg(test)]
pub(crate) fn render_effect_for_tests(effect: SoundEffect, sample_rate: f64) -> Vec<f32> {
    let mut node = create_sound_effect(effect);
    render_mono(node.as_mut(), sample_rate, effect.duration())
}

#[cfg(test)]
pub(crate) fn render_music_for_tests(sample_rate: f64, duration: f64) -> Vec<f32> {
    let mut node = create_background_music();
    render_mono(node.as_mut(), sample_rate, duration)
}
