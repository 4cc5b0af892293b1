#![warn(clippy::all, clippy::pedantic)]

#[cfg(test)]
mod tests {
    use crate::config::AudioSettings;
    use crate::sound::{
        AudioState, SoundEffect, SoundQueue, render_effect_for_tests, render_music_for_tests,
    };

    const SAMPLE_RATE: f64 = 8_000.0;

    #[test]
    fn test_queue_drain_empties() {
        let mut queue = SoundQueue::default();
        queue.push(SoundEffect::Move);
        queue.push(SoundEffect::Crash);
        queue.set_music(true);
        queue.set_music(false);

        let (effects, music) = queue.drain();
        assert_eq!(effects, vec![SoundEffect::Move, SoundEffect::Crash]);
        assert_eq!(music, Some(false));

        let (effects, music) = queue.drain();
        assert!(effects.is_empty());
        assert_eq!(music, None);
    }

    #[test]
    fn test_audio_without_device_keeps_settings() {
        let settings = AudioSettings {
            music_enabled: false,
            volume: 0.7,
            ..AudioSettings::default()
        };
        let audio = AudioState::without_device(&settings);

        assert!(!audio.is_audio_available());
        assert!(!audio.is_music_enabled());
        assert!(audio.is_sound_enabled());
        assert!((audio.get_volume() - 0.7).abs() < f32::EPSILON);
        assert!(!audio.is_music_playing());
    }

    #[test]
    fn test_sound_toggle_silences_effects() {
        let mut audio = AudioState::without_device(&AudioSettings::default());
        assert!(audio.play_sound(SoundEffect::Drop));

        audio.toggle_sound();
        assert!(!audio.play_sound(SoundEffect::Drop));
    }

    #[test]
    fn test_music_flags() {
        let mut audio = AudioState::without_device(&AudioSettings::default());
        audio.set_music_playing(true);
        assert!(audio.is_music_playing());

        audio.toggle_music();
        assert!(!audio.is_music_enabled());
        assert!(audio.is_music_playing());
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut audio = AudioState::without_device(&AudioSettings::default());
        audio.set_volume(1.5);
        assert!((audio.get_volume() - 1.0).abs() < f32::EPSILON);
        audio.set_volume(-0.2);
        assert!(audio.get_volume().abs() < f32::EPSILON);
    }

    #[test]
    fn test_effects_render_audible_samples() {
        for effect in SoundEffect::ALL {
            let samples = render_effect_for_tests(effect, SAMPLE_RATE);
            let expected = SAMPLE_RATE * effect.duration();
            assert!(
                (samples.len() as f64 - expected).abs() <= 1.0,
                "{effect:?} rendered {} samples",
                samples.len()
            );
            assert!(samples.iter().all(|s| s.is_finite()), "{effect:?}");
            assert!(samples.iter().any(|s| s.abs() > 1e-4), "{effect:?} is silent");
        }
    }

    #[test]
    fn test_music_renders() {
        let samples = render_music_for_tests(SAMPLE_RATE, 0.5);
        assert_eq!(samples.len(), 4_000);
        assert!(samples.iter().all(|s| s.is_finite()));
        assert!(samples.iter().any(|s| s.abs() > 1e-4));
    }
}
