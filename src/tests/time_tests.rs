#![warn(clippy::all, clippy::pedantic)]

#[cfg(test)]
mod tests {
    use crate::Time;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_time_starts_with_zero_delta() {
        let time = Time::new();
        assert_eq!(time.delta(), Duration::ZERO);
        assert!(time.delta_seconds().abs() < f32::EPSILON);
    }

    #[test]
    fn test_time_update_measures_elapsed() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(5));
        let elapsed = time.update();

        assert!(elapsed >= Duration::from_millis(5));
        assert_eq!(time.delta(), elapsed);
        assert!(time.delta_millis() >= 5.0);
    }
}
