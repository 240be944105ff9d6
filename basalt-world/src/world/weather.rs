//! The rain/thunder state machine.

use basalt_utils::JavaRandom;

use crate::world::info::WorldInfo;

/// Smoothed client-facing levels plus the state-machine step.
#[derive(Debug, Default)]
pub struct Weather {
    /// Rain strength in `[0, 1]`, eased toward the target each tick.
    pub rain_level: f32,
    /// Thunder strength in `[0, 1]`.
    pub thunder_level: f32,
}

/// Flags reporting what flipped during one weather tick.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WeatherChange {
    /// Rain toggled on or off.
    pub rain_toggled: bool,
    /// Thunder toggled on or off.
    pub thunder_toggled: bool,
}

impl Weather {
    /// Creates the state from persisted info.
    #[must_use]
    pub fn from_info(info: &WorldInfo) -> Self {
        Self {
            rain_level: if info.raining { 1.0 } else { 0.0 },
            thunder_level: if info.thundering { 1.0 } else { 0.0 },
        }
    }

    /// Advances the countdowns one tick, re-rolling durations when they
    /// expire. Duration ranges follow the reference: rain runs
    /// 12000–23999 ticks and stays clear 12000–179999; thunder runs
    /// 3600–15599 and stays quiet 12000–179999.
    pub fn update(&mut self, info: &mut WorldInfo, rand: &mut JavaRandom) -> WeatherChange {
        let mut change = WeatherChange::default();

        if info.thunder_time <= 0 {
            info.thunder_time = if info.thundering {
                rand.next_i32_bounded(12_000) + 3600
            } else {
                rand.next_i32_bounded(168_000) + 12_000
            };
        } else {
            info.thunder_time -= 1;
            if info.thunder_time == 0 {
                info.thundering = !info.thundering;
                change.thunder_toggled = true;
            }
        }

        if info.rain_time <= 0 {
            info.rain_time = if info.raining {
                rand.next_i32_bounded(12_000) + 12_000
            } else {
                rand.next_i32_bounded(168_000) + 12_000
            };
        } else {
            info.rain_time -= 1;
            if info.rain_time == 0 {
                info.raining = !info.raining;
                change.rain_toggled = true;
            }
        }

        let rain_target: f32 = if info.raining { 1.0 } else { 0.0 };
        self.rain_level = (self.rain_level + (rain_target - 0.5).signum() * 0.01).clamp(0.0, 1.0);

        let thunder_target: f32 = if info.thundering { 1.0 } else { 0.0 };
        self.thunder_level =
            (self.thunder_level + (thunder_target - 0.5).signum() * 0.01).clamp(0.0, 1.0);

        change
    }

    /// Whether lightning can strike this tick.
    #[must_use]
    pub fn is_thundering(&self) -> bool {
        self.thunder_level > 0.9
    }

    /// Whether rain effects apply this tick.
    #[must_use]
    pub fn is_raining(&self) -> bool {
        self.rain_level > 0.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_flips_the_state() {
        let mut info = WorldInfo::new(0, "w");
        info.raining = false;
        info.rain_time = 3;
        info.thunder_time = 1000;
        let mut weather = Weather::from_info(&info);
        let mut rand = JavaRandom::new(0);

        let mut toggled = false;
        for _ in 0..3 {
            toggled |= weather.update(&mut info, &mut rand).rain_toggled;
        }
        assert!(toggled);
        assert!(info.raining);
        // A fresh duration was not yet rolled; the next tick rolls it.
        weather.update(&mut info, &mut rand);
        assert!(info.rain_time >= 12_000);
    }

    #[test]
    fn zero_timers_reroll_in_range() {
        let mut info = WorldInfo::new(0, "w");
        info.rain_time = 0;
        info.thunder_time = 0;
        let mut weather = Weather::from_info(&info);
        let mut rand = JavaRandom::new(42);
        weather.update(&mut info, &mut rand);
        assert!((12_000..180_000).contains(&info.rain_time));
        assert!((12_000..180_000).contains(&info.thunder_time));

        info.raining = true;
        info.thundering = true;
        info.rain_time = 0;
        info.thunder_time = 0;
        weather.update(&mut info, &mut rand);
        assert!((12_000..24_000).contains(&info.rain_time));
        assert!((3_600..15_600).contains(&info.thunder_time));
    }

    #[test]
    fn levels_ease_toward_state() {
        let mut info = WorldInfo::new(0, "w");
        info.raining = true;
        info.rain_time = 100_000;
        let mut weather = Weather::default();
        let mut rand = JavaRandom::new(0);
        for _ in 0..50 {
            weather.update(&mut info, &mut rand);
        }
        assert!(weather.rain_level > 0.2);
        assert!(weather.is_raining());
        assert!(!weather.is_thundering());
    }
}
