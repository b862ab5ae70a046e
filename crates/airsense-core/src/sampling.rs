//! Per-sensor polling schedule
//!
//! Every sensor has its own interval. The control loop calls
//! [`SamplingSchedule::tick`] with the board's millisecond counter, which is a
//! `u32` that wraps after ~49.7 days, and gets back the sensors that are due.

use heapless::Vec;
use log::warn;

use crate::config::SamplingConfig;
use crate::sensors::SensorKind;

/// Sensors that came due on one tick, in slot order.
pub type DueSensors = Vec<SensorKind, { SensorKind::COUNT }>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingSchedule {
    intervals_ms: [u32; SensorKind::COUNT],
    since_last_ms: [u32; SensorKind::COUNT],
    prev_ms: Option<u32>,
}

impl SamplingSchedule {
    pub fn new(config: &SamplingConfig) -> Self {
        let mut intervals_ms = [0; SensorKind::COUNT];
        for kind in SensorKind::ALL {
            // a zero interval would fire on every tick
            intervals_ms[kind.slot()] = config.interval_ms(kind).max(1);
        }

        Self {
            intervals_ms,
            since_last_ms: [0; SensorKind::COUNT],
            prev_ms: None,
        }
    }

    pub fn interval_ms(&self, kind: SensorKind) -> u32 {
        self.intervals_ms[kind.slot()]
    }

    /// Milliseconds since `kind` last came due.
    pub fn since_last_ms(&self, kind: SensorKind) -> u32 {
        self.since_last_ms[kind.slot()]
    }

    /// Advance the schedule to `now_ms` and return the sensors now due.
    ///
    /// The first tick makes every sensor due. A sensor that fell more than one
    /// interval behind restarts its period instead of firing repeatedly.
    pub fn tick(&mut self, now_ms: u32) -> DueSensors {
        let mut due = DueSensors::new();

        let Some(prev_ms) = self.prev_ms.replace(now_ms) else {
            for kind in SensorKind::ALL {
                // capacity equals the number of sensors
                let _ = due.push(kind);
            }
            return due;
        };

        let elapsed = now_ms.wrapping_sub(prev_ms);
        for kind in SensorKind::ALL {
            let slot = kind.slot();
            let interval = self.intervals_ms[slot];
            let since = self.since_last_ms[slot].saturating_add(elapsed);

            if since < interval {
                self.since_last_ms[slot] = since;
                continue;
            }

            let remainder = since - interval;
            self.since_last_ms[slot] = if remainder >= interval {
                warn!(
                    "{}: polling fell behind by {} ms, restarting its period",
                    kind.name(),
                    remainder
                );
                0
            } else {
                remainder
            };
            let _ = due.push(kind);
        }

        due
    }

    /// Forget all timing so the next tick polls every sensor again.
    pub fn reset(&mut self) {
        self.since_last_ms = [0; SensorKind::COUNT];
        self.prev_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> SamplingSchedule {
        SamplingSchedule::new(&SamplingConfig {
            sht30_interval_ms: 2000,
            qmp6988_interval_ms: 2000,
            sgp30_interval_ms: 1000,
            gas_interval_ms: 500,
        })
    }

    #[test]
    fn test_first_tick_polls_everything() {
        let mut schedule = schedule();
        assert_eq!(schedule.tick(12_345).as_slice(), &SensorKind::ALL);
    }

    #[test]
    fn test_sensors_fire_at_their_own_rates() {
        let mut schedule = schedule();
        schedule.tick(0);

        assert!(schedule.tick(250).is_empty());
        assert_eq!(schedule.tick(500).as_slice(), &[SensorKind::GroveGas]);
        assert_eq!(
            schedule.tick(1000).as_slice(),
            &[SensorKind::Sgp30, SensorKind::GroveGas]
        );
        assert_eq!(schedule.tick(1500).as_slice(), &[SensorKind::GroveGas]);
        assert_eq!(schedule.tick(2000).as_slice(), &SensorKind::ALL);
    }

    #[test]
    fn test_late_ticks_keep_the_cadence() {
        let mut schedule = schedule();
        schedule.tick(0);

        // 100 ms late: the next period is shortened to stay on the grid
        assert_eq!(schedule.tick(600).as_slice(), &[SensorKind::GroveGas]);
        assert_eq!(schedule.since_last_ms(SensorKind::GroveGas), 100);
        assert_eq!(
            schedule.tick(1000).as_slice(),
            &[SensorKind::Sgp30, SensorKind::GroveGas]
        );
    }

    #[test]
    fn test_stall_restarts_period() {
        let mut schedule = schedule();
        schedule.tick(0);

        let due = schedule.tick(10_000);
        assert_eq!(due.as_slice(), &SensorKind::ALL);
        for kind in SensorKind::ALL {
            assert_eq!(schedule.since_last_ms(kind), 0);
        }
        assert!(schedule.tick(10_100).is_empty());
    }

    #[test]
    fn test_millis_wraparound() {
        let mut schedule = schedule();
        schedule.tick(u32::MAX - 200);

        assert!(schedule.tick(u32::MAX).is_empty());
        // 200 ms before the wrap plus 300 ms after it
        assert_eq!(schedule.tick(299).as_slice(), &[SensorKind::GroveGas]);
    }

    #[test]
    fn test_reset_polls_everything_again() {
        let mut schedule = schedule();
        schedule.tick(0);
        schedule.tick(100);
        schedule.reset();
        assert_eq!(schedule.tick(150).as_slice(), &SensorKind::ALL);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let schedule = SamplingSchedule::new(&SamplingConfig {
            sht30_interval_ms: 0,
            ..SamplingConfig::default()
        });
        assert_eq!(schedule.interval_ms(SensorKind::Sht30), 1);
    }
}
