#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director that schedules monster spawns and the next wave.
//!
//! Both timers are countdown state advanced by `TimeAdvanced` events. A wave
//! begins when the world reports `WaveStarted`; the director then emits one
//! `SpawnMonster` per interval until the quota is reached. Once nothing is
//! spawning and no monster is alive, it arms the next-wave delay and emits
//! `AdvanceWave` when that delay elapses.

use std::time::Duration;

use plateau_defence_core::{Command, Event, WaveRules};

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Debug, Default)]
pub struct Config {
    rules: WaveRules,
}

impl Config {
    /// Creates a new configuration from the wave scaling rules.
    #[must_use]
    pub const fn new(rules: WaveRules) -> Self {
        Self { rules }
    }
}

#[derive(Clone, Copy, Debug)]
struct SpawnTimer {
    remaining: u32,
    interval: Duration,
    elapsed: Duration,
}

/// Pure system that emits spawn and wave commands from elapsed time.
#[derive(Debug)]
pub struct WaveDirector {
    rules: WaveRules,
    spawn: Option<SpawnTimer>,
    next_wave: Option<Duration>,
    awaiting_wave: bool,
    halted: bool,
}

impl WaveDirector {
    /// Creates a new wave director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rules: config.rules,
            spawn: None,
            next_wave: None,
            awaiting_wave: false,
            halted: false,
        }
    }

    /// Consumes world events and emits spawn and wave commands.
    ///
    /// `live_monsters` is the number of monsters alive before any spawn
    /// emitted by this call.
    pub fn handle(&mut self, events: &[Event], live_monsters: usize, out: &mut Vec<Command>) {
        if self.halted {
            return;
        }

        let mut spawned = 0;
        for event in events {
            match event {
                Event::WaveStarted { wave } => self.start_wave(*wave),
                Event::TimeAdvanced { dt } => spawned += self.advance(*dt, out),
                Event::GameOver { .. } => {
                    self.halted = true;
                    self.spawn = None;
                    self.next_wave = None;
                    return;
                }
                _ => {}
            }
        }

        self.schedule_next_wave(live_monsters + spawned);
    }

    /// Reports whether the current wave still has monsters to emit.
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        self.spawn.is_some()
    }

    /// Number of monsters the current wave has yet to emit.
    #[must_use]
    pub fn pending_spawns(&self) -> u32 {
        self.spawn.map_or(0, |timer| timer.remaining)
    }

    /// Time left before the next wave begins, if that delay is armed.
    #[must_use]
    pub fn next_wave_in(&self) -> Option<Duration> {
        self.next_wave
    }

    /// Replaces any running spawn timer with one for the provided wave.
    fn start_wave(&mut self, wave: u32) {
        self.awaiting_wave = false;
        let remaining = self.rules.quota(wave);
        self.spawn = (remaining > 0).then(|| SpawnTimer {
            remaining,
            interval: self.rules.spawn_interval(wave),
            elapsed: Duration::ZERO,
        });
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) -> usize {
        let mut spawned = 0;
        if let Some(mut timer) = self.spawn {
            timer.elapsed = timer.elapsed.saturating_add(dt);
            while timer.remaining > 0 && timer.elapsed >= timer.interval {
                timer.elapsed -= timer.interval;
                timer.remaining -= 1;
                out.push(Command::SpawnMonster);
                spawned += 1;
            }
            self.spawn = (timer.remaining > 0).then_some(timer);
        }

        if let Some(countdown) = self.next_wave {
            let countdown = countdown.saturating_sub(dt);
            if countdown.is_zero() {
                self.next_wave = None;
                self.awaiting_wave = true;
                out.push(Command::AdvanceWave);
            } else {
                self.next_wave = Some(countdown);
            }
        }
        spawned
    }

    fn schedule_next_wave(&mut self, live_monsters: usize) {
        if self.next_wave.is_some() || self.spawn.is_some() || self.awaiting_wave {
            return;
        }
        if live_monsters > 0 {
            return;
        }
        self.next_wave = Some(self.rules.next_wave_delay());
    }
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
