use std::time::Duration;

use plateau_defence_core::{Command, Event};
use plateau_defence_system_wave_director::WaveDirector;
use plateau_defence_world::{self as world, query, World};

struct Harness {
    world: World,
    director: WaveDirector,
    carried: Vec<Event>,
    log: Vec<(Duration, Event)>,
    clock: Duration,
}

impl Harness {
    fn new() -> Self {
        let mut harness = Self {
            world: World::default(),
            director: WaveDirector::default(),
            carried: Vec::new(),
            log: Vec::new(),
            clock: Duration::ZERO,
        };
        harness.apply(Command::BeginWave);
        harness
    }

    fn apply(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        for event in &events {
            self.log.push((self.clock, event.clone()));
        }
        self.carried.extend(events);
    }

    fn step(&mut self, dt: Duration) {
        self.clock += dt;
        self.apply(Command::Tick { dt });
        let events = std::mem::take(&mut self.carried);
        let live = query::monster_view(&self.world).len();
        let mut commands = Vec::new();
        self.director.handle(&events, live, &mut commands);
        for command in commands {
            self.apply(command);
        }
    }

    fn spawn_times(&self) -> Vec<Duration> {
        self.log
            .iter()
            .filter(|(_, event)| matches!(event, Event::MonsterSpawned { .. }))
            .map(|(time, _)| *time)
            .collect()
    }
}

#[test]
fn wave_one_spawns_eleven_monsters_on_cadence() {
    let mut harness = Harness::new();
    for _ in 0..2_000 {
        harness.step(Duration::from_millis(10));
    }

    let times = harness.spawn_times();
    assert_eq!(times.len(), 11);
    for (index, time) in times.iter().enumerate() {
        let expected = Duration::from_millis(1580 * (index as u64 + 1));
        assert_eq!(*time, expected, "spawn {index} off cadence");
    }

    let monsters = query::monster_view(&harness.world);
    assert_eq!(monsters.len(), 11);
    for monster in monsters.iter() {
        assert!((monster.speed - 6.4).abs() < 1e-5);
    }
    assert!(!harness.director.is_spawning());
    assert_eq!(harness.director.next_wave_in(), None);
}

#[test]
fn cleared_field_triggers_next_wave_after_delay() {
    let mut harness = Harness::new();
    for _ in 0..1_800 {
        harness.step(Duration::from_millis(10));
    }
    let ids: Vec<_> = query::monster_view(&harness.world)
        .iter()
        .map(|monster| monster.id)
        .collect();
    assert_eq!(ids.len(), 11);
    for monster in ids {
        harness.apply(Command::LeakMonster { monster });
    }
    let gold = query::economy(&harness.world).gold;

    harness.step(Duration::from_millis(10));
    assert_eq!(
        harness.director.next_wave_in(),
        Some(Duration::from_millis(4500))
    );
    for _ in 0..450 {
        harness.step(Duration::from_millis(10));
    }

    let economy = query::economy(&harness.world);
    assert_eq!(economy.wave, 2);
    assert_eq!(economy.gold, gold + 160);
    assert!(harness
        .log
        .iter()
        .any(|(_, event)| *event == Event::WaveStarted { wave: 2 }));

    harness.step(Duration::from_millis(10));
    assert_eq!(harness.director.pending_spawns(), 14);
}
