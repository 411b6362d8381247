use plateau_defence_core::{Command, GridCoord, MonsterId, StructureKind, TowerTarget};
use plateau_defence_system_tower_targeting::TowerTargeting;
use plateau_defence_world::{self as world, query, World};

fn apply(world: &mut World, command: Command) {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
}

fn targets(world: &World, system: &mut TowerTargeting) -> Vec<TowerTarget> {
    let mut out = Vec::new();
    system.handle(
        &query::structure_view(world),
        &query::monster_view(world),
        &mut out,
    );
    out
}

#[test]
fn tower_beside_the_path_acquires_the_monster_walking_past() {
    let mut world = World::default();
    let mut system = TowerTargeting::new();
    apply(
        &mut world,
        Command::PlaceStructure {
            kind: StructureKind::Tower,
            tile: GridCoord::new(11, 9),
        },
    );
    let tower = query::structure_at(&world, GridCoord::new(11, 9)).expect("tower placed");
    apply(&mut world, Command::SpawnMonster);
    apply(&mut world, Command::SpawnMonster);

    assert!(
        targets(&world, &mut system).is_empty(),
        "spawn point lies outside every tower's range"
    );

    let waypoints = query::path_waypoints(&world);
    let second = MonsterId::new(1);
    apply(
        &mut world,
        Command::MoveMonster {
            monster: second,
            position: waypoints[9],
            path_index: 9,
        },
    );

    let assignments = targets(&world, &mut system);
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].tower, tower);
    assert_eq!(assignments[0].monster, second);
    assert!(assignments[0].distance <= query::rules(&world).tower.range);
}

#[test]
fn walls_are_ignored_by_targeting() {
    let mut world = World::default();
    let mut system = TowerTargeting::new();
    apply(
        &mut world,
        Command::PlaceStructure {
            kind: StructureKind::Wall,
            tile: GridCoord::new(11, 9),
        },
    );
    apply(&mut world, Command::SpawnMonster);
    let waypoints = query::path_waypoints(&world);
    let monster = query::monster_view(&world)
        .iter()
        .next()
        .map(|monster| monster.id)
        .expect("monster spawned");
    apply(
        &mut world,
        Command::MoveMonster {
            monster,
            position: waypoints[9],
            path_index: 9,
        },
    );

    assert!(targets(&world, &mut system).is_empty());
}
