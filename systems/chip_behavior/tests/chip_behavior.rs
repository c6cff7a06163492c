use std::time::Duration;

use netbattle_core::{
    BattleRules, Chip, ChipCategory, ChipDefinition, Command, EnemySpawn, Event, NaviStats,
    TileCoord,
};
use netbattle_system_chip_behavior::{resolve_chip, ChipLibrary, ChipResolver};
use netbattle_world::{self as world, query, World};

fn battle(enemies: Vec<EnemySpawn>) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureBattle {
            navi: NaviStats::starter(),
            enemies,
            rules: BattleRules {
                intro: Duration::ZERO,
                ..BattleRules::default()
            },
        },
        &mut events,
    );
    world::apply(&mut world, Command::Tick { dt: Duration::ZERO }, &mut events);
    world
}

fn use_chip(world: &mut World, chip: Chip, navi: TileCoord) -> Vec<Event> {
    let mut resolver = ChipResolver::new();
    let mut commands = Vec::new();
    resolver.handle(&[Event::ChipActivated { chip, navi }], &mut commands);
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn step(world: &mut World, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);
    world::apply(world, Command::ResolveCollisions, &mut events);
    events
}

fn enemy(column: i32, row: i32) -> EnemySpawn {
    EnemySpawn::new("Fishy", 200, 14, 0, TileCoord::new(column, row))
}

fn hp_by_tile(world: &World) -> Vec<(TileCoord, i32)> {
    query::enemy_view(world)
        .iter()
        .map(|enemy| (enemy.tile, enemy.hp))
        .collect()
}

#[test]
fn mini_bomb_lands_three_columns_ahead_on_one_tile() {
    let library = ChipLibrary::builtin().expect("library");
    let mut world = battle(vec![enemy(5, 0), enemy(4, 0), enemy(5, 1)]);
    let chip = library.get("MiniBomb").cloned().expect("MiniBomb");

    let events = use_chip(&mut world, chip, TileCoord::new(2, 0));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::ImpactScheduled { target, .. } if *target == TileCoord::new(5, 0)
    )));

    let _ = step(&mut world, Duration::from_millis(400));
    assert_eq!(query::impacts(&world).len(), 1);
    let _ = step(&mut world, Duration::from_millis(100));
    assert_eq!(
        hp_by_tile(&world),
        vec![
            (TileCoord::new(5, 0), 150),
            (TileCoord::new(4, 0), 200),
            (TileCoord::new(5, 1), 200),
        ]
    );
}

#[test]
fn bomb_splashes_a_cross() {
    let bomb = resolve_chip(ChipDefinition::new("Bomb", ChipCategory::Attack, 60, "B"));
    let mut world = battle(vec![enemy(4, 1), enemy(3, 1), enemy(4, 0), enemy(5, 2)]);
    let _ = use_chip(&mut world, bomb, TileCoord::new(1, 1));
    let _ = step(&mut world, Duration::from_millis(500));
    assert_eq!(
        hp_by_tile(&world),
        vec![
            (TileCoord::new(4, 1), 140),
            (TileCoord::new(3, 1), 140),
            (TileCoord::new(4, 0), 140),
            (TileCoord::new(5, 2), 200),
        ]
    );
}

#[test]
fn wide_sword_sweeps_the_column_in_front() {
    let library = ChipLibrary::builtin().expect("library");
    let mut world = battle(vec![enemy(3, 0), enemy(3, 2), enemy(4, 1)]);
    let chip = library.get("WideSword").cloned().expect("WideSword");
    let events = use_chip(&mut world, chip, TileCoord::new(2, 1));
    let slashed = events.iter().find_map(|event| match event {
        Event::SlashPerformed { tiles, .. } => Some(tiles.clone()),
        _ => None,
    });
    assert_eq!(
        slashed,
        Some(vec![
            TileCoord::new(3, 0),
            TileCoord::new(3, 1),
            TileCoord::new(3, 2),
        ])
    );
    assert_eq!(
        hp_by_tile(&world),
        vec![
            (TileCoord::new(3, 0), 120),
            (TileCoord::new(3, 2), 120),
            (TileCoord::new(4, 1), 200),
        ]
    );
}

#[test]
fn cannon_shot_travels_down_the_row() {
    let library = ChipLibrary::builtin().expect("library");
    let mut world = battle(vec![enemy(5, 2), enemy(4, 1)]);
    let chip = library.get("Cannon").cloned().expect("Cannon");
    let _ = use_chip(&mut world, chip, TileCoord::new(0, 1));
    for _ in 0..60 {
        let _ = step(&mut world, Duration::from_millis(16));
    }
    assert_eq!(
        hp_by_tile(&world),
        vec![(TileCoord::new(5, 2), 200), (TileCoord::new(4, 1), 160)]
    );
    assert!(query::projectile_view(&world).is_empty());
}

#[test]
fn recover_and_invis_affect_the_navi() {
    let library = ChipLibrary::builtin().expect("library");
    let mut world = battle(vec![enemy(4, 1)]);
    let recover = library.get("Recover30").cloned().expect("Recover30");
    let events = use_chip(&mut world, recover, TileCoord::new(1, 1));
    assert_eq!(events, vec![Event::NaviHealed { amount: 0, hp: 100 }]);

    let invis = library.get("Invis").cloned().expect("Invis");
    let _ = use_chip(&mut world, invis, TileCoord::new(1, 1));
    assert_eq!(query::navi(&world).invisibility, Duration::from_secs(3));

    let barrier = library.get("Barrier").cloned().expect("Barrier");
    assert!(use_chip(&mut world, barrier, TileCoord::new(1, 1)).is_empty());
}
