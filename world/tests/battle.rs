use std::time::Duration;

use glam::Vec2;
use netbattle_core::{
    BattlePhase, BattleRules, Chip, ChipBehavior, ChipCategory, ChipDefinition, Command,
    EnemySpawn, EnemyTimer, Event, Heading, NaviStats, OnHit, Side, SlashTint, SplashShape,
    TileCoord, Transition, DEFAULT_HIT_RADIUS,
};
use netbattle_world::{self as world, query, World};

fn rules() -> BattleRules {
    BattleRules {
        intro: Duration::ZERO,
        ..BattleRules::default()
    }
}

fn start(enemies: Vec<EnemySpawn>) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureBattle {
            navi: NaviStats::starter(),
            enemies,
            rules: rules(),
        },
        &mut events,
    );
    world::apply(&mut world, Command::Tick { dt: Duration::ZERO }, &mut events);
    assert_eq!(query::phase(&world), BattlePhase::Battle);
    world
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn sturdy(column: i32, row: i32) -> EnemySpawn {
    EnemySpawn::new("Canodumb", 100, 8, 0, TileCoord::new(column, row))
}

fn shot_at(position: Vec2, owner: Side, damage: i32, pierce: bool, on_hit: OnHit) -> Command {
    Command::FireProjectile {
        origin: position,
        heading: Heading::forward(owner),
        damage,
        owner,
        speed: 8.0,
        pierce,
        hit_radius: DEFAULT_HIT_RADIUS,
        on_hit,
        shockwave: false,
    }
}

fn hp_at(world: &World, tile: TileCoord) -> Vec<i32> {
    query::enemy_view(world)
        .iter()
        .filter(|enemy| enemy.tile == tile)
        .map(|enemy| enemy.hp)
        .collect()
}

fn cannon() -> Chip {
    Chip::new(
        ChipDefinition::new("Cannon", ChipCategory::Attack, 40, "A"),
        ChipBehavior::Shot {
            damage: 40,
            speed: 6.0,
            pierce: false,
            on_hit: OnHit::None,
        },
    )
}

#[test]
fn intro_prefills_gauge_before_battle() {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::ConfigureBattle {
            navi: NaviStats::starter(),
            enemies: vec![sturdy(4, 1)],
            rules: BattleRules::default(),
        },
    );
    let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(500) });
    assert_eq!(query::phase(&world), BattlePhase::Intro);
    assert_eq!(query::custom_gauge(&world), Duration::ZERO);

    let events = run(&mut world, Command::Tick { dt: Duration::from_millis(500) });
    assert!(events.contains(&Event::PhaseChanged {
        phase: BattlePhase::Battle
    }));
    assert_eq!(query::custom_gauge(&world), Duration::from_secs(15));
}

#[test]
fn projectiles_despawn_after_leaving_the_envelope() {
    let mut world = start(vec![sturdy(4, 0)]);
    let _ = run(
        &mut world,
        shot_at(Vec2::new(1.5, 2.0), Side::Navi, 1, false, OnHit::None),
    );
    let mut expired = false;
    for _ in 0..100 {
        let events = run(&mut world, Command::Tick { dt: Duration::from_millis(16) });
        expired |= events
            .iter()
            .any(|event| matches!(event, Event::ProjectileExpired { .. }));
        let _ = run(&mut world, Command::ResolveCollisions);
        if query::projectile_view(&world).is_empty() {
            break;
        }
    }
    assert!(expired);
    assert!(query::projectile_view(&world).is_empty());
    assert_eq!(hp_at(&world, TileCoord::new(4, 0)), vec![100]);
}

#[test]
fn buster_needs_exactly_forty_hits_through_defense() {
    let spawn = EnemySpawn::new("Mettaur", 40, 10, 2, TileCoord::new(4, 1));
    let mut world = start(vec![spawn]);
    for hit in 1..=40 {
        let _ = run(
            &mut world,
            shot_at(Vec2::new(4.0, 1.0), Side::Navi, 1, false, OnHit::None),
        );
        let events = run(&mut world, Command::ResolveCollisions);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EnemyDamaged { amount: 1, .. })));
        let alive = query::enemy_view(&world).iter().any(|enemy| enemy.alive);
        assert_eq!(alive, hit < 40, "hit {hit}");
    }

    let events = run(&mut world, Command::EvaluateOutcome);
    assert_eq!(query::phase(&world), BattlePhase::Win);
    let defeated = events.iter().find_map(|event| match event {
        Event::BattleWon { defeated } => Some(defeated.clone()),
        _ => None,
    });
    assert_eq!(defeated.map(|enemies| enemies.len()), Some(1));
}

#[test]
fn navi_damage_is_reduced_by_defense() {
    let mut world = start(vec![sturdy(4, 1)]);
    let _ = run(
        &mut world,
        shot_at(Vec2::new(1.0, 1.0), Side::Virus, 12, false, OnHit::None),
    );
    let events = run(&mut world, Command::ResolveCollisions);
    assert!(events.contains(&Event::NaviDamaged {
        amount: 7,
        remaining: 93
    }));
    assert!(query::projectile_view(&world).is_empty());
}

#[test]
fn invisibility_blocks_every_kind_of_hit() {
    let mut world = start(vec![sturdy(4, 1)]);
    let _ = run(
        &mut world,
        Command::GrantInvisibility {
            duration: Duration::from_secs(3),
        },
    );
    let _ = run(
        &mut world,
        Command::GrantInvisibility {
            duration: Duration::from_secs(1),
        },
    );
    assert_eq!(query::navi(&world).invisibility, Duration::from_secs(3));

    let _ = run(
        &mut world,
        shot_at(Vec2::new(1.0, 1.0), Side::Virus, 50, false, OnHit::None),
    );
    let _ = run(
        &mut world,
        Command::ScheduleImpact {
            target: TileCoord::new(1, 1),
            damage: 50,
            delay: Duration::ZERO,
            splash: SplashShape::Single,
            owner: Side::Virus,
        },
    );
    let mut events = run(&mut world, Command::ResolveCollisions);
    events.extend(run(
        &mut world,
        Command::StrikeTiles {
            tiles: vec![TileCoord::new(1, 1)],
            damage: 50,
            owner: Side::Virus,
            tint: SlashTint::Default,
        },
    ));

    let blocked = events
        .iter()
        .filter(|event| matches!(event, Event::HitBlocked))
        .count();
    assert_eq!(blocked, 3);
    let navi = query::navi(&world);
    assert_eq!(navi.stats.hp, 100);
    assert_eq!(navi.invisibility, Duration::from_secs(3));
    assert!(query::projectile_view(&world).is_empty());
}

#[test]
fn cross_impact_resolves_once_over_its_footprint() {
    let mut world = start(vec![
        sturdy(3, 1),
        sturdy(4, 1),
        sturdy(3, 0),
        sturdy(3, 2),
        sturdy(5, 1),
    ]);
    let _ = run(
        &mut world,
        Command::ScheduleImpact {
            target: TileCoord::new(3, 1),
            damage: 50,
            delay: Duration::from_millis(450),
            splash: SplashShape::Cross1,
            owner: Side::Navi,
        },
    );
    let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(300) });
    let _ = run(&mut world, Command::ResolveCollisions);
    assert_eq!(query::impacts(&world).len(), 1);

    let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(300) });
    let events = run(&mut world, Command::ResolveCollisions);
    let detonations = events
        .iter()
        .filter(|event| matches!(event, Event::ImpactDetonated { .. }))
        .count();
    assert_eq!(detonations, 1);

    for _ in 0..3 {
        let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(300) });
        let _ = run(&mut world, Command::ResolveCollisions);
    }
    for tile in [(3, 1), (4, 1), (3, 0), (3, 2)] {
        assert_eq!(hp_at(&world, TileCoord::new(tile.0, tile.1)), vec![50]);
    }
    assert_eq!(hp_at(&world, TileCoord::new(5, 1)), vec![100]);
    assert!(query::impacts(&world).is_empty());
}

#[test]
fn spreader_splashes_behind_and_diagonally() {
    let mut world = start(vec![
        sturdy(3, 1),
        sturdy(4, 0),
        sturdy(4, 1),
        sturdy(4, 2),
        sturdy(5, 1),
    ]);
    let _ = run(
        &mut world,
        shot_at(
            Vec2::new(3.0, 1.0),
            Side::Navi,
            30,
            false,
            OnHit::Spreader { diagonals: true },
        ),
    );
    let _ = run(&mut world, Command::ResolveCollisions);
    for tile in [(3, 1), (4, 0), (4, 1), (4, 2)] {
        assert_eq!(hp_at(&world, TileCoord::new(tile.0, tile.1)), vec![70]);
    }
    assert_eq!(hp_at(&world, TileCoord::new(5, 1)), vec![100]);
}

#[test]
fn airshot_push_is_blocked_by_occupied_tiles() {
    let mut world = start(vec![sturdy(3, 1), sturdy(4, 1), sturdy(3, 0)]);
    let push = OnHit::AirShot { push: 1 };
    let _ = run(
        &mut world,
        shot_at(Vec2::new(3.0, 1.0), Side::Navi, 10, false, push),
    );
    let events = run(&mut world, Command::ResolveCollisions);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyPushed { .. })));
    assert_eq!(hp_at(&world, TileCoord::new(3, 1)), vec![90]);

    let _ = run(
        &mut world,
        shot_at(Vec2::new(3.0, 0.0), Side::Navi, 10, false, push),
    );
    let _ = run(&mut world, Command::ResolveCollisions);
    assert_eq!(hp_at(&world, TileCoord::new(4, 0)), vec![90]);
    assert!(hp_at(&world, TileCoord::new(3, 0)).is_empty());
}

#[test]
fn piercing_shot_can_strike_the_same_enemy_again() {
    let mut world = start(vec![sturdy(4, 1)]);
    let _ = run(
        &mut world,
        shot_at(Vec2::new(4.0, 1.0), Side::Navi, 10, true, OnHit::None),
    );
    let _ = run(&mut world, Command::ResolveCollisions);
    let _ = run(&mut world, Command::ResolveCollisions);
    assert_eq!(hp_at(&world, TileCoord::new(4, 1)), vec![80]);
    assert_eq!(query::projectile_view(&world).len(), 1);
}

#[test]
fn shot_between_two_enemies_strikes_only_the_first_per_tick() {
    let mut world = start(vec![sturdy(4, 1), sturdy(5, 1)]);
    let _ = run(
        &mut world,
        shot_at(Vec2::new(4.5, 1.0), Side::Navi, 10, false, OnHit::None),
    );
    let _ = run(&mut world, Command::ResolveCollisions);
    assert_eq!(hp_at(&world, TileCoord::new(4, 1)), vec![90]);
    assert_eq!(hp_at(&world, TileCoord::new(5, 1)), vec![100]);
    assert!(query::projectile_view(&world).is_empty());

    let _ = run(
        &mut world,
        shot_at(Vec2::new(4.5, 1.0), Side::Navi, 10, true, OnHit::None),
    );
    let _ = run(&mut world, Command::ResolveCollisions);
    assert_eq!(hp_at(&world, TileCoord::new(4, 1)), vec![80]);
    assert_eq!(hp_at(&world, TileCoord::new(5, 1)), vec![100]);
    assert_eq!(query::projectile_view(&world).len(), 1);

    let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(40) });
    let _ = run(&mut world, Command::ResolveCollisions);
    assert_eq!(hp_at(&world, TileCoord::new(4, 1)), vec![80]);
    assert_eq!(hp_at(&world, TileCoord::new(5, 1)), vec![90]);
}

#[test]
fn attack_lock_holds_an_enemy_in_place_until_it_expires() {
    let mut boss = sturdy(4, 1);
    boss.attack_lock = Duration::from_millis(400);
    let mut world = start(vec![boss]);
    let id = query::enemy_view(&world)
        .iter()
        .map(|enemy| enemy.id)
        .next()
        .expect("enemy");
    let step = Command::StepEnemy {
        enemy: id,
        direction: netbattle_core::Direction::South,
    };

    let _ = run(
        &mut world,
        Command::ArmEnemyTimer {
            enemy: id,
            timer: EnemyTimer::Attack,
            duration: Duration::from_secs(5),
        },
    );
    assert!(query::enemy_view(&world).iter().all(|enemy| enemy.locked));
    assert!(run(&mut world, step.clone()).is_empty());
    assert_eq!(hp_at(&world, TileCoord::new(4, 1)), vec![100]);

    let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(300) });
    assert!(run(&mut world, step.clone()).is_empty());

    let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(150) });
    assert!(query::enemy_view(&world).iter().all(|enemy| !enemy.locked));
    let events = run(&mut world, step);
    assert_eq!(
        events,
        vec![Event::EnemyMoved {
            enemy: id,
            from: TileCoord::new(4, 1),
            to: TileCoord::new(4, 2),
        }]
    );
}

#[test]
fn melee_strikes_only_in_bounds_tiles() {
    let mut world = start(vec![sturdy(3, 0), sturdy(4, 1)]);
    let events = run(
        &mut world,
        Command::StrikeTiles {
            tiles: vec![
                TileCoord::new(3, -1),
                TileCoord::new(3, 0),
                TileCoord::new(3, 1),
            ],
            damage: 80,
            owner: Side::Navi,
            tint: SlashTint::Fire,
        },
    );
    assert!(events.contains(&Event::SlashPerformed {
        tiles: vec![TileCoord::new(3, 0), TileCoord::new(3, 1)],
        tint: SlashTint::Fire,
    }));
    assert_eq!(hp_at(&world, TileCoord::new(3, 0)), vec![20]);
    assert_eq!(hp_at(&world, TileCoord::new(4, 1)), vec![100]);
    assert_eq!(query::slashes(&world).len(), 1);

    let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(300) });
    assert!(query::slashes(&world).is_empty());
}

#[test]
fn heal_is_capped_at_maximum() {
    let mut world = World::new();
    let mut navi = NaviStats::starter();
    navi.hp = 90;
    let _ = run(
        &mut world,
        Command::ConfigureBattle {
            navi,
            enemies: vec![sturdy(4, 1)],
            rules: rules(),
        },
    );
    let _ = run(&mut world, Command::Tick { dt: Duration::ZERO });
    let events = run(&mut world, Command::HealNavi { amount: 30 });
    assert_eq!(events, vec![Event::NaviHealed { amount: 10, hp: 100 }]);
}

#[test]
fn custom_round_trip_with_no_selection_empties_queue() {
    let mut world = start(vec![sturdy(4, 1)]);
    let requested = run(&mut world, Command::RequestCustom);
    assert_eq!(requested, vec![Event::CustomRequested { hand_size: 5 }]);

    let _ = run(
        &mut world,
        Command::OpenCustom {
            hand: vec![cannon(), cannon()],
        },
    );
    assert_eq!(query::phase(&world), BattlePhase::Custom);
    assert_eq!(query::custom_gauge(&world), Duration::ZERO);

    let frozen = run(&mut world, Command::Tick { dt: Duration::from_secs(1) });
    assert!(frozen.is_empty());

    let events = run(&mut world, Command::ConfirmCustom);
    assert!(events.contains(&Event::ChipQueueSet { chips: Vec::new() }));
    assert_eq!(query::phase(&world), BattlePhase::Battle);
    assert!(query::chip_queue(&world).is_empty());
    assert_eq!(query::custom_gauge(&world), Duration::ZERO);
}

#[test]
fn custom_request_needs_a_full_gauge() {
    let mut world = start(vec![sturdy(4, 1)]);
    let _ = run(&mut world, Command::OpenCustom { hand: Vec::new() });
    assert_eq!(query::phase(&world), BattlePhase::Battle);
    assert_eq!(query::custom_gauge(&world), Duration::ZERO);
    assert!(run(&mut world, Command::RequestCustom).is_empty());
}

#[test]
fn selection_is_limited_and_queue_follows_selection_order() {
    let mut world = start(vec![sturdy(4, 1)]);
    let hand = vec![cannon(); 5];
    let _ = run(&mut world, Command::OpenCustom { hand });
    for slot in [3, 1, 0, 2, 4] {
        let _ = run(&mut world, Command::ToggleChip { slot });
    }
    let _ = run(&mut world, Command::ToggleChip { slot: 1 });
    let _ = run(&mut world, Command::ToggleChip { slot: 7 });
    let _ = run(&mut world, Command::MoveCursor { offset: -3 });
    let custom = query::custom(&world).expect("custom screen open");
    assert_eq!(custom.selected, vec![3, 0, 2, 4]);
    assert_eq!(custom.cursor, 0);
    let _ = run(&mut world, Command::MoveCursor { offset: 9 });
    assert_eq!(query::custom(&world).map(|screen| screen.cursor), Some(4));

    let _ = run(&mut world, Command::ConfirmCustom);
    assert_eq!(query::chip_queue(&world).len(), 4);
    let events = run(&mut world, Command::UseQueuedChip);
    assert!(matches!(
        events.as_slice(),
        [Event::ChipActivated { navi, .. }] if *navi == TileCoord::new(1, 1)
    ));
    assert_eq!(query::chip_queue(&world).len(), 3);
}

#[test]
fn losing_clears_the_field_and_returns_home() {
    let mut world = World::new();
    let mut navi = NaviStats::starter();
    navi.hp = 3;
    let _ = run(
        &mut world,
        Command::ConfigureBattle {
            navi,
            enemies: vec![sturdy(4, 1)],
            rules: rules(),
        },
    );
    let _ = run(&mut world, Command::Tick { dt: Duration::ZERO });
    let _ = run(
        &mut world,
        shot_at(Vec2::new(1.0, 1.0), Side::Virus, 20, false, OnHit::None),
    );
    let _ = run(
        &mut world,
        shot_at(Vec2::new(2.0, 0.0), Side::Navi, 20, false, OnHit::None),
    );
    let _ = run(&mut world, Command::ResolveCollisions);
    assert_eq!(query::navi(&world).stats.hp, 0);

    let events = run(&mut world, Command::EvaluateOutcome);
    assert!(events.contains(&Event::BattleLost));
    assert!(query::projectile_view(&world).is_empty());

    let _ = run(&mut world, Command::Tick { dt: Duration::from_secs(2) });
    assert_eq!(query::concluded(&world), None);
    let events = run(&mut world, Command::Tick { dt: Duration::from_millis(500) });
    assert_eq!(
        events,
        vec![Event::BattleConcluded {
            transition: Transition::ReturnHome
        }]
    );
}

#[test]
fn enemy_steps_stay_on_the_virus_side() {
    let mut world = start(vec![sturdy(3, 0)]);
    let id = query::enemy_view(&world)
        .iter()
        .map(|enemy| enemy.id)
        .next()
        .expect("enemy");
    let events = run(
        &mut world,
        Command::StepEnemy {
            enemy: id,
            direction: netbattle_core::Direction::West,
        },
    );
    assert!(events.is_empty());
    let _ = run(
        &mut world,
        Command::StepEnemy {
            enemy: id,
            direction: netbattle_core::Direction::South,
        },
    );
    assert_eq!(hp_at(&world, TileCoord::new(3, 1)), vec![100]);
}
