use std::time::Duration;

use dungeon_core::{
    CellCoord, CellRect, CellRectSize, Command, EnemyKind, EntityState, Event, GamePhase, Position,
    RoomId, RoomKind,
};
use dungeon_system_enemy_ai::{Config, EnemyAi};
use dungeon_world::{self as world, query, Dungeon, Layout};

fn rect(column: u32, row: u32, width: u32, height: u32) -> CellRect {
    CellRect::from_origin_and_size(CellCoord::new(column, row), CellRectSize::new(width, height))
}

fn one_room() -> Dungeon {
    let layout = Layout::from_rows(
        &["#######", "#.....#", "#.....#", "#.....#", "#######"],
        vec![rect(1, 1, 5, 3)],
        Vec::new(),
    )
    .expect("layout");
    Dungeon::with_room_kinds(layout, vec![RoomKind::Start], world::Config::default())
        .expect("dungeon")
}

fn two_rooms() -> Dungeon {
    let layout = Layout::from_rows(
        &[
            "#######   #####",
            "#.....#   #...#",
            "#.....,,,,,...#",
            "#.....#   #...#",
            "#.....#   #####",
            "#######        ",
        ],
        vec![rect(1, 1, 5, 4), rect(11, 1, 3, 3)],
        Vec::new(),
    )
    .expect("layout");
    Dungeon::with_room_kinds(
        layout,
        vec![RoomKind::Start, RoomKind::Start],
        world::Config::default(),
    )
    .expect("dungeon")
}

fn tick(dungeon: &mut Dungeon, ai: &mut EnemyAi, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(dungeon, Command::Tick { dt }, &mut events);

    let mut commands = Vec::new();
    ai.handle(
        &events,
        &query::player(dungeon),
        query::player_regions(dungeon),
        &query::entity_view(dungeon),
        &mut commands,
    );

    let mut generated = Vec::new();
    for command in commands {
        world::apply(dungeon, command, &mut generated);
    }
    generated
}

fn count_hits(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::PlayerHurt { .. }))
        .count()
}

#[test]
fn skull_within_reach_strikes_once_per_cooldown() {
    let mut dungeon = one_room();
    let player = query::player(&dungeon);
    assert_eq!(player.position, Position::new(3.5, 2.5));

    // Centre sits half a cell to the left of the player's centre.
    let entity = dungeon
        .spawn_entity(RoomId::new(0), EnemyKind::Skull, Position::new(2.5, 2.2))
        .expect("skull");
    let skull = query::entity_view(&dungeon);
    let skull = skull.get(entity).expect("skull snapshot");
    assert!((skull.center().distance(player.center()) - 0.5).abs() < 1e-5);

    let mut ai = EnemyAi::new(Config::default());
    let mut hits = 0;
    for _ in 0..4 {
        hits += count_hits(&tick(&mut dungeon, &mut ai, Duration::from_millis(250)));
    }
    assert_eq!(hits, 1);
    assert_eq!(query::player(&dungeon).health, 18.0);

    let view = query::entity_view(&dungeon);
    let skull = view.get(entity).expect("skull snapshot");
    assert_eq!(skull.state, EntityState::Attacking);
    assert_eq!(skull.position, Position::new(2.5, 2.2));

    for _ in 0..2 {
        hits += count_hits(&tick(&mut dungeon, &mut ai, Duration::from_millis(250)));
    }
    assert_eq!(hits, 2);
    assert_eq!(query::player(&dungeon).health, 16.0);
}

#[test]
fn distant_ready_enemy_pursues_the_player() {
    let mut dungeon = one_room();
    let entity = dungeon
        .spawn_entity(RoomId::new(0), EnemyKind::Skull, Position::new(1.0, 1.0))
        .expect("skull");
    let player = query::player(&dungeon);
    let before = query::entity_view(&dungeon)
        .get(entity)
        .map(|skull| skull.center().distance(player.center()))
        .expect("skull");

    let mut ai = EnemyAi::new(Config::default());
    let events = tick(&mut dungeon, &mut ai, Duration::from_millis(250));

    assert!(matches!(events.as_slice(), [Event::EntityMoved { .. }]));
    let view = query::entity_view(&dungeon);
    let skull = view.get(entity).expect("skull");
    assert_eq!(skull.state, EntityState::Pursuing);
    assert!(skull.center().distance(player.center()) < before);
    assert!((skull.position.distance(Position::new(1.0, 1.0)) - 0.25).abs() < 1e-5);
}

#[test]
fn enemy_rests_after_striking_when_player_leaves_reach() {
    let mut dungeon = one_room();
    let entity = dungeon
        .spawn_entity(RoomId::new(0), EnemyKind::Skull, Position::new(2.5, 2.2))
        .expect("skull");
    let mut ai = EnemyAi::new(Config::default());
    assert_eq!(count_hits(&tick(&mut dungeon, &mut ai, Duration::from_millis(250))), 1);

    let mut events = Vec::new();
    world::apply(
        &mut dungeon,
        Command::MovePlayer {
            position: Position::new(5.5, 3.0),
        },
        &mut events,
    );
    let events = tick(&mut dungeon, &mut ai, Duration::from_millis(250));
    assert!(events.is_empty());

    let view = query::entity_view(&dungeon);
    let skull = view.get(entity).expect("skull");
    assert_eq!(skull.state, EntityState::Resting);
    assert_eq!(skull.position, Position::new(2.5, 2.2));
    assert!((skull.cooldown - 0.25).abs() < 1e-6);
}

#[test]
fn enemies_outside_the_player_regions_stay_frozen() {
    let mut dungeon = two_rooms();
    let _ = dungeon
        .spawn_entity(RoomId::new(1), EnemyKind::BlueSlime, Position::new(12.0, 2.0))
        .expect("slime");
    assert_eq!(query::player(&dungeon).position, Position::new(3.5, 3.0));

    let mut ai = EnemyAi::new(Config::default());
    let mut commands = Vec::new();
    let mut events = Vec::new();
    world::apply(
        &mut dungeon,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
        &mut events,
    );
    ai.handle(
        &events,
        &query::player(&dungeon),
        query::player_regions(&dungeon),
        &query::entity_view(&dungeon),
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn repeated_strikes_kill_the_player_and_respawn_restores_play() {
    let mut dungeon = one_room();
    let _ = dungeon
        .spawn_entity(RoomId::new(0), EnemyKind::PurpleSlime, Position::new(2.5, 2.2))
        .expect("slime");
    let mut ai = EnemyAi::new(Config::default());

    let mut hits = 0;
    for _ in 0..10 {
        hits += count_hits(&tick(&mut dungeon, &mut ai, Duration::from_secs(1)));
    }
    assert_eq!(hits, 4);
    assert_eq!(query::phase(&dungeon), GamePhase::Death);
    assert!(query::player(&dungeon).health <= 0.0);

    let mut events = Vec::new();
    world::apply(
        &mut dungeon,
        Command::MovePlayer {
            position: Position::new(5.0, 1.5),
        },
        &mut events,
    );
    world::apply(&mut dungeon, Command::Respawn, &mut events);
    assert_eq!(
        events,
        vec![
            Event::PlayerRespawned {
                position: Position::new(3.5, 2.5),
            },
            Event::PhaseChanged {
                phase: GamePhase::Play,
            },
        ]
    );
    let player = query::player(&dungeon);
    assert_eq!(player.position, Position::new(3.5, 2.5));
    assert_eq!(player.health, player.max_health);
}
