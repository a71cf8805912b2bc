use std::time::Duration;

use dungeon_core::{
    CellCoord, CellKind, CellRect, CellRectSize, Command, EnemyKind, EntityId, EntityState, Event,
    GamePhase, Position, RegionId, RoomId, RoomKind,
};
use dungeon_world::{apply, query, Config, Dungeon, Layout};

fn rect(column: u32, row: u32, width: u32, height: u32) -> CellRect {
    CellRect::from_origin_and_size(CellCoord::new(column, row), CellRectSize::new(width, height))
}

fn lair() -> Dungeon {
    let layout = Layout::from_rows(
        &["#######", "#.....#", "#.....#", "#.....#", "#######"],
        vec![rect(1, 1, 5, 3)],
        Vec::new(),
    )
    .expect("layout");
    Dungeon::with_room_kinds(
        layout,
        vec![RoomKind::Lair(EnemyKind::Skull)],
        Config::default(),
    )
    .expect("dungeon")
}

fn two_rooms() -> Dungeon {
    let layout = Layout::from_rows(
        &[
            "#####   #####",
            "#...#   #...#",
            "#...,,,,,...#",
            "#...#   #...#",
            "#####   #####",
        ],
        vec![rect(1, 1, 3, 3), rect(9, 1, 3, 3)],
        Vec::new(),
    )
    .expect("layout");
    Dungeon::with_room_kinds(
        layout,
        vec![RoomKind::Start, RoomKind::Terminal],
        Config::default(),
    )
    .expect("dungeon")
}

fn run(dungeon: &mut Dungeon, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(dungeon, command, &mut events);
    events
}

fn defeat(dungeon: &mut Dungeon, entity: EntityId) -> Vec<Event> {
    run(
        dungeon,
        Command::StrikeEntity {
            entity,
            damage: 1000.0,
        },
    )
}

#[test]
fn lair_rooms_spawn_enemies_and_hide_a_chest_on_their_border() {
    let dungeon = lair();
    let room = query::room_view(&dungeon)
        .get(RoomId::new(0))
        .cloned()
        .expect("room");

    assert!((2..=4).contains(&room.entities.len()));
    let chests: Vec<CellCoord> = query::cells(&dungeon)
        .filter(|(_, kind)| *kind == CellKind::ChestClosed)
        .map(|(cell, _)| cell)
        .collect();
    assert_eq!(chests.len(), 1);
    assert!(room.rect.is_boundary(chests[0]));

    let contents = query::chest_contents(&dungeon, chests[0]).expect("contents");
    assert_eq!(contents.len(), 2, "first chests carry a key");
}

#[test]
fn clearing_a_room_promotes_its_chest_exactly_once() {
    let mut dungeon = lair();
    let room = query::room_view(&dungeon)
        .get(RoomId::new(0))
        .cloned()
        .expect("room");

    let mut released = Vec::new();
    let mut cleared = 0;
    for entity in room.entities {
        for event in defeat(&mut dungeon, entity) {
            match event {
                Event::ChestReleased { cell } => released.push(cell),
                Event::RoomCleared { .. } => cleared += 1,
                _ => {}
            }
        }
    }
    assert_eq!(cleared, 1);
    assert_eq!(released.len(), 1);
    assert_eq!(dungeon.block_at_cell(released[0]), CellKind::ChestOpen);

    let straggler = dungeon
        .spawn_entity(RoomId::new(0), EnemyKind::Skull, Position::new(2.0, 2.0))
        .expect("spawn");
    let events = defeat(&mut dungeon, straggler);
    assert!(events.contains(&Event::RoomCleared {
        room: RoomId::new(0)
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ChestReleased { .. })));
}

#[test]
fn pursuit_never_leaves_the_room() {
    let mut dungeon = lair();
    let entity = query::entity_view(&dungeon)
        .iter()
        .map(|entity| entity.id)
        .next()
        .expect("enemy");

    let events = run(
        &mut dungeon,
        Command::PursuePlayer {
            entity,
            position: Position::new(40.0, -3.0),
        },
    );

    let view = query::entity_view(&dungeon);
    let moved = view.get(entity).expect("enemy");
    assert_eq!(moved.position, Position::new(6.0, 1.0));
    assert_eq!(moved.state, EntityState::Pursuing);
    assert!(matches!(
        events.as_slice(),
        [Event::EntityMoved { to, .. }] if *to == Position::new(6.0, 1.0)
    ));
}

#[test]
fn corridors_form_their_own_region_and_doors_belong_to_none() {
    let dungeon = two_rooms();

    assert_eq!(query::region_count(&dungeon), 3);
    assert_eq!(dungeon.block_at_cell(CellCoord::new(4, 2)), CellKind::Door);
    assert_eq!(dungeon.block_at_cell(CellCoord::new(8, 2)), CellKind::DoorLocked);
    assert!(query::regions_at_cell(&dungeon, CellCoord::new(4, 2)).is_empty());

    let corridor = query::regions_at_cell(&dungeon, CellCoord::new(6, 2));
    assert!(corridor.contains(&RegionId::new(2)));
    assert!(!corridor.contains(&RegionId::new(0)));

    let wall = query::regions_at_cell(&dungeon, CellCoord::new(4, 1));
    assert!(wall.contains(&RegionId::new(0)));
    assert!(wall.contains(&RegionId::new(2)));
}

#[test]
fn death_freezes_the_dungeon_until_respawn() {
    let mut dungeon = two_rooms();
    let slime = dungeon
        .spawn_entity(RoomId::new(0), EnemyKind::PurpleSlime, Position::new(2.0, 2.0))
        .expect("spawn");

    for _ in 0..4 {
        let _ = run(&mut dungeon, Command::StrikePlayer { entity: slime });
        let _ = run(
            &mut dungeon,
            Command::AccrueCooldown {
                entity: slime,
                dt: Duration::from_secs(1),
                state: EntityState::Attacking,
            },
        );
    }
    assert_eq!(query::phase(&dungeon), GamePhase::Death);
    assert_eq!(query::player(&dungeon).health, 0.0);

    let _ = run(
        &mut dungeon,
        Command::MovePlayer {
            position: Position::new(10.5, 2.5),
        },
    );
    assert!(run(&mut dungeon, Command::Tick { dt: Duration::from_secs(1) }).is_empty());
    assert!(run(
        &mut dungeon,
        Command::SetPhase {
            phase: GamePhase::Play
        }
    )
    .is_empty());
    assert!(run(&mut dungeon, Command::StrikePlayer { entity: slime }).is_empty());

    let events = run(&mut dungeon, Command::Respawn);
    assert_eq!(
        events,
        vec![
            Event::PlayerRespawned {
                position: Position::new(2.5, 2.5)
            },
            Event::PhaseChanged {
                phase: GamePhase::Play
            },
        ]
    );
    let player = query::player(&dungeon);
    assert_eq!(player.health, player.max_health);
    assert_eq!(query::phase(&dungeon), GamePhase::Play);
    assert!(run(&mut dungeon, Command::Respawn).is_empty());

    let _ = run(
        &mut dungeon,
        Command::AccrueCooldown {
            entity: slime,
            dt: Duration::from_secs(1),
            state: EntityState::Attacking,
        },
    );
    let events = run(&mut dungeon, Command::StrikePlayer { entity: slime });
    assert!(!events.contains(&Event::PhaseChanged {
        phase: GamePhase::Death
    }));
    assert_eq!(query::player(&dungeon).health, 15.0);
}

#[test]
fn equally_sized_rooms_keep_a_start_and_a_terminal() {
    for seed in 0..8 {
        let layout = Layout::from_rows(
            &[
                "#####   #####",
                "#...#   #...#",
                "#...,,,,,...#",
                "#...#   #...#",
                "#####   #####",
            ],
            vec![rect(1, 1, 3, 3), rect(9, 1, 3, 3)],
            Vec::new(),
        )
        .expect("layout");
        let dungeon = Dungeon::new(layout, Config::default().with_seed(seed));

        let kinds: Vec<RoomKind> = query::room_view(&dungeon)
            .iter()
            .map(|room| room.kind)
            .collect();
        assert_eq!(kinds, vec![RoomKind::Start, RoomKind::Terminal]);
        assert_eq!(query::player(&dungeon).position, Position::new(2.5, 2.5));
        assert_eq!(dungeon.block_at_cell(CellCoord::new(8, 2)), CellKind::DoorLocked);
    }
}

#[test]
fn inventory_screen_pauses_then_resumes() {
    let mut dungeon = two_rooms();
    let _ = run(
        &mut dungeon,
        Command::SetPhase {
            phase: GamePhase::Inventory,
        },
    );
    assert!(run(
        &mut dungeon,
        Command::MovePlayer {
            position: Position::new(3.0, 3.0)
        }
    )
    .is_empty());
    assert_eq!(
        run(&mut dungeon, Command::SelectSlot { slot: Some(3) }),
        vec![Event::SlotSelected { slot: Some(3) }]
    );
    assert_eq!(
        run(&mut dungeon, Command::SelectSlot { slot: Some(500) }),
        vec![Event::SlotSelected { slot: None }]
    );

    let _ = run(
        &mut dungeon,
        Command::SetPhase {
            phase: GamePhase::Play,
        },
    );
    let dt = Duration::from_millis(50);
    assert_eq!(
        run(&mut dungeon, Command::Tick { dt }),
        vec![Event::TimeAdvanced { dt }]
    );
}
