use std::time::Duration;

use dungeon_core::{
    CellCoord, CellRect, CellRectSize, Command, Event, Position, RoomKind, PLAYER_FOOT_OFFSET,
    PLAYER_HALF_WIDTH,
};
use dungeon_system_player_movement::{Heading, PlayerMovement, COLLISION_EPSILON};
use dungeon_world::{self as world, query, Dungeon, Layout};

fn one_room() -> Dungeon {
    let layout = Layout::from_rows(
        &["#######", "#.....#", "#.....#", "#.....#", "#######"],
        vec![CellRect::from_origin_and_size(
            CellCoord::new(1, 1),
            CellRectSize::new(5, 3),
        )],
        Vec::new(),
    )
    .expect("layout");
    Dungeon::with_room_kinds(layout, vec![RoomKind::Start], world::Config::default())
        .expect("dungeon")
}

fn place(dungeon: &mut Dungeon, position: Position) {
    let mut events = Vec::new();
    world::apply(dungeon, Command::MovePlayer { position }, &mut events);
}

fn step(dungeon: &mut Dungeon, movement: &mut PlayerMovement, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(dungeon, Command::Tick { dt }, &mut events);

    let mut commands = Vec::new();
    let player = query::player(dungeon);
    movement.handle(
        &events,
        &player,
        |position| dungeon.can_walk(position),
        &mut commands,
    );

    let mut generated = Vec::new();
    for command in commands {
        world::apply(dungeon, command, &mut generated);
    }
    generated
}

#[test]
fn walking_into_a_wall_stops_at_its_boundary() {
    let mut dungeon = one_room();
    place(&mut dungeon, Position::new(5.5, 2.0));
    let mut movement = PlayerMovement::new();
    movement.set_heading(Some(Heading::new(1.0, 0.0)));

    for _ in 0..3 {
        let _ = step(&mut dungeon, &mut movement, Duration::from_millis(100));
        let right = query::player(&dungeon).body().right();
        assert!(right < 6.0, "body entered the wall: {right}");
        assert!(6.0 - right <= COLLISION_EPSILON * 2.0, "gap too large: {right}");
    }
}

#[test]
fn walking_down_into_a_wall_keeps_feet_on_the_floor() {
    let mut dungeon = one_room();
    place(&mut dungeon, Position::new(3.5, 1.3));
    let mut movement = PlayerMovement::new();
    movement.set_heading(Some(Heading::new(0.0, -1.0)));

    let _ = step(&mut dungeon, &mut movement, Duration::from_millis(100));
    let player = query::player(&dungeon);
    let bottom = player.position.y - PLAYER_FOOT_OFFSET;
    assert!(bottom > 1.0);
    assert!(bottom - 1.0 <= COLLISION_EPSILON * 2.0);
    assert!(dungeon.can_walk(Position::new(player.position.x, bottom)));
}

#[test]
fn diagonal_movement_slides_along_walls() {
    let mut dungeon = one_room();
    place(&mut dungeon, Position::new(5.5, 2.0));
    let mut movement = PlayerMovement::new();
    movement.set_heading(Some(Heading::new(1.0, 1.0)));

    let events = step(&mut dungeon, &mut movement, Duration::from_millis(100));
    assert!(matches!(events.as_slice(), [Event::PlayerMoved { .. }]));

    let player = query::player(&dungeon);
    let expected_rise = 0.4 * std::f32::consts::FRAC_1_SQRT_2;
    assert!((player.position.y - (2.0 + expected_rise)).abs() < 1e-4);
    assert!((player.position.x + PLAYER_HALF_WIDTH - 6.0).abs() <= COLLISION_EPSILON * 2.0);
}

#[test]
fn movement_uses_player_speed() {
    let mut dungeon = one_room();
    place(&mut dungeon, Position::new(2.0, 2.0));
    let mut movement = PlayerMovement::new();
    movement.set_heading(Some(Heading::new(1.0, 0.0)));

    let _ = step(&mut dungeon, &mut movement, Duration::from_millis(250));
    let position = query::player(&dungeon).position;
    assert!((position.x - 3.0).abs() < 1e-5);
    assert!((position.y - 2.0).abs() < 1e-5);
}

#[test]
fn respawn_clears_the_heading() {
    let mut movement = PlayerMovement::new();
    movement.set_heading(Some(Heading::new(1.0, 0.0)));
    let dungeon = one_room();

    let mut commands = Vec::new();
    movement.handle(
        &[
            Event::PlayerRespawned {
                position: Position::new(3.5, 2.5),
            },
            Event::TimeAdvanced {
                dt: Duration::from_millis(100),
            },
        ],
        &query::player(&dungeon),
        |position| dungeon.can_walk(position),
        &mut commands,
    );

    assert!(commands.is_empty());
    assert_eq!(movement.heading(), None);
}
