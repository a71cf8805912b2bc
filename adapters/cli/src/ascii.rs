use std::{io::Write, time::Duration};

use anyhow::Result;
use dungeon_core::{CellCoord, EnemyKind, GamePhase, Position};
use dungeon_rendering::{Color, FrameControl, FrameInput, Presentation, RenderingBackend, Scene};
use glam::Vec2;

const PLAYER_GLYPH: char = '@';
const PLAYER_COLOR: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Frame pacing and scripted input of a headless session.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AsciiOptions {
    /// Number of frames simulated before the final frame is printed.
    pub(crate) frames: u32,
    /// Simulated time per frame.
    pub(crate) frame_delta: Duration,
    /// Heading held on every frame.
    pub(crate) heading: Option<Vec2>,
    /// Tap delivered on the first frame.
    pub(crate) tap: Option<Vec2>,
    /// Whether glyphs are coloured with ANSI escape codes.
    pub(crate) color: bool,
}

/// Backend that simulates a fixed number of frames and prints the last one as text.
#[derive(Debug)]
pub(crate) struct AsciiBackend<W> {
    out: W,
    options: AsciiOptions,
}

impl<W: Write> AsciiBackend<W> {
    pub(crate) fn new(out: W, options: AsciiOptions) -> Self {
        Self { out, options }
    }
}

impl<W: Write> RenderingBackend for AsciiBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Result<FrameControl>,
    {
        let Presentation { title, mut scene } = presentation;
        writeln!(self.out, "{title}")?;

        for frame in 0..self.options.frames {
            let input = FrameInput {
                heading: self.options.heading,
                tap: self.options.tap.filter(|_| frame == 0),
            };
            if update_scene(self.options.frame_delta, input, &mut scene)? == FrameControl::Exit {
                break;
            }
        }

        self.out.write_all(draw(&scene, self.options.color).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

fn enemy_glyph(kind: EnemyKind) -> char {
    match kind {
        EnemyKind::Skull => 'S',
        EnemyKind::BlueSlime => 'b',
        EnemyKind::GreenSlime => 'g',
        EnemyKind::PurpleSlime => 'p',
    }
}

fn cell_under(scene: &Scene, point: Vec2) -> Option<usize> {
    let cell = CellCoord::containing(Position::new(point.x, point.y))?;
    if cell.column() >= scene.columns || cell.row() >= scene.rows {
        return None;
    }
    Some(cell.row() as usize * scene.columns as usize + cell.column() as usize)
}

/// Renders the scene row by row, starting at row zero, followed by a status line.
/// The inventory screen also lists every occupied slot.
pub(crate) fn draw(scene: &Scene, color: bool) -> String {
    let mut glyphs: Vec<(char, Color)> = scene
        .tiles
        .iter()
        .map(|tile| (tile.kind.glyph(), tile.color()))
        .collect();

    for entity in &scene.entities {
        if let Some(index) = cell_under(scene, entity.position + Vec2::splat(0.5)) {
            glyphs[index] = (enemy_glyph(entity.kind), entity.color());
        }
    }
    if let Some(index) = cell_under(scene, scene.player.position) {
        glyphs[index] = (PLAYER_GLYPH, PLAYER_COLOR.hurt_flash(scene.player.tint));
    }

    let mut text = String::new();
    let columns = scene.columns.max(1) as usize;
    for row in glyphs.chunks(columns) {
        for (glyph, tint) in row {
            if color {
                let [red, green, blue] = tint.to_rgb_u8();
                text.push_str(&format!("\x1b[38;2;{red};{green};{blue}m{glyph}"));
            } else {
                text.push(*glyph);
            }
        }
        if color {
            text.push_str("\x1b[0m");
        }
        text.push('\n');
    }

    let player = &scene.player;
    text.push_str(&format!(
        "health {:.1}/{:.0} ({:.0}%)  coins {:.0}{}\n",
        player.health.max(0.0),
        player.max_health,
        player.health_fraction() * 100.0,
        player.coins,
        match scene.phase {
            GamePhase::Play => "",
            GamePhase::Inventory => "  [inventory]",
            GamePhase::Death => "  [you died]",
        }
    ));

    if scene.phase == GamePhase::Inventory {
        for (slot, stack) in &player.items {
            let marker = if player.selected_slot == Some(*slot) {
                '>'
            } else {
                ' '
            };
            text.push_str(&format!(
                "{marker}{slot:>2} {} x{}\n",
                stack.kind().name(),
                stack.amount()
            ));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::{CellKind, EntityId, ItemKind, ItemStack};
    use dungeon_rendering::{SceneEntity, ScenePlayer, SceneTile};

    fn scene(phase: GamePhase) -> Scene {
        let kinds = [
            CellKind::Wall,
            CellKind::Floor,
            CellKind::Floor,
            CellKind::Wall,
            CellKind::Wall,
            CellKind::Floor,
            CellKind::ChestClosed,
            CellKind::Wall,
        ];
        let tiles = kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| SceneTile {
                cell: CellCoord::new(index as u32 % 4, index as u32 / 4),
                kind: *kind,
                tint: 1.0,
            })
            .collect();

        Scene::new(
            4,
            2,
            tiles,
            vec![SceneEntity {
                id: EntityId::new(0),
                kind: EnemyKind::GreenSlime,
                position: Vec2::new(1.0, 1.0),
                tint: 1.0,
            }],
            ScenePlayer {
                position: Vec2::new(2.5, 0.3),
                health: 13.0,
                max_health: 20.0,
                coins: 7.0,
                tint: 1.0,
                items: vec![
                    (0, ItemStack::new(ItemKind::Wood, 2)),
                    (3, ItemStack::new(ItemKind::BoneDagger, 1)),
                ],
                selected_slot: Some(3),
            },
            phase,
        )
        .expect("scene")
    }

    #[test]
    fn plain_frames_overlay_enemies_and_the_player() {
        let text = draw(&scene(GamePhase::Play), false);
        assert_eq!(text, "#.@#\n#gC#\nhealth 13.0/20 (65%)  coins 7\n");
    }

    #[test]
    fn death_is_reported_in_the_status_line() {
        let text = draw(&scene(GamePhase::Death), false);
        assert!(text.ends_with("[you died]\n"));
    }

    #[test]
    fn inventory_screen_lists_items_by_name() {
        let text = draw(&scene(GamePhase::Inventory), false);
        assert!(text.ends_with(
            "coins 7  [inventory]\n  0 Wood x2\n> 3 Bone Dagger x1\n"
        ));
    }

    #[test]
    fn coloured_frames_reset_after_each_row() {
        let text = draw(&scene(GamePhase::Play), true);
        assert_eq!(text.matches("\x1b[0m\n").count(), 2);
        assert!(text.contains("\x1b[38;2;255;255;255m@"));
    }

    #[test]
    fn backend_stops_when_asked() {
        let mut out = Vec::new();
        let backend = AsciiBackend::new(
            &mut out,
            AsciiOptions {
                frames: 10,
                frame_delta: Duration::from_millis(16),
                heading: None,
                tap: Some(Vec2::new(1.5, 1.5)),
                color: false,
            },
        );

        let mut taps = Vec::new();
        let mut frames = 0;
        backend
            .run(
                Presentation::new("Welcome", scene(GamePhase::Play)),
                |_, input, _| {
                    frames += 1;
                    taps.push(input.tap);
                    Ok(if frames == 3 {
                        FrameControl::Exit
                    } else {
                        FrameControl::Continue
                    })
                },
            )
            .expect("backend runs");

        assert_eq!(frames, 3);
        assert_eq!(taps, vec![Some(Vec2::new(1.5, 1.5)), None, None]);
        let printed = String::from_utf8(out).expect("utf8");
        assert!(printed.starts_with("Welcome\n#.@#\n"));
    }
}
