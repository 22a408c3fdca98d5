//! Frame driver that wires the world, the pure systems and the UI together.
//!
//! Every frame follows the same sequence: pointer selection, UI hit-testing
//! (which latches button intents), builder commands, the world tick, then
//! spawning / targeting / combat reacting to the fresh snapshots. Scene
//! population at the end is a pure read of query state.

use std::time::Duration;

use glam::Vec2;
use track_defence_core::{
    geometry, CellCoord, CellKind, Command, Event, SelectionKind, TowerTarget,
};
use track_defence_rendering::{
    layout::{Alignment, Margin, SemiVec},
    road_type,
    ui::{Background, Style, UiRegistry},
    Color, FrameInput, GridPresentation, GroundTile, HudPresentation, Rect, Scene, SceneBullet,
    SceneEnemy, SceneTower, SelectionPresentation, TileBase,
};
use track_defence_system_builder::{Builder, BuilderInput, SelectionState};
use track_defence_system_spawning::{Config as SpawnConfig, Spawning};
use track_defence_system_tower_combat::TowerCombat;
use track_defence_system_tower_targeting::TowerTargeting;
use track_defence_world::{apply, query, World};

use crate::layout_transfer::LayoutSnapshot;

const MIN_CELL_LENGTH: f32 = 16.0;
const MAX_CELL_LENGTH: f32 = 64.0;
const DEFAULT_CELL_LENGTH: f32 = 32.0;
const ZOOM_STEP: f32 = 2.0;

const PANEL_BACKGROUND: Color = Color::new(0.0, 0.0, 0.0, 0.5);
const END_MENU_BACKGROUND: Color = Color::new(0.0, 0.0, 0.0, 0.8);

/// Button intents latched by UI callbacks during a single frame.
#[derive(Debug, Default)]
pub(crate) struct PanelSignals {
    buy_tower: bool,
    upgrade_tower: bool,
    boost_range: bool,
    hover_hint: Option<&'static str>,
}

/// Owns the world, the systems and the UI tree for one game session.
pub(crate) struct GameDriver {
    world: World,
    spawning: Spawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    builder: Builder,
    ui: UiRegistry<PanelSignals>,
    selection: SelectionState,
    hover: Option<CellCoord>,
    hover_on_track: bool,
    segments: u32,
    cell_length: f32,
    game_over: bool,
    commands: Vec<Command>,
    events: Vec<Event>,
    targets: Vec<TowerTarget>,
}

impl GameDriver {
    /// Builds a driver for a fresh level, optionally restoring a layout.
    pub(crate) fn new(
        columns: u32,
        rows: u32,
        segments: u32,
        layout: Option<LayoutSnapshot>,
    ) -> Self {
        let (columns, rows, segments, towers) = match layout {
            Some(layout) => (
                layout.columns,
                layout.rows,
                layout.segments,
                layout.towers,
            ),
            None => (columns, rows, segments, Vec::new()),
        };

        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                columns,
                rows,
                segments,
            },
            &mut events,
        );
        for tower in towers {
            apply(
                &mut world,
                Command::RestoreTower {
                    origin: tower.origin,
                    level: tower.level,
                    range: tower.range,
                },
                &mut events,
            );
        }
        for event in &events {
            if let Event::TowerPlacementRejected { origin, reason } = event {
                log::warn!(
                    "imported tower at {},{} rejected: {reason:?}",
                    origin.column(),
                    origin.row()
                );
            }
        }

        Self {
            world,
            spawning: Spawning::new(SpawnConfig::default()),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            builder: Builder::new(),
            ui: build_ui(),
            selection: SelectionState::default(),
            hover: None,
            hover_on_track: false,
            segments,
            cell_length: DEFAULT_CELL_LENGTH,
            game_over: false,
            commands: Vec::new(),
            events: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Encodes the current tower layout as a shareable code.
    pub(crate) fn layout_code(&self) -> String {
        LayoutSnapshot::from_world(&self.world, self.segments).encode()
    }

    /// Advances one frame: input, systems, world commands, scene population.
    pub(crate) fn step(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        let screen = Rect::new(0.0, 0.0, input.screen.x, input.screen.y);

        if input.wheel_steps.abs() > f32::EPSILON {
            self.cell_length = (self.cell_length + input.wheel_steps * ZOOM_STEP)
                .clamp(MIN_CELL_LENGTH, MAX_CELL_LENGTH);
        }

        self.update_selection(input);

        let kind = self.selection.kind;
        self.ui.get_or_create("buy_tower").style.disabled = kind != SelectionKind::Grass;
        self.ui.get_or_create("add_range").style.disabled = kind != SelectionKind::Tower;
        self.ui.get_or_create("upgrade_tower").style.disabled = kind != SelectionKind::Tower;

        let mut signals = PanelSignals::default();
        self.ui
            .update(screen, input.pointer, input.clicked, &mut signals);

        self.commands.clear();
        self.builder.handle(
            BuilderInput::new(
                signals.buy_tower,
                signals.upgrade_tower,
                signals.boost_range,
            ),
            self.selection,
            |cell| query::tower_at(&self.world, cell),
            &mut self.commands,
        );

        self.events.clear();
        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }

        if !self.game_over {
            apply(&mut self.world, Command::Tick { dt }, &mut self.events);
        }

        // Spawns react to the time that elapsed within this frame.
        self.commands.clear();
        self.spawning.handle(&self.events, &mut self.commands);
        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }

        // Fire while the cooldown snapshot is fresh from this tick.
        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting.handle(&towers, &enemies, &mut self.targets);
        self.commands.clear();
        self.combat.handle(&towers, &self.targets, &mut self.commands);
        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }

        if !self.game_over
            && self
                .events
                .iter()
                .any(|event| matches!(event, Event::PlayerDefeated))
        {
            self.game_over = true;
            self.ui.show("end_menu");
            log::info!(
                "player defeated after {} kills",
                query::player(&self.world).kills
            );
        }

        self.populate_scene(screen, signals.hover_hint, scene);
    }

    fn update_selection(&mut self, input: FrameInput) {
        if self.game_over {
            self.selection = SelectionState::default();
            self.hover = None;
            self.hover_on_track = false;
            return;
        }

        let grid = query::grid(&self.world);
        let cell = input.pointer.and_then(|pointer| {
            geometry::cell_under_pointer(
                pointer,
                Vec2::ZERO,
                self.cell_length,
                grid.columns(),
                grid.rows(),
            )
        });
        self.hover = cell;

        let Some(cell) = cell else {
            // Pointer outside the grid means no interaction this frame.
            self.hover_on_track = false;
            return;
        };

        let on_track = query::track_contains(&self.world, cell.position());
        self.hover_on_track = on_track;

        if input.clicked {
            if on_track {
                self.selection = SelectionState {
                    cell: None,
                    kind: SelectionKind::Track,
                };
            } else if self.selection.cell == Some(cell) {
                self.selection = SelectionState::default();
            } else {
                self.selection.cell = Some(cell);
            }
        }

        // Re-classify every frame; a tower may appear under the selection.
        self.selection.kind = match self.selection.cell {
            Some(selected) if query::tower_at(&self.world, selected).is_some() => {
                SelectionKind::Tower
            }
            Some(_) => SelectionKind::Grass,
            None if self.selection.kind == SelectionKind::Track => SelectionKind::Track,
            None => SelectionKind::None,
        };
    }

    fn populate_scene(&self, screen: Rect, hover_hint: Option<&'static str>, scene: &mut Scene) {
        let grid = query::grid(&self.world);
        scene.grid = GridPresentation::new(grid.columns(), grid.rows(), self.cell_length).ok();

        scene.ground.clear();
        for row in 0..grid.rows() {
            for column in 0..grid.columns() {
                let cell = CellCoord::new(column, row);
                let base = match grid.kind(cell) {
                    Some(CellKind::Track) => TileBase::Track,
                    _ => TileBase::Grass,
                };
                scene.ground.push(GroundTile {
                    cell,
                    base,
                    road: road_type(grid.neighbor_track_mask(cell)),
                });
            }
        }

        scene.towers.clear();
        for snapshot in query::tower_view(&self.world).iter() {
            scene.towers.push(SceneTower {
                id: snapshot.id,
                cell: snapshot.origin,
                level: snapshot.level,
                range: snapshot.range,
                selected: self.selection.cell == Some(snapshot.origin),
                hovered: self.hover == Some(snapshot.origin),
            });
        }

        scene.enemies.clear();
        for snapshot in query::enemy_view(&self.world).iter() {
            scene.enemies.push(SceneEnemy {
                position: snapshot.position,
                health_fraction: snapshot.health / snapshot.max_health.max(f32::EPSILON),
            });
        }

        scene.bullets.clear();
        scene.bullets.extend(
            query::bullet_snapshots(&self.world)
                .into_iter()
                .map(|bullet| SceneBullet {
                    position: bullet.position,
                }),
        );

        scene.selection = SelectionPresentation {
            selected: self.selection.cell,
            hover: self.hover,
            hover_on_track: self.hover_on_track,
        };

        let player = query::player(&self.world);
        scene.hud = HudPresentation {
            gold: player.gold,
            health: player.health,
            kills: player.kills,
            next_spawn_seconds: self.spawning.time_until_spawn().as_secs_f32(),
        };

        scene.hud_lines.clear();
        if let Some(hint) = hover_hint {
            scene.hud_lines.push(hint.to_owned());
        }

        scene.ui = self.ui.draw_ops(screen);
    }
}

fn build_ui() -> UiRegistry<PanelSignals> {
    let mut ui = UiRegistry::new();
    let button_size = SemiVec::from_value(Vec2::new(64.0, 64.0));

    let buy = ui.get_or_create("buy_tower");
    buy.style = Style {
        alignment: Alignment::TopRight,
        size: button_size,
        background: Background::Sprite {
            name: "add_tower".to_owned(),
        },
        ..Style::default()
    };
    buy.set_on_hover(|signals: &mut PanelSignals| {
        signals.hover_hint = Some("buy tower: 20 gold");
    });
    buy.set_on_click(|signals: &mut PanelSignals| signals.buy_tower = true);

    let boost = ui.get_or_create("add_range");
    boost.style = Style {
        alignment: Alignment::TopRight,
        size: button_size,
        margin: Margin {
            top: 74.0,
            ..Margin::default()
        },
        background: Background::Sprite {
            name: "add_range".to_owned(),
        },
        ..Style::default()
    };
    boost.set_on_hover(|signals: &mut PanelSignals| {
        signals.hover_hint = Some("boost range: 50 gold");
    });
    boost.set_on_click(|signals: &mut PanelSignals| signals.boost_range = true);

    let upgrade = ui.get_or_create("upgrade_tower");
    upgrade.style = Style {
        alignment: Alignment::TopRight,
        size: button_size,
        margin: Margin {
            top: 148.0,
            ..Margin::default()
        },
        background: Background::Sprite {
            name: "upgrade_tower".to_owned(),
        },
        ..Style::default()
    };
    upgrade.set_on_hover(|signals: &mut PanelSignals| {
        signals.hover_hint = Some("upgrade tower: 50 gold");
    });
    upgrade.set_on_click(|signals: &mut PanelSignals| signals.upgrade_tower = true);

    let info = ui.get_or_create("info");
    info.style = Style {
        alignment: Alignment::TopRight,
        size: SemiVec::from_fraction(Vec2::new(0.3, 1.0)),
        background: Background::Color(PANEL_BACKGROUND),
        ..Style::default()
    };

    let end_menu = ui.get_or_create("end_menu");
    end_menu.style = Style {
        alignment: Alignment::TopLeft,
        size: SemiVec::from_fraction(Vec2::new(1.0, 1.0)),
        background: Background::Color(END_MENU_BACKGROUND),
        text: Some("Game over".to_owned()),
        text_color: Color::WHITE,
        font_size: 40.0,
        ..Style::default()
    };

    ui.show("buy_tower");
    ui.show("add_range");
    ui.show("upgrade_tower");
    ui.show("info");

    ui
}
