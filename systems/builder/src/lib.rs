#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns pointer input into tower placement, removal and
//! management commands.

use glam::Vec3;
use path_defence_core::{Command, Event, TowerId, TowerKind};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BuilderInput {
    /// Indicates whether the player clicked on this frame.
    pub confirm_action: bool,
    /// Indicates whether the player requested tower removal on this frame.
    pub remove_action: bool,
    /// World position under the cursor, if it is over the map.
    pub cursor: Option<Vec3>,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(confirm_action: bool, remove_action: bool, cursor: Option<Vec3>) -> Self {
        Self {
            confirm_action,
            remove_action,
            cursor,
        }
    }

    /// Click at the provided world position.
    #[must_use]
    pub const fn click(position: Vec3) -> Self {
        Self::new(true, false, Some(position))
    }
}

/// Tracks the tower type chosen for building and the tower being inspected.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    selected_kind: Option<TowerKind>,
    inspected: Option<TowerId>,
}

impl Builder {
    /// Creates a new builder system instance with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected_kind: None,
            inspected: None,
        }
    }

    /// Tower type that the next click will build.
    #[must_use]
    pub const fn selected_kind(&self) -> Option<TowerKind> {
        self.selected_kind
    }

    /// Tower currently selected for upgrade or sale.
    #[must_use]
    pub const fn inspected(&self) -> Option<TowerId> {
        self.inspected
    }

    /// Chooses the tower type to build, or clears the choice with `None`.
    pub fn select_tower_type(&mut self, kind: Option<TowerKind>) {
        self.selected_kind = kind;
        if kind.is_some() {
            self.inspected = None;
        }
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    ///
    /// The `tower_at` closure should mirror the semantics of the world's
    /// `query::tower_at` helper so the system can identify the clicked tower.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: BuilderInput,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(Vec3) -> Option<TowerId>,
    {
        for event in events {
            match event {
                Event::TowerPlaced => self.selected_kind = None,
                Event::TowerSold => self.inspected = None,
                Event::TowerRemoved { tower } if self.inspected == Some(*tower) => {
                    self.inspected = None;
                }
                _ => {}
            }
        }

        let Some(position) = input.cursor else {
            return;
        };

        if input.confirm_action {
            match self.selected_kind {
                Some(kind) => out.push(Command::PlaceTower { kind, position }),
                None => self.inspected = tower_at(position),
            }
        }

        if input.remove_action && tower_at(position).is_some() {
            out.push(Command::RemoveTower { position });
        }
    }

    /// Emits an upgrade for the inspected tower.
    pub fn upgrade_inspected(&self, out: &mut Vec<Command>) {
        if let Some(tower) = self.inspected {
            out.push(Command::UpgradeTower { tower });
        }
    }

    /// Emits a sale for the inspected tower.
    pub fn sell_inspected(&self, out: &mut Vec<Command>) {
        if let Some(tower) = self.inspected {
            out.push(Command::SellTower { tower });
        }
    }
}
