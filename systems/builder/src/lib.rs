#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure builder system that turns latched panel intents into world commands.
//!
//! Button callbacks latch their intent for the frame; this system combines
//! the latches with the current cell selection and emits the matching
//! commands. Precondition failures that depend on world state (gold,
//! occupancy) are left to the world, which rejects them silently.

use track_defence_core::{CellCoord, Command, SelectionKind, TowerId};

/// Panel intents latched by UI callbacks during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// The buy-tower button was clicked this frame.
    pub buy_tower: bool,
    /// The upgrade button was clicked this frame.
    pub upgrade_tower: bool,
    /// The range-boost button was clicked this frame.
    pub boost_range: bool,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit flags.
    #[must_use]
    pub const fn new(buy_tower: bool, upgrade_tower: bool, boost_range: bool) -> Self {
        Self {
            buy_tower,
            upgrade_tower,
            boost_range,
        }
    }
}

/// Current cell selection as classified by the frame driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Selected cell, if any.
    pub cell: Option<CellCoord>,
    /// Classification of the selected cell.
    pub kind: SelectionKind,
}

/// Builder system that translates selection + intents into commands.
#[derive(Debug, Default)]
pub struct Builder;

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes latched intents and the current selection to emit commands.
    ///
    /// The `tower_at` closure should mirror the semantics of the world's
    /// `query::tower_at` helper so the system can resolve the selected tower.
    pub fn handle<F>(
        &mut self,
        input: BuilderInput,
        selection: SelectionState,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellCoord) -> Option<TowerId>,
    {
        let Some(cell) = selection.cell else {
            return;
        };

        if input.buy_tower && selection.kind == SelectionKind::Grass {
            out.push(Command::PlaceTower { origin: cell });
        }

        if input.upgrade_tower || input.boost_range {
            if let Some(tower) = tower_at(cell) {
                if input.upgrade_tower {
                    out.push(Command::UpgradeTower { tower });
                }
                if input.boost_range {
                    out.push(Command::BoostTowerRange { tower });
                }
            }
        }
    }
}
