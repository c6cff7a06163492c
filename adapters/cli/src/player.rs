//! Scripted player pressing buttons on behalf of a human.

use netbattle_core::{BattlePhase, BattleSnapshot};
use netbattle_session::Button;

/// Frames between two uses of queued chips.
const CHIP_USE_INTERVAL: u32 = 45;

/// Opens the custom screen whenever the gauge fills, selects chips from the
/// left of the hand, and fires queued chips at a steady pace.
#[derive(Debug, Default)]
pub(crate) struct ScriptedPlayer {
    frames_since_chip: u32,
}

impl ScriptedPlayer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Buttons to press this frame given the current battle state.
    pub(crate) fn buttons(
        &mut self,
        snapshot: &BattleSnapshot,
        selection_limit: usize,
    ) -> Vec<Button> {
        match snapshot.phase {
            BattlePhase::Battle if snapshot.gauge_full() => vec![Button::Confirm],
            BattlePhase::Battle if !snapshot.chip_queue.is_empty() => {
                self.frames_since_chip += 1;
                if self.frames_since_chip < CHIP_USE_INTERVAL {
                    return Vec::new();
                }
                self.frames_since_chip = 0;
                vec![Button::Cancel]
            }
            BattlePhase::Custom => {
                let hand = snapshot
                    .custom
                    .as_ref()
                    .map_or(0, |custom| custom.hand.len());
                let mut buttons = Vec::new();
                for slot in 0..hand.min(selection_limit) {
                    if slot > 0 {
                        buttons.push(Button::Right);
                    }
                    buttons.push(Button::Confirm);
                }
                buttons.push(Button::Start);
                buttons
            }
            BattlePhase::Intro | BattlePhase::Battle | BattlePhase::Win | BattlePhase::Lose => {
                Vec::new()
            }
        }
    }
}
