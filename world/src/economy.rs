//! Gold ledger, home health and wave counter.

use plateau_defence_core::{
    EconomyRules, EconomySnapshot, InsufficientGold, PlayState, StructureKind,
};

#[derive(Clone, Debug)]
pub(crate) struct Ledger {
    gold: u32,
    health: u32,
    max_health: u32,
    wave: u32,
    play_state: PlayState,
}

impl Ledger {
    pub(crate) fn new(rules: &EconomyRules) -> Self {
        Self {
            gold: rules.starting_gold,
            health: rules.starting_health,
            max_health: rules.starting_health,
            wave: rules.starting_wave,
            play_state: PlayState::Running,
        }
    }

    pub(crate) fn gold(&self) -> u32 {
        self.gold
    }

    pub(crate) fn wave(&self) -> u32 {
        self.wave
    }

    pub(crate) fn is_over(&self) -> bool {
        self.play_state == PlayState::GameOver
    }

    /// Debits `cost`, leaving the balance untouched when it cannot be covered.
    pub(crate) fn spend(&mut self, cost: u32) -> Result<(), InsufficientGold> {
        match self.gold.checked_sub(cost) {
            Some(remaining) => {
                self.gold = remaining;
                Ok(())
            }
            None => Err(InsufficientGold {
                required: cost,
                available: self.gold,
            }),
        }
    }

    pub(crate) fn credit(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Removes home health. Returns `true` when this call ended the game.
    pub(crate) fn damage_base(&mut self, amount: u32) -> bool {
        if self.is_over() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.play_state = PlayState::GameOver;
            return true;
        }
        false
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    /// Moves to the next wave and grants the bonus. Returns the new wave.
    pub(crate) fn advance_wave(&mut self, bonus: u32) -> u32 {
        self.wave = self.wave.saturating_add(1);
        self.credit(bonus);
        self.wave
    }

    pub(crate) fn snapshot(&self, build_mode: Option<StructureKind>) -> EconomySnapshot {
        EconomySnapshot {
            gold: self.gold,
            health: self.health,
            max_health: self.max_health,
            wave: self.wave,
            build_mode,
            play_state: self.play_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_rejects_without_touching_balance() {
        let mut ledger = Ledger::new(&EconomyRules::default());
        assert_eq!(
            ledger.spend(501),
            Err(InsufficientGold {
                required: 501,
                available: 500
            })
        );
        assert_eq!(ledger.gold(), 500);
        assert_eq!(ledger.spend(500), Ok(()));
        assert_eq!(ledger.gold(), 0);
    }

    #[test]
    fn base_damage_ends_game_once() {
        let mut ledger = Ledger::new(&EconomyRules {
            starting_health: 2,
            ..EconomyRules::default()
        });
        assert!(!ledger.damage_base(1));
        assert!(ledger.damage_base(1));
        assert!(ledger.is_over());
        assert!(!ledger.damage_base(1));
        assert_eq!(ledger.health(), 0);
    }

    #[test]
    fn advancing_wave_grants_bonus() {
        let mut ledger = Ledger::new(&EconomyRules::default());
        assert_eq!(ledger.advance_wave(160), 2);
        assert_eq!(ledger.gold(), 660);
        assert_eq!(ledger.snapshot(None).wave, 2);
    }
}
