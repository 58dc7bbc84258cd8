use path_defence_core::DefenderSnapshot;

/// Health, money and score of the player.
#[derive(Clone, Debug)]
pub(crate) struct Defender {
    health: u32,
    money: u32,
    score: u64,
}

impl Defender {
    pub(crate) const fn new(health: u32, money: u32) -> Self {
        Self {
            health,
            money,
            score: 0,
        }
    }

    /// Deducts `amount` if affordable; leaves money untouched otherwise.
    pub(crate) fn spend(&mut self, amount: u32) -> bool {
        match self.money.checked_sub(amount) {
            Some(remaining) => {
                self.money = remaining;
                true
            }
            None => false,
        }
    }

    pub(crate) fn credit(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    pub(crate) fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Awards the money and score for a kill.
    pub(crate) fn reward_kill(&mut self, reward: u32) {
        self.credit(reward);
        self.add_score(u64::from(reward) * 2);
    }

    /// Subtracts health, flooring at zero. Returns `true` when health is exhausted.
    pub(crate) fn take_damage(&mut self, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        self.health == 0
    }

    pub(crate) const fn score(&self) -> u64 {
        self.score
    }

    pub(crate) const fn snapshot(&self) -> DefenderSnapshot {
        DefenderSnapshot {
            health: self.health,
            money: self.money,
            score: self.score,
        }
    }
}
