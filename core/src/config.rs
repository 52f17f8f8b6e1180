use crate::types::{LeagueId, Tokens};
use serde::{Deserialize, Serialize};

// ── Token rewards ──────────────────────────────────────────────────

/// Token values for every gameplay action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RewardConfig {
    /// Bonus on top of a mission's base reward the first time it is completed.
    pub mission_first_time: Tokens,
    pub first_investment: Tokens,
    pub high_risk_investment: Tokens,
    pub extreme_risk_investment: Tokens,
    /// Granted for experiencing a loss (mission or investment).
    pub loss_lesson: Tokens,
    /// Resilience bonus: investing again right after a loss.
    pub invest_after_loss: Tokens,
    pub new_asset_class: Tokens,
    pub new_risk_level: Tokens,
    pub coach_advice_viewed: Tokens,
    pub risk_preview_viewed: Tokens,
    pub quiz_correct: Tokens,
    pub quiz_perfect: Tokens,
    pub thesis_written: Tokens,
    pub referral_converted: Tokens,
    /// (minimum streak days, bonus) pairs, ascending by days.
    pub streak_bonuses: Vec<(u32, Tokens)>,
    /// How many ledger transactions a profile keeps.
    pub transaction_history: usize,
    /// How many applied event ids a profile remembers for dedup.
    pub dedup_window: usize,
}

impl RewardConfig {
    /// Bonus for claiming a streak of `days`. Zero for a zero-day streak.
    pub fn streak_bonus(&self, days: u32) -> Tokens {
        self.streak_bonuses
            .iter()
            .rev()
            .find(|(min_days, _)| days >= *min_days)
            .map(|(_, bonus)| *bonus)
            .unwrap_or(0)
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            mission_first_time: 50,
            first_investment: 50,
            high_risk_investment: 20,
            extreme_risk_investment: 25,
            loss_lesson: 30,
            invest_after_loss: 40,
            new_asset_class: 15,
            new_risk_level: 15,
            coach_advice_viewed: 10,
            risk_preview_viewed: 5,
            quiz_correct: 10,
            quiz_perfect: 50,
            thesis_written: 25,
            referral_converted: 200,
            streak_bonuses: vec![
                (1, 10),
                (3, 25),
                (5, 40),
                (7, 75),
                (14, 150),
                (21, 250),
                (30, 500),
            ],
            transaction_history: 50,
            dedup_window: 50,
        }
    }
}

// ── Levels ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelConfig {
    pub experience_per_level: Tokens,
    pub max_level: u32,
}

impl LevelConfig {
    /// Experience required to reach each level, index 0 = level 1.
    pub fn thresholds(&self) -> Vec<Tokens> {
        (0..self.max_level)
            .map(|i| Tokens::from(i) * self.experience_per_level)
            .collect()
    }

    pub fn level_for(&self, experience: Tokens) -> u32 {
        let reached = self
            .thresholds()
            .iter()
            .take_while(|threshold| experience >= **threshold)
            .count() as u32;
        reached.max(1)
    }

    pub fn experience_in_level(&self, experience: Tokens) -> Tokens {
        experience.max(0) % self.experience_per_level
    }

    pub fn experience_to_next_level(&self, experience: Tokens) -> Tokens {
        self.experience_per_level - self.experience_in_level(experience)
    }

    /// Progress through the current level, in percent.
    pub fn progress(&self, experience: Tokens) -> f64 {
        self.experience_in_level(experience) as f64 / self.experience_per_level as f64 * 100.0
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            experience_per_level: 1000,
            max_level: 50,
        }
    }
}

// ── Leagues ────────────────────────────────────────────────────────

/// One row of a league's end-of-season reward table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonReward {
    /// Inclusive rank range, e.g. (4, 10).
    pub ranks: (usize, usize),
    pub bonus: Tokens,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub special: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeagueTier {
    pub id: LeagueId,
    pub name: String,
    /// 1 = lowest tier.
    pub tier: u8,
    /// Score at which a player enters this tier.
    pub min_score: Tokens,
    /// Top N of a cohort promote at season end.
    pub promotion_slots: usize,
    /// Bottom N of a cohort relegate at season end. Zero for the bottom tier.
    pub relegation_slots: usize,
    pub cohort_size: usize,
    pub weekly_rewards: Vec<SeasonReward>,
}

impl LeagueTier {
    pub fn reward_for_rank(&self, rank: usize) -> Option<&SeasonReward> {
        self.weekly_rewards
            .iter()
            .find(|r| (r.ranks.0..=r.ranks.1).contains(&rank))
    }
}

fn reward(ranks: (usize, usize), bonus: Tokens, badge: Option<&str>, special: Option<&str>) -> SeasonReward {
    SeasonReward {
        ranks,
        bonus,
        badge: badge.map(str::to_string),
        special: special.map(str::to_string),
    }
}

pub fn default_leagues() -> Vec<LeagueTier> {
    vec![
        LeagueTier {
            id: "bronze".into(),
            name: "Bronze League".into(),
            tier: 1,
            min_score: 0,
            promotion_slots: 10,
            relegation_slots: 0,
            cohort_size: 30,
            weekly_rewards: vec![
                reward((1, 1), 100, Some("bronze_champion"), None),
                reward((2, 2), 75, None, None),
                reward((3, 3), 50, None, None),
                reward((4, 10), 25, None, None),
            ],
        },
        LeagueTier {
            id: "silver".into(),
            name: "Silver League".into(),
            tier: 2,
            min_score: 500,
            promotion_slots: 10,
            relegation_slots: 5,
            cohort_size: 30,
            weekly_rewards: vec![
                reward((1, 1), 200, Some("silver_champion"), None),
                reward((2, 2), 150, None, None),
                reward((3, 3), 100, None, None),
                reward((4, 10), 50, None, None),
            ],
        },
        LeagueTier {
            id: "gold".into(),
            name: "Gold League".into(),
            tier: 3,
            min_score: 1500,
            promotion_slots: 10,
            relegation_slots: 5,
            cohort_size: 30,
            weekly_rewards: vec![
                reward((1, 1), 400, Some("gold_champion"), None),
                reward((2, 2), 300, None, None),
                reward((3, 3), 200, None, None),
                reward((4, 10), 100, None, None),
            ],
        },
        LeagueTier {
            id: "platinum".into(),
            name: "Platinum League".into(),
            tier: 4,
            min_score: 3500,
            promotion_slots: 8,
            relegation_slots: 5,
            cohort_size: 30,
            weekly_rewards: vec![
                reward((1, 1), 750, Some("platinum_champion"), Some("exclusive_avatar")),
                reward((2, 2), 500, None, None),
                reward((3, 3), 350, None, None),
                reward((4, 8), 200, None, None),
            ],
        },
        LeagueTier {
            id: "diamond".into(),
            name: "Diamond League".into(),
            tier: 5,
            min_score: 7500,
            promotion_slots: 3,
            relegation_slots: 10,
            cohort_size: 30,
            weekly_rewards: vec![
                reward((1, 1), 1500, Some("diamond_champion"), Some("hall_of_fame")),
                reward((2, 2), 1000, Some("diamond_elite"), None),
                reward((3, 3), 750, Some("diamond_star"), None),
                reward((4, 10), 400, None, None),
            ],
        },
    ]
}

// ── Files on disk ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct RewardsFile {
    rewards: RewardConfig,
    levels: LevelConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct LeaguesFile {
    leagues: Vec<LeagueTier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub rewards: RewardConfig,
    pub levels: LevelConfig,
    /// Ordered lowest to highest tier.
    pub leagues: Vec<LeagueTier>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rewards: RewardConfig::default(),
            levels: LevelConfig::default(),
            leagues: default_leagues(),
        }
    }
}

impl GameConfig {
    /// Load from the data/ directory.
    /// In tests, use GameConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let rewards_path = format!("{data_dir}/rewards.json");
        let rewards_content = std::fs::read_to_string(&rewards_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {rewards_path}: {e}"))?;
        let rewards_file: RewardsFile = serde_json::from_str(&rewards_content)?;

        let leagues_path = format!("{data_dir}/leagues.json");
        let leagues_content = std::fs::read_to_string(&leagues_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {leagues_path}: {e}"))?;
        let leagues_file: LeaguesFile = serde_json::from_str(&leagues_content)?;

        let config = Self {
            rewards: rewards_file.rewards,
            levels: rewards_file.levels,
            leagues: leagues_file.leagues,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject tables the league and level math cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.leagues.is_empty() {
            anyhow::bail!("league table is empty");
        }
        if self.leagues[0].min_score != 0 {
            anyhow::bail!(
                "lowest league '{}' must start at score 0",
                self.leagues[0].id
            );
        }
        for pair in self.leagues.windows(2) {
            if pair[1].min_score <= pair[0].min_score {
                anyhow::bail!(
                    "league '{}' must require more than '{}'",
                    pair[1].id,
                    pair[0].id
                );
            }
        }
        for league in &self.leagues {
            if league.cohort_size < 2 {
                anyhow::bail!("league '{}' needs a cohort of at least 2", league.id);
            }
            if league.promotion_slots + league.relegation_slots > league.cohort_size {
                anyhow::bail!("league '{}' has more zone slots than players", league.id);
            }
        }
        if self.levels.experience_per_level <= 0 || self.levels.max_level == 0 {
            anyhow::bail!("level table must have a positive step and at least one level");
        }
        Ok(())
    }

    pub fn league(&self, id: &str) -> Option<&LeagueTier> {
        self.leagues.iter().find(|l| l.id == id)
    }
}
