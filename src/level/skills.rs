//! Skill kinds and per-level usage budgets.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An action the engine can assign to a lemming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Skill {
    /// Digs vertically down through diggable ground.
    Digger,
    /// Stands still and turns other lemmings around.
    Blocker,
    /// Lays a staircase of bricks.
    Builder,
    /// Tunnels horizontally.
    Basher,
    /// Tunnels diagonally downward.
    Miner,
    /// Survives any fall.
    Floater,
    /// Explodes, removing nearby terrain.
    Bomber,
}

impl Skill {
    /// Every skill, in canonical order.
    pub const ALL: [Skill; 7] = [
        Skill::Digger,
        Skill::Blocker,
        Skill::Builder,
        Skill::Basher,
        Skill::Miner,
        Skill::Floater,
        Skill::Bomber,
    ];

    /// Key used for this skill in the level table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Skill::Digger => "digger",
            Skill::Blocker => "blocker",
            Skill::Builder => "builder",
            Skill::Basher => "basher",
            Skill::Miner => "miner",
            Skill::Floater => "floater",
            Skill::Bomber => "bomber",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A skill key outside the closed skill set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSkill(pub String);

impl fmt::Display for UnknownSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown skill {:?}", self.0)
    }
}

impl std::error::Error for UnknownSkill {}

impl FromStr for Skill {
    type Err = UnknownSkill;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Skill::ALL
            .into_iter()
            .find(|skill| skill.as_str() == s)
            .ok_or_else(|| UnknownSkill(s.to_string()))
    }
}

/// How many times a skill may be used in one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillBudget {
    /// A fixed number of uses (possibly zero).
    Limited(u32),
    /// No limit.
    Unlimited,
}

impl SkillBudget {
    /// No uses.
    pub const NONE: SkillBudget = SkillBudget::Limited(0);

    /// At least one use is available.
    #[must_use]
    pub const fn is_available(self) -> bool {
        !matches!(self, SkillBudget::Limited(0))
    }

    /// Fixed number of uses, `None` when unlimited.
    #[must_use]
    pub const fn count(self) -> Option<u32> {
        match self {
            SkillBudget::Limited(n) => Some(n),
            SkillBudget::Unlimited => None,
        }
    }
}

impl Default for SkillBudget {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for SkillBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillBudget::Limited(n) => write!(f, "{n}"),
            SkillBudget::Unlimited => f.write_str("unlimited"),
        }
    }
}

impl Serialize for SkillBudget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SkillBudget::Limited(n) => serializer.serialize_u32(*n),
            SkillBudget::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

/// Skill budgets for one level. Skills not listed have no uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SkillSet {
    budgets: [SkillBudget; 7],
}

impl SkillSet {
    /// A set with no uses of any skill.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            budgets: [SkillBudget::NONE; 7],
        }
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, skill: Skill, budget: SkillBudget) -> Self {
        self.budgets[skill.index()] = budget;
        self
    }

    /// Budget for a skill; zero when the level does not list it.
    #[must_use]
    pub const fn get(&self, skill: Skill) -> SkillBudget {
        self.budgets[skill.index()]
    }

    /// Whether the skill has no usage limit.
    #[must_use]
    pub const fn is_unlimited(&self, skill: Skill) -> bool {
        matches!(self.get(skill), SkillBudget::Unlimited)
    }

    /// All seven skills and their budgets, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Skill, SkillBudget)> + '_ {
        Skill::ALL.into_iter().map(|skill| (skill, self.get(skill)))
    }

    /// Skills with at least one use.
    pub fn available(&self) -> impl Iterator<Item = (Skill, SkillBudget)> + '_ {
        self.iter().filter(|(_, budget)| budget.is_available())
    }
}
