//! Static content catalog: difficulty tiers, play modes, animals and weight pieces.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyId {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl DifficultyId {
    /// Tiers in play order, easiest first.
    pub const ORDER: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// The tier that follows this one, or `None` at the top of the ladder.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Easy => Some(Self::Medium),
            Self::Medium => Some(Self::Hard),
            Self::Hard => None,
        }
    }

    #[must_use]
    pub fn tier(self) -> &'static DifficultyTier {
        match self {
            Self::Easy => &DIFFICULTIES[0],
            Self::Medium => &DIFFICULTIES[1],
            Self::Hard => &DIFFICULTIES[2],
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }
}

impl fmt::Display for DifficultyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

/// A named configuration of attempts, timer length and score multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyTier {
    pub id: DifficultyId,
    pub label: &'static str,
    pub attempts: u32,
    pub multiplier: u32,
    /// Seconds per animal in timed sessions.
    pub time_limit: u32,
}

pub const DIFFICULTIES: [DifficultyTier; 3] = [
    DifficultyTier {
        id: DifficultyId::Easy,
        label: "Easy",
        attempts: 5,
        multiplier: 1,
        time_limit: 60,
    },
    DifficultyTier {
        id: DifficultyId::Medium,
        label: "Medium",
        attempts: 4,
        multiplier: 2,
        time_limit: 45,
    },
    DifficultyTier {
        id: DifficultyId::Hard,
        label: "Hard",
        attempts: 3,
        multiplier: 3,
        time_limit: 30,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModeId {
    /// Stack discrete weight pieces on a scale.
    #[default]
    Weights,
    /// Balance reference animals against the target.
    Animals,
    /// Type a numeric guess.
    Input,
}

impl ModeId {
    pub const ORDER: [Self; 3] = [Self::Weights, Self::Animals, Self::Input];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weights => "weights",
            Self::Animals => "animals",
            Self::Input => "input",
        }
    }

    #[must_use]
    pub fn settings(self) -> &'static Mode {
        match self {
            Self::Weights => &MODES[0],
            Self::Animals => &MODES[1],
            Self::Input => &MODES[2],
        }
    }

    /// Whether levels in this mode need reference animals on the rack.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(self, Self::Animals)
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weights" => Ok(Self::Weights),
            "animals" => Ok(Self::Animals),
            "input" => Ok(Self::Input),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    pub id: ModeId,
    pub name: &'static str,
    pub score_modifier: u32,
}

pub const MODES: [Mode; 3] = [
    Mode {
        id: ModeId::Weights,
        name: "Weight pieces",
        score_modifier: 1,
    },
    Mode {
        id: ModeId::Animals,
        name: "Animal comparison",
        score_modifier: 3,
    },
    Mode {
        id: ModeId::Input,
        name: "Typed weight",
        score_modifier: 5,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Animal {
    pub id: &'static str,
    pub name: &'static str,
    /// Body mass in kilograms.
    pub weight: u32,
    pub color: &'static str,
}

const fn animal(id: &'static str, name: &'static str, weight: u32, color: &'static str) -> Animal {
    Animal {
        id,
        name,
        weight,
        color,
    }
}

pub const ANIMALS: [Animal; 20] = [
    animal("lynx", "Lynx", 27, "#f08a5d"),
    animal("wolf", "Wolf", 45, "#b83b5e"),
    animal("fox", "Fox", 6, "#6a2c70"),
    animal("moose", "Moose", 408, "#355c7d"),
    animal("bear", "Brown bear", 185, "#f67280"),
    animal("boar", "Wild boar", 79, "#c06c84"),
    animal("eagle", "Sea eagle", 4, "#355c7d"),
    animal("owl", "Owl", 3, "#99b898"),
    animal("seal", "Seal", 82, "#2a363b"),
    animal("dolphin", "Dolphin", 175, "#00a8cc"),
    animal("camel", "Camel", 475, "#f8b400"),
    animal("elephant", "Elephant", 5300, "#6c5b7b"),
    animal("giraffe", "Giraffe", 1010, "#c06c84"),
    animal("kangaroo", "Kangaroo", 51, "#f67280"),
    animal("panda", "Panda", 100, "#355c7d"),
    animal("tiger", "Tiger", 195, "#ff847c"),
    animal("horse", "Horse", 520, "#2a9d8f"),
    animal("rhino", "Rhinoceros", 1900, "#e76f51"),
    animal("hippo", "Hippopotamus", 2113, "#264653"),
    animal("zebra", "Zebra", 242, "#118ab2"),
];

/// Look up an animal by its catalog id.
#[must_use]
pub fn animal_by_id(id: &str) -> Option<&'static Animal> {
    ANIMALS.iter().find(|animal| animal.id == id)
}

/// A weight-piece denomination and its supply on the rack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightPiece {
    /// Mass in kilograms.
    pub mass: u32,
    pub amount: u32,
    /// Base edge length for the presentation layer.
    pub visual_basis: u32,
}

const fn piece(mass: u32, amount: u32, visual_basis: u32) -> WeightPiece {
    WeightPiece {
        mass,
        amount,
        visual_basis,
    }
}

pub const WEIGHT_PIECES: [WeightPiece; 10] = [
    piece(1000, 5, 70),
    piece(500, 5, 60),
    piece(200, 5, 50),
    piece(100, 5, 40),
    piece(50, 5, 35),
    piece(20, 5, 30),
    piece(10, 5, 30),
    piece(5, 5, 30),
    piece(2, 5, 30),
    piece(1, 5, 30),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tiers_get_strictly_harder_in_order() {
        for pair in DifficultyId::ORDER.windows(2) {
            let (easier, harder) = (pair[0].tier(), pair[1].tier());
            assert!(easier.attempts > harder.attempts);
            assert!(easier.time_limit > harder.time_limit);
            assert!(easier.multiplier < harder.multiplier);
        }
    }

    #[test]
    fn tier_lookup_matches_id() {
        for id in DifficultyId::ORDER {
            assert_eq!(id.tier().id, id);
            assert_eq!(DifficultyId::from_index(id.index()), Some(id));
            assert_eq!(id.as_str().parse::<DifficultyId>(), Ok(id));
        }
        assert_eq!(DifficultyId::Hard.next(), None);
        assert_eq!(DifficultyId::Easy.next(), Some(DifficultyId::Medium));
        assert!(DifficultyId::Easy < DifficultyId::Hard);
    }

    #[test]
    fn mode_lookup_matches_id() {
        for id in ModeId::ORDER {
            assert_eq!(id.settings().id, id);
            assert_eq!(id.to_string().parse::<ModeId>(), Ok(id));
        }
        assert_eq!(ModeId::Input.settings().score_modifier, 5);
        assert!(ModeId::Animals.is_comparison());
        assert!("scale".parse::<ModeId>().is_err());
    }

    #[test]
    fn animal_ids_are_unique_and_weights_positive() {
        let ids: HashSet<&str> = ANIMALS.iter().map(|animal| animal.id).collect();
        assert_eq!(ids.len(), ANIMALS.len());
        assert!(ANIMALS.iter().all(|animal| animal.weight > 0));
        assert_eq!(animal_by_id("panda").map(|a| a.weight), Some(100));
        assert!(animal_by_id("dragon").is_none());
    }

    #[test]
    fn weight_pieces_descend_with_supply() {
        for pair in WEIGHT_PIECES.windows(2) {
            assert!(pair[0].mass > pair[1].mass);
        }
        assert!(WEIGHT_PIECES.iter().all(|piece| piece.amount > 0));
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&DifficultyId::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let mode: ModeId = serde_json::from_str("\"animals\"").unwrap();
        assert_eq!(mode, ModeId::Animals);
    }
}
