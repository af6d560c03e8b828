//! Rack-and-scale placement model for the two scale modes.
//!
//! Weights mode racks the ten weight-piece denominations; comparison mode
//! racks copies of the level's reference animals. The total on the scale is the
//! player's guess.
use serde::Serialize;

use crate::adapters::{GuessExtractor, GuessRejection};
use crate::catalog::{ModeId, WEIGHT_PIECES, animal_by_id};
use crate::constants::COMPARISON_MAX_COPIES;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScaleError {
    #[error("Nothing called '{0}' on this rack")]
    UnknownItem(String),
    #[error("No '{0}' left on the rack")]
    SupplyExhausted(String),
    #[error("No '{0}' on the scale")]
    NotOnScale(String),
}

/// One rack position and how many of it sit on the scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RackSlot {
    pub key: String,
    pub label: String,
    /// Kilograms per item.
    pub mass: u32,
    pub supply: u32,
    pub placed: u32,
}

impl RackSlot {
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.supply - self.placed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScaleModel {
    slots: Vec<RackSlot>,
}

impl ScaleModel {
    /// Rack of weight pieces keyed by their mass.
    #[must_use]
    pub fn weights() -> Self {
        let slots = WEIGHT_PIECES
            .iter()
            .map(|piece| RackSlot {
                key: piece.mass.to_string(),
                label: format!("{} kg", piece.mass),
                mass: piece.mass,
                supply: piece.amount,
                placed: 0,
            })
            .collect();
        Self { slots }
    }

    /// Rack of reference animals keyed by animal id. Unknown ids are skipped.
    #[must_use]
    pub fn animals<I: AsRef<str>>(ids: &[I]) -> Self {
        let slots = ids
            .iter()
            .filter_map(|id| animal_by_id(id.as_ref()))
            .map(|animal| RackSlot {
                key: animal.id.to_string(),
                label: animal.name.to_string(),
                mass: animal.weight,
                supply: COMPARISON_MAX_COPIES,
                placed: 0,
            })
            .collect();
        Self { slots }
    }

    /// Rack for a play mode; typed input has none.
    #[must_use]
    pub fn for_mode<I: AsRef<str>>(mode: ModeId, weight_animals: &[I]) -> Option<Self> {
        match mode {
            ModeId::Weights => Some(Self::weights()),
            ModeId::Animals => Some(Self::animals(weight_animals)),
            ModeId::Input => None,
        }
    }

    fn slot_mut(&mut self, key: &str) -> Result<&mut RackSlot, ScaleError> {
        self.slots
            .iter_mut()
            .find(|slot| slot.key == key)
            .ok_or_else(|| ScaleError::UnknownItem(key.to_string()))
    }

    /// Move one item from the rack onto the scale, returning the new total.
    ///
    /// # Errors
    ///
    /// Fails for unknown keys and when the rack has none of that item left.
    pub fn place(&mut self, key: &str) -> Result<u32, ScaleError> {
        let slot = self.slot_mut(key)?;
        if slot.available() == 0 {
            return Err(ScaleError::SupplyExhausted(key.to_string()));
        }
        slot.placed += 1;
        Ok(self.total())
    }

    /// Move one item back to the rack, returning the new total.
    ///
    /// # Errors
    ///
    /// Fails for unknown keys and when none of that item is on the scale.
    pub fn remove(&mut self, key: &str) -> Result<u32, ScaleError> {
        let slot = self.slot_mut(key)?;
        if slot.placed == 0 {
            return Err(ScaleError::NotOnScale(key.to_string()));
        }
        slot.placed -= 1;
        Ok(self.total())
    }

    /// Return everything to the rack.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.placed = 0;
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.slots
            .iter()
            .map(|slot| slot.mass.saturating_mul(slot.placed))
            .fold(0, u32::saturating_add)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.placed == 0)
    }

    #[must_use]
    pub fn slots(&self) -> &[RackSlot] {
        &self.slots
    }
}

impl GuessExtractor for ScaleModel {
    fn extract_guess(&mut self) -> Result<f64, GuessRejection> {
        match self.total() {
            0 => Err(GuessRejection::NothingPlaced),
            total => Ok(f64::from(total)),
        }
    }

    fn clear(&mut self) {
        Self::clear(self);
    }
}
