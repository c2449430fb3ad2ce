use crate::config::OptimizerSettings;
use crate::consts::SLOT_COUNT;
use crate::error::{MfResult, ModForgeError};
use crate::mods::{CharacterId, Mod, ModId};
use std::collections::HashMap;

/// Slot-indexed positions into the pool snapshot.
pub type SlotIndices = [Option<usize>; SLOT_COUNT];

/// Run-scoped snapshot of the mod pool.
///
/// Mods are stored sorted by id, so comparing indices compares ids. Only the
/// solver's commit step (and the up-front reservations it makes) changes
/// availability; nothing here touches the caller's data.
#[derive(Debug, Clone)]
pub struct ModPool {
    mods: Vec<Mod>,
    index: HashMap<ModId, usize>,
    available: Vec<bool>,
    owner: Vec<Option<CharacterId>>,
}

impl ModPool {
    /// Copies `mods`, applying the level/slice simulation settings.
    pub fn snapshot(mods: &[Mod], settings: &OptimizerSettings) -> MfResult<Self> {
        let mut snapshot: Vec<Mod> = mods
            .iter()
            .map(|m| {
                m.validate().map_err(ModForgeError::Validation)?;
                Ok(m.simulated(
                    settings.simulate_level_15_mods,
                    settings.simulate_6e_mod_slice,
                ))
            })
            .collect::<MfResult<_>>()?;
        snapshot.sort_by(|a, b| a.id.cmp(&b.id));

        let mut index = HashMap::with_capacity(snapshot.len());
        for (i, m) in snapshot.iter().enumerate() {
            if index.insert(m.id.clone(), i).is_some() {
                return Err(ModForgeError::Validation(format!(
                    "duplicate mod id '{}'",
                    m.id
                )));
            }
        }

        let available = snapshot.iter().map(|m| !m.locked).collect();
        let owner = vec![None; snapshot.len()];

        Ok(Self {
            mods: snapshot,
            index,
            available,
            owner,
        })
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, idx: usize) -> &Mod {
        &self.mods[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn available(&self) -> impl Iterator<Item = (usize, &Mod)> {
        self.mods
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.available[*i])
    }

    /// Locked mods equipped on `character`. These never move, so they fill their slot.
    pub fn pinned_for(&self, character: &str) -> SlotIndices {
        let mut pinned = [None; SLOT_COUNT];
        for (i, m) in self.mods.iter().enumerate() {
            if m.locked && m.assigned_to.as_deref() == Some(character) {
                pinned[m.slot.index()] = Some(i);
            }
        }
        pinned
    }

    /// What `character` wears right now, restricted to mods it could still keep.
    pub fn current_loadout(&self, character: &str) -> SlotIndices {
        let mut current = [None; SLOT_COUNT];
        for (i, m) in self.mods.iter().enumerate() {
            if m.assigned_to.as_deref() == Some(character) && self.can_take(i, character) {
                current[m.slot.index()] = Some(i);
            }
        }
        current
    }

    /// Everything `character` wears in the caller's data, regardless of availability.
    pub fn equipped_on(&self, character: &str) -> SlotIndices {
        let mut equipped = [None; SLOT_COUNT];
        for (i, m) in self.mods.iter().enumerate() {
            if m.assigned_to.as_deref() == Some(character) {
                equipped[m.slot.index()] = Some(i);
            }
        }
        equipped
    }

    fn can_take(&self, idx: usize, character: &str) -> bool {
        let m = &self.mods[idx];
        self.available[idx]
            || (m.locked
                && m.assigned_to.as_deref() == Some(character)
                && self.owner[idx].is_none())
    }

    /// Removes every mod equipped on `character` from availability without a search.
    /// Used for locked and unselected characters before the run starts.
    pub(crate) fn reserve_equipped(&mut self, character: &str) -> usize {
        let mut reserved = 0;
        for i in 0..self.mods.len() {
            if self.mods[i].assigned_to.as_deref() == Some(character) && self.owner[i].is_none() {
                self.available[i] = false;
                self.owner[i] = Some(character.to_string());
                reserved += 1;
            }
        }
        reserved
    }

    /// Hands `loadout` to `character`. Fails without changing anything if
    /// any mod is already committed elsewhere or unavailable.
    pub(crate) fn commit(&mut self, character: &str, loadout: &SlotIndices) -> MfResult<()> {
        for (slot, idx) in loadout.iter().enumerate() {
            let Some(idx) = *idx else { continue };
            if idx >= self.mods.len() || !self.can_take(idx, character) {
                return Err(ModForgeError::Validation(format!(
                    "mod '{}' is not available to '{}'",
                    self.mods.get(idx).map(|m| m.id.as_str()).unwrap_or("?"),
                    character
                )));
            }
            if self.mods[idx].slot.index() != slot {
                return Err(ModForgeError::Validation(format!(
                    "mod '{}' does not fit slot {}",
                    self.mods[idx].id, slot
                )));
            }
        }

        for idx in loadout.iter().flatten() {
            self.available[*idx] = false;
            self.owner[*idx] = Some(character.to_string());
        }
        Ok(())
    }
}
