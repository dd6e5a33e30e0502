//! Entity registry
//!
//! Records live in insertion order, which is also the tick iteration order.
//! Names are unique: inserting a record under an existing name replaces the
//! old record in the same slot, so a re-created gated NPC keeps its place in
//! the update order but gets a fresh [`EntityId`].

use crate::core::types::EntityId;
use crate::entity::Npc;
use ahash::AHashMap;

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    npcs: Vec<Npc>,
    index: AHashMap<String, usize>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by name; returns the slot
    pub fn insert(&mut self, npc: Npc) -> usize {
        if let Some(&slot) = self.index.get(&npc.name) {
            tracing::debug!(npc = %npc.name, slot, "replacing registry record");
            self.npcs[slot] = npc;
            slot
        } else {
            let slot = self.npcs.len();
            self.index.insert(npc.name.clone(), slot);
            self.npcs.push(npc);
            slot
        }
    }

    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Npc> {
        self.slot_of(name).map(|slot| &self.npcs[slot])
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut Npc> {
        self.slot_of(name).map(move |slot| &mut self.npcs[slot])
    }

    pub fn get(&self, slot: usize) -> Option<&Npc> {
        self.npcs.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Npc> {
        self.npcs.get_mut(slot)
    }

    /// Look up a record only if it is still the same instance
    pub fn get_instance_mut(&mut self, name: &str, id: EntityId) -> Option<&mut Npc> {
        self.by_name_mut(name).filter(|npc| npc.id == id)
    }

    /// Resolve a name to an active NPC
    pub fn active_by_name(&self, name: &str) -> Option<&Npc> {
        self.by_name(name).filter(|npc| npc.active)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.iter()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.iter().filter(|npc| npc.active)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Npc> {
        self.npcs.iter_mut()
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }
}
