//! Per-screen world persistence for the session
//!
//! Two maps keyed by `"x,y"`: screens cleared for good, and rosters of live
//! enemies paused on screens the player walked away from. A key is never in
//! both. Nothing here touches durable storage; `to_json` exists for
//! debugging dumps.

use std::collections::{BTreeMap, BTreeSet};

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::enemy::Behavior;
use super::world::{Zone, screen_key};
use crate::variation::Rgb;

/// Everything needed to bring an enemy back on a later visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub xp_value: u32,
    #[serde(rename = "type")]
    pub behavior: Behavior,
    pub zone: Zone,
    pub width: f32,
    pub height: f32,
    pub color: Rgb,
}

/// Session-scoped store of screen outcomes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldPersistenceStore {
    cleared: BTreeSet<String>,
    saved: BTreeMap<String, Vec<ActorSnapshot>>,
}

impl WorldPersistenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cleared(&self, screen: IVec2) -> bool {
        self.cleared.contains(&screen_key(screen))
    }

    pub fn has_roster(&self, screen: IVec2) -> bool {
        self.saved.contains_key(&screen_key(screen))
    }

    /// Mark a screen permanently cleared, dropping any saved roster
    pub fn mark_cleared(&mut self, screen: IVec2) {
        let key = screen_key(screen);
        if self.saved.remove(&key).is_some() {
            log::debug!("Dropped saved roster for cleared screen {}", key);
        }
        self.cleared.insert(key);
    }

    /// Save the live enemies of a screen. An empty roster marks the screen
    /// cleared instead; a cleared screen never takes a roster.
    pub fn save_roster(&mut self, screen: IVec2, roster: Vec<ActorSnapshot>) {
        if roster.is_empty() {
            self.mark_cleared(screen);
            return;
        }
        let key = screen_key(screen);
        if self.cleared.contains(&key) {
            log::warn!("Refusing to save {} enemies on cleared screen {}", roster.len(), key);
            return;
        }
        log::debug!("Saved {} enemies for screen {}", roster.len(), key);
        self.saved.insert(key, roster);
    }

    /// Remove and return a screen's saved roster
    pub fn take_roster(&mut self, screen: IVec2) -> Option<Vec<ActorSnapshot>> {
        self.saved.remove(&screen_key(screen))
    }

    pub fn roster(&self, screen: IVec2) -> Option<&[ActorSnapshot]> {
        self.saved.get(&screen_key(screen)).map(Vec::as_slice)
    }

    pub fn cleared_count(&self) -> usize {
        self.cleared.len()
    }

    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }

    /// Pretty JSON dump of both maps
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(x: f32) -> ActorSnapshot {
        ActorSnapshot {
            x,
            y: 10.0,
            health: 12.0,
            max_health: 30.0,
            damage: 10.0,
            xp_value: 10,
            behavior: Behavior::Wanderer,
            zone: Zone::Forest,
            width: 28.0,
            height: 28.0,
            color: Rgb::new(1, 2, 3),
        }
    }

    #[test]
    fn test_save_and_take() {
        let mut store = WorldPersistenceStore::new();
        let s = IVec2::new(2, 3);
        store.save_roster(s, vec![snap(1.0), snap(2.0)]);
        assert!(store.has_roster(s));
        assert!(!store.is_cleared(s));

        let roster = store.take_roster(s).unwrap_or_default();
        assert_eq!(roster.len(), 2);
        assert!(!store.has_roster(s));
    }

    #[test]
    fn test_clear_removes_roster() {
        let mut store = WorldPersistenceStore::new();
        let s = IVec2::new(1, 1);
        store.save_roster(s, vec![snap(1.0)]);
        store.mark_cleared(s);
        assert!(store.is_cleared(s));
        assert!(!store.has_roster(s));
    }

    #[test]
    fn test_cleared_screen_rejects_roster() {
        let mut store = WorldPersistenceStore::new();
        let s = IVec2::new(4, 4);
        store.mark_cleared(s);
        store.save_roster(s, vec![snap(1.0)]);
        assert!(!store.has_roster(s));
        assert_eq!(store.saved_count(), 0);
    }

    #[test]
    fn test_empty_roster_marks_cleared() {
        let mut store = WorldPersistenceStore::new();
        store.save_roster(IVec2::new(0, 0), Vec::new());
        assert!(store.is_cleared(IVec2::new(0, 0)));
    }

    #[test]
    fn test_json_layout() {
        let mut store = WorldPersistenceStore::new();
        store.save_roster(IVec2::new(5, 6), vec![snap(1.0)]);
        store.mark_cleared(IVec2::new(1, 2));
        let json = store.to_json().unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(value["cleared"][0], "1,2");
        assert_eq!(value["saved"]["5,6"][0]["type"], "Wanderer");
        assert_eq!(value["saved"]["5,6"][0]["health"], 12.0);
    }
}
