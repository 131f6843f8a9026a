//! JSON-file-backed key-value store.
//!
//! String keys, string values, last-write-wins, the whole map rewritten on
//! every set. Keys in use: the last-loaded sheet link, a per-sheet visited
//! map, and the recent-plans list.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::plan::RecentPlan;

const LAST_URL_KEY: &str = "travel_sheet_url";
const PLANS_KEY: &str = "travel_saved_plans";
const MAX_RECENT_PLANS: usize = 10;

fn visited_key(url: &str) -> String {
    format!("visited_{url}")
}

pub struct Store {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("corrupt store file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading store file {}", path.display()))
            }
        };
        Ok(Store { path, entries })
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("writing store file {}", self.path.display()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    pub fn last_url(&self) -> Option<&str> {
        self.get(LAST_URL_KEY)
    }

    pub fn set_last_url(&mut self, url: &str) -> Result<()> {
        self.set(LAST_URL_KEY, url.to_string())
    }

    pub fn clear_last_url(&mut self) -> Result<()> {
        self.remove(LAST_URL_KEY)
    }

    /// Visited flags for one sheet, keyed by stop id.
    pub fn visited(&self, url: &str) -> BTreeMap<usize, bool> {
        self.get(&visited_key(url))
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// Flips the visited flag for one stop and returns the new value.
    pub fn toggle_visited(&mut self, url: &str, id: usize) -> Result<bool> {
        let mut map = self.visited(url);
        let flag = !map.get(&id).copied().unwrap_or(false);
        map.insert(id, flag);
        self.set(&visited_key(url), serde_json::to_string(&map)?)?;
        Ok(flag)
    }

    pub fn recent_plans(&self) -> Vec<RecentPlan> {
        self.get(PLANS_KEY)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// Upserts a plan into the recent list. An existing entry is updated in
    /// place, a new one goes to the front; the list is capped at 10.
    pub fn record_plan(&mut self, plan: RecentPlan) -> Result<()> {
        let mut plans = self.recent_plans();
        match plans.iter_mut().find(|p| p.url == plan.url) {
            Some(existing) => *existing = plan,
            None => plans.insert(0, plan),
        }
        plans.truncate(MAX_RECENT_PLANS);
        self.set(PLANS_KEY, serde_json::to_string(&plans)?)
    }

    /// Drops a plan from the recent list along with its visited map.
    pub fn remove_plan(&mut self, url: &str) -> Result<()> {
        let plans: Vec<RecentPlan> = self
            .recent_plans()
            .into_iter()
            .filter(|p| p.url != url)
            .collect();
        self.set(PLANS_KEY, serde_json::to_string(&plans)?)?;
        self.remove(&visited_key(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn plan(url: &str, name: &str) -> RecentPlan {
        RecentPlan {
            url: url.to_string(),
            name: name.to_string(),
            location_count: 3,
            last_opened: Utc::now(),
        }
    }

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("store.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn values_survive_a_reopen() {
        let (dir, mut store) = temp_store();
        store.set_last_url("https://docs.google.com/spreadsheets/d/x/edit").unwrap();

        let reopened = Store::open(dir.path().join("store.json")).unwrap();
        assert_eq!(
            reopened.last_url(),
            Some("https://docs.google.com/spreadsheets/d/x/edit")
        );
    }

    #[test]
    fn visited_flags_toggle_per_sheet() {
        let (_dir, mut store) = temp_store();
        assert!(store.toggle_visited("sheet-a", 2).unwrap());
        assert!(!store.toggle_visited("sheet-a", 2).unwrap());
        assert!(store.toggle_visited("sheet-a", 2).unwrap());

        // Other sheets are unaffected.
        assert!(store.visited("sheet-b").is_empty());
        assert_eq!(store.visited("sheet-a").get(&2), Some(&true));
    }

    #[test]
    fn recent_plans_upsert_and_cap_at_ten() {
        let (_dir, mut store) = temp_store();
        for i in 0..12 {
            store.record_plan(plan(&format!("url-{i}"), &format!("Trip {i}"))).unwrap();
        }
        let plans = store.recent_plans();
        assert_eq!(plans.len(), 10);
        // Newest first, oldest two evicted.
        assert_eq!(plans[0].url, "url-11");
        assert!(!plans.iter().any(|p| p.url == "url-0" || p.url == "url-1"));

        // Updating an existing plan keeps its position.
        store.record_plan(plan("url-10", "Renamed")).unwrap();
        let plans = store.recent_plans();
        assert_eq!(plans[1].url, "url-10");
        assert_eq!(plans[1].name, "Renamed");
    }

    #[test]
    fn removing_a_plan_drops_its_visited_map() {
        let (_dir, mut store) = temp_store();
        store.record_plan(plan("url-a", "A")).unwrap();
        store.toggle_visited("url-a", 1).unwrap();

        store.remove_plan("url-a").unwrap();
        assert!(store.recent_plans().is_empty());
        assert!(store.visited("url-a").is_empty());
    }
}
