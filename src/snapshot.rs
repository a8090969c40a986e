// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Node/Link Snapshot Store

//! Copy-on-write node/link snapshot.
//!
//! Readers take an `Arc<GraphSnapshot>` and keep a consistent view for as long
//! as they hold it. Every write builds a fresh snapshot and swaps the pointer,
//! so no reader ever observes a half-merged node.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::path_metrics::NodeLookup;
use crate::types::{Link, Node, PositionUpdate};

// ─── GraphSnapshot ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: HashMap<u32, Node>,
    pub links: Vec<Link>,
    /// Bumped on every committed write.
    pub version: u64,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id, n)).collect(),
            links,
            version: 0,
        }
    }

    pub fn enabled_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| l.enabled)
    }

    /// Apply position records by node id. Unknown ids are ignored.
    /// Returns how many nodes moved.
    pub fn apply_positions(&mut self, updates: &[PositionUpdate]) -> usize {
        let mut moved = 0;
        for update in updates {
            if let Some(node) = self.nodes.get_mut(&update.id) {
                node.lat = update.lat;
                node.lon = update.lon;
                if let Some(alt_km) = update.alt_km {
                    node.alt_m = Some(alt_km * 1000.0);
                }
                moved += 1;
            }
        }
        moved
    }
}

impl NodeLookup for GraphSnapshot {
    fn node(&self, id: u32) -> Option<&Node> {
        self.nodes.get(&id)
    }
}

// ─── SnapshotStore ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<GraphSnapshot>>,
}

impl SnapshotStore {
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self { current: RwLock::new(Arc::new(snapshot)) }
    }

    /// The latest committed snapshot.
    pub fn load(&self) -> Arc<GraphSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Build the next snapshot from the current one and publish it.
    fn update<T>(&self, f: impl FnOnce(&mut GraphSnapshot) -> T) -> T {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = GraphSnapshot::clone(&guard);
        let out = f(&mut next);
        next.version = guard.version + 1;
        *guard = Arc::new(next);
        out
    }

    pub fn replace_nodes(&self, nodes: Vec<Node>) {
        self.update(|s| s.nodes = nodes.into_iter().map(|n| (n.id, n)).collect());
    }

    pub fn replace_links(&self, links: Vec<Link>) {
        self.update(|s| s.links = links);
    }

    /// Swap in a whole new topology as one version.
    pub fn replace(&self, nodes: Vec<Node>, links: Vec<Link>) {
        self.update(|s| {
            s.nodes = nodes.into_iter().map(|n| (n.id, n)).collect();
            s.links = links;
        });
    }

    /// Flip the enabled flag on every link joining `u` and `v`.
    /// Returns false when no such link exists.
    pub fn set_link_enabled(&self, u: u32, v: u32, enabled: bool) -> bool {
        self.update(|s| {
            let mut found = false;
            for link in s.links.iter_mut().filter(|l| l.connects(u, v)) {
                link.enabled = enabled;
                found = true;
            }
            found
        })
    }

    pub fn merge_positions(&self, updates: &[PositionUpdate]) -> usize {
        self.update(|s| s.apply_positions(updates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;

    fn store() -> SnapshotStore {
        SnapshotStore::new(GraphSnapshot::new(
            vec![
                Node::new(1, NodeKind::Ground, 10.0, 10.0),
                Node::new(2, NodeKind::Air, 11.0, 11.0),
            ],
            vec![Link::new(1, 2)],
        ))
    }

    #[test]
    fn readers_keep_pre_merge_view() {
        let store = store();
        let before = store.load();
        let moved = store.merge_positions(&[PositionUpdate { id: 2, lat: 12.5, lon: 13.5, alt_km: Some(9.0) }]);
        assert_eq!(moved, 1);

        assert_eq!(before.nodes[&2].lat, 11.0);
        assert_eq!(before.version, 0);

        let after = store.load();
        let air = &after.nodes[&2];
        assert_eq!((air.lat, air.lon), (12.5, 13.5));
        assert_eq!(air.alt_m, Some(9_000.0));
        assert_eq!(after.version, 1);
    }

    #[test]
    fn unknown_position_ids_are_ignored() {
        let store = store();
        let moved = store.merge_positions(&[PositionUpdate { id: 77, lat: 0.0, lon: 0.0, alt_km: None }]);
        assert_eq!(moved, 0);
        assert_eq!(store.load().nodes.len(), 2);
    }

    #[test]
    fn toggling_links_either_direction() {
        let store = store();
        assert!(store.set_link_enabled(2, 1, false));
        assert_eq!(store.load().enabled_links().count(), 0);
        assert!(store.set_link_enabled(1, 2, true));
        assert_eq!(store.load().enabled_links().count(), 1);
        assert!(!store.set_link_enabled(1, 3, false));
    }

    #[test]
    fn replace_commits_nodes_and_links_together() {
        let store = store();
        let before = store.load();
        store.replace(
            vec![Node::new(7, NodeKind::Ground, 0.0, 0.0), Node::new(8, NodeKind::Sea, 0.0, 1.0)],
            vec![Link::new(7, 8)],
        );
        let after = store.load();
        assert_eq!(after.version, before.version + 1);
        assert!(after.node(1).is_none());
        assert!(after.links.iter().all(|l| l.connects(7, 8)));
        // the old view is untouched
        assert!(before.links[0].connects(1, 2));
    }

    #[test]
    fn replace_nodes_is_wholesale() {
        let store = store();
        store.replace_nodes(vec![Node::new(5, NodeKind::Sea, 0.0, 0.0)]);
        let snap = store.load();
        assert!(snap.node(1).is_none());
        assert!(snap.node(5).is_some());
    }
}
