// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of codelens-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The display surface diagrams are mounted into.
//!
//! A surface owns exactly one live diagram container plus a flat "document body" where engines
//! may attach off-screen hosts and, occasionally, leave stray nodes behind. Every node carries an
//! element id so leftovers can be swept by id.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::model::RenderId;

/// Handle of an off-screen host attached to the surface body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(u64);

/// Where an engine inserts a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeParent {
    Body,
    Host(HostId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceNode {
    pub id: String,
    pub markup: String,
}

/// Matches element ids during sweeps.
pub type IdMatcher<'a> = &'a dyn Fn(&str) -> bool;

pub trait DiagramSurface {
    /// Empties the live container.
    fn clear_container(&mut self);

    /// Replaces the live container's content with `markup`, tagged with `id`.
    fn mount(&mut self, id: &RenderId, markup: &str);

    /// Content of the live container, if any.
    fn mounted(&self) -> Option<&SurfaceNode>;

    fn attach_offscreen_host(&mut self) -> HostId;

    /// Detaches a host together with everything inserted into it. Unknown hosts are ignored.
    fn detach_offscreen_host(&mut self, host: HostId);

    /// Inserts a node outside the live container. Inserting into a detached host is a no-op.
    fn insert_node(&mut self, parent: NodeParent, id: &str, markup: &str);

    /// Removes every node whose id matches, including the live container's content.
    fn remove_nodes(&mut self, matches: IdMatcher<'_>) -> usize;

    fn count_nodes(&self, matches: IdMatcher<'_>) -> usize;
}

/// Shared handle used by the single-threaded pipeline.
pub type SharedSurface = Rc<RefCell<dyn DiagramSurface>>;

/// In-process surface.
#[derive(Debug, Default)]
pub struct MemorySurface {
    container: Option<SurfaceNode>,
    body: Vec<SurfaceNode>,
    hosts: BTreeMap<HostId, Vec<SurfaceNode>>,
    next_host: u64,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn attached_hosts(&self) -> usize {
        self.hosts.len()
    }

    pub fn body_nodes(&self) -> &[SurfaceNode] {
        &self.body
    }

    pub fn container_markup(&self) -> Option<&str> {
        self.container.as_ref().map(|node| node.markup.as_str())
    }
}

impl DiagramSurface for MemorySurface {
    fn clear_container(&mut self) {
        self.container = None;
    }

    fn mount(&mut self, id: &RenderId, markup: &str) {
        self.container = Some(SurfaceNode { id: id.to_string(), markup: markup.to_owned() });
    }

    fn mounted(&self) -> Option<&SurfaceNode> {
        self.container.as_ref()
    }

    fn attach_offscreen_host(&mut self) -> HostId {
        self.next_host += 1;
        let host = HostId(self.next_host);
        self.hosts.insert(host, Vec::new());
        host
    }

    fn detach_offscreen_host(&mut self, host: HostId) {
        self.hosts.remove(&host);
    }

    fn insert_node(&mut self, parent: NodeParent, id: &str, markup: &str) {
        let node = SurfaceNode { id: id.to_owned(), markup: markup.to_owned() };
        match parent {
            NodeParent::Body => self.body.push(node),
            NodeParent::Host(host) => {
                if let Some(children) = self.hosts.get_mut(&host) {
                    children.push(node);
                }
            }
        }
    }

    fn remove_nodes(&mut self, matches: IdMatcher<'_>) -> usize {
        let mut removed = 0usize;

        if self.container.as_ref().is_some_and(|node| matches(&node.id)) {
            self.container = None;
            removed += 1;
        }

        let mut retain = |nodes: &mut Vec<SurfaceNode>| {
            let before = nodes.len();
            nodes.retain(|node| !matches(&node.id));
            removed += before - nodes.len();
        };
        retain(&mut self.body);
        for children in self.hosts.values_mut() {
            retain(children);
        }

        removed
    }

    fn count_nodes(&self, matches: IdMatcher<'_>) -> usize {
        let container = usize::from(self.container.as_ref().is_some_and(|node| matches(&node.id)));
        let body = self.body.iter().filter(|node| matches(&node.id)).count();
        let hosted = self.hosts.values().flatten().filter(|node| matches(&node.id)).count();
        container + body + hosted
    }
}
