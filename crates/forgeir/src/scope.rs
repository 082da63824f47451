//! Scopes: the structural counterpart to `Context` (`spec.md` §4.7).
//!
//! Where a Context tracks *names*, a Scope tracks *structure*: which
//! Builders are reachable on entry to a lexical region and which are
//! reachable on exit from it. Scopes form a tree rooted at the
//! Compilation's root Scope, mirroring the Context tree one-for-one.

use crate::clone_map::IRCloneMap;
use crate::ids::{BuilderId, ScopeId};

pub struct Scope {
    id: ScopeId,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    entries: Vec<BuilderId>,
    exits: Vec<BuilderId>,
}

impl Scope {
    #[must_use]
    pub(crate) fn new(id: ScopeId, parent: Option<ScopeId>) -> Self {
        Self { id, parent, children: Vec::new(), entries: Vec::new(), exits: Vec::new() }
    }

    #[must_use]
    pub fn id(&self) -> ScopeId {
        self.id
    }

    #[must_use]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    #[must_use]
    pub fn entries(&self) -> &[BuilderId] {
        &self.entries
    }

    #[must_use]
    pub fn exits(&self) -> &[BuilderId] {
        &self.exits
    }

    pub(crate) fn add_child(&mut self, child: ScopeId) {
        self.children.push(child);
    }

    pub fn add_entry(&mut self, builder: BuilderId) {
        self.entries.push(builder);
    }

    pub fn add_exit(&mut self, builder: BuilderId) {
        self.exits.push(builder);
    }

    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.id = map.map_scope(self.id);
        self.parent = self.parent.map(|p| map.map_scope(p));
        for child in &mut self.children {
            *child = map.map_scope(*child);
        }
        for entry in &mut self.entries {
            *entry = map.map_builder(*entry);
        }
        for exit in &mut self.exits {
            *exit = map.map_builder(*exit);
        }
    }
}
