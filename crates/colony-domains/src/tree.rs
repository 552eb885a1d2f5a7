use std::collections::{BTreeMap, HashMap};

use colony_types::{DomainId, FundingPotId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DomainError;

/// A domain record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    /// `None` only for the root domain.
    pub parent: Option<DomainId>,
    pub funding_pot: FundingPotId,
}

/// Owns every domain record of a colony.
///
/// Ids are assigned monotonically starting at the root (`1`). Besides direct
/// children, each domain keeps the flat list of all of its descendants in the
/// order they were created; that list is what child skill indexes address.
pub struct DomainTree {
    domains: BTreeMap<DomainId, Domain>,
    children: HashMap<DomainId, Vec<DomainId>>,
    descendants: HashMap<DomainId, Vec<DomainId>>,
    next_id: u64,
}

impl DomainTree {
    /// Create a tree holding only the root domain.
    pub fn new(root_pot: FundingPotId) -> Self {
        let root = Domain {
            id: DomainId::ROOT,
            parent: None,
            funding_pot: root_pot,
        };
        let mut domains = BTreeMap::new();
        domains.insert(DomainId::ROOT, root);

        Self {
            domains,
            children: HashMap::new(),
            descendants: HashMap::new(),
            next_id: DomainId::ROOT.0 + 1,
        }
    }

    /// The id the next inserted domain will receive.
    pub fn next_id(&self) -> DomainId {
        DomainId(self.next_id)
    }

    /// Insert a new domain below `parent`.
    ///
    /// Structural only: callers run their creation policy first.
    pub fn insert(
        &mut self,
        parent: DomainId,
        funding_pot: FundingPotId,
    ) -> Result<DomainId, DomainError> {
        if !self.contains(parent) {
            return Err(DomainError::NotFound(parent));
        }

        let id = DomainId(self.next_id);
        self.next_id += 1;

        self.children.entry(parent).or_default().push(id);
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            self.descendants.entry(current).or_default().push(id);
            ancestor = self.parent_of(current);
        }

        self.domains.insert(
            id,
            Domain {
                id,
                parent: Some(parent),
                funding_pot,
            },
        );

        debug!(domain = %id, parent = %parent, pot = %funding_pot, "Domain inserted");
        Ok(id)
    }

    pub fn get(&self, id: DomainId) -> Result<&Domain, DomainError> {
        self.domains.get(&id).ok_or(DomainError::NotFound(id))
    }

    pub fn contains(&self, id: DomainId) -> bool {
        self.domains.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Domain> {
        self.domains.values()
    }

    pub fn parent_of(&self, id: DomainId) -> Option<DomainId> {
        self.domains.get(&id).and_then(|d| d.parent)
    }

    pub fn children_of(&self, id: DomainId) -> &[DomainId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All descendants of `id`, in creation order.
    pub fn descendants_of(&self, id: DomainId) -> &[DomainId] {
        self.descendants.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a child skill index below `id`.
    pub fn descendant_at(&self, id: DomainId, index: usize) -> Option<DomainId> {
        self.descendants_of(id).get(index).copied()
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: DomainId) -> Vec<DomainId> {
        let mut out = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent_of(parent);
        }
        out
    }

    /// Depth of `id` in the tree; the root is at depth 0.
    pub fn depth(&self, id: DomainId) -> Option<u32> {
        if !self.contains(id) {
            return None;
        }
        Some(self.ancestors(id).len() as u32)
    }

    /// Number of levels `id` sits below `ancestor`, if it is below it at all.
    pub fn depth_below(&self, ancestor: DomainId, id: DomainId) -> Option<u32> {
        if !self.contains(id) || !self.contains(ancestor) {
            return None;
        }
        if ancestor == id {
            return Some(0);
        }
        self.ancestors(id)
            .iter()
            .position(|a| *a == ancestor)
            .map(|pos| pos as u32 + 1)
    }
}
