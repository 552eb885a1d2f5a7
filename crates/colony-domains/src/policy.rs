use colony_types::DomainId;

use crate::error::DomainError;
use crate::tree::DomainTree;

/// Decides where new domains may be created.
///
/// Kept apart from [`DomainTree`] so the depth rule can change without
/// touching the tree itself.
pub trait DomainPolicy: Send + Sync {
    /// Human-readable name of this policy.
    fn name(&self) -> &str;

    /// Check that a new domain may be created under `parent`.
    fn check_parent(&self, tree: &DomainTree, parent: DomainId) -> Result<(), DomainError>;
}

/// Only the root domain may receive new subdomains.
#[derive(Clone, Copy, Debug, Default)]
pub struct RootChildrenOnly;

impl DomainPolicy for RootChildrenOnly {
    fn name(&self) -> &str {
        "root-children-only"
    }

    fn check_parent(&self, tree: &DomainTree, parent: DomainId) -> Result<(), DomainError> {
        tree.get(parent)?;
        if !parent.is_root() {
            return Err(DomainError::ParentNotRoot(parent));
        }
        Ok(())
    }
}

/// New domains may be created down to `max_depth` levels below the root.
#[derive(Clone, Copy, Debug)]
pub struct MaxDepth {
    pub max_depth: u32,
}

impl MaxDepth {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }
}

impl DomainPolicy for MaxDepth {
    fn name(&self) -> &str {
        "max-depth"
    }

    fn check_parent(&self, tree: &DomainTree, parent: DomainId) -> Result<(), DomainError> {
        let depth = tree.depth(parent).ok_or(DomainError::NotFound(parent))?;
        if depth + 1 > self.max_depth {
            return Err(DomainError::MaxDepthExceeded {
                parent,
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }
}
