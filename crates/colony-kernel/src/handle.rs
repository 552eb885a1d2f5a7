use std::sync::{Arc, RwLock};

use crate::colony::Colony;
use crate::error::ColonyError;

/// Shared, thread-safe access to a [`Colony`].
///
/// Writers are totally ordered by the lock, so no two privileged operations
/// ever interleave.
#[derive(Clone)]
pub struct ColonyHandle {
    inner: Arc<RwLock<Colony>>,
}

impl ColonyHandle {
    pub fn new(colony: Colony) -> Self {
        Self {
            inner: Arc::new(RwLock::new(colony)),
        }
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&Colony) -> R) -> Result<R, ColonyError> {
        let guard = self.inner.read().map_err(|_| ColonyError::LockPoisoned)?;
        Ok(f(&guard))
    }

    /// Run `f` with exclusive access.
    pub fn write<R>(
        &self,
        f: impl FnOnce(&mut Colony) -> Result<R, ColonyError>,
    ) -> Result<R, ColonyError> {
        let mut guard = self.inner.write().map_err(|_| ColonyError::LockPoisoned)?;
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::Collaborators;
    use crate::config::ColonyConfig;
    use colony_authority::Scope;
    use colony_types::{ActorId, DomainId};

    #[test]
    fn writes_are_visible_to_readers() {
        let founder = ActorId::from_label("founder");
        let colony =
            Colony::new(&ColonyConfig::default(), founder, Collaborators::in_memory()).unwrap();
        let handle = ColonyHandle::new(colony);

        let domain = handle
            .write(|c| c.add_domain(&founder, Scope::root(), DomainId::ROOT))
            .unwrap();
        assert_eq!(domain, DomainId(2));
        assert_eq!(handle.read(|c| c.domain_count()).unwrap(), 2);
    }

    #[test]
    fn poisoned_lock_is_an_error() {
        let founder = ActorId::from_label("founder");
        let colony =
            Colony::new(&ColonyConfig::default(), founder, Collaborators::in_memory()).unwrap();
        let handle = ColonyHandle::new(colony);

        let poisoner = handle.clone();
        let _ = std::thread::spawn(move || {
            let _ = poisoner.write(|_| -> Result<(), ColonyError> { panic!("writer panicked") });
        })
        .join();

        let err = handle.read(|c| c.domain_count()).unwrap_err();
        assert_eq!(err.reason(), "internal");
    }
}
