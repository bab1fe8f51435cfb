//! Client registry: records, uniqueness, and the registration critical
//! section.
//!
//! The registry owns every [`ClientRecord`] for the life of the process.
//! Registration is one critical section under the registry's write lock:
//! the name-uniqueness check, identifier generation (with regeneration on
//! the negligible-probability collision), and insertion happen atomically,
//! so two racing registrations of the same name admit exactly one winner.
//!
//! Lookups take the read lock and hand out `Arc` handles; mailbox traffic
//! on a handle never touches the registry lock again.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use maildrop_proto::{ClientId, Credential};
use thiserror::Error;

use crate::{env::Environment, mailbox::Mailbox};

/// Errors from registry operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A record with this name already exists
    #[error("name already taken: {name:?}")]
    NameTaken {
        /// The contested display name
        name: String,
    },
}

/// One registered client.
///
/// `id`, `name`, and `credential` are immutable after insertion; only the
/// mailbox behind its own lock ever changes. There is no deregistration.
#[derive(Debug)]
pub struct ClientRecord {
    id: ClientId,
    name: String,
    credential: Credential,
    mailbox: Mailbox,
}

impl ClientRecord {
    /// The identifier assigned at registration
    #[must_use]
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// The display name registered under
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The credential stored verbatim at registration
    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// This record's pending-message queue
    #[must_use]
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }
}

/// The set of all registered clients.
///
/// Shared across every connection handler; cheap to clone handles out of.
/// `list_all` returns records in insertion order, as a snapshot taken at
/// call time.
pub struct ClientRegistry<E> {
    inner: RwLock<RegistryInner>,
    env: E,
}

#[derive(Default)]
struct RegistryInner {
    /// Records in insertion order (list snapshots)
    order: Vec<Arc<ClientRecord>>,
    /// Identifier index (lookups, collision checks)
    by_id: HashMap<ClientId, Arc<ClientRecord>>,
}

impl<E: Environment> ClientRegistry<E> {
    /// Create an empty registry drawing identifiers from `env`
    pub fn new(env: E) -> Self {
        Self { inner: RwLock::new(RegistryInner::default()), env }
    }

    /// Register a new client.
    ///
    /// Generates a fresh random identifier, regenerating until it is unused
    /// (a collision in the 128-bit space is vanishingly unlikely, but a
    /// stale duplicate would silently merge two mailboxes, so each
    /// candidate is checked).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NameTaken`] if a record with this exact
    /// name (case-sensitive byte match) already exists. The registry is
    /// unchanged in that case.
    pub fn register(
        &self,
        name: &str,
        credential: Credential,
    ) -> Result<Arc<ClientRecord>, RegistryError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if inner.order.iter().any(|record| record.name == name) {
            return Err(RegistryError::NameTaken { name: name.to_string() });
        }

        let mut id = self.env.client_id();
        while inner.by_id.contains_key(&id) {
            id = self.env.client_id();
        }

        let record = Arc::new(ClientRecord {
            id,
            name: name.to_string(),
            credential,
            mailbox: Mailbox::new(),
        });

        inner.order.push(Arc::clone(&record));
        inner.by_id.insert(id, Arc::clone(&record));

        tracing::info!(%id, name, total = inner.order.len(), "registered client");
        Ok(record)
    }

    /// Whether a record with this identifier exists
    #[must_use]
    pub fn exists(&self, id: ClientId) -> bool {
        self.read().by_id.contains_key(&id)
    }

    /// Look up a record by identifier
    #[must_use]
    pub fn find(&self, id: ClientId) -> Option<Arc<ClientRecord>> {
        self.read().by_id.get(&id).map(Arc::clone)
    }

    /// Snapshot of all records, in insertion order
    #[must_use]
    pub fn list_all(&self) -> Vec<Arc<ClientRecord>> {
        self.read().order.clone()
    }

    /// Number of registered clients
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    /// Whether no client has registered yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().order.is_empty()
    }

    /// The environment this registry draws identifiers from
    pub(crate) fn env(&self) -> &E {
        &self.env
    }

    // Writers only ever mutate after all checks pass, so a poisoned lock
    // still guards a consistent map.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E> std::fmt::Debug for ClientRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ClientRegistry").field("client_count", &inner.order.len()).finish()
    }
}
