//! Naming Store
//!
//! The seam between the client-side context facade and whatever actually
//! holds the bindings. A remote transport implements [`NamingStore`]; the
//! facade only ever talks to this trait.

pub mod memory;

pub use memory::MemoryNamingStore;

use crate::context::Context;
use crate::error::StoreError;
use crate::name::Name;
use crate::object::{Binding, NameClassPair, NamingObject};
use std::sync::Arc;

/// Naming store interface
///
/// Names passed in are taken as given; the store resolves them from its own root.
pub trait NamingStore: Send + Sync {
    fn lookup(&self, name: &Name) -> Result<NamingObject, StoreError>;

    fn bind(&self, name: &Name, object: NamingObject) -> Result<(), StoreError>;

    fn rebind(&self, name: &Name, object: NamingObject) -> Result<(), StoreError>;

    fn unbind(&self, name: &Name) -> Result<(), StoreError>;

    fn rename(&self, old_name: &Name, new_name: &Name) -> Result<(), StoreError>;

    fn list(&self, name: &Name) -> Result<Vec<NameClassPair>, StoreError>;

    fn list_bindings(&self, name: &Name) -> Result<Vec<Binding>, StoreError>;

    /// Create a sub-context; the store decides what the returned context looks like.
    fn create_subcontext(&self, name: &Name) -> Result<Arc<dyn Context>, StoreError>;

    fn destroy_subcontext(&self, name: &Name) -> Result<(), StoreError>;

    /// Look up without following a terminal link
    fn lookup_link(&self, name: &Name) -> Result<NamingObject, StoreError>;

    /// Shut the store down. Called when the last lease on it is released.
    fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
