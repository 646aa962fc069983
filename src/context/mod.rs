//! Context domain: the namespace-operation contract, the remote context
//! facade, the shared environment, and the close lifecycle.

pub mod close;
pub mod environment;
pub mod facade;

pub use close::{CloseTask, LeakWarning, Lifecycle, StoreLease};
pub use environment::Environment;
pub use facade::{RemoteContext, RemoteContextBuilder};

use crate::error::NamingError;
use crate::name::Name;
use crate::object::{Binding, NameClassPair, NamingObject};
use serde_json::Value;
use std::sync::Arc;

/// A position in a hierarchical namespace and the operations offered there.
///
/// Each operation has a structured-name form and a `_str` form. The string
/// form parses with the composite-name grammar first; a malformed name fails
/// before anything is delegated.
pub trait Context: Send + Sync {
    fn lookup(&self, name: &Name) -> Result<NamingObject, NamingError>;

    fn bind(&self, name: &Name, object: NamingObject) -> Result<(), NamingError>;

    fn rebind(&self, name: &Name, object: NamingObject) -> Result<(), NamingError>;

    fn unbind(&self, name: &Name) -> Result<(), NamingError>;

    fn rename(&self, old_name: &Name, new_name: &Name) -> Result<(), NamingError>;

    fn list(&self, name: &Name) -> Result<Vec<NameClassPair>, NamingError>;

    fn list_bindings(&self, name: &Name) -> Result<Vec<Binding>, NamingError>;

    fn create_subcontext(&self, name: &Name) -> Result<Arc<dyn Context>, NamingError>;

    fn destroy_subcontext(&self, name: &Name) -> Result<(), NamingError>;

    fn lookup_link(&self, name: &Name) -> Result<NamingObject, NamingError>;

    /// String form of this context's absolute position
    fn name_in_namespace(&self) -> String;

    /// Handle to the environment shared with related contexts
    fn environment(&self) -> Environment;

    fn add_to_environment(&self, key: &str, value: Value) -> Option<Value> {
        self.environment().insert(key, value)
    }

    fn remove_from_environment(&self, key: &str) -> Option<Value> {
        self.environment().remove(key)
    }

    /// Discharge this context's close tasks. Repeated calls do nothing.
    fn close(&self);

    fn parse(&self, name: &str) -> Result<Name, NamingError> {
        Name::parse(name)
    }

    /// `prefix` followed by `name`
    fn compose_name(&self, name: &Name, prefix: &Name) -> Name {
        Name::compose(prefix, name)
    }

    fn compose_name_str(&self, name: &str, prefix: &str) -> Result<String, NamingError> {
        let name = self.parse(name)?;
        let prefix = self.parse(prefix)?;
        Ok(self.compose_name(&name, &prefix).to_string())
    }

    fn lookup_str(&self, name: &str) -> Result<NamingObject, NamingError> {
        self.lookup(&self.parse(name)?)
    }

    fn bind_str(&self, name: &str, object: NamingObject) -> Result<(), NamingError> {
        self.bind(&self.parse(name)?, object)
    }

    fn rebind_str(&self, name: &str, object: NamingObject) -> Result<(), NamingError> {
        self.rebind(&self.parse(name)?, object)
    }

    fn unbind_str(&self, name: &str) -> Result<(), NamingError> {
        self.unbind(&self.parse(name)?)
    }

    fn rename_str(&self, old_name: &str, new_name: &str) -> Result<(), NamingError> {
        let old_name = self.parse(old_name)?;
        let new_name = self.parse(new_name)?;
        self.rename(&old_name, &new_name)
    }

    fn list_str(&self, name: &str) -> Result<Vec<NameClassPair>, NamingError> {
        self.list(&self.parse(name)?)
    }

    fn list_bindings_str(&self, name: &str) -> Result<Vec<Binding>, NamingError> {
        self.list_bindings(&self.parse(name)?)
    }

    fn create_subcontext_str(&self, name: &str) -> Result<Arc<dyn Context>, NamingError> {
        self.create_subcontext(&self.parse(name)?)
    }

    fn destroy_subcontext_str(&self, name: &str) -> Result<(), NamingError> {
        self.destroy_subcontext(&self.parse(name)?)
    }

    fn lookup_link_str(&self, name: &str) -> Result<NamingObject, NamingError> {
        self.lookup_link(&self.parse(name)?)
    }
}
