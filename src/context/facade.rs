//! Remote context facade.
//!
//! Translates namespace operations into calls on a shared [`NamingStore`].
//! `lookup` and `bind` compose the caller's name onto this context's prefix;
//! every other operation hands the caller's name to the store as given.

use crate::context::close::{CloseTask, Lifecycle};
use crate::context::environment::Environment;
use crate::context::Context;
use crate::error::NamingError;
use crate::name::Name;
use crate::object::{Binding, NameClassPair, NamingObject};
use crate::store::NamingStore;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Client-side context over a remote naming store.
///
/// Dropping a context that was never closed discharges its close tasks with
/// `is_finalize = true`.
pub struct RemoteContext {
    prefix: Name,
    environment: Environment,
    store: Arc<dyn NamingStore>,
    lifecycle: Lifecycle,
}

impl RemoteContext {
    /// Root context (empty prefix) with no close tasks
    pub fn new(store: Arc<dyn NamingStore>, environment: Environment) -> Self {
        Self::builder(store).environment(environment).build()
    }

    pub fn builder(store: Arc<dyn NamingStore>) -> RemoteContextBuilder {
        RemoteContextBuilder {
            store,
            prefix: Name::empty(),
            environment: None,
            close_tasks: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &Name {
        &self.prefix
    }

    pub fn store(&self) -> &Arc<dyn NamingStore> {
        &self.store
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle.is_closed()
    }

    /// Close tasks registered and not yet discharged
    pub fn pending_close_tasks(&self) -> usize {
        self.lifecycle.pending()
    }

    /// Register a close task owned by this context only.
    ///
    /// If the context is already closed the task runs immediately with
    /// `is_finalize = false` and `false` is returned.
    pub fn add_close_task(&self, task: impl CloseTask + 'static) -> bool {
        self.lifecycle.register(Box::new(task), &self.label())
    }

    /// A fresh handle at the same position sharing store and environment,
    /// responsible for none of this context's cleanup.
    pub fn sibling(&self) -> RemoteContext {
        RemoteContext::builder(Arc::clone(&self.store))
            .prefix(self.prefix.clone())
            .environment(self.environment.clone())
            .build()
    }

    fn absolute_name(&self, name: &Name) -> Name {
        self.compose_name(name, &self.prefix)
    }

    fn label(&self) -> String {
        self.prefix.to_string()
    }
}

impl Context for RemoteContext {
    fn lookup(&self, name: &Name) -> Result<NamingObject, NamingError> {
        if name.is_empty() {
            trace!(prefix = %self.prefix, "lookup of empty name; handing out sibling context");
            return Ok(NamingObject::Context(Arc::new(self.sibling())));
        }
        let absolute = self.absolute_name(name);
        trace!(operation = "lookup", name = %name, absolute = %absolute);
        Ok(self.store.lookup(&absolute)?)
    }

    fn bind(&self, name: &Name, object: NamingObject) -> Result<(), NamingError> {
        let absolute = self.absolute_name(name);
        trace!(operation = "bind", name = %name, absolute = %absolute);
        Ok(self.store.bind(&absolute, object)?)
    }

    fn rebind(&self, name: &Name, object: NamingObject) -> Result<(), NamingError> {
        trace!(operation = "rebind", name = %name);
        Ok(self.store.rebind(name, object)?)
    }

    fn unbind(&self, name: &Name) -> Result<(), NamingError> {
        trace!(operation = "unbind", name = %name);
        Ok(self.store.unbind(name)?)
    }

    fn rename(&self, old_name: &Name, new_name: &Name) -> Result<(), NamingError> {
        trace!(operation = "rename", old_name = %old_name, new_name = %new_name);
        Ok(self.store.rename(old_name, new_name)?)
    }

    fn list(&self, name: &Name) -> Result<Vec<NameClassPair>, NamingError> {
        trace!(operation = "list", name = %name);
        Ok(self.store.list(name)?)
    }

    fn list_bindings(&self, name: &Name) -> Result<Vec<Binding>, NamingError> {
        trace!(operation = "list_bindings", name = %name);
        Ok(self.store.list_bindings(name)?)
    }

    fn create_subcontext(&self, name: &Name) -> Result<Arc<dyn Context>, NamingError> {
        trace!(operation = "create_subcontext", name = %name);
        Ok(self.store.create_subcontext(name)?)
    }

    fn destroy_subcontext(&self, name: &Name) -> Result<(), NamingError> {
        trace!(operation = "destroy_subcontext", name = %name);
        Ok(self.store.destroy_subcontext(name)?)
    }

    fn lookup_link(&self, name: &Name) -> Result<NamingObject, NamingError> {
        trace!(operation = "lookup_link", name = %name);
        Ok(self.store.lookup_link(name)?)
    }

    fn name_in_namespace(&self) -> String {
        self.prefix.to_string()
    }

    fn environment(&self) -> Environment {
        self.environment.clone()
    }

    fn close(&self) {
        self.lifecycle.discharge(false, &self.label());
    }
}

impl Drop for RemoteContext {
    fn drop(&mut self) {
        let label = self.label();
        self.lifecycle.discharge(true, &label);
    }
}

impl fmt::Debug for RemoteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteContext")
            .field("prefix", &self.prefix.to_string())
            .field("closed", &self.is_closed())
            .field("pending_close_tasks", &self.pending_close_tasks())
            .finish()
    }
}

/// Builder for [`RemoteContext`]
pub struct RemoteContextBuilder {
    store: Arc<dyn NamingStore>,
    prefix: Name,
    environment: Option<Environment>,
    close_tasks: Vec<Box<dyn CloseTask>>,
}

impl RemoteContextBuilder {
    pub fn prefix(mut self, prefix: Name) -> Self {
        self.prefix = prefix;
        self
    }

    /// Share an existing environment; a new empty one is used otherwise
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn close_task(mut self, task: impl CloseTask + 'static) -> Self {
        self.close_tasks.push(Box::new(task));
        self
    }

    pub fn boxed_close_task(mut self, task: Box<dyn CloseTask>) -> Self {
        self.close_tasks.push(task);
        self
    }

    pub fn build(self) -> RemoteContext {
        RemoteContext {
            prefix: self.prefix,
            environment: self.environment.unwrap_or_default(),
            store: self.store,
            lifecycle: Lifecycle::new(self.close_tasks),
        }
    }
}
