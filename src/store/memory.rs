//! In-process naming store.
//!
//! Keeps the whole namespace in one ordered map keyed by absolute name. Used
//! by embedders that want a local namespace and by tests standing in for a
//! remote server.

use crate::context::{Context, RemoteContext};
use crate::error::StoreError;
use crate::name::Name;
use crate::object::{Binding, NameClassPair, NamingObject};
use crate::store::NamingStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Maximum link hops followed by `lookup`
pub const MAX_LINK_HOPS: usize = 8;

#[derive(Debug, Clone)]
enum Entry {
    Context,
    Bound(NamingObject),
}

/// Naming store backed by an in-memory ordered map
pub struct MemoryNamingStore {
    entries: RwLock<BTreeMap<Name, Entry>>,
    closed: AtomicBool,
    this: Weak<MemoryNamingStore>,
}

impl MemoryNamingStore {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            entries: RwLock::new(BTreeMap::new()),
            closed: AtomicBool::new(false),
            this: this.clone(),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of bindings (objects and contexts) below the root
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Communication("store closed".to_string()));
        }
        Ok(())
    }

    fn context_at(&self, name: &Name) -> Result<Arc<dyn Context>, StoreError> {
        let store: Arc<dyn NamingStore> = self
            .this
            .upgrade()
            .ok_or_else(|| StoreError::Communication("store dropped".to_string()))?;
        Ok(Arc::new(
            RemoteContext::builder(store).prefix(name.clone()).build(),
        ))
    }

    fn object_for(&self, name: &Name, entry: &Entry) -> Result<NamingObject, StoreError> {
        match entry {
            Entry::Context => Ok(NamingObject::Context(self.context_at(name)?)),
            Entry::Bound(object) => Ok(object.clone()),
        }
    }
}

fn require_non_empty(name: &Name) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidName(
            "operation requires a non-empty name".to_string(),
        ));
    }
    Ok(())
}

/// Every proper prefix of `name` must be a bound context.
fn check_parents(entries: &BTreeMap<Name, Entry>, name: &Name) -> Result<(), StoreError> {
    for depth in 1..name.len() {
        let parent = name.prefix(depth);
        match entries.get(&parent) {
            Some(Entry::Context) => {}
            Some(Entry::Bound(_)) => return Err(StoreError::NotContext(parent)),
            None => return Err(StoreError::NameNotFound(parent)),
        }
    }
    Ok(())
}

/// `name` must denote a context; the empty name is the root.
fn check_context(entries: &BTreeMap<Name, Entry>, name: &Name) -> Result<(), StoreError> {
    if name.is_empty() {
        return Ok(());
    }
    check_parents(entries, name)?;
    match entries.get(name) {
        Some(Entry::Context) => Ok(()),
        Some(Entry::Bound(_)) => Err(StoreError::NotContext(name.clone())),
        None => Err(StoreError::NameNotFound(name.clone())),
    }
}

fn has_children(entries: &BTreeMap<Name, Entry>, name: &Name) -> bool {
    entries
        .range(name.clone()..)
        .nth(1)
        .map(|(key, _)| key.starts_with(name))
        .unwrap_or(false)
}

fn children<'a>(
    entries: &'a BTreeMap<Name, Entry>,
    name: &'a Name,
) -> impl Iterator<Item = (&'a Name, &'a Entry)> + 'a {
    entries
        .range(name.clone()..)
        .take_while(move |(key, _)| key.starts_with(name))
        .filter(move |(key, _)| key.len() == name.len() + 1)
}

/// Remove `name` and, if it is a context, everything beneath it.
///
/// Removed entries are handed back so callers can drop them after releasing
/// the lock; a bound context handle may run close tasks when dropped.
fn remove_subtree(entries: &mut BTreeMap<Name, Entry>, name: &Name) -> Vec<Entry> {
    let doomed: Vec<Name> = entries
        .range(name.clone()..)
        .take_while(|(key, _)| key.starts_with(name))
        .map(|(key, _)| key.clone())
        .collect();
    doomed
        .into_iter()
        .filter_map(|key| entries.remove(&key))
        .collect()
}

impl NamingStore for MemoryNamingStore {
    fn lookup(&self, name: &Name) -> Result<NamingObject, StoreError> {
        self.ensure_open()?;
        if name.is_empty() {
            return self.context_at(name).map(NamingObject::Context);
        }

        let entries = self.entries.read();
        let mut current = name.clone();
        for _ in 0..=MAX_LINK_HOPS {
            check_parents(&entries, &current)?;
            match entries.get(&current) {
                None => return Err(StoreError::NameNotFound(current)),
                Some(Entry::Bound(NamingObject::Link(target))) => {
                    if target.is_empty() {
                        return self.context_at(target).map(NamingObject::Context);
                    }
                    current = target.clone();
                }
                Some(entry) => return self.object_for(&current, entry),
            }
        }
        Err(StoreError::LinkLoop(name.clone()))
    }

    fn bind(&self, name: &Name, object: NamingObject) -> Result<(), StoreError> {
        self.ensure_open()?;
        require_non_empty(name)?;
        let mut entries = self.entries.write();
        check_parents(&entries, name)?;
        if entries.contains_key(name) {
            return Err(StoreError::NameAlreadyBound(name.clone()));
        }
        entries.insert(name.clone(), Entry::Bound(object));
        Ok(())
    }

    fn rebind(&self, name: &Name, object: NamingObject) -> Result<(), StoreError> {
        self.ensure_open()?;
        require_non_empty(name)?;
        let mut entries = self.entries.write();
        check_parents(&entries, name)?;
        let removed = remove_subtree(&mut entries, name);
        entries.insert(name.clone(), Entry::Bound(object));
        drop(entries);
        drop(removed);
        Ok(())
    }

    fn unbind(&self, name: &Name) -> Result<(), StoreError> {
        self.ensure_open()?;
        require_non_empty(name)?;
        let mut entries = self.entries.write();
        check_parents(&entries, name)?;
        let removed = remove_subtree(&mut entries, name);
        drop(entries);
        drop(removed);
        Ok(())
    }

    fn rename(&self, old_name: &Name, new_name: &Name) -> Result<(), StoreError> {
        self.ensure_open()?;
        require_non_empty(old_name)?;
        require_non_empty(new_name)?;
        if new_name.starts_with(old_name) {
            return Err(StoreError::InvalidName(format!(
                "cannot rename {} beneath itself",
                old_name
            )));
        }

        let mut entries = self.entries.write();
        check_parents(&entries, old_name)?;
        check_parents(&entries, new_name)?;
        if !entries.contains_key(old_name) {
            return Err(StoreError::NameNotFound(old_name.clone()));
        }
        if entries.contains_key(new_name) {
            return Err(StoreError::NameAlreadyBound(new_name.clone()));
        }

        let moved: Vec<Name> = entries
            .range(old_name.clone()..)
            .take_while(|(key, _)| key.starts_with(old_name))
            .map(|(key, _)| key.clone())
            .collect();
        for key in moved {
            if let Some(entry) = entries.remove(&key) {
                let relocated = new_name.join(&key.suffix(old_name.len()));
                entries.insert(relocated, entry);
            }
        }
        Ok(())
    }

    fn list(&self, name: &Name) -> Result<Vec<NameClassPair>, StoreError> {
        self.ensure_open()?;
        let entries = self.entries.read();
        check_context(&entries, name)?;
        Ok(children(&entries, name)
            .map(|(key, entry)| NameClassPair {
                name: key.last().unwrap_or_default().to_string(),
                class_name: match entry {
                    Entry::Context => "context".to_string(),
                    Entry::Bound(object) => object.class_name().to_string(),
                },
            })
            .collect())
    }

    fn list_bindings(&self, name: &Name) -> Result<Vec<Binding>, StoreError> {
        self.ensure_open()?;
        let entries = self.entries.read();
        check_context(&entries, name)?;
        children(&entries, name)
            .map(|(key, entry)| -> Result<Binding, StoreError> {
                let object = self.object_for(key, entry)?;
                Ok(Binding::new(key.last().unwrap_or_default(), object))
            })
            .collect()
    }

    fn create_subcontext(&self, name: &Name) -> Result<Arc<dyn Context>, StoreError> {
        self.ensure_open()?;
        require_non_empty(name)?;
        {
            let mut entries = self.entries.write();
            check_parents(&entries, name)?;
            if entries.contains_key(name) {
                return Err(StoreError::NameAlreadyBound(name.clone()));
            }
            entries.insert(name.clone(), Entry::Context);
        }
        debug!(name = %name, "Created subcontext");
        self.context_at(name)
    }

    fn destroy_subcontext(&self, name: &Name) -> Result<(), StoreError> {
        self.ensure_open()?;
        require_non_empty(name)?;
        let mut entries = self.entries.write();
        check_parents(&entries, name)?;
        match entries.get(name) {
            None => Ok(()),
            Some(Entry::Bound(_)) => Err(StoreError::NotContext(name.clone())),
            Some(Entry::Context) => {
                if has_children(&entries, name) {
                    return Err(StoreError::ContextNotEmpty(name.clone()));
                }
                entries.remove(name);
                Ok(())
            }
        }
    }

    fn lookup_link(&self, name: &Name) -> Result<NamingObject, StoreError> {
        self.ensure_open()?;
        if name.is_empty() {
            return self.context_at(name).map(NamingObject::Context);
        }
        let entries = self.entries.read();
        check_parents(&entries, name)?;
        match entries.get(name) {
            None => Err(StoreError::NameNotFound(name.clone())),
            Some(entry) => self.object_for(name, entry),
        }
    }

    fn close(&self) -> Result<(), StoreError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("Memory naming store closed");
        }
        Ok(())
    }
}
