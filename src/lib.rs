//! Remote Naming: client-side hierarchical naming contexts
//!
//! Presents a remote naming store through an ordinary hierarchical context
//! API. Contexts resolve names relative to their position, share one store
//! and one environment across everything derived from them, and discharge
//! their cleanup tasks exactly once whether closed or dropped.

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod name;
pub mod object;
pub mod session;
pub mod store;

pub use context::{CloseTask, Context, Environment, RemoteContext};
pub use error::{NamingError, StoreError};
pub use name::Name;
pub use object::{Binding, NameClassPair, NamingObject};
pub use session::NamingSession;
pub use store::{MemoryNamingStore, NamingStore};
