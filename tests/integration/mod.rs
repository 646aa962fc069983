//! Integration tests for the remote naming client

mod close_lifecycle;
mod environment_sharing;
mod malformed_names;
mod session_store;
