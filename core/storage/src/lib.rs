//! Storage client abstraction for Cirrus.
//!
//! This crate provides a trait-based interface for object storage backends
//! (cloud buckets, local filesystem, in-memory) and a client registry for
//! dynamic backend resolution with task-scoped overrides.
//!
//! # Design Principles
//! - Backend isolation: no provider-specific logic leaks past the trait
//! - Async operations: all object I/O is async
//! - Override isolation: test overrides are scoped to one task and never
//!   observable from concurrently running tasks
//! - Unified error semantics: consistent error types across backends

pub mod client;
pub mod local;
pub mod memory;
pub mod registry;

pub use client::{ObjectInfo, StorageClient};
pub use local::{LocalClient, LOCAL_ROOT_ENV};
pub use memory::MemoryClient;
pub use registry::{
    create_default_registry, global, ClientFactory, ClientRegistry, DEFAULT_PROVIDER,
};
