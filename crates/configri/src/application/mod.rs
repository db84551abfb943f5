//! Application layer: the configuration manager use cases.
//!
//! - **`manager`** – typed reads, staged writes, save/reload/clear on top of
//!   a [`Backend`](crate::infrastructure::backend::Backend).
//! - **`shared`** – a lock-protected handle for using one manager from
//!   several threads.
//!
//! Nothing here opens a file; all I/O goes through the backend trait.

pub mod manager;
pub mod shared;
