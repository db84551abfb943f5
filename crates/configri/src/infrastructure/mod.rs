//! Infrastructure layer: file-system facing adapters.
//!
//! - **`backend`** – the [`Backend`](backend::Backend) trait and its JSON,
//!   TOML and in-memory implementations.
//! - **`dirs`** – platform-appropriate config/data/cache directories.

pub mod backend;
pub mod dirs;
