//! Runtime entity metadata.
//!
//! Everything here is `'static` and produced by `#[derive(Entity)]`; nothing
//! in this module allocates or is mutated after startup.

pub mod entity;
pub mod field;
