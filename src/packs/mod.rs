//! Command packs: embedded templates installed into agent tool directories.

pub mod install;
pub mod schema;
