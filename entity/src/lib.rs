//! Database entities for the memorial service.

pub mod comments;
pub mod fallen;
pub mod memories;
pub mod memory_additions;
pub mod sessions;
pub mod users;
