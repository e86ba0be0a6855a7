//! # Repository Implementations
//!
//! One repository per concern:
//!
//! - [`snapshot`] - the persistence gateway: atomic replace of one synced
//!   generation (journal + records + grades), then preference scalars
//! - [`journal`] - journal reads for the offline display
//! - [`term`] - academic term upserts and current-term lookup
//! - [`grade`] - credit/grading/score reads
//! - [`prefs`] - scalar preference storage (credentials, cookie, profile)

pub mod grade;
pub mod journal;
pub mod prefs;
pub mod snapshot;
pub mod term;
