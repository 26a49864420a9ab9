//! The lockfile core: domain types, the per-format parsers and the services
//! that turn parsed records into dependency sets.
pub mod domain;
pub mod parsers;
pub mod services;
