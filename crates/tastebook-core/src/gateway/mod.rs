//! Gateway Layer
//!
//! The remote collection and object store seen through one async contract.
//! `MemoryGateway` backs tests and offline demos; `RestGateway` talks to a
//! PostgREST-style database API with a storage endpoint.

mod memory;
mod rest;
mod traits;

pub use memory::{MemoryGateway, Operation};
pub use rest::RestGateway;
pub use traits::{Gateway, Row};
