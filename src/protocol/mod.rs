//! Data model for the face-tracking parameter stream.
//!
//! This module holds the address/parameter mapping, the shared parameter
//! store written by the receive loop, and the connection settings snapshot.

mod addresses;
mod config;
mod error;
mod store;

pub use addresses::{
    ADDRESS_ROOT, AddressTable, EYE_PREFIX, FACE_PREFIX, PARAMETER_COUNT, Parameter,
};
pub use config::ConnectionConfig;
pub use error::{Error, Result};
pub use store::ParameterStore;
