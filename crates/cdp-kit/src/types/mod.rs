//! Core types shared across the client and the operation modules.

mod key;
mod transaction;

pub use key::*;
pub use transaction::*;
