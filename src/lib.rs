// SSTLog Library
// Contest logging core for the K1USN Slow Speed Test, shared by the binary
// and the tests.

pub mod adif;
pub mod commands;
pub mod cw;
pub mod db;
pub mod error;
pub mod lookup;
pub mod radio;
pub mod settings;
pub mod xmlrpc;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
