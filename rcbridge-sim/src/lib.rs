//! Host-side pieces for the RC bridge simulator: the in-memory radio
//! medium, the directory-backed blob store, and the settings loader. The
//! binary in `main.rs` wires these to one sender and one receiver endpoint.

pub mod config;
pub mod ether;
pub mod store;
