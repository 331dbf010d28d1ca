//! Architecture abstraction layer for the interrupt core.
//!
//! Code outside this module talks to the platform through the traits in
//! [`traits`]. The x86_64 implementation is only built for that target.

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

pub mod traits;
pub use traits::*;
