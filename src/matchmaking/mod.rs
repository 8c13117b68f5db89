//! Player matchmaking
//!
//! Partitions the available player pool into proposed pairs of similar
//! skill. Proposals are suggestions only; nothing is booked here.

pub mod pairing;

// Re-export commonly used types
pub use pairing::{PairingEngine, PairingOutcome};
