//! Headless client session library for the trench extraction shooter.
//!
//! No rendering and no transport live here: the crate turns decoded
//! [`ServerMessage`](trench_core::net::messages::ServerMessage) values and
//! local input frames into a consistent view of the room, including the
//! predicted local player and interpolated remote players.

pub mod predict;
pub mod session;

pub use predict::{CorrectionMode, InputFrame, PredictedPlayer};
pub use session::{ClientSession, RemotePlayer};
