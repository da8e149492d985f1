use trench_core::net::messages::ServerMessage;
use trench_core::player::PlayerId;

use crate::config::SimConfig;

/// Who an outbound message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Broadcast,
    To(PlayerId),
    Except(PlayerId),
}

/// A message produced by the simulation, to be delivered by the host.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub target: Target,
    pub msg: ServerMessage,
}

/// Per-tick value object handed to every handler and subsystem.
///
/// Bundles timing, config, and the outbound queue so subsystems never touch
/// global state. Within one tick all mutation happens before the host drains
/// the outbox, so no client observes a half-updated tick.
pub struct RoomContext<'a> {
    /// Monotonic room time in seconds.
    pub now: f64,
    /// Seconds since the previous tick.
    pub dt: f32,
    pub config: &'a SimConfig,
    outbox: Vec<Outbound>,
}

impl<'a> RoomContext<'a> {
    pub fn new(now: f64, dt: f32, config: &'a SimConfig) -> Self {
        Self {
            now,
            dt,
            config,
            outbox: Vec::new(),
        }
    }

    pub fn broadcast(&mut self, msg: ServerMessage) {
        self.outbox.push(Outbound {
            target: Target::Broadcast,
            msg,
        });
    }

    pub fn send_to(&mut self, player: PlayerId, msg: ServerMessage) {
        self.outbox.push(Outbound {
            target: Target::To(player),
            msg,
        });
    }

    pub fn send_except(&mut self, player: PlayerId, msg: ServerMessage) {
        self.outbox.push(Outbound {
            target: Target::Except(player),
            msg,
        });
    }

    /// Take all queued messages, leaving the outbox empty.
    pub fn drain(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    #[cfg(test)]
    pub fn outbox(&self) -> &[Outbound] {
        &self.outbox
    }
}
