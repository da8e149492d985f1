//! Headless client session: a local mirror of the room driven by server
//! messages. The local player runs through the predictor; remote players are
//! rendered a fixed delay behind the newest sample so movement interpolates
//! smoothly between 10 Hz broadcasts.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use trench_core::math::Vec2;
use trench_core::net::messages::ServerMessage;
use trench_core::player::PlayerId;
use trench_core::room::{LevelType, Scene};

use crate::predict::PredictedPlayer;

/// How far behind real time remote players are rendered.
pub const INTERP_DELAY_SECS: f64 = 0.1;

/// Samples older than this are dropped from interpolation buffers.
const BUFFER_KEEP_SECS: f64 = 1.0;

pub struct RemotePlayer {
    pub id: PlayerId,
    pub name: String,
    pub health: f32,
    pub health_max: f32,
    pub downed: bool,
    buffer: VecDeque<(f64, Vec2)>,
}

impl RemotePlayer {
    fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            health: 0.0,
            health_max: 0.0,
            downed: false,
            buffer: VecDeque::new(),
        }
    }

    fn push_sample(&mut self, at: f64, pos: Vec2) {
        self.buffer.push_back((at, pos));
        while let Some(&(t, _)) = self.buffer.front()
            && at - t > BUFFER_KEEP_SECS
        {
            self.buffer.pop_front();
        }
    }

    /// Position at `now - INTERP_DELAY_SECS`, interpolated between the two
    /// straddling samples. Falls back to the nearest sample at the edges.
    pub fn sample(&self, now: f64) -> Option<Vec2> {
        let t = now - INTERP_DELAY_SECS;
        let mut prev: Option<(f64, Vec2)> = None;
        for &(at, pos) in &self.buffer {
            if at >= t {
                return Some(match prev {
                    Some((pt, ppos)) if at > pt => {
                        let frac = ((t - pt) / (at - pt)) as f32;
                        ppos.lerp(pos, frac)
                    },
                    _ => pos,
                });
            }
            prev = Some((at, pos));
        }
        prev.map(|(_, pos)| pos)
    }
}

pub struct ClientSession {
    pub local_id: PlayerId,
    pub predictor: PredictedPlayer,
    pub health: f32,
    pub health_max: f32,
    pub downed: bool,
    pub scene: Scene,
    pub level_type: LevelType,
    remotes: HashMap<PlayerId, RemotePlayer>,
}

impl ClientSession {
    pub fn new(local_id: PlayerId, spawn_pos: Vec2, speed: f32) -> Self {
        Self {
            local_id,
            predictor: PredictedPlayer::new(spawn_pos, speed),
            health: 0.0,
            health_max: 0.0,
            downed: false,
            scene: Scene::Lobby,
            level_type: LevelType::default(),
            remotes: HashMap::new(),
        }
    }

    pub fn remote(&self, id: PlayerId) -> Option<&RemotePlayer> {
        self.remotes.get(&id)
    }

    pub fn remote_count(&self) -> usize {
        self.remotes.len()
    }

    /// Fold one server message into the mirror. `now` is the client clock
    /// used to timestamp interpolation samples.
    pub fn apply(&mut self, msg: &ServerMessage, now: f64) {
        match msg {
            ServerMessage::RoomSnapshot(snap) => {
                self.scene = snap.scene;
                self.level_type = snap.level_type;
                let mut seen: Vec<PlayerId> = Vec::with_capacity(snap.players.len());
                for p in &snap.players {
                    seen.push(p.id);
                    if p.id == self.local_id {
                        self.predictor.snap_to(p.pos);
                        self.health = p.health;
                        self.health_max = p.health_max;
                        self.downed = p.downed;
                        continue;
                    }
                    let remote = self
                        .remotes
                        .entry(p.id)
                        .or_insert_with(|| RemotePlayer::new(p.id, String::new()));
                    remote.health = p.health;
                    remote.health_max = p.health_max;
                    remote.downed = p.downed;
                    remote.buffer.clear();
                    remote.push_sample(now, p.pos);
                }
                self.remotes.retain(|id, _| seen.contains(id));
            },
            ServerMessage::PlayerList(pl) => {
                for p in &pl.players {
                    if p.id == self.local_id {
                        continue;
                    }
                    self.remotes
                        .entry(p.id)
                        .or_insert_with(|| RemotePlayer::new(p.id, p.display_name.clone()))
                        .name = p.display_name.clone();
                }
                self.remotes
                    .retain(|id, _| pl.players.iter().any(|p| p.id == *id));
            },
            ServerMessage::PlayerStateUpdate(m) => {
                for u in &m.updates {
                    if u.id == self.local_id {
                        self.predictor.reconcile(u);
                    } else if let Some(remote) = self.remotes.get_mut(&u.id) {
                        remote.push_sample(now, u.pos);
                    }
                }
            },
            ServerMessage::PlayerHealthUpdate(m) => {
                if m.id == self.local_id {
                    self.health = m.health;
                    self.health_max = m.health_max;
                } else if let Some(remote) = self.remotes.get_mut(&m.id) {
                    remote.health = m.health;
                    remote.health_max = m.health_max;
                }
            },
            ServerMessage::PlayerDied(m) => {
                if m.id == self.local_id {
                    self.downed = true;
                    self.health = 0.0;
                } else if let Some(remote) = self.remotes.get_mut(&m.id) {
                    remote.downed = true;
                    remote.health = 0.0;
                }
            },
            ServerMessage::PlayerRespawned(m) => {
                if m.id == self.local_id {
                    self.downed = false;
                    self.health = m.health;
                    self.predictor.snap_to(m.pos);
                } else if let Some(remote) = self.remotes.get_mut(&m.id) {
                    remote.downed = false;
                    remote.health = m.health;
                    remote.buffer.clear();
                    remote.push_sample(now, m.pos);
                }
            },
            ServerMessage::ReviveComplete(m) => {
                if m.target == self.local_id {
                    self.downed = false;
                    self.health = m.health;
                } else if let Some(remote) = self.remotes.get_mut(&m.target) {
                    remote.downed = false;
                    remote.health = m.health;
                }
            },
            ServerMessage::ModeUpdate(m) => {
                self.scene = m.scene;
                self.level_type = m.level_type;
            },
            other => {
                // Entity/VFX traffic belongs to the render layer, not the
                // movement mirror.
                debug!(kind = ?other.message_type(), "session ignoring message");
            },
        }
    }
}
