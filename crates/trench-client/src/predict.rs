//! Local player prediction and server reconciliation.
//!
//! The client integrates its own inputs every frame and sends them to the
//! server, which simulates the same stream. When an authoritative position
//! arrives, the predictor blends toward it instead of snapping, with the
//! blend policy chosen by an explicit correction mode rather than scattered
//! status branches.

use std::collections::VecDeque;

use trench_core::math::Vec2;
use trench_core::net::messages::{ForcedReason, PlayerPosUpdate};

/// Drift below this is left alone; small prediction error is invisible.
pub const CORRECTION_THRESHOLD: f32 = 10.0;

const KNOCKBACK_LERP: f32 = 0.8;
const ENSNARE_LERP: f32 = 0.5;
/// Slow nudge used when the server explicitly flagged the position wrong.
const NUDGE_LERP: f32 = 0.2;
/// Cap on the distance-proportional free correction.
const MAX_FREE_LERP: f32 = 0.3;
/// Divisor turning drift distance into a lerp factor.
const FREE_LERP_SCALE: f32 = 100.0;

const DASH_SPEED_MULT: f32 = 2.0;

/// Whether prediction runs or the server owns the position outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionMode {
    Free,
    Forced(ForcedReason),
}

/// One frame of local input, kept until the server acknowledges its seq.
#[derive(Debug, Clone, Copy)]
pub struct InputFrame {
    pub seq: u32,
    pub move_x: f32,
    pub move_y: f32,
    pub dash: bool,
    pub dt: f32,
}

pub struct PredictedPlayer {
    pub pos: Vec2,
    pub mode: CorrectionMode,
    speed: f32,
    next_seq: u32,
    last_acked_seq: u32,
    history: VecDeque<InputFrame>,
}

impl PredictedPlayer {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            mode: CorrectionMode::Free,
            speed,
            next_seq: 1,
            last_acked_seq: 0,
            history: VecDeque::new(),
        }
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn last_acked_seq(&self) -> u32 {
        self.last_acked_seq
    }

    pub fn pending_inputs(&self) -> usize {
        self.history.len()
    }

    /// Integrate one frame of input locally and record it for replay.
    /// Returns the sequenced frame to send to the server. While the position
    /// is server-forced, prediction is bypassed but inputs are still
    /// sequenced so the server keeps simulating them.
    pub fn apply_input(&mut self, move_x: f32, move_y: f32, dash: bool, dt: f32) -> InputFrame {
        let frame = InputFrame {
            seq: self.next_seq,
            move_x,
            move_y,
            dash,
            dt,
        };
        self.next_seq += 1;
        if self.mode == CorrectionMode::Free {
            self.pos = integrate(self.pos, frame, self.speed);
        }
        self.history.push_back(frame);
        frame
    }

    /// Blend toward an authoritative position update for this player.
    pub fn reconcile(&mut self, update: &PlayerPosUpdate) {
        self.last_acked_seq = update.last_input_seq;
        while let Some(front) = self.history.front()
            && front.seq <= update.last_input_seq
        {
            self.history.pop_front();
        }

        self.mode = match update.forced {
            Some(reason) => CorrectionMode::Forced(reason),
            None => CorrectionMode::Free,
        };

        match self.mode {
            CorrectionMode::Forced(ForcedReason::Knockback) => {
                self.pos = self.pos.lerp(update.pos, KNOCKBACK_LERP);
            },
            CorrectionMode::Forced(ForcedReason::Ensnared) => {
                self.pos = self.pos.lerp(update.pos, ENSNARE_LERP);
            },
            CorrectionMode::Free => {
                // Replay the inputs the server has not seen yet on top of
                // its position; that is where we should be if both sides
                // agree on everything acknowledged.
                let target = self.replay_from(update.pos);
                if update.needs_correction {
                    self.pos = self.pos.lerp(target, NUDGE_LERP);
                    return;
                }
                let drift = self.pos.distance(target);
                if drift > CORRECTION_THRESHOLD {
                    let factor = (drift / FREE_LERP_SCALE).min(MAX_FREE_LERP);
                    self.pos = self.pos.lerp(target, factor);
                }
            },
        }
    }

    /// Hard-set the position, dropping pending inputs. Used for snapshots,
    /// respawns and scene changes where blending would be wrong.
    pub fn snap_to(&mut self, pos: Vec2) {
        self.pos = pos;
        self.history.clear();
        self.mode = CorrectionMode::Free;
    }

    fn replay_from(&self, server_pos: Vec2) -> Vec2 {
        self.history
            .iter()
            .fold(server_pos, |pos, frame| integrate(pos, *frame, self.speed))
    }
}

fn integrate(pos: Vec2, frame: InputFrame, speed: f32) -> Vec2 {
    let mut dir = Vec2::new(frame.move_x, frame.move_y);
    let len = dir.length();
    if len > 1.0 {
        dir = dir.scale(1.0 / len);
    }
    let mult = if frame.dash { DASH_SPEED_MULT } else { 1.0 };
    pos.add(dir.scale(speed * mult * frame.dt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(pos: Vec2, last_input_seq: u32) -> PlayerPosUpdate {
        PlayerPosUpdate {
            id: 1,
            pos,
            last_input_seq,
            needs_correction: false,
            forced: None,
        }
    }

    #[test]
    fn input_integrates_and_sequences() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        let a = p.apply_input(1.0, 0.0, false, 0.1);
        let b = p.apply_input(1.0, 0.0, false, 0.1);
        assert_eq!(a.seq, 1);
        assert_eq!(b.seq, 2);
        assert!((p.pos.x - 20.0).abs() < 1e-4);
        assert_eq!(p.pending_inputs(), 2);
    }

    #[test]
    fn dash_doubles_speed() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        p.apply_input(1.0, 0.0, true, 0.1);
        assert!((p.pos.x - 20.0).abs() < 1e-4);
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        p.apply_input(1.0, 1.0, false, 0.1);
        assert!((p.pos.length() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn ack_prunes_history() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        for _ in 0..5 {
            p.apply_input(1.0, 0.0, false, 0.1);
        }
        p.reconcile(&update(p.pos, 3));
        assert_eq!(p.pending_inputs(), 2);
        assert_eq!(p.last_acked_seq(), 3);
    }

    #[test]
    fn agreeing_server_position_causes_no_correction() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        for _ in 0..4 {
            p.apply_input(1.0, 0.0, false, 0.1);
        }
        let before = p.pos;
        // Server acked the first two inputs and agrees on where they led.
        p.reconcile(&update(Vec2::new(20.0, 0.0), 2));
        assert_eq!(p.pos, before);
    }

    #[test]
    fn small_drift_is_left_alone() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        p.reconcile(&update(Vec2::new(5.0, 0.0), 0));
        assert_eq!(p.pos, Vec2::ZERO);
    }

    #[test]
    fn large_drift_lerps_with_cap() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        p.reconcile(&update(Vec2::new(200.0, 0.0), 0));
        // factor capped at 0.3
        assert!((p.pos.x - 60.0).abs() < 1e-3);
    }

    #[test]
    fn needs_correction_nudges_slowly() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        let mut u = update(Vec2::new(100.0, 0.0), 0);
        u.needs_correction = true;
        p.reconcile(&u);
        assert!((p.pos.x - 20.0).abs() < 1e-3);
    }

    #[test]
    fn knockback_fast_lerps_and_bypasses_prediction() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        let mut u = update(Vec2::new(100.0, 0.0), 0);
        u.forced = Some(ForcedReason::Knockback);
        p.reconcile(&u);
        assert_eq!(p.mode, CorrectionMode::Forced(ForcedReason::Knockback));
        assert!((p.pos.x - 80.0).abs() < 1e-3);

        // Inputs still sequence but do not move the predicted position.
        let frame = p.apply_input(1.0, 0.0, false, 0.1);
        assert_eq!(frame.seq, 1);
        assert!((p.pos.x - 80.0).abs() < 1e-3);
    }

    #[test]
    fn ensnare_uses_half_lerp() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        let mut u = update(Vec2::new(100.0, 0.0), 0);
        u.forced = Some(ForcedReason::Ensnared);
        p.reconcile(&u);
        assert!((p.pos.x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn forced_state_clears_when_server_releases() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        let mut u = update(Vec2::new(100.0, 0.0), 0);
        u.forced = Some(ForcedReason::Knockback);
        p.reconcile(&u);
        let u2 = update(p.pos, 0);
        p.reconcile(&u2);
        assert_eq!(p.mode, CorrectionMode::Free);
    }

    #[test]
    fn snap_drops_history() {
        let mut p = PredictedPlayer::new(Vec2::ZERO, 100.0);
        p.apply_input(1.0, 0.0, false, 0.1);
        p.snap_to(Vec2::new(-60.0, -60.0));
        assert_eq!(p.pos, Vec2::new(-60.0, -60.0));
        assert_eq!(p.pending_inputs(), 0);
    }
}
