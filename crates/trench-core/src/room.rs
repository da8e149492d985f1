use serde::{Deserialize, Serialize};

/// Which scene a room is currently simulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scene {
    Lobby,
    Level,
}

/// Level flavor selected for the next deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelType {
    Trenches,
    Ruins,
    Catacombs,
}

impl Default for LevelType {
    fn default() -> Self {
        Self::Trenches
    }
}

/// Rectangular playable boundary of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Boundary {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.clamp(self.min_x, self.max_x),
            y.clamp(self.min_y, self.max_y),
        )
    }
}

/// Room ids come from clients; constrain them before use as map keys.
pub fn is_valid_room_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 32
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_validation() {
        assert!(is_valid_room_id("squad-1"));
        assert!(is_valid_room_id("A_B_3"));
        assert!(!is_valid_room_id(""));
        assert!(!is_valid_room_id("has space"));
        assert!(!is_valid_room_id(&"x".repeat(33)));
    }

    #[test]
    fn boundary_clamp() {
        let b = Boundary {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 100.0,
            max_y: 50.0,
        };
        assert!(b.contains(10.0, 10.0));
        assert!(!b.contains(-1.0, 10.0));
        assert_eq!(b.clamp(150.0, -5.0), (100.0, 0.0));
    }
}
