pub mod item;
pub mod math;
pub mod net;
pub mod npc;
pub mod player;
pub mod rng;
pub mod room;
pub mod time;
