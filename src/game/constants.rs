pub const MAP_WIDTH: f64 = 10000.0;
pub const MAP_HEIGHT: f64 = 10000.0;
pub const FOOD_TARGET_COUNT: usize = 300;
pub const FOOD_RADIUS: f64 = 5.0;
pub const SEGMENT_RADIUS: f64 = 10.0;
pub const SNAKE_SPEED: f64 = 5.0;
pub const TICK_RATE_HZ: u32 = 30;

// Length-scaled speed: base + max(0, bonus - len * decay).
pub const SPEED_BASE: f64 = 4.0;
pub const SPEED_SHORT_BONUS: f64 = 10.0;
pub const SPEED_DECAY_PER_SEGMENT: f64 = 0.05;

// Self hits use a threshold a little under two radii so neighbouring segments
// never graze the head.
pub const SELF_COLLISION_FACTOR: f64 = 0.9;

pub const DEFAULT_PORT: u16 = 3001;
pub const GUEST_NAME_PREFIX: &str = "Guest";
