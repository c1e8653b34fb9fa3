use crate::game::constants::{
    DEFAULT_PORT, FOOD_RADIUS, FOOD_TARGET_COUNT, MAP_HEIGHT, MAP_WIDTH, SEGMENT_RADIUS,
    SELF_COLLISION_FACTOR, SNAKE_SPEED, SPEED_BASE, SPEED_DECAY_PER_SEGMENT, SPEED_SHORT_BONUS,
    TICK_RATE_HZ,
};
use anyhow::ensure;
use std::env;
use std::time::Duration;

/// How far a snake moves per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedModel {
    Constant(f64),
    /// `base + max(0, short_bonus - body_len * decay)`: short snakes move faster.
    LengthScaled { base: f64, short_bonus: f64, decay: f64 },
}

impl SpeedModel {
    pub fn speed_for(&self, body_len: usize) -> f64 {
        match *self {
            SpeedModel::Constant(speed) => speed,
            SpeedModel::LengthScaled {
                base,
                short_bonus,
                decay,
            } => base + (short_bonus - body_len as f64 * decay).max(0.0),
        }
    }

    /// Slowest step any snake can take; used to size the self-collision offset.
    pub fn min_speed(&self) -> f64 {
        match *self {
            SpeedModel::Constant(speed) => speed,
            SpeedModel::LengthScaled { base, .. } => base,
        }
    }

    fn is_valid(&self) -> bool {
        match *self {
            SpeedModel::Constant(speed) => speed.is_finite() && speed > 0.0,
            SpeedModel::LengthScaled {
                base,
                short_bonus,
                decay,
            } => {
                base.is_finite()
                    && base > 0.0
                    && short_bonus.is_finite()
                    && short_bonus >= 0.0
                    && decay.is_finite()
                    && decay >= 0.0
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub map_width: f64,
    pub map_height: f64,
    pub food_target: usize,
    pub food_radius: f64,
    pub segment_radius: f64,
    pub speed: SpeedModel,
    pub tick_rate_hz: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: MAP_WIDTH,
            map_height: MAP_HEIGHT,
            food_target: FOOD_TARGET_COUNT,
            food_radius: FOOD_RADIUS,
            segment_radius: SEGMENT_RADIUS,
            speed: SpeedModel::Constant(SNAKE_SPEED),
            tick_rate_hz: TICK_RATE_HZ,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let speed = match env::var("SPEED_MODE").ok().as_deref().map(str::trim) {
            Some("length") => SpeedModel::LengthScaled {
                base: SPEED_BASE,
                short_bonus: SPEED_SHORT_BONUS,
                decay: SPEED_DECAY_PER_SEGMENT,
            },
            _ => SpeedModel::Constant(env_or("SNAKE_SPEED", SNAKE_SPEED)),
        };
        let config = Self {
            map_width: env_or("MAP_WIDTH", defaults.map_width),
            map_height: env_or("MAP_HEIGHT", defaults.map_height),
            food_target: env_or("FOOD_COUNT", defaults.food_target),
            food_radius: env_or("FOOD_RADIUS", defaults.food_radius),
            segment_radius: env_or("SEGMENT_RADIUS", defaults.segment_radius),
            speed,
            tick_rate_hz: env_or("TICK_RATE", defaults.tick_rate_hz),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.segment_radius.is_finite() && self.segment_radius > 0.0,
            "segment radius must be positive, got {}",
            self.segment_radius
        );
        ensure!(
            self.map_width.is_finite() && self.map_width > self.segment_radius * 2.0,
            "map width {} is too small for segment radius {}",
            self.map_width,
            self.segment_radius
        );
        ensure!(
            self.map_height.is_finite() && self.map_height > self.segment_radius * 2.0,
            "map height {} is too small for segment radius {}",
            self.map_height,
            self.segment_radius
        );
        ensure!(
            self.food_radius.is_finite() && self.food_radius > 0.0,
            "food radius must be positive, got {}",
            self.food_radius
        );
        ensure!(self.speed.is_valid(), "invalid speed model {:?}", self.speed);
        ensure!(
            (1..=1000).contains(&self.tick_rate_hz),
            "tick rate must be within 1..=1000 Hz, got {}",
            self.tick_rate_hz
        );
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64)
    }

    pub fn head_to_head_distance(&self) -> f64 {
        self.segment_radius * 2.0
    }

    pub fn self_collision_threshold(&self) -> f64 {
        self.segment_radius * 2.0 * SELF_COLLISION_FACTOR
    }

    pub fn body_collision_threshold(&self) -> f64 {
        self.segment_radius
    }

    /// First body index that counts for self hits. Segments closer to the head
    /// than this can sit inside the threshold on a plain 90 degree turn.
    pub fn self_collision_offset(&self) -> usize {
        let reach = self.self_collision_threshold() * std::f64::consts::SQRT_2;
        (reach / self.speed.min_speed()).ceil() as usize + 1
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub game: GameConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env_or("PORT", DEFAULT_PORT),
            game: GameConfig::from_env()?,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    let value = env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok());
    match value {
        Some(value) => value,
        None => {
            if env::var_os(key).is_some() {
                tracing::warn!(key, "ignoring unparsable configuration value");
            }
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_scaled_speed_slows_long_snakes() {
        let model = SpeedModel::LengthScaled {
            base: 4.0,
            short_bonus: 10.0,
            decay: 0.05,
        };
        assert!((model.speed_for(1) - 13.95).abs() < 1e-9);
        assert!((model.speed_for(100) - 9.0).abs() < 1e-9);
        assert!((model.speed_for(400) - 4.0).abs() < 1e-9);
        assert_eq!(model.min_speed(), 4.0);
    }

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.head_to_head_distance(), 20.0);
        assert!(config.self_collision_threshold() < config.head_to_head_distance());
        assert_eq!(config.tick_period(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn self_collision_offset_clears_a_right_angle_turn() {
        let config = GameConfig::default();
        let offset = config.self_collision_offset();
        let path = offset as f64 * config.speed.min_speed();
        assert!(path / std::f64::consts::SQRT_2 >= config.self_collision_threshold());
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let mut config = GameConfig::default();
        config.segment_radius = 0.0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.speed = SpeedModel::Constant(-1.0);
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.tick_rate_hz = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.map_width = 15.0;
        assert!(config.validate().is_err());
    }
}
