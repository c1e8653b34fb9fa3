use super::math::random_point;
use super::types::{is_opposite, Direction, Player, Point};
use crate::app::config::GameConfig;
use rand::Rng;

pub fn spawn_player<R: Rng + ?Sized>(
    rng: &mut R,
    id: String,
    name: String,
    config: &GameConfig,
) -> Player {
    let head = random_point(
        rng,
        config.map_width,
        config.map_height,
        config.segment_radius,
    );
    Player {
        id,
        name,
        direction: Direction::Right,
        body: vec![head],
        score: 0,
        alive: true,
    }
}

/// Applies `requested` unless it would turn the snake straight back on itself.
/// Returns whether the direction changed.
pub fn set_direction(player: &mut Player, requested: Direction) -> bool {
    if !player.alive || is_opposite(player.direction, requested) {
        return false;
    }
    player.direction = requested;
    true
}

pub fn speed_for(player: &Player, config: &GameConfig) -> f64 {
    config.speed.speed_for(player.body.len())
}

/// Prepends the next head. The tail is left alone until `finish_move`.
pub fn advance(player: &mut Player, speed: f64) -> Option<Point> {
    let head = player.head()?;
    let (dx, dy) = player.direction.unit();
    let next = Point::new(head.x + dx * speed, head.y + dy * speed);
    player.body.insert(0, next);
    Some(next)
}

/// Grows by keeping the tail when food was eaten, otherwise drops it.
pub fn finish_move(player: &mut Player, ate_food: bool) {
    if !ate_food && player.body.len() > 1 {
        player.body.pop();
    }
}
