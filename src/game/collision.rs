use super::math::{in_bounds, within};
use super::types::Point;
use crate::app::config::GameConfig;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeathCause {
    Wall,
    SelfCollision,
    EatenBy(String),
    MutualCollision(String),
    BodyCollision(String),
    InvalidState,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathCause::Wall => write!(f, "You hit the wall!"),
            DeathCause::SelfCollision => write!(f, "You ran into your own body!"),
            DeathCause::EatenBy(name) => write!(f, "You were eaten by {name}!"),
            DeathCause::MutualCollision(name) => write!(f, "You collided with {name}!"),
            DeathCause::BodyCollision(name) => write!(f, "You collided with {name}'s body!"),
            DeathCause::InvalidState => write!(f, "Your snake was removed after an invalid update."),
        }
    }
}

/// Read-only view of one snake after movement.
#[derive(Debug, Clone, Copy)]
pub struct SnakeView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub score: u64,
    pub body: &'a [Point],
}

impl SnakeView<'_> {
    fn head(&self) -> Option<Point> {
        self.body.first().copied().filter(Point::is_finite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadOn {
    FirstEats,
    SecondEats,
    BothDie,
}

#[derive(Debug, Default)]
pub struct Verdicts {
    pub deaths: BTreeMap<String, DeathCause>,
    pub gains: BTreeMap<String, u64>,
}

impl Verdicts {
    pub fn is_dead(&self, id: &str) -> bool {
        self.deaths.contains_key(id)
    }

    /// The first recorded cause wins.
    fn kill(&mut self, id: &str, cause: DeathCause) -> bool {
        if self.deaths.contains_key(id) {
            return false;
        }
        self.deaths.insert(id.to_string(), cause);
        true
    }

    fn gain(&mut self, id: &str, amount: u64) {
        if amount > 0 {
            *self.gains.entry(id.to_string()).or_insert(0) += amount;
        }
    }
}

pub fn hits_wall(head: Point, width: f64, height: f64) -> bool {
    !in_bounds(head, width, height)
}

pub fn hits_self(body: &[Point], offset: usize, threshold: f64) -> bool {
    let Some(head) = body.first().copied() else { return false };
    body.iter()
        .skip(offset.max(1))
        .any(|segment| within(head, *segment, threshold))
}

pub fn heads_touch(a: Point, b: Point, distance: f64) -> bool {
    within(a, b, distance)
}

/// Head against another snake's segments, its head excluded.
pub fn hits_body(head: Point, other_body: &[Point], threshold: f64) -> bool {
    other_body
        .iter()
        .skip(1)
        .any(|segment| within(head, *segment, threshold))
}

pub fn resolve_head_to_head(first_score: u64, second_score: u64) -> HeadOn {
    match first_score.cmp(&second_score) {
        Ordering::Greater => HeadOn::FirstEats,
        Ordering::Less => HeadOn::SecondEats,
        Ordering::Equal => HeadOn::BothDie,
    }
}

/// Decides every death and score transfer for one tick from a fixed view of
/// the world. Nothing is mutated here, so the result does not depend on the
/// order snakes were moved in.
///
/// Stages run in order and a snake killed in one stage skips the later ones:
/// wall and self hits, then head-on contacts among the survivors, then head
/// against any other snake's body.
///
/// Every head-on pair is judged on the scores in `snakes`, before any transfer.
/// A snake eaten in one pair still takes part in its other pairs, so it can
/// eat a smaller third snake in the same tick. It only keeps its first cause.
pub fn evaluate(snakes: &[SnakeView<'_>], config: &GameConfig) -> Verdicts {
    let mut verdicts = Verdicts::default();
    let self_offset = config.self_collision_offset();
    let self_threshold = config.self_collision_threshold();

    for snake in snakes {
        let Some(head) = snake.head() else {
            verdicts.kill(snake.id, DeathCause::InvalidState);
            continue;
        };
        if hits_wall(head, config.map_width, config.map_height) {
            verdicts.kill(snake.id, DeathCause::Wall);
        } else if hits_self(snake.body, self_offset, self_threshold) {
            verdicts.kill(snake.id, DeathCause::SelfCollision);
        }
    }

    let contenders: Vec<(SnakeView<'_>, Point)> = snakes
        .iter()
        .filter(|snake| !verdicts.is_dead(snake.id))
        .filter_map(|snake| snake.head().map(|head| (*snake, head)))
        .collect();

    let head_distance = config.head_to_head_distance();
    for (index, (first, first_head)) in contenders.iter().enumerate() {
        for (second, second_head) in &contenders[index + 1..] {
            if !heads_touch(*first_head, *second_head, head_distance) {
                continue;
            }
            match resolve_head_to_head(first.score, second.score) {
                HeadOn::FirstEats => {
                    if verdicts.kill(second.id, DeathCause::EatenBy(first.name.to_string())) {
                        verdicts.gain(first.id, second.score / 2);
                    }
                }
                HeadOn::SecondEats => {
                    if verdicts.kill(first.id, DeathCause::EatenBy(second.name.to_string())) {
                        verdicts.gain(second.id, first.score / 2);
                    }
                }
                HeadOn::BothDie => {
                    verdicts.kill(first.id, DeathCause::MutualCollision(second.name.to_string()));
                    verdicts.kill(second.id, DeathCause::MutualCollision(first.name.to_string()));
                }
            }
        }
    }

    let body_threshold = config.body_collision_threshold();
    for (snake, head) in &contenders {
        if verdicts.is_dead(snake.id) {
            continue;
        }
        let obstacle = snakes
            .iter()
            .filter(|other| other.id != snake.id)
            .find(|other| hits_body(*head, other.body, body_threshold));
        if let Some(other) = obstacle {
            verdicts.kill(snake.id, DeathCause::BodyCollision(other.name.to_string()));
        }
    }

    verdicts
}
