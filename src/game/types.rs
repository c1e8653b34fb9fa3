use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  pub fn is_finite(&self) -> bool {
    self.x.is_finite() && self.y.is_finite()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Up,
  Down,
  Left,
  Right,
}

impl Direction {
  pub fn parse(value: &str) -> Option<Self> {
    match value.trim() {
      "up" => Some(Self::Up),
      "down" => Some(Self::Down),
      "left" => Some(Self::Left),
      "right" => Some(Self::Right),
      _ => None,
    }
  }

  pub fn opposite(self) -> Self {
    match self {
      Self::Up => Self::Down,
      Self::Down => Self::Up,
      Self::Left => Self::Right,
      Self::Right => Self::Left,
    }
  }

  /// Unit step; screen coordinates, so up is negative y.
  pub fn unit(self) -> (f64, f64) {
    match self {
      Self::Up => (0.0, -1.0),
      Self::Down => (0.0, 1.0),
      Self::Left => (-1.0, 0.0),
      Self::Right => (1.0, 0.0),
    }
  }
}

pub fn is_opposite(a: Direction, b: Direction) -> bool {
  a.opposite() == b
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Food {
  pub id: u64,
  pub x: f64,
  pub y: f64,
  pub radius: f64,
}

impl Food {
  pub fn position(&self) -> Point {
    Point::new(self.x, self.y)
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
  pub id: String,
  pub name: String,
  pub direction: Direction,
  pub body: Vec<Point>,
  pub score: u64,
  pub alive: bool,
}

impl Player {
  pub fn head(&self) -> Option<Point> {
    self.body.first().copied()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapSize {
  pub width: f64,
  pub height: f64,
}
