use super::math::{random_point, within};
use super::types::{Food, Point};
use rand::Rng;

/// Live pellets in insertion order.
#[derive(Debug)]
pub struct FoodField {
    items: Vec<Food>,
    next_id: u64,
    width: f64,
    height: f64,
    radius: f64,
}

impl FoodField {
    pub fn new(width: f64, height: f64, radius: f64) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            width,
            height,
            radius,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Food] {
        &self.items
    }

    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) {
        self.items.reserve(count);
        for _ in 0..count {
            let position = random_point(rng, self.width, self.height, 0.0);
            self.insert(position);
        }
    }

    pub fn insert(&mut self, position: Point) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Food {
            id,
            x: position.x,
            y: position.y,
            radius: self.radius,
        });
        id
    }

    /// Removes and returns the newest pellet the head overlaps, if any.
    pub fn consume(&mut self, head: Point, radius: f64) -> Option<Food> {
        let index = self
            .items
            .iter()
            .rposition(|food| within(head, food.position(), radius + food.radius))?;
        Some(self.items.remove(index))
    }

    /// Tops the field back up to `target`; returns how many were spawned.
    pub fn replenish<R: Rng + ?Sized>(&mut self, rng: &mut R, target: usize) -> usize {
        let missing = target.saturating_sub(self.items.len());
        if missing > 0 {
            self.spawn(rng, missing);
        }
        missing
    }
}
