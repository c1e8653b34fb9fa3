use super::collision::{evaluate, DeathCause, SnakeView};
use super::food::FoodField;
use super::snake::{advance, finish_move, set_direction, spawn_player, speed_for};
use super::types::{is_opposite, Direction, Food, MapSize, Player};
use crate::app::config::GameConfig;
use std::collections::BTreeMap;

/// Inbound changes queued by sessions and applied at the next tick boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
  Join { id: String, name: String },
  Turn { id: String, direction: Direction },
  Leave { id: String },
}

#[derive(Debug, Default)]
pub struct TickReport {
  pub joined: Vec<String>,
  pub left: Vec<String>,
  pub deaths: Vec<(String, DeathCause)>,
  pub food_eaten: usize,
}

/// Authoritative players and food. Only `tick` changes them.
#[derive(Debug)]
pub struct World {
  config: GameConfig,
  players: BTreeMap<String, Player>,
  food: FoodField,
  intents: Vec<Intent>,
  tick_count: u64,
}

impl World {
  pub fn new(config: GameConfig) -> Self {
    let mut food = FoodField::new(config.map_width, config.map_height, config.food_radius);
    food.spawn(&mut rand::thread_rng(), config.food_target);
    Self {
      config,
      players: BTreeMap::new(),
      food,
      intents: Vec::new(),
      tick_count: 0,
    }
  }

  pub fn config(&self) -> &GameConfig {
    &self.config
  }

  pub fn players(&self) -> &BTreeMap<String, Player> {
    &self.players
  }

  pub fn player(&self, id: &str) -> Option<&Player> {
    self.players.get(id)
  }

  pub fn foods(&self) -> &[Food] {
    self.food.items()
  }

  pub fn map_size(&self) -> MapSize {
    MapSize {
      width: self.config.map_width,
      height: self.config.map_height,
    }
  }

  pub fn tick_count(&self) -> u64 {
    self.tick_count
  }

  pub fn queue(&mut self, intent: Intent) {
    self.intents.push(intent);
  }

  pub fn tick(&mut self) -> TickReport {
    let mut report = TickReport::default();
    self.tick_count += 1;
    let joins = self.apply_intents(&mut report);

    let mut broken: Vec<String> = Vec::new();
    for player in self.players.values_mut() {
      let speed = speed_for(player, &self.config);
      let Some(head) = advance(player, speed) else {
        broken.push(player.id.clone());
        continue;
      };
      let ate = self.food.consume(head, self.config.segment_radius).is_some();
      finish_move(player, ate);
      if ate {
        player.score += 1;
        report.food_eaten += 1;
        tracing::debug!(player_id = %player.id, score = player.score, "food eaten");
      }
    }

    let verdicts = {
      let views: Vec<SnakeView<'_>> = self
        .players
        .values()
        .filter(|player| !broken.contains(&player.id))
        .map(|player| SnakeView {
          id: &player.id,
          name: &player.name,
          score: player.score,
          body: &player.body,
        })
        .collect();
      evaluate(&views, &self.config)
    };

    for (id, amount) in &verdicts.gains {
      if let Some(player) = self.players.get_mut(id) {
        player.score += amount;
      }
    }

    let deaths = broken
      .into_iter()
      .map(|id| (id, DeathCause::InvalidState))
      .chain(verdicts.deaths);
    for (id, cause) in deaths {
      let Some(player) = self.players.get_mut(&id) else { continue };
      player.alive = false;
      if cause == DeathCause::InvalidState {
        tracing::warn!(player_id = %id, "removing player with invalid state");
      } else {
        tracing::debug!(player_id = %id, name = %player.name, cause = %cause, "player died");
      }
      report.deaths.push((id, cause));
    }

    self.players.retain(|_, player| player.alive);
    self.spawn_joiners(joins, &mut report);
    self.food.replenish(&mut rand::thread_rng(), self.config.food_target);
    report
  }

  /// Applies turns and leaves in arrival order and returns the joins still
  /// pending. Every turn is checked against the direction the snake had when
  /// the tick began, so two quick turns cannot add up to a reversal.
  fn apply_intents(&mut self, report: &mut TickReport) -> Vec<(String, String)> {
    let mut joins: Vec<(String, String)> = Vec::new();
    let mut heading_at_start: BTreeMap<String, Direction> = BTreeMap::new();
    for intent in std::mem::take(&mut self.intents) {
      match intent {
        Intent::Join { id, name } => {
          if self.players.contains_key(&id) || joins.iter().any(|(pending, _)| *pending == id) {
            continue;
          }
          joins.push((id, name));
        }
        Intent::Turn { id, direction } => {
          let Some(player) = self.players.get_mut(&id) else { continue };
          let start = *heading_at_start.entry(id).or_insert(player.direction);
          if !is_opposite(start, direction) {
            set_direction(player, direction);
          }
        }
        Intent::Leave { id } => {
          joins.retain(|(pending, _)| *pending != id);
          if self.players.remove(&id).is_some() {
            tracing::info!(player_id = %id, "player left");
            report.left.push(id);
          }
        }
      }
    }
    joins
  }

  /// Joiners are placed after movement and collisions, so they always appear
  /// in the state that carries their `init`.
  fn spawn_joiners(&mut self, joins: Vec<(String, String)>, report: &mut TickReport) {
    let mut rng = rand::thread_rng();
    for (id, name) in joins {
      let player = spawn_player(&mut rng, id.clone(), name, &self.config);
      tracing::info!(player_id = %id, name = %player.name, "player joined");
      self.players.insert(id.clone(), player);
      report.joined.push(id);
    }
  }

  #[cfg(test)]
  pub(crate) fn place(&mut self, player: Player) {
    self.players.insert(player.id.clone(), player);
  }
}
