use super::types::Direction;
use super::world::{Intent, TickReport, World};
use crate::app::config::GameConfig;
use crate::protocol::{self, ClientMessage, ServerMessage};
use crate::shared::names::sanitize_player_name;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// One shared world plus the sessions watching it. A session's id doubles as
/// the id of the player it controls.
#[derive(Debug)]
pub struct Room {
  state: Mutex<RoomState>,
}

#[derive(Debug)]
struct RoomState {
  sessions: HashMap<String, UnboundedSender<String>>,
  world: World,
}

impl Room {
  pub fn new(config: GameConfig) -> Self {
    Self {
      state: Mutex::new(RoomState {
        sessions: HashMap::new(),
        world: World::new(config),
      }),
    }
  }

  pub async fn add_session(&self, sender: UnboundedSender<String>) -> String {
    let session_id = Uuid::new_v4().to_string();
    let mut state = self.state.lock().await;
    state.sessions.insert(session_id.clone(), sender);
    tracing::info!(session_id = %session_id, "session connected");
    session_id
  }

  pub async fn remove_session(&self, session_id: &str) {
    let mut state = self.state.lock().await;
    state.disconnect_session(session_id);
  }

  pub async fn handle_text_message(&self, session_id: &str, text: &str) {
    let Some(message) = protocol::decode_client_message(text) else { return };
    let mut state = self.state.lock().await;
    if !state.sessions.contains_key(session_id) {
      return;
    }
    match message {
      ClientMessage::Start { name } => {
        let name = sanitize_player_name(name.as_deref());
        state.world.queue(Intent::Join {
          id: session_id.to_string(),
          name,
        });
      }
      ClientMessage::Move { direction } => {
        let Some(direction) = direction.as_deref().and_then(Direction::parse) else { return };
        state.world.queue(Intent::Turn {
          id: session_id.to_string(),
          direction,
        });
      }
    }
  }

  pub async fn player_count(&self) -> usize {
    self.state.lock().await.world.players().len()
  }

  /// Drives the world at its configured rate until `shutdown` flips to true.
  /// A slow tick delays the next one; ticks never overlap.
  pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
    let period = self.state.lock().await.world.config().tick_period();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(period_ms = period.as_millis() as u64, "tick loop started");
    loop {
      tokio::select! {
        _ = interval.tick() => {
          let mut state = self.state.lock().await;
          state.tick();
        }
        changed = shutdown.changed() => {
          if changed.is_err() || *shutdown.borrow() {
            break;
          }
        }
      }
    }
    let ticks = self.state.lock().await.world.tick_count();
    tracing::info!(ticks, "tick loop stopped");
  }
}

impl RoomState {
  fn disconnect_session(&mut self, session_id: &str) {
    if self.sessions.remove(session_id).is_none() {
      return;
    }
    tracing::info!(session_id, "session disconnected");
    self.world.queue(Intent::Leave {
      id: session_id.to_string(),
    });
  }

  fn tick(&mut self) {
    let report = self.world.tick();
    self.dispatch(&report);
    self.broadcast_state();
  }

  fn dispatch(&mut self, report: &TickReport) {
    for player_id in &report.joined {
      self.send_init(player_id);
    }
    for (player_id, cause) in &report.deaths {
      if let Some(payload) = protocol::encode(&ServerMessage::GameOver(cause.to_string())) {
        self.send_to(player_id, payload);
      }
    }
    for player_id in &report.left {
      if let Some(payload) = protocol::encode(&ServerMessage::PlayerDisconnected(player_id)) {
        self.broadcast(payload, None);
      }
    }
  }

  fn send_init(&mut self, player_id: &str) {
    let Some(player) = self.world.player(player_id) else { return };
    let init = protocol::encode(&ServerMessage::Init {
      id: player_id,
      players: self.world.players(),
      foods: self.world.foods(),
      map_size: self.world.map_size(),
    });
    let announcement = protocol::encode(&ServerMessage::NewPlayer(player));
    if let Some(payload) = init {
      self.send_to(player_id, payload);
    }
    if let Some(payload) = announcement {
      self.broadcast(payload, Some(player_id));
    }
  }

  fn broadcast_state(&mut self) {
    let payload = protocol::encode(&ServerMessage::State {
      players: self.world.players(),
      foods: self.world.foods(),
    });
    if let Some(payload) = payload {
      self.broadcast(payload, None);
    }
  }

  fn send_to(&mut self, session_id: &str, payload: String) {
    let Some(sender) = self.sessions.get(session_id) else { return };
    if sender.send(payload).is_err() {
      self.disconnect_session(session_id);
    }
  }

  fn broadcast(&mut self, payload: String, except: Option<&str>) {
    let mut stale = Vec::new();
    for (session_id, sender) in &self.sessions {
      if Some(session_id.as_str()) == except {
        continue;
      }
      if sender.send(payload.clone()).is_err() {
        stale.push(session_id.clone());
      }
    }
    for session_id in stale {
      self.disconnect_session(&session_id);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::types::{Player, Point};
  use serde_json::Value;
  use tokio::sync::mpsc::{self, UnboundedReceiver};

  fn small_config() -> GameConfig {
    GameConfig {
      map_width: 2000.0,
      map_height: 2000.0,
      food_target: 5,
      ..GameConfig::default()
    }
  }

  fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(payload) = rx.try_recv() {
      out.push(serde_json::from_str(&payload).expect("json"));
    }
    out
  }

  fn of_type<'a>(messages: &'a [Value], kind: &str) -> Vec<&'a Value> {
    messages.iter().filter(|value| value["type"] == kind).collect()
  }

  #[tokio::test]
  async fn start_sends_init_to_initiator_and_announces_to_others() {
    let room = Room::new(small_config());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let a = room.add_session(tx_a).await;
    let _b = room.add_session(tx_b).await;

    room
      .handle_text_message(&a, r#"{"type":"start","name":"  "}"#)
      .await;
    room.state.lock().await.tick();

    let to_a = drain(&mut rx_a);
    let to_b = drain(&mut rx_b);
    let init = of_type(&to_a, "init");
    assert_eq!(init.len(), 1);
    assert_eq!(init[0]["data"]["id"], a.as_str());
    assert_eq!(init[0]["data"]["mapSize"]["height"], 2000.0);
    assert_eq!(init[0]["data"]["foods"].as_array().map(Vec::len), Some(5));
    assert!(init[0]["data"]["players"][a.as_str()]["name"]
      .as_str()
      .expect("name")
      .starts_with("Guest-"));
    assert!(of_type(&to_a, "newPlayer").is_empty());
    assert_eq!(of_type(&to_b, "newPlayer").len(), 1);
    assert!(of_type(&to_b, "init").is_empty());
    assert_eq!(of_type(&to_a, "state").len(), 1);
    assert_eq!(of_type(&to_b, "state").len(), 1);
  }

  #[tokio::test]
  async fn invalid_moves_are_ignored() {
    let room = Room::new(small_config());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = room.add_session(tx).await;
    room.handle_text_message(&id, r#"{"type":"start","name":"Ana"}"#).await;
    room.state.lock().await.tick();

    room.handle_text_message(&id, r#"{"type":"move","direction":"left"}"#).await;
    room.handle_text_message(&id, r#"{"type":"move","direction":"sideways"}"#).await;
    room.handle_text_message(&id, "{broken").await;
    room.state.lock().await.tick();

    let state = room.state.lock().await;
    let player = state.world.player(&id).expect("player");
    assert_eq!(player.direction, Direction::Right);
    drop(state);
    assert!(!drain(&mut rx).is_empty());
  }

  #[tokio::test]
  async fn death_sends_game_over_only_to_victim() {
    let room = Room::new(small_config());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let a = room.add_session(tx_a).await;
    let _b = room.add_session(tx_b).await;
    room.handle_text_message(&a, r#"{"type":"start","name":"Ana"}"#).await;
    room.state.lock().await.tick();
    drain(&mut rx_a);
    drain(&mut rx_b);

    room.handle_text_message(&a, r#"{"type":"move","direction":"up"}"#).await;
    let mut died = false;
    for _ in 0..500 {
      room.state.lock().await.tick();
      if room.state.lock().await.world.player(&a).is_none() {
        died = true;
        break;
      }
    }
    assert!(died);

    let to_a = drain(&mut rx_a);
    let game_over = of_type(&to_a, "gameOver");
    assert_eq!(game_over.len(), 1);
    assert!(game_over[0]["data"].as_str().expect("reason").contains("wall"));
    assert!(of_type(&drain(&mut rx_b), "gameOver").is_empty());
    let last_state = of_type(&to_a, "state").pop().expect("state");
    assert!(last_state["data"]["players"].get(a.as_str()).is_none());
  }

  #[tokio::test]
  async fn equal_head_on_sends_game_over_to_both() {
    let room = Room::new(small_config());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let a = room.add_session(tx_a).await;
    let b = room.add_session(tx_b).await;
    {
      let mut state = room.state.lock().await;
      for (id, name, direction, x) in [
        (&a, "Ana", Direction::Right, 500.0),
        (&b, "Bo", Direction::Left, 510.0),
      ] {
        state.world.place(Player {
          id: id.clone(),
          name: name.to_string(),
          direction,
          body: vec![Point::new(x, 500.0)],
          score: 0,
          alive: true,
        });
      }
      state.tick();
    }

    for (rx, other) in [(&mut rx_a, "Bo"), (&mut rx_b, "Ana")] {
      let messages = drain(rx);
      let game_over = of_type(&messages, "gameOver");
      assert_eq!(game_over.len(), 1);
      let reason = game_over[0]["data"].as_str().expect("reason");
      assert!(reason.contains(&format!("collided with {other}")));
      let state = of_type(&messages, "state").pop().expect("state");
      assert!(state["data"]["players"].get(a.as_str()).is_none());
      assert!(state["data"]["players"].get(b.as_str()).is_none());
    }
  }

  #[tokio::test]
  async fn disconnect_removes_player_on_next_tick() {
    let room = Room::new(small_config());
    let (tx_a, rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let a = room.add_session(tx_a).await;
    let _b = room.add_session(tx_b).await;
    room.handle_text_message(&a, r#"{"type":"start","name":"Ana"}"#).await;
    room.state.lock().await.tick();
    assert_eq!(room.player_count().await, 1);
    drain(&mut rx_b);

    drop(rx_a);
    room.remove_session(&a).await;
    assert_eq!(room.player_count().await, 1);
    room.state.lock().await.tick();
    assert_eq!(room.player_count().await, 0);

    let to_b = drain(&mut rx_b);
    let left = of_type(&to_b, "playerDisconnected");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0]["data"], a.as_str());
  }

  #[tokio::test]
  async fn run_stops_on_shutdown() {
    let room = Arc::new(Room::new(small_config()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(Arc::clone(&room).run(shutdown_rx));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    shutdown_tx.send(true).expect("send");
    task.await.expect("join");
    assert!(room.state.lock().await.world.tick_count() >= 1);
  }
}
