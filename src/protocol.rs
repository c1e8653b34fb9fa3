use crate::game::types::{Food, MapSize, Player};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
  Start { name: Option<String> },
  Move { direction: Option<String> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage<'a> {
  Init {
    id: &'a str,
    players: &'a BTreeMap<String, Player>,
    foods: &'a [Food],
    #[serde(rename = "mapSize")]
    map_size: MapSize,
  },
  NewPlayer(&'a Player),
  PlayerDisconnected(&'a str),
  State {
    players: &'a BTreeMap<String, Player>,
    foods: &'a [Food],
  },
  GameOver(String),
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
  serde_json::from_str(text).ok()
}

pub fn encode(message: &ServerMessage<'_>) -> Option<String> {
  match serde_json::to_string(message) {
    Ok(payload) => Some(payload),
    Err(error) => {
      tracing::warn!(?error, "failed to encode server message");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::types::{Direction, Point};
  use serde_json::Value;

  #[test]
  fn decode_start_and_move() {
    match decode_client_message(r#"{"type":"start","name":"Ana"}"#) {
      Some(ClientMessage::Start { name }) => assert_eq!(name.as_deref(), Some("Ana")),
      other => panic!("unexpected message {other:?}"),
    }
    match decode_client_message(r#"{"type":"start"}"#) {
      Some(ClientMessage::Start { name }) => assert!(name.is_none()),
      other => panic!("unexpected message {other:?}"),
    }
    match decode_client_message(r#"{"type":"move","direction":"up"}"#) {
      Some(ClientMessage::Move { direction }) => assert_eq!(direction.as_deref(), Some("up")),
      other => panic!("unexpected message {other:?}"),
    }
  }

  #[test]
  fn decode_rejects_garbage() {
    assert!(decode_client_message("not json").is_none());
    assert!(decode_client_message(r#"{"type":"teleport"}"#).is_none());
    assert!(decode_client_message(r#"{"type":"move","direction":7}"#).is_none());
  }

  #[test]
  fn init_payload_shape() {
    let player = Player {
      id: "p1".to_string(),
      name: "Ana".to_string(),
      direction: Direction::Right,
      body: vec![Point::new(1.0, 2.0)],
      score: 3,
      alive: true,
    };
    let mut players = BTreeMap::new();
    players.insert(player.id.clone(), player);
    let foods = [Food {
      id: 9,
      x: 4.0,
      y: 5.0,
      radius: 5.0,
    }];
    let payload = encode(&ServerMessage::Init {
      id: "p1",
      players: &players,
      foods: &foods,
      map_size: MapSize {
        width: 100.0,
        height: 50.0,
      },
    })
    .expect("payload");

    let value: Value = serde_json::from_str(&payload).expect("json");
    assert_eq!(value["type"], "init");
    assert_eq!(value["data"]["id"], "p1");
    assert_eq!(value["data"]["mapSize"]["width"], 100.0);
    assert_eq!(value["data"]["players"]["p1"]["direction"], "right");
    assert_eq!(value["data"]["players"]["p1"]["body"][0]["y"], 2.0);
    assert_eq!(value["data"]["foods"][0]["radius"], 5.0);
  }

  #[test]
  fn game_over_and_disconnect_carry_plain_values() {
    let payload = encode(&ServerMessage::GameOver("You hit the wall!".to_string())).expect("payload");
    let value: Value = serde_json::from_str(&payload).expect("json");
    assert_eq!(value["type"], "gameOver");
    assert_eq!(value["data"], "You hit the wall!");

    let payload = encode(&ServerMessage::PlayerDisconnected("p9")).expect("payload");
    let value: Value = serde_json::from_str(&payload).expect("json");
    assert_eq!(value["type"], "playerDisconnected");
    assert_eq!(value["data"], "p9");
  }
}
