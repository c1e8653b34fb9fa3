use crate::game::constants::GUEST_NAME_PREFIX;
use rand::Rng;

pub const MAX_PLAYER_NAME_LENGTH: usize = 20;

pub fn sanitize_player_name(name: Option<&str>) -> String {
    let cleaned = name
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        return guest_name(&mut rand::thread_rng());
    }
    cleaned.chars().take(MAX_PLAYER_NAME_LENGTH).collect()
}

pub fn guest_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{GUEST_NAME_PREFIX}-{:04}", rng.gen_range(0..10_000))
}
