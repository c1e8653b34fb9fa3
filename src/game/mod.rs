pub mod collision;
pub mod constants;
pub mod food;
pub mod math;
pub mod room;
pub mod snake;
pub mod types;
pub mod world;
