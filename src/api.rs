mod client;
pub mod energyzero;
pub mod heartbeat;
pub mod home_assistant;
