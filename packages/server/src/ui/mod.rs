//! WebSocket / HTTP surface of the room session manager.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
