// handlers/mod.rs - HTTP handlers
//
// Public:    /health
// Session:   /api/user/* (caller identified by the session token)

pub mod health;
pub mod user;

pub use health::health;
