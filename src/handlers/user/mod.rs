// handlers/user/mod.rs - Endpoints scoped to the signed-in user
//
// Every handler here resolves the caller's session itself and answers 401
// when there is none.

pub mod dashboard; // GET /api/user/dashboard

pub use dashboard::{dashboard_get, load_dashboard, DashboardError, DashboardOutcome};
