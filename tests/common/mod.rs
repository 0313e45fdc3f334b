#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use curriculum_api::{
    app,
    auth::{issue_session_token, JwtSessionProvider, SessionClaims},
    config::AppConfig,
    database::{Curriculum, DatabaseError, PersonalInfo, User, UserQuery, UserStore},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub const SECRET: &str = "integration-secret";
pub const COOKIE: &str = "session-token";

/// Users and curriculums kept as separate tables, joined on lookup the way
/// the relational store does.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Vec<User>,
    curriculums: Vec<Curriculum>,
    calls: Arc<AtomicUsize>,
}

impl MemoryUserStore {
    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_curriculum(mut self, curriculum: Curriculum) -> Self {
        self.curriculums.push(curriculum);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_user(&self, query: &UserQuery) -> Result<Option<User>, DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(mut user) = self.users.iter().find(|u| u.email == query.email).cloned() else {
            return Ok(None);
        };

        user.curriculums = match &query.curriculums {
            Some(include) => {
                let mut owned: Vec<Curriculum> = self
                    .curriculums
                    .iter()
                    .filter(|c| c.user_id == user.id)
                    .cloned()
                    .map(|mut c| {
                        if !include.personal_info {
                            c.personal_info = None;
                        }
                        c
                    })
                    .collect();
                // Only the dashboard ordering is ever requested
                if !include.order_by.is_empty() {
                    owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                }
                owned
            }
            None => Vec::new(),
        };

        Ok(Some(user))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Store whose every call fails with the given message.
#[derive(Clone)]
pub struct FailingUserStore {
    pub message: String,
    calls: Arc<AtomicUsize>,
}

impl FailingUserStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl UserStore for FailingUserStore {
    async fn find_user(&self, _query: &UserQuery) -> Result<Option<User>, DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DatabaseError::Sqlx(sqlx::Error::Protocol(self.message.clone())))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Err(DatabaseError::Sqlx(sqlx::Error::Protocol(self.message.clone())))
    }
}

pub struct PanickingUserStore;

#[async_trait]
impl UserStore for PanickingUserStore {
    async fn find_user(&self, _query: &UserQuery) -> Result<Option<User>, DatabaseError> {
        panic!("connection state corrupted")
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn user(id: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        name: Some(format!("User {}", id)),
        email: email.to_string(),
        email_verified: None,
        image: None,
        created_at: at(2023, 12, 1),
        updated_at: at(2023, 12, 1),
        curriculums: Vec::new(),
    }
}

pub fn curriculum(id: &str, user_id: &str, updated_at: DateTime<Utc>, full_name: Option<&str>) -> Curriculum {
    Curriculum {
        id: id.to_string(),
        user_id: user_id.to_string(),
        title: format!("Curriculum {}", id),
        template: Some("modern".to_string()),
        created_at: at(2023, 12, 15),
        updated_at,
        personal_info: full_name.map(|name| PersonalInfo {
            id: format!("pi-{}", id),
            curriculum_id: id.to_string(),
            full_name: name.to_string(),
            email: None,
            phone: None,
            location: None,
            linkedin: None,
            website: None,
            summary: None,
        }),
    }
}

pub fn token(email: Option<&str>) -> String {
    let claims = SessionClaims::new("session-user", email.map(str::to_string), None, 1).expect("claims");
    issue_session_token(&claims, SECRET).expect("sign token")
}

pub fn router(users: impl UserStore + 'static) -> Router {
    router_with_secret(users, SECRET)
}

pub fn router_with_secret(users: impl UserStore + 'static, secret: &str) -> Router {
    let state = AppState::new(JwtSessionProvider::new(secret, COOKIE), users);
    app(state, &AppConfig::development())
}

pub async fn send(router: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = serde_json::from_slice(&bytes)?;
    Ok((status, body))
}

pub async fn get(router: Router, uri: &str, bearer: Option<&str>) -> Result<(StatusCode, Value)> {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    send(router, request.body(Body::empty())?).await
}

/// Records every event's level and message while installed.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<(Level, String)>>>);

impl CapturedLogs {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn count(&self, level: Level, message: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, m)| *l == level && m == message)
            .count()
    }

    pub fn count_level(&self, level: Level) -> usize {
        self.0.lock().unwrap().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push((*event.metadata().level(), visitor.0));
    }
}
