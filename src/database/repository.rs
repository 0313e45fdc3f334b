use async_trait::async_trait;
use sqlx::PgPool;
use std::time::{Duration, Instant};

use crate::config::DatabaseConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{CurriculumRow, User};
use crate::database::query::UserQuery;

/// Read access to users and the records they own.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// The user matching `query.email`, with the relations the query asks
    /// for. `Ok(None)` when no user has that email.
    async fn find_user(&self, query: &UserQuery) -> Result<Option<User>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

const USER_BY_EMAIL_SQL: &str = r#"
    SELECT "id", "name", "email", "emailVerified", "image", "createdAt", "updatedAt"
    FROM "User"
    WHERE "email" = $1
"#;

pub struct PgUserStore {
    pool: PgPool,
    slow_query_threshold: Option<Duration>,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            slow_query_threshold: None,
        }
    }

    pub fn from_config(pool: PgPool, config: &DatabaseConfig) -> Self {
        let slow_query_threshold = config
            .enable_slow_query_warning
            .then(|| Duration::from_millis(config.slow_query_threshold_ms));
        Self {
            pool,
            slow_query_threshold,
        }
    }

    fn curriculums_sql(query: &UserQuery) -> Option<String> {
        let include = query.curriculums.as_ref()?;

        let (columns, join) = if include.personal_info {
            (
                r#",
                "p"."id" AS "pi_id", "p"."fullName" AS "pi_full_name", "p"."email" AS "pi_email",
                "p"."phone" AS "pi_phone", "p"."location" AS "pi_location", "p"."linkedin" AS "pi_linkedin",
                "p"."website" AS "pi_website", "p"."summary" AS "pi_summary""#,
                r#"LEFT JOIN "PersonalInfo" "p" ON "p"."curriculumId" = "c"."id""#,
            )
        } else {
            (
                r#",
                NULL::text AS "pi_id", NULL::text AS "pi_full_name", NULL::text AS "pi_email",
                NULL::text AS "pi_phone", NULL::text AS "pi_location", NULL::text AS "pi_linkedin",
                NULL::text AS "pi_website", NULL::text AS "pi_summary""#,
                "",
            )
        };

        Some(format!(
            r#"SELECT "c"."id", "c"."userId" AS "user_id", "c"."title", "c"."template",
                "c"."createdAt" AS "created_at", "c"."updatedAt" AS "updated_at"{}
            FROM "Curriculum" "c"
            {}
            WHERE "c"."userId" = $1
            {}"#,
            columns,
            join,
            include.order_clause("c")
        ))
    }

    fn warn_if_slow(&self, email: &str, elapsed: Duration) {
        if let Some(threshold) = self.slow_query_threshold {
            if elapsed > threshold {
                tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    threshold_ms = threshold.as_millis() as u64,
                    "Slow user lookup for {}",
                    email
                );
            }
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_user(&self, query: &UserQuery) -> Result<Option<User>, DatabaseError> {
        let started = Instant::now();

        let user = sqlx::query_as::<_, User>(USER_BY_EMAIL_SQL)
            .bind(&query.email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut user) = user else {
            self.warn_if_slow(&query.email, started.elapsed());
            return Ok(None);
        };

        if let Some(sql) = Self::curriculums_sql(query) {
            let with_personal_info = query.curriculums.as_ref().is_some_and(|i| i.personal_info);
            // Scoped by the user's own id, never by anything the caller supplied
            let rows = sqlx::query_as::<_, CurriculumRow>(&sql)
                .bind(&user.id)
                .fetch_all(&self.pool)
                .await?;
            user = attach_curriculums(user, rows, with_personal_info);
        }

        self.warn_if_slow(&query.email, started.elapsed());
        tracing::debug!(
            user_id = %user.id,
            curriculums = user.curriculums.len(),
            "Loaded user"
        );
        Ok(Some(user))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Hang the fetched rows off `user`, keeping the order the query produced.
/// Rows owned by anyone else are dropped.
fn attach_curriculums(mut user: User, rows: Vec<CurriculumRow>, with_personal_info: bool) -> User {
    user.curriculums = rows
        .into_iter()
        .filter(|row| {
            let owned = row.user_id == user.id;
            if !owned {
                tracing::warn!(curriculum_id = %row.id, user_id = %user.id, "Skipping curriculum owned by another user");
            }
            owned
        })
        .map(|row| row.into_curriculum(with_personal_info))
        .collect();
    user
}
