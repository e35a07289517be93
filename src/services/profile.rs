//! User profile store, keyed by the identity's user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::future::Future;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("invalid profile update: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error("profile query failed: {0}")]
    Database(#[from] sqlx::Error),
}

pub trait ProfileStore {
    fn fetch(&self, user_id: &str) -> impl Future<Output = Result<Option<UserProfile>, ProfileError>> + Send;
    /// Creates the row when it does not exist yet, otherwise updates it.
    fn upsert(&self, user_id: &str, update: &ProfileUpdate) -> impl Future<Output = Result<UserProfile, ProfileError>> + Send;
}

/// Reads a profile, treating store faults as "no profile".
pub async fn fetch_profile<S: ProfileStore>(store: &S, user_id: &str) -> Option<UserProfile> {
    match store.fetch(user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(%user_id, error = %e, "failed to fetch user profile");
            None
        }
    }
}

/// Validates before touching the store.
pub async fn update_profile<S: ProfileStore>(store: &S, user_id: &str, update: &ProfileUpdate) -> Result<UserProfile, ProfileError> {
    update.validate()?;
    let profile = store.upsert(user_id, update).await?;
    tracing::info!(%user_id, "user profile saved");
    Ok(profile)
}

/// Profile store backed by the `"Users"` table.
#[derive(Clone, Debug)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

impl ProfileStore for PgProfileStore {
    async fn fetch(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"SELECT id::text AS id, name, email, phone, created_at, updated_at FROM "Users" WHERE id::text = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn upsert(&self, user_id: &str, update: &ProfileUpdate) -> Result<UserProfile, ProfileError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"INSERT INTO "Users" (id, name, email, phone, created_at, updated_at)
               VALUES ($1, $2, $3, $4, NOW(), NOW())
               ON CONFLICT (id) DO UPDATE SET
                   name = COALESCE(EXCLUDED.name, "Users".name),
                   email = COALESCE(EXCLUDED.email, "Users".email),
                   phone = COALESCE(EXCLUDED.phone, "Users".phone),
                   updated_at = NOW()
               RETURNING id::text AS id, name, email, phone, created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryProfiles(Mutex<HashMap<String, UserProfile>>);

    impl ProfileStore for MemoryProfiles {
        async fn fetch(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError> {
            Ok(self.0.lock().unwrap().get(user_id).cloned())
        }

        async fn upsert(&self, user_id: &str, update: &ProfileUpdate) -> Result<UserProfile, ProfileError> {
            let mut rows = self.0.lock().unwrap();
            let now = Utc::now();
            let row = rows.entry(user_id.to_string()).or_insert_with(|| UserProfile {
                id: user_id.to_string(), name: None, email: None, phone: None, created_at: Some(now), updated_at: None,
            });
            if let Some(name) = &update.name { row.name = Some(name.clone()); }
            if let Some(email) = &update.email { row.email = Some(email.clone()); }
            if let Some(phone) = &update.phone { row.phone = Some(phone.clone()); }
            row.updated_at = Some(now);
            Ok(row.clone())
        }
    }

    #[tokio::test]
    async fn test_update_creates_then_merges() {
        let store = MemoryProfiles::default();
        assert!(fetch_profile(&store, "u1").await.is_none());

        let created = update_profile(&store, "u1", &ProfileUpdate { name: Some("Ana".into()), ..Default::default() }).await.unwrap();
        assert_eq!(created.name.as_deref(), Some("Ana"));

        let merged = update_profile(&store, "u1", &ProfileUpdate { email: Some("ana@example.com".into()), ..Default::default() }).await.unwrap();
        assert_eq!(merged.name.as_deref(), Some("Ana"));
        assert_eq!(merged.email.as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn test_invalid_update_is_rejected_before_store() {
        let store = MemoryProfiles::default();
        let err = update_profile(&store, "u1", &ProfileUpdate { email: Some("not-an-email".into()), ..Default::default() }).await;
        assert!(matches!(err, Err(ProfileError::Invalid(_))));
        assert!(fetch_profile(&store, "u1").await.is_none());
    }
}
