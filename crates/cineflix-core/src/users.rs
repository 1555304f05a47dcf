use chrono::Utc;
use cineflix_models::{User, UserId, UserProfile};
use std::sync::Arc;
use tracing::info;
use crate::auth::hash_password;
use crate::error::{CoreError, Result};
use crate::store::UserStore;

/// Emails are unique regardless of case
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') => Ok(()),
        _ => Err(CoreError::InvalidInput(format!("'{}' is not a valid email address", email))),
    }
}

/// Account directory: sign-up, listing and removal
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn create_user(&self, name: &str, email: &str, password: &str) -> Result<UserProfile> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() {
            return Err(CoreError::InvalidInput("Name must not be empty".to_string()));
        }
        validate_email(&email)?;
        if password.is_empty() {
            return Err(CoreError::InvalidInput("Password must not be empty".to_string()));
        }

        let user = User {
            id: UserId::new(),
            name: name.to_string(),
            email,
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        let profile = user.profile();

        if !self.store.insert(user).await? {
            return Err(CoreError::InvalidInput("User already created".to_string()));
        }

        info!(user_id = %profile.id, "User created");
        Ok(profile)
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>> {
        Ok(self.store.all().await?.iter().map(User::profile).collect())
    }

    pub async fn find_user(&self, id: &UserId) -> Result<UserProfile> {
        self.store
            .get(id)
            .await?
            .map(|user| user.profile())
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<UserProfile> {
        self.store
            .find_by_email(&normalize_email(email))
            .await?
            .map(|user| user.profile())
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))
    }

    /// Replace the password of the account registered under `email`
    pub async fn set_password(&self, email: &str, password: &str) -> Result<UserProfile> {
        if password.is_empty() {
            return Err(CoreError::InvalidInput("Password must not be empty".to_string()));
        }
        let mut user = self
            .store
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))?;

        user.password_hash = hash_password(password)?;
        let profile = user.profile();
        if !self.store.update(user).await? {
            return Err(CoreError::NotFound("User not found".to_string()));
        }

        info!(user_id = %profile.id, "Password changed");
        Ok(profile)
    }

    /// Remove the account. Reviews it authored stay in their aggregates.
    pub async fn delete_user(&self, id: &UserId) -> Result<()> {
        if !self.store.remove(id).await? {
            return Err(CoreError::NotFound("User not found".to_string()));
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::store::JsonUserStore;

    fn service() -> UserService {
        UserService::new(Arc::new(JsonUserStore::in_memory()))
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let service = service();
        let profile = service.create_user("Ada", " Ada@Example.com ", "pw").await.unwrap();
        assert_eq!(profile.email, "ada@example.com");

        let users = service.list_users().await.unwrap();
        assert_eq!(users, vec![profile.clone()]);
        assert_eq!(service.find_by_email("ADA@example.com").await.unwrap().id, profile.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_case_insensitive() {
        let service = service();
        service.create_user("Ada", "ada@example.com", "pw").await.unwrap();

        let err = service.create_user("Other", "ADA@example.com", "pw2").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert_eq!(err.to_string(), "User already created");
    }

    #[tokio::test]
    async fn test_create_validation() {
        let service = service();
        for (name, email, password) in [
            ("", "a@example.com", "pw"),
            ("Ada", "not-an-email", "pw"),
            ("Ada", "@example.com", "pw"),
            ("Ada", "a@example.com", ""),
        ] {
            let err = service.create_user(name, email, password).await.unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput(_)), "{} {}", name, email);
        }
    }

    #[tokio::test]
    async fn test_set_password() {
        let store = Arc::new(JsonUserStore::in_memory());
        let service = UserService::new(store.clone());
        let profile = service.create_user("Ada", "ada@example.com", "old-pw").await.unwrap();

        let changed = service.set_password("ADA@example.com", "new-pw").await.unwrap();
        assert_eq!(changed.id, profile.id);

        let stored = store.get(&profile.id).await.unwrap().unwrap();
        assert!(verify_password("new-pw", &stored.password_hash));
        assert!(!verify_password("old-pw", &stored.password_hash));

        assert!(matches!(
            service.set_password("nobody@example.com", "pw").await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            service.set_password("ada@example.com", "").await,
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let service = service();
        let profile = service.create_user("Ada", "ada@example.com", "pw").await.unwrap();

        service.delete_user(&profile.id).await.unwrap();
        assert!(matches!(service.delete_user(&profile.id).await, Err(CoreError::NotFound(_))));
        assert!(matches!(service.find_user(&profile.id).await, Err(CoreError::NotFound(_))));
        assert!(service.list_users().await.unwrap().is_empty());
    }
}
