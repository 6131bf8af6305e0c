//! Users API
//!
//! Endpoint-level operations on top of `Transport`. Read failures are
//! returned as classified; write failures are wrapped in `Create`, `Update`
//! or `Delete` so callers never see bare transport errors for mutations.
//!
//! The backing API only simulates creation: a create answers with an id but
//! nothing is stored server-side. When the answer carries no id a
//! client-side one is taken from `fallback_id`.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{UserDraft, UserRecord};
use crate::transport::{ApiError, ApiResult, Transport};

/// Collection endpoint
pub const USERS_ENDPOINT: &str = "/users";

/// Single-user endpoint template
pub const USER_BY_ID_ENDPOINT: &str = "/users/{id}";

/// Expand the single-user endpoint template
pub fn user_endpoint(id: i64) -> String {
    USER_BY_ID_ENDPOINT.replace("{id}", &id.to_string())
}

static LAST_FALLBACK_ID: AtomicI64 = AtomicI64::new(0);

/// Client-side id for records the server did not number
///
/// Current time in milliseconds, bumped when needed so successive calls
/// are strictly increasing.
pub fn fallback_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_FALLBACK_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_FALLBACK_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Typed client for the `/users` resource
#[derive(Clone)]
pub struct UsersApi {
    transport: Transport,
}

impl UsersApi {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fetch the full collection
    pub async fn get_users(&self) -> ApiResult<Vec<UserRecord>> {
        let value = self.transport.get(USERS_ENDPOINT).await?;
        serde_json::from_value(value).map_err(ApiError::decode)
    }

    /// Fetch one user
    pub async fn get_user_by_id(&self, id: i64) -> ApiResult<UserRecord> {
        let value = self.transport.get(&user_endpoint(id)).await?;
        serde_json::from_value(value).map_err(ApiError::decode)
    }

    /// Create a user
    ///
    /// The returned record is the submitted draft numbered with the
    /// server's id, or with `fallback_id()` when the response has none.
    pub async fn create_user(&self, draft: &UserDraft) -> ApiResult<UserRecord> {
        let result = async {
            let body = serde_json::to_value(draft).map_err(ApiError::decode)?;
            self.transport.post(USERS_ENDPOINT, body).await
        }
        .await;

        match result {
            Ok(response) => {
                let id = match response.get("id").and_then(Value::as_i64) {
                    Some(id) => id,
                    None => {
                        let id = fallback_id();
                        info!(id, "Create response had no id, using client-side id");
                        id
                    }
                };
                Ok(draft.clone().into_record(id))
            }
            Err(e) => {
                warn!(error = %e, "Error creating user");
                Err(ApiError::Create { source: Box::new(e) })
            }
        }
    }

    /// Update a user
    ///
    /// The response body is not trusted; the submitted draft is returned
    /// under the requested id.
    pub async fn update_user(&self, id: i64, draft: &UserDraft) -> ApiResult<UserRecord> {
        let result = async {
            let body = serde_json::to_value(draft).map_err(ApiError::decode)?;
            self.transport.put(&user_endpoint(id), body).await
        }
        .await;

        match result {
            Ok(_) => Ok(draft.clone().into_record(id)),
            Err(e) => {
                warn!(id, error = %e, "Error updating user");
                Err(ApiError::Update {
                    id,
                    source: Box::new(e),
                })
            }
        }
    }

    /// Delete a user, returning its id
    pub async fn delete_user(&self, id: i64) -> ApiResult<i64> {
        match self.transport.delete(&user_endpoint(id)).await {
            Ok(_) => Ok(id),
            Err(e) => {
                warn!(id, error = %e, "Error deleting user");
                Err(ApiError::Delete {
                    id,
                    source: Box::new(e),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserForm;
    use crate::transport::mock::FakeDirectory;
    use crate::transport::{AttemptError, ErrorKind, Method, RetryPolicy};
    use std::sync::Arc;
    use std::time::Duration;

    fn api(dir: Arc<FakeDirectory>) -> UsersApi {
        UsersApi::new(
            Transport::new(dir).with_retry(RetryPolicy::linear(1, Duration::ZERO)),
        )
    }

    fn seed() -> Vec<UserRecord> {
        vec![
            UserRecord::new(1, "Leanne Graham", "Bret", "Sincere@april.biz"),
            UserRecord::new(2, "Ervin Howell", "Antonette", "Shanna@melissa.tv"),
        ]
    }

    fn draft() -> UserDraft {
        UserForm {
            first_name: "John".into(),
            last_name: "Doe".into(),
            username: "jdoe".into(),
            email: "john@example.com".into(),
            ..UserForm::default()
        }
        .to_draft()
    }

    #[test]
    fn test_user_endpoint() {
        assert_eq!(user_endpoint(42), "/users/42");
    }

    #[test]
    fn test_fallback_ids_increase() {
        let before = Utc::now().timestamp_millis();
        let a = fallback_id();
        let b = fallback_id();
        assert!(a >= before);
        assert!(b > a);
    }

    #[tokio::test]
    async fn test_get_users() {
        let users = api(Arc::new(FakeDirectory::new(seed()))).get_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].username, "Antonette");
    }

    #[tokio::test]
    async fn test_get_user_by_id_propagates_classified_error() {
        let err = api(Arc::new(FakeDirectory::new(seed())))
            .get_user_by_id(99)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unknown { .. }));
    }

    #[tokio::test]
    async fn test_create_uses_server_id() {
        let created = api(Arc::new(FakeDirectory::new(seed())))
            .create_user(&draft())
            .await
            .unwrap();
        assert_eq!(created.id, 3);
        assert_eq!(created.name, "John Doe");
    }

    #[tokio::test]
    async fn test_create_falls_back_to_client_id() {
        let dir = Arc::new(FakeDirectory::new(seed()));
        dir.set_created_id(None);

        let before = Utc::now().timestamp_millis();
        let created = api(dir).create_user(&draft()).await.unwrap();
        assert!(created.id >= before);
    }

    #[tokio::test]
    async fn test_create_failure_is_wrapped() {
        let dir = Arc::new(FakeDirectory::new(seed()));
        dir.fail_next(Method::Post, AttemptError::Network("down".into()));

        let err = api(dir).create_user(&draft()).await.unwrap_err();
        assert!(matches!(err, ApiError::Create { .. }));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_update_returns_requested_id() {
        let updated = api(Arc::new(FakeDirectory::new(seed())))
            .update_user(2, &draft())
            .await
            .unwrap();
        assert_eq!(updated.id, 2);
        assert_eq!(updated.username, "jdoe");
    }

    #[tokio::test]
    async fn test_update_and_delete_failures_are_wrapped() {
        let api = api(Arc::new(FakeDirectory::new(seed())));

        let err = api.update_user(99, &draft()).await.unwrap_err();
        assert!(matches!(err, ApiError::Update { id: 99, .. }));

        let err = api.delete_user(99).await.unwrap_err();
        assert!(matches!(err, ApiError::Delete { id: 99, .. }));

        assert_eq!(api.delete_user(1).await.unwrap(), 1);
    }
}
