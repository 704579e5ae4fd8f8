//! Profile editing.

use std::sync::Arc;

use crate::{
    domain::validation::{validate_new_username, validate_password_change},
    error::ClientError,
    infrastructure::ApiClient,
};

pub struct ProfileService {
    api: Arc<ApiClient>,
}

impl ProfileService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Rename the current user; returns the server's message
    pub async fn update_username(&self, new_username: &str) -> Result<String, ClientError> {
        let new_username = validate_new_username(new_username)?;
        let msg = self.api.update_username(&new_username).await?;
        tracing::info!("Username changed to {}", new_username);
        Ok(msg)
    }

    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<String, ClientError> {
        validate_password_change(current_password, new_password)?;
        let msg = self
            .api
            .update_password(current_password, new_password)
            .await?;
        tracing::info!("Password changed");
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ClientConfig, domain::TokenPair, session::SessionStore};
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    fn create_test_service(server: &MockServer) -> ProfileService {
        let config = ClientConfig::new(&server.uri(), ".chatlink-test").unwrap();
        let session = Arc::new(SessionStore::in_memory());
        session
            .store_tokens(&TokenPair {
                access_token: "A1".to_string(),
                refresh_token: "R1".to_string(),
            })
            .unwrap();
        ProfileService::new(Arc::new(ApiClient::new(config, session)))
    }

    #[tokio::test]
    async fn test_blank_username_is_rejected_before_request() {
        // テスト項目: 空白だけの新しいユーザー名はリクエスト前に拒否される
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/center/update-username"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let service = create_test_service(&server);

        // when (操作):
        let result = service.update_username("   ").await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn test_username_is_sent_trimmed() {
        // テスト項目: 新しいユーザー名は前後の空白を除いて送信される
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/center/update-username"))
            .and(body_json(json!({"newUsername": "bob"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 0, "msg": "Username updated"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let service = create_test_service(&server);

        // when (操作):
        let msg = service.update_username(" bob ").await.unwrap();

        // then (期待する結果):
        assert_eq!(msg, "Username updated");
    }

    #[tokio::test]
    async fn test_empty_current_password_is_rejected_before_request() {
        // テスト項目: 現在のパスワードが空の場合はリクエスト前に拒否される
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/center/update-password"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let service = create_test_service(&server);

        // when (操作):
        let result = service.update_password("", "password2").await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn test_password_change_succeeds() {
        // テスト項目: 正しい入力のパスワード変更はサーバーのメッセージを返す
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/center/update-password"))
            .and(body_json(
                json!({"currentPassword": "password1", "newPassword": "password2"}),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 0, "msg": "Password updated"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let service = create_test_service(&server);

        // when (操作):
        let msg = service.update_password("password1", "password2").await.unwrap();

        // then (期待する結果):
        assert_eq!(msg, "Password updated");
    }
}
