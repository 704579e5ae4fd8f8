//! Login, registration and logout.

use std::sync::Arc;

use crate::{
    domain::validation::{validate_login, validate_registration},
    error::ClientError,
    infrastructure::{
        ApiClient,
        http::dto::{LoginResponse, RegisterResponse},
    },
};

pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Log in with a username or user id; the session store receives the tokens
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let identifier = identifier.trim();
        validate_login(identifier, password)?;

        let response = self.api.login(identifier, password).await?;
        if self.api.session().access_token().is_none() {
            return Err(ClientError::NotLoggedIn);
        }
        tracing::info!(
            "Logged in as {}",
            response.username.as_deref().unwrap_or(identifier)
        );
        Ok(response)
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let username = username.trim();
        validate_registration(username, password, confirm_password)?;

        let response = self.api.register(username, password, confirm_password).await?;
        tracing::info!("Registered user {} ({})", username, response.user_id);
        Ok(response)
    }

    /// Revoke the session on the server if possible, then forget both tokens
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Err(e) = self.api.logout().await {
            tracing::warn!("Server logout failed: {}", e);
        }
        self.api.session().clear_tokens()?;
        tracing::info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ClientConfig, domain::TokenPair, session::SessionStore};
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn create_test_service(server: &MockServer) -> AuthService {
        let config = ClientConfig::new(&server.uri(), ".chatlink-test").unwrap();
        let api = ApiClient::new(config, Arc::new(SessionStore::in_memory()));
        AuthService::new(Arc::new(api))
    }

    #[tokio::test]
    async fn test_invalid_password_is_rejected_before_request() {
        // テスト項目: 形式が不正なパスワードはリクエスト前に拒否される
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let service = create_test_service(&server);

        // when (操作):
        let result = service.login("alice", "short").await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_succeeds_with_cookies() {
        // テスト項目: ログイン成功時にトークンが保存されログイン状態になる
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "access_token_cookie=A1; Max-Age=3600; Path=/")
                    .append_header("set-cookie", "refresh_token_cookie=R1; Max-Age=604800; Path=/")
                    .set_body_json(json!({"code": 0, "user_id": 5, "username": "alice"})),
            )
            .mount(&server)
            .await;
        let service = create_test_service(&server);

        // when (操作):
        let response = service.login(" alice ", "password1").await.unwrap();

        // then (期待する結果):
        assert_eq!(response.username.as_deref(), Some("alice"));
        assert_eq!(service.api.session().access_token(), Some("A1".to_string()));
        assert_eq!(service.api.session().refresh_token(), Some("R1".to_string()));
    }

    #[tokio::test]
    async fn test_registration_mismatch_is_rejected() {
        // テスト項目: 確認用パスワードが一致しない登録はリクエスト前に拒否される
        // given (前提条件):
        let server = MockServer::start().await;
        let service = create_test_service(&server);

        // when (操作):
        let result = service.register("alice", "password1", "password2").await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ClientError::Validation(
                crate::domain::ValidationError::PasswordMismatch
            ))
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_tokens_even_if_server_fails() {
        // テスト項目: サーバー側のログアウトが失敗してもローカルのトークンは削除される
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let service = create_test_service(&server);
        service
            .api
            .session()
            .store_tokens(&TokenPair {
                access_token: "A1".to_string(),
                refresh_token: "R1".to_string(),
            })
            .unwrap();

        // when (操作):
        service.logout().await.unwrap();

        // then (期待する結果):
        assert!(service.api.session().access_token().is_none());
        assert!(service.api.session().refresh_token().is_none());
    }
}
