//! Thin REST wrapper.
//!
//! Every request carries the origin's live cookies and, when an access token
//! is stored, an `Authorization: Bearer` header. `Set-Cookie` response headers
//! are written back to the session store. Authorized calls answered with
//! HTTP 401/422 refresh the access token once and retry once.

pub mod dto;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    Method,
    header::{AUTHORIZATION, COOKIE, SET_COOKIE},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    config::ClientConfig,
    domain::{HistoryEntry, HistorySource, RoomRef, TokenPair, TokenRefresher, UserId},
    error::ClientError,
    session::SessionStore,
};

use dto::{
    ApiStatus, DeleteFriendRequest, FriendAction, FriendRequestsResponse, FriendTarget,
    FriendsResponse, GroupMatch, GroupSearchResponse, HandleFriendRequest, HandleFriendResponse,
    HistoryResponse, LoginRequest, LoginResponse, RefreshResponse, RegisterRequest,
    RegisterResponse, RoomSummary, RoomTarget, RoomsResponse, UpdatePasswordRequest,
    UpdateUsernameRequest, UserSummary, UsersResponse,
};

/// Statuses that mean the presented credential was rejected
fn is_auth_rejection_status(status: u16) -> bool {
    status == 401 || status == 422
}

struct ApiRequest<'a> {
    method: Method,
    path: &'a str,
    query: Vec<(&'a str, String)>,
    body: Option<Value>,
}

impl<'a> ApiRequest<'a> {
    fn get(path: &'a str) -> Self {
        Self {
            method: Method::GET,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    fn post(path: &'a str, body: Value) -> Self {
        Self {
            method: Method::POST,
            path,
            query: Vec::new(),
            body: Some(body),
        }
    }

    fn query(mut self, key: &'a str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }
}

#[derive(Debug)]
struct ApiResponse {
    status: u16,
    body: Value,
}

impl ApiResponse {
    /// 401/422 from the token layer; an application `code` means the handler itself refused
    fn is_credential_rejection(&self) -> bool {
        let has_app_code = self
            .body
            .get("code")
            .and_then(Value::as_i64)
            .is_some_and(|code| code != 0);
        is_auth_rejection_status(self.status) && !has_app_code
    }

    /// Check the `{code, msg}` envelope and the status, then decode the body
    fn decode<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let status: ApiStatus = serde_json::from_value(self.body.clone()).unwrap_or_default();
        if status.code != 0 {
            return Err(ClientError::Application {
                code: status.code,
                msg: status
                    .msg
                    .unwrap_or_else(|| format!("Request failed with HTTP {}", self.status)),
            });
        }
        if !(200..300).contains(&self.status) {
            return Err(ClientError::Status {
                status: self.status,
            });
        }
        Ok(serde_json::from_value(self.body)?)
    }
}

/// REST client bound to one server origin and one session store
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Arc<SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    async fn execute(
        &self,
        request: &ApiRequest<'_>,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.config.endpoint(request.path)?;
        let mut builder = self.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookies) = self
            .session
            .cookie_header(request.path, self.config.is_https())
        {
            builder = builder.header(COOKIE, cookies);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        tracing::debug!("{} {} -> {}", request.method, request.path, status);

        for header in response.headers().get_all(SET_COOKIE) {
            match header.to_str() {
                Ok(value) => {
                    self.session.apply_set_cookie(value)?;
                }
                Err(_) => tracing::debug!("Ignoring non-ASCII Set-Cookie header"),
            }
        }

        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| {
                tracing::debug!("Non-JSON response body from {}", request.path);
                Value::String(text)
            })
        };

        Ok(ApiResponse { status, body })
    }

    /// Send with the stored access token; on 401/422 refresh once and retry once
    async fn authorized(&self, request: ApiRequest<'_>) -> Result<ApiResponse, ClientError> {
        let token = self.session.access_token();
        let response = self.execute(&request, token.as_deref()).await?;
        if !response.is_credential_rejection() {
            return Ok(response);
        }

        tracing::warn!(
            "{} {} rejected with HTTP {}, refreshing access token",
            request.method,
            request.path,
            response.status
        );
        let token = self.refresh_session().await?;

        let retried = self.execute(&request, Some(&token)).await?;
        if retried.is_credential_rejection() {
            tracing::warn!("{} still rejected after refresh", request.path);
            return Err(ClientError::SessionExpired);
        }
        Ok(retried)
    }

    /// Exchange the refresh token for a new access token and store it.
    ///
    /// The new token is taken from the response body, or else from an
    /// `access_token_cookie` the response set.
    pub async fn refresh_session(&self) -> Result<String, ClientError> {
        let Some(refresh_token) = self.session.refresh_token() else {
            return Err(ClientError::NotLoggedIn);
        };
        let previous = self.session.access_token();

        tracing::warn!("Refreshing access token");
        let response = self
            .execute(
                &ApiRequest::post("/auth/refresh", json!({})),
                Some(&refresh_token),
            )
            .await?;

        let refreshed: RefreshResponse = match response.decode() {
            Ok(refreshed) => refreshed,
            Err(e) => {
                tracing::warn!("Token refresh refused: {}", e);
                return Err(ClientError::SessionExpired);
            }
        };

        let token = refreshed
            .access_token
            .filter(|t| !t.is_empty())
            .or_else(|| self.session.access_token().filter(|t| Some(t) != previous.as_ref()));
        let Some(token) = token else {
            tracing::warn!("Token refresh returned no access token");
            return Err(ClientError::SessionExpired);
        };

        self.session.store_access_token(&token)?;
        tracing::info!("Access token refreshed");
        Ok(token)
    }

    /// `POST /auth/login`; tokens arrive as cookies or in the body
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let body = serde_json::to_value(LoginRequest {
            identifier,
            password,
        })?;
        let response: LoginResponse = self
            .execute(&ApiRequest::post("/auth/login", body), None)
            .await?
            .decode()?;

        match (&response.access_token, &response.refresh_token) {
            (Some(access_token), Some(refresh_token)) => self.session.store_tokens(&TokenPair {
                access_token: access_token.clone(),
                refresh_token: refresh_token.clone(),
            })?,
            (Some(access_token), None) => self.session.store_access_token(access_token)?,
            _ => {}
        }
        if self.session.access_token().is_none() {
            tracing::warn!("Login succeeded but no access token was issued");
        }
        Ok(response)
    }

    /// `POST /auth/reg`
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let body = serde_json::to_value(RegisterRequest {
            username,
            password,
            confirm_password,
        })?;
        self.execute(&ApiRequest::post("/auth/reg", body), None)
            .await?
            .decode()
    }

    /// `GET /auth/logout`; the server revokes the token and deletes the cookies
    pub async fn logout(&self) -> Result<(), ClientError> {
        let token = self.session.access_token();
        self.execute(&ApiRequest::get("/auth/logout"), token.as_deref())
            .await?
            .decode::<ApiStatus>()
            .map(|_| ())
    }

    pub async fn user_rooms(&self) -> Result<Vec<RoomSummary>, ClientError> {
        let response: RoomsResponse = self
            .authorized(ApiRequest::get("/rooms/get_user_rooms"))
            .await?
            .decode()?;
        Ok(response.rooms)
    }

    pub async fn room_history(
        &self,
        room: &RoomRef,
        page: u32,
        size: u32,
    ) -> Result<HistoryResponse, ClientError> {
        self.authorized(
            ApiRequest::get("/room_history")
                .query("room_id", room)
                .query("page", page)
                .query("size", size),
        )
        .await?
        .decode()
    }

    pub async fn search_groups(&self, query: &str) -> Result<Vec<GroupMatch>, ClientError> {
        let response: GroupSearchResponse = self
            .authorized(ApiRequest::get("/rooms/search").query("query", query))
            .await?
            .decode()?;
        Ok(response.rooms)
    }

    pub async fn leave_group(&self, room: &RoomRef) -> Result<String, ClientError> {
        let body = serde_json::to_value(RoomTarget { room_id: room })?;
        self.status_message(ApiRequest::post("/rooms/leave_group", body))
            .await
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>, ClientError> {
        let response: UsersResponse = self
            .authorized(ApiRequest::get("/friends/search_user").query("query", query))
            .await?
            .decode()?;
        Ok(response.users)
    }

    pub async fn friends(&self) -> Result<Vec<UserSummary>, ClientError> {
        let response: FriendsResponse = self
            .authorized(ApiRequest::get("/friends/get_friends"))
            .await?
            .decode()?;
        Ok(response.friends)
    }

    pub async fn friend_requests(&self) -> Result<Vec<UserSummary>, ClientError> {
        let response: FriendRequestsResponse = self
            .authorized(ApiRequest::get("/friends/get_friend_requests"))
            .await?
            .decode()?;
        Ok(response.requests)
    }

    pub async fn send_friend_request(&self, user: &UserId) -> Result<String, ClientError> {
        let body = serde_json::to_value(FriendTarget {
            friend_user_id: user,
        })?;
        self.status_message(ApiRequest::post("/friends/send_friend_request", body))
            .await
    }

    /// Accept or reject a request; an accepted one may name the new private room
    pub async fn handle_friend_request(
        &self,
        user: &UserId,
        action: FriendAction,
    ) -> Result<HandleFriendResponse, ClientError> {
        let body = serde_json::to_value(HandleFriendRequest {
            user_id: user,
            action,
        })?;
        self.authorized(ApiRequest::post("/friends/handle_friend_request", body))
            .await?
            .decode()
    }

    pub async fn delete_friend(&self, user: &UserId) -> Result<String, ClientError> {
        let body = serde_json::to_value(DeleteFriendRequest {
            friend_user_id: user,
            friend_id: user,
        })?;
        self.status_message(ApiRequest::post("/friends/delete_friend", body))
            .await
    }

    /// `POST /center/update-username`
    pub async fn update_username(&self, new_username: &str) -> Result<String, ClientError> {
        let body = serde_json::to_value(UpdateUsernameRequest { new_username })?;
        self.status_message(ApiRequest::post("/center/update-username", body))
            .await
    }

    /// `POST /center/update-password`
    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<String, ClientError> {
        let body = serde_json::to_value(UpdatePasswordRequest {
            current_password,
            new_password,
        })?;
        self.status_message(ApiRequest::post("/center/update-password", body))
            .await
    }

    /// Authorized call whose only payload is the server's `msg`
    async fn status_message(&self, request: ApiRequest<'_>) -> Result<String, ClientError> {
        let status: ApiStatus = self.authorized(request).await?.decode()?;
        Ok(status.msg.unwrap_or_default())
    }
}

#[async_trait]
impl TokenRefresher for ApiClient {
    async fn refresh_access_token(&self) -> Result<String, ClientError> {
        self.refresh_session().await
    }
}

#[async_trait]
impl HistorySource for ApiClient {
    async fn fetch_history(
        &self,
        room: &RoomRef,
        page: u32,
        size: u32,
    ) -> Result<Vec<HistoryEntry>, ClientError> {
        let response = self.room_history(room, page, size).await?;
        Ok(response.data.into_iter().map(HistoryEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path, query_param},
    };

    fn create_test_client(server: &MockServer) -> ApiClient {
        let config = ClientConfig::new(&server.uri(), ".chatlink-test").unwrap();
        ApiClient::new(config, Arc::new(SessionStore::in_memory()))
    }

    fn store_tokens(client: &ApiClient, access: &str, refresh: &str) {
        client
            .session()
            .store_tokens(&TokenPair {
                access_token: access.to_string(),
                refresh_token: refresh.to_string(),
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_makes_no_request() {
        // テスト項目: リフレッシュトークンがない場合は通信せずに NotLoggedIn になる
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = create_test_client(&server);

        // when (操作):
        let result = client.refresh_session().await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_refresh_stores_token_from_body() {
        // テスト項目: レスポンスボディのアクセストークンが保存される
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(header("authorization", "Bearer R1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"code": 0, "access_token": "T2"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let token = client.refresh_session().await.unwrap();

        // then (期待する結果):
        assert_eq!(token, "T2");
        assert_eq!(client.session().access_token(), Some("T2".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_takes_token_from_set_cookie() {
        // テスト項目: ボディにトークンがない場合は Set-Cookie のトークンが使われる
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "access_token_cookie=T2; Path=/; HttpOnly")
                    .set_body_json(json!({"code": 0, "msg": "ok"})),
            )
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let token = client.refresh_session().await.unwrap();

        // then (期待する結果):
        assert_eq!(token, "T2");
        assert_eq!(client.session().get(ACCESS_TOKEN_COOKIE), Some("T2".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_without_new_token_fails() {
        // テスト項目: 新しいアクセストークンを返さないリフレッシュは失敗扱いになる
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let result = client.refresh_session().await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::SessionExpired)));
        assert_eq!(client.session().access_token(), Some("T1".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_rejected_is_session_expired() {
        // テスト項目: リフレッシュが 401 で拒否されるとセッション切れになる
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"code": 1, "msg": "refresh failed"})),
            )
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let result = client.refresh_session().await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::SessionExpired)));
    }

    #[tokio::test]
    async fn test_authorized_call_retries_once_after_refresh() {
        // テスト項目: 401 を受けた API 呼び出しはリフレッシュ後に 1 回だけ再送される
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rooms/get_user_rooms"))
            .and(header("authorization", "Bearer T1"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"msg": "Token has expired"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rooms/get_user_rooms"))
            .and(header("authorization", "Bearer T2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "rooms": [{"id": 1, "name": "Lobby", "is_group": true, "members": []}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T2"})))
            .expect(1)
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let rooms = client.user_rooms().await.unwrap();

        // then (期待する結果):
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id, RoomRef::global());
    }

    #[tokio::test]
    async fn test_authorized_call_rejected_twice_expires_session() {
        // テスト項目: リフレッシュ後も 401 の場合はセッション切れになる
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/friends/get_friends"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({"msg": "Bad token"})))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T2"})))
            .expect(1)
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let result = client.friends().await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::SessionExpired)));
    }

    #[tokio::test]
    async fn test_application_code_is_surfaced_with_message() {
        // テスト項目: code が 0 以外のレスポンスはメッセージ付きのエラーになり再送されない
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/friends/send_friend_request"))
            .and(body_json(json!({"friend_user_id": 9})))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"code": 1, "msg": "Already friends"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let result = client.send_friend_request(&UserId::from(9)).await;

        // then (期待する結果):
        match result {
            Err(ClientError::Application { code, msg }) => {
                assert_eq!(code, 1);
                assert_eq!(msg, "Already friends");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_stores_cookies_from_response() {
        // テスト項目: ログイン時の Set-Cookie で両方のトークンが保存される
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"identifier": "alice", "password": "password1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "access_token_cookie=A1; Max-Age=3600; Path=/")
                    .append_header("set-cookie", "refresh_token_cookie=R1; Max-Age=604800; Path=/")
                    .set_body_json(json!({"code": 0, "user_id": 5, "username": "alice"})),
            )
            .mount(&server)
            .await;
        let client = create_test_client(&server);

        // when (操作):
        let response = client.login("alice", "password1").await.unwrap();

        // then (期待する結果):
        assert_eq!(response.user_id, Some(UserId::from(5)));
        assert_eq!(client.session().get(ACCESS_TOKEN_COOKIE), Some("A1".to_string()));
        assert_eq!(client.session().get(REFRESH_TOKEN_COOKIE), Some("R1".to_string()));
    }

    #[tokio::test]
    async fn test_wrong_password_is_application_error() {
        // テスト項目: パスワード誤りの 401 はリフレッシュせずにサーバーのメッセージで失敗する
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"code": 1, "msg": "Wrong password"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = create_test_client(&server);

        // when (操作):
        let result = client.login("alice", "password1").await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Application { code: 1, .. })));
    }

    #[tokio::test]
    async fn test_fetch_history_sends_paging_and_cookie() {
        // テスト項目: 履歴取得はページ指定とクッキーを送信し、エントリに変換される
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/room_history"))
            .and(query_param("room_id", "5"))
            .and(query_param("page", "1"))
            .and(query_param("size", "50"))
            .and(header("cookie", "access_token_cookie=T1; refresh_token_cookie=R1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": [{
                    "sender": "alice",
                    "sender_id": 5,
                    "body": "hi",
                    "ts": "2023-11-14T22:13:20",
                    "seq": 1
                }],
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let entries = client
            .fetch_history(&RoomRef::from(5), 1, 50)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sender_id, UserId::from(5));
        assert_eq!(entries[0].sent_at, Some(1_700_000_000_000));
    }

    #[tokio::test]
    async fn test_delete_friend_sends_both_field_names() {
        // テスト項目: フレンド削除は新旧両方のフィールド名で ID を送る
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/friends/delete_friend"))
            .and(body_json(json!({"friend_user_id": 7, "friend_id": 7})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 0, "msg": "Friend deleted"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let msg = client.delete_friend(&UserId::from(7)).await.unwrap();

        // then (期待する結果):
        assert_eq!(msg, "Friend deleted");
    }

    #[tokio::test]
    async fn test_accepted_friend_request_returns_new_room() {
        // テスト項目: フレンド申請の承認レスポンスから新しいプライベートルームの ID が読める
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/friends/handle_friend_request"))
            .and(body_json(json!({"user_id": 7, "action": "accept"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "msg": "Friend request accepted",
                "room_id": "12"
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let response = client
            .handle_friend_request(&UserId::from(7), FriendAction::Accept)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(response.room_id, Some(RoomRef::from(12)));
        assert_eq!(response.msg.as_deref(), Some("Friend request accepted"));
    }

    #[tokio::test]
    async fn test_update_username_posts_new_name() {
        // テスト項目: ユーザー名の変更は newUsername を認証付きで送信する
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/center/update-username"))
            .and(header("authorization", "Bearer T1"))
            .and(body_json(json!({"newUsername": "bob"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 0, "msg": "Username updated"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let msg = client.update_username("bob").await.unwrap();

        // then (期待する結果):
        assert_eq!(msg, "Username updated");
    }

    #[tokio::test]
    async fn test_update_password_wrong_current_is_application_error() {
        // テスト項目: 現在のパスワードが誤っている場合はリフレッシュせずにサーバーのメッセージで失敗する
        // given (前提条件):
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/center/update-password"))
            .and(body_json(
                json!({"currentPassword": "password1", "newPassword": "password2"}),
            ))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"code": 1, "msg": "Wrong current password"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T2"})))
            .expect(0)
            .mount(&server)
            .await;
        let client = create_test_client(&server);
        store_tokens(&client, "T1", "R1");

        // when (操作):
        let result = client.update_password("password1", "password2").await;

        // then (期待する結果):
        match result {
            Err(ClientError::Application { code, msg }) => {
                assert_eq!(code, 1);
                assert_eq!(msg, "Wrong current password");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(client.session().access_token(), Some("T1".to_string()));
    }
}
