//! HTTP 客户端 - 收银端 REST 访问
//!
//! [`CashierApi`] 是收银端用到的全部服务端操作；[`HttpCashierClient`]
//! 是 reqwest 实现。4xx 一律不重试，5xx/网络错误原样抛给调用方。

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{ClientError, ClientResult};
use shared::{OrderView, StaffView, TableSummary, TableView};

/// 服务端统一响应信封
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default = "Option::default")]
    data: Option<T>,
}

/// 登录响应数据
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub staff: StaffView,
    pub access_token: String,
}

/// 桌台列表响应数据
#[derive(Debug, Clone, Deserialize)]
pub struct TableListData {
    pub tables: Vec<TableView>,
}

/// 订单查询/结账响应数据
#[derive(Debug, Clone, Deserialize)]
pub struct TableOrderData {
    pub order: Option<OrderView>,
    pub table: TableSummary,
}

/// 收银端 API trait
#[async_trait]
pub trait CashierApi: Send + Sync {
    async fn login(&mut self, email: &str, password: &str) -> ClientResult<LoginData>;
    async fn logout(&mut self) -> ClientResult<()>;
    async fn list_tables(&self) -> ClientResult<Vec<TableView>>;
    async fn order_for_table(&self, table_id: &str) -> ClientResult<TableOrderData>;
    async fn settle(
        &self,
        table_id: &str,
        payment_method: Option<&str>,
    ) -> ClientResult<TableOrderData>;
    fn token(&self) -> Option<&str>;
}

/// 网络 HTTP 客户端
#[derive(Debug, Clone)]
pub struct HttpCashierClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCashierClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<Envelope<T>> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // 服务端错误响应也走统一信封，message 里是人类可读原因
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&text)
                .map(|e| e.message)
                .unwrap_or_else(|_| text.clone());

            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized(message)),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(message)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(message)),
                _ => Err(ClientError::Internal(message)),
            };
        }

        let envelope: Envelope<T> = serde_json::from_str(&text)?;
        if envelope.status != "success" {
            return Err(ClientError::InvalidResponse(envelope.message));
        }
        Ok(envelope)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Envelope<T>> {
        let mut req = self.client.get(self.url(path));
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        let response = req.send().await?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl CashierApi for HttpCashierClient {
    async fn login(&mut self, email: &str, password: &str) -> ClientResult<LoginData> {
        let response = self
            .client
            .post(self.url("api/staff/login"))
            .json(&serde_json::json!({"email": email, "password": password}))
            .send()
            .await?;

        let envelope: Envelope<LoginData> = self.handle_response(response).await?;
        let data = envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Login response without data".into()))?;

        self.token = Some(data.access_token.clone());
        tracing::info!(staff = %data.staff.staff_name, "Logged in");
        Ok(data)
    }

    async fn logout(&mut self) -> ClientResult<()> {
        if self.token.is_none() {
            return Err(ClientError::NotLoggedIn);
        }

        let result: ClientResult<Envelope<serde_json::Value>> =
            self.get_json("api/staff/logout").await;

        // 令牌本地总是丢弃；服务端已拒绝的令牌留着也没有用
        self.token = None;

        match result {
            Ok(_) => Ok(()),
            Err(ClientError::Unauthorized(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn list_tables(&self) -> ClientResult<Vec<TableView>> {
        let envelope: Envelope<TableListData> = self.get_json("api/table").await?;
        let data = envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Table list without data".into()))?;
        Ok(data.tables)
    }

    async fn order_for_table(&self, table_id: &str) -> ClientResult<TableOrderData> {
        let envelope: Envelope<TableOrderData> = self
            .get_json(&format!("api/table/order?tableId={}", table_id))
            .await?;
        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Order response without data".into()))
    }

    async fn settle(
        &self,
        table_id: &str,
        payment_method: Option<&str>,
    ) -> ClientResult<TableOrderData> {
        let mut req = self
            .client
            .patch(self.url(&format!("api/table/settle?tableId={}", table_id)));
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        if let Some(method) = payment_method {
            req = req.json(&serde_json::json!({"paymentMethod": method}));
        }

        let response = req.send().await?;
        let envelope: Envelope<TableOrderData> = self.handle_response(response).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Settle response without data".into()))
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // LoginData 没有 Default 实现，信封解析不能要求 T: Default
    #[test]
    fn envelope_parses_without_default_payload() {
        let json = r#"{
            "status": "success",
            "message": "Login successful",
            "data": {
                "staff": {
                    "id": "staff:alice",
                    "staffName": "Alice",
                    "email": "alice@example.com",
                    "role": 1,
                    "mobileNumber": "",
                    "address": "",
                    "nic": "",
                    "profileImageUrl": "",
                    "isActive": true
                },
                "accessToken": "tok"
            }
        }"#;

        let envelope: Envelope<LoginData> = serde_json::from_str(json).expect("parse envelope");
        assert_eq!(envelope.status, "success");
        let data = envelope.data.expect("data present");
        assert_eq!(data.access_token, "tok");
        assert_eq!(data.staff.staff_name, "Alice");
    }

    #[test]
    fn envelope_tolerates_missing_data_and_message() {
        let envelope: Envelope<LoginData> =
            serde_json::from_str(r#"{"status": "error"}"#).expect("parse envelope");
        assert_eq!(envelope.status, "error");
        assert!(envelope.message.is_empty());
        assert!(envelope.data.is_none());
    }
}
