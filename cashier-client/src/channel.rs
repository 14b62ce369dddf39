//! 推送通道生命周期
//!
//! [`EventChannel`] 管理与推送服务的连接：连接、断开、手动重连，
//! 以及掉线后的有限次自动重连。真实的 socket 传输由外部提供，
//! 这里只定义 [`EventTransport`] 契约和测试用的内存实现。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::{ClientError, ClientResult};
use shared::{CashierEvent, ChannelStatus};

/// 自动重连配置
pub const MAX_RETRY_ATTEMPTS: u32 = 5;
pub const RETRY_DELAY_MS: u64 = 1000;

/// 推送传输契约
///
/// `connect` 返回一个事件流；流结束即视为连接断开。
#[async_trait]
pub trait EventTransport: Send + Sync + std::fmt::Debug {
    async fn connect(&self, token: &str) -> ClientResult<mpsc::Receiver<CashierEvent>>;
}

/// 内存传输 - 测试用
///
/// 测试侧通过 [`MemoryTransport::emit`] 注入事件，
/// [`MemoryTransport::drop_connection`] 模拟掉线，
/// [`MemoryTransport::fail_next`] 预约若干次连接失败。
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<std::sync::Mutex<MemoryTransportInner>>,
}

#[derive(Debug, Default)]
struct MemoryTransportInner {
    sender: Option<mpsc::Sender<CashierEvent>>,
    failures_remaining: u32,
    connect_count: u32,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预约接下来 n 次 connect 失败
    pub fn fail_next(&self, n: u32) {
        self.inner.lock().expect("transport lock").failures_remaining = n;
    }

    /// 已发生的 connect 调用次数
    pub fn connect_count(&self) -> u32 {
        self.inner.lock().expect("transport lock").connect_count
    }

    /// 向当前连接注入一个事件
    pub async fn emit(&self, event: CashierEvent) -> bool {
        let sender = {
            let inner = self.inner.lock().expect("transport lock");
            inner.sender.clone()
        };
        match sender {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// 模拟掉线：丢弃发送端，事件流随之结束
    pub fn drop_connection(&self) {
        self.inner.lock().expect("transport lock").sender = None;
    }
}

#[async_trait]
impl EventTransport for MemoryTransport {
    async fn connect(&self, _token: &str) -> ClientResult<mpsc::Receiver<CashierEvent>> {
        let mut inner = self.inner.lock().expect("transport lock");
        inner.connect_count += 1;
        if inner.failures_remaining > 0 {
            inner.failures_remaining -= 1;
            return Err(ClientError::Internal("Connection refused".into()));
        }
        let (tx, rx) = mpsc::channel(64);
        inner.sender = Some(tx);
        Ok(rx)
    }
}

/// 推送通道
///
/// 状态经 broadcast 发布给订阅者：`Connected`、`Disconnected`、
/// `ConnectionError`。自动重连最多 [`MAX_RETRY_ATTEMPTS`] 次，固定
/// [`RETRY_DELAY_MS`] 间隔；放弃后发布
/// `Disconnected { retries_exhausted: true }`，只接受手动 `reconnect`。
pub struct EventChannel {
    transport: Arc<dyn EventTransport>,
    event_tx: broadcast::Sender<CashierEvent>,
    status_tx: broadcast::Sender<ChannelStatus>,
    inner: Arc<Mutex<ChannelInner>>,
}

struct ChannelInner {
    reader: Option<JoinHandle<()>>,
    token: Option<String>,
}

impl EventChannel {
    pub fn new(transport: Arc<dyn EventTransport>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let (status_tx, _) = broadcast::channel(64);
        Self {
            transport,
            event_tx,
            status_tx,
            inner: Arc::new(Mutex::new(ChannelInner {
                reader: None,
                token: None,
            })),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CashierEvent> {
        self.event_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<ChannelStatus> {
        self.status_tx.subscribe()
    }

    /// 建立连接并启动读取任务
    ///
    /// 未登录 (空 token) 时拒绝连接。已有读取任务时先将其终止。
    pub async fn connect(&self, token: &str) -> ClientResult<()> {
        if token.trim().is_empty() {
            return Err(ClientError::NotLoggedIn);
        }

        let mut inner = self.inner.lock().await;
        if let Some(handle) = inner.reader.take() {
            handle.abort();
        }
        inner.token = Some(token.to_string());

        let task = ReaderTask {
            transport: self.transport.clone(),
            token: token.to_string(),
            event_tx: self.event_tx.clone(),
            status_tx: self.status_tx.clone(),
        };
        inner.reader = Some(tokio::spawn(task.run()));
        Ok(())
    }

    /// 断开：终止读取任务，丢弃 token
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(handle) = inner.reader.take() {
            handle.abort();
        }
        inner.token = None;
        let _ = self.status_tx.send(ChannelStatus::Disconnected {
            retries_exhausted: false,
        });
    }

    /// 手动重连：断开、固定 1s 延迟、用原 token 重新连接
    pub async fn reconnect(&self) -> ClientResult<()> {
        let token = {
            let mut inner = self.inner.lock().await;
            if let Some(handle) = inner.reader.take() {
                handle.abort();
            }
            inner.token.clone().ok_or(ClientError::NotLoggedIn)?
        };

        tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
        self.connect(&token).await
    }

    /// 是否有活跃的读取任务
    pub async fn is_running(&self) -> bool {
        let inner = self.inner.lock().await;
        inner
            .reader
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

/// 读取循环：连接、转发事件、掉线后有限次自动重连
struct ReaderTask {
    transport: Arc<dyn EventTransport>,
    token: String,
    event_tx: broadcast::Sender<CashierEvent>,
    status_tx: broadcast::Sender<ChannelStatus>,
}

impl ReaderTask {
    async fn run(self) {
        let mut attempts = 0u32;

        loop {
            match self.transport.connect(&self.token).await {
                Ok(mut rx) => {
                    attempts = 0;
                    let _ = self.status_tx.send(ChannelStatus::Connected);
                    tracing::info!("Event channel connected");

                    while let Some(event) = rx.recv().await {
                        let _ = self.event_tx.send(event);
                    }
                    tracing::warn!("Event channel lost connection");
                }
                Err(e) => {
                    tracing::error!("Event channel connect failed: {}", e);
                    let _ = self.status_tx.send(ChannelStatus::ConnectionError {
                        message: e.to_string(),
                    });
                }
            }

            attempts += 1;
            if attempts > MAX_RETRY_ATTEMPTS {
                tracing::error!(
                    "Event channel giving up after {} attempts",
                    MAX_RETRY_ATTEMPTS
                );
                let _ = self.status_tx.send(ChannelStatus::Disconnected {
                    retries_exhausted: true,
                });
                return;
            }

            let _ = self.status_tx.send(ChannelStatus::Disconnected {
                retries_exhausted: false,
            });
            tracing::warn!(
                "Event channel reconnecting (attempt {}/{})",
                attempts,
                MAX_RETRY_ATTEMPTS
            );
            tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
        }
    }
}
