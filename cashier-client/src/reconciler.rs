//! 桌台缓存对账器
//!
//! 推送事件先乐观地写入本地缓存 (界面立即反映)，随后由一次权威
//! 刷新收敛：`pin_generated` 触发立即的可见刷新，`order_created`
//! 安排一次 2 秒后的静默刷新。事件与刷新最终写入同一份缓存，
//! 乱序或重放事件不会让缓存发散。

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use shared::{CashierEvent, OrderCreatedPayload, PinGeneratedPayload, RecentEvent, TableView};

/// 静默刷新延迟
pub const SILENT_REFETCH_DELAY_MS: u64 = 2000;
/// 最近事件环形缓冲容量
pub const RECENT_EVENTS_CAP: usize = 10;

/// 刷新出口
///
/// 对账器不做 I/O；刷新请求经这个 trait 交给持有 HTTP 客户端的一侧。
pub trait RefetchSink: Send + Sync {
    /// 请求一次桌台全量刷新；`silent` 为 true 时不展示加载态
    fn refetch_tables(&self, silent: bool);
    /// 请求刷新某张桌台的订单详情 (当前选中桌台有变化时)
    fn refetch_order(&self, table_id: &str);
}

struct ReconcilerInner {
    tables: Vec<TableView>,
    selected: Option<String>,
    recent: VecDeque<RecentEvent>,
    /// 乐观更新后等待权威刷新确认的桌台 id
    pending: HashSet<String>,
    refetch_timer: Option<JoinHandle<()>>,
}

/// 桌台缓存对账器
pub struct TableReconciler {
    inner: Arc<Mutex<ReconcilerInner>>,
    sink: Arc<dyn RefetchSink>,
}

impl TableReconciler {
    pub fn new(sink: Arc<dyn RefetchSink>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ReconcilerInner {
                tables: Vec::new(),
                selected: None,
                recent: VecDeque::with_capacity(RECENT_EVENTS_CAP),
                pending: HashSet::new(),
                refetch_timer: None,
            })),
            sink,
        }
    }

    /// 当前缓存快照
    pub fn tables(&self) -> Vec<TableView> {
        self.lock().tables.clone()
    }

    /// 最近收到的事件 (新的在后)
    pub fn recent_events(&self) -> Vec<RecentEvent> {
        self.lock().recent.iter().cloned().collect()
    }

    /// 等待确认的桌台 id 集合
    pub fn pending_tables(&self) -> HashSet<String> {
        self.lock().pending.clone()
    }

    pub fn select_table(&self, table_id: Option<String>) {
        self.lock().selected = table_id;
    }

    pub fn selected_table(&self) -> Option<String> {
        self.lock().selected.clone()
    }

    /// 权威刷新结果写入：整体替换缓存并清空 pending 标记
    pub fn apply_tables(&self, tables: Vec<TableView>) {
        let mut inner = self.lock();
        inner.tables = tables;
        for table in &mut inner.tables {
            table.recompute_status();
        }
        inner.pending.clear();
    }

    /// 处理一条推送事件
    pub fn handle_event(&self, event: CashierEvent) {
        self.remember(&event);

        match event {
            CashierEvent::PinGenerated(payload) => self.on_pin_generated(payload),
            CashierEvent::OrderCreated(payload) => self.on_order_created(payload),
        }
    }

    /// 注销/卸载：终止未触发的刷新定时器
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        if let Some(timer) = inner.refetch_timer.take() {
            timer.abort();
        }
        inner.pending.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReconcilerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remember(&self, event: &CashierEvent) {
        let mut inner = self.lock();
        if inner.recent.len() == RECENT_EVENTS_CAP {
            inner.recent.pop_front();
        }
        inner.recent.push_back(RecentEvent {
            event: event.clone(),
            received_at: Utc::now(),
        });
    }

    fn on_pin_generated(&self, payload: PinGeneratedPayload) {
        {
            let mut inner = self.lock();
            let Some(table) = inner
                .tables
                .iter_mut()
                .find(|t| t.id == payload.table_id)
            else {
                tracing::debug!(table_id = %payload.table_id, "pin_generated for unknown table");
                return;
            };

            table.session_pin = payload.session_pin;
            table.recompute_status();
            inner.pending.insert(payload.table_id.clone());
        }

        tracing::info!(table = %payload.table_name, "PIN issued, refreshing tables");
        // PIN 发放直接刷新：顾客马上要在这张桌台上看到会话
        self.sink.refetch_tables(false);
    }

    fn on_order_created(&self, payload: OrderCreatedPayload) {
        let selected_hit;
        {
            let mut inner = self.lock();
            // id 按字符串比较：事件来自异构生产方，形态不保证一致
            let Some(table) = inner
                .tables
                .iter_mut()
                .find(|t| t.id.as_str() == payload.table_id.as_str())
            else {
                tracing::debug!(table_id = %payload.table_id, "order_created for unknown table");
                return;
            };

            // 保留 session_pin：订单挂上后自助会话仍在进行
            table.order_id = payload.order_number.clone();
            table.recompute_status();
            inner.pending.insert(payload.table_id.clone());

            selected_hit = inner.selected.as_deref() == Some(payload.table_id.as_str());
        }

        tracing::info!(
            table = %payload.table_name,
            order = %payload.order_number,
            is_update = payload.is_update,
            "Order attached, scheduling silent refresh"
        );

        if selected_hit {
            self.sink.refetch_order(&payload.table_id);
        }
        self.schedule_silent_refetch();
    }

    /// 安排一次延迟静默刷新；新的安排会替换掉尚未触发的旧定时器
    fn schedule_silent_refetch(&self) {
        let sink = self.sink.clone();
        let inner_ref = self.inner.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(SILENT_REFETCH_DELAY_MS)).await;
            if let Ok(mut inner) = inner_ref.lock() {
                inner.refetch_timer = None;
            }
            sink.refetch_tables(true);
        });

        let mut inner = self.lock();
        if let Some(old) = inner.refetch_timer.replace(handle) {
            old.abort();
        }
    }
}

impl Drop for TableReconciler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// 对账器发出的刷新请求
#[derive(Debug, Clone, PartialEq)]
pub enum RefetchRequest {
    Tables { silent: bool },
    Order { table_id: String },
}

/// 生产用刷新出口：把请求投进队列，由持有 [`crate::CashierApi`]
/// 客户端的一侧消费 (调用 list_tables/order_for_table 并把结果写回
/// [`TableReconciler::apply_tables`])。
pub struct QueueRefetchSink {
    tx: tokio::sync::mpsc::UnboundedSender<RefetchRequest>,
}

impl QueueRefetchSink {
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<RefetchRequest>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RefetchSink for QueueRefetchSink {
    fn refetch_tables(&self, silent: bool) {
        let _ = self.tx.send(RefetchRequest::Tables { silent });
    }

    fn refetch_order(&self, table_id: &str) {
        let _ = self.tx.send(RefetchRequest::Order {
            table_id: table_id.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TableStatus;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct MockSink {
        table_refetches: StdMutex<Vec<bool>>,
        order_refetches: StdMutex<Vec<String>>,
    }

    impl MockSink {
        fn table_calls(&self) -> Vec<bool> {
            self.table_refetches.lock().expect("lock").clone()
        }

        fn order_calls(&self) -> Vec<String> {
            self.order_refetches.lock().expect("lock").clone()
        }
    }

    impl RefetchSink for MockSink {
        fn refetch_tables(&self, silent: bool) {
            self.table_refetches.lock().expect("lock").push(silent);
        }

        fn refetch_order(&self, table_id: &str) {
            self.order_refetches
                .lock()
                .expect("lock")
                .push(table_id.to_string());
        }
    }

    fn view(id: &str, name: &str, order_id: &str, pin: &str) -> TableView {
        let mut t = TableView {
            id: id.to_string(),
            table_name: name.to_string(),
            pax: 4,
            order_id: order_id.to_string(),
            session_pin: pin.to_string(),
            pin_generated_at: None,
            customer_id: None,
            status: TableStatus::Available,
            is_available: true,
        };
        t.recompute_status();
        t
    }

    fn pin_event(table_id: &str, pin: &str) -> CashierEvent {
        CashierEvent::PinGenerated(PinGeneratedPayload {
            table_id: table_id.to_string(),
            table_name: "T1".into(),
            session_pin: pin.to_string(),
            customer_mobile_number: String::new(),
        })
    }

    fn order_event(table_id: &str, order_number: &str) -> CashierEvent {
        CashierEvent::OrderCreated(OrderCreatedPayload {
            table_id: table_id.to_string(),
            order_id: order_number.to_string(),
            order_number: order_number.to_string(),
            table_name: "T1".into(),
            is_update: false,
        })
    }

    fn reconciler() -> (TableReconciler, Arc<MockSink>) {
        let sink = Arc::new(MockSink::default());
        let reconciler = TableReconciler::new(sink.clone());
        reconciler.apply_tables(vec![
            view("dining_table:1", "T1", "", ""),
            view("dining_table:2", "T2", "", ""),
        ]);
        (reconciler, sink)
    }

    #[tokio::test]
    async fn test_pin_generated_updates_cache_and_requests_visible_refetch() {
        let (reconciler, sink) = reconciler();

        reconciler.handle_event(pin_event("dining_table:1", "4821"));

        let tables = reconciler.tables();
        assert_eq!(tables[0].session_pin, "4821");
        assert_eq!(tables[0].status, TableStatus::PinIssued);
        assert!(!tables[0].is_available);
        assert!(reconciler.pending_tables().contains("dining_table:1"));
        assert_eq!(sink.table_calls(), vec![false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_created_is_optimistic_then_silently_refetched() {
        let (reconciler, sink) = reconciler();

        reconciler.handle_event(order_event("dining_table:1", "ORD-9"));

        // 缓存立即反映占用
        let tables = reconciler.tables();
        assert_eq!(tables[0].order_id, "ORD-9");
        assert_eq!(tables[0].status, TableStatus::Occupied);
        assert!(sink.table_calls().is_empty());

        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(SILENT_REFETCH_DELAY_MS + 10)).await;
        tokio::task::yield_now().await;

        assert_eq!(sink.table_calls(), vec![true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_order_event_replaces_pending_timer() {
        let (reconciler, sink) = reconciler();

        reconciler.handle_event(order_event("dining_table:1", "ORD-1"));
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(1000)).await;
        reconciler.handle_event(order_event("dining_table:2", "ORD-2"));

        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(SILENT_REFETCH_DELAY_MS + 10)).await;
        tokio::task::yield_now().await;

        // 只有一次静默刷新：第二个事件替换了第一个的定时器
        assert_eq!(sink.table_calls(), vec![true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_pending_refetch() {
        let (reconciler, sink) = reconciler();

        reconciler.handle_event(order_event("dining_table:1", "ORD-1"));
        reconciler.shutdown();

        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(SILENT_REFETCH_DELAY_MS * 2)).await;
        tokio::task::yield_now().await;

        assert!(sink.table_calls().is_empty());
    }

    #[tokio::test]
    async fn test_order_event_preserves_session_pin() {
        let (reconciler, _sink) = reconciler();

        reconciler.handle_event(pin_event("dining_table:1", "4821"));
        reconciler.handle_event(order_event("dining_table:1", "ORD-9"));

        let tables = reconciler.tables();
        assert_eq!(tables[0].session_pin, "4821");
        assert_eq!(tables[0].order_id, "ORD-9");
        assert_eq!(tables[0].status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn test_order_event_for_selected_table_requests_order_refetch() {
        let (reconciler, sink) = reconciler();
        reconciler.select_table(Some("dining_table:1".to_string()));

        reconciler.handle_event(order_event("dining_table:1", "ORD-9"));
        assert_eq!(sink.order_calls(), vec!["dining_table:1".to_string()]);

        // 非选中桌台不触发订单详情刷新
        reconciler.handle_event(order_event("dining_table:2", "ORD-10"));
        assert_eq!(sink.order_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_replayed_event_is_idempotent() {
        let (reconciler, _sink) = reconciler();

        reconciler.handle_event(order_event("dining_table:1", "ORD-9"));
        let first = reconciler.tables();
        reconciler.handle_event(order_event("dining_table:1", "ORD-9"));
        let second = reconciler.tables();

        assert_eq!(first[0].order_id, second[0].order_id);
        assert_eq!(first[0].status, second[0].status);
    }

    #[tokio::test]
    async fn test_authoritative_refetch_clears_pending() {
        let (reconciler, _sink) = reconciler();

        reconciler.handle_event(order_event("dining_table:1", "ORD-9"));
        assert!(!reconciler.pending_tables().is_empty());

        reconciler.apply_tables(vec![view("dining_table:1", "T1", "ORD-9", "")]);
        assert!(reconciler.pending_tables().is_empty());
        assert_eq!(reconciler.tables()[0].status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn test_recent_events_ring_is_capped() {
        let (reconciler, _sink) = reconciler();

        for i in 0..15 {
            reconciler.handle_event(order_event("dining_table:1", &format!("ORD-{i}")));
        }

        let recent = reconciler.recent_events();
        assert_eq!(recent.len(), RECENT_EVENTS_CAP);
        // 最旧的 5 条被挤掉
        match &recent[0].event {
            CashierEvent::OrderCreated(p) => assert_eq!(p.order_number, "ORD-5"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_event_for_unknown_table_is_ignored() {
        let (reconciler, sink) = reconciler();

        reconciler.handle_event(order_event("dining_table:nope", "ORD-9"));

        assert!(reconciler.pending_tables().is_empty());
        assert!(sink.table_calls().is_empty());
    }
}
