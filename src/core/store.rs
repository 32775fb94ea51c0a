//! 会话存储：按 id 持有 Arc<Mutex<Session>>
//!
//! 外层 RwLock 只保护映射本身，持锁时间很短；对单个会话的修改由调用方持有其 Mutex 完成。
//! 过期清理跳过正在被操作的会话（try_lock 失败）。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::session::{Session, SessionId};
use crate::core::timer::Clock;

/// 共享的单会话句柄
pub type SessionHandle = Arc<Mutex<Session>>;

pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    idle_timeout: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(idle_timeout_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: chrono::Duration::seconds(idle_timeout_secs as i64),
            clock,
        }
    }

    /// 新建会话，返回其 id
    pub async fn create(&self) -> SessionId {
        let id = format!("session_{}", uuid::Uuid::new_v4());
        self.insert_new(id).await
    }

    /// 已知 id 直接返回；未知 id 以其为键新建；未给出时生成新 id
    pub async fn get_or_create(&self, id: Option<&str>) -> SessionId {
        let Some(id) = id else {
            return self.create().await;
        };
        if self.sessions.read().await.contains_key(id) {
            return id.to_string();
        }
        self.insert_new(id.to_string()).await
    }

    async fn insert_new(&self, id: SessionId) -> SessionId {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(&id) {
            sessions.insert(
                id.clone(),
                Arc::new(Mutex::new(Session::new(id.clone(), now))),
            );
            tracing::debug!(session_id = %id, "session created");
        }
        id
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// 移除空闲超过 idle_timeout 的会话，返回移除数量
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;

        let expired: Vec<SessionId> = sessions
            .iter()
            .filter_map(|(id, handle)| {
                let session = handle.try_lock().ok()?;
                (now - session.last_active >= self.idle_timeout).then(|| id.clone())
            })
            .collect();

        for id in &expired {
            sessions.remove(id);
        }
        expired.len()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// 后台定期清理，token 取消后退出
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let expired = self.cleanup_expired().await;
                        if expired > 0 {
                            tracing::info!("Cleaned up {} expired sessions", expired);
                        }
                    }
                }
            }
            tracing::debug!("session sweeper stopped");
        })
    }
}
