//! Per-device command queues and presence tracking for RFID scanner devices.
//!
//! Each ESP32 scanner polls for queued commands and posts status heartbeats.
//! Commands are FIFO per device and age out after a configurable TTL; devices
//! that stop heartbeating are reported offline. The registry is owned by
//! `AppState` so tests can construct one around a `ManualClock` instead of a
//! process-wide singleton with a wall-clock sweep task.

use crate::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A device's last status is kept for this many offline windows before the
/// sweep forgets the device entirely.
const STATUS_RETENTION_FACTOR: i32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCommand {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatus {
    pub device_id: String,
    pub payload: Value,
    pub last_seen: DateTime<Utc>,
    pub online: bool,
}

#[derive(Clone)]
pub struct ScannerRegistry {
    commands: Arc<RwLock<HashMap<String, VecDeque<DeviceCommand>>>>,
    status: Arc<RwLock<HashMap<String, (Value, DateTime<Utc>)>>>,
    clock: Arc<dyn Clock>,
    command_ttl: Duration,
    offline_after: Duration,
}

impl ScannerRegistry {
    pub fn new(clock: Arc<dyn Clock>, command_ttl_seconds: u64, offline_after_seconds: u64) -> Self {
        Self {
            commands: Arc::new(RwLock::new(HashMap::new())),
            status: Arc::new(RwLock::new(HashMap::new())),
            clock,
            command_ttl: Duration::seconds(command_ttl_seconds as i64),
            offline_after: Duration::seconds(offline_after_seconds as i64),
        }
    }

    /// Queues a command for `device_id`.
    pub async fn enqueue(&self, device_id: &str, command: &str, mode: Option<String>, params: Option<Value>) {
        let cmd = DeviceCommand {
            command: command.to_string(),
            mode,
            params,
            queued_at: self.clock.now(),
        };
        let mut map = self.commands.write().await;
        map.entry(device_id.to_string()).or_default().push_back(cmd);
    }

    /// Pops the oldest still-fresh command for `device_id`, evicting any that
    /// aged past the TTL while waiting.
    pub async fn poll(&self, device_id: &str) -> Option<DeviceCommand> {
        let now = self.clock.now();
        let mut map = self.commands.write().await;
        let queue = map.get_mut(device_id)?;
        while let Some(cmd) = queue.pop_front() {
            if now - cmd.queued_at < self.command_ttl {
                return Some(cmd);
            }
            tracing::debug!(device_id, command = %cmd.command, "Dropping expired scanner command");
        }
        map.remove(device_id);
        None
    }

    /// Records a status heartbeat from a device.
    pub async fn update_status(&self, device_id: &str, payload: Value) {
        let mut map = self.status.write().await;
        map.insert(device_id.to_string(), (payload, self.clock.now()));
    }

    /// Snapshot of every known device, with staleness resolved against the clock.
    pub async fn statuses(&self) -> Vec<DeviceStatus> {
        let now = self.clock.now();
        let map = self.status.read().await;
        map.iter()
            .map(|(id, (payload, last_seen))| DeviceStatus {
                device_id: id.clone(),
                payload: payload.clone(),
                last_seen: *last_seen,
                online: now - *last_seen < self.offline_after,
            })
            .collect()
    }

    /// Drops expired commands across all queues and forgets devices that have
    /// been silent for many offline windows. The device poll endpoint runs
    /// this on every request; tests drive it directly.
    pub async fn sweep(&self) {
        let now = self.clock.now();
        let mut map = self.commands.write().await;
        map.retain(|device_id, queue| {
            let before = queue.len();
            queue.retain(|cmd| now - cmd.queued_at < self.command_ttl);
            if queue.len() != before {
                tracing::info!(device_id, dropped = before - queue.len(), "Swept expired scanner commands");
            }
            !queue.is_empty()
        });
        drop(map);

        let retention = self.offline_after * STATUS_RETENTION_FACTOR;
        let mut map = self.status.write().await;
        map.retain(|device_id, (_, last_seen)| {
            let keep = now - *last_seen < retention;
            if !keep {
                tracing::info!(device_id, "Forgetting long-silent scanner");
            }
            keep
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    fn registry() -> (ScannerRegistry, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        (
            ScannerRegistry::new(Arc::new(clock.clone()), 300, 300),
            clock,
        )
    }

    #[tokio::test]
    async fn commands_pop_in_fifo_order() {
        let (reg, _clock) = registry();
        reg.enqueue("esp32-1", "start_scan", Some("exam".into()), None).await;
        reg.enqueue("esp32-1", "stop_scan", None, None).await;

        assert_eq!(reg.poll("esp32-1").await.unwrap().command, "start_scan");
        assert_eq!(reg.poll("esp32-1").await.unwrap().command, "stop_scan");
        assert!(reg.poll("esp32-1").await.is_none());
    }

    #[tokio::test]
    async fn expired_commands_are_skipped_on_poll() {
        let (reg, clock) = registry();
        reg.enqueue("esp32-1", "start_scan", None, None).await;
        clock.advance(Duration::seconds(301));
        reg.enqueue("esp32-1", "stop_scan", None, None).await;

        assert_eq!(reg.poll("esp32-1").await.unwrap().command, "stop_scan");
    }

    #[tokio::test]
    async fn sweep_evicts_stale_queues() {
        let (reg, clock) = registry();
        reg.enqueue("esp32-1", "start_scan", None, None).await;
        clock.advance(Duration::seconds(301));
        reg.sweep().await;

        assert!(reg.poll("esp32-1").await.is_none());
    }

    #[tokio::test]
    async fn silent_devices_go_offline() {
        let (reg, clock) = registry();
        reg.update_status("esp32-1", json!({"battery": 80})).await;

        let fresh = reg.statuses().await;
        assert!(fresh[0].online);

        clock.advance(Duration::seconds(301));
        let stale = reg.statuses().await;
        assert!(!stale[0].online);
    }

    #[tokio::test]
    async fn sweep_forgets_long_silent_devices() {
        let (reg, clock) = registry();
        reg.update_status("esp32-1", json!({"battery": 80})).await;
        clock.advance(Duration::seconds(3601));
        reg.update_status("esp32-2", json!({"battery": 55})).await;

        reg.sweep().await;

        // Merely offline devices stay listed; only the long-silent one goes.
        let statuses = reg.statuses().await;
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].device_id, "esp32-2");
    }
}
