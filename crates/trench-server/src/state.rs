use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::registry::RoomRegistry;

pub type SharedRegistry = Arc<RwLock<RoomRegistry>>;
pub type IpConnectionMap = Arc<Mutex<HashMap<IpAddr, usize>>>;

#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
    pub config: Arc<ServerConfig>,
    pub ws_connection_count: Arc<AtomicUsize>,
    pub ws_per_ip: IpConnectionMap,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            registry: Arc::new(RwLock::new(RoomRegistry::new(&config))),
            config: Arc::new(config),
            ws_connection_count: Arc::new(AtomicUsize::new(0)),
            ws_per_ip: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// RAII counter for the global WebSocket connection cap.
pub struct ConnectionGuard {
    count: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    pub fn new(count: Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::Relaxed);
        Self { count }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::Relaxed);
    }
}

/// RAII slot in the per-IP connection table.
pub struct IpConnectionGuard {
    ip: IpAddr,
    map: IpConnectionMap,
}

impl IpConnectionGuard {
    /// Returns None when the IP is already at its connection limit.
    pub fn try_acquire(ip: IpAddr, map: IpConnectionMap, max_per_ip: usize) -> Option<Self> {
        {
            let mut table = map.lock().ok()?;
            let count = table.entry(ip).or_insert(0);
            if *count >= max_per_ip {
                return None;
            }
            *count += 1;
        }
        Some(Self { ip, map })
    }
}

impl Drop for IpConnectionGuard {
    fn drop(&mut self) {
        if let Ok(mut table) = self.map.lock()
            && let Some(count) = table.get_mut(&self.ip)
        {
            *count -= 1;
            if *count == 0 {
                table.remove(&self.ip);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn connection_guard_counts() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let _a = ConnectionGuard::new(Arc::clone(&count));
            let _b = ConnectionGuard::new(Arc::clone(&count));
            assert_eq!(count.load(Ordering::Relaxed), 2);
        }
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn ip_guard_enforces_per_ip_cap() {
        let map: IpConnectionMap = Arc::new(Mutex::new(HashMap::new()));
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let a = IpConnectionGuard::try_acquire(ip, Arc::clone(&map), 2);
        let b = IpConnectionGuard::try_acquire(ip, Arc::clone(&map), 2);
        assert!(a.is_some() && b.is_some());
        assert!(IpConnectionGuard::try_acquire(ip, Arc::clone(&map), 2).is_none());
        drop(a);
        assert!(IpConnectionGuard::try_acquire(ip, Arc::clone(&map), 2).is_some());
        drop(b);
        // Table entries are removed once the last connection drops.
        assert!(map.lock().unwrap().is_empty());
    }
}
