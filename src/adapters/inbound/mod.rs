mod host_bridge;

pub use host_bridge::HostBridge;
