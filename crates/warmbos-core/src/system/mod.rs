//! System utilities module.
//!
//! Provides the host snapshot served to the desktop:
//! - OS, CPU and runtime identification
//! - Disk usage for the desktop root
//! - Hostname, server time and uptime

mod info;

pub use info::{
    format_uptime, DiskInfo, NetworkInfo, OsInfo, RuntimeInfo, ServerInfo, SystemInfo,
    SystemInfoProvider,
};
