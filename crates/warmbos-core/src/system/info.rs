//! Host system snapshot for the "My Computer" app.

use crate::config::AppConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use sysinfo::{Disks, System};
use tracing::debug;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsInfo {
    pub system: String,
    pub release: String,
    pub version: String,
    pub machine: String,
    pub processor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    pub version: String,
    pub implementation: String,
    pub executable: String,
}

/// Disk usage in GiB, rounded to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskInfo {
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub hostname: String,
    pub fqdn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub version: String,
    pub server_time: String,
    pub uptime: String,
}

/// Full snapshot as served on `/api/system`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: OsInfo,
    pub runtime: RuntimeInfo,
    pub disk: DiskInfo,
    pub network: NetworkInfo,
    pub warmbos: ServerInfo,
}

/// Collects [`SystemInfo`] snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInfoProvider;

impl SystemInfoProvider {
    pub fn new() -> Self {
        Self
    }

    /// Take a snapshot. `path` selects the disk that is reported.
    pub fn snapshot(&self, path: &Path) -> SystemInfo {
        let hostname = System::host_name().unwrap_or_else(|| UNKNOWN.to_string());

        SystemInfo {
            os: os_info(),
            runtime: runtime_info(),
            disk: disk_info(path),
            network: NetworkInfo {
                fqdn: hostname.clone(),
                hostname,
            },
            warmbos: ServerInfo {
                version: AppConfig::VERSION.to_string(),
                server_time: format_server_time(Utc::now()),
                uptime: uptime(),
            },
        }
    }
}

fn os_info() -> OsInfo {
    let mut system = System::new();
    system.refresh_cpu_all();
    let processor = system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string());

    OsInfo {
        system: os_family().to_string(),
        release: System::kernel_version().unwrap_or_else(|| UNKNOWN.to_string()),
        version: System::long_os_version()
            .or_else(System::os_version)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        machine: std::env::consts::ARCH.to_string(),
        processor,
    }
}

fn os_family() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

fn runtime_info() -> RuntimeInfo {
    let version = match env!("CARGO_PKG_RUST_VERSION") {
        "" => UNKNOWN,
        v => v,
    };
    let executable = std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    RuntimeInfo {
        version: version.to_string(),
        implementation: "rust".to_string(),
        executable,
    }
}

/// Usage of the disk whose mount point is the longest prefix of `path`.
fn disk_info(path: &Path) -> DiskInfo {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let disks = Disks::new_with_refreshed_list();

    let best = disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len());

    match best {
        Some(disk) => disk_usage(disk.total_space(), disk.available_space()),
        None => {
            debug!("No disk found for {}", path.display());
            disk_usage(0, 0)
        }
    }
}

fn disk_usage(total: u64, free: u64) -> DiskInfo {
    let used = total.saturating_sub(free);
    let percent = if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    DiskInfo {
        total_gb: round1(total as f64 / GIB),
        used_gb: round1(used as f64 / GIB),
        free_gb: round1(free as f64 / GIB),
        percent: round1(percent),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn format_server_time(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn uptime() -> String {
    match System::uptime() {
        0 => UNKNOWN.to_string(),
        secs => format_uptime(secs),
    }
}

/// `H:MM:SS`, prefixed with `N day(s), ` once a day has passed.
pub fn format_uptime(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    let clock = format!("{}:{:02}:{:02}", hours, minutes, seconds);

    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}
