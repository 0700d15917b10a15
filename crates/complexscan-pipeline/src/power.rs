//! Power-aware gate for the search stage
//!
//! A multi-hour search on a laptop running from battery risks dying halfway
//! and leaving truncated result files that look done. Before any search is
//! issued the host is classified and, when it is a laptop on battery without
//! an explicit override, shut down.
//!
//! Host detection sits behind [`HostPower`] so the decision table can be
//! exercised with a fake host.

use complexscan_common::{Result, ScanError};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{error, info, warn};

/// Default sysfs location of power supply descriptions on Linux
pub const SYSFS_POWER_SUPPLY: &str = "/sys/class/power_supply";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostClass {
    Desktop,
    Laptop,
}

impl fmt::Display for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostClass::Desktop => write!(f, "DESKTOP"),
            HostClass::Laptop => write!(f, "LAPTOP"),
        }
    }
}

/// Host power capabilities, one implementation per operating system
pub trait HostPower: Send + Sync {
    /// Laptop when the host reports a battery, desktop otherwise
    fn host_class(&self) -> HostClass;

    /// Whether the host is currently on mains power
    fn on_mains_power(&self) -> bool;

    /// Issue the OS shutdown command
    fn shut_down(&self) -> Result<()>;
}

/// Outcome of the power check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerDecision {
    Proceed,
    ProceedWithWarning,
    Shutdown,
}

/// Decide whether the search may start
///
/// The override is only consulted for a laptop on battery.
pub fn evaluate(host: &dyn HostPower, force_run: bool) -> PowerDecision {
    match host.host_class() {
        HostClass::Desktop => PowerDecision::Proceed,
        HostClass::Laptop if host.on_mains_power() => PowerDecision::Proceed,
        HostClass::Laptop if force_run => PowerDecision::ProceedWithWarning,
        HostClass::Laptop => PowerDecision::Shutdown,
    }
}

/// Evaluate and act on the decision
///
/// A shutdown decision issues the host shutdown and returns
/// [`ScanError::PowerShutdown`] so the caller exits non-zero without issuing
/// any search.
pub fn enforce(host: &dyn HostPower, force_run: bool) -> Result<PowerDecision> {
    let decision = evaluate(host, force_run);
    match decision {
        PowerDecision::Proceed => {},
        PowerDecision::ProceedWithWarning => {
            warn!("⚠️ System is on battery, but `--force-run` is enabled. Continuing execution.");
        },
        PowerDecision::Shutdown => {
            error!("⚠️ System is running on battery. Shutting down to prevent power loss.");
            if let Err(e) = host.shut_down() {
                error!(error = %e, "Shutdown command failed");
            }
            return Err(ScanError::PowerShutdown);
        },
    }
    Ok(decision)
}

/// CPUs handed to each search: every core on a desktop, at most `laptop_cap`
/// on a laptop
pub fn allocate_cpus(class: HostClass, laptop_cap: usize, available: usize) -> usize {
    let available = available.max(1);
    match class {
        HostClass::Desktop => available,
        HostClass::Laptop => laptop_cap.clamp(1, available),
    }
}

/// [`allocate_cpus`] against this host's logical core count
pub fn cpu_allocation(class: HostClass, laptop_cap: usize) -> usize {
    allocate_cpus(class, laptop_cap, num_cpus::get())
}

/// The detector for the running operating system
pub fn platform_power() -> Box<dyn HostPower> {
    if cfg!(target_os = "linux") {
        Box::new(SysfsPower::default())
    } else if cfg!(target_os = "macos") {
        Box::new(PmsetPower)
    } else {
        Box::new(FallbackPower)
    }
}

fn run_shutdown(program: &str, args: &[&str]) -> Result<()> {
    warn!(command = %format!("{} {}", program, args.join(" ")), "Initiating shutdown");
    let status = Command::new(program).args(args).status()?;
    if !status.success() {
        return Err(ScanError::ShutdownFailed {
            program: program.to_string(),
            status: status.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Linux
// ============================================================================

/// Reads `/sys/class/power_supply`
#[derive(Debug, Clone)]
pub struct SysfsPower {
    root: PathBuf,
}

impl Default for SysfsPower {
    fn default() -> Self {
        Self::with_root(SYSFS_POWER_SUPPLY)
    }
}

#[derive(Debug, Default)]
struct SupplySnapshot {
    has_battery: bool,
    has_mains: bool,
    mains_online: bool,
    battery_discharging: bool,
}

impl SysfsPower {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_attr(dir: &Path, name: &str) -> Option<String> {
        fs::read_to_string(dir.join(name))
            .ok()
            .map(|s| s.trim().to_string())
    }

    fn snapshot(&self) -> SupplySnapshot {
        let mut snap = SupplySnapshot::default();
        let Ok(entries) = fs::read_dir(&self.root) else {
            return snap;
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let dir = entry.path();
            // Peripheral batteries (mice, keyboards) say nothing about the host
            if Self::read_attr(&dir, "scope").as_deref() == Some("Device") {
                continue;
            }
            match Self::read_attr(&dir, "type").as_deref() {
                Some("Battery") => {
                    snap.has_battery = true;
                    if Self::read_attr(&dir, "status").as_deref() == Some("Discharging") {
                        snap.battery_discharging = true;
                    }
                },
                Some("Mains") => {
                    snap.has_mains = true;
                    if Self::read_attr(&dir, "online").as_deref() == Some("1") {
                        snap.mains_online = true;
                    }
                },
                _ => {},
            }
        }
        snap
    }
}

impl HostPower for SysfsPower {
    fn host_class(&self) -> HostClass {
        if self.snapshot().has_battery {
            HostClass::Laptop
        } else {
            HostClass::Desktop
        }
    }

    fn on_mains_power(&self) -> bool {
        let snap = self.snapshot();
        if snap.has_mains {
            snap.mains_online
        } else {
            !snap.battery_discharging
        }
    }

    fn shut_down(&self) -> Result<()> {
        run_shutdown("shutdown", &["-h", "now"])
    }
}

// ============================================================================
// macOS
// ============================================================================

/// Asks `pmset -g batt`
#[derive(Debug, Clone, Copy, Default)]
pub struct PmsetPower;

/// What `pmset -g batt` says about the host: (class, on mains)
pub fn parse_pmset(output: &str) -> (HostClass, bool) {
    let class = if output.contains("InternalBattery") {
        HostClass::Laptop
    } else {
        HostClass::Desktop
    };
    let on_mains = output
        .lines()
        .next()
        .map(|first| first.contains("AC Power"))
        .unwrap_or(true);
    (class, on_mains)
}

impl PmsetPower {
    fn query(&self) -> (HostClass, bool) {
        match Command::new("pmset").args(["-g", "batt"]).output() {
            Ok(out) if out.status.success() => parse_pmset(&String::from_utf8_lossy(&out.stdout)),
            _ => (HostClass::Desktop, true),
        }
    }
}

impl HostPower for PmsetPower {
    fn host_class(&self) -> HostClass {
        self.query().0
    }

    fn on_mains_power(&self) -> bool {
        self.query().1
    }

    fn shut_down(&self) -> Result<()> {
        run_shutdown(
            "osascript",
            &["-e", "tell app \"System Events\" to shut down"],
        )
    }
}

// ============================================================================
// Everything else
// ============================================================================

/// No battery reporting available; always a desktop
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackPower;

impl HostPower for FallbackPower {
    fn host_class(&self) -> HostClass {
        HostClass::Desktop
    }

    fn on_mains_power(&self) -> bool {
        true
    }

    fn shut_down(&self) -> Result<()> {
        warn!("No shutdown command known for this operating system");
        Ok(())
    }
}

/// Log host class and CPU allocation
pub fn log_host(class: HostClass, cpus: usize) {
    info!(host = %class, "🖥️  Detected system");
    info!(cpus, "🔢 Allocating CPUs for HMMER");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;
    use tempfile::TempDir;

    #[test]
    fn test_desktop_always_proceeds() {
        for force in [false, true] {
            for mains in [false, true] {
                let host = FakeHost::new(HostClass::Desktop, mains);
                assert_eq!(evaluate(&host, force), PowerDecision::Proceed);
            }
        }
    }

    #[test]
    fn test_laptop_decisions() {
        let plugged = FakeHost::new(HostClass::Laptop, true);
        assert_eq!(evaluate(&plugged, false), PowerDecision::Proceed);

        let battery = FakeHost::new(HostClass::Laptop, false);
        assert_eq!(evaluate(&battery, false), PowerDecision::Shutdown);
        assert_eq!(evaluate(&battery, true), PowerDecision::ProceedWithWarning);
    }

    #[test]
    fn test_enforce_shuts_down_and_errors() {
        let host = FakeHost::new(HostClass::Laptop, false);
        let err = enforce(&host, false).unwrap_err();
        assert!(matches!(err, ScanError::PowerShutdown));
        assert!(host.was_shut_down());
    }

    #[test]
    fn test_enforce_override_does_not_shut_down() {
        let host = FakeHost::new(HostClass::Laptop, false);
        assert_eq!(
            enforce(&host, true).unwrap(),
            PowerDecision::ProceedWithWarning
        );
        assert!(!host.was_shut_down());
    }

    #[test]
    fn test_allocate_cpus() {
        assert_eq!(allocate_cpus(HostClass::Desktop, 4, 16), 16);
        assert_eq!(allocate_cpus(HostClass::Laptop, 4, 16), 4);
        assert_eq!(allocate_cpus(HostClass::Laptop, 4, 2), 2);
        assert_eq!(allocate_cpus(HostClass::Desktop, 4, 0), 1);
    }

    fn supply(root: &Path, name: &str, attrs: &[(&str, &str)]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for (key, value) in attrs {
            fs::write(dir.join(key), format!("{}\n", value)).unwrap();
        }
    }

    #[test]
    fn test_sysfs_without_battery_is_desktop() {
        let dir = TempDir::new().unwrap();
        supply(dir.path(), "AC", &[("type", "Mains"), ("online", "1")]);
        let host = SysfsPower::with_root(dir.path());
        assert_eq!(host.host_class(), HostClass::Desktop);

        let missing = SysfsPower::with_root(dir.path().join("absent"));
        assert_eq!(missing.host_class(), HostClass::Desktop);
        assert!(missing.on_mains_power());
    }

    #[test]
    fn test_sysfs_laptop_mains_state() {
        let dir = TempDir::new().unwrap();
        supply(dir.path(), "BAT0", &[("type", "Battery"), ("status", "Discharging")]);
        supply(dir.path(), "AC", &[("type", "Mains"), ("online", "0")]);
        let host = SysfsPower::with_root(dir.path());
        assert_eq!(host.host_class(), HostClass::Laptop);
        assert!(!host.on_mains_power());

        supply(dir.path(), "AC", &[("type", "Mains"), ("online", "1")]);
        assert!(host.on_mains_power());
    }

    #[test]
    fn test_sysfs_battery_status_without_mains_supply() {
        let dir = TempDir::new().unwrap();
        supply(dir.path(), "BAT0", &[("type", "Battery"), ("status", "Charging")]);
        let host = SysfsPower::with_root(dir.path());
        assert!(host.on_mains_power());

        supply(dir.path(), "BAT0", &[("type", "Battery"), ("status", "Discharging")]);
        assert!(!host.on_mains_power());
    }

    #[test]
    fn test_sysfs_ignores_peripheral_batteries() {
        let dir = TempDir::new().unwrap();
        supply(
            dir.path(),
            "hid-00:1f:20:aa:bb:cc-battery",
            &[("type", "Battery"), ("scope", "Device"), ("status", "Discharging")],
        );
        let host = SysfsPower::with_root(dir.path());
        assert_eq!(host.host_class(), HostClass::Desktop);
        assert!(host.on_mains_power());
        assert_eq!(evaluate(&host, false), PowerDecision::Proceed);

        supply(dir.path(), "BAT0", &[("type", "Battery"), ("scope", "System"), ("status", "Discharging")]);
        assert_eq!(host.host_class(), HostClass::Laptop);
        assert!(!host.on_mains_power());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_shutdown_command_is_reported() {
        let err = run_shutdown("false", &[]).unwrap_err();
        assert!(matches!(err, ScanError::ShutdownFailed { ref program, .. } if program == "false"));
    }

    #[test]
    fn test_parse_pmset() {
        let laptop_battery = "Now drawing from 'Battery Power'\n \
            -InternalBattery-0 (id=1234)\t85%; discharging; 4:10 remaining present: true\n";
        assert_eq!(parse_pmset(laptop_battery), (HostClass::Laptop, false));

        let laptop_ac = "Now drawing from 'AC Power'\n \
            -InternalBattery-0 (id=1234)\t100%; charged; 0:00 remaining present: true\n";
        assert_eq!(parse_pmset(laptop_ac), (HostClass::Laptop, true));

        assert_eq!(
            parse_pmset("Now drawing from 'AC Power'\n"),
            (HostClass::Desktop, true)
        );
    }
}
