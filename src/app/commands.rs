//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (network
//! configuration server, serial console) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::SystemConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Force the fan on for this many seconds.  Zero cancels.
    RunFor(u32),

    /// Drop any pending manual run.
    CancelRun,

    /// Erase the measurement history.
    ClearHistory,

    /// Hot-reload configuration.
    UpdateConfig(SystemConfig),

    /// Persist the current config on the next auto-save check.
    SaveConfig,
}
