//! Ternary climate-state derivation shared by unit- and zone-level views.
//!
//! External ecosystems model climate devices as heat/cool/idle; the
//! controller's mode space is wider. Dry and fan-only collapse onto cool,
//! a documented lossy approximation. The two derivations use different
//! fail-safes for unknown modes: current state falls back to idle (claim
//! nothing is happening), target mode falls back to auto (never surprise
//! an idle user with a heat command).

use airhub_core::types::AcMode;
use log::warn;

/// What the system is doing right now, as a ternary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimateAction {
    Heating,
    Cooling,
    Idle,
}

/// What the system is configured to do, as seen by an external ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Auto,
    Heat,
    Cool,
}

/// Derives the current action from live state.
///
/// `airflow_open` is false when the zone's damper is fully closed; unit
/// level callers pass true. In auto mode the compressor direction is
/// inferred from the setpoint/temperature comparison; everywhere else the
/// mode is authoritative.
pub fn current_action(
    powered: bool,
    airflow_open: bool,
    mode: AcMode,
    setpoint: f32,
    current_temp: f32,
) -> ClimateAction {
    if !powered || !airflow_open {
        return ClimateAction::Idle;
    }
    match mode {
        AcMode::Auto => {
            if setpoint < current_temp {
                ClimateAction::Cooling
            } else {
                ClimateAction::Heating
            }
        }
        AcMode::Heat | AcMode::AutoHeat => ClimateAction::Heating,
        AcMode::Cool | AcMode::AutoCool => ClimateAction::Cooling,
        AcMode::Dry | AcMode::Fan => ClimateAction::Cooling,
        AcMode::Unknown(code) => {
            warn!("unknown AC mode {code}, reporting idle");
            ClimateAction::Idle
        }
    }
}

/// Derives the configured target mode. Mode is authoritative; no
/// temperature comparison is involved.
pub fn target_mode(mode: AcMode) -> TargetMode {
    match mode {
        AcMode::Auto => TargetMode::Auto,
        AcMode::Heat | AcMode::AutoHeat => TargetMode::Heat,
        AcMode::Cool | AcMode::AutoCool | AcMode::Dry | AcMode::Fan => TargetMode::Cool,
        AcMode::Unknown(code) => {
            warn!("unknown AC mode {code}, reporting auto");
            TargetMode::Auto
        }
    }
}
