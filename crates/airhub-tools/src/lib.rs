use airhub_core::types::{AcMode, FanSpeed};
use clap::ValueEnum;

/// CLI-friendly AC mode selector.
///
/// Only the modes a user can sensibly request; the auto-resolved variants
/// (auto-heat, auto-cool) are status-side and not offered.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Auto,
    Heat,
    Dry,
    Fan,
    Cool,
}

impl ModeArg {
    pub const fn into_mode(self) -> AcMode {
        match self {
            Self::Auto => AcMode::Auto,
            Self::Heat => AcMode::Heat,
            Self::Dry => AcMode::Dry,
            Self::Fan => AcMode::Fan,
            Self::Cool => AcMode::Cool,
        }
    }
}

/// CLI-friendly fan speed selector.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FanSpeedArg {
    Auto,
    Quiet,
    Low,
    Medium,
    High,
    Powerful,
    Turbo,
    Intelligent,
}

impl FanSpeedArg {
    pub const fn into_fan_speed(self) -> FanSpeed {
        match self {
            Self::Auto => FanSpeed::Auto,
            Self::Quiet => FanSpeed::Quiet,
            Self::Low => FanSpeed::Low,
            Self::Medium => FanSpeed::Medium,
            Self::High => FanSpeed::High,
            Self::Powerful => FanSpeed::Powerful,
            Self::Turbo => FanSpeed::Turbo,
            Self::Intelligent => FanSpeed::Intelligent,
        }
    }
}
