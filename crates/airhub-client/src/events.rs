use airhub_core::messages::ac_status::AcStatus;
use airhub_core::messages::zone_status::ZoneStatus;
use airhub_net::UnitAbility;

/// Change notifications emitted after the state model has been updated.
///
/// Consumers must tolerate repeats: a reconnect replays the bootstrap, so
/// abilities and statuses arrive again.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// A unit's capability record arrived for the first time.
    UnitAbilityDiscovered(UnitAbility),
    UnitStatusUpdated(AcStatus),
    ZoneStatusUpdated(ZoneStatus),
    ZoneNameUpdated { zone: u8, name: String },
    /// The zone now has a name and can be exposed externally. Emitted at
    /// most once per zone per session.
    ZoneReadyForRegistration { zone: u8 },
    /// The session lost its connection and will redial.
    Reconnecting,
}
