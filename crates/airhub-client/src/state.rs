//! Per-controller in-memory model of units and zones.
//!
//! [`ControllerState`] is fed decoded session events and answers the
//! queries the external accessory layer needs. It never panics on
//! surprising input: status for an entity whose ability has not arrived
//! yet is logged and dropped, because only the ability record defines
//! which units exist and which zones they own.

use std::collections::BTreeMap;

use airhub_core::messages::ac_status::AcStatus;
use airhub_core::messages::zone_status::ZoneStatus;
use airhub_net::{SessionEvent, UnitAbility};
use log::{debug, warn};

use crate::climate::{current_action, target_mode, ClimateAction, TargetMode};
use crate::events::ControllerEvent;

/// One AC unit: static capability plus the latest status, if any arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub ability: UnitAbility,
    pub status: Option<AcStatus>,
}

/// One zone. Materialized from the owning unit's ability record; status
/// and name fill in as their messages arrive.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub zone: u8,
    /// Unit number that owns this zone, per the ability zone range.
    pub unit: u8,
    pub name: Option<String>,
    pub status: Option<ZoneStatus>,
    ready_announced: bool,
}

/// The aggregated model for one controller.
#[derive(Debug, Default)]
pub struct ControllerState {
    units: BTreeMap<u8, Unit>,
    zones: BTreeMap<u8, Zone>,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one session event and returns the resulting change
    /// notifications, in emit order.
    pub fn apply(&mut self, event: SessionEvent) -> Vec<ControllerEvent> {
        match event {
            SessionEvent::Connected => Vec::new(),
            SessionEvent::Reconnecting => vec![ControllerEvent::Reconnecting],
            SessionEvent::UnitAbility(ability) => self.add_ability(ability).into_iter().collect(),
            SessionEvent::AcStatus(status) => self.update_ac_status(status).into_iter().collect(),
            SessionEvent::ZoneStatus(status) => {
                self.update_zone_status(status).into_iter().collect()
            }
            SessionEvent::ZoneName { zone, name } => self.set_zone_name(zone, name),
        }
    }

    /// Records a unit's capability and materializes its zone range.
    /// First write wins: capability is static for the session, so a
    /// duplicate is dropped.
    pub fn add_ability(&mut self, ability: UnitAbility) -> Option<ControllerEvent> {
        if self.units.contains_key(&ability.unit) {
            debug!("duplicate ability for unit {}, keeping the first", ability.unit);
            return None;
        }
        let end = u16::from(ability.start_zone) + u16::from(ability.zone_count);
        for zone in u16::from(ability.start_zone)..end.min(u16::from(u8::MAX)) {
            let zone = zone as u8;
            self.zones.entry(zone).or_insert(Zone {
                zone,
                unit: ability.unit,
                name: None,
                status: None,
                ready_announced: false,
            });
        }
        self.units.insert(
            ability.unit,
            Unit {
                ability: ability.clone(),
                status: None,
            },
        );
        Some(ControllerEvent::UnitAbilityDiscovered(ability))
    }

    /// Replaces a unit's status wholesale.
    pub fn update_ac_status(&mut self, status: AcStatus) -> Option<ControllerEvent> {
        match self.units.get_mut(&status.unit) {
            Some(unit) => {
                unit.status = Some(status);
                Some(ControllerEvent::UnitStatusUpdated(status))
            }
            None => {
                warn!("status for unknown unit {}, dropped", status.unit);
                None
            }
        }
    }

    /// Replaces a zone's status wholesale.
    pub fn update_zone_status(&mut self, status: ZoneStatus) -> Option<ControllerEvent> {
        match self.zones.get_mut(&status.zone) {
            Some(zone) => {
                zone.status = Some(status);
                Some(ControllerEvent::ZoneStatusUpdated(status))
            }
            None => {
                warn!("status for unknown zone {}, dropped", status.zone);
                None
            }
        }
    }

    /// Merges a zone's name. The first non-empty name also announces the
    /// zone as ready for external registration, exactly once.
    pub fn set_zone_name(&mut self, zone_number: u8, name: String) -> Vec<ControllerEvent> {
        let Some(zone) = self.zones.get_mut(&zone_number) else {
            warn!("name for unknown zone {zone_number}, dropped");
            return Vec::new();
        };
        let announce = !zone.ready_announced && !name.is_empty();
        zone.name = Some(name.clone());
        let mut out = vec![ControllerEvent::ZoneNameUpdated {
            zone: zone_number,
            name,
        }];
        if announce {
            zone.ready_announced = true;
            out.push(ControllerEvent::ZoneReadyForRegistration { zone: zone_number });
        }
        out
    }

    pub fn unit(&self, unit: u8) -> Option<&Unit> {
        self.units.get(&unit)
    }

    pub fn zone(&self, zone: u8) -> Option<&Zone> {
        self.zones.get(&zone)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// The unit owning `zone`, if the zone is known.
    pub fn owning_unit(&self, zone: u8) -> Option<&Unit> {
        self.units.get(&self.zones.get(&zone)?.unit)
    }

    /// A zone's current temperature. Zones without a local sensor report
    /// a meaningless value, so the owning unit's reading is used instead.
    pub fn zone_current_temp(&self, zone: u8) -> Option<f32> {
        let status = self.zones.get(&zone)?.status.as_ref()?;
        if status.has_sensor {
            return Some(status.current_temp);
        }
        Some(self.owning_unit(zone)?.status.as_ref()?.current_temp)
    }

    pub fn zone_damper_percent(&self, zone: u8) -> Option<u8> {
        Some(self.zones.get(&zone)?.status.as_ref()?.damper_percent)
    }

    /// What a zone is doing right now. Requires both the zone's and the
    /// owning unit's status.
    pub fn zone_current_action(&self, zone: u8) -> Option<ClimateAction> {
        let zone_status = self.zones.get(&zone)?.status.as_ref()?;
        let unit_status = self.owning_unit(zone)?.status.as_ref()?;
        let powered = unit_status.power.is_on() && zone_status.power.is_on();
        let airflow_open = zone_status.damper_percent > 0;
        let current = self.zone_current_temp(zone)?;
        Some(current_action(
            powered,
            airflow_open,
            unit_status.mode,
            zone_status.setpoint,
            current,
        ))
    }

    /// What a unit is doing right now.
    pub fn unit_current_action(&self, unit: u8) -> Option<ClimateAction> {
        let status = self.units.get(&unit)?.status.as_ref()?;
        Some(current_action(
            status.power.is_on(),
            true,
            status.mode,
            status.setpoint,
            status.current_temp,
        ))
    }

    /// A unit's configured target mode.
    pub fn unit_target_mode(&self, unit: u8) -> Option<TargetMode> {
        let status = self.units.get(&unit)?.status.as_ref()?;
        Some(target_mode(status.mode))
    }
}
