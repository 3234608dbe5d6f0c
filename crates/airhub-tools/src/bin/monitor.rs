use airhub_client::{ControllerClient, ControllerEvent};
use airhub_net::CONTROLLER_PORT;
use clap::Parser;
use std::net::IpAddr;

#[derive(Parser, Debug)]
#[command(name = "airhub-monitor")]
struct Args {
    /// Controller address.
    #[arg(long)]
    ip: IpAddr,
    #[arg(long, default_value_t = CONTROLLER_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let (_client, mut events) = ControllerClient::connect((args.ip, args.port).into());
    println!("Monitoring {}:{} (Ctrl+C to stop)...", args.ip, args.port);

    while let Some(event) = events.recv().await {
        match event {
            ControllerEvent::UnitAbilityDiscovered(ability) => println!(
                "ABILITY: unit {} \"{}\" zones {}..{} cool {}-{} heat {}-{}",
                ability.unit,
                ability.name,
                ability.start_zone,
                ability.start_zone + ability.zone_count.saturating_sub(1),
                ability.min_cool_setpoint,
                ability.max_cool_setpoint,
                ability.min_heat_setpoint,
                ability.max_heat_setpoint,
            ),
            ControllerEvent::UnitStatusUpdated(status) => println!(
                "UNIT {}: power={:?} mode={:?} fan={:?} target={} current={} error={}",
                status.unit,
                status.power,
                status.mode,
                status.fan_speed,
                status.setpoint,
                status.current_temp,
                status.error_code,
            ),
            ControllerEvent::ZoneStatusUpdated(status) => println!(
                "ZONE {}: power={:?} damper={}% target={} current={}{}",
                status.zone,
                status.power,
                status.damper_percent,
                status.setpoint,
                status.current_temp,
                if status.has_sensor { "" } else { " (no sensor)" },
            ),
            ControllerEvent::ZoneNameUpdated { zone, name } => {
                println!("NAME: zone {zone} = \"{name}\"");
            }
            ControllerEvent::ZoneReadyForRegistration { zone } => {
                println!("READY: zone {zone}");
            }
            ControllerEvent::Reconnecting => println!("RECONNECTING..."),
        }
    }
    Ok(())
}
