use airhub_client::{ControllerClient, ControllerEvent};
use airhub_net::CONTROLLER_PORT;
use airhub_tools::{FanSpeedArg, ModeArg};
use clap::{Parser, ValueEnum};
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PowerArg {
    On,
    Off,
}

#[derive(Parser, Debug)]
#[command(name = "airhub-acctl")]
struct Args {
    /// Controller address.
    #[arg(long)]
    ip: IpAddr,
    #[arg(long, default_value_t = CONTROLLER_PORT)]
    port: u16,
    /// AC unit number, 0-7.
    #[arg(long, default_value_t = 0)]
    unit: u8,
    #[arg(long, value_enum)]
    power: Option<PowerArg>,
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    #[arg(long, value_enum)]
    fan: Option<FanSpeedArg>,
    /// Target temperature in degrees Celsius, 10.0-35.0.
    #[arg(long)]
    setpoint: Option<f32>,
    /// Seconds to wait for a confirming status push.
    #[arg(long, default_value_t = 10)]
    confirm_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let (client, mut events) = ControllerClient::connect((args.ip, args.port).into());

    if let Some(power) = args.power {
        client.set_unit_power(args.unit, matches!(power, PowerArg::On))?;
    }
    if let Some(mode) = args.mode {
        client.set_unit_mode(args.unit, mode.into_mode())?;
    }
    if let Some(fan) = args.fan {
        client.set_unit_fan_speed(args.unit, fan.into_fan_speed())?;
    }
    if let Some(setpoint) = args.setpoint {
        client.set_unit_setpoint(args.unit, setpoint)?;
    }

    // No acknowledgements on this protocol: wait for the next unsolicited
    // status push for the unit instead.
    let confirm = async {
        while let Some(event) = events.recv().await {
            if let ControllerEvent::UnitStatusUpdated(status) = event {
                if status.unit == args.unit {
                    return Some(status);
                }
            }
        }
        None
    };
    match timeout(Duration::from_secs(args.confirm_secs), confirm).await {
        Ok(Some(status)) => println!(
            "unit {}: power={:?} mode={:?} fan={:?} target={} current={}",
            status.unit,
            status.power,
            status.mode,
            status.fan_speed,
            status.setpoint,
            status.current_temp,
        ),
        Ok(None) => eprintln!("session ended before a status push arrived"),
        Err(_) => eprintln!("no status push within {}s; command may still apply", args.confirm_secs),
    }
    Ok(())
}
