//! Drive a simulated Linkam controller end to end.
//!
//! Usage:
//!   linkam-sim [CONFIG.toml]
//!
//! Opens a session on the in-process simulator, connects over USB, prints the controller
//! name and heater readings, moves the set-point and toggles the heater. Set `RUST_LOG` to
//! see the library's own logging (default `info`).

use anyhow::{bail, Context};
use linkam::sim::SimulatedController;
use linkam::units::{Quantity, Unit};
use linkam::{Parameter, Session, SessionConfig, StatusWord};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SessionConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => SessionConfig::default(),
    };

    let session = Session::open(SimulatedController::new(), config)?;
    let stage = session.connect_usb(None)?;

    println!("Name: {}", stage.controller_name()?);
    println!("Serial: {}", stage.controller_serial()?);
    println!("Heater measurement: {}", stage.get(Parameter::Heater1Temp)?);
    println!("Heater set-point before: {}", stage.get(Parameter::HeaterSetpoint)?);
    let (min, max) = stage.get_range(Parameter::HeaterSetpoint)?;
    println!("Heater set-point range: {} .. {}", min, max);

    if !stage.set(Parameter::HeaterSetpoint, Quantity::new(30.0, Unit::DegC))? {
        bail!("controller refused the new set-point");
    }
    stage.enable_heater(true)?;
    println!("Heater set-point after: {}", stage.get(Parameter::HeaterSetpoint)?);
    println!("Status: {:?}", stage.controller_status()?.active());

    let details = stage.heater_details(0)?;
    println!("Heater limits: {} .. {} degC, max rate {} degC/min", details.min_limit, details.max_limit, details.max_rate);

    stage.enable_heater(false)?;
    Ok(())
}
