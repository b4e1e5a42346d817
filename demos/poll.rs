//! Poll a battery every few seconds and print what it reports.
//!
//! BATTERY_BLE_NAME=BT-TH-6A1B2C3D RUST_LOG=info cargo run --example poll --features bluetooth

use std::time::Duration;

use anyhow::Context;
use renogy_battery::{BatteryClient, Config};

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let name = std::env::var("BATTERY_BLE_NAME").context("BATTERY_BLE_NAME is not set")?;
    let device_id = match std::env::var("BATTERY_DEVICE_ID") {
        Ok(id) => id.parse().context("BATTERY_DEVICE_ID must be 0-255")?,
        Err(_) => BatteryClient::DEFAULT_DEVICE_ID,
    };

    let mut battery_client = BatteryClient::new(&name, device_id, config).await?;
    loop {
        let battery_state = battery_client.fetch_state().await?;
        for (field, value) in battery_state.fields() {
            println!("{field}: {value}");
        }
        for (field, err) in battery_state.field_errors() {
            println!("{field}: <{err}>");
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}
