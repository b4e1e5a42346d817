//! Poll a battery through a BT-2 style Bluetooth Low Energy module.
//!
//! The module bridges BLE to the battery's Modbus interface: requests are
//! written to one characteristic and the response arrives as notifications on
//! another, possibly split over several notifications.

use anyhow::anyhow;
use bluest::Adapter;
use bluest::AdvertisingDevice;
use bluest::Characteristic;
use bluest::Device;
use bluest::Uuid;
use futures_util::Stream;
use futures_util::StreamExt;
use tokio::time::timeout;
use tokio::time::Duration;

use crate::battery_state::BatteryState;
use crate::config::Config;
use crate::error::DecodeError;
use crate::frame::{read_request, try_parse_msg, TryParseMessageResult};
use crate::section::SECTIONS;
use crate::session::DecodingSession;

pub struct BatteryClient {
    adapter: Adapter,
    device: Device,
    write: Characteristic,
    notify: Characteristic,
    device_id: u8,
    session: DecodingSession,
}

impl BatteryClient {
    const WRITE_SERVICE_ID: &'static str = "0000ffd0-0000-1000-8000-00805f9b34fb";
    const WRITE_CHARACTERISTIC_ID: &'static str = "0000ffd1-0000-1000-8000-00805f9b34fb";
    const NOTIFY_SERVICE_ID: &'static str = "0000fff0-0000-1000-8000-00805f9b34fb";
    const NOTIFY_CHARACTERISTIC_ID: &'static str = "0000fff1-0000-1000-8000-00805f9b34fb";
    /// The Modbus id batteries answer to when addressed through a BT-2 module
    pub const DEFAULT_DEVICE_ID: u8 = 0x30;
    const DISCOVERY_TIMEOUT_S: u64 = 30;
    // How long to wait without any notifications before giving up on a partial message
    const NOTIFICATION_TIMEOUT_S: u64 = 5;

    /// Disconnect from the battery
    pub async fn stop(self) -> anyhow::Result<()> {
        self.adapter.disconnect_device(&self.device).await?;
        Ok(())
    }

    /// Create a new `BatteryClient`, which includes attempting to discover the device.
    pub async fn new(ble_device_name: &str, device_id: u8, config: Config) -> anyhow::Result<Self> {
        let adapter = bluest::Adapter::default()
            .await
            .ok_or(anyhow!("Default adapter not found"))?;
        adapter.wait_available().await?;

        let device = timeout(
            Duration::from_secs(Self::DISCOVERY_TIMEOUT_S),
            Self::discover_device(ble_device_name, &adapter),
        )
        .await
        .map_err(|_| anyhow!("Device not found"))??;

        adapter.connect_device(&device.device).await?;
        log::info!("Connected to {ble_device_name}");

        let write =
            Self::find_characteristic(&device.device, Self::WRITE_SERVICE_ID, Self::WRITE_CHARACTERISTIC_ID)
                .await?;
        let notify =
            Self::find_characteristic(&device.device, Self::NOTIFY_SERVICE_ID, Self::NOTIFY_CHARACTERISTIC_ID)
                .await?;

        Ok(Self {
            adapter: adapter.clone(),
            device: device.device,
            write,
            notify,
            device_id,
            session: DecodingSession::new(config),
        })
    }

    /// Poll every section once and return the decoded state.
    ///
    /// A section that cannot be read or decoded is logged and left out of the
    /// result; the remaining sections are still polled. A section whose
    /// prerequisite was not read is skipped without a request.
    pub async fn fetch_state(&mut self) -> anyhow::Result<BatteryState> {
        self.try_connect().await?;

        for descriptor in SECTIONS.iter() {
            if let Some(required) = self.session.missing_prerequisite(descriptor.section) {
                log::warn!("Skipping {:?}: {required:?} was not read this cycle", descriptor.section);
                continue;
            }

            let rq = read_request(self.device_id, descriptor.register, descriptor.words);
            let frame = match self.request_response(&rq).await {
                Ok(frame) => frame,
                Err(err) => {
                    log::warn!("Failed to read {:?}: {err}", descriptor.section);
                    continue;
                }
            };

            // failures are logged by the session, only a sequencing defect stops the cycle
            let delivered = self.session.deliver_frame(descriptor.register, &frame).map(|_| ());
            if let Err(err @ DecodeError::MissingDependency { .. }) = delivered {
                self.session.finish_cycle();
                return Err(err.into());
            }
        }

        Ok(self.session.finish_cycle())
    }

    async fn discover_device(name: &str, adapter: &Adapter) -> anyhow::Result<AdvertisingDevice> {
        let mut adapter_events = adapter.scan(&[]).await?;
        while let Some(device) = timeout(Duration::from_secs(Self::DISCOVERY_TIMEOUT_S), adapter_events.next())
            .await
            .map_err(|_| anyhow!("Device not found"))?
        {
            let device_name = device.device.name_async().await?;
            if device_name == name {
                return Ok(device);
            }
        }

        Err(anyhow!("Device not found"))
    }

    async fn find_characteristic(device: &Device, service_id: &str, characteristic_id: &str) -> anyhow::Result<Characteristic> {
        let service = device
            .discover_services_with_uuid(Uuid::parse_str(service_id)?)
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the service {service_id}."))?
            .clone();
        let characteristic = service
            .discover_characteristics_with_uuid(Uuid::parse_str(characteristic_id)?)
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the characteristic {characteristic_id}."))?
            .clone();
        Ok(characteristic)
    }

    async fn request_response(&mut self, rq: &[u8]) -> anyhow::Result<Vec<u8>> {
        let reader = self.notify.notify().await?;

        let h = hex::encode(rq);
        log::debug!("BATTERY: TX: {h}");

        self.write.write(rq).await?;

        let rsp = Self::read_message(reader, self.device_id).await?;

        Ok(rsp)
    }

    /// Attempt to read a whole message from the device.
    ///
    /// Messages are delivered over multiple notification events. Notifications
    /// are appended until they form a complete frame with a valid CRC. If the
    /// notifications stop for a while first, whatever arrived is parsed one
    /// last time and reported as incomplete or invalid.
    async fn read_message<T: Stream<Item = Result<Vec<u8>, bluest::Error>> + Send + Unpin>(
        mut reader: T,
        device_id: u8,
    ) -> anyhow::Result<Vec<u8>> {
        let mut msg = Vec::<u8>::new();
        loop {
            let read_result =
                tokio::time::timeout(Duration::from_secs(Self::NOTIFICATION_TIMEOUT_S), reader.next()).await;

            match read_result {
                Err(_) => {
                    // timeout
                    let h_msg = hex::encode(&msg[..]);
                    return match try_parse_msg(&msg[..], device_id) {
                        TryParseMessageResult::Ok(frame) => Ok(frame),
                        TryParseMessageResult::Incomplete => Err(anyhow!("Message incomplete: {h_msg}")),
                        TryParseMessageResult::Exception(code) => Err(anyhow!("Modbus exception {code}: {h_msg}")),
                        TryParseMessageResult::Invalid(e) => Err(anyhow!("Message invalid: {e}: {h_msg}")),
                    };
                }
                Ok(None) => {
                    log::debug!("BATTERY: End of notification stream");

                    return Err(anyhow!("end of notification stream"));
                }
                Ok(Some(Ok(data))) => {
                    let h_notification = hex::encode(&data);
                    log::debug!("BATTERY: RX notification: 0x{h_notification}");

                    msg.extend_from_slice(&data);
                    match try_parse_msg(&msg[..], device_id) {
                        TryParseMessageResult::Ok(frame) => return Ok(frame),
                        TryParseMessageResult::Exception(code) => {
                            return Err(anyhow!("Modbus exception {code}"));
                        }
                        // more notifications may still repair it
                        TryParseMessageResult::Incomplete | TryParseMessageResult::Invalid(_) => {}
                    }
                }
                Ok(Some(Err(err))) => {
                    log::warn!("BATTERY: Notification error: {err}");

                    return Err(err.into());
                }
            }
        }
    }

    async fn try_connect(&self) -> anyhow::Result<()> {
        if !self.device.is_connected().await {
            let mut retries = 2;
            loop {
                match self.adapter.connect_device(&self.device).await {
                    Ok(()) => return Ok(()),
                    Err(err) if retries > 0 => {
                        log::warn!("BATTERY: Failed to connect: {err}");
                        retries -= 1;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        Ok(())
    }
}
