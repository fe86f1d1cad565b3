use super::heater_status::HeaterStatus;
use serde::{Deserialize, Deserializer};

/// Body of `ajax_device_values.php`. Numbers arrive as quoted strings.
#[derive(Debug, Deserialize)]
pub struct DeviceValues {
    #[serde(rename = "CH1currentRoomTemp", deserialize_with = "quoted_f64")]
    pub current_room_temp: f64,
    #[serde(rename = "CH1currentSetPoint", deserialize_with = "quoted_f64")]
    pub current_set_point: f64,
    #[serde(rename = "CH1heatOnOffStatus")]
    pub heat_on_off_status: HeaterStatus,
}

fn quoted_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let s = String::deserialize(d)?;
    s.trim().parse::<f64>().map_err(serde::de::Error::custom)
}
