use crate::error_page::ExporterError;
use crate::{HassSensors, StateData};
use prometheus::{Encoder, GaugeVec, TextEncoder};
use salus_rs::model::Device;
use salus_rs::Salus;

lazy_static! {
    static ref TEMPERATURE_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "thermostat_temperature",
            "room temperature reported by thermostat (in °C)",
        ),
        &["device_code"],
    )
    .unwrap();
    static ref SET_POINT_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "thermostat_set_point",
            "target temperature configured on thermostat (in °C)",
        ),
        &["device_code"],
    )
    .unwrap();
    static ref HEATING_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "thermostat_heating",
            "1 if thermostat is currently calling for heat, 0 otherwise",
        ),
        &["device_code"],
    )
    .unwrap();
    static ref HASS_SENSOR_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("hass_sensor_state", "numeric state of Home Assistant sensor",),
        &["entity_id"],
    )
    .unwrap();
}

/// Feed values of one thermostat to Prometheus metrics.
fn process_device(device: &Device) {
    let labels = [device.code.as_str()];

    TEMPERATURE_GAUGE
        .with_label_values(&labels)
        .set(device.values.temperature);
    SET_POINT_GAUGE
        .with_label_values(&labels)
        .set(device.values.set_point);
    HEATING_GAUGE
        .with_label_values(&labels)
        .set(if device.values.heater_on { 1.0 } else { 0.0 });
}

/// Read every configured sensor. A failing sensor is logged and skipped.
async fn collect_hass(sensors: &HassSensors) {
    for sensor_id in &sensors.sensor_ids {
        match sensors.hass.sensor_state(sensor_id).await {
            Ok(state) => match state.value() {
                Some(value) => HASS_SENSOR_GAUGE
                    .with_label_values(&[sensor_id.as_str()])
                    .set(value),
                None => log::warn!("Sensor {} has non-numeric state: {}", sensor_id, state.state),
            },
            Err(e) => log::error!("Unable to read sensor {}: {}", sensor_id, e),
        }
    }
}

/// Log in, collect all thermostat values and update Prometheus exporter registry.
pub async fn collect(state: &StateData) -> Result<(), ExporterError> {
    let salus = Salus::with_config(state.credentials.clone(), state.client_config.clone()).await?;

    for device in salus.devices() {
        process_device(device);
    }

    if let Some(sensors) = &state.hass {
        collect_hass(sensors).await;
    }

    Ok(())
}

/// Render the default registry in Prometheus text format.
pub fn read() -> Result<String, ExporterError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .or(Err(ExporterError::Format))?;

    String::from_utf8(buffer).or(Err(ExporterError::Format))
}
