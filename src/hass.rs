//! Minimal Home Assistant REST client: current state and history of a sensor.

use crate::api::error::map_network_err;
use crate::api::Error;
use chrono::{DateTime, TimeZone};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Display;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SensorStateAttributes {
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub unit_of_measurement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SensorStateContext {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorState {
    #[serde(default)]
    pub attributes: SensorStateAttributes,
    #[serde(default)]
    pub context: SensorStateContext,
    #[serde(default)]
    pub entity_id: String,
    pub last_changed: String,
    pub last_updated: String,
    pub state: String,
}

impl SensorState {
    /// `state` as a number, `None` for things like `"unavailable"`.
    pub fn value(&self) -> Option<f64> {
        self.state.parse().ok()
    }
}

#[derive(Debug, Clone)]
pub struct Hass {
    base_url: String,
    bearer: String,
    client: reqwest::Client,
}

impl Hass {
    pub fn new(
        base_url: impl Into<String>,
        bearer: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(map_network_err)?;

        let base_url: String = base_url.into();
        Ok(Hass {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: bearer.into(),
            client,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        what: &'static str,
    ) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);

        let body = self
            .client
            .get(url)
            .bearer_auth(&self.bearer)
            .query(query)
            .send()
            .await
            .map_err(map_network_err)?
            .error_for_status()
            .map_err(map_network_err)?
            .text()
            .await
            .map_err(map_network_err)?;

        serde_json::from_str(&body).map_err(|e| Error::parse(what, e.to_string()))
    }

    pub async fn sensor_state(&self, sensor_id: &str) -> Result<SensorState, Error> {
        self.get(&format!("/api/states/{}", sensor_id), &[], "sensor state")
            .await
    }

    /// History of `sensor_id` since `since`. Entries with a non-numeric state are dropped.
    pub async fn sensor_history<Tz>(
        &self,
        sensor_id: &str,
        since: DateTime<Tz>,
    ) -> Result<Vec<Vec<SensorState>>, Error>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let path = format!(
            "/api/history/period/{}",
            since.format("%Y-%m-%dT%H:%M:%S%:z")
        );
        let history: Vec<Vec<SensorState>> =
            self.get(&path, &[("filter_entity_id", sensor_id)], "sensor history")
                .await?;

        Ok(retain_numeric(history))
    }
}

fn retain_numeric(mut history: Vec<Vec<SensorState>>) -> Vec<Vec<SensorState>> {
    for series in history.iter_mut() {
        series.retain(|state| state.value().is_some());
    }
    history
}

#[cfg(test)]
mod test {
    use super::*;

    fn state(value: &str) -> SensorState {
        SensorState {
            attributes: SensorStateAttributes::default(),
            context: SensorStateContext::default(),
            entity_id: "sensor.living_room".to_string(),
            last_changed: "2021-01-01T00:00:00+00:00".to_string(),
            last_updated: "2021-01-01T00:00:00+00:00".to_string(),
            state: value.to_string(),
        }
    }

    #[test]
    fn history_keeps_numeric_states_in_order() {
        let history = vec![vec![state("21.0"), state("unavailable"), state("19.8")]];
        let states: Vec<String> = retain_numeric(history)[0]
            .iter()
            .map(|s| s.state.clone())
            .collect();
        assert_eq!(vec!["21.0", "19.8"], states);
    }

    #[test]
    fn history_filters_every_series() {
        let history = vec![
            vec![state("unknown"), state("1")],
            vec![state(""), state("unavailable")],
        ];
        let filtered = retain_numeric(history);
        assert_eq!(1, filtered[0].len());
        assert!(filtered[1].is_empty());
    }

    #[test]
    fn empty_history() {
        assert!(retain_numeric(Vec::new()).is_empty());
    }
}
