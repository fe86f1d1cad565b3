#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use config::Config;
use rocket::{Build, Rocket, State};
use salus_rs::hass::Hass;
use salus_rs::model::Credentials;
use salus_rs::{ClientConfig, Salus, PORTAL_URL};
use std::sync::Mutex;
use std::time::{Duration, Instant};

mod error_page;
mod metrics;

use error_page::ExporterError;

#[derive(Clone, serde::Deserialize)]
pub struct SalusConfig {
    portal_url: String,
    email: String,
    password: String,
    interval: u64,
    request_timeout: u64,
    init_deadline: u64,
    hass_url: Option<String>,
    hass_token: Option<String>,
    hass_sensors: Option<String>,
}

/// Home Assistant sensors exported next to the thermostats.
pub struct HassSensors {
    hass: Hass,
    sensor_ids: Vec<String>,
}

/// Rate limit for portal logins: a collection is due once `interval` has passed since
/// the last successful one.
pub struct Throttle {
    interval: Duration,
    last_collection: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            last_collection: Mutex::new(None),
        }
    }

    fn is_due(&self) -> bool {
        match self.last_collection.lock() {
            Ok(last) => last.map_or(true, |at| at.elapsed() > self.interval),
            Err(_) => true,
        }
    }

    fn mark_collected(&self) {
        match self.last_collection.lock() {
            Ok(mut last) => *last = Some(Instant::now()),
            Err(_) => log::warn!("collection time lock poisoned; next scrape logs in again"),
        }
    }
}

/// Shared by all route handlers.
pub struct StateData {
    credentials: Credentials,
    client_config: ClientConfig,
    hass: Option<HassSensors>,
    throttle: Throttle,
}

pub fn read_settings() -> Result<SalusConfig, config::ConfigError> {
    let mut settings = Config::default();
    settings
        .merge(config::Environment::with_prefix("SALUS"))?
        .set_default("portal_url", PORTAL_URL)?
        .set_default("interval", 60_i64)?
        .set_default("request_timeout", 10_i64)?
        .set_default("init_deadline", 60_i64)?;

    settings.try_into()
}

fn hass_sensors(settings: &SalusConfig, timeout: Duration) -> Option<HassSensors> {
    let (url, token, sensors) = match (
        &settings.hass_url,
        &settings.hass_token,
        &settings.hass_sensors,
    ) {
        (Some(url), Some(token), Some(sensors)) => (url, token, sensors),
        _ => return None,
    };

    let sensor_ids = sensors
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    match Hass::new(url.as_str(), token.as_str(), timeout) {
        Ok(hass) => Some(HassSensors { hass, sensor_ids }),
        Err(e) => {
            log::error!("Home Assistant export disabled: {}", e);
            None
        }
    }
}

#[get("/metrics")]
async fn metrics_route(state: &State<StateData>) -> Result<String, ExporterError> {
    if state.throttle.is_due() {
        metrics::collect(state).await?;
        state.throttle.mark_collected();
    } else {
        log::info!("serving gauges from previous collection")
    }
    metrics::read()
}

#[get("/dump-devices")]
async fn dump_devices_route(state: &State<StateData>) -> Result<String, ExporterError> {
    let salus = Salus::with_config(state.credentials.clone(), state.client_config.clone()).await?;
    let dump: Vec<_> = salus.devices().collect();

    Ok(format!("{:#?}", dump))
}

#[launch]
fn rocket() -> Rocket<Build> {
    env_logger::init();

    let settings = match read_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let request_timeout = Duration::from_secs(settings.request_timeout);
    let client_config = ClientConfig::default()
        .with_portal_url(settings.portal_url.as_str())
        .with_request_timeout(request_timeout)
        .with_init_deadline(Duration::from_secs(settings.init_deadline));

    let state = StateData {
        credentials: Credentials::new(settings.email.as_str(), settings.password.as_str()),
        client_config,
        hass: hass_sensors(&settings, request_timeout),
        throttle: Throttle::new(Duration::from_secs(settings.interval)),
    };

    rocket::build()
        .manage(state)
        .mount("/", routes![metrics_route, dump_devices_route])
}

#[cfg(test)]
mod test {
    use super::Throttle;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn first_collection_is_due() {
        assert!(Throttle::new(Duration::from_secs(60)).is_due());
    }

    #[test]
    fn not_due_within_interval() {
        let throttle = Throttle::new(Duration::from_secs(60));
        throttle.mark_collected();
        assert!(!throttle.is_due());
    }

    #[test]
    fn due_again_after_interval() {
        let throttle = Throttle::new(Duration::from_millis(1));
        throttle.mark_collected();
        thread::sleep(Duration::from_millis(10));
        assert!(throttle.is_due());
    }
}
