use crate::api::{self, Error};
use crate::model::{ClientState, Credentials, Device, DeviceValues, Portal, Session};
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::time::Duration;

pub const PORTAL_URL: &str = "https://salus-it500.com";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub portal_url: String,
    /// Applied to every single HTTP request.
    pub request_timeout: Duration,
    /// Upper bound for the whole login, directory and first fetch sequence.
    pub init_deadline: Duration,
}

impl ClientConfig {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_INIT_DEADLINE: Duration = Duration::from_secs(60);

    pub fn with_portal_url(mut self, portal_url: impl Into<String>) -> Self {
        self.portal_url = portal_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_init_deadline(mut self, deadline: Duration) -> Self {
        self.init_deadline = deadline;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            portal_url: PORTAL_URL.to_string(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            init_deadline: Self::DEFAULT_INIT_DEADLINE,
        }
    }
}

/// Thermostats of one portal account.
///
/// Construction logs in, reads the device directory and fetches values of every
/// device, so a client is queryable right away. Getters never touch the network;
/// call [`Salus::refresh`] for new readings.
#[derive(Debug)]
pub struct Salus {
    credentials: Credentials,
    config: ClientConfig,
    portal: Portal,
    state: ClientState,
    session: Option<Session>,
    devices: BTreeMap<String, Device>,
}

impl Salus {
    pub async fn new(credentials: Credentials) -> Result<Self, Error> {
        Self::with_config(credentials, ClientConfig::default()).await
    }

    pub async fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self, Error> {
        let portal = api::portal(config.portal_url.clone(), config.request_timeout)?;
        let mut salus = Salus {
            credentials,
            config,
            portal,
            state: ClientState::Uninitialized,
            session: None,
            devices: BTreeMap::new(),
        };

        salus.initialize().await?;
        Ok(salus)
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// All devices, ordered by code.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn device(&self, code: &str) -> Result<&Device, Error> {
        self.devices
            .get(code)
            .ok_or_else(|| Error::UnknownDevice(code.to_string()))
    }

    pub fn temperature(&self, code: &str) -> Result<f64, Error> {
        self.device(code).map(|device| device.values.temperature)
    }

    pub fn set_point(&self, code: &str) -> Result<f64, Error> {
        self.device(code).map(|device| device.values.set_point)
    }

    pub fn is_heating(&self, code: &str) -> Result<bool, Error> {
        self.device(code).map(|device| device.values.heater_on)
    }

    /// Fetch new values for every device.
    ///
    /// Devices are fetched concurrently and independently: a failed fetch leaves that
    /// device's previous values in place and does not stop the others. The first
    /// failure, in code order, is returned once all fetches finished.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let session = self.ready_session()?;
        let ids: BTreeMap<String, String> = self
            .devices
            .values()
            .map(|device| (device.code.clone(), device.internal_id.clone()))
            .collect();

        let results = fetch_all(&self.portal, session, &ids).await;

        let mut first_error = None;
        for (code, result) in results {
            match result {
                Ok(values) => {
                    if let Some(device) = self.devices.get_mut(&code) {
                        device.values = values;
                    }
                }
                Err(e) => {
                    log::warn!("keeping previous values of {}: {}", code, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub async fn refresh_device(&mut self, code: &str) -> Result<(), Error> {
        let session = self.ready_session()?;
        let internal_id = self.device(code)?.internal_id.clone();

        let values = api::fetch_values(&self.portal, session, &internal_id).await?;
        if let Some(device) = self.devices.get_mut(code) {
            device.values = values;
        }
        Ok(())
    }

    /// Throw away the session and directory and run the whole pipeline again.
    ///
    /// On failure the client is left `Failed` with no devices.
    pub async fn reinitialize(&mut self) -> Result<(), Error> {
        self.initialize().await
    }

    fn ready_session(&self) -> Result<&Session, Error> {
        match (&self.state, &self.session) {
            (ClientState::Ready, Some(session)) => Ok(session),
            _ => Err(Error::NotReady(self.state)),
        }
    }

    async fn initialize(&mut self) -> Result<(), Error> {
        self.session = None;
        self.devices.clear();

        let deadline = self.config.init_deadline;
        let result = tokio::time::timeout(
            deadline,
            load(&self.portal, &self.credentials, &mut self.state),
        )
        .await
        .unwrap_or(Err(Error::Timeout(deadline)));

        match result {
            Ok((session, devices)) => {
                log::info!("portal client ready with {} device(s)", devices.len());
                self.session = Some(session);
                self.devices = devices;
                self.state = ClientState::Ready;
                Ok(())
            }
            Err(e) => {
                log::error!("portal client initialization failed: {}", e);
                self.state = ClientState::Failed;
                Err(e)
            }
        }
    }
}

/// Log in, read the directory and fetch every device. Any failure aborts the whole load.
async fn load(
    portal: &Portal,
    credentials: &Credentials,
    state: &mut ClientState,
) -> Result<(Session, BTreeMap<String, Device>), Error> {
    *state = ClientState::Authenticating;
    let logged_in = api::authenticate(portal, credentials).await?;

    let listing = api::list_devices(portal, logged_in).await?;
    *state = ClientState::DirectoryLoaded;
    log::debug!("directory loaded: {:?}", listing.devices.keys());

    let mut devices = BTreeMap::new();
    for (code, result) in fetch_all(portal, &listing.session, &listing.devices).await {
        let values = result?;
        let internal_id = listing.devices[&code].clone();
        devices.insert(
            code.clone(),
            Device {
                code,
                internal_id,
                values,
            },
        );
    }

    Ok((listing.session, devices))
}

/// Fetch values of every `code -> internal id` entry concurrently; results come back in
/// code order.
async fn fetch_all(
    portal: &Portal,
    session: &Session,
    ids: &BTreeMap<String, String>,
) -> Vec<(String, Result<DeviceValues, Error>)> {
    let fetches = ids.iter().map(|(code, internal_id)| async move {
        let result = api::fetch_values(portal, session, internal_id).await;
        (code.clone(), result)
    });

    join_all(fetches).await
}
