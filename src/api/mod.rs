pub mod endpoint;
pub mod error;
pub mod response;
pub mod scrape;

use crate::model;
use chrono::Utc;
pub use error::Error;
use error::map_network_err;
use reqwest::header::COOKIE;
use std::time::Duration;

pub fn portal(url: impl Into<String>, request_timeout: Duration) -> Result<model::Portal, Error> {
    let client = reqwest::ClientBuilder::new()
        .timeout(request_timeout)
        .build()
        .map_err(map_network_err)?;

    let url: String = url.into();
    Ok(model::Portal {
        url: url.trim_end_matches('/').to_string(),
        client,
    })
}

/// First cookie set by `response` as `name=value`, attributes dropped.
fn extract_cookie(response: &reqwest::Response) -> Result<String, Error> {
    response
        .cookies()
        .next()
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
        .ok_or_else(|| {
            Error::Authentication(format!(
                "No session cookie received (server responded {})",
                response.status()
            ))
        })
}

async fn read_body(response: reqwest::Response) -> Result<String, Error> {
    response
        .error_for_status()
        .map_err(map_network_err)?
        .text()
        .await
        .map_err(map_network_err)
}

async fn get(
    portal: &model::Portal,
    endpoint: &endpoint::Endpoint,
    cookie: &str,
) -> Result<String, Error> {
    let url = format!("{}{}", portal.url, endpoint);
    log::debug!("GET {}", url);

    let response = portal
        .client
        .get(url)
        .header(COOKIE, cookie)
        .send()
        .await
        .map_err(map_network_err)?;

    read_body(response).await
}

/// Log in the way a browser would: fetch the login page for a cookie, then post the
/// form (`application/x-www-form-urlencoded`) with that cookie attached.
pub async fn authenticate(
    portal: &model::Portal,
    credentials: &model::Credentials,
) -> Result<model::LoggedIn, Error> {
    let url = format!("{}{}", portal.url, endpoint::LOGIN);

    let response = portal
        .client
        .get(url.clone())
        .send()
        .await
        .map_err(map_network_err)?
        .error_for_status()
        .map_err(map_network_err)?;
    let cookie = extract_cookie(&response)?;

    let form = [
        ("IDemail", credentials.email()),
        ("password", credentials.password()),
        ("login", "Login"),
    ];

    let response = portal
        .client
        .post(url)
        .header(COOKIE, cookie.as_str())
        .form(&form)
        .send()
        .await
        .map_err(map_network_err)?;
    let body = read_body(response).await?;

    log::trace!("login response: {}", body);

    if scrape::is_logged_in(&body) {
        log::debug!("logged in as {}", credentials.email());
        Ok(model::LoggedIn { cookie })
    } else {
        Err(Error::Authentication(format!(
            "login page for {} did not show a device form; wrong credentials or changed portal",
            credentials.email()
        )))
    }
}

/// Read the devices page: device code to internal id, plus the session token.
pub async fn list_devices(
    portal: &model::Portal,
    logged_in: model::LoggedIn,
) -> Result<model::DeviceListing, Error> {
    let body = get(portal, endpoint::DEVICES, &logged_in.cookie).await?;

    log::trace!("devices page: {}", body);

    let token = scrape::token(&body)?;
    let devices = scrape::device_ids(&body);
    let session = model::Session::new(logged_in.cookie, token)
        .ok_or_else(|| Error::parse("session", "empty cookie or token"))?;

    if devices.is_empty() {
        log::warn!("no devices listed for this account");
    }

    Ok(model::DeviceListing { session, devices })
}

/// Read current values of the device with portal id `internal_id`.
pub async fn fetch_values(
    portal: &model::Portal,
    session: &model::Session,
    internal_id: &str,
) -> Result<model::DeviceValues, Error> {
    let url = format!("{}{}", portal.url, endpoint::DEVICE_VALUES);
    /* only there to defeat caches between us and the portal */
    let cache_buster = Utc::now().timestamp_millis().to_string();

    log::debug!("GET {} devId={}", url, internal_id);

    let response = portal
        .client
        .get(url)
        .header(COOKIE, session.cookie())
        .query(&[
            ("devId", internal_id),
            ("token", session.token()),
            ("_", cache_buster.as_str()),
        ])
        .send()
        .await
        .map_err(map_network_err)?;
    let body = read_body(response).await?;

    log::trace!("device {} values: {}", internal_id, body);

    let values = serde_json::from_str::<response::device_values::DeviceValues>(&body)
        .map_err(|e| Error::parse("device values", format!("{}: {}", e, body)))?;

    Ok(model::DeviceValues {
        temperature: values.current_room_temp,
        set_point: values.current_set_point,
        heater_on: values.heat_on_off_status.is_on(),
        fetched_at: Utc::now(),
    })
}
