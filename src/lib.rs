#[macro_use]
extern crate lazy_static;

pub mod api;
mod client;
pub mod hass;
pub mod model;
pub mod timestream;

pub use api::Error;
pub use client::{ClientConfig, Salus, PORTAL_URL};
