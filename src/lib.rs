#[macro_use]
extern crate rocket;
#[macro_use]
extern crate log;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod face;
pub mod logging;
pub mod model;

pub use config::Config;

/// Build the rocket instance: configuration, database, face service, and
/// all routes. Nothing launches until the caller ignites it.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(config::ConfigFairing)
        .attach(config::DatabaseFairing)
        .attach(config::FaceServiceFairing)
        .attach(logging::LoggerFairing)
}
