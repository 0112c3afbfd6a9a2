//! The relay functions served by this crate.

pub mod cors;
pub mod image;
pub mod onesignal;

pub use image::{ImageRelay, IMAGE_PROXY_MANIFEST};
pub use onesignal::{AppInfoRelay, OneSignalConfig, PlayersRelay};
