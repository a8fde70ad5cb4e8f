//! Client side of the external image comparison service.
//!
//! - [`method`]  : the closed set of comparison methods and their wire ids
//! - [`client`]  : the single `POST /api/methods/?method=<id>` round trip
//! - [`response`]: base64 image decoding and captions

pub mod client;
pub mod method;
pub mod response;

pub use client::{ComparisonClient, ComparisonRequest};
pub use method::ComparisonMethod;
pub use response::{decode_images, ComparisonResult, ImageKey, ResultImage};
