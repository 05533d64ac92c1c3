// src/resolve/mod.rs
//! Resolvers turn a query into an external-service-backed value with a fixed fallback chain.
//! They never return errors: every failure is logged, counted and replaced by a fallback.

pub mod coords;
pub mod image;

pub use coords::{CoordinateResolver, DEFAULT_CENTER};
pub use image::{ImageLookup, ImageResolver, ImageSource, Pick, ResolvedImage, NO_IMAGE_PLACEHOLDER};
