// src/guide/mod.rs
pub mod aggregate;
pub mod popular;
pub mod synth;

pub use aggregate::{GuideReport, TripAggregator, GUIDE_RATING_MAX, GUIDE_RATING_MIN};
pub use popular::{DetailsError, PopularCityGuide};
pub use synth::{GuideDraft, GuideSynthesizer, PlaceDraft, Synthesis, SynthesisError};
