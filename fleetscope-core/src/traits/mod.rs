//! Core Traits for FleetScope
//!
//! Extension points of the pipeline:
//!
//! - [`source`] - Raw sample source (the document store boundary)
//! - [`TimeSource`] - Clock used when a request has no reference time
//!
//! Randomness for synthetic demo data is any [`rand::Rng`], passed per request.

pub mod source;

pub use source::{FetchedSamples, ProbeQuery, SampleQuery, SampleSelector, SampleSource};

pub use crate::time::TimeSource;
