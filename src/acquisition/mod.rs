// src/acquisition/mod.rs
//! Acquisition parameters and their change notification

pub mod acquisition_config;
pub mod listeners;

pub use acquisition_config::{AcquisitionConfig, SharedAcquisitionConfig, TimeUnit};
pub use listeners::{CallbackListener, ListenerHandle, SampleParameterListener};
