//! Change notification for acquisition parameters

use super::acquisition_config::AcquisitionConfig;

/// Receives synchronous notifications after the sample rate or sample size
/// of an [`AcquisitionConfig`] changes.
///
/// Callbacks run on the thread that performed the mutation, in registration
/// order, and see the post-mutation state through `config`. They must not
/// try to lock the shared handle that owns `config`.
pub trait SampleParameterListener: Send + Sync {
    fn sample_rate_changed(&self, config: &AcquisitionConfig);
    fn sample_size_changed(&self, config: &AcquisitionConfig);
}

/// Opaque registration handle returned by [`AcquisitionConfig::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(pub(crate) u64);

type Callback = Box<dyn Fn(&AcquisitionConfig) + Send + Sync>;

/// Listener built from a pair of closures
pub struct CallbackListener {
    on_rate: Callback,
    on_size: Callback,
}

impl CallbackListener {
    pub fn new<R, S>(on_rate: R, on_size: S) -> Self
    where
        R: Fn(&AcquisitionConfig) + Send + Sync + 'static,
        S: Fn(&AcquisitionConfig) + Send + Sync + 'static,
    {
        Self {
            on_rate: Box::new(on_rate),
            on_size: Box::new(on_size),
        }
    }

    /// Same callback for both kinds of change
    pub fn on_any<F>(callback: F) -> Self
    where
        F: Fn(&AcquisitionConfig) + Send + Sync + Clone + 'static,
    {
        Self::new(callback.clone(), callback)
    }
}

impl SampleParameterListener for CallbackListener {
    fn sample_rate_changed(&self, config: &AcquisitionConfig) {
        (self.on_rate)(config)
    }

    fn sample_size_changed(&self, config: &AcquisitionConfig) {
        (self.on_size)(config)
    }
}
