//! Name-based selection of stage backends.

use super::dispatch::MeritOrderDispatch;
use super::load::SinusoidalLoad;
use super::loss::FlatRateLoss;
use super::renewable::Ar1Renewable;
use super::{DispatchBackend, LoadBackend, LossBackend, RenewableBackend};
use crate::config::{BackendsConfig, ConfigError};
use crate::config_manager::{ConfigManagerFactory, file_config_manager};

/// Known backend names, per stage.
pub const LOAD_BACKENDS: &[&str] = &["sinusoidal"];
pub const RENEWABLE_BACKENDS: &[&str] = &["ar1"];
pub const LOSS_BACKENDS: &[&str] = &["flat_rate"];
pub const DISPATCH_BACKENDS: &[&str] = &["merit_order"];

/// The backends and configuration manager factory used by a run.
pub struct BackendRegistry {
    pub load: Box<dyn LoadBackend>,
    pub renewable: Box<dyn RenewableBackend>,
    pub loss: Box<dyn LossBackend>,
    pub dispatch: Box<dyn DispatchBackend>,
    pub config_manager_factory: ConfigManagerFactory,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self {
            load: Box::new(SinusoidalLoad),
            renewable: Box::new(Ar1Renewable),
            loss: Box::new(FlatRateLoss),
            dispatch: Box::new(MeritOrderDispatch),
            config_manager_factory: file_config_manager,
        }
    }
}

fn unknown(field: &str, name: &str, known: &[&str]) -> ConfigError {
    ConfigError {
        field: format!("backends.{field}"),
        message: format!("unknown backend \"{name}\", available: {}", known.join(", ")),
    }
}

impl BackendRegistry {
    /// Builds the registry named by the `[backends]` section.
    ///
    /// # Errors
    ///
    /// Returns one `ConfigError` per unknown backend name.
    pub fn from_config(cfg: &BackendsConfig) -> Result<Self, Vec<ConfigError>> {
        let mut errors = Vec::new();

        let load: Option<Box<dyn LoadBackend>> = match cfg.load.as_str() {
            "sinusoidal" => Some(Box::new(SinusoidalLoad)),
            other => {
                errors.push(unknown("load", other, LOAD_BACKENDS));
                None
            }
        };
        let renewable: Option<Box<dyn RenewableBackend>> = match cfg.renewable.as_str() {
            "ar1" => Some(Box::new(Ar1Renewable)),
            other => {
                errors.push(unknown("renewable", other, RENEWABLE_BACKENDS));
                None
            }
        };
        let loss: Option<Box<dyn LossBackend>> = match cfg.loss.as_str() {
            "flat_rate" => Some(Box::new(FlatRateLoss)),
            other => {
                errors.push(unknown("loss", other, LOSS_BACKENDS));
                None
            }
        };
        let dispatch: Option<Box<dyn DispatchBackend>> = match cfg.dispatch.as_str() {
            "merit_order" => Some(Box::new(MeritOrderDispatch)),
            other => {
                errors.push(unknown("dispatch", other, DISPATCH_BACKENDS));
                None
            }
        };

        match (load, renewable, loss, dispatch) {
            (Some(load), Some(renewable), Some(loss), Some(dispatch)) if errors.is_empty() => {
                Ok(Self {
                    load,
                    renewable,
                    loss,
                    dispatch,
                    config_manager_factory: file_config_manager,
                })
            }
            _ => Err(errors),
        }
    }

    pub fn with_load(mut self, backend: impl LoadBackend + 'static) -> Self {
        self.load = Box::new(backend);
        self
    }

    pub fn with_renewable(mut self, backend: impl RenewableBackend + 'static) -> Self {
        self.renewable = Box::new(backend);
        self
    }

    pub fn with_loss(mut self, backend: impl LossBackend + 'static) -> Self {
        self.loss = Box::new(backend);
        self
    }

    pub fn with_dispatch(mut self, backend: impl DispatchBackend + 'static) -> Self {
        self.dispatch = Box::new(backend);
        self
    }

    pub fn with_config_manager_factory(mut self, factory: ConfigManagerFactory) -> Self {
        self.config_manager_factory = factory;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_resolve() {
        assert!(BackendRegistry::from_config(&BackendsConfig::default()).is_ok());
    }

    #[test]
    fn unknown_names_are_all_reported() {
        let cfg = BackendsConfig {
            load: "csv_replay".into(),
            dispatch: "pypsa".into(),
            ..BackendsConfig::default()
        };
        let errors = match BackendRegistry::from_config(&cfg) {
            Err(errors) => errors,
            Ok(_) => panic!("unknown backends must be rejected"),
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["backends.load", "backends.dispatch"]);
        assert!(errors[0].message.contains("sinusoidal"));
    }
}
