//! The owning application context.
//!
//! A [`Service`] bundles the validated configuration with the formatter and
//! logger collaborators. It is created once, wrapped in an `Arc` and read
//! (never written) by middleware and endpoints for the rest of the process.

use std::fmt;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::http::response::{Formatter, JsonFormatter};
use crate::observability::access::{AccessFormatError, Logger, SystemLogger};

pub struct Service {
    config: ServiceConfig,
    formatter: Arc<dyn Formatter>,
    logger: Arc<dyn Logger>,
}

impl Service {
    /// Build a service with the default JSON formatter and system logger.
    pub fn new(config: ServiceConfig) -> Result<Self, AccessFormatError> {
        let logger = SystemLogger::from_config(&config.observability)?;
        Ok(Self {
            formatter: Arc::new(JsonFormatter::new(config.formatter.pretty)),
            logger: Arc::new(logger),
            config,
        })
    }

    pub fn with_formatter(mut self, formatter: impl Formatter) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn with_logger(mut self, logger: impl Logger) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
