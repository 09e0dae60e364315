//! Default log and trace configuration for flogo processes, plus the
//! registries sink modules use to plug log cores into them.
//!
//! ```no_run
//! use std::sync::Arc;
//! use flogo_log::{logging::NullCore, LoggingContext};
//!
//! let context = LoggingContext::initialize();
//! context.register_log_core("null", Arc::new(NullCore::new()));
//! context.logger().init().unwrap();
//! ```

pub mod config;
pub mod context;
pub mod level;
pub mod logging;
pub mod registry;

pub use config::{Config, DefConfig, LogFormat, ENV_KEY_LOG_FORMAT};
pub use context::{
    def_config, log_core_map, register_log_core, register_trace_log_core, trace_log_core_map,
    LoggingContext,
};
pub use level::AtomicLevel;
pub use registry::{CoreHandle, CoreMap, CoreRegistry, StreamKind};
