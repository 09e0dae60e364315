use std::sync::OnceLock;

use crate::{
    config::{DefConfig, EnvSource, ProcessEnv},
    logging::{Builder, Logger},
    registry::{CoreHandle, CoreMap, CoreRegistry, StreamKind},
};

static GLOBAL_CONTEXT: OnceLock<LoggingContext> = OnceLock::new();

/// Default configurations plus the log and trace core registries.
#[derive(Debug)]
pub struct LoggingContext {
    def_config: DefConfig,
    log_cores: CoreRegistry,
    trace_cores: CoreRegistry,
}

impl LoggingContext {
    /// Reads `FLOGO_LOG_FORMAT` from the process environment.
    pub fn initialize() -> Self {
        Self::initialize_with(&ProcessEnv::new())
    }

    pub fn initialize_with(env: &impl EnvSource) -> Self {
        Self::from_def_config(DefConfig::from_env(env))
    }

    pub fn from_def_config(def_config: DefConfig) -> Self {
        tracing::debug!(
            format = %def_config.format(),
            level = %def_config.log_level().level(),
            trace_level = %def_config.trace_log_level().level(),
            "initialized logging context"
        );

        Self {
            def_config,
            log_cores: CoreRegistry::new(StreamKind::Log),
            trace_cores: CoreRegistry::new(StreamKind::Trace),
        }
    }

    /// The process wide context, initialized from the environment on first use.
    pub fn global() -> &'static LoggingContext {
        GLOBAL_CONTEXT.get_or_init(Self::initialize)
    }

    pub fn def_config(&self) -> &DefConfig {
        &self.def_config
    }

    pub fn registry(&self, kind: StreamKind) -> &CoreRegistry {
        match kind {
            StreamKind::Log => &self.log_cores,
            StreamKind::Trace => &self.trace_cores,
        }
    }

    pub fn register_core(
        &self,
        kind: StreamKind,
        name: impl Into<String>,
        core: CoreHandle,
    ) -> Option<CoreHandle> {
        self.registry(kind).register(name, core)
    }

    pub fn register_log_core(&self, name: impl Into<String>, core: CoreHandle) {
        self.register_core(StreamKind::Log, name, core);
    }

    pub fn register_trace_log_core(&self, name: impl Into<String>, core: CoreHandle) {
        self.register_core(StreamKind::Trace, name, core);
    }

    pub fn log_core_map(&self) -> CoreMap {
        self.log_cores.get_all()
    }

    pub fn trace_log_core_map(&self) -> CoreMap {
        self.trace_cores.get_all()
    }

    /// Assembles the ordinary logger from the cores registered so far.
    pub fn logger(&self) -> Logger {
        Builder::new(self.def_config.log_config().clone())
            .with_cores(self.log_core_map())
            .build()
    }

    /// Assembles the trace logger from the trace cores registered so far.
    pub fn trace_logger(&self) -> Logger {
        Builder::new(self.def_config.trace_log_config().clone())
            .with_cores(self.trace_log_core_map())
            .build()
    }
}

pub fn def_config() -> &'static DefConfig {
    LoggingContext::global().def_config()
}

pub fn register_log_core(name: impl Into<String>, core: CoreHandle) {
    LoggingContext::global().register_log_core(name, core);
}

pub fn register_trace_log_core(name: impl Into<String>, core: CoreHandle) {
    LoggingContext::global().register_trace_log_core(name, core);
}

pub fn log_core_map() -> CoreMap {
    LoggingContext::global().log_core_map()
}

pub fn trace_log_core_map() -> CoreMap {
    LoggingContext::global().trace_log_core_map()
}
