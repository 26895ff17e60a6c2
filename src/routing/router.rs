//! The dispatcher: owns the bootstrap products and runs the per-call cycle.
//!
//! # Responsibilities
//! - Hold the path set, configuration, pool and both libraries
//! - Parse a call and resolve its method (`parse_request`)
//! - Run the method and turn faults into user notices (`handle`)
//!
//! # Design Decisions
//! - Immutable after bootstrap except for the libraries' instance caches
//! - Every fault goes through the one escalator

use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde_json::Value;
use sqlx::MySqlPool;

use crate::calling::{self, CallingRequest, RawParameters};
use crate::config::{AppConfig, ConfigLoader};
use crate::escalation::{user_message, Escalation, Escalator, Fault, FaultKind, Site, UserNotice};
use crate::lifecycle::paths::PathSet;
use crate::observability::metrics;
use crate::registry::{CoreObject, Library, Loaded, Method};

/// Result of one inbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Completed { request_id: String, value: Value },
    Failed(UserNotice),
}

/// Process-wide dispatcher, shared by every in-flight call.
pub struct Router {
    paths: PathSet,
    config: Arc<AppConfig>,
    config_loader: Mutex<ConfigLoader>,
    db: MySqlPool,
    methods: Library<dyn Method>,
    classes: Library<CoreObject>,
    escalator: Escalator,
}

impl Router {
    pub(crate) fn new(
        paths: PathSet,
        config: AppConfig,
        config_loader: ConfigLoader,
        db: MySqlPool,
        methods: Library<dyn Method>,
        classes: Library<CoreObject>,
        escalator: Escalator,
    ) -> Self {
        Self {
            paths,
            config: Arc::new(config),
            config_loader: Mutex::new(config_loader),
            db,
            methods,
            classes,
            escalator,
        }
    }

    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn web_root(&self) -> &str {
        &self.config.web_root
    }

    pub fn db(&self) -> &MySqlPool {
        &self.db
    }

    pub fn methods(&self) -> &Library<dyn Method> {
        &self.methods
    }

    pub fn classes(&self) -> &Library<CoreObject> {
        &self.classes
    }

    pub fn escalator(&self) -> &Escalator {
        &self.escalator
    }

    /// Re-run the config loader. Sources merged at bootstrap are not merged again.
    #[track_caller]
    pub fn load_config(&self) -> Result<AppConfig, Fault> {
        let mut loader = self.config_loader.lock().unwrap_or_else(PoisonError::into_inner);
        loader.load(&self.escalator)
    }

    /// Resolve an application method, creating its singleton on first use.
    #[track_caller]
    pub fn load_method(&self, name: &str) -> Result<Arc<dyn Method>, Fault> {
        let caller = Site::from_location(Location::caller(), "Router::load_method");
        match self.methods.load(name, true, caller)? {
            Loaded::Instance(method) => Ok(method),
            Loaded::Static => Err(Fault::new(
                FaultKind::MethodNotDefined,
                format!("the class {} was not instantiated", name.to_lowercase()),
            )
            .called_by(caller)),
        }
    }

    /// Resolve a core class. With `is_static` the class is only checked, not built.
    #[track_caller]
    pub fn load_class(&self, name: &str, is_static: bool) -> Result<Loaded<CoreObject>, Fault> {
        let caller = Site::from_location(Location::caller(), "Router::load_class");
        self.classes.load(name, !is_static, caller)
    }

    /// Parse a call and resolve the method it names.
    #[track_caller]
    pub fn parse_request(&self, params: &RawParameters) -> Result<(CallingRequest, Arc<dyn Method>), Fault> {
        let calling = calling::parse(params)?;
        let method = self.load_method(calling.method_name())?;
        Ok((calling, method))
    }

    /// Escalate `fault` for the call identified by `request`.
    pub fn escalate(&self, fault: &Fault, request: Option<&str>) -> Escalation {
        self.escalator.fail(fault, request)
    }

    fn notice_for(&self, fault: &Fault, request: Option<&str>) -> UserNotice {
        match self.escalate(fault, request) {
            Escalation::Fatal(notice) => notice,
            Escalation::Logged => UserNotice {
                code: fault.code(),
                message: user_message(fault.code()),
                class: fault.kind().class(),
            },
        }
    }

    /// The whole per-call cycle: parse, resolve, run.
    pub async fn handle(&self, params: &RawParameters, request: Option<&str>) -> CallOutcome {
        let start = Instant::now();

        let (calling, method) = match self.parse_request(params) {
            Ok(resolved) => resolved,
            Err(fault) => {
                metrics::record_call("unresolved", "rejected", start);
                return CallOutcome::Failed(self.notice_for(&fault, request));
            }
        };

        tracing::debug!(
            method = %calling.method_name(),
            request_id = %calling.request_id(),
            "Dispatching call"
        );

        match method.call(self, &calling).await {
            Ok(value) => {
                metrics::record_call(calling.method_name(), "ok", start);
                CallOutcome::Completed {
                    request_id: calling.request_id().to_string(),
                    value,
                }
            }
            Err(e) => {
                metrics::record_call(calling.method_name(), "failed", start);
                let fault = Fault::new(
                    FaultKind::MethodFailed,
                    format!("method {} failed for request {}: {}", calling.method_name(), calling.request_id(), e),
                );
                CallOutcome::Failed(self.notice_for(&fault, request))
            }
        }
    }
}
