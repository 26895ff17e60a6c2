//! Typed faults raised by every dispatch stage.

use std::fmt;
use std::panic::Location;

use thiserror::Error;

/// A source location: file, line and (when known) the enclosing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
}

impl Site {
    /// Build a site from a captured caller location.
    pub fn from_location(location: &'static Location<'static>, function: &'static str) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            function,
        }
    }

    /// Placeholder used when the caller frame was not captured.
    pub const fn unknown() -> Self {
        Self {
            file: "unknown",
            line: 0,
            function: "unknown",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.function)
    }
}

/// What went wrong, grouped by the stage that detected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    // Bootstrap
    BasePathInvalid,
    AppRootMissing,
    /// Neither the main config nor the local override exists.
    ConfigMissing,
    /// The main config is absent but the override exists. Logged, not fatal.
    MainConfigMissing,
    ConfigInvalid,
    DatabaseConnection,

    // Request validation
    ParameterMissing,
    ParameterError,
    ParameterEmpty,
    MethodNameMissing,
    AuthParameterEmpty,
    RequestIdMissing,

    // Resolution
    MethodFileNotFound,
    MethodNotDefined,
    ClassFileNotFound,
    ClassNotDefined,

    // Handler execution
    MethodFailed,
}

/// Broad category, used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    Bootstrap,
    Validation,
    Resolution,
    Execution,
}

impl FaultKind {
    /// Numeric code surfaced to the caller. `None` for codeless faults.
    pub fn code(self) -> Option<u16> {
        use FaultKind::*;
        match self {
            ParameterEmpty => Some(1),
            ParameterMissing => Some(2),
            ParameterError | ClassFileNotFound | ClassNotDefined => Some(3),
            DatabaseConnection => Some(20),
            MethodNameMissing | MethodFileNotFound | MethodNotDefined => Some(35),
            AuthParameterEmpty => Some(36),
            RequestIdMissing => Some(37),
            BasePathInvalid | AppRootMissing | ConfigMissing | MainConfigMissing
            | ConfigInvalid | MethodFailed => None,
        }
    }

    /// Whether escalating this kind ends the current call (or the bootstrap).
    pub fn is_fatal(self) -> bool {
        self != FaultKind::MainConfigMissing
    }

    pub fn class(self) -> FaultClass {
        use FaultKind::*;
        match self {
            BasePathInvalid | AppRootMissing | ConfigMissing | MainConfigMissing
            | ConfigInvalid | DatabaseConnection => FaultClass::Bootstrap,
            ParameterMissing | ParameterError | ParameterEmpty | MethodNameMissing
            | AuthParameterEmpty | RequestIdMissing => FaultClass::Validation,
            MethodFileNotFound | MethodNotDefined | ClassFileNotFound | ClassNotDefined => {
                FaultClass::Resolution
            }
            MethodFailed => FaultClass::Execution,
        }
    }
}

/// A fault together with where it was raised and who called into the failing
/// operation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Fault {
    kind: FaultKind,
    message: String,
    origin: Site,
    caller: Site,
}

impl Fault {
    /// Create a fault whose origin is the line constructing it.
    #[track_caller]
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            origin: Site::from_location(Location::caller(), "unknown"),
            caller: Site::unknown(),
        }
    }

    /// Attach the frame that invoked the failing operation.
    pub fn called_by(mut self, caller: Site) -> Self {
        self.caller = caller;
        self
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn code(&self) -> Option<u16> {
        self.kind.code()
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn origin(&self) -> Site {
        self.origin
    }

    pub fn caller(&self) -> Site {
        self.caller
    }
}
