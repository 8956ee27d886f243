//! Errors generated by the clock-buffer insertion pass.
use crate::Id;

/// Convenience wrapper to represent success or a meaningful pass error.
pub type ClkbufResult<T> = std::result::Result<T, Error>;

/// Errors generated while configuring or running the pass.
#[derive(Clone)]
pub struct Error {
    kind: Box<ErrorKind>,
    post_msg: Option<String>,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(post) = &self.post_msg {
            write!(f, "\n{post}")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn with_post_msg(mut self, msg: Option<String>) -> Self {
        self.post_msg = msg;
        self
    }

    /// Neither `-buf` nor `-inpad` was supplied: the pass has nothing to do.
    pub fn configuration<S: ToString>(msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::Configuration(msg.to_string())),
            post_msg: None,
        }
    }

    pub fn malformed_structure<S: ToString>(msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::MalformedStructure(msg.to_string())),
            post_msg: None,
        }
    }

    pub fn pass_assumption<S: ToString, M: ToString>(pass: S, msg: M) -> Self {
        Self {
            kind: Box::new(ErrorKind::PassAssumption(
                pass.to_string(),
                msg.to_string(),
            )),
            post_msg: None,
        }
    }

    pub fn undefined<S: ToString>(name: Id, typ: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::Undefined(name, typ.to_string())),
            post_msg: None,
        }
    }

    pub fn already_bound<S: ToString>(name: Id, typ: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::AlreadyBound(name, typ.to_string())),
            post_msg: None,
        }
    }

    pub fn papercut<S: ToString>(msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::Papercut(msg.to_string())),
            post_msg: None,
        }
    }

    pub fn misc<S: ToString>(msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::Misc(msg.to_string())),
            post_msg: None,
        }
    }

    pub fn invalid_file<S: ToString>(msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::InvalidFile(msg.to_string())),
            post_msg: None,
        }
    }

    pub fn write_error<S: ToString>(msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::WriteError(msg.to_string())),
            post_msg: None,
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// Standard error kinds raised by the pass and its surrounding tooling.
#[derive(Clone)]
enum ErrorKind {
    /// The pass was not configured with enough information to run.
    Configuration(String),
    /// The netlist violates a structural assumption the pass relies on.
    MalformedStructure(String),
    /// An assumption a component of the pass makes about its input was
    /// violated.
    PassAssumption(String, String),
    /// The name has not been bound.
    Undefined(Id, String),
    /// The name has already been bound.
    AlreadyBound(Id, String),
    /// Signals a commonly made configuration mistake.
    Papercut(String),
    /// Miscellaneous error message.
    Misc(String),
    /// The input file is invalid (does not exist or does not parse).
    InvalidFile(String),
    /// Failed to write the output.
    WriteError(String),
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ErrorKind::*;
        match self {
            Configuration(msg) => write!(f, "[Configuration] {msg}"),
            Papercut(msg) => write!(f, "[Papercut] {msg}"),
            AlreadyBound(name, bound_by) => {
                write!(f, "Name `{name}' already bound by {bound_by}")
            }
            Undefined(name, typ) => {
                write!(f, "Undefined {typ} name: {name}")
            }
            PassAssumption(pass, msg) => {
                write!(f, "Pass `{pass}` assumption violated: {msg}")
            }
            MalformedStructure(msg) => {
                write!(f, "Malformed structure: {msg}")
            }
            InvalidFile(msg) | WriteError(msg) | Misc(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::write_error(format!("IO error: {e}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::invalid_file(format!("serde_json error: {e}"))
    }
}
