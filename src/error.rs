use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("tracker command `{subcommand}` failed: {detail}")]
    Gateway { subcommand: String, detail: String },

    #[error("unexpected {context} line: {line:?}")]
    Parse { context: &'static str, line: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),
}

impl Error {
    pub fn gateway(subcommand: &str, detail: impl Into<String>) -> Self {
        Error::Gateway {
            subcommand: subcommand.to_string(),
            detail: detail.into(),
        }
    }

    pub fn parse(context: &'static str, line: impl Into<String>) -> Self {
        Error::Parse {
            context,
            line: line.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::Usage(_) => 2,
            Error::Gateway { .. } | Error::Parse { .. } => 1,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        let line = e
            .position()
            .map(|p| format!("record {}", p.record()))
            .unwrap_or_default();
        Error::Parse {
            context: "export",
            line: format!("{} ({})", line, e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
