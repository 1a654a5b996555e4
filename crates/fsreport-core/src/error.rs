use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot read definition {path}: {reason}")]
    ConfigRead { path: String, reason: String },

    #[error("definition {path} is missing required section '{section}'")]
    MissingSection { path: String, section: String },

    #[error("invalid value '{value}' for report option '{key}'")]
    InvalidOption { key: String, value: String },

    #[error("unresolved placeholders in query: {}", .0.join(", "))]
    TemplateVariable(Vec<String>),

    #[error("unable to connect to the database: {0}")]
    Connection(String),

    #[error("error during SQL query execution: {0}")]
    QueryExecution(String),

    #[error("invalid report format '{0}': expected csv or html")]
    UnsupportedFormat(String),

    #[error("error writing report artifact: {0}")]
    RenderWrite(String),

    #[error("cannot create audit log: {0}")]
    AuditLog(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
