use thiserror::Error;

/// Main error type for the order companion
#[derive(Error, Debug)]
pub enum HlError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Order entry errors
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Command(#[from] CommandError),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Terminal errors
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    // IO and other contextual failures
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for HlError
pub type Result<T> = std::result::Result<T, HlError>;

/// Failures of the free-text order parser.
///
/// Every variant carries the original, un-normalized input so the message can
/// be echoed back to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Could not parse order from '{input}': no symbol found")]
    MissingSymbol { input: String },

    #[error("Could not parse order from '{input}': no size found")]
    MissingSize { input: String },

    #[error("Could not parse order from '{input}': {reason}")]
    InvalidField { input: String, reason: String },
}

impl ParseError {
    pub fn input(&self) -> &str {
        match self {
            ParseError::MissingSymbol { input }
            | ParseError::MissingSize { input }
            | ParseError::InvalidField { input, .. } => input,
        }
    }

    /// Text shown to the person who typed the order.
    pub fn user_message(&self) -> String {
        format!(
            "Sorry, I could not understand the order \"{}\". Try something like \"Buy 0.5 BTC @ 30000 3x\".",
            self.input()
        )
    }
}

/// Order invariant violations raised by `OrderRequest::new`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("size must be positive, got {0}")]
    NonPositiveSize(rust_decimal::Decimal),

    #[error("price must be positive, got {0}")]
    NonPositivePrice(rust_decimal::Decimal),

    #[error("leverage must be at least 1, got {0}")]
    LeverageBelowOne(u32),
}

impl From<OrderError> for HlError {
    fn from(err: OrderError) -> Self {
        HlError::Validation(err.to_string())
    }
}

/// Positional `/buy` and `/sell` command errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: /{side} SYMBOL SIZE [PRICE] [LEVERAGE]")]
    Usage { side: String },

    #[error("Invalid size; please provide a positive number.")]
    InvalidSize,

    #[error("Invalid price; please provide a positive number.")]
    InvalidPrice,

    #[error("Invalid leverage; please provide an integer of at least 1.")]
    InvalidLeverage,
}
