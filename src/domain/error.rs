//! Application error types with proper error chaining.

use thiserror::Error;

/// Bearer token check failures. Always surfaced as 403.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,
    #[error("Wrong auth token")]
    InvalidToken,
}

#[derive(Error, Debug, Clone)]
pub enum BlockchainError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("RPC call failed: {0}")]
    RpcError(String),
    #[error("Invocation failed: {0}")]
    InvocationFailed(String),
    #[error("Timeout waiting for node: {0}")]
    Timeout(String),
}

#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("Wallet service unavailable: {0}")]
    Unavailable(String),
    #[error("Wallet creation failed: {0}")]
    CreationFailed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Invocation queue is closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
    #[error("Cannot read config file {path}: {message}")]
    Unreadable { path: String, message: String },
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Request body passed decoding but breaks a field rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{message}")]
    InvalidField { field: String, message: String },
    #[error("Validation failed: {0}")]
    Multiple(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("JSON Error: {0}")]
    Decode(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(ValidationError::from(err))
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field_errors = err.field_errors();
        let mut flattened = field_errors
            .iter()
            .flat_map(|(field, errors)| errors.iter().map(move |e| (field, e)));

        match (flattened.next(), flattened.next()) {
            (Some((field, first)), None) => ValidationError::InvalidField {
                field: field.to_string(),
                message: first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid field '{}'", field)),
            },
            _ => ValidationError::Multiple(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(
            AuthError::MissingHeader.to_string(),
            "Missing Authorization header"
        );
        assert_eq!(AuthError::InvalidToken.to_string(), "Wrong auth token");
    }

    #[test]
    fn test_validation_conversion_single_field() {
        use validator::Validate;

        #[derive(Validate)]
        struct TestStruct {
            #[validate(length(min = 8, message = "too short"))]
            val: String,
        }

        let s = TestStruct {
            val: "abc".to_string(),
        };
        let err = s.validate().unwrap_err();
        let app_err = AppError::from(err);

        assert!(matches!(
            &app_err,
            AppError::Validation(ValidationError::InvalidField { field, message })
                if field == "val" && message == "too short"
        ));
        assert_eq!(app_err.to_string(), "too short");
    }

    #[test]
    fn test_validation_conversion_multiple_fields() {
        use validator::Validate;

        #[derive(Validate)]
        struct TestStruct {
            #[validate(length(min = 1))]
            first: String,
            #[validate(length(min = 1))]
            second: String,
        }

        let s = TestStruct {
            first: String::new(),
            second: String::new(),
        };
        let err = s.validate().unwrap_err();
        let app_err = AppError::from(err);

        assert!(matches!(
            app_err,
            AppError::Validation(ValidationError::Multiple(_))
        ));
    }

    #[test]
    fn test_decode_error_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = AppError::Decode(json_err.to_string());
        assert!(err.to_string().starts_with("JSON Error: "));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<String>("invalid json").unwrap_err();
        let app_err = AppError::from(json_err);
        assert!(matches!(app_err, AppError::Serialization(_)));
    }

    #[test]
    fn test_blockchain_error_display() {
        let err = BlockchainError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "Connection failed: refused");

        let err = BlockchainError::RpcError("invalid method".to_string());
        assert_eq!(err.to_string(), "RPC call failed: invalid method");

        let err = BlockchainError::InvocationFailed("FAULT".to_string());
        assert_eq!(err.to_string(), "Invocation failed: FAULT");

        let err = BlockchainError::Timeout("30s".to_string());
        assert_eq!(err.to_string(), "Timeout waiting for node: 30s");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("API_AUTH_TOKEN".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: API_AUTH_TOKEN"
        );

        let err = ConfigError::InvalidValue {
            key: "API_PORT".to_string(),
            message: "not a number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for 'API_PORT': not a number");
    }

    #[test]
    fn test_app_error_transparent_variants() {
        let err: AppError = QueueError::Closed.into();
        assert_eq!(err.to_string(), "Invocation queue is closed");

        let err: AppError = WalletError::Unavailable("down".to_string()).into();
        assert_eq!(err.to_string(), "Wallet service unavailable: down");
    }

    #[test]
    fn test_timeout_message_names_the_deadline() {
        let err = AppError::Timeout(std::time::Duration::from_secs(30));
        assert_eq!(err.to_string(), "Request timed out after 30s");
    }
}
