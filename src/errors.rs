// Copyright 2025 Cowboy AI, LLC.

//! Error types for the composition layer

use thiserror::Error;

use crate::platform::Platform;

/// Errors that can occur while resolving or invoking composed services
#[derive(Debug, Clone, Error)]
pub enum ComposeError {
    /// Required configuration fields were missing or blank
    #[error("missing configuration for {platform}: {}", .missing.join(", "))]
    MissingConfiguration {
        /// Platform whose configuration was incomplete
        platform: String,
        /// Names of the required fields that were absent or blank
        missing: Vec<String>,
    },

    /// No usable initialized backend was available for the operation
    #[error("no initialized {domain} backend available")]
    NotInitialized {
        /// Domain the operation was issued against
        domain: String,
    },

    /// A single backend's operation failed
    #[error("platform operation failed on {platform}: {message}")]
    PlatformOperation {
        /// Platform (or composite slot) the failure occurred on
        platform: String,
        /// Failure detail from the backend
        message: String,
    },

    /// The requested mutation is not supported by the owning (or any) backend
    #[error("unsupported operation {operation}{}", .platform.as_deref().map(|p| format!(" on {p}")).unwrap_or_default())]
    UnsupportedOperation {
        /// Operation that was requested
        operation: String,
        /// Owning platform, if one was resolved; `None` when no backend supports it
        platform: Option<String>,
    },

    /// A platform key did not name a known platform
    #[error("unknown platform: {value}")]
    UnknownPlatform {
        /// The unrecognized key
        value: String,
    },

    /// No adapter builder has been registered for the platform
    #[error("no {domain} adapter registered for platform {platform}")]
    NotRegistered {
        /// Domain whose factory was asked
        domain: String,
        /// Platform that has no registration
        platform: Platform,
    },

    /// A record failed validation before being handed to a backend
    #[error("invalid record: {reason}")]
    InvalidRecord {
        /// Why the record was rejected
        reason: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for composition-layer operations
pub type ComposeResult<T> = Result<T, ComposeError>;

impl From<serde_json::Error> for ComposeError {
    fn from(err: serde_json::Error) -> Self {
        ComposeError::Serialization(err.to_string())
    }
}

impl ComposeError {
    /// Create an unsupported-operation error
    pub fn unsupported(operation: impl Into<String>, platform: Option<&str>) -> Self {
        ComposeError::UnsupportedOperation {
            operation: operation.into(),
            platform: platform.map(str::to_string),
        }
    }

    /// Create a platform-operation error
    pub fn platform_op(platform: impl Into<String>, message: impl Into<String>) -> Self {
        ComposeError::PlatformOperation {
            platform: platform.into(),
            message: message.into(),
        }
    }

    /// Check if this is an unsupported-operation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ComposeError::UnsupportedOperation { .. })
    }

    /// Check if this is a not-initialized error
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, ComposeError::NotInitialized { .. })
    }

    /// Check if this is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ComposeError::MissingConfiguration { .. } | ComposeError::NotRegistered { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_display_names_platform() {
        let err = ComposeError::unsupported("create", Some("woocommerce"));
        assert_eq!(err.to_string(), "unsupported operation create on woocommerce");
        assert!(err.is_unsupported());
    }

    #[test]
    fn unsupported_display_without_platform() {
        let err = ComposeError::unsupported("create", None);
        assert_eq!(err.to_string(), "unsupported operation create");
    }

    #[test]
    fn missing_configuration_lists_fields() {
        let err = ComposeError::MissingConfiguration {
            platform: "shopify".to_string(),
            missing: vec!["api_key".to_string(), "shop_domain".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing configuration for shopify: api_key, shop_domain"
        );
        assert!(err.is_configuration_error());
    }

    #[test]
    fn not_initialized_predicate() {
        let err = ComposeError::NotInitialized {
            domain: "category".to_string(),
        };
        assert!(err.is_not_initialized());
        assert!(!err.is_unsupported());
    }
}
