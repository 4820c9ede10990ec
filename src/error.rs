use thiserror::Error;

/// Error type for misuse of the cache surface.
///
/// Failures of the underlying operations are never reported through this type:
/// they settle the returned [`Kwery`](crate::Kwery) into [`Status::Error`](crate::Status::Error)
/// instead. `KweryError` only covers programmer errors at the dispatch layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KweryError {
    #[error("Unknown query: {0}")]
    UnknownQuery(String),

    #[error("Unknown mutation: {0}")]
    UnknownMutation(String),

    #[error("Cannot derive cache key for `{name}`: {reason}")]
    KeyDerivation { name: String, reason: String },

    #[error("Invalid arguments for `{name}`: {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("Mutation entries cannot be refetched: {0}")]
    NotRefetchable(String),

    #[error("Default client is already initialized")]
    AlreadyInitialized,

    #[error("Unknown status: {0}")]
    InvalidStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KweryError::UnknownQuery("users".to_string());
        assert_eq!(err.to_string(), "Unknown query: users");

        let err = KweryError::UnknownMutation("createUser".to_string());
        assert_eq!(err.to_string(), "Unknown mutation: createUser");

        let err = KweryError::KeyDerivation {
            name: "user".to_string(),
            reason: "key must be a string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot derive cache key for `user`: key must be a string"
        );

        let err = KweryError::InvalidArguments {
            name: "createUser".to_string(),
            reason: "bad input".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid arguments for `createUser`: bad input");

        let err = KweryError::NotRefetchable("createUser".to_string());
        assert_eq!(
            err.to_string(),
            "Mutation entries cannot be refetched: createUser"
        );

        assert_eq!(
            KweryError::AlreadyInitialized.to_string(),
            "Default client is already initialized"
        );

        let err = KweryError::InvalidStatus("loading".to_string());
        assert_eq!(err.to_string(), "Unknown status: loading");
    }
}
