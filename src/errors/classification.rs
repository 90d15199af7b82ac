use super::messages::MessageKind;
use super::types::RoofdeskError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    /// Whether the message can be shown to an end user verbatim.
    pub user_facing: bool,
    pub kind: MessageKind,
}

impl RoofdeskError {
    /// Classify this error by type and by the kind of message a user should see.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            RoofdeskError::Validation(_) => ErrorClassification {
                error_type: "ValidationError",
                user_facing: true,
                kind: MessageKind::Validation,
            },
            RoofdeskError::BadRequest(_) => ErrorClassification {
                error_type: "BadRequestError",
                user_facing: true,
                kind: MessageKind::Validation,
            },
            RoofdeskError::NotFound(_) => ErrorClassification {
                error_type: "NotFoundError",
                user_facing: true,
                kind: MessageKind::NotFound,
            },
            RoofdeskError::Authentication(_) => ErrorClassification {
                error_type: "AuthenticationError",
                user_facing: true,
                kind: MessageKind::Permission,
            },
            RoofdeskError::Permission(_) => ErrorClassification {
                error_type: "PermissionError",
                user_facing: true,
                kind: MessageKind::Permission,
            },
            RoofdeskError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                user_facing: false,
                kind: MessageKind::Network,
            },

            // Internal failures never leak their text to users
            RoofdeskError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                user_facing: false,
                kind: MessageKind::Generic,
            },
            RoofdeskError::Storage(_) => ErrorClassification {
                error_type: "StorageError",
                user_facing: false,
                kind: MessageKind::Generic,
            },
            RoofdeskError::Io(_) => ErrorClassification {
                error_type: "IoError",
                user_facing: false,
                kind: MessageKind::Generic,
            },
            RoofdeskError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                user_facing: false,
                kind: MessageKind::Validation,
            },
            RoofdeskError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                user_facing: false,
                kind: MessageKind::Generic,
            },
            RoofdeskError::Database(_) => ErrorClassification {
                error_type: "DatabaseError",
                user_facing: false,
                kind: MessageKind::Generic,
            },
            RoofdeskError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                user_facing: false,
                kind: MessageKind::Generic,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FieldErrors;

    #[test]
    fn test_validation_is_user_facing() {
        let err = RoofdeskError::Validation(FieldErrors::new());
        let class = err.classify();
        assert!(class.user_facing);
        assert_eq!(class.error_type, "ValidationError");
        assert_eq!(class.kind, MessageKind::Validation);
    }

    #[test]
    fn test_database_error_hidden() {
        let err = RoofdeskError::Database("disk I/O error".into());
        let class = err.classify();
        assert!(!class.user_facing);
        assert_eq!(class.kind, MessageKind::Generic);
    }

    #[test]
    fn test_network_error_kind() {
        let err = RoofdeskError::Network("connection refused".into());
        assert_eq!(err.classify().kind, MessageKind::Network);
    }

    #[test]
    fn test_permission_kind() {
        let err = RoofdeskError::Permission("branch mismatch".into());
        let class = err.classify();
        assert_eq!(class.kind, MessageKind::Permission);
        assert_eq!(class.error_type, "PermissionError");
    }

    #[test]
    fn test_not_found_kind() {
        let err = RoofdeskError::NotFound("report r-1".into());
        assert_eq!(err.classify().kind, MessageKind::NotFound);
    }
}
