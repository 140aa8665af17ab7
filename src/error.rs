//! Error taxonomy for remote calls and local storage.
//!
//! Slices never hold these values: they are turned into a display string with
//! [`ApiError::display_message`] at the point the failure is folded into state.

use thiserror::Error;

use crate::constants::GENERIC_ERROR;

/// Failure of a remote operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never got an answer (DNS, refused connection, reset...)
    #[error("connection failed: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// Non-2xx HTTP status, or a business error inside a 2xx envelope
    #[error("server responded with {status}")]
    Server {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    #[error("unauthorized")]
    Unauthorized { message: Option<String> },

    /// The payload did not have the shape the operation expects
    #[error("unexpected payload: {0}")]
    Decode(String),

    /// A precondition checked before any request was sent
    #[error("{0}")]
    Local(String),
}

impl ApiError {
    /// Human-readable message for a slice's `error` field.
    ///
    /// Server message first, then a localized text for a known error code, then
    /// a per-class text, then the operation's own `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Server { status, code, message } => {
                if let Some(message) = non_empty(message) {
                    return message.to_string();
                }
                if let Some(text) = code.as_deref().and_then(localized) {
                    return text.to_string();
                }
                if *status >= 500 {
                    return localized("server_error").unwrap_or(GENERIC_ERROR).to_string();
                }
                fallback.to_string()
            }
            ApiError::Unauthorized { message } => non_empty(message)
                .map(str::to_string)
                .unwrap_or_else(|| localized("unauthorized").unwrap_or(GENERIC_ERROR).to_string()),
            ApiError::Network(_) | ApiError::Timeout => {
                localized("network_error").unwrap_or(GENERIC_ERROR).to_string()
            }
            ApiError::Local(message) => message.clone(),
            ApiError::Decode(_) => fallback.to_string(),
        }
    }

    /// True when the server rejected the caller's credentials
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ApiError::Unauthorized { .. } => true,
            ApiError::Server { message, .. } => {
                message.as_deref() == Some(crate::constants::UNAUTHENTICATED_MESSAGE)
            }
            _ => false,
        }
    }
}

fn non_empty(message: &Option<String>) -> Option<&str> {
    message.as_deref().filter(|m| !m.trim().is_empty())
}

/// Localized text for a backend error code
pub fn localized(code: &str) -> Option<&'static str> {
    let text = match code {
        "invalid_credentials" => "Adresse e-mail ou mot de passe incorrect",
        "email_exists" => "Cette adresse e-mail est déjà utilisée",
        "password_mismatch" => "Les mots de passe ne correspondent pas",
        "weak_password" => "Le mot de passe est trop faible, utilisez au moins 8 caractères",
        "invalid_email" => "Adresse e-mail invalide",
        "unauthorized" => "Vous n'êtes pas autorisé à effectuer cette action",
        "not_found" => "Ressource introuvable",
        "server_error" => "Une erreur serveur est survenue, veuillez réessayer plus tard",
        "network_error" => "Problème de connexion, vérifiez votre réseau",
        _ => return None,
    };
    Some(text)
}

/// Failure of the on-device key-value storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage backend failed: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn display_message(&self) -> String {
        format!("Erreur de stockage local : {}", self)
    }
}
