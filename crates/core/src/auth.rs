use serde::{Deserialize, Serialize};

/// Authenticated caller resolved from the presented API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    credential: String,
    role: String,
    client_origin: Option<String>,
}

impl Principal {
    /// Creates a principal from its credential and resolved role.
    #[must_use]
    pub fn new(credential: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            role: role.into(),
            client_origin: None,
        }
    }

    /// Attaches the client origin observed by the transport.
    #[must_use]
    pub fn with_client_origin(mut self, client_origin: Option<String>) -> Self {
        self.client_origin = client_origin;
        self
    }

    /// Returns the opaque credential that identified the caller.
    #[must_use]
    pub fn credential(&self) -> &str {
        self.credential.as_str()
    }

    /// Returns the role name bound to the credential.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_str()
    }

    /// Returns the client address, if the transport exposed one.
    #[must_use]
    pub fn client_origin(&self) -> Option<&str> {
        self.client_origin.as_deref()
    }
}
