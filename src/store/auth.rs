use serde::{Deserialize, Serialize};

use crate::common::UserRecord;
use crate::storage::Persisted;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthDocument {
    #[serde(default)]
    pub user: Option<UserRecord>,
    #[serde(default)]
    pub is_authenticated: bool,
}

/// Phiên đăng nhập hiện tại.
#[derive(Debug, Default)]
pub struct AuthStore {
    user: Option<UserRecord>,
    is_authenticated: bool,
    revision: u64,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, user: UserRecord) {
        log::info!("Logged in as {} ({})", user.name, user.phone_number);
        self.user = Some(user);
        self.is_authenticated = true;
        self.revision += 1;
    }

    pub fn logout(&mut self) {
        self.user = None;
        self.is_authenticated = false;
        self.revision += 1;
    }

    /// Normalizes a half-restored session (a flag without a user, or the
    /// reverse) to logged out.
    pub fn initialize(&mut self) {
        if self.user.is_some() != self.is_authenticated {
            log::warn!("Inconsistent persisted session; logging out");
            self.logout();
        }
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref().filter(|_| self.is_authenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated && self.user.is_some()
    }
}

impl Persisted for AuthStore {
    const KEY: &'static str = "auth-storage";
    type Document = AuthDocument;

    fn snapshot(&self) -> AuthDocument {
        AuthDocument {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    fn restore(&mut self, document: AuthDocument) {
        self.user = document.user;
        self.is_authenticated = document.is_authenticated;
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> UserRecord {
        UserRecord {
            id: "u1".to_string(),
            phone_number: "+15551234567".to_string(),
            name: "User 4567".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn login_then_logout() {
        let mut auth = AuthStore::new();
        auth.login(user());
        assert!(auth.is_authenticated());
        assert_eq!(auth.user().map(|u| u.name.as_str()), Some("User 4567"));

        auth.logout();
        assert!(!auth.is_authenticated());
        assert!(auth.user().is_none());
    }

    #[test]
    fn initialize_drops_half_sessions() {
        let mut auth = AuthStore::new();
        auth.restore(AuthDocument {
            user: None,
            is_authenticated: true,
        });
        auth.initialize();
        assert_eq!(auth.snapshot(), AuthDocument::default());

        auth.restore(AuthDocument {
            user: Some(user()),
            is_authenticated: true,
        });
        auth.initialize();
        assert!(auth.is_authenticated());
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let json = serde_json::to_value(AuthDocument::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "user": null, "isAuthenticated": false }));
    }
}
