//! Request-scoped session storage behind a small string-keyed interface.
//!
//! The workflow never touches the session directly; identity is resolved
//! once at the boundary and passed in explicitly. Implementations live with
//! the transport (the server keeps a cookie-backed token store).

use crate::domain::identity::{Identity, Role};

pub const USER_EMAIL_KEY: &str = "UserEmail";
pub const USER_ROLE_KEY: &str = "UserRole";

/// Get/set/clear string values by key, scoped to one request's session.
/// No expiry or renewal semantics exist; a value is absent or present.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn clear(&self);
}

/// Records the identity in the session at login time.
pub fn login(session: &dyn SessionStore, email: &str, role: Role) {
    session.set(USER_EMAIL_KEY, email);
    session.set(USER_ROLE_KEY, &role.to_string());
}

/// Clears all identity state at logout time.
pub fn logout(session: &dyn SessionStore) {
    session.clear();
}

/// Resolves the current identity, if any. An email with a missing or
/// unrecognized role yields no identity rather than a guessed role.
pub fn current_identity(session: &dyn SessionStore) -> Option<Identity> {
    let email = session.get(USER_EMAIL_KEY).filter(|email| !email.trim().is_empty())?;
    let role = session.get(USER_ROLE_KEY)?.parse::<Role>().ok()?;
    Some(Identity { email, role })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::SessionStore;

    /// Plain in-memory session for unit tests.
    #[derive(Default)]
    pub struct MapSession {
        values: Mutex<HashMap<String, String>>,
    }

    impl SessionStore for MapSession {
        fn get(&self, key: &str) -> Option<String> {
            self.values.lock().expect("session lock").get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            self.values.lock().expect("session lock").insert(key.to_string(), value.to_string());
        }

        fn clear(&self) {
            self.values.lock().expect("session lock").clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::identity::Role;

    use super::testing::MapSession;
    use super::{current_identity, login, logout, SessionStore};

    #[test]
    fn login_records_email_and_role() {
        let session = MapSession::default();
        login(&session, "lecturer@university.edu", Role::Lecturer);

        let identity = current_identity(&session).expect("identity after login");
        assert_eq!(identity.email, "lecturer@university.edu");
        assert_eq!(identity.role, Role::Lecturer);
    }

    #[test]
    fn logout_clears_the_identity() {
        let session = MapSession::default();
        login(&session, "coordinator@university.edu", Role::Coordinator);
        logout(&session);

        assert!(current_identity(&session).is_none());
    }

    #[test]
    fn unrecognized_role_yields_no_identity() {
        let session = MapSession::default();
        session.set(super::USER_EMAIL_KEY, "someone@university.edu");
        session.set(super::USER_ROLE_KEY, "Dean");

        assert!(current_identity(&session).is_none());
    }

    #[test]
    fn blank_email_yields_no_identity() {
        let session = MapSession::default();
        session.set(super::USER_EMAIL_KEY, "  ");
        session.set(super::USER_ROLE_KEY, "Lecturer");

        assert!(current_identity(&session).is_none());
    }
}
