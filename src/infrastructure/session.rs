// Session context carrying the backend bearer token
use std::sync::RwLock;

/// Created once at startup and handed to every fetcher that talks to the
/// backend. The token is read at request time, so `set_token` and
/// `clear_token` take effect on the next request.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty())),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Value for the `Authorization` header, if signed in
    pub fn authorization(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {}", t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_lifecycle() {
        let session = Session::new(None);
        assert_eq!(session.authorization(), None);

        session.set_token("t0k");
        assert_eq!(session.authorization().as_deref(), Some("Bearer t0k"));

        session.clear_token();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_blank_initial_token_is_ignored() {
        assert_eq!(Session::new(Some("  ".to_string())).token(), None);
        assert_eq!(Session::new(Some("abc".to_string())).token().as_deref(), Some("abc"));
    }
}
