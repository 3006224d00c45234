// Session store - shared-secret login with process-memory tokens
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

/// Issued session tokens, held in process memory only. The service starts
/// logged-out; logout revokes the presented token; a restart revokes
/// everything.
pub struct SessionStore {
    password: String,
    tokens: Mutex<HashSet<String>>,
}

impl SessionStore {
    pub fn new(password: String) -> Self {
        Self {
            password,
            tokens: Mutex::new(HashSet::new()),
        }
    }

    /// Compare against the shared secret and issue a token on a match.
    pub fn login(&self, password: &str) -> Option<String> {
        if password != self.password {
            return None;
        }
        let token = Uuid::new_v4().to_string();
        self.tokens.lock().unwrap().insert(token.clone());
        Some(token)
    }

    pub fn is_authorized(&self, token: &str) -> bool {
        self.tokens.lock().unwrap().contains(token)
    }

    pub fn logout(&self, token: &str) {
        self.tokens.lock().unwrap().remove(token);
    }
}
