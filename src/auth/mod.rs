//! Access control.
//!
//! Credentials come from static configuration and are matched exactly:
//! no hashing, no rate limiting, no lockout. A session is an explicit
//! value owned by the front-end; nothing here is global.

use crate::config::UserEntry;
use crate::error::AccessError;
use crate::models::{Role, SalesRecord};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// A configured account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub password: String,
    pub role: Role,
    /// Agent whose data a standard user may see.
    pub agent_name: Option<String>,
}

/// Immutable table of accounts, loaded once at start.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    credentials: HashMap<String, Credential>,
}

impl CredentialStore {
    /// Build the store from the `[users]` section of the configuration.
    pub fn from_config(users: &BTreeMap<String, UserEntry>) -> Self {
        let credentials = users
            .iter()
            .map(|(username, entry)| {
                let credential = Credential {
                    password: entry.password.clone(),
                    role: entry.role,
                    agent_name: entry.agent.clone(),
                };
                (username.clone(), credential)
            })
            .collect();

        Self { credentials }
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Return the stored role when both username and password match exactly.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Role> {
        self.credentials
            .get(username)
            .filter(|c| c.password == password)
            .map(|c| c.role)
    }

    /// Agent mapped to a username. Keys are matched exactly, like `authenticate`.
    pub fn agent_for(&self, username: &str) -> Option<&str> {
        self.credentials
            .get(username)
            .and_then(|c| c.agent_name.as_deref())
    }
}

/// Per-invocation login state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub username: String,
    pub role: Option<Role>,
}

impl Session {
    /// A session nobody has logged into.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticate against `store`. On failure the caller keeps its current session.
    pub fn login(store: &CredentialStore, username: &str, password: &str) -> Result<Self, AccessError> {
        match store.authenticate(username, password) {
            Some(role) => {
                info!("User {} logged in with role {}", username, role);
                Ok(Self {
                    authenticated: true,
                    username: username.to_string(),
                    role: Some(role),
                })
            }
            None => {
                warn!("Failed login attempt for user {}", username);
                Err(AccessError::InvalidCredentials)
            }
        }
    }

    /// End the session, returning the anonymous session that replaces it.
    #[must_use]
    pub fn logout(self) -> Self {
        debug!("User {} logged out", self.username);
        Self::anonymous()
    }

    /// Username with its first letter capitalised, for greetings.
    pub fn display_name(&self) -> String {
        let mut chars = self.username.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }
}

/// The slice of the dataset a session may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    AllAgents,
    Agent(String),
}

impl Scope {
    /// Keep only the records this scope may see.
    pub fn filter<'a>(&self, records: &'a [SalesRecord]) -> Vec<&'a SalesRecord> {
        match self {
            Scope::AllAgents => records.iter().collect(),
            Scope::Agent(name) => records.iter().filter(|r| &r.agent_name == name).collect(),
        }
    }
}

/// Resolve what `session` may see. Standard users without an agent mapping get nothing.
pub fn resolve_scope(session: &Session, store: &CredentialStore) -> Result<Scope, AccessError> {
    match (session.authenticated, session.role) {
        (true, Some(Role::Admin)) => Ok(Scope::AllAgents),
        (true, Some(Role::Standard)) => match store.agent_for(&session.username) {
            Some(agent) => Ok(Scope::Agent(agent.to_string())),
            None => {
                warn!("No agent mapped to user {}", session.username);
                Err(AccessError::UnmappedAgent {
                    username: session.username.clone(),
                })
            }
        },
        _ => Err(AccessError::NotAuthenticated),
    }
}
