use async_trait::async_trait;

/// A resolved caller, as produced by the identity collaborator. Cancellation
/// authority is re-derived from this on every call — the engine never stores
/// an actor reference on a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub roles: Vec<String>,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == "admin")
    }

    pub fn customer(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: email.into(),
            roles: Vec::new(),
        }
    }

    pub fn admin(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: email.into(),
            roles: vec!["admin".into()],
        }
    }
}

/// Identity collaborator: turns a bearer token into a caller, or `None` for
/// anonymous/invalid tokens. Implemented outside the engine (JWT, magic
/// links, test stubs).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve_caller(&self, token: &str) -> Option<CallerIdentity>;
}
