/// Source of the signed-in user's identity.
///
/// `None` means nobody is signed in; every session store call then fails with
/// `NOT_AUTHENTICATED` before touching storage.
pub trait IdentityProvider: Send + Sync {
    fn current_uid(&self) -> Option<String>;
}

/// Fixed identity, resolved once (from a CLI flag, env var or test fixture).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity(Option<String>);

impl StaticIdentity {
    pub fn signed_in(uid: impl Into<String>) -> Self {
        Self(Some(uid.into()))
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self(None)
    }

    /// Blank ids count as signed out.
    #[must_use]
    pub fn from_optional(uid: Option<String>) -> Self {
        Self(uid.filter(|u| !u.trim().is_empty()))
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_uid(&self) -> Option<String> {
        self.0.clone()
    }
}
