use serde::Deserialize;
use url::Url;

/// A GitHub user as decoded from the `/users/{username}` API.
///
/// Every field is required. A response with a missing or `null` field never
/// becomes a `Profile`; the decode fails instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub name: String,
    pub login: String,
    pub followers: u64,
    pub following: u64,
    pub avatar_url: Url,
}

/// Why the last lookup left the screen empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered 404.
    NotFound,
    /// Any other status outside 2xx.
    Status(u16),
    /// The body did not match [`Profile`].
    Decode,
    /// No response arrived (connect, DNS, TLS, broken body).
    Transport,
}

/// The value held by [`crate::store::ProfileStore`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProfileState {
    #[default]
    Absent,
    Loaded(Profile),
    Failed(FailureKind),
}

impl ProfileState {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            ProfileState::Loaded(profile) => Some(profile),
            ProfileState::Absent | ProfileState::Failed(_) => None,
        }
    }

    /// `Failed` counts as absent: nothing is shown for it.
    pub fn is_absent(&self) -> bool {
        self.profile().is_none()
    }

    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            ProfileState::Failed(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<Option<Profile>> for ProfileState {
    fn from(value: Option<Profile>) -> Self {
        value.map_or(ProfileState::Absent, ProfileState::Loaded)
    }
}
