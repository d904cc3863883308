use url::Url;

use crate::models::ProfileState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarView {
    Cleared,
    Load(Url),
}

/// What the profile card shows for a given store value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub name: String,
    pub login: String,
    pub followers: String,
    pub following: String,
    pub avatar: AvatarView,
}

/// Pure mapping from store value to card contents. Failures render as empty.
pub fn render(state: &ProfileState) -> ProfileView {
    match state.profile() {
        Some(profile) => ProfileView {
            name: format!("Name : {}", profile.name),
            login: format!("Github id : {}", profile.login),
            followers: format!("followers : {}", profile.followers),
            following: format!("following : {}", profile.following),
            avatar: AvatarView::Load(profile.avatar_url.clone()),
        },
        None => ProfileView {
            name: "Name : ".into(),
            login: "Github id : ".into(),
            followers: "followers : 0".into(),
            following: "following : 0".into(),
            avatar: AvatarView::Cleared,
        },
    }
}
