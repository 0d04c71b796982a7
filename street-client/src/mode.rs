use serde::{Deserialize, Serialize};

/// What the page was opened to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Continue,
    NewStreet,
    NewStreetCopyLast,
    JustSignedIn,
    ExistingStreet,
    UserGallery,
    GlobalGallery,
    SignOut,
    ForceReloadSignIn,
    ForceReloadSignOut,
    NotFound,
    About,
}

impl Mode {
    fn resumes_last_street(self) -> bool {
        matches!(
            self,
            Mode::Continue | Mode::JustSignedIn | Mode::UserGallery | Mode::GlobalGallery
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub last_street_id: Option<String>,
    pub last_street_namespaced_id: Option<i64>,
    pub last_street_creator_id: Option<String>,
}

impl Settings {
    pub fn clear_last_street(&mut self) {
        *self = Settings::default();
    }
}

/// Identity of the street currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreetIdMetadata {
    pub id: Option<String>,
    pub namespaced_id: Option<i64>,
    pub creator_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    FetchStreet,
    CreateStreet,
    Notice(crate::session::Notice),
    /// Stored sign-in state disagrees with cookies; reload the page.
    ForceReload(Mode),
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub mode: Mode,
    pub action: SessionAction,
    pub street: StreetIdMetadata,
    pub promote_street: bool,
}

/// Decide the next step once sign-in has settled.
pub fn resolve(
    mode: Mode,
    settings: &Settings,
    street: &StreetIdMetadata,
    read_only: bool,
) -> Resolution {
    let mut mode = mode;
    let mut street = street.clone();
    let mut promote_street = false;

    if mode.resumes_last_street() {
        if let Some(last_id) = &settings.last_street_id {
            let current_is_unclaimed = street.creator_id.is_none();
            street = StreetIdMetadata {
                id: Some(last_id.clone()),
                namespaced_id: settings.last_street_namespaced_id,
                creator_id: settings.last_street_creator_id.clone(),
            };

            if mode == Mode::JustSignedIn {
                promote_street = current_is_unclaimed;
                mode = Mode::Continue;
            }
        } else {
            mode = Mode::NewStreet;
        }
    }

    let action = match mode {
        Mode::ExistingStreet | Mode::Continue | Mode::UserGallery | Mode::GlobalGallery => {
            SessionAction::FetchStreet
        }
        Mode::NewStreet | Mode::NewStreetCopyLast if read_only => {
            SessionAction::Notice(crate::session::Notice::CannotCreateNewStreetOnPhone)
        }
        Mode::NewStreet | Mode::NewStreetCopyLast => SessionAction::CreateStreet,
        _ => SessionAction::Nothing,
    };

    Resolution {
        mode,
        action,
        street,
        promote_street,
    }
}
