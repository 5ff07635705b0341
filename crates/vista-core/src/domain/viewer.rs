use serde::Serialize;
use uuid::Uuid;

/// Identity of a signed-in user as carried by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub username: String,
}

/// Whoever is making the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Viewer {
    #[default]
    Anonymous,
    Authenticated(UserIdentity),
}

impl Viewer {
    pub fn authenticated(id: Uuid, username: impl Into<String>) -> Self {
        Viewer::Authenticated(UserIdentity {
            id,
            username: username.into(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        match self {
            Viewer::Authenticated(identity) => Some(identity),
            Viewer::Anonymous => None,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.identity().map(|identity| identity.id)
    }

    /// Anonymous viewers have an empty username.
    pub fn username(&self) -> &str {
        self.identity()
            .map(|identity| identity.username.as_str())
            .unwrap_or("")
    }
}

impl Serialize for Viewer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Viewer", 3)?;
        state.serialize_field("is_authenticated", &self.is_authenticated())?;
        state.serialize_field("id", &self.id())?;
        state.serialize_field("username", self.username())?;
        state.end()
    }
}
