use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Body of `GET /users/all`; some deployments answer with a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserList {
    Wrapped { users: Vec<User> },
    Bare(Vec<User>),
}

impl From<UserList> for Vec<User> {
    fn from(list: UserList) -> Self {
        match list {
            UserList::Wrapped { users } | UserList::Bare(users) => users,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub user: User,
}

#[derive(Debug)]
pub struct Credentials {
    pub name: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(name: &str, password: SecretString) -> Self {
        Self {
            name: name.to_string(),
            password,
        }
    }
}

impl Serialize for Credentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Credentials", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("password", self.password.expose_secret())?;
        state.end()
    }
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

impl Serialize for NewUser {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("NewUser", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("password", self.password.expose_secret())?;
        state.end()
    }
}

/// `{ message, error }`, the backend's failure body. It is sent with a 200 status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiFailure {
    pub message: String,
    pub error: String,
}

impl ApiFailure {
    /// The failure carried by `body`, if it has that shape.
    #[must_use]
    pub fn from_body(body: &serde_json::Value) -> Option<Self> {
        Self::deserialize(body).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserLoggedIn {
    pub name: String,
    pub email: String,
    pub jwt: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LoginOutcome {
    LoggedIn { user_logged_in: UserLoggedIn },
    Rejected(ApiFailure),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CreateOutcome {
    Created(CreatedUser),
    Rejected(ApiFailure),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub user_logged_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LogoutRequest {
    pub id: i32,
}

#[derive(Debug)]
pub(crate) struct RefreshRequest<'a> {
    pub id: i32,
    pub refresh_token: &'a SecretString,
}

impl Serialize for RefreshRequest<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RefreshRequest", 2)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("refresh_token", self.refresh_token.expose_secret())?;
        state.end()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub status: String,
}
