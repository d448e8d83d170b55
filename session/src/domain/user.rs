//! User data model.
//!
//! The record store owns durable user records; the session core only mirrors
//! them. Value objects validate their input once at construction so the rest
//! of the crate can rely on the invariants documented on each type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Validation errors returned by the user value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmptyFullName,
    FullNameTooLong { max: usize },
    UnknownRole { value: String },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not have surrounding whitespace"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like name@domain"),
            Self::EmptyFullName => write!(f, "full name must not be empty"),
            Self::FullNameTooLong { max } => {
                write!(f, "full name must be at most {max} characters")
            }
            Self::UnknownRole { value } => {
                write!(f, "unknown role '{value}'; expected patient, doctor, or admin")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Opaque, stable user identifier.
///
/// The record store decides the format; the core only requires a non-empty
/// value without surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Login email address.
///
/// ## Invariants
/// - Stored trimmed and lowercased, so comparisons are case-insensitive.
/// - Exactly one `@`, with non-empty local and domain parts and no inner
///   whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = email.as_ref().trim();
        if normalized.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }

        let mut parts = normalized.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(normalized.to_lowercase()))
            }
            _ => Err(UserValidationError::InvalidEmail),
        }
    }

    /// Whether `raw` names this address, ignoring case and surrounding
    /// whitespace.
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == raw.trim().to_lowercase()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a full name, in characters.
pub const FULL_NAME_MAX: usize = 120;

/// Display name shown in the consultation UI.
///
/// Any script is accepted; most names are Arabic. Stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate and construct a [`FullName`].
    pub fn new(full_name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = full_name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(UserValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role of an account. Closed set with no hierarchy between members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books and attends consultations.
    Patient,
    /// Answers consultations.
    Doctor,
    /// Manages the clinic.
    Admin,
}

impl Role {
    /// Lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Self::Patient),
            "doctor" => Ok(Self::Doctor),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole {
                value: value.to_owned(),
            }),
        }
    }
}

/// An authenticated principal as held by the record store.
///
/// ## Invariants
/// - `id` never changes for the lifetime of the record.
/// - `email` is unique across the store; the store enforces this, not the
///   session core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    email: Email,
    full_name: Option<FullName>,
    role: Role,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, email: Email, full_name: Option<FullName>, role: Role) -> Self {
        Self {
            id,
            email,
            full_name,
            role,
        }
    }

    /// Fallible constructor from raw strings.
    ///
    /// # Examples
    /// ```
    /// use clinic_session::domain::{Role, User};
    ///
    /// let user = User::try_from_strings("1", "A@X.com", Some("Layla Haddad"), Role::Patient)
    ///     .expect("valid user");
    /// assert_eq!(user.email().as_ref(), "a@x.com");
    /// ```
    pub fn try_from_strings(
        id: impl AsRef<str>,
        email: impl AsRef<str>,
        full_name: Option<&str>,
        role: Role,
    ) -> Result<Self, UserValidationError> {
        let id = UserId::new(id)?;
        let email = Email::new(email)?;
        let full_name = full_name.map(FullName::new).transpose()?;
        Ok(Self::new(id, email, full_name, role))
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Optional display name.
    pub fn full_name(&self) -> Option<&FullName> {
        self.full_name.as_ref()
    }

    /// Account role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Return a copy with every field present in `patch` replaced.
    ///
    /// The identifier is never touched; [`UserPatch`] has no id field.
    pub fn merged_with(&self, patch: &UserPatch) -> Self {
        Self {
            id: self.id.clone(),
            email: patch.email.clone().unwrap_or_else(|| self.email.clone()),
            full_name: patch
                .full_name
                .clone()
                .or_else(|| self.full_name.clone()),
            role: patch.role.unwrap_or(self.role),
        }
    }
}

/// Partial update for the signed-in user's record.
///
/// Every field is optional; absent fields keep their stored value. An empty
/// patch is a valid no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// Replacement login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// Replacement display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<FullName>,
    /// Replacement role; the store decides whether to accept it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserPatch {
    /// Set the replacement email.
    #[must_use]
    pub fn with_email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    /// Set the replacement display name.
    #[must_use]
    pub fn with_full_name(mut self, full_name: FullName) -> Self {
        self.full_name = Some(full_name);
        self
    }

    /// Set the replacement role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.full_name.is_none() && self.role.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    full_name: Option<String>,
    role: Role,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            email,
            full_name,
            role,
        } = value;
        Self {
            id: id.into(),
            email: email.into(),
            full_name: full_name.map(String::from),
            role,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        User::try_from_strings(value.id, value.email, value.full_name.as_deref(), value.role)
    }
}
