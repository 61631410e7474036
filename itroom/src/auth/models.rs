use super::error::AuthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Trim, lower-case and check an identifier against `[a-z0-9_-]{1,64}`.
fn normalize_identifier(kind: &str, raw: &str) -> Result<String, AuthError> {
    let value = raw.trim().to_ascii_lowercase();

    if value.is_empty() {
        return Err(AuthError::InvalidKey(format!("{} must not be empty", kind)));
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(AuthError::InvalidKey(format!(
            "{} exceeds {} characters",
            kind, MAX_IDENTIFIER_LEN
        )));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-'))
    {
        return Err(AuthError::InvalidKey(format!(
            "{} '{}' contains invalid character '{}'",
            kind, raw, c
        )));
    }

    Ok(value)
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, AuthError> {
                normalize_identifier($kind, raw).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            // Only for literals that are known to satisfy the grammar.
            fn known(value: &'static str) -> Self {
                Self(value.to_string())
            }
        }

        impl TryFrom<String> for $name {
            type Error = AuthError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = AuthError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Privilege class of a caller, e.g. `admin` or `staff`.
    RoleName,
    "role"
);

identifier!(
    /// Functional area whose permissions are configured independently.
    ModuleKey,
    "module key"
);

identifier!(
    /// Named operation on a module, e.g. `read` or `update`.
    Action,
    "action"
);

impl RoleName {
    pub fn admin() -> Self {
        Self::known("admin")
    }

    pub fn auditor() -> Self {
        Self::known("auditor")
    }

    pub fn staff() -> Self {
        Self::known("staff")
    }
}

impl ModuleKey {
    pub fn employees() -> Self {
        Self::known("employees")
    }

    pub fn assets() -> Self {
        Self::known("assets")
    }

    pub fn licenses() -> Self {
        Self::known("licenses")
    }

    pub fn repairs() -> Self {
        Self::known("repairs")
    }

    pub fn fingerprints() -> Self {
        Self::known("fingerprints")
    }

    pub fn users() -> Self {
        Self::known("users")
    }

    pub fn audit() -> Self {
        Self::known("audit")
    }

    pub fn email_logs() -> Self {
        Self::known("email_logs")
    }

    pub fn modules() -> Self {
        Self::known("modules")
    }

    pub fn permissions() -> Self {
        Self::known("permissions")
    }
}

impl Action {
    pub fn read() -> Self {
        Self::known("read")
    }

    pub fn create() -> Self {
        Self::known("create")
    }

    pub fn update() -> Self {
        Self::known("update")
    }

    pub fn delete() -> Self {
        Self::known("delete")
    }

    /// read, create, update and delete
    pub fn standard() -> ActionSet {
        [Self::read(), Self::create(), Self::update(), Self::delete()]
            .into_iter()
            .collect()
    }
}

pub type ActionSet = BTreeSet<Action>;

/// Parse a list of raw action names into a set, rejecting the first invalid one.
pub fn parse_actions<I, S>(raw: I) -> Result<ActionSet, AuthError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter().map(|s| Action::parse(s.as_ref())).collect()
}

/// Roles granted every action without consulting permission records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatedRoles(HashSet<RoleName>);

impl ElevatedRoles {
    pub fn new<I: IntoIterator<Item = RoleName>>(roles: I) -> Self {
        Self(roles.into_iter().collect())
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, AuthError> {
        names
            .iter()
            .map(|name| RoleName::parse(name.as_ref()))
            .collect::<Result<HashSet<_>, _>>()
            .map(Self)
    }

    pub fn contains(&self, role: &RoleName) -> bool {
        self.0.contains(role)
    }
}

impl Default for ElevatedRoles {
    fn default() -> Self {
        Self::new([RoleName::admin()])
    }
}

/// Persisted statement of which actions a role may perform on a module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionRecord {
    pub role: RoleName,
    pub module_key: ModuleKey,
    pub actions: ActionSet,
    pub updated_at: DateTime<Utc>,
}

impl PermissionRecord {
    pub fn new(role: RoleName, module_key: ModuleKey, actions: ActionSet) -> Self {
        Self {
            role,
            module_key,
            actions,
            updated_at: Utc::now(),
        }
    }

    pub fn allows(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: RoleName,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String, role: RoleName) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}
