use serde::{Deserialize, Serialize};

/// Roles recognized at login. Coordinator and Manager may review claims and
/// change claim status; Lecturer may only create and view their own claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Lecturer,
    Coordinator,
    Manager,
}

impl Role {
    pub fn is_reviewer(self) -> bool {
        matches!(self, Role::Coordinator | Role::Manager)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Lecturer => "Lecturer",
            Self::Coordinator => "Coordinator",
            Self::Manager => "Manager",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lecturer" => Ok(Self::Lecturer),
            "coordinator" => Ok(Self::Coordinator),
            "manager" => Ok(Self::Manager),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// The authenticated caller, resolved from the session at the request
/// boundary and passed explicitly into every workflow operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self { email: email.into(), role }
    }
}
