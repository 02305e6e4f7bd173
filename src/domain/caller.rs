use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Caller - Identity resolved by the upstream authorization gate
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Cliente")]
    Customer,
    #[serde(rename = "Empresa")]
    Company,
    #[serde(rename = "Administrador")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "Cliente",
            Role::Company => "Empresa",
            Role::Admin => "Administrador",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cliente" => Ok(Role::Customer),
            "Empresa" => Ok(Role::Company),
            "Administrador" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Authenticated caller.
///
/// Company callers always carry the id of the company they act for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Customer { user_id: Uuid },
    Company { user_id: Uuid, company_id: Uuid },
    Admin { user_id: Uuid },
}

impl Caller {
    pub fn role(&self) -> Role {
        match self {
            Caller::Customer { .. } => Role::Customer,
            Caller::Company { .. } => Role::Company,
            Caller::Admin { .. } => Role::Admin,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match *self {
            Caller::Customer { user_id }
            | Caller::Company { user_id, .. }
            | Caller::Admin { user_id } => user_id,
        }
    }

    pub fn company_id(&self) -> Option<Uuid> {
        match *self {
            Caller::Company { company_id, .. } => Some(company_id),
            _ => None,
        }
    }
}
