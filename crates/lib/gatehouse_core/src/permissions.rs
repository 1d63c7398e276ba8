//! Role → permission resolution.
//!
//! Each known role grants exactly one wildcard permission. Unknown roles
//! grant nothing. Pure, no I/O.

use std::str::FromStr;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_ADMIN: &str = "admin";

/// Permission required by operator endpoints.
pub const PERMISSION_ADMIN: &str = "admin:*";

/// Known roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => ROLE_STUDENT,
            Role::Teacher => ROLE_TEACHER,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// The wildcard permission this role grants.
    pub fn permission(&self) -> &'static str {
        match self {
            Role::Student => "student:*",
            Role::Teacher => "teacher:*",
            Role::Admin => PERMISSION_ADMIN,
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_STUDENT => Ok(Role::Student),
            ROLE_TEACHER => Ok(Role::Teacher),
            ROLE_ADMIN => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// Resolve roles to permissions, in role order, each permission once.
pub fn resolve<S: AsRef<str>>(roles: &[S]) -> Vec<String> {
    let mut permissions: Vec<String> = Vec::with_capacity(roles.len());
    for role in roles {
        if let Ok(role) = role.as_ref().parse::<Role>() {
            let permission = role.permission();
            if !permissions.iter().any(|p| p == permission) {
                permissions.push(permission.to_string());
            }
        }
    }
    permissions
}

/// Parse a comma-separated role list, trimming blanks.
pub fn parse_roles(roles: &str) -> Vec<String> {
    let mut parsed: Vec<String> = Vec::new();
    for role in roles.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        if !parsed.iter().any(|r| r == role) {
            parsed.push(role.to_string());
        }
    }
    parsed
}
