//! User identity model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::permissions::{self, ROLE_STUDENT};
use crate::validation;

/// External provider binding stored on a user (at most one per provider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAuthBinding {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Normalized output of an OAuth exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub provider: String,
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Domain user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub roles: Vec<String>,
    #[serde(skip)]
    pub refresh_tokens: Vec<String>,
    pub is_blocked: bool,
    #[serde(skip)]
    pub external_auth: BTreeMap<String, ExternalAuthBinding>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh, not yet persisted user with the default `student` role.
    ///
    /// The email is normalized; `id` and timestamps are assigned by the store.
    pub fn new(email: &str, full_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            email: validation::normalize_email(email),
            full_name: full_name.to_string(),
            password_hash: None,
            roles: vec![ROLE_STUDENT.to_string()],
            refresh_tokens: Vec::new(),
            is_blocked: false,
            external_auth: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Capabilities derived from the user's roles.
    pub fn permissions(&self) -> Vec<String> {
        permissions::resolve(&self.roles)
    }

    /// Whether the display name was generated for an anonymous signup.
    pub fn is_anonymous(&self) -> bool {
        validation::is_anonymous_name(&self.full_name)
    }

    pub fn external_id(&self, provider: &str) -> Option<&str> {
        self.external_auth.get(provider).map(|b| b.id.as_str())
    }

    /// Bind an external identity. A provider already bound to a different
    /// external id is rejected.
    pub fn bind_provider(
        &mut self,
        provider: &str,
        external_id: &str,
        email: Option<&str>,
    ) -> Result<(), AuthError> {
        if let Some(existing) = self.external_auth.get(provider)
            && existing.id != external_id
        {
            return Err(AuthError::ValidationError(format!(
                "user already linked to a different {provider} account"
            )));
        }
        self.external_auth.insert(
            provider.to_string(),
            ExternalAuthBinding {
                id: external_id.to_string(),
                email: email.map(str::to_string),
            },
        );
        Ok(())
    }

    /// Check the invariants a persisted user must satisfy.
    pub fn validate(&self) -> Result<(), AuthError> {
        validation::validate_email(&self.email)?;
        if self.roles.is_empty() {
            return Err(AuthError::ValidationError(
                "user must have at least one role".into(),
            ));
        }
        Ok(())
    }
}
