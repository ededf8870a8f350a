use serde_json::{Map, Value};

/// ClaimsAccessor
///
/// Typed view over the opaque identity claims. Auth0 places custom claims under a
/// namespaced key, so the roles live at `{namespace}/roles`; everything that needs the role
/// or the email goes through here instead of building keys by hand.
#[derive(Debug, Clone)]
pub struct ClaimsAccessor {
    roles_key: String,
}

impl ClaimsAccessor {
    pub fn new(namespace: &str) -> Self {
        Self {
            roles_key: format!("{}/roles", namespace.trim_end_matches('/')),
        }
    }

    pub fn roles_key(&self) -> &str {
        &self.roles_key
    }

    /// Ordered list of role names. Non-string entries are skipped; a missing or
    /// non-array claim yields an empty list.
    pub fn roles(&self, claims: &Map<String, Value>) -> Vec<String> {
        claims
            .get(&self.roles_key)
            .and_then(Value::as_array)
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The active role: the first entry of the roles claim. Multi-role identities are
    /// reduced to their first role.
    pub fn active_role(&self, claims: &Map<String, Value>) -> Option<String> {
        self.roles(claims).into_iter().next()
    }

    pub fn email(&self, claims: &Map<String, Value>) -> Option<String> {
        claims
            .get("email")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string)
    }
}
