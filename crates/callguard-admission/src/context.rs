use std::collections::HashMap;

/// Key used when a context carries no user identifier.
pub const ANONYMOUS_KEY: &str = "anonymous";

/// What the caller knows about a unit of work when asking for admission.
///
/// The default key generator only looks at [`user_id`](Self::user_id);
/// custom generators can key on any attribute (tenant, endpoint, role).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    user_id: Option<String>,
    attributes: HashMap<String, String>,
}

impl RequestContext {
    /// Creates a context with no user and no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for the given user.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Default key generator: the user identifier, or [`ANONYMOUS_KEY`].
pub(crate) fn user_or_anonymous(context: &RequestContext) -> String {
    context
        .user_id()
        .filter(|id| !id.is_empty())
        .unwrap_or(ANONYMOUS_KEY)
        .to_string()
}
