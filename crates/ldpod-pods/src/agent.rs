use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named values substituted into pod templates.
pub type TemplateParameters = BTreeMap<String, String>;

/// The account a pod is created for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Seed for the pod identifier.
    pub login: String,
    pub web_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Agent {
    pub fn new(login: impl Into<String>, web_id: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            web_id: web_id.into(),
            name: None,
            email: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Template parameters keyed by the camelCase field names
    /// (`login`, `webId`, `name`, `email`). Absent fields are omitted.
    pub fn template_parameters(&self) -> TemplateParameters {
        let mut params = TemplateParameters::new();
        params.insert("login".into(), self.login.clone());
        params.insert("webId".into(), self.web_id.clone());
        if let Some(name) = &self.name {
            params.insert("name".into(), name.clone());
        }
        if let Some(email) = &self.email {
            params.insert("email".into(), email.clone());
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_use_template_names() {
        let agent = Agent::new("alice", "http://alice/#profile").with_name("Alice");
        let params = agent.template_parameters();
        assert_eq!(params.get("webId").map(String::as_str), Some("http://alice/#profile"));
        assert_eq!(params.get("name").map(String::as_str), Some("Alice"));
        assert!(!params.contains_key("email"));
    }
}
