//! Declarative description of the action for a host binding layer.
//!
//! The dispatcher never reads this table. Hosts use it to render binding
//! forms and to know which context names map onto [`RequestConfig`] fields.
//!
//! Older rule configurations also offered a free-form, multi-valued `data`
//! input restricted to data selection. The payload shape is fixed, so that
//! input is not part of this table and a `data` binding is ignored.
//!
//! [`RequestConfig`]: crate::RequestConfig

use serde::Serialize;
use strum::{AsRefStr, Display};

/// Identifier the action is registered under.
pub const ACTION_ID: &str = "rules_api_post";

/// Data type of a context value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataType {
    String,
    Integer,
    Float,
}

/// One input or output of the action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextDefinition {
    /// Binding name, matching the camelCase [`RequestConfig`](crate::RequestConfig) field.
    pub name: &'static str,
    pub data_type: DataType,
    pub label: &'static str,
    pub description: &'static str,
    pub required: bool,
    /// Whether the binding accepts a list of values.
    pub multiple: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

impl ContextDefinition {
    fn new(
        name: &'static str,
        data_type: DataType,
        label: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            data_type,
            label,
            description,
            required: false,
            multiple: false,
            default_value: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    fn default_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Full description of the action: its inputs and what it provides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub context: Vec<ContextDefinition>,
    pub provides: Vec<ContextDefinition>,
}

impl ActionDefinition {
    /// Returns the definition of the API POST action.
    pub fn api_post() -> Self {
        Self {
            id: ACTION_ID,
            label: "Rules Action for API POST",
            category: "Data",
            context: vec![
                ContextDefinition::new(
                    "url",
                    DataType::String,
                    "URL",
                    "The endpoint the request is sent to, e.g. https://example.com/node?_format=hal_json",
                )
                .required()
                .multiple(),
                ContextDefinition::new(
                    "linkUrl",
                    DataType::String,
                    "Link URL",
                    "The REST type link of the created item, e.g. https://example.com/rest/type/node/article",
                )
                .required()
                .multiple(),
                ContextDefinition::new(
                    "apiUser",
                    DataType::String,
                    "API User Name",
                    "Username for API access",
                ),
                ContextDefinition::new(
                    "apiPass",
                    DataType::String,
                    "API User Password",
                    "Password for API access",
                ),
                ContextDefinition::new(
                    "apiToken",
                    DataType::String,
                    "API Session Token",
                    "Session token sent as X-CSRF-Token",
                ),
                ContextDefinition::new(
                    "userId",
                    DataType::String,
                    "User ID",
                    "Stored in the field_user_id field, which must exist on the content type",
                ),
                ContextDefinition::new(
                    "headers",
                    DataType::String,
                    "Headers",
                    "Extra request headers as 'name: value' pairs, one per line",
                ),
                ContextDefinition::new(
                    "method",
                    DataType::String,
                    "Method",
                    "HTTP method such as POST, PUT or PATCH",
                )
                .default_value("POST"),
                ContextDefinition::new(
                    "maxRedirects",
                    DataType::Integer,
                    "Max Redirect",
                    "How many times a redirect may be followed",
                )
                .default_value(crate::config::DEFAULT_MAX_REDIRECTS),
                ContextDefinition::new(
                    "timeoutSeconds",
                    DataType::Float,
                    "Timeout",
                    "The maximum number of seconds the request may take",
                )
                .default_value(crate::config::DEFAULT_TIMEOUT_SECS),
            ],
            provides: vec![ContextDefinition::new(
                "http_response",
                DataType::String,
                "HTTP data",
                "Raw body of the endpoint's 200 response",
            )],
        }
    }

    /// Looks up an input by binding name.
    pub fn input(&self, name: &str) -> Option<&ContextDefinition> {
        self.context.iter().find(|context| context.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestConfig;

    #[test]
    fn test_required_inputs() {
        let definition = ActionDefinition::api_post();
        let required: Vec<_> = definition
            .context
            .iter()
            .filter(|context| context.required)
            .map(|context| context.name)
            .collect();
        assert_eq!(required, ["url", "linkUrl"]);
        assert!(definition.input("url").unwrap().multiple);
    }

    #[test]
    fn test_defaults_match_config() {
        let definition = ActionDefinition::api_post();
        assert_eq!(
            definition.input("maxRedirects").unwrap().default_value,
            Some(serde_json::json!(3))
        );
        assert_eq!(
            definition.input("timeoutSeconds").unwrap().default_value,
            Some(serde_json::json!(30.0))
        );
    }

    #[test]
    fn test_binding_names_deserialize_into_config() {
        let definition = ActionDefinition::api_post();
        let mut bindings = serde_json::Map::new();
        for context in &definition.context {
            let value = match (context.data_type, context.multiple) {
                (DataType::String, true) => serde_json::json!(["https://example.com/x"]),
                (DataType::String, false) => serde_json::json!("value"),
                (DataType::Integer, _) => serde_json::json!(1),
                (DataType::Float, _) => serde_json::json!(1.5),
            };
            bindings.insert(context.name.to_owned(), value);
        }

        let config: RequestConfig = serde_json::from_value(bindings.into()).unwrap();
        assert_eq!(config.user_id.as_deref(), Some("value"));
        assert_eq!(config.max_redirects, Some(1));
        assert_eq!(config.timeout_seconds, Some(1.5));
    }

    #[test]
    fn test_free_form_data_input_not_offered() {
        let definition = ActionDefinition::api_post();
        assert!(definition.input("data").is_none());

        let config: RequestConfig = serde_json::from_value(serde_json::json!({
            "url": ["https://example.com/node"],
            "linkUrl": ["https://example.com/rest/type/node/article"],
            "data": ["ignored"]
        }))
        .unwrap();
        assert!(config.resolve().is_ok());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(ActionDefinition::api_post()).unwrap();
        assert_eq!(value["id"], ACTION_ID);
        assert_eq!(value["provides"][0]["name"], "http_response");
        assert_eq!(value["context"][0]["data_type"], "string");
    }
}
