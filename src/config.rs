use serde_json::{Map, Value as JsonValue};

use crate::error::DataApiError;

/// Immutable client configuration.
///
/// Built once per client and shared by every call made through it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    secret_arn: String,
    resource_arn: String,
    database: Option<String>,
    hydrate_column_names: bool,
    options: Map<String, JsonValue>,
}

impl ClientConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Build a configuration from a JSON object such as
    /// `{"secretArn": .., "resourceArn": .., "database": .., "hydrateColumnNames": ..}`.
    ///
    /// # Errors
    /// Returns `DataApiError::ConfigError` if `secretArn` or `resourceArn` is
    /// missing or not a string, or if `database`, `hydrateColumnNames` or
    /// `options` is present with the wrong type.
    pub fn from_json(value: &JsonValue) -> Result<Self, DataApiError> {
        let Some(obj) = value.as_object() else {
            return Err(DataApiError::ConfigError(
                "configuration must be an object".to_string(),
            ));
        };

        let mut builder = ClientConfig::builder();
        if let Some(JsonValue::String(arn)) = obj.get("secretArn") {
            builder = builder.secret_arn(arn.as_str());
        }
        if let Some(JsonValue::String(arn)) = obj.get("resourceArn") {
            builder = builder.resource_arn(arn.as_str());
        }
        match obj.get("database") {
            None | Some(JsonValue::Null) => {}
            Some(JsonValue::String(db)) => builder = builder.database(db.as_str()),
            Some(_) => {
                return Err(DataApiError::ConfigError(
                    "'database' string value required".to_string(),
                ));
            }
        }
        match obj.get("hydrateColumnNames") {
            None | Some(JsonValue::Null) => {}
            Some(JsonValue::Bool(flag)) => builder = builder.hydrate_column_names(*flag),
            Some(_) => {
                return Err(DataApiError::ConfigError(
                    "'hydrateColumnNames' must be a boolean".to_string(),
                ));
            }
        }
        match obj.get("options") {
            None | Some(JsonValue::Null) => {}
            Some(JsonValue::Object(options)) => builder = builder.options(options.clone()),
            Some(_) => {
                return Err(DataApiError::ConfigError(
                    "'options' must be an object".to_string(),
                ));
            }
        }
        builder.build()
    }

    #[must_use]
    pub fn secret_arn(&self) -> &str {
        &self.secret_arn
    }

    #[must_use]
    pub fn resource_arn(&self) -> &str {
        &self.resource_arn
    }

    /// Default database, used when a call does not name one.
    #[must_use]
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Default hydration mode.
    #[must_use]
    pub fn hydrate_column_names(&self) -> bool {
        self.hydrate_column_names
    }

    /// Opaque, transport-specific options.
    #[must_use]
    pub fn transport_options(&self) -> &Map<String, JsonValue> {
        &self.options
    }
}

/// Builder for [`ClientConfig`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    secret_arn: Option<String>,
    resource_arn: Option<String>,
    database: Option<String>,
    hydrate_column_names: Option<bool>,
    options: Map<String, JsonValue>,
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn secret_arn(mut self, arn: impl Into<String>) -> Self {
        self.secret_arn = Some(arn.into());
        self
    }

    #[must_use]
    pub fn resource_arn(mut self, arn: impl Into<String>) -> Self {
        self.resource_arn = Some(arn.into());
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn hydrate_column_names(mut self, hydrate: bool) -> Self {
        self.hydrate_column_names = Some(hydrate);
        self
    }

    #[must_use]
    pub fn options(mut self, options: Map<String, JsonValue>) -> Self {
        self.options = options;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// # Errors
    /// Returns `DataApiError::ConfigError` if `secretArn` or `resourceArn` is
    /// missing.
    pub fn build(self) -> Result<ClientConfig, DataApiError> {
        let Some(secret_arn) = self.secret_arn else {
            return Err(DataApiError::ConfigError(
                "'secretArn' string value required".to_string(),
            ));
        };
        let Some(resource_arn) = self.resource_arn else {
            return Err(DataApiError::ConfigError(
                "'resourceArn' string value required".to_string(),
            ));
        };

        Ok(ClientConfig {
            secret_arn,
            resource_arn,
            database: self.database,
            hydrate_column_names: self.hydrate_column_names.unwrap_or(true),
            options: self.options,
        })
    }
}
