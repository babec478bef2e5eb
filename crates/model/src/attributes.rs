//! Attribute map un-multiplexing
//!
//! SNS and SQS predate typed parameters: most of a topic or queue is set
//! through one `Attributes` map of string keys to string values. The
//! configured key list says which keys exist and where each one belongs.

use ack_generator_common::config::UnpackAttributesMapConfig;
use tracing::warn;

/// Where each configured attribute key is routed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRoutes<'c> {
    /// Name of the map member on request and response shapes
    pub map_member: &'c str,
    /// Writable keys, which become Spec fields
    pub spec: Vec<&'c str>,
    /// Read-only keys, which become Status fields
    pub status: Vec<&'c str>,
    /// Key holding the resource ARN
    pub primary_identifier: Option<&'c str>,
    /// Key holding the owning account ID
    pub owner_account_id: Option<&'c str>,
}

impl<'c> AttributeRoutes<'c> {
    /// Route keys in lexical order. The first key of each special kind
    /// binds; later ones are dropped with a warning.
    pub fn from_config(config: &'c UnpackAttributesMapConfig) -> Self {
        let mut routes = AttributeRoutes {
            map_member: &config.map_member,
            ..Default::default()
        };

        for (key, field) in &config.fields {
            let key = key.as_str();
            if field.is_primary_identifier {
                match routes.primary_identifier {
                    None => routes.primary_identifier = Some(key),
                    Some(bound) => warn!(key, bound, "second primary identifier attribute ignored"),
                }
            } else if field.contains_owner_account_id {
                match routes.owner_account_id {
                    None => routes.owner_account_id = Some(key),
                    Some(bound) => warn!(key, bound, "second owner account attribute ignored"),
                }
            } else if field.is_read_only {
                routes.status.push(key);
            } else {
                routes.spec.push(key);
            }
        }

        routes
    }

    /// Whether `key` is routed to a metadata slot rather than a field
    pub fn is_special(&self, key: &str) -> bool {
        self.primary_identifier == Some(key) || self.owner_account_id == Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ack_generator_common::config::AttributeFieldConfig;

    #[test]
    fn test_routes_topic_attributes() {
        let mut config = UnpackAttributesMapConfig::default();
        let read_only = AttributeFieldConfig {
            is_read_only: true,
            ..Default::default()
        };
        config.fields.insert("DisplayName".to_string(), AttributeFieldConfig::default());
        config.fields.insert("Policy".to_string(), AttributeFieldConfig::default());
        config.fields.insert("EffectiveDeliveryPolicy".to_string(), read_only);
        config.fields.insert(
            "Owner".to_string(),
            AttributeFieldConfig {
                contains_owner_account_id: true,
                ..read_only
            },
        );
        config.fields.insert(
            "TopicArn".to_string(),
            AttributeFieldConfig {
                is_primary_identifier: true,
                ..read_only
            },
        );

        let routes = AttributeRoutes::from_config(&config);
        assert_eq!(routes.map_member, "Attributes");
        assert_eq!(routes.spec, vec!["DisplayName", "Policy"]);
        assert_eq!(routes.status, vec!["EffectiveDeliveryPolicy"]);
        assert_eq!(routes.primary_identifier, Some("TopicArn"));
        assert_eq!(routes.owner_account_id, Some("Owner"));
        assert!(routes.is_special("Owner"));
        assert!(!routes.is_special("Policy"));
    }

    #[test]
    fn test_first_primary_identifier_binds() {
        let mut config = UnpackAttributesMapConfig::default();
        let primary = AttributeFieldConfig {
            is_primary_identifier: true,
            ..Default::default()
        };
        config.fields.insert("QueueArn".to_string(), primary);
        config.fields.insert("ZArn".to_string(), primary);

        let routes = AttributeRoutes::from_config(&config);
        assert_eq!(routes.primary_identifier, Some("QueueArn"));
        assert!(routes.status.is_empty());
        assert!(routes.spec.is_empty());
    }
}
