//! Primary identifier (ARN) detection

use serde::Serialize;

/// Resource metadata member on every Status struct
pub const METADATA_FIELD: &str = "ACKResourceMetadata";
/// ARN slot inside the resource metadata
pub const METADATA_ARN: &str = "ARN";
/// Owner account slot inside the resource metadata
pub const METADATA_OWNER_ACCOUNT_ID: &str = "OwnerAccountID";

/// Where a resource's ARN comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PrimaryIdentifier {
    /// An output member of an operation
    Member { operation: String, member: String },
    /// A key of the resource's attribute map
    AttributeKey { key: String },
}

impl PrimaryIdentifier {
    /// Wire name of the member or attribute key holding the ARN
    pub fn source_name(&self) -> &str {
        match self {
            PrimaryIdentifier::Member { member, .. } => member,
            PrimaryIdentifier::AttributeKey { key } => key,
        }
    }
}

/// Whether an output member holds the ARN of `resource_name`.
///
/// Matches `Arn` and `<Resource>Arn` regardless of case.
pub fn is_arn_member(resource_name: &str, member_name: &str) -> bool {
    if member_name.eq_ignore_ascii_case("arn") {
        return true;
    }
    let (member, resource) = (member_name.as_bytes(), resource_name.as_bytes());
    member.len() == resource.len() + 3
        && member[..resource.len()].eq_ignore_ascii_case(resource)
        && member[resource.len()..].eq_ignore_ascii_case(b"arn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arn_member_detection() {
        assert!(is_arn_member("Repository", "repositoryArn"));
        assert!(is_arn_member("Topic", "TopicArn"));
        assert!(is_arn_member("CacheCluster", "ARN"));
        assert!(!is_arn_member("Topic", "SubscriptionArn"));
        assert!(!is_arn_member("Topic", "TopicArns"));
        assert!(!is_arn_member("Topic", "Name"));
    }

    #[test]
    fn test_source_name() {
        let member = PrimaryIdentifier::Member {
            operation: "CreateRepository".to_string(),
            member: "repositoryArn".to_string(),
        };
        assert_eq!(member.source_name(), "repositoryArn");
        let key = PrimaryIdentifier::AttributeKey {
            key: "QueueArn".to_string(),
        };
        assert_eq!(key.source_name(), "QueueArn");
    }
}
