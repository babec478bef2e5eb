//! Operation classification
//!
//! Operations are indexed by the role they play for a resource
//! (`CreateTopic` creates a `Topic`, `DescribeCacheClusters` lists
//! `CacheCluster`s). Naming conventions cover most services; configured
//! overrides cover the rest.

use ack_generator_common::config::GeneratorConfig;
use ack_generator_common::{DefaultNamer, GeneratorError, Namer, OpType, Operation, Result, ServiceModel};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Maps an operation name to the role it plays and the resource it targets
#[cfg_attr(test, mockall::automock)]
pub trait OperationClassifier {
    fn classify(&self, operation_name: &str) -> Option<(OpType, String)>;
}

/// Classifies operations by verb prefix and plural resource names
#[derive(Debug, Clone, Default)]
pub struct NameConventionClassifier<N: Namer = DefaultNamer> {
    namer: N,
}

impl<N: Namer> NameConventionClassifier<N> {
    pub fn new(namer: N) -> Self {
        Self { namer }
    }

    /// Split `prefix` off `name` when the remainder starts a new word
    fn resource_after<'n>(name: &'n str, prefix: &str) -> Option<&'n str> {
        name.strip_prefix(prefix)
            .filter(|rest| rest.chars().next().is_some_and(|c| c.is_uppercase()))
    }
}

impl<N: Namer> OperationClassifier for NameConventionClassifier<N> {
    fn classify(&self, operation_name: &str) -> Option<(OpType, String)> {
        if let Some(rest) = Self::resource_after(operation_name, "Create") {
            if self.namer.is_plural(rest) {
                return Some((OpType::CreateBatch, self.namer.singularize(rest)));
            }
            return Some((OpType::Create, rest.to_string()));
        }

        for prefix in ["Update", "Modify"] {
            if let Some(rest) = Self::resource_after(operation_name, prefix) {
                return Some((OpType::Update, rest.to_string()));
            }
        }

        if let Some(rest) = Self::resource_after(operation_name, "Delete") {
            return Some((OpType::Delete, rest.to_string()));
        }

        for (prefix, op_type) in [("Get", OpType::GetAttributes), ("Set", OpType::SetAttributes)] {
            if let Some(resource) = Self::resource_after(operation_name, prefix)
                .and_then(|rest| rest.strip_suffix("Attributes"))
                .filter(|r| !r.is_empty())
            {
                return Some((op_type, resource.to_string()));
            }
        }

        for prefix in ["Describe", "Get"] {
            if let Some(rest) = Self::resource_after(operation_name, prefix) {
                if self.namer.is_plural(rest) {
                    return Some((OpType::List, self.namer.singularize(rest)));
                }
                return Some((OpType::Get, rest.to_string()));
            }
        }

        if let Some(rest) = Self::resource_after(operation_name, "List") {
            return Some((OpType::List, self.namer.singularize(rest)));
        }

        None
    }
}

struct PatternOverride {
    regex: Regex,
    op_type: OpType,
    resource_template: String,
}

/// Configured classification overrides, consulted before the classifier
pub struct OperationOverrides {
    exact: BTreeMap<String, (OpType, String)>,
    patterns: Vec<PatternOverride>,
}

impl OperationOverrides {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let exact = config
            .operations
            .iter()
            .map(|(name, o)| (name.clone(), (o.operation_type, o.resource_name.clone())))
            .collect();

        let patterns = config
            .operation_patterns
            .iter()
            .map(|p| {
                let regex = Regex::new(&p.pattern).map_err(|e| {
                    GeneratorError::Config(format!(
                        "invalid operation pattern {:?}: {}",
                        p.pattern, e
                    ))
                })?;
                Ok(PatternOverride {
                    regex,
                    op_type: p.operation_type,
                    resource_template: p.resource_name.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { exact, patterns })
    }

    pub fn lookup(&self, operation_name: &str) -> Option<(OpType, String)> {
        if let Some(found) = self.exact.get(operation_name) {
            return Some(found.clone());
        }
        self.patterns.iter().find_map(|p| {
            p.regex.captures(operation_name).map(|caps| {
                let mut resource = String::new();
                caps.expand(&p.resource_template, &mut resource);
                (p.op_type, resource)
            })
        })
    }
}

/// Operations indexed by role, then by resource name
#[derive(Debug, Default)]
pub struct OperationMap<'a> {
    index: BTreeMap<OpType, BTreeMap<String, &'a Operation>>,
}

impl<'a> OperationMap<'a> {
    /// Index every operation of `model`.
    ///
    /// Operations are visited in lexical order of their names. When two
    /// operations claim the same role for the same resource, the later one
    /// replaces the earlier.
    pub fn build(
        model: &'a ServiceModel,
        config: &GeneratorConfig,
        classifier: &dyn OperationClassifier,
    ) -> Result<Self> {
        let overrides = OperationOverrides::from_config(config)?;
        let mut map = OperationMap::default();

        for op in model.operations() {
            if config.is_ignored_operation(&op.name) {
                debug!(operation = %op.name, "operation ignored by configuration");
                continue;
            }

            let classified = overrides
                .lookup(&op.name)
                .or_else(|| classifier.classify(&op.name));
            let Some((op_type, resource)) = classified else {
                debug!(operation = %op.name, "operation not classified");
                continue;
            };

            debug!(operation = %op.name, %op_type, resource = %resource, "classified operation");
            let by_resource = map.index.entry(op_type).or_default();
            if let Some(previous) = by_resource.insert(resource.clone(), op) {
                warn!(
                    %op_type,
                    resource = %resource,
                    replaced = %previous.name,
                    by = %op.name,
                    "multiple operations for the same role; keeping the last"
                );
            }
        }

        Ok(map)
    }

    pub fn get(&self, op_type: OpType, resource: &str) -> Option<&'a Operation> {
        self.index
            .get(&op_type)
            .and_then(|m| m.get(resource))
            .copied()
    }

    /// Resource names with an operation for `op_type`, in lexical order
    pub fn resources(&self, op_type: OpType) -> impl Iterator<Item = &str> {
        self.index
            .get(&op_type)
            .into_iter()
            .flat_map(|m| m.keys().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(name: &str) -> Option<(OpType, String)> {
        NameConventionClassifier::<DefaultNamer>::default().classify(name)
    }

    #[test]
    fn test_convention_classification() {
        assert_eq!(classify("CreateTopic"), Some((OpType::Create, "Topic".to_string())));
        assert_eq!(classify("CreateTags"), Some((OpType::CreateBatch, "Tag".to_string())));
        assert_eq!(classify("ModifyCacheCluster"), Some((OpType::Update, "CacheCluster".to_string())));
        assert_eq!(classify("DeleteQueue"), Some((OpType::Delete, "Queue".to_string())));
        assert_eq!(classify("GetQueueAttributes"), Some((OpType::GetAttributes, "Queue".to_string())));
        assert_eq!(classify("SetTopicAttributes"), Some((OpType::SetAttributes, "Topic".to_string())));
        assert_eq!(classify("DescribeCacheClusters"), Some((OpType::List, "CacheCluster".to_string())));
        assert_eq!(classify("DescribeRepositories"), Some((OpType::List, "Repository".to_string())));
        assert_eq!(classify("GetRoute"), Some((OpType::Get, "Route".to_string())));
        assert_eq!(classify("ListTopics"), Some((OpType::List, "Topic".to_string())));
        assert_eq!(classify("CreateAlias"), Some((OpType::Create, "Alias".to_string())));
        assert_eq!(classify("ListAliases"), Some((OpType::List, "Alias".to_string())));
        assert_eq!(classify("ListEventBuses"), Some((OpType::List, "EventBus".to_string())));
        assert_eq!(classify("PutImage"), None);
        assert_eq!(classify("Getaway"), None);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = GeneratorConfig::from_yaml(
            r#"
operations:
  GetQueueUrl:
    operation_type: Get
    resource_name: Queue
operation_patterns:
  - pattern: "^Put(.+)Policy$"
    operation_type: Update
    resource_name: "${1}Policy"
"#,
        )
        .unwrap();
        let overrides = OperationOverrides::from_config(&config).unwrap();

        assert_eq!(overrides.lookup("GetQueueUrl"), Some((OpType::Get, "Queue".to_string())));
        assert_eq!(
            overrides.lookup("PutLifecyclePolicy"),
            Some((OpType::Update, "LifecyclePolicy".to_string()))
        );
        assert_eq!(overrides.lookup("CreateQueue"), None);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let config = GeneratorConfig::from_yaml(
            r#"
operation_patterns:
  - pattern: "^Put(.+"
    operation_type: Update
    resource_name: "$1"
"#,
        )
        .unwrap();
        let err = OperationOverrides::from_config(&config).err().unwrap();
        assert!(matches!(err, GeneratorError::Config(_)));
    }

    #[test]
    fn test_operation_map_uses_pluggable_classifier() {
        let model = ServiceModel::new("Books")
            .with_operation(Operation::new("MakeBook"))
            .with_operation(Operation::new("ShelveBook"))
            .with_operation(Operation::new("Ignored"))
            .finish();

        let mut classifier = MockOperationClassifier::new();
        classifier
            .expect_classify()
            .returning(|name| match name {
                "MakeBook" => Some((OpType::Create, "Book".to_string())),
                "ShelveBook" => Some((OpType::Update, "Book".to_string())),
                _ => None,
            });

        let map = OperationMap::build(&model, &GeneratorConfig::default(), &classifier).unwrap();
        assert_eq!(map.get(OpType::Create, "Book").unwrap().name, "MakeBook");
        assert_eq!(map.get(OpType::Update, "Book").unwrap().name, "ShelveBook");
        assert!(map.get(OpType::Delete, "Book").is_none());
        assert_eq!(map.resources(OpType::Create).collect::<Vec<_>>(), vec!["Book"]);
    }

    #[test]
    fn test_operation_map_last_write_wins_in_lexical_order() {
        let model = ServiceModel::new("Cache")
            .with_operation(Operation::new("DescribeCacheClusters"))
            .with_operation(Operation::new("ListCacheClusters"))
            .with_operation(Operation::new("DeleteSnapshot"))
            .finish();
        let config = GeneratorConfig::from_yaml("ignore:\n  operations: [DeleteSnapshot]\n").unwrap();

        let map = OperationMap::build(&model, &config, &NameConventionClassifier::<DefaultNamer>::default())
            .unwrap();
        assert_eq!(map.get(OpType::List, "CacheCluster").unwrap().name, "ListCacheClusters");
        assert!(map.get(OpType::Delete, "Snapshot").is_none());
    }
}
