//! Shape to field type resolution

use ack_generator_common::{FieldType, Namer, Result, ServiceModel, Shape, ShapeKind};
use std::collections::BTreeSet;

/// Which generated type family a structure name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Types generated for the Kubernetes API package
    Crd,
    /// Types of the service SDK
    Sdk,
}

/// Resolves shapes to [`FieldType`]s for one service
pub struct TypeResolver<'s> {
    model: &'s ServiceModel,
    namer: &'s dyn Namer,
    /// `<Kind>Spec` and `<Kind>Status` of every resource
    reserved: BTreeSet<String>,
}

impl<'s> TypeResolver<'s> {
    pub fn new<'k>(
        model: &'s ServiceModel,
        namer: &'s dyn Namer,
        kinds: impl IntoIterator<Item = &'k str>,
    ) -> Self {
        let reserved = kinds
            .into_iter()
            .flat_map(|kind| [format!("{}Spec", kind), format!("{}Status", kind)])
            .collect();
        Self {
            model,
            namer,
            reserved,
        }
    }

    /// Generated type name of a structure shape.
    ///
    /// Shapes such as `DBProxyStatus` would collide with the `DBProxy`
    /// resource's own Status struct, so they get an `_SDK` suffix.
    pub fn crd_type_name(&self, shape_name: &str) -> String {
        let camel = self.namer.names(shape_name).camel;
        if self.reserved.contains(&camel) {
            format!("{}_SDK", camel)
        } else {
            camel
        }
    }

    pub fn type_name(&self, shape: &Shape, side: Side) -> String {
        match side {
            Side::Crd => self.crd_type_name(&shape.name),
            Side::Sdk => shape.name.clone(),
        }
    }

    /// Field type of a shape, or `None` when some part of it has no mapping
    pub fn field_type(&self, shape: &Shape, side: Side) -> Result<Option<FieldType>> {
        let resolved = match &shape.kind {
            ShapeKind::Scalar(scalar) => Some(FieldType::from_scalar(*scalar)),
            ShapeKind::Structure { .. } => Some(FieldType::Structure(self.type_name(shape, side))),
            ShapeKind::List { member } => {
                let elem = self.model.resolve(member, &format!("{}.member", shape.name))?;
                self.field_type(elem, side)?
                    .map(|e| FieldType::List(Box::new(e)))
            }
            ShapeKind::Map { key, value } => {
                let key = self.model.resolve(key, &format!("{}.key", shape.name))?;
                let value = self.model.resolve(value, &format!("{}.value", shape.name))?;
                match (self.field_type(key, side)?, self.field_type(value, side)?) {
                    (Some(k), Some(v)) => Some(FieldType::Map(Box::new(k), Box::new(v))),
                    _ => None,
                }
            }
            ShapeKind::Unsupported(_) => None,
        };
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ack_generator_common::{DefaultNamer, MemberRef, ScalarType};

    fn model() -> ServiceModel {
        ServiceModel::new("RDS")
            .with_shape(Shape::scalar("String", ScalarType::String))
            .with_shape(Shape::scalar("TStamp", ScalarType::Timestamp))
            .with_shape(Shape::structure(
                "DBProxyStatus",
                vec![MemberRef::new("Value", "String")],
            ))
            .with_shape(Shape::structure("Tag", vec![MemberRef::new("Key", "String")]))
            .with_shape(Shape::list("TagList", "Tag"))
            .with_shape(Shape::map("TimeMap", "String", "TStamp"))
            .with_shape(Shape::new("Doc", ShapeKind::Unsupported("document".to_string())))
            .with_shape(Shape::list("DocList", "Doc"))
            .finish()
    }

    #[test]
    fn test_reserved_names_get_sdk_suffix() {
        let model = model();
        let types = TypeResolver::new(&model, &DefaultNamer, ["DBProxy"]);
        assert_eq!(types.crd_type_name("DBProxyStatus"), "DBProxyStatus_SDK");
        assert_eq!(types.crd_type_name("Tag"), "Tag");
    }

    #[test]
    fn test_field_types_per_side() {
        let model = model();
        let types = TypeResolver::new(&model, &DefaultNamer, ["DBProxy"]);

        let list = model.shape("TagList").unwrap();
        assert_eq!(
            types.field_type(list, Side::Crd).unwrap(),
            Some(FieldType::List(Box::new(FieldType::Structure("Tag".to_string()))))
        );
        let status = model.shape("DBProxyStatus").unwrap();
        assert_eq!(
            types.field_type(status, Side::Sdk).unwrap(),
            Some(FieldType::Structure("DBProxyStatus".to_string()))
        );
        let map = model.shape("TimeMap").unwrap();
        assert!(types.field_type(map, Side::Crd).unwrap().unwrap().contains_date_time());
    }

    #[test]
    fn test_unsupported_shapes_have_no_type() {
        let model = model();
        let types = TypeResolver::new(&model, &DefaultNamer, ["Instance"]);
        assert_eq!(types.field_type(model.shape("DocList").unwrap(), Side::Crd).unwrap(), None);
    }
}
