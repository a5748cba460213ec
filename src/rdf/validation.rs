//! Shape validation interface
//!
//! Validation itself is delegated: a [`ShapeValidator`] receives the data
//! quads and the shape quads and returns a [`ValidationReport`]. Violations
//! are data, not errors; [`ValidationError`] is reserved for validators that
//! cannot run at all (unreadable shapes, unsupported constraints).

use super::store::QuadStore;
use super::types::{NamedNode, Subject};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Validator errors
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Shape graph could not be interpreted
    #[error("Invalid shapes: {0}")]
    InvalidShapes(String),

    /// Constraint the validator does not implement
    #[error("Unsupported constraint: {0}")]
    UnsupportedConstraint(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// One failed constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Node the failed constraint was evaluated on (N-Triples form)
    pub focus_node: String,
    /// Human readable description
    pub message: String,
    /// Property path, when the constraint targets one
    pub path: Option<String>,
}

impl Violation {
    pub fn new(focus_node: &Subject, message: impl Into<String>) -> Self {
        Self {
            focus_node: focus_node.to_string(),
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: &NamedNode) -> Self {
        self.path = Some(path.as_str().to_string());
        self
    }
}

/// Outcome of validating a data graph against a shape graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub conforms: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// A report with no violations
    pub fn conforming() -> Self {
        Self {
            conforms: true,
            violations: Vec::new(),
        }
    }

    /// Build a report; conformance follows from the violation list
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            conforms: violations.is_empty(),
            violations,
        }
    }
}

/// Validates data quads against shape quads
pub trait ShapeValidator {
    fn validate(&self, data: &QuadStore, shapes: &QuadStore) -> ValidationResult<ValidationReport>;
}

impl QuadStore {
    /// Validate this store against `shapes` using `validator`
    pub fn validate(
        &self,
        shapes: &QuadStore,
        validator: &dyn ShapeValidator,
    ) -> ValidationResult<ValidationReport> {
        let report = validator.validate(self, shapes)?;
        debug!(
            "Validated {} quads against {} shape quads: conforms={} ({} violations)",
            self.len(),
            shapes.len(),
            report.conforms,
            report.violations.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::types::{Literal, Quad, Term};

    fn ex(local: &str) -> NamedNode {
        NamedNode::new(format!("http://example.org/{}", local)).unwrap()
    }

    /// Shapes are `(class, ex:requires, property)` triples; every instance of
    /// `class` must carry `property`.
    struct RequiredProperty;

    impl ShapeValidator for RequiredProperty {
        fn validate(&self, data: &QuadStore, shapes: &QuadStore) -> ValidationResult<ValidationReport> {
            let rdf_type = NamedNode::new(crate::rdf::types::vocab::RDF_TYPE).unwrap();
            let mut violations = Vec::new();
            for shape in shapes.match_quads(None, Some(&ex("requires")), None, None).iter() {
                let Subject::NamedNode(class) = shape.subject() else {
                    return Err(ValidationError::InvalidShapes(shape.to_string()));
                };
                let Term::NamedNode(property) = shape.object() else {
                    return Err(ValidationError::InvalidShapes(shape.to_string()));
                };
                let class: Term = class.clone().into();
                for typed in data.match_quads(None, Some(&rdf_type), Some(&class), None).iter() {
                    if data.match_quads(Some(typed.subject()), Some(property), None, None).is_empty() {
                        violations.push(
                            Violation::new(typed.subject(), "missing required property").with_path(property),
                        );
                    }
                }
            }
            Ok(ValidationReport::from_violations(violations))
        }
    }

    #[test]
    fn test_validator_reports_violations() {
        let rdf_type = NamedNode::new(crate::rdf::types::vocab::RDF_TYPE).unwrap();
        let mut data = QuadStore::new();
        data.add(Quad::triple(ex("alice"), rdf_type.clone(), ex("Person")));
        data.add(Quad::triple(ex("alice"), ex("name"), Literal::new_simple_literal("Alice")));
        data.add(Quad::triple(ex("bob"), rdf_type, ex("Person")));

        let mut shapes = QuadStore::new();
        shapes.add(Quad::triple(ex("Person"), ex("requires"), ex("name")));

        let report = data.validate(&shapes, &RequiredProperty).unwrap();
        assert!(!report.conforms);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].focus_node, "<http://example.org/bob>");
        assert_eq!(report.violations[0].path.as_deref(), Some("http://example.org/name"));
    }

    #[test]
    fn test_empty_shapes_conform() {
        let data = QuadStore::new();
        let report = data.validate(&QuadStore::new(), &RequiredProperty).unwrap();
        assert_eq!(report, ValidationReport::conforming());
    }

    #[test]
    fn test_validator_error_propagates() {
        let mut shapes = QuadStore::new();
        shapes.add(Quad::triple(ex("Person"), ex("requires"), Literal::new_simple_literal("name")));

        let result = QuadStore::new().validate(&shapes, &RequiredProperty);
        assert!(matches!(result, Err(ValidationError::InvalidShapes(_))));
    }
}
