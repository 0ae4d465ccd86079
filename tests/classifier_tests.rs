// tests/classifier_tests.rs
//
// Location classification with stub metadata oracles.

use std::cell::RefCell;
use std::error::Error;

use pretty_assertions::assert_eq;
use wim_xpath::ast::{AstNode, BoolOp, Filter, Location};
use wim_xpath::oracle::{MetadataOracle, OracleError, PropertyMapping};
use wim_xpath::parser::{DEFAULT_ENTITY_TYPE, ErrorKind, ParseError, Parser, parse};

/// p1, p2, p3 in the repository and l1, l2 in the look-aside store, for
/// every entity type.
fn mixed_mapping() -> PropertyMapping {
    PropertyMapping::new()
        .with_repository("*", "p1")
        .with_repository("*", "p2")
        .with_repository("*", "p3")
        .with_lookaside("*", "l1")
        .with_lookaside("*", "l2")
}

fn parse_with(input: &str, oracle: &dyn MetadataOracle) -> Filter {
    match parse(input, Some(oracle)) {
        Ok(filter) => filter,
        Err(e) => panic!("failed to parse {:?}: {}", input, e),
    }
}

fn predicate_with(input: &str, oracle: &dyn MetadataOracle) -> AstNode {
    parse_with(input, oracle).predicate.expect("expected a predicate")
}

fn location_of(node: &AstNode) -> Location {
    match node {
        AstNode::Property { location, .. } => *location,
        other => panic!("Expected property, got {:?}", other),
    }
}

struct FailingOracle;

impl MetadataOracle for FailingOracle {
    fn is_property_in_repository(&self, _property: &str, _entity_type: &str) -> Result<bool, OracleError> {
        Err("mapping unavailable".into())
    }

    fn is_property_in_lookaside(&self, _property: &str, _entity_type: &str) -> Result<bool, OracleError> {
        Err("mapping unavailable".into())
    }
}

/// Records every question and answers from a mapping.
struct RecordingOracle {
    mapping: PropertyMapping,
    calls: RefCell<Vec<String>>,
}

impl RecordingOracle {
    fn new(mapping: PropertyMapping) -> Self {
        RecordingOracle {
            mapping,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MetadataOracle for RecordingOracle {
    fn is_property_in_repository(&self, property: &str, entity_type: &str) -> Result<bool, OracleError> {
        self.calls.borrow_mut().push(format!("repository {} {}", property, entity_type));
        self.mapping.is_property_in_repository(property, entity_type)
    }

    fn is_property_in_lookaside(&self, property: &str, entity_type: &str) -> Result<bool, OracleError> {
        self.calls.borrow_mut().push(format!("lookaside {} {}", property, entity_type));
        self.mapping.is_property_in_lookaside(property, entity_type)
    }
}

// ============================================================================
// Leaves
// ============================================================================

#[test]
fn test_login_account_scenario() {
    let mapping = PropertyMapping::new().with_repository("LoginAccount", "principalName");

    let filter = parse_with(
        "//entities[@xsi:type='LoginAccount' and principalName='admin']",
        &mapping,
    );

    assert_eq!(filter.entity_types.as_slice(), ["LoginAccount"]);
    assert_eq!(
        filter.predicate,
        Some(AstNode::Property {
            name: "principalName".to_string(),
            operator: wim_xpath::ast::CompOp::Equal,
            value: wim_xpath::ast::Literal::String("admin".to_string()),
            location: Location::Repository,
        })
    );
}

#[test]
fn test_repository_and_lookaside_leaves() {
    let mapping = mixed_mapping();
    assert_eq!(location_of(&predicate_with("p1='x'", &mapping)), Location::Repository);
    assert_eq!(location_of(&predicate_with("l1='x'", &mapping)), Location::LookAside);
}

#[test]
fn test_repository_wins_over_lookaside() {
    let mapping = PropertyMapping::new()
        .with_repository("*", "cn")
        .with_lookaside("*", "cn");

    assert_eq!(location_of(&predicate_with("cn='x'", &mapping)), Location::Repository);
}

#[test]
fn test_type_property_is_always_repository() {
    // The mapping knows nothing about xsi:type.
    let mapping = PropertyMapping::new().with_lookaside("*", "nickname");

    let node = predicate_with("@xsi:type='Group' or nickname='x'", &mapping);
    match node {
        AstNode::FederationLogical { left, right, op: BoolOp::Or } => {
            assert_eq!(location_of(&left), Location::Repository);
            assert_eq!(location_of(&right), Location::LookAside);
        }
        other => panic!("Expected federation, got {:?}", other),
    }
}

#[test]
fn test_lookup_is_scoped_by_entity_type() {
    let mapping = PropertyMapping::new()
        .with_repository("Group", "description")
        .with_lookaside("PersonAccount", "description");

    let group = predicate_with("//entities[@xsi:type='Group' and description='x']", &mapping);
    assert_eq!(location_of(&group), Location::Repository);

    let person = predicate_with("//entities[@xsi:type='PersonAccount' and description='x']", &mapping);
    assert_eq!(location_of(&person), Location::LookAside);
}

#[test]
fn test_any_named_type_is_enough() {
    let mapping = PropertyMapping::new().with_repository("PersonAccount", "uid");

    let node = predicate_with(
        "//entities[(@xsi:type='Group' or @xsi:type='PersonAccount') and uid='x']",
        &mapping,
    );
    assert_eq!(location_of(&node), Location::Repository);
}

#[test]
fn test_repository_asked_for_every_type_before_lookaside() {
    let oracle = RecordingOracle::new(PropertyMapping::new().with_lookaside("PersonAccount", "nickname"));

    let node = predicate_with(
        "//entities[(@xsi:type='Group' or @xsi:type='PersonAccount') and nickname='x']",
        &oracle,
    );
    assert_eq!(location_of(&node), Location::LookAside);

    assert_eq!(
        *oracle.calls.borrow(),
        vec![
            "repository nickname Group",
            "repository nickname PersonAccount",
            "lookaside nickname Group",
            "lookaside nickname PersonAccount",
        ]
    );
}

// ============================================================================
// Combinators
// ============================================================================

#[test]
fn test_same_location_is_inherited() {
    let mapping = mixed_mapping();

    let node = predicate_with("p1='x' and p2='y'", &mapping);
    assert!(matches!(
        node,
        AstNode::Logical { location: Location::Repository, op: BoolOp::And, .. }
    ));

    let node = predicate_with("l1='x' or l2='y'", &mapping);
    assert!(matches!(
        node,
        AstNode::Logical { location: Location::LookAside, op: BoolOp::Or, .. }
    ));

    let node = predicate_with("(l1='x' or l2='y')", &mapping);
    assert!(matches!(node, AstNode::Parenthesis { location: Location::LookAside, .. }));
}

#[test]
fn test_mixed_operands_build_federation_nodes() {
    let mapping = mixed_mapping();

    let node = predicate_with("p1='x' and l1='y'", &mapping);
    assert!(matches!(node, AstNode::FederationLogical { op: BoolOp::And, .. }));
    assert_eq!(node.location(), None);
    assert!(node.is_federated());

    let node = predicate_with("(p1='x' and l1='y')", &mapping);
    match node {
        AstNode::FederationParenthesis { child } => {
            assert!(matches!(*child, AstNode::FederationLogical { .. }));
        }
        other => panic!("Expected federation parenthesis, got {:?}", other),
    }
}

#[test]
fn test_federation_is_infectious_upward() {
    let mapping = mixed_mapping();

    // Both operands of the outer `and` start in the repository, but the
    // left one also contains a look-aside property.
    let node = predicate_with("(p1='x' or l1='y') and p2='z'", &mapping);
    match node {
        AstNode::FederationLogical { left, right, op: BoolOp::And } => {
            assert!(matches!(*left, AstNode::FederationParenthesis { .. }));
            assert_eq!(location_of(&right), Location::Repository);
        }
        other => panic!("Expected federation, got {:?}", other),
    }

    let node = predicate_with("((p1='x' or l1='y'))", &mapping);
    match node {
        AstNode::FederationParenthesis { child } => {
            assert!(matches!(*child, AstNode::FederationParenthesis { .. }));
        }
        other => panic!("Expected federation parenthesis, got {:?}", other),
    }
}

#[test]
fn test_homogeneous_subtrees_under_federation_keep_their_location() {
    let mapping = mixed_mapping();

    let node = predicate_with("p1='a' and p2='b' or l1='c' and l2='d'", &mapping);
    match node {
        AstNode::FederationLogical { left, right, op: BoolOp::Or } => {
            assert!(matches!(*left, AstNode::Logical { location: Location::Repository, .. }));
            assert!(matches!(*right, AstNode::Logical { location: Location::LookAside, .. }));
        }
        other => panic!("Expected federation, got {:?}", other),
    }
}

#[test]
fn test_filter_reports_federation() {
    let mapping = mixed_mapping();
    assert!(parse_with("p1='x' or l1='y'", &mapping).is_federated());
    assert!(!parse_with("p1='x' or p2='y'", &mapping).is_federated());
    assert!(!parse_with("//entities[@xsi:type='Group']", &mapping).is_federated());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unsupported_attribute() {
    let mapping = mixed_mapping();

    let err = parse("ghost='x'", Some(&mapping)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedAttribute);
    match err {
        ParseError::UnsupportedAttribute { property, entity_types } => {
            assert_eq!(property, "ghost");
            assert_eq!(entity_types, vec![DEFAULT_ENTITY_TYPE.to_string()]);
        }
        other => panic!("Expected unsupported attribute, got {:?}", other),
    }
}

#[test]
fn test_unsupported_attribute_names_the_searched_types() {
    let mapping = PropertyMapping::new().with_repository("Group", "cn");

    let err = parse("//entities[@xsi:type='PersonAccount' and cn='x']", Some(&mapping)).unwrap_err();
    match err {
        ParseError::UnsupportedAttribute { property, entity_types } => {
            assert_eq!(property, "cn");
            assert_eq!(entity_types, vec!["PersonAccount".to_string()]);
        }
        other => panic!("Expected unsupported attribute, got {:?}", other),
    }
}

#[test]
fn test_unsupported_attribute_is_never_a_syntax_error() {
    let mapping = PropertyMapping::new();

    for input in ["ghost='x'", "ghost=1", "(ghost='x')", "//entities[@xsi:type='Group' and ghost='x']"] {
        let err = parse(input, Some(&mapping)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAttribute, "Failed for input: {}", input);
    }
}

#[test]
fn test_oracle_failure_is_wrapped() {
    let err = parse("uid='x'", Some(&FailingOracle)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Oracle);
    assert!(matches!(err, ParseError::Oracle(_)));
    assert!(err.source().is_some());
    assert!(err.to_string().contains("mapping unavailable"));
}

#[test]
fn test_type_property_needs_no_oracle_answer() {
    // xsi:type is classified without asking, so a broken oracle is not hit.
    let filter = parse("//entities[@xsi:type='Group' and @xsi:type='Group']", Some(&FailingOracle)).unwrap();
    assert!(matches!(
        filter.predicate,
        Some(AstNode::Property { location: Location::Repository, .. })
    ));
}

// ============================================================================
// Defaults, No-Oracle Mode and Determinism
// ============================================================================

#[test]
fn test_default_entity_types() {
    let mapping = PropertyMapping::new().with_repository("PersonAccount", "uid");
    let defaults = vec!["PersonAccount".to_string()];

    let parser = Parser::new(Some(&mapping)).with_default_entity_types(&defaults);
    let filter = parser.parse("uid='x'").unwrap();
    assert_eq!(location_of(filter.predicate.as_ref().unwrap()), Location::Repository);
    // Defaults are used for lookups only.
    assert!(filter.entity_types.is_empty());

    let err = Parser::new(Some(&mapping)).parse("uid='x'").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedAttribute);
}

#[test]
fn test_named_types_take_precedence_over_defaults() {
    let mapping = PropertyMapping::new().with_repository("PersonAccount", "uid");
    let defaults = vec!["PersonAccount".to_string()];

    let err = Parser::new(Some(&mapping))
        .with_default_entity_types(&defaults)
        .parse("//entities[@xsi:type='Group' and uid='x']")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedAttribute);
}

#[test]
fn test_no_oracle_never_classifies() {
    let inputs = vec![
        "ghost='x'",
        "p1='x' and l1='y'",
        "//entities[@xsi:type='Group' and (nothing=1 or nobody='z')]",
    ];

    for input in inputs {
        let filter = parse(input, None).unwrap();
        let predicate = filter.predicate.unwrap();
        assert!(!predicate.is_federated(), "Failed for input: {}", input);
        assert_eq!(predicate.location(), Some(Location::Unclassified));
        for property in predicate.property_nodes() {
            assert_eq!(property.location, Location::Unclassified, "Failed for input: {}", input);
        }
    }
}

#[test]
fn test_reparse_reproduces_locations() {
    let mapping = mixed_mapping();
    let inputs = vec![
        "p1='x' and l1='y'",
        "(p1='x' or l1='y') and p2='z'",
        "//entities[@xsi:type='Group' and (p1='a' and p2='b' or l1='c')]",
        "l1='x' or (l2='y' and p3='z')",
        "xsi:type='Group' and p1='x'",
        "@xsi:type='Group' or l1='x'",
    ];

    for input in inputs {
        let first = parse_with(input, &mapping);
        let second = parse_with(&first.to_string(), &mapping);
        assert_eq!(first, second, "Failed for input: {}", input);
    }
}
