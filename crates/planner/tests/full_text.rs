//! Full-text compilation of whole filter trees.

use model::{FilterNode, Geometry, LogicalOp, SpatialOp};
use planner::{
    compile_text,
    config::{CompilerConfig, MATCH_ALL_DOCUMENTS},
    error::CompileError,
    query::compiled::{CompiledQuery, SpatialPredicate},
};

fn compile(node: &FilterNode) -> CompiledQuery {
    compile_text(node, &CompilerConfig::default()).expect("filter should compile")
}

fn area() -> Geometry {
    Geometry::envelope(-10.0, -10.0, 10.0, 10.0)
}

#[test]
fn test_equality_leaf() {
    let query = compile(&FilterNode::eq("Title", "VM"));
    assert_eq!(query, CompiledQuery::text("Title:\"VM\""));
}

#[test]
fn test_conjunction_of_text_is_fused() {
    let node = FilterNode::and(vec![
        FilterNode::eq("Title", "VM"),
        FilterNode::eq("Abstract", "cloud"),
    ]);
    let query = compile(&node);

    assert_eq!(query.main_text, "(Title:\"VM\" AND Abstract:\"cloud\")");
    assert_eq!(query.logical_operator, None);
    assert!(query.is_flattened());
}

#[test]
fn test_parenthesization_follows_tree_depth() {
    let node = FilterNode::or(vec![
        FilterNode::and(vec![FilterNode::eq("A", "1"), FilterNode::eq("B", "2")]),
        FilterNode::and(vec![
            FilterNode::eq("C", "3"),
            FilterNode::or(vec![FilterNode::eq("D", "4"), FilterNode::eq("E", "5")]),
        ]),
    ]);
    let query = compile(&node);

    assert_eq!(
        query.main_text,
        "((A:\"1\" AND B:\"2\") OR (C:\"3\" AND (D:\"4\" OR E:\"5\")))"
    );
}

#[test]
fn test_compilation_is_deterministic() {
    let node = FilterNode::and(vec![
        FilterNode::eq("Title", "VM"),
        FilterNode::or(vec![
            FilterNode::eq("Abstract", "x"),
            FilterNode::spatial(SpatialOp::Intersects, "Geometry", area()),
        ]),
        FilterNode::not(FilterNode::eq("Format", "pdf")),
    ]);

    assert_eq!(compile(&node), compile(&node));
}

#[test]
fn test_between_dates() {
    let query = compile(&FilterNode::between("CreationDate", "2007-06-02", "2007-06-04"));
    assert_eq!(
        query.main_text,
        "CreationDate:[20070602  30000101]CreationDate:[00000101 20070604]"
    );
}

#[test]
fn test_not_defers_negation_to_caller() {
    let query = compile(&FilterNode::not(FilterNode::eq("Title", "starship trooper")));

    assert_eq!(query.main_text, "Title:\"starship trooper\"");
    assert_eq!(query.logical_operator, Some(LogicalOp::Not));
    assert!(query.spatial_predicate.is_none());
}

#[test]
fn test_double_negation_cancels() {
    let query = compile(&FilterNode::not(FilterNode::not(FilterNode::eq("Title", "VM"))));
    assert_eq!(query, CompiledQuery::text("Title:\"VM\""));
}

#[test]
fn test_not_equal_leaf_is_inline() {
    let query = compile(&FilterNode::neq("Title", "VM"));

    assert_eq!(
        query.main_text,
        format!("{MATCH_ALL_DOCUMENTS} NOT Title:\"VM\"")
    );
    assert_eq!(query.logical_operator, None);
}

#[test]
fn test_identifier_filter() {
    let query = compile(&FilterNode::ids(["urn:b", "urn:a"]));
    assert_eq!(
        query.main_text,
        "(Identifier:\"urn:a\" OR Identifier:\"urn:b\")"
    );
}

#[test]
fn test_text_or_spatial_pair() {
    let node = FilterNode::or(vec![
        FilterNode::eq("Title", "VM"),
        FilterNode::spatial(SpatialOp::Intersects, "Geometry", area()),
    ]);
    let query = compile(&node);

    assert_eq!(query.main_text, "(Title:\"VM\")");
    assert_eq!(query.logical_operator, Some(LogicalOp::Or));
    assert!(query.sub_queries.is_empty());

    let test = query
        .spatial_predicate
        .as_ref()
        .and_then(SpatialPredicate::as_test)
        .expect("bare spatial test");
    assert_eq!(test.op, SpatialOp::Intersects);
    assert_eq!(test.property, "Geometry");
}

#[test]
fn test_text_with_several_spatial_operands() {
    let node = FilterNode::and(vec![
        FilterNode::spatial(SpatialOp::Intersects, "Geometry", area()),
        FilterNode::eq("Title", "VM"),
        FilterNode::spatial(SpatialOp::Within, "Geometry", area()),
    ]);
    let query = compile(&node);

    assert_eq!(query.main_text, "(Title:\"VM\")");
    assert_eq!(query.logical_operator, Some(LogicalOp::And));

    let chain = query
        .spatial_predicate
        .as_ref()
        .and_then(SpatialPredicate::as_chain)
        .expect("spatial chain");
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.connectors, vec![LogicalOp::And]);
}

#[test]
fn test_pair_under_conjunction_becomes_sub_query() {
    let node = FilterNode::and(vec![
        FilterNode::eq("Title", "VM"),
        FilterNode::or(vec![
            FilterNode::eq("Abstract", "x"),
            FilterNode::spatial(SpatialOp::Intersects, "Geometry", area()),
        ]),
    ]);
    let query = compile(&node);

    assert_eq!(query.main_text, "Title:\"VM\"");
    assert!(query.spatial_predicate.is_none());
    assert_eq!(query.logical_operator, Some(LogicalOp::And));
    assert_eq!(query.sub_queries.len(), 1);

    let sub = &query.sub_queries[0];
    assert_eq!(sub.main_text, "(Abstract:\"x\")");
    assert!(sub.spatial_predicate.is_some());
    assert_eq!(sub.logical_operator, Some(LogicalOp::Or));
    assert_eq!(query.depth(), 2);
}

#[test]
fn test_negated_operand_is_split_off() {
    let node = FilterNode::and(vec![
        FilterNode::eq("Title", "VM"),
        FilterNode::not(FilterNode::eq("Format", "pdf")),
    ]);
    let query = compile(&node);

    assert_eq!(query.main_text, "Title:\"VM\"");
    assert_eq!(query.logical_operator, Some(LogicalOp::And));
    assert_eq!(query.sub_queries.len(), 1);
    assert_eq!(query.sub_queries[0].main_text, "Format:\"pdf\"");
    assert_eq!(query.sub_queries[0].logical_operator, Some(LogicalOp::Not));
}

#[test]
fn test_grouping_node_when_nothing_qualifies() {
    let node = FilterNode::or(vec![
        FilterNode::not(FilterNode::eq("Title", "VM")),
        FilterNode::not(FilterNode::eq("Format", "pdf")),
    ]);
    let query = compile(&node);

    assert!(query.is_grouping(MATCH_ALL_DOCUMENTS));
    assert_eq!(query.logical_operator, Some(LogicalOp::Or));
    assert_eq!(query.sub_queries.len(), 2);
    assert!(query
        .sub_queries
        .iter()
        .all(|sub| sub.logical_operator == Some(LogicalOp::Not)));
}

#[test]
fn test_not_over_pair_groups_it() {
    let node = FilterNode::not(FilterNode::or(vec![
        FilterNode::eq("Title", "VM"),
        FilterNode::spatial(SpatialOp::Intersects, "Geometry", area()),
    ]));
    let query = compile(&node);

    assert!(query.is_grouping(MATCH_ALL_DOCUMENTS));
    assert_eq!(query.logical_operator, Some(LogicalOp::Not));
    assert_eq!(query.sub_queries.len(), 1);
    assert_eq!(query.sub_queries[0].main_text, "(Title:\"VM\")");
    assert_eq!(query.sub_queries[0].logical_operator, Some(LogicalOp::Or));
}

#[test]
fn test_not_over_split_node_negates_each_sub_query() {
    let node = FilterNode::not(FilterNode::and(vec![
        FilterNode::not(FilterNode::eq("Title", "VM")),
        FilterNode::spatial(SpatialOp::Intersects, "Geometry", area()),
        FilterNode::spatial(SpatialOp::Within, "Geometry", area()),
    ]));
    let query = compile(&node);

    assert_eq!(query.main_text, MATCH_ALL_DOCUMENTS);
    assert_eq!(query.logical_operator, Some(LogicalOp::And));
    let primary = query
        .spatial_predicate
        .as_ref()
        .and_then(SpatialPredicate::as_test)
        .expect("primary spatial test");
    assert_eq!(primary.op, SpatialOp::Intersects);

    let operators: Vec<_> = query.sub_queries.iter().map(|s| s.logical_operator).collect();
    assert_eq!(operators, vec![Some(LogicalOp::And), Some(LogicalOp::Not)]);

    // the earlier NOT on Title cancels
    assert_eq!(query.sub_queries[0].main_text, "Title:\"VM\"");

    let within = &query.sub_queries[1];
    assert_eq!(within.main_text, MATCH_ALL_DOCUMENTS);
    let test = within
        .spatial_predicate
        .as_ref()
        .and_then(SpatialPredicate::as_test)
        .expect("bare spatial test");
    assert_eq!(test.op, SpatialOp::Within);
}

#[test]
fn test_not_over_split_node_groups_pair_sub_query() {
    let node = FilterNode::not(FilterNode::and(vec![
        FilterNode::eq("Title", "VM"),
        FilterNode::or(vec![
            FilterNode::eq("Abstract", "x"),
            FilterNode::spatial(SpatialOp::Intersects, "Geometry", area()),
        ]),
    ]));
    let query = compile(&node);

    assert_eq!(query.main_text, "Title:\"VM\"");
    assert_eq!(query.logical_operator, Some(LogicalOp::And));
    assert_eq!(query.sub_queries.len(), 1);

    let negated = &query.sub_queries[0];
    assert!(negated.is_grouping(MATCH_ALL_DOCUMENTS));
    assert_eq!(negated.logical_operator, Some(LogicalOp::Not));
    assert_eq!(negated.sub_queries[0].main_text, "(Abstract:\"x\")");
    assert_eq!(negated.sub_queries[0].logical_operator, Some(LogicalOp::Or));
    assert!(negated.sub_queries[0].spatial_predicate.is_some());
}

#[test]
fn test_custom_match_all_token() {
    let config = CompilerConfig {
        match_all: "*:*".to_string(),
        ..CompilerConfig::default()
    };
    let node = FilterNode::spatial(SpatialOp::Intersects, "Geometry", area());
    let query = compile_text(&node, &config).unwrap();

    assert_eq!(query.main_text, "*:*");
}

#[test]
fn test_structural_errors() {
    let lonely_and = FilterNode::and(vec![FilterNode::eq("Title", "VM")]);
    assert!(matches!(
        compile_text(&lonely_and, &CompilerConfig::default()),
        Err(CompileError::InvalidFilter(_))
    ));

    let wide_not = FilterNode::logical(
        LogicalOp::Not,
        vec![FilterNode::eq("A", "1"), FilterNode::eq("B", "2")],
    );
    assert!(matches!(
        compile_text(&wide_not, &CompilerConfig::default()),
        Err(CompileError::InvalidFilter(_))
    ));
}

#[test]
fn test_leaf_error_aborts_whole_tree() {
    let node = FilterNode::and(vec![
        FilterNode::eq("Title", "VM"),
        FilterNode::or(vec![
            FilterNode::eq("Abstract", "x"),
            FilterNode::spatial(
                SpatialOp::Bbox,
                "Geometry",
                Geometry::envelope(10.0, 0.0, -10.0, 5.0),
            ),
        ]),
    ]);

    assert!(matches!(
        compile_text(&node, &CompilerConfig::default()),
        Err(CompileError::MalformedGeometry(_))
    ));
}

#[test]
fn test_compiled_query_json_shape() {
    let node = FilterNode::not(FilterNode::eq("Title", "VM"));
    let json = serde_json::to_value(compile(&node)).unwrap();

    assert_eq!(json["main_text"], "Title:\"VM\"");
    assert_eq!(json["logical_operator"], "NOT");
    assert!(json.get("sub_queries").is_none());
    assert!(json.get("spatial_predicate").is_none());
}
