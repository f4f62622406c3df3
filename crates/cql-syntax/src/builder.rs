use crate::{
    error::CqlError,
    parser::{CqlParser, Rule},
};
use chrono::{DateTime, NaiveDate, Utc};
use model::{
    ComparisonOp, Coord, FilterNode, Geometry, LikeSpec, Literal, LogicalOp, SpatialOp, Units,
};
use pest::{
    Parser,
    iterators::{Pair, Pairs},
};
use tracing::debug;

pub type CqlResult<T> = Result<T, CqlError>;

/// Parse CQL text into a filter tree
pub fn parse(input: &str) -> CqlResult<FilterNode> {
    let mut pairs = CqlParser::parse(Rule::filter, input)?;
    let filter = pairs
        .next()
        .ok_or_else(|| CqlError::syntax((1, 1), "Empty input"))?;
    let at = filter.line_col();

    let expr = filter
        .into_inner()
        .find(|pair| pair.as_rule() == Rule::or_expr)
        .ok_or_else(|| CqlError::syntax(at, "Expected a filter expression"))?;

    let node = build_or(expr)?;
    debug!(nodes = node.size(), spatial = node.has_spatial(), "Parsed CQL filter");
    Ok(node)
}

fn expect_next<'i>(
    inner: &mut Pairs<'i, Rule>,
    at: (usize, usize),
    what: &str,
) -> CqlResult<Pair<'i, Rule>> {
    inner
        .next()
        .ok_or_else(|| CqlError::syntax(at, format!("Expected {what}")))
}

fn build_or(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    build_junction(pair, LogicalOp::Or, build_and)
}

fn build_and(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    build_junction(pair, LogicalOp::And, build_unary)
}

/// One precedence level: a single operand is returned as is, a chain
/// becomes one n-ary logical node.
fn build_junction(
    pair: Pair<Rule>,
    op: LogicalOp,
    build: fn(Pair<Rule>) -> CqlResult<FilterNode>,
) -> CqlResult<FilterNode> {
    let at = pair.line_col();
    let mut operands = pair
        .into_inner()
        .filter(|p| !matches!(p.as_rule(), Rule::kw_and | Rule::kw_or))
        .map(build)
        .collect::<CqlResult<Vec<_>>>()?;

    match operands.len() {
        0 => Err(CqlError::syntax(at, format!("Expected an operand of {op}"))),
        1 => operands
            .pop()
            .ok_or_else(|| CqlError::syntax(at, "Expected an operand")),
        _ => Ok(FilterNode::logical(op, operands)),
    }
}

fn build_unary(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    let at = pair.line_col();
    let mut inner = pair.into_inner();
    let first = expect_next(&mut inner, at, "a predicate")?;

    match first.as_rule() {
        Rule::kw_not => {
            let operand = expect_next(&mut inner, at, "an operand after NOT")?;
            Ok(FilterNode::not(build_unary(operand)?))
        }
        Rule::or_expr => build_or(first),
        _ => build_predicate(first),
    }
}

fn build_predicate(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    match pair.as_rule() {
        Rule::comparison => build_comparison(pair),
        Rule::like_pred => build_like(pair),
        Rule::between_pred => build_between(pair),
        Rule::null_pred => build_null_check(pair),
        Rule::id_filter => build_id_filter(pair),
        Rule::bbox => build_bbox(pair),
        Rule::binary_spatial => build_binary_spatial(pair),
        Rule::distance_spatial => build_distance_spatial(pair),
        rule => Err(CqlError::syntax(
            pair.line_col(),
            format!("Unexpected rule in predicate: {rule:?}"),
        )),
    }
}

fn build_comparison(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    let at = pair.line_col();
    let mut inner = pair.into_inner();
    let property = expect_next(&mut inner, at, "a property")?.as_str();
    let op_pair = expect_next(&mut inner, at, "a comparison operator")?;
    let value = build_literal(expect_next(&mut inner, at, "a value")?)?;

    let op = match op_pair.as_str() {
        "=" => ComparisonOp::Eq,
        "<>" => ComparisonOp::Neq,
        "<" => ComparisonOp::Lt,
        "<=" => ComparisonOp::Lte,
        ">" => ComparisonOp::Gt,
        ">=" => ComparisonOp::Gte,
        other => {
            return Err(CqlError::syntax(
                op_pair.line_col(),
                format!("Unknown operator: {other}"),
            ));
        }
    };

    Ok(FilterNode::compare(property, op, value))
}

fn build_like(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    let at = pair.line_col();
    let mut property = "";
    let mut pattern = None;
    let mut negated = false;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::property => property = inner.as_str(),
            Rule::kw_not => negated = true,
            Rule::lit_string => pattern = Some(parse_string_literal(inner.as_str())),
            _ => {}
        }
    }

    let pattern = pattern.ok_or_else(|| CqlError::syntax(at, "Expected a LIKE pattern"))?;
    let node = FilterNode::like(property, &pattern, LikeSpec::default());
    Ok(negate_if(negated, node))
}

fn build_between(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    let at = pair.line_col();
    let mut property = "";
    let mut negated = false;
    let mut bounds = Vec::with_capacity(2);

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::property => property = inner.as_str(),
            Rule::kw_not => negated = true,
            Rule::kw_between | Rule::kw_and => {}
            _ => bounds.push(build_literal(inner)?),
        }
    }

    let mut bounds = bounds.into_iter();
    let (Some(lower), Some(upper), None) = (bounds.next(), bounds.next(), bounds.next()) else {
        return Err(CqlError::syntax(at, "BETWEEN takes exactly two bounds"));
    };
    Ok(negate_if(negated, FilterNode::between(property, lower, upper)))
}

fn build_null_check(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    let mut property = "";
    let mut negated = false;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::property => property = inner.as_str(),
            Rule::kw_not => negated = true,
            _ => {}
        }
    }

    Ok(negate_if(negated, FilterNode::is_null(property)))
}

fn build_id_filter(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    let ids: Vec<String> = pair
        .into_inner()
        .filter(|inner| inner.as_rule() == Rule::lit_string)
        .map(|inner| parse_string_literal(inner.as_str()))
        .collect();

    Ok(FilterNode::ids(ids))
}

fn build_bbox(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    let at = pair.line_col();
    let mut property = "";
    let mut numbers = Vec::with_capacity(4);

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::property => property = inner.as_str(),
            Rule::lit_number => numbers.push(parse_number(inner.as_str())?),
            _ => {}
        }
    }

    let [min_x, min_y, max_x, max_y] = numbers[..] else {
        return Err(CqlError::syntax(at, "BBOX takes four coordinates"));
    };
    Ok(FilterNode::spatial(
        SpatialOp::Bbox,
        property,
        Geometry::envelope(min_x, min_y, max_x, max_y),
    ))
}

fn build_binary_spatial(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    let at = pair.line_col();
    let mut inner = pair.into_inner();
    let op = build_spatial_op(expect_next(&mut inner, at, "a spatial operator")?)?;
    let property = expect_next(&mut inner, at, "a property")?.as_str();
    let geometry = build_geometry(expect_next(&mut inner, at, "a geometry")?)?;

    Ok(FilterNode::spatial(op, property, geometry))
}

fn build_distance_spatial(pair: Pair<Rule>) -> CqlResult<FilterNode> {
    let at = pair.line_col();
    let mut inner = pair.into_inner();
    let op = build_spatial_op(expect_next(&mut inner, at, "a distance operator")?)?;
    let property = expect_next(&mut inner, at, "a property")?.as_str();
    let geometry = build_geometry(expect_next(&mut inner, at, "a geometry")?)?;
    let distance = parse_number(expect_next(&mut inner, at, "a distance")?.as_str())?;

    let units_text = expect_next(&mut inner, at, "distance units")?.as_str();
    let units: Units = units_text
        .parse()
        .map_err(|_| CqlError::UnknownUnits(units_text.to_string()))?;

    Ok(FilterNode::distance(op, property, geometry, distance, units))
}

fn build_spatial_op(pair: Pair<Rule>) -> CqlResult<SpatialOp> {
    pair.as_str()
        .parse()
        .map_err(|err| CqlError::syntax(pair.line_col(), format!("{err}")))
}

fn build_geometry(pair: Pair<Rule>) -> CqlResult<Geometry> {
    let at = pair.line_col();
    match pair.as_rule() {
        Rule::point => {
            let coord = pair
                .into_inner()
                .find(|inner| inner.as_rule() == Rule::coord)
                .ok_or_else(|| CqlError::syntax(at, "POINT takes one coordinate"))?;
            Ok(Geometry::Point(build_coord(coord)?))
        }
        Rule::linestring => Ok(Geometry::line_string(build_coords(pair)?)),
        Rule::polygon => {
            let mut rings = pair
                .into_inner()
                .filter(|inner| inner.as_rule() == Rule::ring)
                .map(build_coords)
                .collect::<CqlResult<Vec<_>>>()?
                .into_iter();
            let exterior = rings
                .next()
                .ok_or_else(|| CqlError::syntax(at, "POLYGON takes at least one ring"))?;
            Ok(Geometry::Polygon {
                exterior,
                interiors: rings.collect(),
            })
        }
        // ENVELOPE(west, east, north, south)
        Rule::envelope => {
            let numbers = pair
                .into_inner()
                .filter(|inner| inner.as_rule() == Rule::lit_number)
                .map(|inner| parse_number(inner.as_str()))
                .collect::<CqlResult<Vec<_>>>()?;
            let [west, east, north, south] = numbers[..] else {
                return Err(CqlError::syntax(at, "ENVELOPE takes four values"));
            };
            Ok(Geometry::envelope(west, south, east, north))
        }
        rule => Err(CqlError::syntax(at, format!("Unexpected geometry: {rule:?}"))),
    }
}

fn build_coords(pair: Pair<Rule>) -> CqlResult<Vec<Coord>> {
    pair.into_inner()
        .filter(|inner| inner.as_rule() == Rule::coord)
        .map(build_coord)
        .collect()
}

fn build_coord(pair: Pair<Rule>) -> CqlResult<Coord> {
    let at = pair.line_col();
    let mut inner = pair.into_inner();
    let x = parse_number(expect_next(&mut inner, at, "an x coordinate")?.as_str())?;
    let y = parse_number(expect_next(&mut inner, at, "a y coordinate")?.as_str())?;
    Ok(Coord::new(x, y))
}

fn build_literal(pair: Pair<Rule>) -> CqlResult<Literal> {
    let text = pair.as_str();
    match pair.as_rule() {
        Rule::lit_string => Ok(Literal::String(parse_string_literal(text))),
        Rule::lit_number => {
            if text.contains(['.', 'e', 'E']) {
                Ok(Literal::Float(parse_number(text)?))
            } else {
                text.parse::<i64>()
                    .map(Literal::Integer)
                    .map_err(|err| CqlError::literal(text, err))
            }
        }
        Rule::lit_boolean => Ok(Literal::Boolean(text.eq_ignore_ascii_case("true"))),
        Rule::lit_date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Literal::Date)
            .map_err(|err| CqlError::literal(text, err)),
        Rule::lit_timestamp => DateTime::parse_from_rfc3339(text)
            .map(|ts| Literal::Timestamp(ts.with_timezone(&Utc)))
            .map_err(|err| CqlError::literal(text, err)),
        rule => Err(CqlError::syntax(
            pair.line_col(),
            format!("Unexpected literal: {rule:?}"),
        )),
    }
}

fn parse_number(text: &str) -> CqlResult<f64> {
    text.parse::<f64>()
        .map_err(|err| CqlError::literal(text, err))
}

fn parse_string_literal(s: &str) -> String {
    // Strip the outer quotes; '' is an escaped quote
    let inner = s
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(s);
    inner.replace("''", "'")
}

fn negate_if(negated: bool, node: FilterNode) -> FilterNode {
    if negated { FilterNode::not(node) } else { node }
}
