//! Spatial predicates and serial chains.
//!
//! Spatial tests never become text: they are handed to the spatial index
//! stage as structured predicates, joined into `SerialChain`s when a
//! boolean node combines several of them.

use crate::{
    error::{CompileError, Result},
    query::compiled::{Distance, SerialChain, SpatialPredicate, SpatialTest},
};
use model::{Coord, Geometry, LogicalOp, SpatialFilter, SpatialOp, Units};
use tracing::trace;

pub fn compile_filter(filter: &SpatialFilter) -> Result<SpatialPredicate> {
    compile_spatial(
        filter.op,
        &filter.property,
        &filter.geometry,
        filter.distance,
        filter.units,
    )
}

/// Validates a spatial operand and wraps it as a predicate.
pub fn compile_spatial(
    op: SpatialOp,
    property: &str,
    geometry: &Geometry,
    distance: Option<f64>,
    units: Option<Units>,
) -> Result<SpatialPredicate> {
    validate_geometry(geometry)?;

    if op == SpatialOp::Bbox && !matches!(geometry, Geometry::Envelope { .. }) {
        return Err(CompileError::MalformedGeometry(format!(
            "BBOX expects an envelope, got {}",
            geometry.kind()
        )));
    }

    let distance = if op.is_distance() {
        let value = distance.ok_or_else(|| {
            CompileError::MalformedGeometry(format!("{op} requires a distance"))
        })?;
        let units = units
            .ok_or_else(|| CompileError::MalformedGeometry(format!("{op} requires units")))?;
        if !value.is_finite() || value < 0.0 {
            return Err(CompileError::MalformedGeometry(format!(
                "{op} distance must be a finite, non-negative number, got {value}"
            )));
        }
        Some(Distance { value, units })
    } else {
        if distance.is_some() || units.is_some() {
            return Err(CompileError::MalformedGeometry(format!(
                "{op} does not take a distance"
            )));
        }
        None
    };

    trace!(
        %op,
        property,
        geometry = geometry.kind(),
        meters = distance.map(|d| d.meters()),
        "compiled spatial test"
    );

    Ok(SpatialPredicate::Test(SpatialTest {
        op,
        property: property.to_string(),
        geometry: geometry.clone(),
        distance,
    }))
}

/// Joins predicates of one boolean level. A single predicate is returned
/// unchanged; nested chains stay nested.
pub fn merge(op: LogicalOp, mut predicates: Vec<SpatialPredicate>) -> SpatialPredicate {
    if predicates.len() == 1 {
        if let Some(only) = predicates.pop() {
            return only;
        }
    }
    SpatialPredicate::Chain(SerialChain::joined(op, predicates))
}

/// Wraps a predicate in a NOT chain. Negating a NOT chain unwraps it.
pub fn negate(predicate: SpatialPredicate) -> SpatialPredicate {
    match predicate {
        SpatialPredicate::Chain(mut chain) if chain.negated && chain.predicates.len() == 1 => {
            chain.predicates.remove(0)
        }
        other => SpatialPredicate::Chain(SerialChain::negation(other)),
    }
}

fn validate_geometry(geometry: &Geometry) -> Result<()> {
    if let Some(bad) = geometry.coords().iter().find(|c| !c.is_finite()) {
        return Err(CompileError::MalformedGeometry(format!(
            "{} has a non-finite coordinate ({}, {})",
            geometry.kind(),
            bad.x,
            bad.y
        )));
    }

    match geometry {
        Geometry::Point(_) => Ok(()),
        Geometry::LineString { coords } => {
            if coords.len() < 2 {
                return Err(CompileError::MalformedGeometry(format!(
                    "LineString needs at least 2 points, got {}",
                    coords.len()
                )));
            }
            Ok(())
        }
        Geometry::Polygon {
            exterior,
            interiors,
        } => {
            validate_ring(exterior, "exterior")?;
            for ring in interiors {
                validate_ring(ring, "interior")?;
            }
            Ok(())
        }
        Geometry::Envelope {
            min_x,
            min_y,
            max_x,
            max_y,
        } => {
            if min_x > max_x || min_y > max_y {
                return Err(CompileError::MalformedGeometry(format!(
                    "Envelope lower corner ({min_x}, {min_y}) exceeds upper corner ({max_x}, {max_y})"
                )));
            }
            Ok(())
        }
    }
}

fn validate_ring(ring: &[Coord], which: &str) -> Result<()> {
    if ring.len() < 4 {
        return Err(CompileError::MalformedGeometry(format!(
            "Polygon {which} ring needs at least 4 points, got {}",
            ring.len()
        )));
    }
    if ring.first() != ring.last() {
        return Err(CompileError::MalformedGeometry(format!(
            "Polygon {which} ring is not closed"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Coord> {
        vec![
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 0.0),
            Coord::new(10.0, 10.0),
            Coord::new(0.0, 10.0),
            Coord::new(0.0, 0.0),
        ]
    }

    fn intersects() -> SpatialPredicate {
        compile_spatial(
            SpatialOp::Intersects,
            "Geometry",
            &Geometry::envelope(0.0, 0.0, 5.0, 5.0),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_compile_plain_test() {
        let predicate = compile_spatial(
            SpatialOp::Within,
            "Geometry",
            &Geometry::polygon(square()),
            None,
            None,
        )
        .unwrap();
        let test = predicate.as_test().unwrap();
        assert_eq!(test.op, SpatialOp::Within);
        assert_eq!(test.property, "Geometry");
        assert!(test.distance.is_none());
    }

    #[test]
    fn test_compile_dwithin_carries_distance() {
        let predicate = compile_spatial(
            SpatialOp::DWithin,
            "Geometry",
            &Geometry::point(1.0, 2.0),
            Some(1.5),
            Some(Units::Kilometers),
        )
        .unwrap();
        let distance = predicate.as_test().unwrap().distance.unwrap();
        assert_eq!(distance.units, Units::Kilometers);
        assert_eq!(distance.meters(), 1_500.0);
    }

    #[test]
    fn test_distance_operator_needs_units() {
        let err = compile_spatial(
            SpatialOp::Beyond,
            "Geometry",
            &Geometry::point(1.0, 2.0),
            Some(10.0),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::MalformedGeometry(_)));
    }

    #[test]
    fn test_negative_distance_rejected() {
        let err = compile_spatial(
            SpatialOp::DWithin,
            "Geometry",
            &Geometry::point(1.0, 2.0),
            Some(-1.0),
            Some(Units::Meters),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::MalformedGeometry(_)));
    }

    #[test]
    fn test_distance_on_plain_operator_rejected() {
        let err = compile_spatial(
            SpatialOp::Intersects,
            "Geometry",
            &Geometry::point(1.0, 2.0),
            Some(10.0),
            Some(Units::Meters),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::MalformedGeometry(_)));
    }

    #[test]
    fn test_bbox_requires_envelope() {
        let err = compile_spatial(
            SpatialOp::Bbox,
            "Geometry",
            &Geometry::point(1.0, 2.0),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::MalformedGeometry(_)));
    }

    #[test]
    fn test_invalid_geometries_rejected() {
        let open_ring = Geometry::polygon(square()[..4].to_vec());
        let short_line = Geometry::line_string(vec![Coord::new(0.0, 0.0)]);
        let inverted = Geometry::envelope(10.0, 0.0, 0.0, 10.0);
        let nan = Geometry::point(f64::NAN, 0.0);

        for geometry in [open_ring, short_line, inverted, nan] {
            let result = compile_spatial(SpatialOp::Intersects, "Geometry", &geometry, None, None);
            assert!(
                matches!(result, Err(CompileError::MalformedGeometry(_))),
                "accepted {geometry:?}"
            );
        }
    }

    #[test]
    fn test_merge_single_predicate_is_unchanged() {
        let merged = merge(LogicalOp::And, vec![intersects()]);
        assert_eq!(merged, intersects());
    }

    #[test]
    fn test_merge_keeps_nested_chains() {
        let inner = merge(LogicalOp::Or, vec![intersects(), intersects()]);
        let outer = merge(LogicalOp::And, vec![inner.clone(), intersects()]);
        let chain = outer.as_chain().unwrap();
        assert_eq!(chain.predicates[0], inner);
        assert_eq!(chain.connectors, vec![LogicalOp::And]);
    }

    #[test]
    fn test_double_negation_unwraps() {
        let once = negate(intersects());
        assert!(once.as_chain().unwrap().negated);
        assert_eq!(negate(once), intersects());
    }
}
