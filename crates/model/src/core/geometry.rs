use crate::core::error::ModelError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Coord { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Geometry operand of a spatial predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point(Coord),
    LineString {
        coords: Vec<Coord>,
    },
    Polygon {
        exterior: Vec<Coord>,
        #[serde(default)]
        interiors: Vec<Vec<Coord>>,
    },
    Envelope {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point(Coord::new(x, y))
    }

    pub fn envelope(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Geometry::Envelope {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn line_string(coords: Vec<Coord>) -> Self {
        Geometry::LineString { coords }
    }

    pub fn polygon(exterior: Vec<Coord>) -> Self {
        Geometry::Polygon {
            exterior,
            interiors: Vec::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString { .. } => "LineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::Envelope { .. } => "Envelope",
        }
    }

    /// All vertices, exterior ring first for polygons. Envelopes yield
    /// their lower and upper corners.
    pub fn coords(&self) -> Vec<Coord> {
        match self {
            Geometry::Point(c) => vec![*c],
            Geometry::LineString { coords } => coords.clone(),
            Geometry::Polygon {
                exterior,
                interiors,
            } => exterior
                .iter()
                .chain(interiors.iter().flatten())
                .copied()
                .collect(),
            Geometry::Envelope {
                min_x,
                min_y,
                max_x,
                max_y,
            } => vec![Coord::new(*min_x, *min_y), Coord::new(*max_x, *max_y)],
        }
    }
}

/// Distance units accepted by DWITHIN and BEYOND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    Meters,
    Kilometers,
    Feet,
    StatuteMiles,
    NauticalMiles,
}

impl Units {
    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            Units::Meters => value,
            Units::Kilometers => value * 1_000.0,
            Units::Feet => value * 0.3048,
            Units::StatuteMiles => value * 1_609.344,
            Units::NauticalMiles => value * 1_852.0,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Units::Meters => "meters",
            Units::Kilometers => "kilometers",
            Units::Feet => "feet",
            Units::StatuteMiles => "statute miles",
            Units::NauticalMiles => "nautical miles",
        };
        f.write_str(name)
    }
}

impl FromStr for Units {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(Units::Meters),
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
                Ok(Units::Kilometers)
            }
            "ft" | "foot" | "feet" => Ok(Units::Feet),
            "mi" | "mile" | "miles" | "statute miles" => Ok(Units::StatuteMiles),
            "nm" | "nautical miles" => Ok(Units::NauticalMiles),
            _ => Err(ModelError::UnknownUnits(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_from_str() {
        assert_eq!("meters".parse::<Units>().unwrap(), Units::Meters);
        assert_eq!("KM".parse::<Units>().unwrap(), Units::Kilometers);
        assert_eq!("statute_miles".parse::<Units>().unwrap(), Units::StatuteMiles);
        assert_eq!("nautical-miles".parse::<Units>().unwrap(), Units::NauticalMiles);
        assert!(matches!(
            "parsecs".parse::<Units>(),
            Err(ModelError::UnknownUnits(u)) if u == "parsecs"
        ));
    }

    #[test]
    fn test_polygon_coords_include_holes() {
        let ring = vec![
            Coord::new(0.0, 0.0),
            Coord::new(4.0, 0.0),
            Coord::new(4.0, 4.0),
            Coord::new(0.0, 0.0),
        ];
        let hole = vec![
            Coord::new(1.0, 1.0),
            Coord::new(2.0, 1.0),
            Coord::new(2.0, 2.0),
            Coord::new(1.0, 1.0),
        ];
        let polygon = Geometry::Polygon {
            exterior: ring,
            interiors: vec![hole],
        };
        assert_eq!(polygon.coords().len(), 8);
        assert_eq!(polygon.kind(), "Polygon");
    }
}
