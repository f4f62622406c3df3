use crate::core::error::ModelError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOp {
    Eq,
    Neq,
    Like,
    IsNull,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOp::Eq => write!(f, "EQ"),
            ComparisonOp::Neq => write!(f, "NEQ"),
            ComparisonOp::Like => write!(f, "LIKE"),
            ComparisonOp::IsNull => write!(f, "IS_NULL"),
            ComparisonOp::Gt => write!(f, "GT"),
            ComparisonOp::Gte => write!(f, "GTE"),
            ComparisonOp::Lt => write!(f, "LT"),
            ComparisonOp::Lte => write!(f, "LTE"),
            ComparisonOp::Between => write!(f, "BETWEEN"),
        }
    }
}

/// Boolean connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "AND"),
            LogicalOp::Or => write!(f, "OR"),
            LogicalOp::Not => write!(f, "NOT"),
        }
    }
}

impl FromStr for LogicalOp {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(LogicalOp::And),
            "OR" => Ok(LogicalOp::Or),
            "NOT" => Ok(LogicalOp::Not),
            _ => Err(ModelError::UnknownOperator(s.to_string())),
        }
    }
}

/// OGC spatial operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpatialOp {
    Bbox,
    Intersects,
    Contains,
    Crosses,
    Disjoint,
    Equals,
    Overlaps,
    Touches,
    Within,
    #[serde(rename = "DWITHIN")]
    DWithin,
    Beyond,
}

impl SpatialOp {
    /// Operators that take a distance and units argument.
    pub fn is_distance(&self) -> bool {
        matches!(self, SpatialOp::DWithin | SpatialOp::Beyond)
    }
}

impl fmt::Display for SpatialOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpatialOp::Bbox => "BBOX",
            SpatialOp::Intersects => "INTERSECTS",
            SpatialOp::Contains => "CONTAINS",
            SpatialOp::Crosses => "CROSSES",
            SpatialOp::Disjoint => "DISJOINT",
            SpatialOp::Equals => "EQUALS",
            SpatialOp::Overlaps => "OVERLAPS",
            SpatialOp::Touches => "TOUCHES",
            SpatialOp::Within => "WITHIN",
            SpatialOp::DWithin => "DWITHIN",
            SpatialOp::Beyond => "BEYOND",
        };
        f.write_str(name)
    }
}

impl FromStr for SpatialOp {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BBOX" => Ok(SpatialOp::Bbox),
            "INTERSECTS" => Ok(SpatialOp::Intersects),
            "CONTAINS" => Ok(SpatialOp::Contains),
            "CROSSES" => Ok(SpatialOp::Crosses),
            "DISJOINT" => Ok(SpatialOp::Disjoint),
            "EQUALS" => Ok(SpatialOp::Equals),
            "OVERLAPS" => Ok(SpatialOp::Overlaps),
            "TOUCHES" => Ok(SpatialOp::Touches),
            "WITHIN" => Ok(SpatialOp::Within),
            "DWITHIN" => Ok(SpatialOp::DWithin),
            "BEYOND" => Ok(SpatialOp::Beyond),
            _ => Err(ModelError::UnknownOperator(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_op_round_trip_names() {
        for op in [
            SpatialOp::Bbox,
            SpatialOp::Intersects,
            SpatialOp::DWithin,
            SpatialOp::Beyond,
        ] {
            assert_eq!(op.to_string().parse::<SpatialOp>().unwrap(), op);
        }
        assert_eq!("intersects".parse::<SpatialOp>().unwrap(), SpatialOp::Intersects);
        assert!("NEAR".parse::<SpatialOp>().is_err());
    }

    #[test]
    fn test_operator_serde_names() {
        let json = serde_json::to_string(&SpatialOp::DWithin).unwrap();
        assert_eq!(json, "\"DWITHIN\"");
        let json = serde_json::to_string(&ComparisonOp::IsNull).unwrap();
        assert_eq!(json, "\"IS_NULL\"");
    }
}
