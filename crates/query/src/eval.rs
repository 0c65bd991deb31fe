use scene::{BuildingBox, Field, HighlightSet};

/// Queryable attributes: the fixed lookup from user-facing names to box
/// fields. `zoning -> zone`, `height -> height`, `area -> area`,
/// `value -> value`; anything else is unknown.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Attribute {
    Zoning,
    Height,
    Area,
    Value,
}

impl Attribute {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "zoning" => Some(Self::Zoning),
            "height" => Some(Self::Height),
            "area" => Some(Self::Area),
            "value" => Some(Self::Value),
            _ => None,
        }
    }

    /// One accessor per logical attribute. A `None` operand means the box
    /// can never match; it is not an error.
    pub fn resolve(&self, building: &BuildingBox) -> Option<Field> {
        match self {
            Self::Zoning => Some(building.info.zone.clone()),
            Self::Height => Some(Field::Number(building.dims.height)),
            Self::Area => Some(Field::Number(building.info.area)),
            // The source data carries no assessed-value column.
            Self::Value => None,
        }
    }
}

/// Comparison operators. Anything outside the four-operator grammar is
/// `Unsupported`: a valid filter that matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Gt,
    Lt,
    Eq,
    Contains,
    Unsupported(String),
}

impl Op {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            ">" => Self::Gt,
            "<" => Self::Lt,
            "==" => Self::Eq,
            "IN" => Self::Contains,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

/// A screened filter, safe to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidFilter {
    pub attribute: Attribute,
    pub op: Op,
    pub value: Field,
}

/// Applies the filter over the render list, producing the new highlight
/// set. The caller replaces any prior set wholesale.
pub fn evaluate(filter: &ValidFilter, buildings: &[BuildingBox]) -> HighlightSet {
    let mut out = HighlightSet::new();

    for building in buildings {
        let Some(operand) = filter.attribute.resolve(building) else {
            continue;
        };
        if matches(&filter.op, &operand, &filter.value) {
            out.insert(building.id);
        }
    }

    out
}

fn matches(op: &Op, operand: &Field, value: &Field) -> bool {
    match op {
        Op::Gt => both_numbers(operand, value).map(|(a, b)| a > b) == Some(true),
        Op::Lt => both_numbers(operand, value).map(|(a, b)| a < b) == Some(true),
        Op::Eq => operand.eq_ci(value),
        Op::Contains => operand.contains_ci(value),
        Op::Unsupported(_) => false,
    }
}

fn both_numbers(a: &Field, b: &Field) -> Option<(f64, f64)> {
    Some((a.as_number()?, b.as_number()?))
}

#[cfg(test)]
mod tests {
    use super::{Attribute, Op, ValidFilter, evaluate};
    use foundation::BuildingId;
    use foundation::math::Vec3;
    use scene::{BoxDims, BuildingBox, BuildingInfo, Field};

    fn building(id: u32, height: f64, zone: Field) -> BuildingBox {
        let dims = BoxDims {
            width: height / BoxDims::HEIGHT_RATIO,
            height,
            depth: height * BoxDims::DEPTH_RATIO / BoxDims::HEIGHT_RATIO,
        };
        let area = dims.width * dims.width;
        BuildingBox::new(
            BuildingId::new(id),
            Vec3::new(0.0, height / 2.0, 0.0),
            dims,
            BuildingInfo::new(None, area, 0.0, 0.0, Some(zone)),
        )
    }

    fn filter(attribute: Attribute, op: Op, value: Field) -> ValidFilter {
        ValidFilter {
            attribute,
            op,
            value,
        }
    }

    #[test]
    fn greater_than_compares_numerically() {
        let boxes = vec![
            building(0, 10.0, Field::text("Residential")),
            building(100, 20.0, Field::text("Commercial")),
        ];

        let hits = evaluate(
            &filter(Attribute::Height, Op::Gt, Field::Number(15.0)),
            &boxes,
        );
        let got: Vec<u32> = hits.iter_indices().collect();
        assert_eq!(got, vec![100]);

        let hits = evaluate(
            &filter(Attribute::Height, Op::Lt, Field::Number(15.0)),
            &boxes,
        );
        let got: Vec<u32> = hits.iter_indices().collect();
        assert_eq!(got, vec![0]);
    }

    #[test]
    fn containment_matches_substrings_case_insensitively() {
        let boxes = vec![
            building(0, 10.0, Field::text("Residential")),
            building(100, 20.0, Field::text("Commercial")),
        ];

        let hits = evaluate(
            &filter(Attribute::Zoning, Op::Contains, Field::text("res")),
            &boxes,
        );
        let got: Vec<u32> = hits.iter_indices().collect();
        assert_eq!(got, vec![0]);
    }

    #[test]
    fn coerced_zoning_matches_numeric_and_text_codes() {
        let boxes = vec![
            building(0, 10.0, Field::Number(12.0)),
            building(100, 20.0, Field::text("12")),
            building(200, 30.0, Field::text("13")),
        ];

        // "12" coerced to 12 by validation; both representations match.
        let hits = evaluate(
            &filter(Attribute::Zoning, Op::Eq, Field::Number(12.0)),
            &boxes,
        );
        let got: Vec<u32> = hits.iter_indices().collect();
        assert_eq!(got, vec![0, 100]);
    }

    #[test]
    fn equality_trims_and_ignores_case() {
        let boxes = vec![building(0, 10.0, Field::text(" RC-G "))];
        let hits = evaluate(
            &filter(Attribute::Zoning, Op::Eq, Field::text("rc-g")),
            &boxes,
        );
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn unsupported_operators_match_nothing() {
        let boxes = vec![
            building(0, 10.0, Field::text("Residential")),
            building(100, 20.0, Field::text("Commercial")),
        ];
        let hits = evaluate(
            &filter(
                Attribute::Height,
                Op::Unsupported("~=".to_string()),
                Field::Number(10.0),
            ),
            &boxes,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn absent_operands_never_match() {
        let boxes = vec![building(0, 10.0, Field::text("Residential"))];
        let hits = evaluate(
            &filter(Attribute::Value, Op::Gt, Field::Number(0.0)),
            &boxes,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn non_numeric_operands_fail_numeric_comparisons_quietly() {
        let boxes = vec![building(0, 10.0, Field::text("RC-G"))];
        let hits = evaluate(
            &filter(Attribute::Zoning, Op::Gt, Field::Number(5.0)),
            &boxes,
        );
        assert!(hits.is_empty());
    }
}
