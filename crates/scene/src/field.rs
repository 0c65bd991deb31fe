use serde::Serialize;

/// A queryable metadata value: free text or a numeric code.
///
/// Zoning classifiers arrive in both shapes (`"RC-G"` and `12`), so
/// comparisons have to work across representations. Textual comparison is
/// case-insensitive and whitespace-trimmed; integer-valued numbers render
/// without a fractional part so `12` and `"12"` compare equal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Field {
    Number(f64),
    Text(String),
}

impl Field {
    pub fn text(s: impl Into<String>) -> Self {
        Field::Text(s.into())
    }

    /// Numeric reading: numbers as-is, text via parse.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Field::Number(n) => Some(*n),
            Field::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Case-insensitive, whitespace-trimmed equality.
    pub fn eq_ci(&self, other: &Field) -> bool {
        self.canonical() == other.canonical()
    }

    /// Case-insensitive substring containment: `self` contains `needle`.
    pub fn contains_ci(&self, needle: &Field) -> bool {
        self.canonical().contains(&needle.canonical())
    }

    fn canonical(&self) -> String {
        match self {
            Field::Number(n) => render_number(*n),
            Field::Text(s) => s.trim().to_lowercase(),
        }
    }
}

fn render_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
