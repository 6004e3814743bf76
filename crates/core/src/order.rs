//! Order items: what a cook call asks for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Detail label served when an order item names none.
pub const DEFAULT_DETAIL: &str = "full";

/// A requested token with an optional detail label.
///
/// Deserializes from either a bare string (`"History"`) or an object
/// (`{"token": "History", "detail": "brief"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderItem {
    Bare(String),
    Detailed {
        token: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl OrderItem {
    pub fn new(token: impl Into<String>) -> Self {
        Self::Bare(token.into())
    }

    pub fn with_detail(token: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Detailed {
            token: token.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn token(&self) -> &str {
        match self {
            Self::Bare(token) | Self::Detailed { token, .. } => token,
        }
    }

    /// The explicitly requested detail label, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Bare(_) => None,
            Self::Detailed { detail, .. } => detail.as_deref(),
        }
    }
}

impl From<&str> for OrderItem {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for OrderItem {
    fn from(token: String) -> Self {
        Self::Bare(token)
    }
}

impl From<(&str, &str)> for OrderItem {
    fn from((token, detail): (&str, &str)) -> Self {
        Self::with_detail(token, detail)
    }
}

/// Parses the CLI shorthand `TOKEN` or `TOKEN:DETAIL`.
impl FromStr for OrderItem {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.split_once(':') {
            Some((token, detail)) if !detail.is_empty() => Self::with_detail(token, detail),
            Some((token, _)) => Self::new(token),
            None => Self::new(s),
        })
    }
}

impl fmt::Display for OrderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}:{}", self.token(), detail),
            None => f.write_str(self.token()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_bare_and_detailed() {
        let items: Vec<OrderItem> =
            serde_json::from_value(json!(["A", {"token": "B", "detail": "brief"}, {"token": "C"}]))
                .unwrap();
        assert_eq!(items[0], OrderItem::new("A"));
        assert_eq!(items[1].detail(), Some("brief"));
        assert_eq!(items[2].token(), "C");
        assert_eq!(items[2].detail(), None);
    }

    #[test]
    fn parses_cli_shorthand() {
        let item: OrderItem = "History:brief".parse().unwrap();
        assert_eq!(item.token(), "History");
        assert_eq!(item.detail(), Some("brief"));
        assert_eq!(item.to_string(), "History:brief");

        let bare: OrderItem = "History".parse().unwrap();
        assert_eq!(bare.detail(), None);
        let trailing: OrderItem = "History:".parse().unwrap();
        assert_eq!(trailing, OrderItem::new("History"));
    }
}
