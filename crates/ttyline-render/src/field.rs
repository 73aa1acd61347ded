//! Field specifications: one column of a log line.

use serde::{Deserialize, Serialize};

/// Horizontal alignment of a value within its column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Pad on the right.
    #[default]
    Left,
    /// Pad on the left with half the free space.
    Center,
    /// Pad on the left.
    Right,
}

/// The values a layout field can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    DateTime,
    ThreadName,
    ThreadId,
    Level,
    ShortName,
    Name,
    Message,
    Markers,
    /// Any other name. Renders an empty value, which makes a spacer column.
    Custom,
}

impl FieldKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "date-time" => FieldKind::DateTime,
            "thread-name" => FieldKind::ThreadName,
            "thread-id" => FieldKind::ThreadId,
            "level" => FieldKind::Level,
            "short-name" => FieldKind::ShortName,
            "name" => FieldKind::Name,
            "message" => FieldKind::Message,
            "markers" => FieldKind::Markers,
            _ => FieldKind::Custom,
        }
    }
}

/// Immutable description of one column.
///
/// Both templates contain a `${name}` placeholder for the value. The style
/// template is evaluated with the column's length budget. The decoration
/// template wraps the already padded value, so its literal characters are
/// taken out of the budget.
///
/// ```rust
/// use ttyline_render::{Align, FieldSpec};
///
/// let level = FieldSpec::new("level")
///     .width(7)
///     .center()
///     .style("@{bold ${level}}")
///     .decoration("[${level}]");
/// assert_eq!(level.placeholder(), "${level}");
/// assert_eq!(level.align, Align::Center);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    /// Fixed width in columns, `0` for an auto-sized column.
    pub width: usize,
    pub align: Align,
    pub style: String,
    pub decoration: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let placeholder = placeholder(&name);
        Self {
            name,
            width: 0,
            align: Align::default(),
            style: placeholder.clone(),
            decoration: placeholder,
        }
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Shorthand for `.align(Align::Right)`.
    pub fn right(self) -> Self {
        self.align(Align::Right)
    }

    /// Shorthand for `.align(Align::Center)`.
    pub fn center(self) -> Self {
        self.align(Align::Center)
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn decoration(mut self, decoration: impl Into<String>) -> Self {
        self.decoration = decoration.into();
        self
    }

    pub fn is_auto(&self) -> bool {
        self.width == 0
    }

    pub fn kind(&self) -> FieldKind {
        FieldKind::from_name(&self.name)
    }

    /// The `${name}` placeholder for this field.
    pub fn placeholder(&self) -> String {
        placeholder(&self.name)
    }
}

fn placeholder(name: &str) -> String {
    format!("${{{}}}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let field = FieldSpec::new("message");
        assert!(field.is_auto());
        assert_eq!(field.align, Align::Left);
        assert_eq!(field.style, "${message}");
        assert_eq!(field.decoration, "${message}");
    }

    #[test]
    fn kinds() {
        assert_eq!(FieldSpec::new("date-time").kind(), FieldKind::DateTime);
        assert_eq!(FieldSpec::new("short-name").kind(), FieldKind::ShortName);
        assert_eq!(FieldSpec::new("spacer").kind(), FieldKind::Custom);
    }

    #[test]
    fn align_serde() {
        let align: Align = serde_yaml::from_str("center").unwrap();
        assert_eq!(align, Align::Center);
        assert!(serde_yaml::from_str::<Align>("middle").is_err());
    }
}
