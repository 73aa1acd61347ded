//! Composition of one field value into its column.

use console::Style;
use ttyline_markup::{StyleExpression, StyledText};

use crate::field::{Align, FieldSpec};

/// Substitutes values into field templates, fits them to their column and
/// appends them to a line.
#[derive(Debug, Clone)]
pub struct FieldCompositor {
    expr: StyleExpression,
    gap: usize,
}

impl FieldCompositor {
    /// `expr` supplies the resolver and ellipsis; its length limit is
    /// replaced per field.
    pub fn new(expr: StyleExpression, gap: usize) -> Self {
        Self { expr, gap }
    }

    /// Columns taken by the decoration template's own text.
    pub fn decoration_width(&self, field: &FieldSpec) -> usize {
        let bare = field.decoration.replace(&field.placeholder(), "");
        self.expr.clone().max_length(0).evaluate(&bare).columns()
    }

    /// Renders `value` into a column `allocated` wide and appends it to `out`.
    ///
    /// `value` is markup, so plain text has to be escaped first. A
    /// `level_style` template wraps the field's style template at its
    /// `${text}` placeholder. The gap is inserted before every field except
    /// the `first` of the line, even when earlier fields rendered nothing.
    pub fn render(
        &self,
        field: &FieldSpec,
        value: &str,
        allocated: usize,
        level_style: Option<&str>,
        first: bool,
        out: &mut StyledText,
    ) {
        if !first && self.gap > 0 {
            out.push_str(&" ".repeat(self.gap), "", &Style::new());
        }

        let available = allocated.saturating_sub(self.decoration_width(field)).max(1);
        let placeholder = field.placeholder();

        let template = match level_style {
            Some(level) => level.replace("${text}", &field.style),
            None => field.style.clone(),
        };
        let markup = template.replace(&placeholder, value);

        let styled = self.expr.clone().max_length(available).evaluate(&markup);
        let padded = pad(styled, available, field.align);

        let decorated = field.decoration.replace(&placeholder, &padded.to_markup());
        self.expr
            .clone()
            .max_length(0)
            .evaluate_into(out, &decorated);
    }
}

fn pad(styled: StyledText, width: usize, align: Align) -> StyledText {
    let columns = styled.columns();
    if columns >= width {
        return styled;
    }
    let amount = width - columns;

    let spaces = |n: usize| StyledText::plain_text(&" ".repeat(n));
    match align {
        Align::Left => {
            let mut out = styled;
            out.append(&spaces(amount));
            out
        }
        Align::Right => {
            let mut out = spaces(amount);
            out.append(&styled);
            out
        }
        Align::Center => {
            let mut out = spaces(amount / 2);
            out.append(&styled);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use ttyline_markup::SpecResolver;

    fn compositor() -> FieldCompositor {
        let expr = StyleExpression::new(Arc::new(SpecResolver::new())).ellipsis("…");
        FieldCompositor::new(expr, 1)
    }

    fn render(field: &FieldSpec, value: &str, allocated: usize) -> StyledText {
        let mut out = StyledText::new();
        compositor().render(field, value, allocated, None, true, &mut out);
        out
    }

    #[test]
    fn left_pads_right() {
        let out = render(&FieldSpec::new("name"), "app", 6);
        assert_eq!(out.plain(), "app   ");
    }

    #[test]
    fn right_pads_left() {
        let out = render(&FieldSpec::new("name").right(), "app", 6);
        assert_eq!(out.plain(), "   app");
    }

    #[test]
    fn center_pads_left_half_only() {
        let out = render(&FieldSpec::new("name").center(), "app", 8);
        assert_eq!(out.plain(), "  app");
    }

    #[test]
    fn long_values_are_truncated() {
        let out = render(&FieldSpec::new("name"), "com.example.service", 8);
        assert_eq!(out.plain(), "com.exa…");
    }

    #[test]
    fn decoration_takes_from_budget() {
        let field = FieldSpec::new("level").decoration("[${level}]");
        assert_eq!(compositor().decoration_width(&field), 2);
        assert_eq!(render(&field, "INFO", 8).plain(), "[INFO  ]");
        assert_eq!(render(&field, "WARNING", 6).plain(), "[WAR…]");
    }

    #[test]
    fn budget_is_at_least_one() {
        let field = FieldSpec::new("level").decoration("<<${level}>>");
        assert_eq!(render(&field, "E", 2).plain(), "<<E>>");
        assert_eq!(render(&field, "ERROR", 2).plain(), "<<…>>");
    }

    #[test]
    fn decoration_wraps_styled_value() {
        let field = FieldSpec::new("level")
            .style("@{bold ${level}}")
            .decoration("@{fg:blue [${level}]}");
        let out = render(&field, "OK", 5);

        let specs: Vec<_> = out
            .runs()
            .iter()
            .map(|r| (r.text.as_str(), r.spec.as_str()))
            .collect();
        assert_eq!(
            specs,
            [("[", "fg:blue"), ("OK", "fg:blue,bold"), (" ]", "fg:blue")]
        );
    }

    #[test]
    fn level_style_wraps_field_style() {
        let field = FieldSpec::new("name").style("@{italic ${name}}");
        let mut out = StyledText::new();
        compositor().render(&field, "db", 2, Some("@{fg:red ${text}}"), true, &mut out);
        assert_eq!(out.runs().len(), 1);
        assert_eq!(out.runs()[0].spec, "fg:red,italic");
    }

    #[test]
    fn gap_between_fields() {
        let c = compositor();
        let mut out = StyledText::new();
        c.render(&FieldSpec::new("a"), "x", 2, None, true, &mut out);
        c.render(&FieldSpec::new("b"), "y", 2, None, false, &mut out);
        assert_eq!(out.plain(), "x  y ");
    }

    #[test]
    fn gap_follows_empty_field() {
        let c = compositor();
        let mut out = StyledText::new();
        c.render(&FieldSpec::new("markers").center(), "", 1, None, true, &mut out);
        assert!(out.is_empty());
        c.render(&FieldSpec::new("message"), "hi", 4, None, false, &mut out);
        assert_eq!(out.plain(), " hi  ");
    }

    #[test]
    fn markup_in_value_is_evaluated() {
        let out = render(&FieldSpec::new("message"), "a @{bold b}", 5);
        assert_eq!(out.plain(), "a b  ");
        assert_eq!(out.runs()[1].spec, "bold");
    }
}
