//! Inline style declarations for the injected panel.
//!
//! The host stylesheet is hostile territory, so the panel pins its own
//! placement with `!important` inline declarations. This module keeps those
//! declarations in order with the last write per property winning.

/// One `property: value [!important]` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// Ordered inline style of a single element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    /// Set a property, replacing any previous value in place.
    /// An empty value removes the property, like `style.prop = ""`.
    pub fn set_property(&mut self, property: &str, value: &str, important: bool) {
        if value.is_empty() {
            self.remove_property(property);
            return;
        }
        match self.declarations.iter_mut().find(|d| d.property == property) {
            Some(decl) => {
                decl.value = value.to_string();
                decl.important = important;
            }
            None => self.declarations.push(Declaration {
                property: property.to_string(),
                value: value.to_string(),
                important,
            }),
        }
    }

    pub fn remove_property(&mut self, property: &str) {
        self.declarations.retain(|d| d.property != property);
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }

    pub fn is_important(&self, property: &str) -> bool {
        self.declarations
            .iter()
            .any(|d| d.property == property && d.important)
    }

    /// Pixel value of a property such as `left: 12.5px`.
    pub fn get_px(&self, property: &str) -> Option<f64> {
        self.get(property).and_then(parse_css_px)
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }
}

/// Parse a CSS pixel length (`12px`, `-3.5px` or a bare number).
pub fn parse_css_px(val: &str) -> Option<f64> {
    let v = val.trim().to_lowercase();
    v.trim_end_matches("px").trim().parse::<f64>().ok()
}

/// Format a pixel length the way the browser echoes it back.
pub fn px(value: f64) -> String {
    format!("{}px", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut style = InlineStyle::default();
        style.set_property("left", "10px", true);
        style.set_property("top", "20px", true);
        style.set_property("left", "15px", true);
        let props: Vec<_> = style.declarations().iter().map(|d| (d.property.as_str(), d.value.as_str())).collect();
        assert_eq!(props, [("left", "15px"), ("top", "20px")]);
        assert!(style.is_important("left"));
    }

    #[test]
    fn empty_value_removes() {
        let mut style = InlineStyle::default();
        style.set_property("opacity", "0.8", false);
        style.set_property("opacity", "", false);
        assert_eq!(style.get("opacity"), None);
        assert!(style.declarations().is_empty());
    }

    #[test]
    fn parse_px_values() {
        assert_eq!(parse_css_px("-3px"), Some(-3.0));
        assert_eq!(parse_css_px(" 7 "), Some(7.0));
        assert_eq!(parse_css_px("auto"), None);
    }
}
