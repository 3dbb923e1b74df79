/// Structured content of a drawable's detail panel
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailPanel {
    pub title: String,
    pub subtitle: Option<String>,
    pub rows: Vec<DetailRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

impl DetailPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            rows: Vec::new(),
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn row(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.rows.push(DetailRow {
            label: label.into(),
            value: value.to_string(),
        });
        self
    }

    /// Add a row only when the value is present
    pub fn row_opt<V: ToString>(self, label: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.row(label, value),
            None => self,
        }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_skips_missing_values() {
        let panel = DetailPanel::new("EVER GIVEN")
            .subtitle("Container Ship")
            .row("MMSI", 353136000)
            .row_opt("Destination", None::<String>)
            .row_opt("Speed", Some("22.4 km/h"));

        assert_eq!(panel.rows.len(), 2);
        assert_eq!(panel.value("MMSI"), Some("353136000"));
        assert_eq!(panel.value("Speed"), Some("22.4 km/h"));
        assert_eq!(panel.value("Destination"), None);
    }
}
