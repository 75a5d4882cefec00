use std::collections::HashMap;

use crate::database::models::Description;

/// Renders action item description codes into readable text.
///
/// Templates use positional placeholders (`{0}`, `{1}`, ...). Unknown codes
/// render as the code itself so nothing is silently dropped.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    templates: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let templates = [
            ("INCREASED_TEMPERATURE", "Body temperature of {0}°C exceeds the threshold of {1}°C"),
            ("FIRST_CHARACTERISTIC_SYMPTOM", "First characteristic symptom reported: {0}"),
            ("DIARY_ENTRY_MISSING", "No diary entry since {0}"),
            ("MISSING_DETAILS_INDEX", "Index case is missing contact details"),
            ("MISSING_DETAILS_CONTACT", "Contact case is missing contact details"),
            ("INITIAL_CALL_OPEN_INDEX", "Initial call for index case is still open"),
            ("INITIAL_CALL_OPEN_CONTACT", "Initial call for contact case is still open"),
            ("QUARANTINE_ENDING", "Quarantine ends on {0}"),
        ];

        Self {
            templates: templates
                .into_iter()
                .map(|(code, text)| (code.to_string(), text.to_string()))
                .collect(),
        }
    }
}

impl MessageCatalog {
    pub fn with_template(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(code.into(), template.into());
        self
    }

    pub fn render(&self, description: &Description) -> String {
        let Some(template) = self.templates.get(&description.code) else {
            return description.code.clone();
        };

        format_positional(template, &description.arguments)
    }
}

/// Substitute `{n}` with `arguments[n]` in a single pass over the template.
/// Argument text is never rescanned; placeholders without an argument stay.
fn format_positional(template: &str, arguments: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let argument = after.find('}').and_then(|close| {
            let index = &after[..close];
            if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            index.parse::<usize>().ok().and_then(|i| arguments.get(i)).map(|arg| (arg, close))
        });

        match argument {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_positional_arguments() {
        let catalog = MessageCatalog::default();
        let text = catalog.render(&Description::of(
            "INCREASED_TEMPERATURE",
            vec!["38.9".into(), "37.5".into()],
        ));
        assert_eq!(text, "Body temperature of 38.9°C exceeds the threshold of 37.5°C");
    }

    #[test]
    fn unknown_code_renders_raw() {
        let catalog = MessageCatalog::default();
        assert_eq!(catalog.render(&Description::of("SOMETHING_NEW", vec![])), "SOMETHING_NEW");
    }

    #[test]
    fn missing_arguments_leave_placeholder() {
        let catalog = MessageCatalog::default().with_template("X", "{0} and {1}");
        assert_eq!(catalog.render(&Description::of("X", vec!["a".into()])), "a and {1}");
    }

    #[test]
    fn arguments_are_not_rescanned_for_placeholders() {
        let catalog = MessageCatalog::default().with_template("X", "{0} then {1}");
        let text = catalog.render(&Description::of("X", vec!["{1}".into(), "b".into()]));
        assert_eq!(text, "{1} then b");
    }

    #[test]
    fn braces_that_are_not_placeholders_are_kept() {
        let catalog = MessageCatalog::default().with_template("X", "{a} {0} {");
        assert_eq!(catalog.render(&Description::of("X", vec!["z".into()])), "{a} z {");
    }
}
