//! Markdown documentation for attributes

use crate::kb::Attribute;

const SEPARATOR: &str = "\n\n---\n\n";

/// Escape markdown syntax so prose renders literally
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '`' | '*' | '_' | '{' | '}' | '[' | ']' | '(' | ')' | '#' | '+' | '-' | '!'
            | '~' | '<' | '>' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\n\n"),
            _ => out.push(ch),
        }
    }
    out
}

/// Description, then example and accepted-value lists when present
pub fn attribute_documentation(attr: &Attribute) -> String {
    let mut doc = escape_markdown(&attr.description);

    if let Some(examples) = &attr.examples {
        doc.push_str(SEPARATOR);
        doc.push_str("Examples:\n");
        for example in examples {
            doc.push_str(&format!(" - {}\n", example.replace('#', "\\#")));
        }
    }

    if let Some(values) = &attr.accepted_literals {
        doc.push_str(SEPARATOR);
        doc.push_str("Values:\n\n");
        for value in values {
            doc.push_str(&format!(" - {}\n", value.replace('#', "\\#")));
        }
        doc.push('\n');
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attr(json: &str) -> Attribute {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_description_only() {
        let a = attr(r#"{"desc": "Makes the *button* flat"}"#);
        assert_eq!(attribute_documentation(&a), r"Makes the \*button\* flat");
    }

    #[test]
    fn test_examples_and_values() {
        let a = attr(
            r##"{
                "desc": "Color name",
                "examples": ["color=\"#ff0000\"", "color=primary"],
                "values": ["'primary'", "'#abc'"]
            }"##,
        );
        let expected = "Color name\n\n---\n\nExamples:\n - color=\"\\#ff0000\"\n - color=primary\n\n\n---\n\nValues:\n\n - 'primary'\n - '\\#abc'\n\n";
        assert_eq!(attribute_documentation(&a), expected);
    }

    #[test]
    fn test_every_hash_is_escaped() {
        let a = attr(r##"{"examples": ["#a #b"]}"##);
        assert!(attribute_documentation(&a).contains(r"\#a \#b"));
    }

    #[test]
    fn test_escape_markdown_newlines() {
        assert_eq!(escape_markdown("a\nb_c"), "a\n\nb\\_c");
    }
}
