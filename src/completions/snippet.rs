//! Snippet text builder.
//!
//! Produces the editor snippet syntax: literal text with `$`, `}` and `\`
//! escaped, numbered placeholders `${1:text}` and choices `${1|a,b|}`.

#[derive(Debug, Clone, Default)]
pub struct Snippet {
    value: String,
    next_tabstop: u32,
}

impl Snippet {
    pub fn new() -> Self {
        Self {
            value: String::new(),
            next_tabstop: 1,
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        escape_into(&mut self.value, text, &['$', '}', '\\']);
        self
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        let n = self.tabstop();
        self.value.push_str(&format!("${{{}:", n));
        escape_into(&mut self.value, text, &['$', '}', '\\']);
        self.value.push('}');
        self
    }

    /// Discrete choice; an empty list degrades to a plain tabstop
    pub fn choice<S: AsRef<str>>(mut self, options: &[S]) -> Self {
        let n = self.tabstop();
        if options.is_empty() {
            self.value.push_str(&format!("${}", n));
            return self;
        }
        self.value.push_str(&format!("${{{}|", n));
        for (i, option) in options.iter().enumerate() {
            if i > 0 {
                self.value.push(',');
            }
            escape_into(&mut self.value, option.as_ref(), &['$', '}', '\\', ',', '|']);
        }
        self.value.push_str("|}");
        self
    }

    pub fn build(self) -> String {
        self.value
    }

    fn tabstop(&mut self) -> u32 {
        let n = self.next_tabstop.max(1);
        self.next_tabstop = n + 1;
        n
    }
}

fn escape_into(out: &mut String, text: &str, special: &[char]) {
    for ch in text.chars() {
        if special.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_placeholder() {
        let snippet = Snippet::new().text("body-cell-").placeholder("[name]").build();
        assert_eq!(snippet, "body-cell-${1:[name]}");
    }

    #[test]
    fn test_choice() {
        let snippet = Snippet::new().text("size=").choice(&["sm", "md", "a,b"]).build();
        assert_eq!(snippet, r"size=${1|sm,md,a\,b|}");
    }

    #[test]
    fn test_escaping_and_numbering() {
        let snippet = Snippet::new()
            .text("$x}")
            .placeholder("a")
            .choice::<&str>(&[])
            .build();
        assert_eq!(snippet, r"\$x\}${1:a}$2");
    }
}
