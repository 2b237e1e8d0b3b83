//! Prompt text assembled in code
//!
//! Agent system prompts and task prompts have optional parts (a tool list,
//! earlier task outputs). [`PromptBuilder`] appends them in order.

/// Appends prompt fragments into one string
///
/// ```
/// use crew_prompt::PromptBuilder;
///
/// let prompt = PromptBuilder::new()
///     .text("You are Expert Technical Analyst.")
///     .blank_line()
///     .text("Your personal goal is: analyse AAPL")
///     .when(false, "\nUnused")
///     .build();
///
/// assert_eq!(
///     prompt,
///     "You are Expert Technical Analyst.\n\nYour personal goal is: analyse AAPL"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    buf: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, content: impl AsRef<str>) -> Self {
        self.buf.push_str(content.as_ref());
        self
    }

    pub fn newline(self) -> Self {
        self.text("\n")
    }

    /// Paragraph break
    pub fn blank_line(self) -> Self {
        self.text("\n\n")
    }

    /// Append `content` only if `condition` holds
    pub fn when(self, condition: bool, content: impl AsRef<str>) -> Self {
        if condition { self.text(content) } else { self }
    }

    /// One `- item` line per entry
    pub fn bullets<I, S>(self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items
            .into_iter()
            .fold(self, |b, item| b.text("- ").text(item).newline())
    }

    pub fn build(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs() {
        let prompt = PromptBuilder::new()
            .text("Research TSLA")
            .blank_line()
            .text("Expected output: a summary")
            .build();
        assert_eq!(prompt, "Research TSLA\n\nExpected output: a summary");
    }

    #[test]
    fn test_tool_bullets() {
        let prompt = PromptBuilder::new()
            .text("Tools:")
            .newline()
            .bullets(["search_internet", "yf_tech_analysis"])
            .build();
        assert_eq!(prompt, "Tools:\n- search_internet\n- yf_tech_analysis\n");
    }

    #[test]
    fn test_no_bullets_adds_nothing() {
        let prompt = PromptBuilder::new()
            .text("Base")
            .bullets(Vec::<String>::new())
            .build();
        assert_eq!(prompt, "Base");
    }

    #[test]
    fn test_conditional() {
        let prompt = PromptBuilder::new()
            .text("Base")
            .when(true, " with context")
            .when(false, " without")
            .build();
        assert_eq!(prompt, "Base with context");
    }
}
