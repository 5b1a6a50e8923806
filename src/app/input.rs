use unicode_segmentation::UnicodeSegmentation;

/// Single-line, append-only text field. The caret always sits at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    value: String,
    placeholder: &'static str,
    char_limit: usize,
}

impl TextField {
    pub fn new(placeholder: &'static str, char_limit: usize) -> Self {
        Self {
            value: String::new(),
            placeholder,
            char_limit,
        }
    }

    pub fn task_name() -> Self {
        Self::new("Task Name", 50)
    }

    pub fn start_time() -> Self {
        Self::new("Start Time (HH:mm)", 5)
    }

    pub fn end_time() -> Self {
        Self::new("End Time (HH:mm)", 5)
    }

    pub fn shutdown_phrase() -> Self {
        Self::new("SHUTDOWN COMPLETE", 17)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replaces the contents, truncated to the char limit.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.chars().take(self.char_limit).collect();
    }

    pub fn insert_char(&mut self, ch: char) -> bool {
        if self.value.chars().count() >= self.char_limit {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub fn backspace(&mut self) -> bool {
        let Some((offset, _)) = self.value.grapheme_indices(true).next_back() else {
            return false;
        };
        self.value.truncate(offset);
        true
    }
}
