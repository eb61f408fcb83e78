use crate::config::types::FILENAME_SLOT;

/// Command line with a `{filename}` slot, e.g. `python3 {filename}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate(String);

impl CommandTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Substitute every `{filename}` slot with `path`.
    ///
    /// Paths containing shell metacharacters or whitespace are quoted; plain
    /// paths are inserted unchanged. A slot the template already wraps in
    /// quotes (`"{filename}"` or `'{filename}'`) receives the raw path.
    pub fn format(&self, path: &str) -> String {
        let quoted = shlex::try_quote(path)
            .map(|q| q.into_owned())
            .unwrap_or_else(|_| path.to_string());

        let mut formatted = self.0.clone();
        for quote in ['"', '\''] {
            let wrapped = format!("{quote}{FILENAME_SLOT}{quote}");
            formatted = formatted.replace(&wrapped, &format!("{quote}{path}{quote}"));
        }
        formatted.replace(FILENAME_SLOT, &quoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_plain_path() {
        let template = CommandTemplate::new("python {filename}");
        assert_eq!(template.format("/data/a.py"), "python /data/a.py");
    }

    #[test]
    fn test_format_relative_path() {
        let template = CommandTemplate::new("python3 {filename}");
        assert_eq!(
            template.format("_interpreter.current.py"),
            "python3 _interpreter.current.py"
        );
    }

    #[test]
    fn test_format_every_slot() {
        let template = CommandTemplate::new("cat {filename} && python3 {filename}");
        assert_eq!(template.format("a.py"), "cat a.py && python3 a.py");
    }

    #[test]
    fn test_format_keeps_template_quotes() {
        let double = CommandTemplate::new("python3 \"{filename}\"");
        assert_eq!(double.format("/a b/x.py"), "python3 \"/a b/x.py\"");

        let single = CommandTemplate::new("python3 '{filename}'");
        assert_eq!(single.format("/a b/x.py"), "python3 '/a b/x.py'");
    }

    #[test]
    fn test_format_quotes_spaces() {
        let template = CommandTemplate::new("python3 {filename}");
        assert_eq!(
            template.format("/Users/me/Application Support/a.py"),
            "python3 '/Users/me/Application Support/a.py'"
        );
    }
}
