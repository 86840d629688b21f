/// One preprocessed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the source text
    pub number: usize,
    pub text: String,
}

/// Strips `;` comments and trailing blanks and upper-cases every line.
///
/// Leading whitespace survives: it is what separates instruction lines from
/// label lines.
pub fn preprocess(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let code = match line.find(';') {
                Some(p) => &line[..p],
                None => line,
            };
            SourceLine { number: i + 1, text: code.trim_end().to_uppercase() }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_case() {
        let lines = preprocess("loop: a=d ; read\n\tw=a+b   \n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], SourceLine { number: 1, text: "LOOP: A=D".into() });
        assert_eq!(lines[1].text, "\tW=A+B");
    }

    #[test]
    fn comment_only_line_is_blank() {
        let lines = preprocess("; header\n");
        assert_eq!(lines[0].text, "");
    }
}
