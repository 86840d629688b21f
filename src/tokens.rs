/// Splits an instruction body into unit assignments.
///
/// Empty fragments (for instance after a trailing comma) are dropped, and
/// chained assignments are expanded with [`expand_chains`].
pub fn tokenize(body: &str) -> Vec<String> {
    let tokens: Vec<&str> = body.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
    expand_chains(&tokens)
}

fn is_chained(token: &str) -> bool {
    let b = token.as_bytes();
    b.len() > 3 && b[1] == b'=' && b[3] == b'='
}

/// Rewrites `X=Y=rhs` into `Y=rhs` in place plus `X=rhs` appended at the end,
/// repeating on the in-place token until it is no longer a chain.
///
/// `rhs` is everything after the last `=`.
pub fn expand_chains<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut appended = Vec::new();
    for token in tokens {
        let mut tok = token.as_ref();
        while is_chained(tok) {
            // is_chained guarantees ASCII at 0..4
            let rhs = tok.rfind('=').map_or("", |p| &tok[p..]);
            appended.push(format!("{}{rhs}", &tok[..1]));
            tok = &tok[2..];
        }
        out.push(tok.to_string());
    }
    out.extend(appended);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_tokens() {
        assert_eq!(tokenize("A=D, B=A ,C=B-A,"), vec!["A=D", "B=A", "C=B-A"]);
    }

    #[test]
    fn chain_of_two() {
        assert_eq!(tokenize("D=A=5"), vec!["A=5", "D=5"]);
    }

    #[test]
    fn chain_of_three_keeps_source_order() {
        assert_eq!(tokenize("DEC,W=B=A=D,F=ZERO()"), vec![
            "DEC", "A=D", "F=ZERO()", "W=D", "B=D"
        ]);
    }

    #[test]
    fn out_assignments_are_not_chains() {
        assert_eq!(tokenize("OUT1=W"), vec!["OUT1=W"]);
        assert_eq!(tokenize("F=ZERO(A+B)"), vec!["F=ZERO(A+B)"]);
    }

    #[test]
    fn input_is_untouched() {
        let toks = ["W=B=1".to_string()];
        let out = expand_chains(&toks);
        assert_eq!(toks[0], "W=B=1");
        assert_eq!(out, vec!["B=1", "W=1"]);
    }
}
