use textwrap::{Options, WrapAlgorithm};

/// Break `text` into lines of at most `width` characters at word boundaries.
///
/// Existing line breaks are kept. Words longer than `width` are split so no line exceeds it.
/// `None` or a zero width leaves the text unwrapped.
pub fn wrap_text(text: &str, width: Option<usize>) -> Vec<String> {
    match width {
        Some(w) if w > 0 => {
            let opts = Options::new(w)
                .wrap_algorithm(WrapAlgorithm::FirstFit)
                .break_words(true);
            textwrap::wrap(text, opts)
                .into_iter()
                .map(|line| line.into_owned())
                .collect()
        }
        _ => text.lines().map(str::to_owned).collect(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
