//! Class based syntax highlighting with syntect

use std::sync::OnceLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::{BuildError, Result};

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();

fn get_syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Language names used in fences that syntect knows under another token
fn token_for(lang: &str) -> &str {
    match lang {
        "shell" | "sh" | "zsh" => "bash",
        "javascript" | "jsx" | "mjs" | "cjs" => "js",
        "yml" => "yaml",
        "md" => "markdown",
        other => other,
    }
}

fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let ss = get_syntax_set();
    let token = token_for(lang);
    ss.find_syntax_by_token(token)
        .or_else(|| ss.find_syntax_by_extension(token))
}

/// Whether a language can be highlighted
pub fn supports(lang: &str) -> bool {
    find_syntax(lang).is_some()
}

/// Highlight `code` into HTML spans with `hl-` prefixed classes.
/// Returns `None` when the language is unknown.
pub fn highlight(code: &str, lang: &str) -> Result<Option<String>> {
    let Some(syntax) = find_syntax(lang) else {
        return Ok(None);
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        get_syntax_set(),
        ClassStyle::SpacedPrefixed { prefix: "hl-" },
    );
    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|e| BuildError::Highlight(format!("{}: {}", lang, e)))?;
    }
    Ok(Some(generator.finalize()))
}
