//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left alone by `application/x-www-form-urlencoded`
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Encode a query value the way a browser encodes form data (spaces become `+`)
pub fn form_encode(value: &str) -> String {
    utf8_percent_encode(value, FORM)
        .to_string()
        .replace("%20", "+")
}

/// Encode a URL component (spaces become `%20`)
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, FORM).to_string()
}

/// Twitter intent to share a page
pub fn share_on_twitter(url: &str, text: &str) -> String {
    format!(
        "https://twitter.com/intent/tweet?url={}&text={}",
        form_encode(url),
        form_encode(text)
    )
}

/// Hacker News submit link; the title is percent-encoded so it doesn't
/// show up with plus signs in the submit form
pub fn share_on_hacker_news(url: &str, text: &str) -> String {
    format!(
        "https://news.ycombinator.com/submitlink?u={}&t={}",
        form_encode(url),
        encode_component(text)
    )
}
