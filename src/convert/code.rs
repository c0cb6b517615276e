//! Code block rendering: shell sessions become a terminal widget

use lazy_static::lazy_static;
use regex::Regex;

use crate::hast::{h, Element, Node};
use crate::mdast::Code;

lazy_static! {
    static ref PLAIN_TEXT: Regex = Regex::new("te?xt").unwrap();
}

/// Render a code block with the custom handlers
pub fn code_block(code: &Code, shell_user: &str) -> Element {
    match code.lang.as_deref() {
        Some("shell") => terminal(code, shell_user),
        None => plain(code),
        Some(lang) if PLAIN_TEXT.is_match(lang) => plain(code),
        Some(lang) => highlightable(code, lang),
    }
}

/// `<pre><code class="language-x">` without any custom handling
pub fn default_code_block(code: &Code) -> Element {
    let mut el = h("code");
    if let Some(lang) = &code.lang {
        el.add_class(&format!("language-{}", lang));
    }
    h("pre").child(el.text(format!("{}\n", code.value)))
}

fn plain(code: &Code) -> Element {
    h("pre").child(
        h("code")
            .class("no-highlight")
            .text(format!("{}\n", code.value)),
    )
}

fn highlightable(code: &Code, lang: &str) -> Element {
    let mut el = h("code").class(&format!("language-{}", lang));
    if let Some(meta) = &code.meta {
        el.set("data-meta", meta.as_str());
    }
    h("pre").child(el.text(format!("{}\n", code.value)))
}

fn buttons() -> Element {
    h("div")
        .class("buttons")
        .child(h("div").attr("class", "button close"))
        .child(h("div").attr("class", "button minimize"))
        .child(h("div").attr("class", "button zoom"))
}

fn span(class: &str, text: &str) -> Node {
    h("span").class(class).text(text).into()
}

/// Terminal window with a colourised shell session
fn terminal(code: &Code, shell_user: &str) -> Element {
    let meta = code.meta_fields();
    let mut header = h("div").class("header").child(buttons());
    if let Some(title) = meta.get("title").filter(|t| !t.is_empty()) {
        header = header
            .child(h("div").class("title").text(title.clone()))
            .child(buttons());
    }

    let lines = code
        .value
        .lines()
        .flat_map(|line| colorize(line, shell_user));

    h("section").class("terminal").child(header).child(
        h("pre")
            .attr("tabindex", "0")
            .child(h("code").class("language-shell").children(lines)),
    )
}

/// One session line, followed by a line break
fn colorize(line: &str, shell_user: &str) -> Vec<Node> {
    let mut nodes = Vec::new();

    if line == "$" {
        nodes.push(span("prompt", "$"));
        nodes.push(" ".into());
        nodes.push(span("blink", " "));
    } else if let Some(rest) = line.strip_prefix('$') {
        nodes.push(span("prompt", "$"));
        nodes.push(rest.into());
    } else if !shell_user.is_empty() && line.starts_with(shell_user) {
        let mut words = line.split(' ');
        let user = words.next().unwrap_or_default();
        let dir = words.next().unwrap_or_default();
        let prompt_or_branch = words.next().unwrap_or_default();

        nodes.push(span("user", user));
        nodes.push(" ".into());
        nodes.push(span("dir", dir));
        nodes.push(" ".into());

        let prompt = if prompt_or_branch.chars().count() > 1 {
            nodes.push(span("branch", prompt_or_branch));
            nodes.push(" ".into());
            words.next().unwrap_or_default()
        } else {
            prompt_or_branch
        };
        nodes.push(span("prompt", prompt));
        nodes.push(" ".into());
        nodes.push(span("blink", " "));

        let command = words.collect::<Vec<_>>().join(" ");
        if !command.is_empty() {
            nodes.push(format!(" {}", command).into());
        }
    } else {
        nodes.push(line.into());
    }

    nodes.push(h("br").into());
    nodes
}
