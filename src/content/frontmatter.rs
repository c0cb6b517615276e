//! Front-matter parsing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

use super::PageType;
use crate::helpers::date::parse_date;

/// Tags are either a list or a single string separated by commas and/or spaces
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct TagList;

    impl<'de> Visitor<'de> for TagList {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(split_tags(value))
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut tags = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                tags.push(item);
            }
            Ok(tags)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(TagList)
}

/// Split a tag string on commas and spaces
pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split([',', ' '])
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Front-matter data of a document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
    pub modified: Option<String>,
    pub draft: bool,
    pub image: Option<String>,
    #[serde(deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub page_type: Option<PageType>,
    pub class: Option<String>,

    /// Any other keys
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Split front-matter from the body.
    /// Returns (front_matter, remaining_content).
    pub fn parse(content: &str) -> Result<(Self, &str), serde_yaml::Error> {
        let Some(rest) = content.strip_prefix("---") else {
            return Ok((FrontMatter::default(), content));
        };
        if !rest.starts_with(['\n', '\r']) {
            return Ok((FrontMatter::default(), content));
        }
        let rest = rest.trim_start_matches(['\n', '\r']);

        let Some(end_pos) = find_closing_fence(rest) else {
            return Ok((FrontMatter::default(), content));
        };
        let yaml = &rest[..end_pos];
        let remaining = rest[end_pos..]
            .trim_start_matches('-')
            .trim_start_matches(['\n', '\r']);

        if yaml.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A thematic break followed by prose is not front-matter
        if !has_yaml_structure(yaml) {
            return Ok((FrontMatter::default(), content));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml)?;
        Ok((fm, remaining))
    }

    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        self.published.as_deref().and_then(parse_date)
    }

    pub fn modified_date(&self) -> Option<DateTime<Utc>> {
        self.modified.as_deref().and_then(parse_date)
    }
}

/// Byte offset of the closing `---` line
fn find_closing_fence(rest: &str) -> Option<usize> {
    if rest.starts_with("---") {
        return Some(0);
    }
    rest.find("\n---").map(|pos| pos + 1)
}

fn has_yaml_structure(yaml: &str) -> bool {
    yaml.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        match trimmed.find(':') {
            Some(colon) => {
                let key = &trimmed[..colon];
                let after = &trimmed[colon + 1..];
                !key.is_empty()
                    && key
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                    && (after.is_empty() || after.starts_with(' '))
            }
            None => false,
        }
    })
}
