use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::{Choices, Placeholder, TemplateError, TemplateValues};

/// Wildcard for an unbounded placeholder: at least one character, never a
/// path separator, as short as the surrounding literals allow.
const WILDCARD: &str = r"[^/\\]+?";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

/// A file-name or URL template.
///
/// Placeholders with declared [`Choices`] are rendered in their canonical
/// case and matched only against those choices; the rest match any run of
/// characters that contains no path separator.
#[derive(Debug, Clone)]
pub struct FileNameTemplate {
    source:   String,
    segments: Vec<Segment>,
    choices:  BTreeMap<Placeholder, Choices>,
    matcher:  Regex,
    leading:  Regex,
    /// Capture group `i + 1` holds the value of `groups[i]`.
    groups:   Vec<Placeholder>,
}

impl FileNameTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let segments = split_segments(source)?;
        let choices = BTreeMap::new();
        let (matcher, leading, groups) = build_matcher(&segments, &choices)?;
        Ok(Self {
            source: source.to_string(),
            segments,
            choices,
            matcher,
            leading,
            groups,
        })
    }

    /// Restrict `placeholder` to `choices`. An empty set lifts the restriction.
    pub fn with_choices(mut self, placeholder: Placeholder, choices: Choices) -> Result<Self, TemplateError> {
        if choices.is_empty() {
            self.choices.remove(&placeholder);
        } else {
            self.choices.insert(placeholder, choices);
        }
        let (matcher, leading, groups) = build_matcher(&self.segments, &self.choices)?;
        self.matcher = matcher;
        self.leading = leading;
        self.groups = groups;
        Ok(self)
    }

    pub fn as_str(&self) -> &str { &self.source }

    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Slot(p) if *p == placeholder))
    }

    /// Placeholders present in the template, in canonical order.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        Placeholder::ALL.into_iter().filter(|p| self.uses(*p)).collect()
    }

    pub fn choices(&self, placeholder: Placeholder) -> Option<&Choices> {
        self.choices.get(&placeholder)
    }

    /// Substitute every placeholder. Values for placeholders the template does
    /// not use are ignored.
    ///
    /// The result always captures back to the values used. A value that would
    /// swallow the literal after it (`1-2` in `{VERSION}-{EDITION}`) is
    /// rejected with [`TemplateError::Ambiguous`].
    pub fn render(&self, values: &TemplateValues) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        let mut used = TemplateValues::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(p) => {
                    let value = self.resolve_value(*p, values)?;
                    out.push_str(value);
                    used.insert(*p, value);
                }
            }
        }

        if self.capture(&out).as_ref() != Some(&used) {
            return Err(TemplateError::Ambiguous { rendered: out });
        }
        Ok(out)
    }

    fn resolve_value<'v>(&'v self, placeholder: Placeholder, values: &'v TemplateValues) -> Result<&'v str, TemplateError> {
        let value = values
            .get(placeholder)
            .filter(|v| !v.is_empty())
            .ok_or(TemplateError::MissingValue(placeholder))?;

        if value.contains(['/', '\\']) {
            return Err(TemplateError::InvalidValue {
                placeholder,
                value: value.to_string(),
            });
        }

        match self.choices.get(&placeholder) {
            Some(choices) => choices.resolve(placeholder, value),
            None => Ok(value),
        }
    }

    /// Extract placeholder values from a concrete name, or `None` when the
    /// literal parts do not line up.
    pub fn capture(&self, candidate: &str) -> Option<TemplateValues> {
        self.values_of(&self.matcher, candidate)
    }

    /// Like [`capture`](Self::capture), but the template only has to match
    /// the start of `text`, up to whitespace or the end.
    ///
    /// `Ubuntu {VERSION}` reads `24.04.1` out of `Ubuntu 24.04.1 LTS (Noble Numbat)`.
    pub fn capture_leading(&self, text: &str) -> Option<TemplateValues> {
        self.values_of(&self.leading, text)
    }

    fn values_of(&self, matcher: &Regex, candidate: &str) -> Option<TemplateValues> {
        let caps = matcher.captures(candidate)?;
        let mut values = TemplateValues::new();

        for (i, placeholder) in self.groups.iter().enumerate() {
            let raw = caps.get(i + 1)?.as_str();
            let value = match self.choices.get(placeholder) {
                Some(choices) => choices.canonicalize(raw)?,
                None => raw,
            };
            match values.get(*placeholder) {
                // A repeated placeholder must capture the same text everywhere.
                Some(seen) if seen != value => return None,
                Some(_) => {}
                None => values.insert(*placeholder, value),
            }
        }

        Some(values)
    }
}

impl FromStr for FileNameTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl fmt::Display for FileNameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.source) }
}

fn split_segments(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;
    let mut offset = 0;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or(TemplateError::Unclosed(offset + open))?;
        let token = &after[..close];
        let placeholder =
            Placeholder::from_token(token).ok_or_else(|| TemplateError::UnknownPlaceholder(token.to_string()))?;

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Slot(placeholder));

        let consumed = open + 1 + close + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// The whole-name matcher, the leading-text matcher and the placeholder of
/// each capture group.
fn build_matcher(
    segments: &[Segment],
    choices: &BTreeMap<Placeholder, Choices>,
) -> Result<(Regex, Regex, Vec<Placeholder>), TemplateError> {
    let mut pattern = String::from("^");
    let mut groups = Vec::new();

    for segment in segments {
        match segment {
            Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
            Segment::Slot(p) => {
                pattern.push('(');
                match choices.get(p) {
                    Some(choices) => pattern.push_str(&alternation(choices)),
                    None => pattern.push_str(WILDCARD),
                }
                pattern.push(')');
                groups.push(*p);
            }
        }
    }
    let whole = Regex::new(&format!("{pattern}$"))?;
    let leading = Regex::new(&format!(r"{pattern}(?:\s|$)"))?;
    Ok((whole, leading, groups))
}

/// `(?i:a|b|c)`, longest first so `installer-netinst` wins over `installer`.
fn alternation(choices: &Choices) -> String {
    let mut alts: Vec<&str> = choices.iter().collect();
    alts.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let escaped: Vec<String> = alts.into_iter().map(regex::escape).collect();
    format!("(?i:{})", escaped.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(s: &str) -> FileNameTemplate { s.parse().unwrap() }

    #[test]
    fn test_render_all_placeholders() {
        let template = t("Win_{VERSION}_{LANGUAGE}_{EDITION}.iso");
        let values = TemplateValues::new()
            .with(Placeholder::Version, "23H2")
            .with(Placeholder::Language, "English")
            .with(Placeholder::Edition, "x64");
        assert_eq!(template.render(&values).unwrap(), "Win_23H2_English_x64.iso");
    }

    #[test]
    fn test_render_missing_value() {
        let template = t("debian-live-{VERSION}-amd64-{EDITION}.iso");
        let values = TemplateValues::new().with(Placeholder::Version, "12.5.0");
        assert!(matches!(
            template.render(&values),
            Err(TemplateError::MissingValue(Placeholder::Edition))
        ));
    }

    #[test]
    fn test_render_ignores_unused_values() {
        let template = t("ubuntu-{VERSION}-desktop-amd64.iso");
        let values = TemplateValues::new()
            .with(Placeholder::Version, "24.04")
            .with(Placeholder::Edition, "lts");
        assert_eq!(template.render(&values).unwrap(), "ubuntu-24.04-desktop-amd64.iso");
    }

    #[test]
    fn test_render_rejects_path_separators() {
        let template = t("{VERSION}.iso");
        let values = TemplateValues::new().with(Placeholder::Version, "../etc");
        assert!(matches!(template.render(&values), Err(TemplateError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "{VERSION}-{ARCH}.iso".parse::<FileNameTemplate>(),
            Err(TemplateError::UnknownPlaceholder(token)) if token == "ARCH"
        ));
        assert!(matches!(
            "iso-{VERSION".parse::<FileNameTemplate>(),
            Err(TemplateError::Unclosed(4))
        ));
    }

    #[test]
    fn test_uses_and_placeholders() {
        let template = t("kali-linux-{VERSION}-{EDITION}-amd64.iso");
        assert!(template.uses(Placeholder::Version));
        assert!(!template.uses(Placeholder::Language));
        assert_eq!(template.placeholders(), vec![Placeholder::Version, Placeholder::Edition]);
    }

    #[test]
    fn test_capture_round_trip() {
        let template = t("debian-live-{VERSION}-amd64-{EDITION}.iso");
        let values = TemplateValues::new()
            .with(Placeholder::Version, "24.04")
            .with(Placeholder::Edition, "kde");
        let rendered = template.render(&values).unwrap();
        assert_eq!(template.capture(&rendered), Some(values));
    }

    #[test]
    fn test_capture_no_match() {
        let template = t("debian-live-{VERSION}-amd64-{EDITION}.iso");
        assert_eq!(template.capture("debian-live-12.5.0-i386-kde.iso"), None);
        assert_eq!(template.capture("debian-live-12.5.0-amd64-kde.iso.part"), None);
        assert_eq!(template.capture("SHA256SUMS"), None);
    }

    #[test]
    fn test_capture_without_placeholders() {
        let template = t("memtest86+.iso");
        assert_eq!(template.capture("memtest86+.iso"), Some(TemplateValues::new()));
        assert_eq!(template.capture("memtest86.iso"), None);
    }

    #[test]
    fn test_capture_bounded_by_choices() {
        let template = t("kali-linux-{VERSION}-{EDITION}-amd64.iso")
            .with_choices(
                Placeholder::Edition,
                Choices::new(["installer", "installer-netinst", "installer-purple", "live"]),
            )
            .unwrap();

        let values = template.capture("kali-linux-2024.1-installer-netinst-amd64.iso").unwrap();
        assert_eq!(values.get(Placeholder::Version), Some("2024.1"));
        assert_eq!(values.get(Placeholder::Edition), Some("installer-netinst"));

        assert_eq!(template.capture("kali-linux-2024.1-everything-amd64.iso"), None);
    }

    #[test]
    fn test_choices_canonicalize_render_and_capture() {
        let template = t("ubuntu-{EDITION}-{VERSION}.iso")
            .with_choices(Placeholder::Edition, Choices::new(["LTS", "Interim"]))
            .unwrap();

        let upper = TemplateValues::new()
            .with(Placeholder::Version, "24.04")
            .with(Placeholder::Edition, "lts");
        assert_eq!(template.render(&upper).unwrap(), "ubuntu-LTS-24.04.iso");

        let values = template.capture("ubuntu-lts-24.04.iso").unwrap();
        assert_eq!(values.get(Placeholder::Edition), Some("LTS"));

        let bad = TemplateValues::new()
            .with(Placeholder::Version, "24.04")
            .with(Placeholder::Edition, "daily");
        assert!(matches!(template.render(&bad), Err(TemplateError::InvalidChoice { .. })));
    }

    #[test]
    fn test_repeated_placeholder_must_agree() {
        let template = t("{VERSION}/ubuntu-{VERSION}-desktop-amd64.iso");
        let values = template.capture("24.04/ubuntu-24.04-desktop-amd64.iso").unwrap();
        assert_eq!(values.get(Placeholder::Version), Some("24.04"));
        assert_eq!(template.capture("24.04/ubuntu-23.10-desktop-amd64.iso"), None);
    }

    #[test]
    fn test_literal_regex_metacharacters() {
        let template = t("memtest86+-{VERSION}.(x64).iso");
        let values = template.capture("memtest86+-7.00.(x64).iso").unwrap();
        assert_eq!(values.get(Placeholder::Version), Some("7.00"));
        assert_eq!(template.capture("memtest86--7.00.(x64).iso"), None);
    }

    #[test]
    fn test_render_rejects_ambiguous_value() {
        let template = t("{VERSION}-{EDITION}.iso");
        let values = TemplateValues::new()
            .with(Placeholder::Version, "1-2")
            .with(Placeholder::Edition, "kde");
        assert!(matches!(
            template.render(&values),
            Err(TemplateError::Ambiguous { rendered }) if rendered == "1-2-kde.iso"
        ));

        let bounded = template
            .with_choices(Placeholder::Edition, Choices::new(["kde"]))
            .unwrap();
        assert_eq!(bounded.render(&values).unwrap(), "1-2-kde.iso");
    }

    #[test]
    fn test_capture_leading_text() {
        let template = t("Ubuntu {VERSION}");
        let values = template.capture_leading("Ubuntu 24.04.1 LTS (Noble Numbat)").unwrap();
        assert_eq!(values.get(Placeholder::Version), Some("24.04.1"));
        let values = template.capture_leading("Ubuntu 24.10").unwrap();
        assert_eq!(values.get(Placeholder::Version), Some("24.10"));

        assert_eq!(template.capture_leading("Kubuntu 24.04 LTS"), None);
        let whole = template.capture("Ubuntu 24.04.1 LTS").unwrap();
        assert_eq!(whole.get(Placeholder::Version), Some("24.04.1 LTS"));
    }

    proptest! {
        #[test]
        fn prop_capture_inverts_render(
            version in "[0-9]{1,4}(\\.[0-9]{1,3}){0,3}",
            edition in "[a-z]{1,8}",
            language in "[A-Za-z]{2,10}",
        ) {
            let template = t("os-{VERSION}-{EDITION}_{LANGUAGE}.iso");
            let values = TemplateValues::new()
                .with(Placeholder::Version, version)
                .with(Placeholder::Edition, edition)
                .with(Placeholder::Language, language);
            let rendered = template.render(&values).unwrap();
            prop_assert_eq!(template.capture(&rendered), Some(values));
        }
    }
}
