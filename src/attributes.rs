// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Parser for the free-text ComLine product description.
//!
//! The description follows a loose convention:
//!
//! - text before the first `#` is the base configuration
//! - `#` introduces a standard attribute
//! - `##` introduces a legal or disclaimer attribute
//! - ` -` or a line break starts a trailing note that is not part of the value
//!
//! Standard attributes are sorted into named slots by keyword. Matching runs on
//! the `regex` crate, which guarantees linear-time matching, and only ever looks
//! at a bounded prefix of each segment.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Attributes;

const DELIMITER: char = '#';

/// Upper bound on the characters kept from one segment.
const MAX_SEGMENT_CHARS: usize = 1000;

/// Upper bound on the characters inspected when categorizing a segment.
const MAX_MATCH_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Processor,
    Memory,
    Storage,
    PowerAdapter,
    Keyboard,
    Display,
}

struct CategoryRule {
    slot: Slot,
    pattern: Regex,
}

// Order matters: the first rule that matches decides the slot.
static CATEGORY_RULES: Lazy<Vec<CategoryRule>> = Lazy::new(|| {
    [
        (
            Slot::Processor,
            r"(?i)M\d+\s*(?:Pro|Max|Ultra)?\s*Chip|Core\s*(?:i\d+|Ultra)|CPU|Processor|Ryzen|Threadripper",
        ),
        (
            Slot::Memory,
            r"(?is)\d+\s*GB.{0,50}?(?:Arbeitsspeicher|RAM|Memory|gemeinsam)",
        ),
        (
            Slot::Storage,
            r"(?i)\d+\s*(?:TB|GB)\s*(?:SSD|NVMe|Speicher|Storage)",
        ),
        (
            Slot::PowerAdapter,
            r"(?is)\d+\s?W.{0,50}?(?:Power Adapter|Netzteil|USB-C|Ladegerät)",
        ),
        (Slot::Keyboard, r"(?i)Keyboard|Tastatur"),
        (
            Slot::Display,
            r"(?i)Display|Bildschirm|Retina|Glass|Glas|Monitor|Screen",
        ),
    ]
    .into_iter()
    .map(|(slot, pattern)| CategoryRule {
        slot,
        pattern: Regex::new(pattern).expect("category pattern is valid"),
    })
    .collect()
});

/// Parse a product description into categorized attributes.
///
/// Missing or blank input yields empty attributes.
pub fn parse(description: Option<&str>) -> Attributes {
    let Some(description) = description.filter(|d| !d.trim().is_empty()) else {
        return Attributes::default();
    };

    let mut acc = Accumulator::default();
    acc.base_configuration = base_configuration(description);

    for segment in segments(description) {
        let value = clean_segment(segment.content);
        if value.is_empty() {
            continue;
        }

        match segment.kind {
            SegmentKind::Legal => acc.legal.push(value.to_string()),
            SegmentKind::Standard => acc.categorize(value),
        }
    }

    acc.finish()
}

fn base_configuration(description: &str) -> Option<String> {
    let index = description.find(DELIMITER)?;
    if index == 0 {
        return None;
    }

    let head = description[..index].trim();
    let head = head.strip_suffix(':').map(str::trim).unwrap_or(head);

    (!head.is_empty()).then(|| head.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Standard,
    Legal,
}

#[derive(Debug)]
struct Segment<'a> {
    kind: SegmentKind,
    content: &'a str,
}

/// Split everything after the first delimiter into marked segments.
///
/// A run of two or more delimiters marks a legal segment. A run that is not
/// followed by any content produces nothing.
fn segments(description: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut run = 0usize;

    for (position, part) in description.split(DELIMITER).enumerate() {
        if position == 0 {
            continue;
        }

        run += 1;
        if part.is_empty() {
            continue;
        }

        let kind = if run >= 2 {
            SegmentKind::Legal
        } else {
            SegmentKind::Standard
        };
        out.push(Segment {
            kind,
            content: truncate_chars(part, MAX_SEGMENT_CHARS),
        });
        run = 0;
    }

    out
}

/// Strip whitespace and any trailing note from a raw segment.
fn clean_segment(content: &str) -> &str {
    let trimmed = content.trim();
    let end = note_start(trimmed).unwrap_or(trimmed.len());
    trimmed[..end].trim()
}

/// Byte offset of the first note separator: whitespace followed by `-`, or a newline.
fn note_start(text: &str) -> Option<usize> {
    let mut previous_was_space = false;
    for (index, ch) in text.char_indices() {
        if ch == '\n' {
            return Some(index);
        }
        if ch == '-' && previous_was_space {
            return text[..index].char_indices().next_back().map(|(i, _)| i);
        }
        previous_was_space = ch.is_whitespace();
    }
    None
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[derive(Default)]
struct Accumulator {
    base_configuration: Option<String>,
    processor: Option<String>,
    memory: Option<String>,
    storage: Option<String>,
    power_adapter: Option<String>,
    keyboard: Option<String>,
    display: Option<String>,
    legal: Vec<String>,
    other: Vec<String>,
}

impl Accumulator {
    fn categorize(&mut self, value: &str) {
        let probe = truncate_chars(value, MAX_MATCH_CHARS);
        let matched = CATEGORY_RULES
            .iter()
            .find(|rule| rule.pattern.is_match(probe))
            .map(|rule| rule.slot);

        match matched {
            Some(slot) => {
                let target = self.slot_mut(slot);
                // First match wins; later candidates for the same slot are dropped.
                if target.is_none() {
                    *target = Some(value.to_string());
                }
            }
            None => self.other.push(value.to_string()),
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<String> {
        match slot {
            Slot::Processor => &mut self.processor,
            Slot::Memory => &mut self.memory,
            Slot::Storage => &mut self.storage,
            Slot::PowerAdapter => &mut self.power_adapter,
            Slot::Keyboard => &mut self.keyboard,
            Slot::Display => &mut self.display,
        }
    }

    fn finish(self) -> Attributes {
        Attributes {
            base_configuration: self.base_configuration,
            processor: self.processor,
            memory: self.memory,
            storage: self.storage,
            power_adapter: self.power_adapter,
            keyboard: self.keyboard,
            display: self.display,
            legal: self.legal,
            other: self.other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(description: &str) -> Attributes {
        parse(Some(description))
    }

    #[test]
    fn empty_input_yields_empty_attributes() {
        assert!(parse(None).is_empty());
        assert!(parse_str("").is_empty());
        assert!(parse_str("   \n\t").is_empty());
    }

    #[test]
    fn description_without_delimiter_is_ignored() {
        assert!(parse_str("Apple MacBook Pro with M4 Pro Chip and 48 GB RAM").is_empty());
    }

    #[test]
    fn lone_delimiter_yields_empty_attributes() {
        assert!(parse_str("#").is_empty());
        assert!(parse_str("##").is_empty());
        assert!(parse_str("#   #").is_empty());
    }

    #[test]
    fn parses_reference_description() {
        let attrs = parse_str("Base: #Apple M4 Pro Chip #48 GB RAM ##Copyright notice");

        assert_eq!(attrs.base_configuration.as_deref(), Some("Base"));
        assert_eq!(attrs.processor.as_deref(), Some("Apple M4 Pro Chip"));
        assert_eq!(attrs.memory.as_deref(), Some("48 GB RAM"));
        assert_eq!(attrs.legal, vec!["Copyright notice".to_string()]);
        assert!(attrs.other.is_empty());
        assert!(attrs.storage.is_none());
    }

    #[test]
    fn parses_full_configuration() {
        let description = "MacBook Pro 16\": \
            #Apple M4 Max Chip mit 16-Core CPU \
            #64 GB gemeinsamer Arbeitsspeicher \
            #2 TB SSD Speicher \
            #140W USB-C Power Adapter \
            #Magic Keyboard mit Touch ID - Deutsch \
            #Liquid Retina XDR Display \
            #Thunderbolt 5 Anschlüsse \
            ##Apple Care nicht enthalten";

        let attrs = parse_str(description);

        assert_eq!(attrs.base_configuration.as_deref(), Some("MacBook Pro 16\""));
        assert_eq!(
            attrs.processor.as_deref(),
            Some("Apple M4 Max Chip mit 16-Core CPU")
        );
        assert_eq!(
            attrs.memory.as_deref(),
            Some("64 GB gemeinsamer Arbeitsspeicher")
        );
        assert_eq!(attrs.storage.as_deref(), Some("2 TB SSD Speicher"));
        assert_eq!(attrs.power_adapter.as_deref(), Some("140W USB-C Power Adapter"));
        assert_eq!(attrs.keyboard.as_deref(), Some("Magic Keyboard mit Touch ID"));
        assert_eq!(attrs.display.as_deref(), Some("Liquid Retina XDR Display"));
        assert_eq!(attrs.other, vec!["Thunderbolt 5 Anschlüsse".to_string()]);
        assert_eq!(attrs.legal, vec!["Apple Care nicht enthalten".to_string()]);
    }

    #[test]
    fn leading_delimiter_has_no_base_configuration() {
        let attrs = parse_str("#Intel Core i7");

        assert!(attrs.base_configuration.is_none());
        assert_eq!(attrs.processor.as_deref(), Some("Intel Core i7"));
    }

    #[test]
    fn base_configuration_drops_single_trailing_colon() {
        assert_eq!(
            parse_str("Config ::#x").base_configuration.as_deref(),
            Some("Config :")
        );
        assert!(parse_str(" : #x").base_configuration.is_none());
    }

    #[test]
    fn trailing_notes_are_cut() {
        let attrs = parse_str("#16 GB RAM - upgradable later#Extra line\nsecond line");

        assert_eq!(attrs.memory.as_deref(), Some("16 GB RAM"));
        assert_eq!(attrs.other, vec!["Extra line".to_string()]);
    }

    #[test]
    fn hyphen_inside_word_is_kept() {
        let attrs = parse_str("#Two Thunderbolt/USB-C ports");

        assert_eq!(attrs.other, vec!["Two Thunderbolt/USB-C ports".to_string()]);
    }

    #[test]
    fn whitespace_only_segments_are_discarded() {
        let attrs = parse_str("Base# #  ##\t#Wi-Fi 7");

        assert_eq!(attrs.base_configuration.as_deref(), Some("Base"));
        assert_eq!(attrs.other, vec!["Wi-Fi 7".to_string()]);
        assert!(attrs.legal.is_empty());
    }

    #[test]
    fn leading_hyphen_is_not_a_note() {
        let attrs = parse_str("# - bullet point");

        assert_eq!(attrs.other, vec!["- bullet point".to_string()]);
    }

    #[test]
    fn first_match_per_slot_wins() {
        let attrs = parse_str("#Apple M3 Chip #AMD Ryzen 9 #Retina Display #Studio Display");

        assert_eq!(attrs.processor.as_deref(), Some("Apple M3 Chip"));
        assert_eq!(attrs.display.as_deref(), Some("Retina Display"));
        assert!(attrs.other.is_empty());
    }

    #[test]
    fn legal_segments_are_not_categorized() {
        let attrs = parse_str("##16 GB RAM disclaimer ###Keyboard layout may vary");

        assert!(attrs.memory.is_none());
        assert!(attrs.keyboard.is_none());
        assert_eq!(
            attrs.legal,
            vec![
                "16 GB RAM disclaimer".to_string(),
                "Keyboard layout may vary".to_string()
            ]
        );
    }

    #[test]
    fn categorization_is_case_insensitive() {
        let attrs = parse_str("#apple m2 ultra chip #32gb memory #1tb nvme #deutsche tastatur");

        assert_eq!(attrs.processor.as_deref(), Some("apple m2 ultra chip"));
        assert_eq!(attrs.memory.as_deref(), Some("32gb memory"));
        assert_eq!(attrs.storage.as_deref(), Some("1tb nvme"));
        assert_eq!(attrs.keyboard.as_deref(), Some("deutsche tastatur"));
    }

    #[test]
    fn memory_keyword_needs_a_gigabyte_figure() {
        let attrs = parse_str("#Unified Memory Architecture");

        assert!(attrs.memory.is_none());
        assert_eq!(attrs.other, vec!["Unified Memory Architecture".to_string()]);
    }

    #[test]
    fn power_adapter_matches_german_keyword() {
        let attrs = parse_str("#96 W Ladegerät");

        assert_eq!(attrs.power_adapter.as_deref(), Some("96 W Ladegerät"));
    }

    #[test]
    fn memory_takes_priority_over_storage() {
        let attrs = parse_str("#16 GB Arbeitsspeicher #512 GB SSD");

        assert_eq!(attrs.memory.as_deref(), Some("16 GB Arbeitsspeicher"));
        assert_eq!(attrs.storage.as_deref(), Some("512 GB SSD"));
    }

    #[test]
    fn keyword_beyond_match_window_is_not_seen_but_value_is_kept_whole() {
        let padding = "x".repeat(MAX_MATCH_CHARS);
        let attrs = parse_str(&format!("#{padding} Display"));

        assert!(attrs.display.is_none());
        assert_eq!(attrs.other.len(), 1);
        assert!(attrs.other[0].ends_with("Display"));

        let attrs = parse_str(&format!("#Display {padding}"));
        let display = attrs.display.unwrap();
        assert_eq!(display.chars().count(), MAX_MATCH_CHARS + "Display ".len());
    }

    #[test]
    fn oversized_segment_is_capped() {
        let long = "y".repeat(MAX_SEGMENT_CHARS * 3);
        let attrs = parse_str(&format!("#{long}"));

        assert_eq!(attrs.other[0].chars().count(), MAX_SEGMENT_CHARS);
    }

    #[test]
    fn adversarial_input_completes() {
        let hostile = format!("#{}", "1 GB ".repeat(10_000));
        let attrs = parse_str(&hostile);

        assert_eq!(attrs.other.len(), 1);
    }

    #[test]
    fn multibyte_text_is_handled() {
        let attrs = parse_str("Grundkonfiguration: #Größe über 14\u{2033} - Hinweis #ÄÖÜ");

        assert_eq!(attrs.base_configuration.as_deref(), Some("Grundkonfiguration"));
        assert_eq!(
            attrs.other,
            vec!["Größe über 14\u{2033}".to_string(), "ÄÖÜ".to_string()]
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let description = "Base: #Apple M4 Pro Chip #48 GB RAM #Other ##Legal";

        assert_eq!(parse_str(description), parse_str(description));
    }

    #[test]
    fn helpers_split_and_clean() {
        let found = segments("a#b##c###d#");
        let kinds: Vec<_> = found.iter().map(|s| (s.kind, s.content)).collect();

        assert_eq!(
            kinds,
            vec![
                (SegmentKind::Standard, "b"),
                (SegmentKind::Legal, "c"),
                (SegmentKind::Legal, "d"),
            ]
        );
        assert_eq!(clean_segment("  value -note "), "value");
        assert_eq!(clean_segment("value\tx - y"), "value\tx");
        assert_eq!(note_start("a -b"), Some(1));
        assert_eq!(note_start("a-b"), None);
    }
}
