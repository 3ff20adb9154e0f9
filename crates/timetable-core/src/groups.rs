//! Class-group (section) notation
//!
//! Cells write groups in several shorthand forms. Everything is normalized to
//! full `PROGRAM-SECTION` tokens joined with ` & `:
//!
//! - `BSDS/BSAI-6A` -> `BSDS-6A & BSAI-6A`
//! - `BSAI-1A/BSDS-1A` -> `BSAI-1A & BSDS-1A`
//! - `BSSE-2A,2B,2C` -> `BSSE-2A & BSSE-2B & BSSE-2C`

use crate::patterns;

/// Rewrites are repeated until the text stops changing; this bounds the loop
/// for pathological input.
const MAX_PASSES: usize = 8;

/// Check if a line names at least one class group
pub fn is_group_line(line: &str) -> bool {
    patterns::group_line().is_some_and(|re| re.is_match(line))
}

/// Expand shorthand group notation into `&`-joined full tokens.
///
/// Expanding an already expanded string returns it unchanged.
pub fn expand_group_notation(text: &str) -> String {
    let mut text = text.trim().to_string();

    if let Some(re) = patterns::shared_section() {
        text = rewrite_until_stable(&text, |s| re.replace_all(s, "$1-$3 & $2-$3").into_owned());
    }

    if let Some(re) = patterns::slashed_groups() {
        text = rewrite_until_stable(&text, |s| re.replace_all(s, "$1 & $2").into_owned());
    }

    if let Some(re) = patterns::comma_sections() {
        text = re
            .replace_all(&text, |caps: &regex::Captures<'_>| expand_comma_list(&caps[0]))
            .into_owned();
    }

    text
}

fn rewrite_until_stable(text: &str, rewrite: impl Fn(&str) -> String) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_PASSES {
        let next = rewrite(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// `BSSE-2A, 2B, BSAI-3C` -> `BSSE-2A & BSSE-2B & BSAI-3C`
fn expand_comma_list(list: &str) -> String {
    let mut prefix = "";
    let mut tokens = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((program, _)) => {
                prefix = program;
                tokens.push(part.to_string());
            }
            None => tokens.push(format!("{}-{}", prefix, part)),
        }
    }
    tokens.join(" & ")
}

/// Split an `&`-joined group string into individual tokens.
///
/// A bare suffix such as `5B` (or `-5B`) inherits the most recent program
/// prefix seen in the same string. Duplicates are dropped, order is kept.
pub fn parse_groups(text: &str) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    let mut prefix = String::new();

    for part in text.split('&').map(str::trim).filter(|p| !p.is_empty()) {
        let token = match part.split_once('-') {
            Some((program, _)) if program.chars().any(|c| c.is_alphabetic()) => {
                prefix = program.trim().to_string();
                part.to_string()
            }
            _ => {
                let suffix = part.trim_start_matches('-').trim();
                if prefix.is_empty() {
                    part.to_string()
                } else {
                    format!("{}-{}", prefix, suffix)
                }
            }
        };

        if !groups.contains(&token) {
            groups.push(token);
        }
    }

    groups
}

/// Expand a cell line and return its individual group tokens
pub fn group_tokens(line: &str) -> Vec<String> {
    parse_groups(&expand_group_notation(line))
}
