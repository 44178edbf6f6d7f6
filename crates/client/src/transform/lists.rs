//! Splitting free-text lists into items.
//!
//! Every call site names its delimiter grammar explicitly so that two
//! routes never disagree by accident.

/// Delimiter grammar for [`split_list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListGrammar {
    /// Bullets (`•`) and line breaks.
    Eligibility,
    /// `;`, `,` and line breaks. Hyphens never split, and a comma between
    /// two digits (`1,000`) is kept.
    Requirements,
    /// Every `,` `;` `•` `-` `*` and line break splits.
    Loose,
    /// `,` `;` and line breaks.
    Tags,
}

const BULLETS: &[char] = &['•', '·', '-', '*'];

impl ListGrammar {
    fn splits_at(self, prev: Option<char>, c: char, next: Option<char>) -> bool {
        match c {
            '\n' | '\r' => true,
            '•' => matches!(self, ListGrammar::Eligibility | ListGrammar::Loose),
            ';' => !matches!(self, ListGrammar::Eligibility),
            ',' => match self {
                ListGrammar::Eligibility => false,
                ListGrammar::Requirements => {
                    !(prev.is_some_and(|p| p.is_ascii_digit()) && next.is_some_and(|n| n.is_ascii_digit()))
                }
                ListGrammar::Loose | ListGrammar::Tags => true,
            },
            '-' | '*' => self == ListGrammar::Loose,
            _ => false,
        }
    }
}

/// Split `text` into trimmed, non-empty items using `grammar`.
///
/// Leading bullet markers are stripped from each item.
pub fn split_list(text: &str, grammar: ListGrammar) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut items = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();

        if grammar.splits_at(prev, c, next) {
            push_item(&mut items, &current);
            current.clear();
        } else {
            current.push(c);
        }
    }
    push_item(&mut items, &current);

    items
}

fn push_item(items: &mut Vec<String>, raw: &str) {
    let item = raw.trim().trim_start_matches(BULLETS).trim();
    if !item.is_empty() {
        items.push(item.to_string());
    }
}
