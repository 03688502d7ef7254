//! Word splitting and character legalization.

/// Split a raw label into words by delimiter runs, case transitions, and acronym
/// boundaries. Never returns an empty vector: an input with no identifier
/// characters at all yields a single placeholder word.
pub fn split_into_words(raw: &str) -> Vec<String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if !c.is_alphanumeric() {
            // Delimiter: run of non-identifier characters ends the current word.
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            i += 1;
            continue;
        }

        if current.is_empty() {
            current.push(c);
            i += 1;
            continue;
        }

        let prev = current.chars().last().unwrap();

        let prev_lower = prev.is_lowercase();
        let prev_upper = prev.is_uppercase();
        let cur_upper = c.is_uppercase();
        let cur_lower = c.is_lowercase();

        if prev_lower && cur_upper {
            // Case transition: lowercase -> uppercase starts a new word.
            words.push(std::mem::take(&mut current));
            current.push(c);
        } else if prev_upper && cur_upper {
            // Could be the middle of an acronym run, or the boundary between an
            // acronym and the next word (checked by peeking one character ahead).
            let next_is_lower = chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false);
            if next_is_lower {
                // Acronym boundary: the last uppercase letter starts the next word.
                words.push(std::mem::take(&mut current));
                current.push(c);
            } else {
                current.push(c);
            }
        } else if prev_upper && cur_lower {
            current.push(c);
        } else {
            current.push(c);
        }

        i += 1;
    }

    if !current.is_empty() {
        words.push(current);
    }

    if words.is_empty() {
        words.push("empty".to_string());
    }

    words
}

/// Replace characters illegal per `is_part` with `_`, ensure the first character
/// satisfies `is_start` (prefixing `"The"` when a name starts with a digit, the
/// target-agnostic escape for a start-illegal leading character), and fall back to
/// `fallback` if the result is empty.
pub fn legalize_characters(
    name: &str,
    is_start: impl Fn(char) -> bool,
    is_part: impl Fn(char) -> bool,
    fallback: &str,
) -> String {
    if name.is_empty() {
        return fallback.to_string();
    }

    let mut legal_parts: String = name
        .chars()
        .map(|c| if is_part(c) { c } else { '_' })
        .collect();

    let first = legal_parts.chars().next().unwrap();
    if !is_start(first) {
        if first.is_ascii_digit() {
            legal_parts = format!("The{legal_parts}");
        } else {
            legal_parts = format!("_{legal_parts}");
        }
    }

    if legal_parts.is_empty() {
        fallback.to_string()
    } else {
        legal_parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_delimiters() {
        assert_eq!(split_into_words("not in eggs"), vec!["not", "in", "eggs"]);
        assert_eq!(split_into_words("10 km"), vec!["10", "km"]);
    }

    #[test]
    fn splits_on_case_transitions() {
        assert_eq!(split_into_words("nextEvolution"), vec!["next", "Evolution"]);
    }

    #[test]
    fn splits_acronym_boundaries() {
        assert_eq!(split_into_words("HTMLParser"), vec!["HTML", "Parser"]);
        assert_eq!(split_into_words("ID"), vec!["ID"]);
    }

    #[test]
    fn empty_input_yields_placeholder() {
        assert_eq!(split_into_words("!!!"), vec!["empty"]);
    }

    #[test]
    fn legalize_prefixes_leading_digit() {
        let is_start = |c: char| c.is_alphabetic();
        let is_part = |c: char| c.is_alphanumeric();
        assert_eq!(legalize_characters("10KM", is_start, is_part, "empty"), "The10KM");
    }

    #[test]
    fn legalize_replaces_illegal_part_characters() {
        let is_start = |c: char| c.is_alphabetic();
        let is_part = |c: char| c.is_alphanumeric();
        assert_eq!(legalize_characters("a-b", is_start, is_part, "empty"), "a_b");
    }
}
