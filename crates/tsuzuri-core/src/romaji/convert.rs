use super::trie::{RomajiTrie, TrieLookupResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomajiConvertResult {
    pub composed: String,
    pub pending: String,
}

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'i' | 'u' | 'e' | 'o')
}

/// Drain as much of `pending` into kana as the table allows.
///
/// With `force`, ambiguous sequences are settled immediately: a trailing
/// "n" becomes "ん" and unmatched letters are emitted as they are.
pub fn convert_romaji(
    trie: &RomajiTrie,
    composed: &str,
    pending: &str,
    force: bool,
) -> RomajiConvertResult {
    let mut composed = composed.to_string();
    let mut pending = pending.to_string();

    let mut changed = true;
    while !pending.is_empty() && changed {
        changed = false;
        match trie.lookup(&pending) {
            TrieLookupResult::Exact(kana) => {
                composed.push_str(&kana);
                pending.clear();
                changed = true;
            }
            TrieLookupResult::ExactAndPrefix(kana) => {
                if force {
                    composed.push_str(&kana);
                    pending.clear();
                    changed = true;
                }
            }
            TrieLookupResult::Prefix if !force => break,
            TrieLookupResult::Prefix | TrieLookupResult::None => {
                changed = drain_unmatched(trie, &mut composed, &mut pending, force);
            }
        }
    }

    RomajiConvertResult { composed, pending }
}

/// `pending` as a whole matched nothing. Peel off the longest matching
/// head, then sokuon and hatsuon, and finally (when forced) a raw char.
/// Returns whether anything moved.
fn drain_unmatched(
    trie: &RomajiTrie,
    composed: &mut String,
    pending: &mut String,
    force: bool,
) -> bool {
    // A head that is both exact and a prefix is taken here: the full
    // sequence already failed, so no longer match can follow.
    for len in (1..pending.len()).rev() {
        if !pending.is_char_boundary(len) {
            continue;
        }
        if let TrieLookupResult::Exact(kana) | TrieLookupResult::ExactAndPrefix(kana) =
            trie.lookup(&pending[..len])
        {
            composed.push_str(&kana);
            pending.drain(..len);
            return true;
        }
    }

    let mut chars = pending.chars();
    let (first, second) = match (chars.next(), chars.next()) {
        (Some(first), Some(second)) => (first, second),
        (Some(first), None) => {
            if first == 'n' {
                if !force {
                    // Could still become "na", "nya", ...
                    return false;
                }
                composed.push('ん');
            } else {
                composed.push(first);
            }
            pending.clear();
            return true;
        }
        _ => return false,
    };

    if first == second && first.is_ascii_alphabetic() && first != 'n' && !is_vowel(first) {
        composed.push('っ');
    } else if first == 'n' && !is_vowel(second) && second != 'n' && second != 'y' {
        composed.push('ん');
    } else if force {
        composed.push(first);
    } else {
        return false;
    }
    pending.drain(..first.len_utf8());
    true
}
