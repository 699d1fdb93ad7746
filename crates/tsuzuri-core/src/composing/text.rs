use std::sync::Arc;

use super::piece::{input_string, InputPiece, InputStyle};
use super::ComposingCount;
use crate::romaji::{convert_romaji, RomajiTrie};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposingElement {
    pub piece: InputPiece,
    pub style: InputStyle,
}

impl ComposingElement {
    pub fn new(piece: InputPiece, style: InputStyle) -> Self {
        ComposingElement { piece, style }
    }
}

/// The not-yet-committed input.
///
/// `input` is the log of typed pieces; `convert_target` is its rendering
/// (kana for romaji runs). The cursor is counted in characters of the
/// rendering, not in pieces.
#[derive(Debug, Clone)]
pub struct ComposingText {
    input: Vec<ComposingElement>,
    convert_target: String,
    cursor: usize,
    table: Arc<RomajiTrie>,
}

impl Default for ComposingText {
    fn default() -> Self {
        ComposingText::new(RomajiTrie::default_table())
    }
}

struct Renderer<'a> {
    table: &'a RomajiTrie,
    composed: String,
    pending: String,
}

impl Renderer<'_> {
    fn push(&mut self, element: &ComposingElement) {
        match (element.style, element.piece) {
            (_, InputPiece::CompositionSeparator) => self.drain(true),
            (
                InputStyle::Roman2Kana,
                InputPiece::Key {
                    intention: Some(intention),
                    ..
                },
            ) => {
                self.drain(true);
                self.composed.push(intention);
            }
            (InputStyle::Roman2Kana, InputPiece::Key { input: c, .. })
            | (InputStyle::Roman2Kana, InputPiece::Character(c))
                if c.is_ascii_graphic() && !c.is_ascii_uppercase() =>
            {
                self.pending.push(c);
                self.drain(false);
            }
            (_, piece) => {
                self.drain(true);
                if let Some(c) = piece.input_char(true) {
                    self.composed.push(c);
                }
            }
        }
    }

    fn drain(&mut self, force: bool) {
        if self.pending.is_empty() {
            return;
        }
        let result = convert_romaji(self.table, "", &self.pending, force);
        self.composed.push_str(&result.composed);
        self.pending = result.pending;
    }

    fn finish(mut self) -> String {
        self.composed.push_str(&self.pending);
        self.composed
    }
}

fn render(table: &RomajiTrie, elements: &[ComposingElement]) -> String {
    let mut renderer = Renderer {
        table,
        composed: String::new(),
        pending: String::new(),
    };
    for element in elements {
        renderer.push(element);
    }
    renderer.finish()
}

impl ComposingText {
    pub fn new(table: Arc<RomajiTrie>) -> Self {
        ComposingText {
            input: Vec::new(),
            convert_target: String::new(),
            cursor: 0,
            table,
        }
    }

    /// Swap the romaji table and re-render.
    pub fn set_table(&mut self, table: Arc<RomajiTrie>) {
        self.table = table;
        self.rerender();
        self.cursor = self.cursor.min(self.len());
    }

    pub fn convert_target(&self) -> &str {
        &self.convert_target
    }

    pub fn input(&self) -> &[ComposingElement] {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length of the convert target in characters.
    pub fn len(&self) -> usize {
        self.convert_target.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor == self.len()
    }

    pub fn is_at_start(&self) -> bool {
        self.cursor == 0
    }

    /// The raw typed string.
    pub fn input_string(&self, prefer_intention: bool) -> String {
        input_string(self.input.iter().map(|e| e.piece), prefer_intention)
    }

    pub fn insert_at_cursor(&mut self, elements: impl IntoIterator<Item = ComposingElement>) {
        let inserted: Vec<ComposingElement> = elements.into_iter().collect();
        if inserted.is_empty() {
            return;
        }
        let index = self.split_at(self.cursor);
        let end = index + inserted.len();
        self.input.splice(index..index, inserted);
        self.rerender();
        self.cursor = if end == self.input.len() {
            self.len()
        } else {
            render(&self.table, &self.input[..end])
                .chars()
                .count()
                .min(self.len())
        };
    }

    pub fn insert_str_at_cursor(&mut self, text: &str, style: InputStyle) {
        self.insert_at_cursor(
            text.chars()
                .map(|c| ComposingElement::new(InputPiece::Character(c), style)),
        );
    }

    /// Insert a separator unless the buffer already ends with one.
    pub fn insert_separator(&mut self, style: InputStyle) {
        if matches!(
            self.input.last(),
            Some(ComposingElement {
                piece: InputPiece::CompositionSeparator,
                ..
            })
        ) {
            return;
        }
        self.insert_at_cursor([ComposingElement::new(
            InputPiece::CompositionSeparator,
            style,
        )]);
    }

    /// Delete `count` rendered characters left of the cursor.
    pub fn delete_backward(&mut self, count: usize) {
        let count = count.min(self.cursor);
        if count == 0 {
            return;
        }
        let end = self.split_at(self.cursor);
        let before = self.input.len();
        let start = self.split_at(self.cursor - count);
        // Splitting at `start` may have rewritten pieces left of `end`.
        let end = end + self.input.len() - before;
        self.input.drain(start..end);
        self.rerender();
        self.cursor = (self.cursor - count).min(self.len());
    }

    /// Move the cursor by `count` characters, clamped to the text.
    pub fn move_cursor(&mut self, count: isize) -> usize {
        let target = self.cursor as isize + count;
        self.cursor = target.clamp(0, self.len() as isize) as usize;
        self.cursor
    }

    /// The part of the buffer left of the cursor.
    pub fn prefix_to_cursor(&self) -> ComposingText {
        let mut prefix = self.clone();
        let index = prefix.split_at(prefix.cursor);
        prefix.input.truncate(index);
        prefix.rerender();
        prefix.cursor = prefix.len();
        prefix
    }

    /// Drop the prefix a committed candidate consumed.
    pub fn prefix_complete(&mut self, count: ComposingCount) {
        let old_len = self.len();
        let consumed = match count {
            ComposingCount::InputCount(n) => n.min(self.input.len()),
            ComposingCount::SurfaceCount(n) => self.split_at(n.min(old_len)),
        };
        self.input.drain(..consumed);
        // A boundary left at the front separates nothing.
        let separators = self
            .input
            .iter()
            .take_while(|e| e.piece == InputPiece::CompositionSeparator)
            .count();
        self.input.drain(..separators);
        self.rerender();
        let new_len = self.len();
        self.cursor = self
            .cursor
            .saturating_sub(old_len.saturating_sub(new_len))
            .min(new_len);
    }

    /// Whether a candidate consuming `count` would use up the whole buffer.
    pub fn is_whole(&self, count: ComposingCount) -> bool {
        let mut rest = self.clone();
        rest.prefix_complete(count);
        rest.is_empty()
    }

    pub fn stop_composition(&mut self) {
        self.input.clear();
        self.convert_target.clear();
        self.cursor = 0;
    }

    fn rerender(&mut self) {
        self.convert_target = render(&self.table, &self.input);
    }

    /// Find the piece index whose prefix renders to exactly `pos`
    /// characters without changing the full rendering.
    ///
    /// When `pos` falls inside an unfinished romaji run, the pieces up to the
    /// next clean boundary are rewritten as direct characters first, so the
    /// visible text stays the same.
    fn split_at(&mut self, pos: usize) -> usize {
        for k in 0..=self.input.len() {
            let prefix = render(&self.table, &self.input[..k]);
            let prefix_len = prefix.chars().count();
            if prefix_len < pos {
                continue;
            }
            let rest = render(&self.table, &self.input[k..]);
            if prefix.len() + rest.len() != self.convert_target.len()
                || !self.convert_target.starts_with(&prefix)
                || !self.convert_target.ends_with(&rest)
            {
                continue;
            }
            if prefix_len == pos {
                return k;
            }
            let literal = prefix
                .chars()
                .map(|c| ComposingElement::new(InputPiece::Character(c), InputStyle::Direct));
            self.input.splice(..k, literal);
            return pos;
        }
        self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composing::Modifiers;

    fn typed(s: &str) -> ComposingText {
        let mut text = ComposingText::default();
        text.insert_at_cursor(
            s.chars()
                .map(|c| ComposingElement::new(InputPiece::key(c), InputStyle::Roman2Kana)),
        );
        text
    }

    fn type_more(text: &mut ComposingText, s: &str) {
        for c in s.chars() {
            text.insert_at_cursor([ComposingElement::new(
                InputPiece::key(c),
                InputStyle::Roman2Kana,
            )]);
        }
    }

    #[test]
    fn romaji_renders_to_kana() {
        let text = typed("kyouha");
        assert_eq!(text.convert_target(), "きょうは");
        assert_eq!(text.cursor(), 4);
        assert!(text.is_at_end());
    }

    #[test]
    fn pending_tail_stays_raw() {
        let mut text = typed("ka");
        type_more(&mut text, "n");
        assert_eq!(text.convert_target(), "かn");
        assert_eq!(text.cursor(), 2);
        type_more(&mut text, "a");
        assert_eq!(text.convert_target(), "かな");
    }

    #[test]
    fn separator_flushes_and_is_not_duplicated() {
        let mut text = typed("n");
        text.insert_separator(InputStyle::Roman2Kana);
        text.insert_separator(InputStyle::Roman2Kana);
        assert_eq!(text.input().len(), 2);
        type_more(&mut text, "a");
        assert_eq!(text.convert_target(), "んあ");
    }

    #[test]
    fn intention_and_uppercase() {
        let mut text = typed("a");
        text.insert_at_cursor([ComposingElement::new(
            InputPiece::Key {
                intention: Some('、'),
                input: ',',
                modifiers: Modifiers::NONE,
            },
            InputStyle::Roman2Kana,
        )]);
        type_more(&mut text, "A");
        assert_eq!(text.convert_target(), "あ、A");
        assert_eq!(text.input_string(false), "a,A");
        assert_eq!(text.input_string(true), "a、A");
    }

    #[test]
    fn direct_input_is_literal() {
        let mut text = ComposingText::default();
        text.insert_str_at_cursor("ka", InputStyle::Direct);
        assert_eq!(text.convert_target(), "ka");
    }

    #[test]
    fn move_cursor_clamps() {
        let mut text = typed("aiu");
        assert_eq!(text.move_cursor(-5), 0);
        assert!(text.is_at_start());
        assert_eq!(text.move_cursor(10), 3);
    }

    #[test]
    fn insert_in_middle() {
        let mut text = typed("aiu");
        text.move_cursor(-1);
        type_more(&mut text, "e");
        assert_eq!(text.convert_target(), "あいえう");
        assert_eq!(text.cursor(), 3);
    }

    #[test]
    fn split_inside_romaji_run_keeps_text() {
        let mut text = typed("kya");
        text.move_cursor(-1);
        type_more(&mut text, "a");
        assert_eq!(text.convert_target(), "きあゃ");
        assert_eq!(text.cursor(), 2);
    }

    #[test]
    fn delete_backward_at_end_and_middle() {
        let mut text = typed("kan");
        text.delete_backward(1);
        assert_eq!(text.convert_target(), "か");

        let mut text = typed("kyaku");
        text.move_cursor(-1);
        text.delete_backward(1);
        assert_eq!(text.convert_target(), "きく");
        assert_eq!(text.cursor(), 1);
    }

    #[test]
    fn delete_backward_is_clamped_to_cursor() {
        let mut text = typed("aiu");
        text.move_cursor(-2);
        text.delete_backward(5);
        assert_eq!(text.convert_target(), "いう");
        assert_eq!(text.cursor(), 0);
    }

    #[test]
    fn prefix_complete_by_surface_and_input() {
        let mut text = typed("kyouha");
        text.prefix_complete(ComposingCount::SurfaceCount(2));
        assert_eq!(text.convert_target(), "うは");
        assert_eq!(text.cursor(), 2);

        let mut text = typed("kaki");
        text.prefix_complete(ComposingCount::InputCount(2));
        assert_eq!(text.convert_target(), "き");
    }

    #[test]
    fn prefix_complete_never_grows() {
        for s in ["kitte", "kanna", "shinnyuu", "a-b"] {
            let text = typed(s);
            for n in 0..=text.input().len() {
                let mut rest = text.clone();
                rest.prefix_complete(ComposingCount::InputCount(n));
                assert!(rest.len() <= text.len(), "{s} {n}");
            }
        }
    }

    #[test]
    fn whole_and_prefix_to_cursor() {
        let mut text = typed("kaki");
        assert!(text.is_whole(ComposingCount::InputCount(4)));
        assert!(text.is_whole(ComposingCount::SurfaceCount(2)));
        assert!(!text.is_whole(ComposingCount::SurfaceCount(1)));
        text.move_cursor(-1);
        let prefix = text.prefix_to_cursor();
        assert_eq!(prefix.convert_target(), "か");
        assert_eq!(text.convert_target(), "かき");
    }

    #[test]
    fn trailing_separator_goes_with_the_last_segment() {
        let mut text = typed("kyou");
        text.insert_separator(InputStyle::Roman2Kana);
        assert!(text.is_whole(ComposingCount::SurfaceCount(3)));
        text.prefix_complete(ComposingCount::SurfaceCount(3));
        assert!(text.is_empty());
    }

    #[test]
    fn stop_composition_clears() {
        let mut text = typed("aiu");
        text.stop_composition();
        assert!(text.is_empty());
        assert_eq!(text.convert_target(), "");
        assert_eq!(text.cursor(), 0);
    }
}
