use tsuzuri_core::candidate::{Candidate, DictEntry};
use tsuzuri_core::composing::{ComposingCount, InputPiece, InputStyle};

use super::{manager, texts, type_romaji, Call, FixedContext};
use crate::input_state::InputState;
use crate::segments::{
    prediction_candidates, CandidateWindow, FocusState, NoContext, Transliteration, PREDICTION_LIMIT,
};

#[test]
fn first_clause_candidates_lead_until_segments_are_edited() {
    let mut m = manager("");
    type_romaji(&mut m, "kyouka");
    assert_eq!(m.convert_target(), "きょうか");
    let list = m.candidates().unwrap();
    let list = texts(&list);
    assert_eq!(&list[..2], ["今日", "京"]);
    assert!(list.ends_with(&["きょうか", "キョウカ"]));

    m.edit_segment(-1, &NoContext);
    let list = m.candidates().unwrap();
    assert_eq!(texts(&list)[0], "今日");
    assert!(!texts(&list).contains(&"きょうか"));
    assert!(matches!(
        m.engine().calls.last(),
        Some(Call::Request { target, .. }) if target == "きょう"
    ));
}

#[test]
fn whole_first_clause_uses_main_results() {
    let mut m = manager("");
    type_romaji(&mut m, "kyou");
    let raw = m.raw_candidates().unwrap().clone();
    assert_eq!(m.candidates().unwrap(), raw.main_results);
}

#[test]
fn edit_segment_from_end_restarts_at_the_left() {
    let mut m = manager("");
    type_romaji(&mut m, "kyouka");
    m.edit_segment(1, &NoContext);
    assert_eq!(m.composing_text().cursor(), 1);
    assert_eq!(texts(&m.candidates().unwrap())[0], "木");

    // Once edited, further growth extends the segment.
    m.edit_segment(1, &NoContext);
    assert_eq!(m.composing_text().cursor(), 2);
}

#[test]
fn edit_segment_never_leaves_cursor_at_start() {
    let mut m = manager("");
    type_romaji(&mut m, "kyou");
    m.edit_segment(-10, &NoContext);
    assert_eq!(m.composing_text().cursor(), 1);
}

#[test]
fn selecting_marked_text_splits_at_the_candidate() {
    let mut m = manager("");
    type_romaji(&mut m, "kyouka");
    m.edit_segment(-1, &NoContext);
    let marked = m.get_current_marked_text(&InputState::Selecting);
    assert_eq!(marked.elements.len(), 2);
    assert_eq!(marked.elements[0].content, "今日");
    assert_eq!(marked.elements[0].focus, FocusState::Focused);
    assert_eq!(marked.elements[1].content, "か");
    assert_eq!(marked.elements[1].focus, FocusState::Unfocused);
    assert_eq!(marked.selection, Some(2));
    assert_eq!(m.selection_index(), Some(0));
}

#[test]
fn prefix_commit_requests_rest_with_context() {
    let mut m = manager("");
    type_romaji(&mut m, "kyouka");
    m.edit_segment(-1, &NoContext);
    m.select_row(0);
    let chosen = m.selected_candidate().unwrap();
    m.prefix_candidate_committed(&chosen, "昨日と");

    assert_eq!(m.convert_target(), "か");
    let calls = &m.engine().calls;
    assert!(calls.contains(&Call::SetCompleted("今日".into())));
    assert!(calls.contains(&Call::UpdateLearning("今日".into())));
    assert_eq!(
        calls.last(),
        Some(&Call::Request {
            target: "か".into(),
            left_context: Some("昨日と今日".into()),
            rich: true,
        })
    );
    assert_eq!(m.selection_index(), None);
}

#[test]
fn live_conversion_marked_text() {
    let mut m = manager("");
    type_romaji(&mut m, "kyou");
    assert_eq!(m.get_current_marked_text(&InputState::Composing).text(), "今日");
    assert_eq!(
        m.get_current_candidate_window(&InputState::Composing),
        CandidateWindow::Hidden
    );

    // After a deletion the reading is shown.
    m.delete_backward(1, &NoContext);
    assert_eq!(m.get_current_marked_text(&InputState::Composing).text(), "きょ");
}

#[test]
fn lean_mode_shows_single_candidate_window() {
    let mut m = manager("[conversion]\nlive_conversion = false\n");
    type_romaji(&mut m, "kyou");
    assert_eq!(m.get_current_marked_text(&InputState::Composing).text(), "きょう");
    match m.get_current_candidate_window(&InputState::Composing) {
        CandidateWindow::Composing {
            candidates,
            selection,
        } => {
            assert_eq!(texts(&candidates), ["今日"]);
            assert_eq!(selection, 0);
        }
        other => panic!("unexpected window {other:?}"),
    }
}

#[test]
fn previewing_shows_whole_candidate_only() {
    let mut m = manager("");
    type_romaji(&mut m, "kyou");
    assert_eq!(m.get_current_marked_text(&InputState::Previewing).text(), "今日");
    type_romaji(&mut m, "ka");
    // No main result covers きょうか except the kana fallbacks.
    assert_eq!(m.get_current_marked_text(&InputState::Previewing).text(), "きょうか");
}

#[test]
fn delete_moves_cursor_to_end_first() {
    let mut m = manager("");
    type_romaji(&mut m, "kyouka");
    m.edit_segment(-1, &NoContext);
    m.delete_backward(1, &NoContext);
    assert_eq!(m.convert_target(), "きょう");
    assert!(m.composing_text().is_at_end());
    // Segment editing was reset, so first-clause ordering applies again.
    type_romaji(&mut m, "ka");
    assert!(texts(&m.candidates().unwrap()).contains(&"きょうか"));
}

#[test]
fn separator_is_never_doubled() {
    let mut m = manager("");
    type_romaji(&mut m, "ka");
    m.insert_separator(InputStyle::Roman2Kana, false, &NoContext);
    m.insert_separator(InputStyle::Roman2Kana, false, &NoContext);
    let separators = m
        .composing_text()
        .input()
        .iter()
        .filter(|e| e.piece == InputPiece::CompositionSeparator)
        .count();
    assert_eq!(separators, 1);
}

#[test]
fn separator_flushes_trailing_n() {
    let mut m = manager("");
    type_romaji(&mut m, "kan");
    assert_eq!(m.convert_target(), "かn");
    m.insert_separator(InputStyle::Roman2Kana, true, &NoContext);
    assert_eq!(m.convert_target(), "かん");
}

#[test]
fn user_dictionary_is_imported_per_request() {
    let mut m = manager(
        "[[user_dictionary]]\nword = \"綴\"\nreading = \"つづり\"\n\
         [[system_user_dictionary]]\nword = \"綴り\"\nreading = \"つづり\"\n",
    );
    type_romaji(&mut m, "tuduri");
    let list = m.candidates().unwrap();
    assert!(texts(&list)[..2].contains(&"綴"));
    assert!(texts(&list)[..2].contains(&"綴り"));
    assert!(m
        .engine()
        .calls
        .iter()
        .any(|c| matches!(c, Call::Import { entries: 2, shortcuts } if *shortcuts > 0)));
    let messages: Vec<&str> = m.debug_messages().take(2).collect();
    assert_eq!(messages, ["systemUserDictionaryCount: 1", "userDictionaryCount: 1"]);
}

#[test]
fn date_shortcuts_reach_the_engine() {
    let mut m = manager("");
    type_romaji(&mut m, "kotosi");
    let list = m.candidates().unwrap();
    assert!(texts(&list).iter().any(|t| t.ends_with('年')));
}

#[test]
fn left_context_uses_last_line_trimmed() {
    let mut m = manager("");
    m.insert_str("か", InputStyle::Direct, &FixedContext("first line\n   second"));
    assert!(matches!(
        m.engine().calls.last(),
        Some(Call::Request { left_context: Some(left), .. }) if left == "second"
    ));
}

#[test]
fn emptied_buffer_stops_engine() {
    let mut m = manager("");
    type_romaji(&mut m, "a");
    m.delete_backward(1, &NoContext);
    assert!(m.is_empty());
    assert!(m.raw_candidates().is_none());
    assert_eq!(m.engine().calls.last(), Some(&Call::Stop));
}

#[test]
fn commit_marked_text_learns_the_shown_candidate() {
    let mut m = manager("");
    type_romaji(&mut m, "kyou");
    let committed = m.commit_marked_text(&InputState::Composing);
    assert_eq!(committed, "今日");
    assert!(m.is_empty());
    assert!(m.engine().calls.contains(&Call::UpdateLearning("今日".into())));

    m.deactivate();
    assert_eq!(m.engine().inner.learned().len(), 1);
}

#[test]
fn stop_japanese_input_commits_learning_but_keeps_buffer() {
    let mut m = manager("");
    type_romaji(&mut m, "ki");
    m.stop_japanese_input();
    assert_eq!(m.engine().calls.last(), Some(&Call::CommitLearning));
    assert!(m.raw_candidates().is_none());
    assert_eq!(m.convert_target(), "き");
}

#[test]
fn forget_memory_targets_selection() {
    let mut m = manager("");
    type_romaji(&mut m, "kyou");
    m.forget_memory();
    assert!(!m.engine().calls.iter().any(|c| matches!(c, Call::Forget(_))));

    m.select_row(1);
    m.forget_memory();
    assert_eq!(m.engine().calls.last(), Some(&Call::Forget("京".into())));
    assert!(m
        .debug_messages()
        .next()
        .unwrap()
        .starts_with("forgetMemory: forget"));
}

#[test]
fn debug_ring_is_bounded_and_newest_first() {
    let mut m = manager("");
    for i in 0..150 {
        m.append_debug_message(&format!("line {i}\nmore"));
    }
    let messages: Vec<&str> = m.debug_messages().collect();
    assert_eq!(messages.len(), 100);
    assert_eq!(messages[0], "line 149\\nmore");
    assert_eq!(messages[99], "line 50\\nmore");
}

#[test]
fn transliterations_of_the_whole_buffer() {
    let mut m = manager("");
    type_romaji(&mut m, "kyou");
    let state = InputState::Composing;
    let katakana = m.transliterated_candidate(&state, Transliteration::Katakana);
    assert_eq!(katakana.text, "キョウ");
    assert_eq!(katakana.composing_count, ComposingCount::InputCount(4));
    assert_eq!(
        m.transliterated_candidate(&state, Transliteration::HalfWidthKatakana).text,
        "ｷｮｳ"
    );
    assert_eq!(
        m.transliterated_candidate(&state, Transliteration::FullWidthRoman).text,
        "ｋｙｏｕ"
    );
    assert_eq!(
        m.transliterated_candidate(&state, Transliteration::HalfWidthRoman).text,
        "kyou"
    );
}

#[test]
fn transliteration_of_selected_reading() {
    let mut m = manager("");
    type_romaji(&mut m, "kyouka");
    m.edit_segment(-1, &NoContext);
    m.select_row(0);
    let hiragana = m.transliterated_candidate(&InputState::Selecting, Transliteration::Hiragana);
    assert_eq!(hiragana.text, "きょう");
    assert_eq!(hiragana.composing_count, ComposingCount::SurfaceCount(3));
}

fn source(text: &str, ruby: &str) -> Candidate {
    Candidate::from_entries(
        vec![DictEntry::proper_noun(text, ruby, 0.0)],
        ComposingCount::SurfaceCount(ruby.chars().count()),
    )
}

#[test]
fn prediction_matches_in_source_order() {
    let sources = [
        source("無関係", "ことば"),
        source("完全一致", "かな"),
        source("候補1", "かなく"),
        source("候補2", "かなる"),
        source("候補3", "かなり"),
        source("候補4", "かなよ"),
    ];
    let found = prediction_candidates("かな", &sources, PREDICTION_LIMIT);
    let display: Vec<&str> = found.iter().map(|p| p.display_text.as_str()).collect();
    let append: Vec<&str> = found.iter().map(|p| p.append_text.as_str()).collect();
    assert_eq!(display, ["候補1", "候補2", "候補3"]);
    assert_eq!(append, ["く", "る", "り"]);
}

#[test]
fn prediction_ignores_trailing_romaji_letter() {
    let found = prediction_candidates("かなa", &[source("候補A", "かなみ")], PREDICTION_LIMIT);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].append_text, "み");

    assert!(prediction_candidates("かa", &[source("候補A", "かな")], PREDICTION_LIMIT).is_empty());
}

#[test]
fn prediction_requests_follow_debug_flag() {
    let mut m = manager("[debug]\npredictive_typing = true\n");
    type_romaji(&mut m, "kyou");
    let found = m.request_prediction_candidates();
    let display: Vec<&str> = found.iter().map(|p| p.display_text.as_str()).collect();
    assert_eq!(display, ["今日は", "教会"]);
    assert_eq!(found[1].append_text, "かい");

    let mut m = manager("");
    type_romaji(&mut m, "kyou");
    assert!(m.request_prediction_candidates().is_empty());
}
