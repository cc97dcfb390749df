// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::editing::Document;
use crate::layout::ParagraphList;

use super::utils::{document, FixedMetrics};

fn wait_for_rewrap(document: &mut Document) {
    for _ in 0..400 {
        if document.poll_rewrap() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("background rewrap did not finish");
}

fn assert_contiguous(document: &Document) {
    let list = document.list();
    let mut top = 0.0;
    let mut position = 0;
    let mut line = 0;
    for paragraph in list.iter() {
        assert_eq!(paragraph.top(), top);
        assert_eq!(paragraph.position_offset(), position);
        assert_eq!(paragraph.line_offset(), line);
        top += paragraph.height(list.line_height());
        position += paragraph.len();
        line += paragraph.line_count();
    }
}

#[test]
fn loading_splits_on_line_breaks() {
    let document = document("Hello\nWorld", 0);
    let list = document.list();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].len(), 6);
    assert_eq!(list[1].len(), 6);
    assert_eq!(list.visible_len(), 11);
    assert_eq!(document.text(), "Hello\nWorld");
}

#[test]
fn insert_into_an_empty_document() {
    let mut document = Document::new(Arc::new(FixedMetrics), 0);
    document.insert_text("Hello\nWorld");
    let list = document.list();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].len(), 6);
    assert_eq!(list[1].len(), 6);
    assert_eq!(list.visible_len(), 11);
    assert_eq!(document.cursor_abs_position(), 11);
}

#[test]
fn insert_then_delete_restores_the_text() {
    let mut document = document("alpha beta", 0);
    document.set_cursor_abs_position(5);
    document.insert_text(" X");
    assert_eq!(document.text(), "alpha X beta");
    assert_eq!(document.cursor_abs_position(), 7);

    document.delete_range(5, 2);
    assert_eq!(document.text(), "alpha beta");
    assert_eq!(document.cursor_abs_position(), 5);
    assert_contiguous(&document);
}

#[test]
fn inserting_a_line_break_splits_the_paragraph() {
    let mut document = document("ab", 0);
    document.set_cursor_abs_position(1);
    document.insert_text("1\n2");
    assert_eq!(document.text(), "a1\n2b");
    assert_eq!(document.list().len(), 2);
    // The break counts as one position, like any other character.
    assert_eq!(document.cursor_abs_position(), 4);
    assert_contiguous(&document);
}

#[test]
fn deleting_a_break_joins_paragraphs() {
    let mut document = document("one\ntwo", 0);
    document.delete_range(3, 1);
    assert_eq!(document.text(), "onetwo");
    assert_eq!(document.list().len(), 1);
    assert_eq!(document.list().visible_len(), 6);
    assert_contiguous(&document);
}

#[test]
fn char_range_crosses_paragraphs_and_clamps() {
    let document = document("Hello\nWorld", 0);
    assert_eq!(document.get_char_range(3, 5), "lo\nWo");
    assert_eq!(document.get_char_range(9, 100), "ld");
    assert_eq!(document.get_char_range(100, 5), "");
}

#[test]
fn backspace_and_delete_work_at_the_cursor() {
    let mut document = document("abc", 0);
    document.set_cursor_abs_position(2);
    document.delete_backward();
    assert_eq!(document.text(), "ac");
    assert_eq!(document.cursor_abs_position(), 1);
    document.delete_forward();
    assert_eq!(document.text(), "a");
    // Nothing before position 0 to remove.
    document.set_cursor_abs_position(0);
    document.delete_backward();
    assert_eq!(document.text(), "a");
}

#[test]
fn snapshots_follow_published_edits() {
    let mut document = document("one", 0);
    let snapshot = document.snapshot();
    let seen = snapshot.get();
    assert_eq!(seen.text(), "one");

    document.set_cursor_abs_position(3);
    document.insert_text(" two");
    // The old snapshot is untouched; a fresh read sees the edit.
    assert_eq!(seen.text(), "one");
    assert_eq!(snapshot.get().text(), "one two");

    let reader = thread::spawn({
        let snapshot = document.snapshot();
        move || snapshot.get().visible_len()
    });
    assert_eq!(reader.join().unwrap(), 7);
}

#[test]
fn large_documents_finish_layout_in_the_background() {
    let text = (0..600)
        .map(|i| format!("word{i} lorem ipsum dolor sit"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut document = document(&text, 0);
    assert!(document.rewrap_pending());
    wait_for_rewrap(&mut document);
    assert!(!document.rewrap_pending());
    assert_contiguous(&document);
    assert_eq!(document.text(), text);
}

#[test]
fn width_change_rewraps_off_thread_and_preserves_the_cursor() {
    let text = (0..600)
        .map(|i| format!("word{i} lorem ipsum dolor sit"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut document = document(&text, 0);
    wait_for_rewrap(&mut document);
    document.set_cursor_abs_position(1234);

    document.set_break_width(120);
    assert!(document.rewrap_pending());
    wait_for_rewrap(&mut document);
    assert_eq!(document.cursor_abs_position(), 1234);
    assert_contiguous(&document);

    let mut reference = ParagraphList::from_text(&text, &FixedMetrics);
    reference.relayout_from(0, 120, None);
    for (a, b) in document.list().iter().zip(reference.iter()) {
        assert_eq!(a.breaks(), b.breaks());
    }
}

#[test]
fn rapid_width_changes_keep_only_the_newest_layout() {
    let text = (0..600)
        .map(|i| format!("word{i} lorem ipsum dolor sit"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut document = document(&text, 0);
    wait_for_rewrap(&mut document);

    document.set_break_width(80);
    document.set_break_width(200);
    wait_for_rewrap(&mut document);
    assert_eq!(document.break_width(), 200);
    assert_contiguous(&document);

    let mut reference = ParagraphList::from_text(&text, &FixedMetrics);
    reference.relayout_from(0, 200, None);
    assert_eq!(document.list().total_lines(), reference.total_lines());
}

#[test]
fn loading_a_small_document_retires_the_pending_rewrap() {
    let text = (0..600)
        .map(|i| format!("word{i} lorem ipsum dolor sit"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut document = document(&text, 0);
    assert!(document.rewrap_pending());

    // The replacement lays out synchronously; the worker pass over the old
    // content is still running but must never be adopted.
    document.load_text("tiny");
    assert!(!document.rewrap_pending());
    for _ in 0..50 {
        assert!(!document.poll_rewrap());
        thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(document.text(), "tiny");
    assert_eq!(document.snapshot().get().text(), "tiny");
}

#[test]
fn keystroke_on_a_settled_large_document_stays_bounded() {
    let text = (0..600)
        .map(|i| format!("word{i} lorem ipsum dolor sit"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut document = document(&text, 0);
    wait_for_rewrap(&mut document);
    assert!(!document.rewrap_pending());

    // An insert at the head shifts every offset, so the synchronous pass
    // hits its row bound and the remainder finishes on the worker.
    document.set_cursor_abs_position(0);
    document.insert_text("x");
    assert!(document.rewrap_pending());
    wait_for_rewrap(&mut document);
    assert!(document.text().starts_with("xword0"));
    assert_contiguous(&document);
}

#[test]
fn editing_while_a_rewrap_is_pending_stays_consistent() {
    let text = (0..600)
        .map(|i| format!("word{i} lorem ipsum dolor sit"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut document = document(&text, 0);
    assert!(document.rewrap_pending());

    // The edit lands in the synchronously laid out prefix.
    document.set_cursor_abs_position(0);
    document.insert_text("start ");
    wait_for_rewrap(&mut document);
    assert!(document.text().starts_with("start word0"));
    assert_contiguous(&document);
}
