// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::editing::Cursor;
use crate::util::Rect;

use super::utils::document;

#[test]
fn horizontal_movement_crosses_paragraphs() {
    let mut document = document("Hi\nYo", 0);
    document.set_cursor_abs_position(2);
    document.move_right();
    assert_eq!(document.cursor(), Cursor { paragraph: 1, column: 0 });
    document.move_left();
    assert_eq!(document.cursor(), Cursor { paragraph: 0, column: 2 });
    // The ends of the document clamp.
    document.set_cursor_abs_position(0);
    document.move_left();
    assert_eq!(document.cursor_abs_position(), 0);
    document.set_cursor_abs_position(usize::MAX);
    document.move_right();
    assert_eq!(document.cursor_abs_position(), document.list().visible_len());
}

#[test]
fn vertical_movement_remembers_the_preferred_column() {
    let mut document = document("aaaaaaaa\nbb\ncccccccc", 0);
    document.set_cursor_abs_position(6);
    document.move_down();
    // The short line clamps the column but not the preference.
    assert_eq!(document.cursor(), Cursor { paragraph: 1, column: 2 });
    document.move_down();
    assert_eq!(document.cursor(), Cursor { paragraph: 2, column: 6 });
    document.move_up();
    document.move_up();
    assert_eq!(document.cursor(), Cursor { paragraph: 0, column: 6 });
    // A horizontal move drops the preference.
    document.move_down();
    document.move_left();
    document.move_down();
    assert_eq!(document.cursor(), Cursor { paragraph: 2, column: 1 });
}

#[test]
fn home_and_end_work_on_wrapped_lines() {
    let mut document = document("aaaa bbbb cccc", 90);
    document.set_cursor_abs_position(12);
    document.move_home();
    assert_eq!(document.cursor().column, 10);
    document.move_end();
    // The last line ends at the sentinel slot.
    assert_eq!(document.cursor().column, 14);
    document.set_cursor_abs_position(2);
    document.move_end();
    assert_eq!(document.cursor().column, 9);
}

#[test]
fn word_movement_stops_at_breaks_and_paragraph_ends() {
    let mut document = document("foo bar-baz\nqux", 0);
    document.move_word_right();
    assert_eq!(document.cursor_abs_position(), 4);
    document.move_word_right();
    assert_eq!(document.cursor_abs_position(), 8);
    document.move_word_right();
    // Past "baz" and its paragraph break, onto "qux".
    assert_eq!(document.cursor_abs_position(), 12);
    document.move_word_left();
    assert_eq!(document.cursor_abs_position(), 8);
    document.move_word_left();
    assert_eq!(document.cursor_abs_position(), 4);
    document.move_word_left();
    assert_eq!(document.cursor_abs_position(), 0);
}

#[test]
fn cursor_rectangle_tracks_wrapped_lines() {
    let mut document = document("aaaa bbbb cccc", 90);
    document.set_cursor_abs_position(12);
    assert_eq!(
        document.cursor_rectangle(),
        Rect { x: 20.0, y: 16.0, width: 10.0, height: 16.0 }
    );
    // On the sentinel the cell falls back to the space advance.
    document.set_cursor_abs_position(14);
    assert_eq!(
        document.cursor_rectangle(),
        Rect { x: 40.0, y: 16.0, width: 10.0, height: 16.0 }
    );
}

#[test]
fn point_clicks_place_the_cursor() {
    let mut document = document("aaaa bbbb cccc\nnext", 90);
    document.set_cursor_position(22.0, 17.0);
    assert_eq!(document.cursor(), Cursor { paragraph: 0, column: 12 });
    document.set_cursor_position(-5.0, -5.0);
    assert_eq!(document.cursor_abs_position(), 0);
}

#[test]
fn page_movement_jumps_whole_lines() {
    let text = (0..10).map(|i| format!("p{i}")).collect::<Vec<_>>().join("\n");
    let mut document = document(&text, 0);
    document.page_down(3);
    assert_eq!(document.cursor(), Cursor { paragraph: 3, column: 0 });
    document.page_down(100);
    assert_eq!(document.cursor().paragraph, 9);
    document.page_up(100);
    assert_eq!(document.cursor(), Cursor { paragraph: 0, column: 0 });
}
