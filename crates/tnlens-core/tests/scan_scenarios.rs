//! End-to-end extraction scenarios against scripted screens.

use tnlens_core::ScanConfig;
use tnlens_core::harvest_csv;
use tnlens_core::scan;
use tnlens_core::screen::attr;
use tnlens_core::screen::color;
use tnlens_session::EditableField;
use tnlens_session::ScriptedSession;
use tnlens_session::SnapshotBuffer;
use tnlens_session::keys;

fn header(buf: &mut SnapshotBuffer, row: usize, text: &str) {
    buf.put_text(row, 0, text, color::WHITE);
    buf.put_attr(row, 0, text.len(), attr::COLUMN_HEAD);
}

#[test]
fn single_label_single_field() {
    let mut buf = SnapshotBuffer::new(5, 50);
    buf.put_text(2, 1, "Name  . . . .", color::GREEN);
    buf.add_field(EditableField::new(2, 18, 12));
    buf.put_text(2, 18, "Jones", color::GREEN);

    let model = scan(&buf, &ScanConfig::default());
    assert_eq!(model.input_fields.len(), 1);
    let field = model.input_field("Name").expect("Name");
    assert_eq!(field.label, "Name");
    assert_eq!(field.value, "Jones");
}

#[test]
fn composite_label_shares_one_field() {
    let mut buf = SnapshotBuffer::new(5, 60);
    buf.put_text(2, 1, "IRS/Security number . . .", color::GREEN);
    buf.add_field(EditableField::new(2, 30, 12));
    buf.put_text(2, 30, "987654", color::GREEN);

    let model = scan(&buf, &ScanConfig::default());
    assert_eq!(model.input_value("IRS"), Some("987654"));
    assert_eq!(model.input_value("Security number"), Some("987654"));
}

fn orders_page(rows: &[&str], sentinel: &str) -> SnapshotBuffer {
    let mut buf = SnapshotBuffer::new(9, 40);
    buf.put_text(0, 10, "Open Orders", color::WHITE);
    header(&mut buf, 2, "ID   Name      Status");
    for (i, r) in rows.iter().enumerate() {
        buf.put_text(3 + i, 0, r, color::GREEN);
    }
    // paging sentinel on the last visible line
    buf.put_text(8, 32, sentinel, color::WHITE);
    buf
}

#[test]
fn table_round_trips_to_csv() {
    let page = orders_page(&["1    Alice     Open", "2    Bob       Closed"], "Bottom");
    let mut session = ScriptedSession::new(vec![page]);
    let cfg = ScanConfig {
        max_pages: 1,
        ..ScanConfig::default()
    };

    let csv = harvest_csv(&mut session, &cfg);
    assert_eq!(csv, "ID,Name,Status\n1,Alice,Open\n2,Bob,Closed\n");
}

#[test]
fn harvest_walks_pages_and_rolls_back() {
    let first = orders_page(&["1    Alice     Open", "2    Bob       Closed"], "More...");
    let second = orders_page(&["3    Carla     Open"], "Bottom");
    let mut session = ScriptedSession::new(vec![first, second]);

    let csv = harvest_csv(&mut session, &ScanConfig::default());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "ID,Name,Status",
            "1,Alice,Open",
            "2,Bob,Closed",
            "3,Carla,Open",
        ]
    );
    // the view is rolled back to the first page afterwards
    assert_eq!(session.current_page(), 0);
}

#[test]
fn harvest_stops_after_repeated_identical_pages() {
    // one page, a "more" sentinel that never resolves, and a generous
    // page budget: the repeat guard has to end the loop
    let page = orders_page(&["1    Alice     Open"], "More...");
    let mut session = ScriptedSession::new(vec![page]);
    let cfg = ScanConfig {
        max_pages: 100,
        ..ScanConfig::default()
    };

    let csv = harvest_csv(&mut session, &cfg);
    assert_eq!(csv, "ID,Name,Status\n1,Alice,Open\n");

    let downs = session
        .keys_sent()
        .iter()
        .filter(|k| k.as_str() == keys::PAGE_DOWN)
        .count();
    assert_eq!(downs, 10);
}

#[test]
fn harvest_stops_on_keyboard_lock() {
    let first = orders_page(&["1    Alice     Open"], "More...");
    let second = orders_page(&["2    Bob       Open"], "More...");
    let third = orders_page(&["3    Carla     Open"], "Bottom");
    let mut session = ScriptedSession::new(vec![first, second, third]).lock_keyboard_after(1);

    let csv = harvest_csv(&mut session, &ScanConfig::default());
    // the turn that locked the keyboard contributes nothing
    assert_eq!(csv, "ID,Name,Status\n1,Alice,Open\n");
}

#[test]
fn harvest_without_table_is_empty() {
    let mut buf = SnapshotBuffer::new(5, 40);
    buf.put_text(2, 0, "No list here, just prose", color::GREEN);
    let mut session = ScriptedSession::new(vec![buf]);

    assert_eq!(harvest_csv(&mut session, &ScanConfig::default()), "");
}

#[test]
fn dual_pane_screen_keeps_panes_apart() {
    let mut buf = SnapshotBuffer::new(8, 60);
    // enough pane-like rows to trip the dual-pane heuristic
    for row in 2..6 {
        buf.put_text(row, 1, "Lbl", color::GREEN);
        buf.put_text(row, 31, "Rgt", color::GREEN);
    }
    buf.add_field(EditableField::new(3, 36, 8));
    buf.put_text(3, 36, "val", color::GREEN);

    let model = scan(&buf, &ScanConfig::default());
    assert_eq!(model.input_fields.len(), 1);
    assert_eq!(model.input_value("Rgt"), Some("val"));
    assert!(model.input_value("Lbl").is_none());
}

#[test]
fn empty_snapshot_is_an_empty_model_not_an_error() {
    let buf = SnapshotBuffer::new(0, 0);
    let model = scan(&buf, &ScanConfig::default());

    assert!(model.title_lines.is_empty());
    assert!(model.text.is_empty());
    assert!(model.display_fields.is_empty());
    assert!(model.input_fields.is_empty());
    assert!(model.table.is_none());
    assert!(model.is_empty());
}

#[test]
fn color_filter_is_idempotent() {
    use tnlens_core::scan::color_filter::filter_row;

    let mut buf = SnapshotBuffer::new(2, 20);
    buf.put_text(0, 2, "keep", color::GREEN);
    buf.put_text(0, 10, "drop", color::RED);
    let once = filter_row(&buf, 0, 0..20, &[color::GREEN]);

    // write the filtered row back and filter again
    let mut refiltered = SnapshotBuffer::new(2, 20);
    for (col, &c) in once.iter().enumerate() {
        if c != tnlens_core::NUL {
            refiltered.put_text(0, col, &c.to_string(), color::GREEN);
        }
    }
    let twice = filter_row(&refiltered, 0, 0..20, &[color::GREEN]);
    assert_eq!(once, twice);
}

#[test]
fn column_aligned_rendering_round_trips() {
    // render cells back into a fixed-width row aligned to the derived
    // column specs, rescan, and expect the original cell text
    let cells = [["10", "Hammer", "Ready"], ["11", "Wrench", "Hold"]];
    let mut buf = SnapshotBuffer::new(7, 40);
    header(&mut buf, 2, "No   Item      State");
    let model = scan(&buf, &ScanConfig::default());
    let specs = model.table.as_ref().expect("table").specs().to_vec();

    let mut rendered = SnapshotBuffer::new(7, 40);
    header(&mut rendered, 2, "No   Item      State");
    for (i, row) in cells.iter().enumerate() {
        for (spec, cell) in specs.iter().zip(row.iter()) {
            rendered.put_text(3 + i, spec.start, cell, color::GREEN);
        }
    }

    let model = scan(&rendered, &ScanConfig::default());
    let table = model.table.expect("table");
    assert_eq!(table.rows().len(), 2);
    for (row, expected) in table.rows().iter().zip(cells.iter()) {
        assert_eq!(row.cells, expected);
    }
}
