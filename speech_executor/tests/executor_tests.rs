//! Integration tests for command execution against the simulated console

use command_lang::compile;
use input_types::KeyChord;
use services_bindings::Binding;
use services_screen::{ScreenDriver, SimDriver, CUT_LEFT_MARK, RESUME_MARK};
use services_settings::ReaderSettings;
use services_speech::{RecordingSynth, Tone};
use speech_executor::{BellReason, BoundReason, Outcome, Reader};

fn reader_with(text: &str, settings: ReaderSettings) -> Reader<SimDriver, RecordingSynth> {
    Reader::new(SimDriver::with_text(1000, text), RecordingSynth::new(), settings)
}

fn reader(text: &str) -> Reader<SimDriver, RecordingSynth> {
    reader_with(text, ReaderSettings::simulated())
}

fn run(reader: &mut Reader<SimDriver, RecordingSynth>, line: &str) -> Outcome {
    let seq = compile(line).unwrap();
    reader.run_sequence(true, &seq)
}

fn set_cursor(reader: &mut Reader<SimDriver, RecordingSynth>, pos: usize) {
    reader.driver_mut().buffer_mut().set_cursor(Some(pos));
}

fn marks(reader: &Reader<SimDriver, RecordingSynth>) -> Vec<Option<usize>> {
    (0..services_screen::MARK_SLOTS)
        .map(|slot| reader.driver().buffer().mark(slot))
        .collect()
}

#[test]
fn test_back_at_start_is_bound() {
    let mut reader = reader("hello");
    let outcome = run(&mut reader, "back");
    assert_eq!(outcome, Outcome::Bound(BoundReason::AtEdge));
    assert_eq!(reader.driver().buffer().cursor(), Some(0));
    assert_eq!(reader.synth().last_tone(), Some(Tone::Bound));
}

#[test]
fn test_jump_to_unset_mark_is_bell() {
    let mut reader = reader("hello");
    let outcome = run(&mut reader, "jump q");
    assert_eq!(outcome, Outcome::Bell(BellReason::MarkUnset));
    assert_eq!(reader.synth().last_tone(), Some(Tone::Bell));
}

#[test]
fn test_failures_leave_modes_and_marks() {
    let mut reader = reader("hello world");
    set_cursor(&mut reader, 3);
    assert_eq!(run(&mut reader, "label a"), Outcome::Done);

    let modes = reader.session().modes.clone();
    let before = marks(&reader);

    assert!(matches!(run(&mut reader, "jump q"), Outcome::Bell(_)));
    assert!(matches!(run(&mut reader, "stmode z"), Outcome::Bell(_)));
    assert!(matches!(run(&mut reader, "volume x"), Outcome::Bell(_)));
    set_cursor(&mut reader, 0);
    assert!(matches!(run(&mut reader, "back"), Outcome::Bound(_)));

    assert_eq!(reader.session().modes, modes);
    assert_eq!(marks(&reader), before);
}

#[test]
fn test_empty_buffer_is_bound() {
    let mut reader = reader("");
    let outcome = run(&mut reader, "char");
    assert_eq!(outcome, Outcome::Bound(BoundReason::EmptyBuffer));
}

#[test]
fn test_composite_is_quiet_until_last() {
    let mut reader = reader("hello world");
    set_cursor(&mut reader, 8);

    assert_eq!(run(&mut reader, "sline word"), Outcome::Done);
    assert_eq!(reader.synth().spoken(), vec!["hello"]);
    assert_eq!(reader.synth().tones(), vec![Tone::Click]);
    assert_eq!(reader.driver().buffer().cursor(), Some(4));
}

#[test]
fn test_not_live_gives_no_click() {
    let mut reader = reader("hello world");
    set_cursor(&mut reader, 8);
    let seq = compile("sline").unwrap();
    assert_eq!(reader.run_sequence(false, &seq), Outcome::Done);
    assert!(reader.synth().tones().is_empty());
    assert_eq!(reader.driver().buffer().cursor(), Some(0));
}

#[test]
fn test_follow_char_from_keyboard() {
    let mut reader = reader("hello world");
    set_cursor(&mut reader, 6);
    run(&mut reader, "label b");
    set_cursor(&mut reader, 0);

    reader.driver_mut().push_char('b');
    assert_eq!(run(&mut reader, "jump"), Outcome::Done);
    assert_eq!(reader.driver().buffer().cursor(), Some(6));
}

#[test]
fn test_missing_follow_char_is_bell() {
    let mut reader = reader("hello");
    let outcome = run(&mut reader, "jump");
    assert_eq!(outcome, Outcome::Bell(BellReason::MissingFollowChar));
}

#[test]
fn test_char_and_asword() {
    let mut reader = reader("Hello");
    assert_eq!(run(&mut reader, "char"), Outcome::Done);
    assert_eq!(reader.synth().last_spoken(), Some("cap h"));
    run(&mut reader, "asword");
    assert_eq!(reader.synth().last_spoken(), Some("cap hotel"));
}

#[test]
fn test_case_uses_tone_with_clicks() {
    let mut reader = reader("Hello world");
    assert_eq!(run(&mut reader, "case"), Outcome::Done);
    assert_eq!(reader.synth().last_tone(), Some(Tone::OnOff(true)));

    reader.session_mut().modes.clicks = false;
    set_cursor(&mut reader, 1);
    run(&mut reader, "case");
    assert_eq!(reader.synth().last_spoken(), Some("lower"));

    set_cursor(&mut reader, 5);
    assert_eq!(
        run(&mut reader, "case"),
        Outcome::Bell(BellReason::NotAlphabetic)
    );
}

#[test]
fn test_column_number() {
    let mut reader = reader("ab\ncdef");
    set_cursor(&mut reader, 5);
    assert_eq!(run(&mut reader, "colnum"), Outcome::Done);
    assert_eq!(reader.synth().last_spoken(), Some("3"));
    assert_eq!(reader.driver().buffer().cursor(), Some(5));
}

#[test]
fn test_row_moves() {
    let mut reader = reader("abc\ndef\ngh");
    set_cursor(&mut reader, 5);
    assert_eq!(run(&mut reader, "prow"), Outcome::Done);
    assert_eq!(reader.driver().buffer().cursor(), Some(1));
    assert_eq!(
        run(&mut reader, "prow"),
        Outcome::Bound(BoundReason::AtEdge)
    );
    assert_eq!(reader.driver().buffer().cursor(), Some(1));
}

#[test]
fn test_next_row_onto_short_row_end() {
    let mut reader = reader("abc\nab\nxyz");
    set_cursor(&mut reader, 2);
    assert_eq!(run(&mut reader, "nrow"), Outcome::Done);
    assert_eq!(reader.driver().buffer().cursor(), Some(6));
}

#[test]
fn test_search_down_and_repeat() {
    let mut reader = reader("one two one two");
    reader.driver_mut().push_line("two");
    assert_eq!(run(&mut reader, "searchd"), Outcome::Done);
    assert_eq!(reader.driver().buffer().cursor(), Some(4));
    assert_eq!(reader.synth().last_spoken(), Some("o k"));
    assert!(reader.synth().tones().contains(&Tone::Cr));

    reader.driver_mut().push_line("");
    assert_eq!(run(&mut reader, "searchd"), Outcome::Done);
    assert_eq!(reader.driver().buffer().cursor(), Some(12));
}

#[test]
fn test_search_not_found() {
    let mut reader = reader("one two");
    reader.driver_mut().push_line("three");
    assert_eq!(
        run(&mut reader, "searchd"),
        Outcome::Bound(BoundReason::NotFound)
    );
    assert_eq!(reader.driver().buffer().cursor(), Some(0));
}

#[test]
fn test_search_without_string() {
    let mut reader = reader("one two");
    reader.driver_mut().push_line("");
    assert_eq!(
        run(&mut reader, "searchu"),
        Outcome::Bell(BellReason::EmptySearch)
    );
}

#[test]
fn test_cancelled_line_ends_silently() {
    let mut reader = reader("one two");
    reader.driver_mut().push_cancel();
    assert_eq!(run(&mut reader, "searchd"), Outcome::Done);
    assert!(reader.synth().spoken().is_empty());
    assert_eq!(reader.synth().tones(), vec![Tone::OnOff(false)]);
}

#[test]
fn test_synth_parameters() {
    let mut reader = reader("x");
    assert_eq!(run(&mut reader, "volume 7"), Outcome::Done);
    assert_eq!(reader.synth().volume(), 7);
    assert_eq!(reader.synth().last_spoken(), Some("set volume"));

    run(&mut reader, "incvol incvol");
    assert_eq!(reader.synth().volume(), 9);
    assert_eq!(
        run(&mut reader, "incvol"),
        Outcome::Bound(BoundReason::SynthRejected)
    );

    run(&mut reader, "speed 3 decspd");
    assert_eq!(reader.synth().speed(), 2);
    assert_eq!(reader.synth().last_spoken(), Some("slower"));

    assert_eq!(
        run(&mut reader, "pitch p"),
        Outcome::Bell(BellReason::BadDigit('p'))
    );
}

#[test]
fn test_modes_from_sequences() {
    let mut reader = reader("x");
    run(&mut reader, "toggle 1");
    assert!(reader.session().modes.one_line);
    run(&mut reader, "clmode a");
    assert!(!reader.session().modes.auto_read);
    run(&mut reader, "echo 2");
    assert_eq!(reader.session().modes.echo, 2);
    assert_eq!(reader.synth().last_spoken(), Some("words"));
}

#[test]
fn test_bind_installs_line() {
    let mut reader = reader("x");
    reader.driver_mut().push_line("@k char");
    assert_eq!(run(&mut reader, "bind"), Outcome::Done);
    assert!(reader.bindings().is_bound(&KeyChord::alt('k')));
    assert_eq!(reader.synth().last_tone(), Some(Tone::Cr));

    reader.driver_mut().push_line("@k bogus");
    assert!(matches!(
        run(&mut reader, "bind"),
        Outcome::Bell(BellReason::BindFailed(_))
    ));
}

#[test]
fn test_mark_region_binds_macro() {
    let mut reader = reader("Echo Hello there");
    set_cursor(&mut reader, 5);
    assert_eq!(run(&mut reader, "markl"), Outcome::Done);
    set_cursor(&mut reader, 9);
    assert_eq!(run(&mut reader, "markr q"), Outcome::Done);

    let binding = reader.bindings().lookup(&KeyChord::alt('q')).cloned();
    assert_eq!(binding, Some(Binding::Macro("hello".to_string())));
    assert_eq!(reader.driver().buffer().mark(CUT_LEFT_MARK), None);
}

#[test]
fn test_mark_region_failures() {
    let mut reader = reader("Echo Hello there");
    let seq = compile("markl").unwrap();
    assert_eq!(
        reader.run_sequence(false, &seq),
        Outcome::Bell(BellReason::NotLive)
    );

    assert_eq!(
        run(&mut reader, "markr q"),
        Outcome::Bell(BellReason::MarkUnset)
    );

    set_cursor(&mut reader, 9);
    run(&mut reader, "markl");
    set_cursor(&mut reader, 5);
    assert_eq!(
        run(&mut reader, "markr q"),
        Outcome::Bound(BoundReason::MarkOrder)
    );
    assert!(reader.bindings().is_empty());
}

#[test]
fn test_mark_region_overflow() {
    let settings = ReaderSettings {
        cut_capacity: 6,
        ..ReaderSettings::simulated()
    };
    let mut reader = reader_with("Echo Hello there", settings);
    run(&mut reader, "markl");
    set_cursor(&mut reader, 9);
    assert_eq!(
        run(&mut reader, "markr q"),
        Outcome::Bound(BoundReason::CutOverflow)
    );
    assert!(reader.bindings().is_empty());
}

#[test]
fn test_read_starts_reading() {
    let mut reader = reader("Hello there. How are you?");
    assert_eq!(run(&mut reader, "read"), Outcome::Done);
    assert!(reader.is_reading());
    assert_eq!(reader.synth().last_spoken(), Some("Hello there."));

    // any later sequence interrupts
    run(&mut reader, "sbuf");
    assert!(!reader.is_reading());
    assert_eq!(reader.driver().buffer().mark(RESUME_MARK), None);
}

#[test]
fn test_two_sentences_read_once_each() {
    let mut reader = reader("Hello there. How are you?");
    reader.start_reading();
    for _ in 0..2 {
        let mark = reader.session().reading.last_mark.unwrap();
        reader.on_index_mark(mark);
    }
    assert_eq!(
        reader.synth().spoken(),
        vec!["Hello there.", "How are you?"]
    );
    assert!(!reader.is_reading());

    let mark = reader.session().reading.last_mark.unwrap();
    reader.on_index_mark(mark);
    assert_eq!(reader.synth().spoken().len(), 2);
}

#[test]
fn test_dump_writes_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ReaderSettings {
        dump_dir: dir.path().to_path_buf(),
        ..ReaderSettings::simulated()
    };
    let mut reader = reader_with("line one\nline two", settings);
    reader.driver_mut().set_console(3);

    assert_eq!(run(&mut reader, "dump"), Outcome::Done);
    let written = std::fs::read_to_string(dir.path().join("buf3")).unwrap();
    assert_eq!(written, "line one\nline two");
    assert_eq!(reader.synth().last_spoken(), Some("buffer 3"));
}

#[test]
fn test_dump_failure_is_bell() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ReaderSettings {
        dump_dir: dir.path().join("missing"),
        ..ReaderSettings::simulated()
    };
    let mut reader = reader_with("text", settings);
    assert!(matches!(
        run(&mut reader, "dump"),
        Outcome::Bell(BellReason::DumpFailed(_))
    ));
}

#[test]
fn test_reload_replaces_bindings() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("lector.cfg");
    std::fs::write(&config, "@r read\n").unwrap();
    let settings = ReaderSettings {
        config_path: config,
        ..ReaderSettings::simulated()
    };
    let mut reader = reader_with("x", settings);
    reader.load_bindings("inline", "@z char\n");
    assert!(reader.bindings().is_bound(&KeyChord::alt('z')));

    assert_eq!(run(&mut reader, "reload"), Outcome::Done);
    assert!(!reader.bindings().is_bound(&KeyChord::alt('z')));
    assert!(reader.bindings().is_bound(&KeyChord::alt('r')));
    assert_eq!(reader.synth().last_spoken(), Some("reload"));
}

#[test]
fn test_reexec_requests_restart() {
    let mut reader = reader("x");
    assert_eq!(run(&mut reader, "reexec"), Outcome::Done);
    assert!(reader.restart_requested());
    assert_eq!(reader.synth().last_tone(), Some(Tone::Buzz));
}

#[test]
fn test_bypass_reaches_driver() {
    let mut reader = reader("x");
    run(&mut reader, "bypass");
    assert_eq!(reader.driver().bypass_count(), 1);
}

#[test]
fn test_clear_buffer() {
    let mut reader = reader("some text");
    assert_eq!(run(&mut reader, "clbuf"), Outcome::Done);
    assert!(reader.driver().buffer().is_empty());
    assert_eq!(reader.driver().buffer().cursor(), None);
}
