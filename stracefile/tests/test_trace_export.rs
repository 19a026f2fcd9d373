use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use stracefile::domain::{Pid, Tid};
use stracefile::export::{Event, TraceEvents};
use stracefile::reconcile::{convert, ConvertOptions};

fn fixture_trace() -> TraceEvents {
    let file = File::open("tests/fixtures/multithread.strace").expect("fixture missing");
    let metadata = vec![Event::thread_name(Pid(4001), Tid(4002), "worker")];
    convert(BufReader::new(file), metadata, ConvertOptions::default()).unwrap().0
}

#[test]
fn test_export_creates_valid_json() {
    let mut buffer = Vec::new();
    fixture_trace().export(&mut buffer).expect("Failed to export trace");

    let json_str = String::from_utf8(buffer).expect("Invalid UTF-8");
    let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("Invalid JSON");

    assert_eq!(parsed["displayTimeUnit"], "ms");
    let events = parsed["traceEvents"].as_array().expect("traceEvents should be an array");
    assert_eq!(events.len(), 11);
    assert_eq!(events[0]["ph"], "M");
    assert_eq!(events[0]["args"]["name"], "worker");
}

#[test]
fn test_roundtrip_preserves_events() {
    let original = fixture_trace();

    let mut buffer = Vec::new();
    original.export(&mut buffer).unwrap();
    let reparsed = TraceEvents::from_reader(buffer.as_slice()).unwrap();

    let before: HashSet<&Event> = original.events().iter().collect();
    let after: HashSet<&Event> = reparsed.events().iter().collect();
    assert_eq!(before, after);
    assert_eq!(original, reparsed);
}

#[test]
fn test_optional_fields_omitted() {
    let mut buffer = Vec::new();
    fixture_trace().export(&mut buffer).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    for event in parsed["traceEvents"].as_array().unwrap() {
        match event["ph"].as_str().unwrap() {
            "X" => assert!(event.get("dur").is_some(), "complete events carry dur: {event}"),
            _ => assert!(event.get("dur").is_none(), "only complete events carry dur: {event}"),
        }
        for value in event["args"].as_object().unwrap().values() {
            assert_ne!(value, "", "empty args must be omitted: {event}");
        }
    }
}

#[test]
fn test_empty_input_saves_empty_event_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.json");

    let (trace, _) = convert(&b""[..], Vec::new(), ConvertOptions::default()).unwrap();
    trace.save(&path).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_reader(File::open(&path).unwrap()).unwrap();
    assert_eq!(parsed["traceEvents"], serde_json::json!([]));
}

#[test]
fn test_save_overwrites_existing_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, b"stale contents that are not json").unwrap();

    fixture_trace().save(file.path()).unwrap();

    let reparsed = TraceEvents::from_reader(File::open(file.path()).unwrap()).unwrap();
    assert_eq!(reparsed.len(), 11);
}
