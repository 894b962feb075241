//! Integration tests for mission id generation
//!
//! Tests verify:
//! 1. Counters are consecutive across any mix of generate / generate_daily
//! 2. The daily date segment matches the current UTC date
//! 3. The shared generator never hands out a counter twice under contention
//!
//! Run with: cargo test --test mission_id_integration

use chrono::Utc;
use std::collections::HashSet;
use std::thread;
use wq_mission::id_gen::{MissionIdKind, parse_mission_id};
use wq_mission::{MissionIdGenerator, SharedMissionIdGenerator};

#[test]
fn test_fresh_generator_counts_from_one() {
    let mut generator = MissionIdGenerator::new();
    let first = generator.generate();
    let second = generator.generate();

    assert!(first.starts_with("MISSION_"));
    assert!(first.ends_with("_000001"), "got {}", first);
    assert!(second.ends_with("_000002"), "got {}", second);
}

#[test]
fn test_timestamp_segment_is_epoch_millis() {
    let before = Utc::now().timestamp_millis();
    let id = MissionIdGenerator::new().generate();
    let after = Utc::now().timestamp_millis();

    let parsed = parse_mission_id(&id).unwrap();
    assert_eq!(parsed.kind, MissionIdKind::Timestamped);
    assert!(parsed.stamp.len() >= 13);

    let millis: i64 = parsed.stamp.parse().unwrap();
    assert!(before <= millis && millis <= after);
}

#[test]
fn test_daily_segment_is_current_utc_date() {
    let mut generator = MissionIdGenerator::new();

    let before = Utc::now().format("%Y%m%d").to_string();
    let id = generator.generate_daily();
    let after = Utc::now().format("%Y%m%d").to_string();

    let parsed = parse_mission_id(&id).unwrap();
    assert_eq!(parsed.kind, MissionIdKind::Daily);
    assert!(parsed.stamp == before || parsed.stamp == after);
    assert_eq!(id.rsplit('_').next(), Some("0001"));
}

#[test]
fn test_mixed_modes_yield_consecutive_counters() {
    let mut generator = MissionIdGenerator::new();

    let ids: Vec<String> = (0..50)
        .map(|i| {
            if i % 3 == 0 {
                generator.generate_daily()
            } else {
                generator.generate()
            }
        })
        .collect();

    let counters: Vec<u64> = ids
        .iter()
        .map(|id| parse_mission_id(id).unwrap().counter)
        .collect();
    let expected: Vec<u64> = (1..=50).collect();
    assert_eq!(counters, expected);
    assert_eq!(generator.counter(), 50);
}

#[test]
fn test_separate_instances_do_not_share_state() {
    let mut a = MissionIdGenerator::new();
    let mut b = MissionIdGenerator::new();
    a.generate();
    a.generate();

    assert!(b.generate().ends_with("_000001"));
    assert_eq!(a.counter(), 2);
}

#[test]
fn test_shared_generator_has_no_duplicates_across_threads() {
    let generator = SharedMissionIdGenerator::new();
    let threads = 8;
    let per_thread = 250;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let generator = generator.clone();
            thread::spawn(move || {
                (0..per_thread)
                    .map(|i| {
                        if (t + i) % 2 == 0 {
                            generator.generate()
                        } else {
                            generator.generate_daily()
                        }
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut counters = HashSet::new();
    for handle in handles {
        for id in handle.join().expect("worker thread panicked") {
            let counter = parse_mission_id(&id).unwrap().counter;
            assert!(counters.insert(counter), "counter {} issued twice", counter);
        }
    }

    let total = (threads * per_thread) as u64;
    assert_eq!(counters.len() as u64, total);
    assert_eq!(generator.counter(), total);
    assert!(counters.iter().all(|c| (1..=total).contains(c)));
}
