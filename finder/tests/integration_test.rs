use anyhow::Result;
use finder::{Finder, Phase, SearchConfig};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}

/// The reference scenario: `a.ts` matches by content, `b.txt` is filtered by
/// extension, and `node_modules/c.ts` is pruned with the excluded directory.
#[test]
fn test_reference_scenario() -> Result<()> {
    let dir = tempdir()?;
    write_file(&dir.path().join("a.ts"), "hello world")?;
    write_file(&dir.path().join("b.txt"), "goodbye")?;
    fs::create_dir(dir.path().join("node_modules"))?;
    write_file(&dir.path().join("node_modules/c.ts"), "hello")?;

    let config = SearchConfig {
        file_types: Some("ts".to_string()),
        ..Default::default()
    };
    let mut finder = Finder::new(config);
    let summary = finder.search("hello", dir.path())?;

    assert!(summary.by_name.is_empty());
    assert_eq!(summary.by_content.len(), 1);
    assert!(summary.by_content[0].ends_with("a.ts"));
    Ok(())
}

#[test]
fn test_results_have_no_duplicates_and_live_under_root() -> Result<()> {
    let dir = tempdir()?;
    for i in 0..20 {
        write_file(
            &dir.path().join(format!("common_{i}.rs")),
            "shared common content",
        )?;
    }
    fs::create_dir(dir.path().join("nested"))?;
    write_file(&dir.path().join("nested/common_deep.rs"), "shared common content")?;

    let mut finder = Finder::new(SearchConfig::default());
    let summary = finder.search("common", dir.path())?;

    let root = dir.path().canonicalize()?;
    for list in [&summary.by_name, &summary.by_content] {
        let mut seen = list.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), list.len(), "duplicate path in results");
        for path in list {
            assert!(path.starts_with(&root));
            assert!(path.is_file());
        }
    }
    assert_eq!(summary.by_name.len(), 21);
    assert_eq!(summary.by_content.len(), 21);
    Ok(())
}

#[test]
fn test_excluded_directories_never_descended() -> Result<()> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("src/deep"))?;
    fs::create_dir_all(dir.path().join(".git/objects"))?;
    write_file(&dir.path().join("src/deep/probe.rs"), "probe")?;
    write_file(&dir.path().join(".git/objects/probe.rs"), "probe")?;

    let mut finder = Finder::new(SearchConfig::default());
    let discovered = Arc::new(Mutex::new(Vec::new()));
    let sink = discovered.clone();
    finder.events().on_file_found(move |record| {
        sink.lock().unwrap().push(record.path.clone());
    });

    let summary = finder.search("probe", dir.path())?;

    for path in discovered.lock().unwrap().iter() {
        assert!(
            !path.components().any(|c| c.as_os_str() == ".git"),
            "descended into excluded directory: {}",
            path.display()
        );
    }
    assert_eq!(summary.by_name.len(), 1);
    assert_eq!(summary.by_content.len(), 1);
    Ok(())
}

/// Progress events must be exactly 1..=N with no gaps or duplicates, no
/// matter how the concurrent scans interleave.
#[test]
fn test_progress_counter_is_exact() -> Result<()> {
    let dir = tempdir()?;
    let file_count = 137;
    for i in 0..file_count {
        write_file(&dir.path().join(format!("file_{i}.rs")), "filler text")?;
    }

    let mut finder = Finder::new(SearchConfig::default());
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let sink = ticks.clone();
    finder.events().on_progress(move |progress| {
        assert_eq!(progress.total, file_count);
        sink.lock().unwrap().push(progress.current);
    });

    finder.search("anything", dir.path())?;

    let mut ticks = ticks.lock().unwrap().clone();
    ticks.sort_unstable();
    assert_eq!(ticks, (1..=file_count).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_cancellation_at_checkpoint() -> Result<()> {
    let dir = tempdir()?;
    write_file(&dir.path().join("named_target.rs"), "no match here")?;
    write_file(&dir.path().join("other.rs"), "target inside content")?;

    let mut finder = Finder::new(SearchConfig::default());
    finder
        .events()
        .on_collection_complete(|_, token| token.cancel());

    let found_events = Arc::new(AtomicUsize::new(0));
    let counter = found_events.clone();
    finder.events().on_found(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let phases = Arc::new(Mutex::new(Vec::new()));
    let sink = phases.clone();
    finder.events().on_phase(move |phase| {
        sink.lock().unwrap().push(*phase);
    });

    let summary = finder.search("target", dir.path())?;

    assert_eq!(summary.by_name.len(), 1);
    assert!(summary.by_name[0].ends_with("named_target.rs"));
    assert!(summary.by_content.is_empty());
    assert_eq!(found_events.load(Ordering::SeqCst), 1);
    assert!(!phases.lock().unwrap().contains(&Phase::Searching));
    Ok(())
}

#[test]
fn test_name_only_mode_never_scans_content() -> Result<()> {
    let dir = tempdir()?;
    write_file(&dir.path().join("quiet.rs"), "loud content")?;

    let config = SearchConfig {
        name_only: true,
        ..Default::default()
    };
    let mut finder = Finder::new(config);

    let scans_started = Arc::new(AtomicUsize::new(0));
    let started = scans_started.clone();
    finder.events().on_content_search_started(move |_| {
        started.fetch_add(1, Ordering::SeqCst);
    });
    let progressed = Arc::new(AtomicUsize::new(0));
    let prog = progressed.clone();
    finder.events().on_progress(move |_| {
        prog.fetch_add(1, Ordering::SeqCst);
    });

    let summary = finder.search("loud", dir.path())?;

    assert!(summary.by_content.is_empty());
    assert_eq!(scans_started.load(Ordering::SeqCst), 0);
    assert_eq!(progressed.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_literal_pattern_matches_substring_only() -> Result<()> {
    let dir = tempdir()?;
    write_file(&dir.path().join("todos.rs"), "TODO list")?;
    write_file(&dir.path().join("decoy.rs"), "TOD0 digit zero")?;

    let mut finder = Finder::new(SearchConfig::default());
    let summary = finder.search("TODO", dir.path())?;

    assert_eq!(summary.by_content.len(), 1);
    assert!(summary.by_content[0].ends_with("todos.rs"));
    Ok(())
}

#[test]
fn test_ignore_case_matches_names() -> Result<()> {
    let dir = tempdir()?;
    write_file(&dir.path().join("README.md"), "docs")?;

    let config = SearchConfig {
        file_types: Some("all".to_string()),
        ignore_case: true,
        ..Default::default()
    };
    let mut finder = Finder::new(config);
    let summary = finder.search("readme", dir.path())?;

    assert_eq!(summary.by_name.len(), 1);
    Ok(())
}

#[test]
fn test_empty_collection_still_emits_found() -> Result<()> {
    let dir = tempdir()?;

    let mut finder = Finder::new(SearchConfig::default());
    let found_events = Arc::new(AtomicUsize::new(0));
    let counter = found_events.clone();
    finder.events().on_found(move |summary| {
        assert!(summary.is_empty());
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let summary = finder.search("anything", dir.path())?;
    assert!(summary.is_empty());
    assert_eq!(found_events.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_collection_stats() -> Result<()> {
    let dir = tempdir()?;
    write_file(&dir.path().join("match_me.rs"), "12345")?;
    write_file(&dir.path().join("other.rs"), "123")?;

    let mut finder = Finder::new(SearchConfig::default());
    let stats_seen = Arc::new(Mutex::new(None));
    let sink = stats_seen.clone();
    finder.events().on_collection_complete(move |stats, _| {
        *sink.lock().unwrap() = Some(*stats);
    });

    finder.search("match", dir.path())?;

    let stats = stats_seen.lock().unwrap().expect("no collection event");
    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.total_size, 8);
    assert_eq!(stats.name_matches, 1);
    Ok(())
}
