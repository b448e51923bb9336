// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener context backed by fake adapters

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use wf_adapters::{CommandLine, FakeCatalog, FakeFuzzer, FakePostProcessor, FakeTeardown};
use wf_engine::{History, Supervisor, SupervisorConfig, SupervisorDeps};

use super::{ListenCtx, ToolCheck};
use crate::protocol::HttpRequest;

pub(super) type FakeCtx = ListenCtx<FakeCatalog, FakeFuzzer, FakePostProcessor, FakeTeardown>;

pub(super) struct Fixture {
    pub dir: TempDir,
    pub ctx: Arc<FakeCtx>,
    pub catalog: FakeCatalog,
    pub fuzzer: FakeFuzzer,
    pub results: PathBuf,
}

impl Fixture {
    pub fn write_results(&self, target: &str) {
        std::fs::create_dir_all(&self.results).unwrap();
        let body = format!(
            r#"{{"command_results":[{{"cmd":"wp plugin activate","object_name":"{}","return_code":0,"stdout":"ok","stderr":""}}]}}"#,
            target
        );
        std::fs::write(self.results.join(format!("{}_1.json", target)), body).unwrap();
    }

    /// Let the run for `target` exit and wait for it to be archived
    pub async fn finish(&self, target: &str) {
        assert!(self.fuzzer.finish(target, 0), "no run waiting for {target}");
        tokio::time::timeout(Duration::from_secs(5), self.ctx.supervisor.wait_idle())
            .await
            .expect("run was not archived");
    }
}

pub(super) fn fixture() -> Fixture {
    fixture_with_archived(&[])
}

pub(super) fn fixture_with_archived(archived: &[&str]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let fuzzer_dir = dir.path().join("wpgarlic");
    let archive_dir = dir.path().join("archive");
    let results = fuzzer_dir.join("data/plugin_fuzz_results");
    std::fs::create_dir_all(&fuzzer_dir).unwrap();
    std::fs::write(fuzzer_dir.join("fuzz_plugin.py"), "").unwrap();
    std::fs::create_dir_all(&archive_dir).unwrap();
    for target in archived {
        std::fs::write(archive_dir.join(format!("{}.json", target)), r#"{"command_results":[]}"#)
            .unwrap();
    }

    let catalog = FakeCatalog::with_plugins(&["akismet", "jetpack", "state", "wordfence"]);
    let fuzzer = FakeFuzzer::new();
    let supervisor = Supervisor::spawn(
        SupervisorDeps {
            catalog: catalog.clone(),
            fuzzer: fuzzer.clone(),
            postprocess: FakePostProcessor::new(),
            teardown: FakeTeardown::new(),
        },
        SupervisorConfig {
            results_dir: results.clone(),
            archive_dir: archive_dir.clone(),
            catalog_timeout: Duration::from_secs(5),
            max_run_duration: Duration::from_secs(3600),
        },
        wf_core::SystemClock,
        History::load(&archive_dir).unwrap(),
    );

    let ctx = Arc::new(ListenCtx {
        supervisor,
        fuzzer_dir,
        fuzzer_entry: PathBuf::from("fuzz_plugin.py"),
        tool_checks: vec![
            ToolCheck::new("sh", CommandLine::parse("sh -c true").unwrap()),
            ToolCheck::new("missing", CommandLine::parse("wf-no-such-tool-xyz version").unwrap()),
        ],
        start_time: Instant::now(),
        ipc_timeout: Duration::from_secs(1),
    });
    Fixture { dir, ctx, catalog, fuzzer, results }
}

pub(super) fn request(method: &str, path: &str) -> HttpRequest {
    HttpRequest { method: method.to_string(), path: path.to_string(), body: Vec::new() }
}
