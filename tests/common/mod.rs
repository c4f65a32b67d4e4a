//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Arc;

use catpoint_core::SecurityService;
use catpoint_store::{FileRepository, FileSyncPolicy};
use catpoint_vision::{FakeImageClassifier, Image};
use tempfile::TempDir;

/// Scratch directory holding a state file, a fake home and sample images.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_path(&self) -> PathBuf {
        self.root().join("state.json")
    }

    pub fn home(&self) -> PathBuf {
        let home = self.root().join("home");
        fs::create_dir_all(&home).expect("create home");
        home
    }

    /// Write a fake camera frame and return its path.
    pub fn image(&self, name: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, [0x89, b'P', b'N', b'G', 0, 0, 0, 0]).expect("write image");
        path
    }

    /// Open the state file through a fresh repository and service.
    pub fn service(&self, cat: bool) -> (Arc<FileRepository>, SecurityService) {
        self.service_at(self.state_path(), cat)
    }

    /// Like [`Workspace::service`], for a state file somewhere else.
    pub fn service_at(&self, path: PathBuf, cat: bool) -> (Arc<FileRepository>, SecurityService) {
        let repo = Arc::new(FileRepository::open(path).with_sync_policy(FileSyncPolicy::SkipSync));
        let classifier = Arc::new(FakeImageClassifier::new().with_deterministic_result(cat));
        let service = SecurityService::new(repo.clone(), classifier);
        (repo, service)
    }

    pub fn document(&self) -> serde_json::Value {
        let raw = fs::read_to_string(self.state_path()).expect("read state");
        serde_json::from_str(&raw).expect("state is JSON")
    }

    /// `catpoint` isolated from the real home directory and config.
    pub fn catpoint(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_catpoint"));
        cmd.current_dir(self.root())
            .env("HOME", self.home())
            .env("CATPOINT_CONFIG", self.root().join("absent-config.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg("--state")
            .arg(self.state_path());
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.catpoint().args(args).output().expect("run catpoint")
    }

    pub fn run_shell(&self, args: &[&str], script: &str) -> Output {
        let mut child = self
            .catpoint()
            .args(args)
            .arg("shell")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn catpoint shell");
        child
            .stdin
            .take()
            .expect("stdin piped")
            .write_all(script.as_bytes())
            .expect("write script");
        child.wait_with_output().expect("wait for shell")
    }
}

pub fn frame() -> Image {
    Image::from_bytes(vec![1u8; 32])
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
