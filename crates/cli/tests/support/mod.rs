#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{tempdir, TempDir};

pub const SUFFIX: &str = "100__0_00500__0_00100.dot";
pub const PROJECTS: &str = "proj/";

/// System and micro profiles of a small scenario, plus an empty output dir.
///
/// System: main -> proj/a -> proj/c, main -> proj/b -> lib/x, main -> proj/d -> proj/e.
/// Micros: m1 covers proj/a and proj/c, m2 covers proj/b.
pub struct Scenario {
    _tmp: TempDir,
    pub system_dir: PathBuf,
    pub micro_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl Scenario {
    pub fn new() -> Self {
        let tmp = tempdir().expect("tempdir");
        let system_dir = tmp.path().join("scenarioA");
        let micro_dir = tmp.path().join("micro");
        let out_dir = tmp.path().join("out");
        for dir in [&system_dir, &micro_dir, &out_dir] {
            fs::create_dir_all(dir).expect("create dir");
        }

        write_dot(
            &system_dir.join(format!("sys__{SUFFIX}")),
            &["main", "proj/a", "proj/b", "proj/c", "lib/x", "proj/d", "proj/e"],
            &[(0, 1), (0, 2), (1, 3), (2, 4), (0, 5), (5, 6)],
        );
        write_dot(
            &micro_dir.join(format!("m1__{SUFFIX}")),
            &["bench1", "proj/a", "proj/c"],
            &[(0, 1), (1, 2)],
        );
        write_dot(&micro_dir.join(format!("m2__{SUFFIX}")), &["bench2", "proj/b"], &[(0, 1)]);

        Self { _tmp: tmp, system_dir, micro_dir, out_dir }
    }

    pub fn args(&self) -> [String; 4] {
        [
            PROJECTS.to_string(),
            self.system_dir.display().to_string(),
            self.micro_dir.display().to_string(),
            self.out_dir.display().to_string(),
        ]
    }

    pub fn output(&self, name: &str) -> Vec<String> {
        let path = self.out_dir.join(name);
        let text = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
        text.lines().map(str::to_string).collect()
    }
}

/// Every node takes one second of self time.
pub fn write_dot(path: &Path, names: &[&str], calls: &[(usize, usize)]) {
    let mut text = String::from("digraph \"profile\" {\n");
    for (i, name) in names.iter().enumerate() {
        text.push_str(&format!(
            "N{i} [label=\"{name}\\n1s (10%)\" id=\"node{i}\" tooltip=\"{name} (1s)\"]\n"
        ));
    }
    for (from, to) in calls {
        text.push_str(&format!("N{from} -> N{to} [label=\" 1s\" weight=10]\n"));
    }
    text.push_str("}\n");
    fs::write(path, text).expect("write dot");
}
