//! Markdown run receipt.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const RECEIPT_FILE: &str = "receipt.md";

/// Everything the receipt reports about one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptInput {
    pub run_id: String,
    pub task_title: String,
    pub files_touched: Vec<String>,
    pub commands: Vec<String>,
    /// One line per verification command, e.g. `cargo test => 0`.
    pub tests: Vec<String>,
    pub test_outputs: Vec<String>,
    pub evals: Vec<String>,
    pub risks: Vec<String>,
}

fn bullets(items: &[String], wrap: impl Fn(&str) -> String) -> String {
    if items.is_empty() {
        return "- None".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {}", wrap(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn code_blocks(outputs: &[String]) -> String {
    if outputs.is_empty() {
        return "```\nNone\n```".to_string();
    }
    outputs
        .iter()
        .map(|output| format!("```\n{output}\n```"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_receipt(input: &ReceiptInput) -> String {
    let plain = |s: &str| s.to_string();
    let code = |s: &str| format!("`{s}`");

    let mut out = String::new();
    out.push_str(&format!("# Warforge Receipt ({})\n\n", input.run_id));
    out.push_str(&format!("## Task\n- {}\n\n", input.task_title));
    out.push_str("## What Changed\n- Pipeline run executed across plan, implementation, verification and review stages.\n\n");
    out.push_str("## Why It Changed\n- To fulfil the requested task with a gated plan, verification and receipt.\n\n");
    out.push_str(&format!("## Files Touched\n{}\n\n", bullets(&input.files_touched, plain)));
    out.push_str(&format!("## Commands\n{}\n\n", bullets(&input.commands, code)));
    out.push_str(&format!("## Tests\n{}\n\n", bullets(&input.tests, code)));
    out.push_str(&format!("## Test Outputs\n{}\n\n", code_blocks(&input.test_outputs)));
    out.push_str(&format!("## Evals\n{}\n\n", bullets(&input.evals, plain)));
    out.push_str(&format!("## Risks + Mitigations\n{}\n\n", bullets(&input.risks, plain)));
    out.push_str("## Rollback\n- Revert the git commit for this run.\n\n");
    out.push_str("## Not Done\n- Deployment not performed.\n");
    out
}

/// Write `receipt.md` into `run_dir`, returning its path.
pub fn write_receipt(run_dir: &Path, receipt: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(run_dir).with_context(|| format!("create {}", run_dir.display()))?;
    let path = run_dir.join(RECEIPT_FILE);
    std::fs::write(&path, receipt).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
