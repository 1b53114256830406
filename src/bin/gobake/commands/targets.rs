//! `gobake targets` command

use anyhow::Result;

use gobake::core::platform::{output_file_name, MATRIX};
use gobake::util::Shell;

pub fn execute(shell: &Shell) -> Result<()> {
    if shell.is_json() {
        let targets: Vec<serde_json::Value> = MATRIX
            .iter()
            .enumerate()
            .map(|(i, target)| {
                serde_json::json!({
                    "index": i + 1,
                    "os": target.os.as_str(),
                    "arch": target.arch.as_str(),
                    "example": output_file_name("app", target),
                })
            })
            .collect();
        shell.json_event(&serde_json::json!({ "reason": "targets", "targets": targets }));
        return Ok(());
    }

    for (i, target) in MATRIX.iter().enumerate() {
        println!("{:>2}. {}", i + 1, target);
    }

    Ok(())
}
