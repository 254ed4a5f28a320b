//! Version command implementation.

use crate::error::Result;

/// Print version information.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    if json {
        let output = serde_json::json!({
            "name": "tt",
            "version": version,
        });
        println!("{output}");
    } else {
        println!("tt {version}");
    }

    Ok(())
}
