use anyhow::{Context, Result};
use insta::assert_snapshot;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert!(output.status.success());
    assert_snapshot!(stdout(&output), @"✓ Created .corexrc.json");

    let content = test.read_file(".corexrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["contextLines"], 10);
    assert_eq!(parsed["languages"].as_array().map(Vec::len), Some(5));
    assert!(parsed.get("includes").is_some());
    assert!(parsed.get("ignores").is_some());

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".corexrc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains(".corexrc.json already exists"));
    assert_eq!(test.read_file(".corexrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;
    test.write_file("src/main.c", "// entry\nint main(void) { return 0; }\n")?;

    let output = test.extract_command().output()?;
    assert!(
        output.status.success(),
        "extract should work with the generated config. stderr: {}",
        stderr(&output)
    );
    assert!(test.root().join(".corexrc.json").exists());

    Ok(())
}
