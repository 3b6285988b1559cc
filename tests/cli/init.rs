use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "✓ Created .ngi18nrc.json\n");

    let content = test.read_file(".ngi18nrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["ignores"][0], "**/dist/**");
    assert_eq!(parsed["validators"]["mismatchingValues"]["level"], "error");
    assert_eq!(parsed["notifications"]["enabled"], true);
    assert!(content.contains("  "), "Config should use 2-space indentation");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".ngi18nrc.json", "{}")?;

    let output = test.command().arg("init").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "Error: .ngi18nrc.json already exists\n");
    assert_eq!(test.read_file(".ngi18nrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;
    test.write_file("src/app.html", r#"<p i18n="@@a">Hello</p>"#)?;

    let output = test.check_command().output()?;

    assert!(
        output.status.success(),
        "Check command should work with initialized config. stderr: {}",
        stderr(&output)
    );
    assert!(test.root().join(".ngi18nrc.json").exists());

    Ok(())
}
