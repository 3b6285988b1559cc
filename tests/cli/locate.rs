use anyhow::Result;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use crate::{CliTest, stdout};

const TEMPLATE: &str = "<div>\n  <p i18n=\"@@a\">First</p>\n  <p i18n=\"@@a\">Second</p>\n</div>";

#[test]
fn test_locate_identifier() -> Result<()> {
    let test = CliTest::with_file("src/a.html", TEMPLATE)?;

    let output = test.command().args(["locate", "src/a.html", "@@a"]).output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_snapshot!(stdout(&output).trim_end(), @"src/a.html:2:12-2:15");

    Ok(())
}

#[test]
fn test_locate_content_of_second_occurrence() -> Result<()> {
    let test = CliTest::with_file("src/a.html", TEMPLATE)?;

    let output = test
        .command()
        .args(["locate", "src/a.html", "@@a", "--occurrence", "1", "--content"])
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_snapshot!(stdout(&output).trim_end(), @"src/a.html:3:17-3:23");

    Ok(())
}

#[test]
fn test_locate_missing_occurrence() -> Result<()> {
    let test = CliTest::with_file("src/a.html", TEMPLATE)?;

    let output = test
        .command()
        .args(["locate", "src/a.html", "@@a", "--occurrence", "2"])
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("No identifier found for \"@@a\" (occurrence 2) in src/a.html"));

    Ok(())
}

#[test]
fn test_locate_unreadable_file() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().args(["locate", "missing.html", "@@a"]).output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(crate::stderr(&output).contains("Failed to read template"));

    Ok(())
}
