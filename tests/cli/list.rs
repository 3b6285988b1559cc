use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stdout};

#[test]
fn test_list_identifiers() -> Result<()> {
    let test = CliTest::with_file(
        "a.html",
        "<p i18n=\"@@nav.home\">Home</p>\n<a i18n-title=\"@@nav.home\" title=\"Home\">x</a>",
    )?;
    test.write_file("b.html", r#"<p i18n="@@footer">Bye</p>"#)?;

    let output = test.command().arg("list").output()?;
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("@@footer (1 usage)"));
    assert!(stdout.contains("@@nav.home (2 usages)"));
    assert!(stdout.contains("--> a.html:1:10"));
    assert!(stdout.contains("--> a.html:2:16"));
    assert!(stdout.contains("2 identifiers"));

    Ok(())
}

#[test]
fn test_list_with_prefix() -> Result<()> {
    let test = CliTest::with_file(
        "a.html",
        r#"<p i18n="@@nav.home">Home</p><p i18n="@@footer">Bye</p>"#,
    )?;

    let output = test.command().args(["list", "@@nav"]).output()?;
    let stdout = stdout(&output);

    assert!(stdout.contains("@@nav.home"));
    assert!(!stdout.contains("@@footer"));
    assert!(stdout.contains("1 identifier"));

    Ok(())
}

#[test]
fn test_list_empty_project() -> Result<()> {
    let test = CliTest::with_file("a.html", "<p>No markers</p>")?;

    let output = test.command().arg("list").output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "No translation identifiers found.\n");

    Ok(())
}
