use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

fn duplicate_project() -> Result<CliTest> {
    let test = CliTest::with_file("a.html", r#"<p i18n="@@a">Hello</p>"#)?;
    test.write_file("b.html", r#"<h1 i18n="@@b">Hello</h1><span i18n="@@b">Hello</span>"#)?;
    Ok(test)
}

#[test]
fn test_fix_lists_fixable_records() -> Result<()> {
    let test = duplicate_project()?;

    let output = test.fix_command().output()?;
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("--action <keep:@@a|keep:@@b>"));
    assert!(stdout.contains("2 fixable record(s)"));

    Ok(())
}

#[test]
fn test_fix_dry_run_does_not_write() -> Result<()> {
    let test = duplicate_project()?;

    let output = test
        .fix_command()
        .args(["--id", "@@b", "--index", "0", "--action", "keep:@@a"])
        .output()?;
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("b.html:1 => @@a"));
    assert!(stdout.contains("Would apply Keep @@a: 2 edit(s) in 1 file(s)."));
    assert_eq!(
        test.read_file("b.html")?,
        r#"<h1 i18n="@@b">Hello</h1><span i18n="@@b">Hello</span>"#
    );

    Ok(())
}

#[test]
fn test_fix_apply_renames_identifier() -> Result<()> {
    let test = duplicate_project()?;

    let output = test
        .fix_command()
        .args(["--id", "@@b", "--index", "0", "--action", "keep:@@a", "--apply"])
        .output()?;
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout.contains("Applied Keep @@a: 2 edit(s) in 1 file(s)."));
    assert!(stdout.contains("No problems remaining."));
    assert_eq!(
        test.read_file("b.html")?,
        r#"<h1 i18n="@@a">Hello</h1><span i18n="@@a">Hello</span>"#
    );
    assert_eq!(test.check_command().output()?.status.code(), Some(0));

    Ok(())
}

#[test]
fn test_fix_apply_unifies_values() -> Result<()> {
    let test = CliTest::with_file("a.html", r#"<p i18n="@@t">Welcome</p>"#)?;
    test.write_file(
        "b.html",
        r#"<p i18n="@@t"> Welcome back </p><img i18n-alt="@@t" alt="Welcome back">"#,
    )?;

    let output = test
        .fix_command()
        .args(["--id", "@@t", "--index", "1", "--action", "use:0", "--apply"])
        .output()?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(
        test.read_file("b.html")?,
        r#"<p i18n="@@t"> Welcome </p><img i18n-alt="@@t" alt="Welcome">"#
    );
    assert_eq!(test.read_file("a.html")?, r#"<p i18n="@@t">Welcome</p>"#);

    Ok(())
}

#[test]
fn test_fix_unknown_action() -> Result<()> {
    let test = duplicate_project()?;

    let output = test
        .fix_command()
        .args(["--id", "@@b", "--index", "0", "--action", "flatten", "--apply"])
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unknown fix action 'flatten'"));

    Ok(())
}

#[test]
fn test_fix_record_without_fixer() -> Result<()> {
    let test = duplicate_project()?;

    let output = test
        .fix_command()
        .args(["--id", "@@a", "--index", "0", "--action", "keep:@@a"])
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("No fix available for '@@a' at index 0"));

    Ok(())
}
