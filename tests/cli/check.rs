use anyhow::Result;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use crate::{CliTest, stdout};

#[test]
fn test_clean_project() -> Result<()> {
    let test = CliTest::with_file("src/app.component.html", r#"<p i18n="@@greeting">Hello</p>"#)?;

    let output = test.check_command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_snapshot!(stdout(&output).trim_end(), @"✓ Checked 1 template file - no issues found");

    Ok(())
}

#[test]
fn test_duplicate_value() -> Result<()> {
    let test = CliTest::with_file("a.html", r#"<p i18n="@@a">Hello</p>"#)?;
    test.write_file("b.html", r#"<h1 i18n="@@b">Hello</h1>"#)?;

    let output = test.check_command().output()?;
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains(
        "warning: \"@@b\" The translation has the same value as @@a  duplicate-value"
    ));
    assert!(stdout.contains("--> b.html:1:11"));
    assert!(stdout.contains("1 | <h1 i18n=\"@@b\">Hello</h1>"));
    assert!(stdout.contains("= note: value: Hello"));
    assert!(stdout.contains("= hint: ngi18n fix --id '@@b' --index 0 --action <keep:@@a|keep:@@b>"));
    assert!(stdout.contains("1 problems (0 errors, 1 warning)"));

    Ok(())
}

#[test]
fn test_mismatching_values_flag_every_record() -> Result<()> {
    let test = CliTest::with_file("a.html", r#"<p i18n="@@title">Welcome</p>"#)?;
    test.write_file("b.html", r#"<p i18n="@@title">Welcome back</p>"#)?;

    let output = test.check_command().output()?;
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout.matches("value-mismatch").count(), 2);
    assert!(stdout.contains("--> a.html:1:10"));
    assert!(stdout.contains("--> b.html:1:10"));
    assert!(stdout.contains("2 problems (2 errors, 0 warnings)"));

    Ok(())
}

#[test]
fn test_interpolation_differences_are_not_mismatches() -> Result<()> {
    let test = CliTest::with_file("a.html", r#"<p i18n="@@hi">Hi {{ user.name }}</p>"#)?;
    test.write_file("b.html", "<p i18n=\"@@hi\">Hi\n  {{name}}</p>")?;

    let output = test.check_command().output()?;

    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));

    Ok(())
}

#[test]
fn test_extraction_error() -> Result<()> {
    let test = CliTest::with_file("a.html", r#"<img src="x.png" i18n-alt="@@logo">"#)?;

    let output = test.check_command().output()?;
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("error: \"@@logo\" matching attribute was not found: alt  extraction"));

    Ok(())
}

#[test]
fn test_nested_html_warning() -> Result<()> {
    let test = CliTest::with_file("a.html", r#"<p i18n="@@terms">Read <a href="/t">terms</a></p>"#)?;

    let output = test.check_command().output()?;
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("html-content"));
    assert!(stdout.contains("--action <flatten>"));

    Ok(())
}

#[test]
fn test_config_disables_validator() -> Result<()> {
    let test = CliTest::with_file("a.html", r#"<p i18n="@@a">Hello</p>"#)?;
    test.write_file("b.html", r#"<p i18n="@@b">Hello</p>"#)?;
    test.write_file(
        ".ngi18nrc.json",
        r#"{ "validators": { "duplicateValues": { "enabled": false, "level": "warning" } } }"#,
    )?;

    let output = test.check_command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_snapshot!(stdout(&output).trim_end(), @"✓ Checked 2 template files - no issues found");

    Ok(())
}

#[test]
fn test_id_pattern_from_config() -> Result<()> {
    let test = CliTest::with_file("a.html", r#"<p i18n="greeting">Hello</p>"#)?;
    test.write_file(
        ".ngi18nrc.json",
        r#"{ "validators": { "idMustMatchRegex": { "enabled": true, "level": "error", "pattern": "^@@" } } }"#,
    )?;

    let output = test.check_command().output()?;
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("The id greeting does not match required pattern: ^@@"));
    assert!(stdout.contains("id-pattern"));

    Ok(())
}

#[test]
fn test_default_ignores_skip_dist() -> Result<()> {
    let test = CliTest::with_file("src/a.html", r#"<p i18n="@@a">Hello</p>"#)?;
    test.write_file("dist/a.html", r#"<p i18n="@@b">Hello</p>"#)?;
    test.write_file("node_modules/lib/a.html", r#"<p i18n="@@c">Hello</p>"#)?;

    let output = test.check_command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Checked 1 template file"));

    Ok(())
}

#[test]
fn test_root_argument() -> Result<()> {
    let test = CliTest::with_file("web/a.html", r#"<p i18n="@@a">Hello</p>"#)?;
    test.write_file("web/b.html", r#"<p i18n="@@b">Hello</p>"#)?;

    let output = test.check_command().args(["--root", "web"]).output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("--> b.html:1:10"));

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_file("a.html", "<p></p>")?;
    test.write_file(".ngi18nrc.json", "{ not json")?;

    let output = test.check_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(crate::stderr(&output).contains("Failed to parse config file"));

    Ok(())
}
