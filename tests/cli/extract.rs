use anyhow::Result;

use crate::{CliTest, extract_json, stderr, stdout};

const MATH_C: &str = r#"#include <stdio.h>

/**
 * Adds two numbers.
 */
int add(int a, int b) {
    return a + b;  // no overflow check
}

const char *msg = "// not a comment";
"#;

#[test]
fn test_extract_text_report() -> Result<()> {
    let test = CliTest::with_file("src/math.c", MATH_C)?;

    let output = test.extract_command().arg("src").output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("doc: Adds two numbers."));
    assert!(out.contains("--> src/math.c:3-5"));
    assert!(out.contains("6 | int add(int a, int b) {"));
    assert!(out.contains("comment: no overflow check"));
    assert!(!out.contains("not a comment"));
    assert!(out.contains("Extracted 2 comments from 1 file"));

    Ok(())
}

#[test]
fn test_extract_json_records() -> Result<()> {
    let test = CliTest::with_file("src/math.c", MATH_C)?;

    let (output, json) = extract_json(&test, &["src"])?;
    assert!(output.status.success());

    let file = &json["files"][0];
    assert_eq!(file["file"], "src/math.c");
    assert_eq!(file["language"], "c");
    assert_eq!(file["totalComments"], 2);

    let doc = &file["comments"][0];
    assert_eq!(doc["type"], "block");
    assert_eq!(doc["docStyle"], true);
    assert_eq!(doc["text"], "Adds two numbers.");
    assert_eq!(doc["startLine"], 3);
    assert_eq!(doc["endLine"], 5);
    assert_eq!(doc["context"]["startLine"], 6);

    let inline = &file["comments"][1];
    assert_eq!(inline["context"]["text"], "    return a + b;");

    Ok(())
}

#[test]
fn test_extract_python_docstrings() -> Result<()> {
    let test = CliTest::with_file(
        "pkg/shapes.py",
        r##""""Geometry helpers."""

class Circle:
    """A circle."""

    def area(self):
        # pi r squared
        return 3.14159 * self.r ** 2

label = "# not a comment"
"##,
    )?;

    let (output, json) = extract_json(&test, &["pkg"])?;
    assert!(output.status.success());

    let comments = json["files"][0]["comments"].as_array().cloned().unwrap_or_default();
    let summary: Vec<(String, String)> = comments
        .iter()
        .map(|c| {
            (
                c["type"].as_str().unwrap_or_default().to_string(),
                c["text"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("docstring".to_string(), "Geometry helpers.".to_string()),
            ("docstring".to_string(), "A circle.".to_string()),
            ("line".to_string(), "pi r squared".to_string()),
        ]
    );
    assert_eq!(comments[0]["owner"]["kind"], "module");
    assert_eq!(comments[1]["owner"]["kind"], "class");
    assert_eq!(comments[1]["owner"]["name"], "Circle");

    assert_eq!(comments[0]["scope"], serde_json::json!([]));
    let scope = &comments[2]["scope"];
    assert_eq!(scope[0]["kind"], "class");
    assert_eq!(scope[0]["name"], "Circle");
    assert_eq!(scope[1]["kind"], "function");
    assert_eq!(scope[1]["name"], "area");
    assert_eq!(scope[1]["parameters"], serde_json::json!(["self"]));
    assert_eq!(scope[1]["startLine"], 6);
    assert_eq!(scope[1]["endLine"], 8);

    Ok(())
}

#[test]
fn test_unterminated_comment_fails_file() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("a/good.c", "// fine\nint x;\n")?;
    test.write_file("a/bad.c", "int y;\n/* never closed\n")?;

    let (output, json) = extract_json(&test, &["a"])?;
    assert_eq!(output.status.code(), Some(1));

    let files = json["files"].as_array().cloned().unwrap_or_default();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["file"], "a/good.c");

    let failure = &json["failures"][0];
    assert_eq!(failure["file"], "a/bad.c");
    assert_eq!(failure["line"], 2);
    assert_eq!(failure["column"], 1);

    let err = stderr(&output);
    assert!(err.contains("unterminated block comment"));
    assert!(err.contains("1 file could not be extracted"));

    Ok(())
}

#[test]
fn test_disabled_region_comments_are_reported() -> Result<()> {
    let test = CliTest::with_file(
        "legacy.cpp",
        "#if 0\n// retired path\nold_call();\n#endif\nint live;\n",
    )?;

    let (output, json) = extract_json(&test, &["legacy.cpp"])?;
    assert!(output.status.success());

    let comment = &json["files"][0]["comments"][0];
    assert_eq!(comment["text"], "retired path");
    assert_eq!(comment["inDisabledRegion"], true);
    assert_eq!(comment["context"]["disabled"], true);

    Ok(())
}

#[test]
fn test_language_flag_overrides_extension() -> Result<()> {
    let test = CliTest::with_file("script.txt", "# setup\nrun()\n")?;

    let output = test.extract_command().arg("script.txt").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--language"));

    let (output, json) = extract_json(&test, &["script.txt", "--language", "py"])?;
    assert!(output.status.success());
    assert_eq!(json["files"][0]["language"], "python");
    assert_eq!(json["files"][0]["comments"][0]["text"], "setup");

    Ok(())
}

#[test]
fn test_missing_path_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.extract_command().arg("nope").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Path does not exist"));

    Ok(())
}

#[test]
fn test_config_file_controls_scan() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".corexrc.json",
        r#"{ "ignores": ["**/vendor/**"], "languages": ["cuda"], "extensions": { "cuinc": "cuda" }, "contextLines": 1 }"#,
    )?;
    test.write_file("k/kernel.cu", "// launch\nstep1();\nstep2();\n")?;
    test.write_file("k/helpers.cuinc", "// helper\nhelp();\n")?;
    test.write_file("k/host.c", "// host side\nint h;\n")?;
    test.write_file("k/vendor/ext.cu", "// vendored\n")?;

    let (output, json) = extract_json(&test, &["k"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let files: Vec<&str> = json["files"]
        .as_array()
        .map(|files| files.iter().filter_map(|f| f["file"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(files, vec!["k/helpers.cuinc", "k/kernel.cu"]);
    assert_eq!(json["files"][1]["comments"][0]["context"]["text"], "step1();");

    Ok(())
}

#[test]
fn test_context_lines_flag_overrides_config() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".corexrc.json", r#"{ "contextLines": 1 }"#)?;
    test.write_file("a.c", "// head\none();\ntwo();\nthree();\n")?;

    let (_, json) = extract_json(&test, &["a.c", "--context-lines", "2"])?;
    assert_eq!(
        json["files"][0]["comments"][0]["context"]["text"],
        "one();\ntwo();"
    );

    let output = test
        .extract_command()
        .args(["a.c", "--context-lines", "0"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".corexrc.json", r#"{ "languages": ["fortran"] }"#)?;
    test.write_file("a.c", "// x\n")?;

    let output = test.extract_command().arg("a.c").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("languages"));

    Ok(())
}

#[test]
fn test_unterminated_string_warning() -> Result<()> {
    let test = CliTest::with_file("w.c", "#error can't build here\n// after\nint x;\n")?;

    let output = test.extract_command().arg("w.c").output()?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("comment: after"));
    assert!(stderr(&output).contains("1 lexical warning (use -v for details)"));

    let output = test.extract_command().args(["w.c", "-v"]).output()?;
    let err = stderr(&output);
    assert!(err.contains("warning: unterminated string literal"));
    assert!(err.contains("--> w.c:1"));

    Ok(())
}
