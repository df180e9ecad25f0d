use anyhow::Result;

use crate::{CliTest, stdout};

#[test]
fn test_languages_lists_registry() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("languages").output()?;
    assert!(output.status.success());

    let out = stdout(&output);
    for tag in ["python", "c", "cpp", "cuda", "objcpp"] {
        assert!(
            out.lines().any(|line| line.starts_with(tag)),
            "missing {tag} in:\n{out}"
        );
    }
    assert!(out.contains(".cpp .cxx .hh .hpp .hxx"));
    assert!(out.contains("docstrings"));

    Ok(())
}
