pub const AUDITOR_SYSTEM: &str = r#"You are a meticulous code auditor. You review a single source file together with its lint report and produce a remediation plan that another engineer will implement.

## What to look for
- Functional bugs: wrong logic, unhandled edge cases, crashes such as division by zero or empty inputs.
- Style and convention violations reported by the linter or obvious from the code.
- Missing or incorrect type annotations on public functions.
- Error handling, input validation and documentation gaps.

## Output format
Reply in Markdown with exactly these sections:

## Critical Issues
## Style & Convention Violations
## Type Hints Required
## Best Practice Improvements
## Refactoring Recommendations
## Overall Assessment

## Guidelines
- Reference functions, variables and line numbers where you can.
- Order findings by severity: bugs before style.
- Describe what must change. Do not write the corrected file yourself."#;

pub const FIXER_SYSTEM: &str = r#"You are a senior software engineer repairing a single source file.

You receive the current code, an audit plan, the latest lint report and, after the first attempt, the output of the failing tests.

## Rules
- Return the COMPLETE corrected file. Never return fragments, diffs or placeholders such as "rest unchanged".
- Fix every failing test and every critical issue in the plan.
- Keep the public interface that the tests import: same module-level names, same signatures unless a test demands otherwise.
- Add type annotations and docstrings where they are missing.
- Reply with a single fenced code block containing the whole file and nothing else."#;

pub fn auditor_input(file_name: &str, lint_report: &str, code: &str, language: &str) -> String {
    format!(
        r#"**File:** {file_name}

**Lint Report:**
```
{lint_report}
```

**Code to Analyze:**
```{language}
{code}
```

Please provide your structured analysis following the required format."#
    )
}

pub struct FixerInput<'a> {
    pub file_name: &'a str,
    pub code: &'a str,
    pub plan: &'a str,
    pub test_results: &'a str,
    pub lint_report: &'a str,
    /// The attempt about to be made, counting from one.
    pub attempt: u32,
    pub max_attempts: u32,
    pub language: &'a str,
}

pub fn fixer_input(input: &FixerInput<'_>) -> String {
    let FixerInput {
        file_name,
        code,
        plan,
        test_results,
        lint_report,
        attempt,
        max_attempts,
        language,
    } = input;

    let test_section = if test_results.trim().is_empty() {
        String::new()
    } else {
        format!(
            "**Previous Test Results (attempt {} failed):**\n```\n{test_results}\n```\n\n",
            attempt.saturating_sub(1)
        )
    };

    format!(
        r#"**File:** {file_name}
**Attempt:** {attempt} of {max_attempts}

**Current Code:**
```{language}
{code}
```

**Refactoring Plan:**
{plan}

{test_section}**Lint Report:**
```
{lint_report}
```

Return the complete corrected file."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auditor_input_sections_in_order() {
        let input = auditor_input(
            "calculator.py",
            "Your code has been rated at 0.00/10",
            "def add(a, b):\n    return a + b",
            "python",
        );

        let file = input.find("**File:** calculator.py").unwrap();
        let lint = input.find("**Lint Report:**").unwrap();
        let code = input.find("**Code to Analyze:**").unwrap();
        assert!(file < lint && lint < code);

        assert!(input.contains("```python\ndef add(a, b):\n    return a + b\n```"));
        assert!(input.contains("rated at 0.00/10"));
        assert_eq!(input.matches("```").count(), 4);
    }

    #[test]
    fn test_auditor_input_with_empty_parts_keeps_structure() {
        let input = auditor_input("", "", "", "python");
        assert!(input.contains("**File:**"));
        assert!(input.contains("**Lint Report:**"));
        assert!(input.contains("**Code to Analyze:**"));
    }

    #[test]
    fn test_auditor_input_preserves_special_characters() {
        let code = "print(\"Hello, \\n world!\")\ndata = {\"key\": \"value\"}";
        let input = auditor_input("special.py", "W0301", code, "python");
        assert!(input.contains(code));
    }

    fn fixer(test_results: &str, attempt: u32) -> String {
        fixer_input(&FixerInput {
            file_name: "calc.py",
            code: "def divide(a, b):\n    return a / b",
            plan: "## Critical Issues\n- guard b == 0",
            test_results,
            lint_report: "rated at 5.00/10",
            attempt,
            max_attempts: 10,
            language: "python",
        })
    }

    #[test]
    fn test_fixer_input_first_attempt_has_no_test_section() {
        let input = fixer("", 1);
        assert!(input.contains("**Attempt:** 1 of 10"));
        assert!(input.contains("guard b == 0"));
        assert!(input.contains("rated at 5.00/10"));
        assert!(!input.contains("Previous Test Results"));
    }

    #[test]
    fn test_fixer_input_includes_previous_failures() {
        let input = fixer("FAILED test_calc.py::test_divide - ZeroDivisionError", 3);
        assert!(input.contains("**Attempt:** 3 of 10"));
        assert!(input.contains("Previous Test Results (attempt 2 failed)"));
        assert!(input.contains("ZeroDivisionError"));
    }
}
