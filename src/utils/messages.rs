/// Pure functions for formatting error and success messages (Discord-agnostic)

/// Format a validation error message with emoji
pub fn format_error(message: &str) -> String {
    format!("❌ {}", message)
}

/// Format a success message with emoji
pub fn format_success(message: &str) -> String {
    format!("✅ {}", message)
}

/// Format a warning message with emoji
pub fn format_warning(message: &str) -> String {
    format!("⚠️ {}", message)
}

/// Format an info message with emoji
pub fn format_info(message: &str) -> String {
    format!("ℹ️ {}", message)
}

/// Build an error message for missing permissions
pub fn build_permission_error(required_role: &str) -> String {
    format_error(&format!(
        "You don't have permission to do this. Required role: {}",
        required_role
    ))
}

/// Build an error message for command usage in wrong context
pub fn build_context_error(required_context: &str) -> String {
    format_error(&format!("This command must be used {}", required_context))
}

/// Build a database error message (generic, doesn't expose internals)
pub fn build_database_error() -> String {
    format_error("A database error occurred. Please try again later.")
}

/// Build the message shown when a feature has not been configured yet
pub fn build_setup_required(missing: &str) -> String {
    format_warning(&format!(
        "No {} has been configured for this server yet. An admin needs to run `/setup` first.",
        missing
    ))
}

/// Summarize a CSV task import
pub fn build_import_summary(inserted: usize, skipped: usize, malformed: &[String]) -> String {
    let total = inserted + skipped;
    let mut message = format_success(&format!(
        "Task import finished: **{}** new, **{}** skipped as duplicates, **{}** total rows.",
        inserted, skipped, total
    ));

    if !malformed.is_empty() {
        let shown: Vec<&str> = malformed.iter().take(5).map(String::as_str).collect();
        message.push_str(&format!(
            "\n{}\n{}",
            format_warning(&format!("{} row(s) could not be read:", malformed.len())),
            shown.join("\n")
        ));
        if malformed.len() > shown.len() {
            message.push_str(&format!("\n…and {} more", malformed.len() - shown.len()));
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error() {
        assert_eq!(format_error("Something failed"), "❌ Something failed");
    }

    #[test]
    fn test_format_success() {
        assert_eq!(format_success("It worked"), "✅ It worked");
    }

    #[test]
    fn test_format_warning() {
        assert_eq!(format_warning("Be careful"), "⚠️ Be careful");
    }

    #[test]
    fn test_format_info() {
        assert_eq!(format_info("Good to know"), "ℹ️ Good to know");
    }

    #[test]
    fn test_build_permission_error() {
        let result = build_permission_error("BustinBot Admin");
        assert!(result.contains("❌"));
        assert!(result.contains("permission"));
        assert!(result.contains("BustinBot Admin"));
    }

    #[test]
    fn test_build_context_error() {
        let result = build_context_error("in a server");
        assert!(result.contains("❌"));
        assert!(result.contains("in a server"));
    }

    #[test]
    fn test_build_setup_required() {
        let result = build_setup_required("task channel");
        assert!(result.contains("task channel"));
        assert!(result.contains("/setup"));
    }

    #[test]
    fn test_build_import_summary() {
        let result = build_import_summary(3, 2, &[]);
        assert!(result.contains("**3** new"));
        assert!(result.contains("**2** skipped"));
        assert!(result.contains("**5** total"));
        assert!(!result.contains("could not be read"));
    }

    #[test]
    fn test_build_import_summary_with_malformed_rows() {
        let malformed: Vec<String> = (1..=7).map(|i| format!("Row {}: bad", i)).collect();
        let result = build_import_summary(0, 0, &malformed);
        assert!(result.contains("7 row(s)"));
        assert!(result.contains("Row 5: bad"));
        assert!(!result.contains("Row 6: bad"));
        assert!(result.contains("2 more"));
    }
}
