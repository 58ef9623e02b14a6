//! Console output formatter for discovery reports

use aicli_domain::{DiscoveryReport, FeatureStatus, Message, OutputFormat, Role};
use colored::Colorize;

/// Formats discovery reports and transcript messages for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format(report: &DiscoveryReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => Self::format_report(report),
            OutputFormat::Json => Self::format_json(report),
        }
    }

    /// Format as JSON
    pub fn format_json(report: &DiscoveryReport) -> String {
        report.to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Human-readable listing grouped by availability
    pub fn format_report(report: &DiscoveryReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::section_header("Inference providers"));
        Self::push_statuses(&mut output, &report.inferences, true);
        Self::push_statuses(&mut output, &report.inferences_not_available, false);
        Self::push_disabled(&mut output, &report.inferences_disabled_by_policy, "disabled by policy");
        Self::push_disabled(&mut output, &report.inferences_disabled, "disabled in configuration");
        if report.inferences.is_empty() && report.inferences_not_available.is_empty() {
            output.push_str(&format!("  {}\n", "(none)".dimmed()));
        }

        output.push_str(&format!("\n{} ", "Selected inference:".cyan().bold()));
        match &report.inference {
            Some(inference) => output.push_str(&format!("{}\n", inference.name.green().bold())),
            None => output.push_str(&format!("{}\n", "none".red())),
        }

        output.push_str(&Self::section_header("Tools providers"));
        Self::push_statuses(&mut output, &report.tools, true);
        Self::push_statuses(&mut output, &report.tools_not_available, false);
        Self::push_disabled(&mut output, &report.tools_disabled_by_policy, "disabled by policy");
        Self::push_disabled(&mut output, &report.tools_disabled, "disabled in configuration");
        if report.tools.is_empty() && report.tools_not_available.is_empty() {
            output.push_str(&format!("  {}\n", "(none)".dimmed()));
        }

        output
    }

    fn push_statuses(output: &mut String, statuses: &[FeatureStatus], available: bool) {
        for status in statuses {
            let mark = if available { "v".green() } else { "x".red() };
            let locality = if status.local { "local" } else { "remote" };
            output.push_str(&format!(
                "  {} {} {}\n",
                mark,
                status.name.bold(),
                format!("({locality})").dimmed()
            ));
            output.push_str(&format!("      {}\n", status.description));
            output.push_str(&format!("      {}\n", status.reason.dimmed()));
            if !status.models.is_empty() {
                output.push_str(&format!("      models: {}\n", status.models.join(", ")));
            }
        }
    }

    fn push_disabled(output: &mut String, names: &[String], label: &str) {
        for name in names {
            output.push_str(&format!(
                "  {} {} {}\n",
                "-".yellow(),
                name.bold(),
                format!("({label})").yellow()
            ));
        }
    }

    /// One transcript message as printed after a round
    pub fn format_message(message: &Message) -> String {
        match message.role {
            Role::Assistant if message.has_tool_calls() => {
                let mut lines: Vec<String> = Vec::new();
                if !message.text.is_empty() {
                    lines.push(message.text.clone());
                }
                for call in &message.tool_calls {
                    lines.push(
                        format!("-> {}({})", call.name, Self::truncate(&call.arguments, 200))
                            .dimmed()
                            .to_string(),
                    );
                }
                lines.join("\n")
            }
            Role::Assistant => message.text.clone(),
            Role::Tool => {
                let name = message.tool_name.as_deref().unwrap_or("tool");
                format!(
                    "{}\n{}",
                    format!("[{name}]").dimmed(),
                    Self::indent(&Self::truncate(&message.text, 400), "  ").dimmed()
                )
            }
            Role::Error => format!("{} {}", "Error:".red().bold(), message.text),
            Role::User => format!("{} {}", ">>>".bold(), message.text),
            Role::System => format!("{} {}", "system:".dimmed(), message.text.dimmed()),
        }
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn truncate(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((index, _)) => format!("{}...", &text[..index]),
            None => text.to_string(),
        }
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aicli_domain::FeatureAttributes;

    fn report() -> DiscoveryReport {
        let ollama = FeatureStatus::new(
            &FeatureAttributes::new("ollama", "Ollama local inference provider").with_local(true),
            "ollama is accessible at http://localhost:11434",
        )
        .with_models(vec!["llama3.2:3b".into()]);
        let github = FeatureStatus::new(
            &FeatureAttributes::new("github", "GitHub tools").with_public(true),
            "GITHUB_PERSONAL_ACCESS_TOKEN is not set",
        );
        DiscoveryReport {
            inferences: vec![ollama.clone()],
            inference: Some(ollama),
            tools_not_available: vec![github],
            tools_disabled_by_policy: vec!["fs".into()],
            tools_disabled: vec!["kubernetes".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_format_report_text() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&report(), OutputFormat::Text);

        assert!(text.contains("Inference providers"));
        assert!(text.contains("v ollama (local)"));
        assert!(text.contains("models: llama3.2:3b"));
        assert!(text.contains("Selected inference: ollama"));
        assert!(text.contains("x github (remote)"));
        assert!(text.contains("GITHUB_PERSONAL_ACCESS_TOKEN is not set"));
        assert!(text.contains("- fs (disabled by policy)"));
        assert!(text.contains("- kubernetes (disabled in configuration)"));
    }

    #[test]
    fn test_format_report_json() {
        let json = ConsoleFormatter::format(&report(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["inference"]["name"], "ollama");
        assert_eq!(value["toolsDisabledByPolicy"][0], "fs");
    }

    #[test]
    fn test_format_messages() {
        colored::control::set_override(false);
        assert_eq!(
            ConsoleFormatter::format_message(&Message::assistant("Hello")),
            "Hello"
        );
        assert_eq!(
            ConsoleFormatter::format_message(&Message::error("model unavailable")),
            "Error: model unavailable"
        );
        let call = aicli_domain::ToolCallRequest::new("call_0", "toolset_enable", r#"{"toolsets":"fs"}"#);
        assert_eq!(
            ConsoleFormatter::format_message(&Message::assistant_tool_calls("Enabling.", vec![call])),
            "Enabling.\n-> toolset_enable({\"toolsets\":\"fs\"})"
        );
        let long = "x".repeat(500);
        let tool = ConsoleFormatter::format_message(&Message::tool(long, "file_list"));
        assert!(tool.starts_with("[file_list]\n  "));
        assert!(tool.ends_with("..."));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
