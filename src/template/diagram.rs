//! Template-set visualization: a Mermaid graph of the loaded templates plus
//! a per-template detail listing.

use std::fmt::Write;

use crate::core::model::Template;

/// Render the template configuration diagram document.
pub fn render_template_diagram(templates: &[Template]) -> String {
    let mut content = String::from(
        "# Template Configuration Diagram\n\n```mermaid\ngraph TD\n    A[Template System] --> B[Loaded Templates]\n\n",
    );

    for (i, template) in templates.iter().enumerate() {
        let node = i + 1;
        let pattern_preview: String = template.pattern.chars().take(50).collect();
        let _ = writeln!(content, "    B --> T{node}[{}]", template.name);
        let _ = writeln!(
            content,
            "    T{node} --> |Priority: {}| P{node}[Pattern: {pattern_preview}...]",
            template.priority
        );
        let _ = writeln!(content, "    T{node} --> |Mapping| M{node}[from, to, message]");
        content.push('\n');
    }

    content.push_str("```\n\n## Template Details\n\n");
    for template in templates {
        let _ = writeln!(content, "### {}", template.name);
        let _ = writeln!(content, "- **Priority**: {}", template.priority);
        let _ = writeln!(content, "- **Pattern**: `{}`", template.pattern);
        let mapping =
            serde_json::to_string_pretty(&template.mapping).unwrap_or_else(|_| "{}".to_string());
        let _ = writeln!(content, "- **Mapping**: {mapping}");
        if !template.description.is_empty() {
            let _ = writeln!(content, "- **Description**: {}", template.description);
        }
        content.push('\n');
    }

    content
}
