//! System prompt assembly.

use std::sync::Arc;

use cf_domain::tool::Tool;

/// Base instruction, sent on every turn.
pub const BASE_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Answer questions directly and conversationally.";

/// Build the system prompt. The tool-usage block is appended only when
/// tools are active this turn.
pub fn system_prompt(tools: &[Arc<dyn Tool>]) -> String {
    if tools.is_empty() {
        return BASE_SYSTEM_PROMPT.to_owned();
    }

    let mut prompt = String::from(BASE_SYSTEM_PROMPT);
    prompt.push_str("\n\nYou have access to the following tools:\n");
    for tool in tools {
        let def = tool.definition();
        prompt.push_str(&format!("- {}: {}\n", def.name, def.description));
    }
    prompt.push_str(
        "\nOnly invoke tools from this list. Use search_knowledge when the question \
         concerns project- or domain-specific facts; answer from general knowledge \
         otherwise. After you receive a tool result, respond to the user in plain \
         text. Do not call the same tool again and do not chain multiple tool calls \
         in one turn.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_domain::config::KnowledgeConfig;
    use cf_tools::KnowledgeSearchTool;

    #[test]
    fn no_tools_means_base_prompt_only() {
        assert_eq!(system_prompt(&[]), BASE_SYSTEM_PROMPT);
    }

    #[test]
    fn tool_block_lists_names_and_rules() {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(KnowledgeSearchTool::new(
            None,
            KnowledgeConfig::default(),
        ))];
        let prompt = system_prompt(&tools);
        assert!(prompt.starts_with(BASE_SYSTEM_PROMPT));
        assert!(prompt.contains("- search_knowledge:"));
        assert!(prompt.contains("Do not call the same tool again"));
    }
}
