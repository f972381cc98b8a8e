//! Instruction templates for remote merging

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

const ROLE: &str = "\
You are an expert at consolidating structured records.

Both records in each task describe the same entity (they share the same \
unique key). Merge them into one complete, accurate record.";

/// Conflict handling with no preference for either side.
pub const BALANCED_RULES: &str = "\
1. Keep the unique key field unchanged
2. If only one record has a non-null value for a field, use that value
3. If both records have values, choose the more complete or accurate one
4. For list fields, combine the unique elements of both
5. Never drop information that appears in only one record";

/// Conflict handling that favours the existing record.
pub const PREFER_EXISTING_RULES: &str = "\
1. Keep the unique key field unchanged
2. If one record has a null or empty value and the other has data, use the data
3. If both have valid but conflicting values, keep the EXISTING record's value
4. For list fields, combine both lists and remove duplicates";

/// Conflict handling that favours the incoming record.
pub const PREFER_INCOMING_RULES: &str = "\
1. Keep the unique key field unchanged
2. If one record has a null or empty value and the other has data, use the data
3. If both have valid but conflicting values, take the INCOMING record's value
4. For list fields, combine both lists and remove duplicates";

/// Output contract appended to every instruction.
pub const OUTPUT_CONTRACT: &str = "\
Input: a JSON array of tasks. Each task has an \"existing\" record (Item A) \
and an \"incoming\" record (Item B).

Output: ONLY a JSON array containing exactly one merged record per task, in \
the same order as the tasks. Every merged record must be a JSON object with \
the same fields as the inputs. Do NOT include any explanation or markdown.";

/// Runtime context appended to a custom rule, evaluated on every batch.
pub type DynamicRule = Arc<dyn Fn() -> String + Send + Sync>;

/// What the remote collaborator is told to do with each pair.
#[derive(Clone)]
pub enum Instruction {
    /// No preference between existing and incoming
    Balanced,
    /// Existing wins semantic conflicts
    PreferExisting,
    /// Incoming wins semantic conflicts
    PreferIncoming,
    /// Caller-supplied rule
    Custom {
        /// Static merge rules
        rule: String,
        /// Optional context recomputed for every batch
        dynamic: Option<DynamicRule>,
    },
}

impl Instruction {
    /// Strategy name reported by the merger using this instruction
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Instruction::Balanced => "llm_balanced",
            Instruction::PreferExisting => "llm_prefer_existing",
            Instruction::PreferIncoming => "llm_prefer_incoming",
            Instruction::Custom { .. } => "llm_custom_rule",
        }
    }

    /// Render the instruction text.
    ///
    /// For custom rules the dynamic context is evaluated on each call and
    /// appended under a `Context/Dynamic Rules:` heading unless it is blank.
    pub fn render(&self) -> String {
        let rules = match self {
            Instruction::Balanced => BALANCED_RULES.to_string(),
            Instruction::PreferExisting => PREFER_EXISTING_RULES.to_string(),
            Instruction::PreferIncoming => PREFER_INCOMING_RULES.to_string(),
            Instruction::Custom { rule, dynamic } => {
                let mut text = rule.clone();
                if let Some(dynamic) = dynamic {
                    let context = dynamic();
                    if !context.trim().is_empty() {
                        text.push_str("\n\nContext/Dynamic Rules:\n");
                        text.push_str(&context);
                    }
                }
                text
            }
        };
        format!("{}\n\nMerging Rules:\n{}", ROLE, rules)
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Custom { rule, dynamic } => f
                .debug_struct("Custom")
                .field("rule", rule)
                .field("dynamic", &dynamic.is_some())
                .finish(),
            other => f.write_str(other.strategy_name()),
        }
    }
}

/// Build the messages array for an OpenAI-compatible chat completions request.
pub fn build_messages(pairs: &[(Value, Value)], instruction: &str) -> Value {
    let tasks: Vec<Value> = pairs
        .iter()
        .map(|(existing, incoming)| {
            serde_json::json!({
                "existing": existing,
                "incoming": incoming,
            })
        })
        .collect();
    let user = serde_json::to_string_pretty(&tasks).unwrap_or_else(|_| "[]".to_string());

    serde_json::json!([
        {"role": "system", "content": format!("{}\n\n{}", instruction, OUTPUT_CONTRACT)},
        {"role": "user", "content": user}
    ])
}
