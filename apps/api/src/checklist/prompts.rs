// LLM prompt constants for checklist generation.

/// System prompt for checklist generation.
pub const CHECKLIST_SYSTEM: &str = "You are an HR assistant.";

/// Checklist prompt template. Replace `{role}` and `{departments}` before sending.
pub const CHECKLIST_PROMPT_TEMPLATE: &str = r#"Generate an onboarding checklist for a {role}. Include department-wise tasks.
Return a JSON array of objects like:
[
  {
    "description": "Task description",
    "department": "Mapped department name (e.g., IT, HR)"
  },
  ...
]
Only return valid departments from this list: {departments}
Do NOT include any text outside the JSON array.
Do NOT use markdown code fences."#;
