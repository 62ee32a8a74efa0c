// Shared prompt fragments. Each service that calls the LLM defines its own
// prompts.rs alongside it; only cross-cutting text lives here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "Always respond with strict JSON. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";
