// Shared prompt fragments. Each service that calls the LLM keeps its own
// prompts.rs alongside it and splices these in.

/// Appended to every system prompt: JSON only, no prose.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// LaTeX rules every generated fragment must follow.
pub const LATEX_FORMATTING_RULES: &str = r"CRITICAL LATEX FORMATTING REQUIREMENTS:
1. Every target_text and replacement_text MUST be valid LaTeX
2. Use standard commands: \textbf{}, \textit{}, \emph{}, \item, \section{}, \subsection{}
3. Escape special characters: \& instead of &, \$ instead of $, \% instead of %, \# instead of #, \_ instead of _
4. Put at least one space after every \item
5. Curly braces MUST be balanced in both target_text and replacement_text
6. Keep the document's existing indentation and spacing";

/// Anchoring rules: the edit is located by exact substring match.
pub const TARGETING_RULES: &str = r"TARGETING RULES:
1. target_text MUST be copied verbatim from the document, character for character
2. target_text MUST occur exactly once in the document; if a fragment repeats (a company name, a date), extend it until it is unique
3. Prefer complete lines or complete \item entries over partial lines
4. Never let two suggestions target overlapping text
5. For insert_after, replacement_text is inserted right after target_text; include any newline you need";
