// Prompt constants for keyword extraction and edit suggestions.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for keyword extraction.
pub const KEYWORD_SYSTEM: &str = "You are an expert in resume optimization and job analysis.";

/// Keyword extraction prompt. Replace `{max_keywords}` and `{posting_text}`.
pub const KEYWORD_PROMPT_TEMPLATE: &str = r#"Analyze the job posting below and extract the SKILL-RELATED keywords a candidate should work into their resume or cover letter.

Return a JSON array of strings, most relevant first:
["Python", "SQL", "Agile methodology"]

Rules:
- At most {max_keywords} keywords
- Technical skills, programming languages, frameworks, methodologies and tools that are stated or clearly implied
- No generic terms ("communication", "team player") and nothing unrelated to the job requirements

JOB POSTING:
{posting_text}"#;

pub const RESUME_SYSTEM: &str = "You are an expert resume writer and ATS optimization specialist.";

pub const COVER_LETTER_SYSTEM: &str =
    "You are an expert cover letter writer and ATS optimization specialist.";

/// Suggestion prompt. Replace: {document_label}, {document}, {keywords_json},
/// {formatting_rules}, {targeting_rules}, {focus}, {examples}
pub const SUGGESTION_PROMPT_TEMPLATE: &str = r#"Analyze this LaTeX {document_label} and propose specific edits that work the listed keywords in naturally.

CURRENT {document_label} (LaTeX source):
{document}

KEYWORDS TO INCORPORATE:
{keywords_json}

{formatting_rules}

{targeting_rules}

FOCUS:
{focus}

Return a JSON ARRAY of suggestion objects with EXACTLY these fields:
[
  {
    "id": "unique_snake_case_id",
    "type": "replace" | "insert_after",
    "target_text": "exact LaTeX copied from the document",
    "replacement_text": "new LaTeX (replaces target_text, or is inserted after it)",
    "description": "one sentence on what the edit does",
    "keywords_used": ["Keyword"]
  }
]

EXAMPLES:
{examples}

Propose 1-2 suggestions per keyword at most. Quality over quantity."#;

pub const RESUME_FOCUS: &str = "Technical skills lists, experience bullets and achievements. \
    Extend an existing \\item or skills line rather than rewriting whole sections.";

pub const COVER_LETTER_FOCUS: &str = "Connect past experience to the role's requirements \
    inside existing paragraphs. Keep the narrative voice and paragraph structure.";

pub const RESUME_EXAMPLES: &str = r#"[
  {
    "id": "skill_python",
    "type": "replace",
    "target_text": "     \\textbf{Programming Languages}: Java, C++, JavaScript \\\\",
    "replacement_text": "     \\textbf{Programming Languages}: Java, C++, JavaScript, \\textbf{Python} \\\\",
    "description": "Add Python to programming languages with emphasis",
    "keywords_used": ["Python"]
  },
  {
    "id": "exp_django",
    "type": "insert_after",
    "target_text": "\\item Developed web applications using modern frameworks",
    "replacement_text": "\n\\item Built REST APIs with \\textbf{Django} and \\textbf{Flask} backed by PostgreSQL",
    "description": "Add concrete Python web framework experience",
    "keywords_used": ["Django", "Flask"]
  }
]"#;

pub const COVER_LETTER_EXAMPLES: &str = r#"[
  {
    "id": "exp_python",
    "type": "replace",
    "target_text": "I have experience in software development",
    "replacement_text": "I have extensive experience in \\textbf{Python} software development with \\textbf{Django} and \\textbf{Flask}",
    "description": "Name the Python stack explicitly",
    "keywords_used": ["Python", "Django", "Flask"]
  }
]"#;
