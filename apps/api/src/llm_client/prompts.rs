// Cross-cutting prompt fragments shared by every completion call.
// The rubric and essay template live in grading::prompts.

/// System instruction sent ahead of every user prompt.
pub const GRADER_SYSTEM: &str = "Você é um corretor especializado em redações do ENEM. \
    Avalie com base nas 5 competências oficiais e forneça feedback detalhado.";
