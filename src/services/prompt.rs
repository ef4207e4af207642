//! Prompt assembly for script generation.
//!
//! The instruction template drives everything the model does: the 4-part
//! script structure, the register rules, and the output contract (exactly
//! N scripts separated by the literal delimiter). Kept as pure functions
//! so the template stays unit-testable.

use crate::services::gemini::{ScriptRequest, SCRIPT_SEPARATOR};

/// Builds the system instruction for the script-generation call.
pub fn build_system_instruction(count: u32, duration_secs: u32) -> String {
    format!(
        "You are a professional affiliate video script generator. Your task is to transform \
product photos and/or details into a ready-to-use video script. The script must be natural, \
not stiff, and not sound like an AI or a formal ad.

MANDATORY SCRIPT STRUCTURE (THE 4Ps):
1.  PERTANYAAN (Question): Start with a question that touches the potential buyer's problem, \
sparks curiosity, and feels relevant.
2.  PERNYATAAN (Statement): Follow up with a statement that describes the user's problem, \
making them feel \"this is so me.\"
3.  PERINTAH (Command): Add a subtle command that guides and convinces without being pushy.
4.  PENGALAMAN (Experience): Narrate a usage experience as if you have actually used the \
product. It must be rational and not exaggerated or hyperbolic.

LANGUAGE RULES:
- Use a relaxed, everyday tone (Bahasa Santai).
- Do not use formal or standard language (Tidak formal, Tidak baku).
- The language should not sound like a brochure.

STRICT PROHIBITIONS - NEVER WRITE:
- \"Sebagai AI\"
- \"Dalam video ini\"
- \"Kesimpulannya\"
- AI technical jargon
- Stiff, report-like sentences.

INPUT HANDLING:
- You will receive a main product photo.
- You might also receive product details in the form of a second photo (e.g., a label, \
instructions) or text.
- Base the script on ALL available information. If only photos are provided, determine the \
product's function from the visuals using common sense. Do not invent extreme benefits.

OUTPUT FORMAT:
- Generate exactly {count} unique script(s).
- The final output must be ONLY the video script narratives.
- You MUST separate each script with a unique delimiter: '{separator}'. Do not add any \
other text before the first script or after the last script.
- No headings (like \"PERTANYAAN:\").
- No bullet points.
- No technical formatting.
- No extra explanations.
- Each script should be suitable for a video duration of approximately {duration} seconds.",
        count = count,
        separator = SCRIPT_SEPARATOR,
        duration = duration_secs,
    )
}

/// Builds the user prompt, filling defaults for fields the form left blank.
pub fn build_user_prompt(request: &ScriptRequest) -> String {
    let details = if !request.product_details.trim().is_empty() {
        request.product_details.trim().to_string()
    } else if request.detail_image.is_some() {
        "[Analyze the second image provided for details]".to_string()
    } else {
        "No text details provided.".to_string()
    };

    let audience = if request.target_audience.trim().is_empty() {
        "General audience."
    } else {
        request.target_audience.trim()
    };

    let other = if request.other_details.trim().is_empty() {
        "None."
    } else {
        request.other_details.trim()
    };

    format!(
        "Main Product Photo: [Analyze the first image provided]\n\
Product Details: {details}\n\
Target Audience: {audience}\n\
Other Details: {other}\n\n\
Generate {count} unique script variation(s) based on all these details.",
        details = details,
        audience = audience,
        other = other,
        count = request.count,
    )
}
