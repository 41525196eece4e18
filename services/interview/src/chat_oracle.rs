//! Chat-completions implementation of the decision oracle.
//!
//! Works against any OpenAI-compatible endpoint (Groq is the default
//! provider). Each call builds a role- and persona-aware prompt, asks for
//! strict JSON where a structured result is needed, and validates the
//! reply through serde. A reply that fails validation surfaces as an
//! error; the core substitutes its fallback decision, so nothing here
//! needs to guess at partial content.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use mockdrill_core::memory::{ConversationTurn, Speaker};
use mockdrill_core::oracle::{
    Decision, DecisionOracle, EvaluationRequest, FeedbackDraft, FeedbackRequest,
};
use mockdrill_core::roles::{Persona, Role};

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub content: String,
}

/// The oracle's per-turn verdict as it appears on the wire.
#[derive(Debug, Deserialize)]
struct DecisionWire {
    response: String,
    #[serde(default)]
    followup: bool,
    #[serde(default)]
    followup_question: Option<String>,
    #[serde(default)]
    complete: bool,
}

impl From<DecisionWire> for Decision {
    fn from(wire: DecisionWire) -> Self {
        Decision {
            acknowledgment: wire.response,
            wants_followup: wire.followup,
            followup_question: wire.followup_question,
            complete: wire.complete,
        }
    }
}

pub struct ChatOracle {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl ChatOracle {
    pub fn new(api_key: String, model: String, endpoint: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            endpoint,
        }
    }

    async fn call_llm(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> Result<String> {
        // Not every provider supports response_format, so JSON output is
        // requested through the system prompt instead.
        let system_content = if json_mode {
            format!("{system_prompt}\n\nIMPORTANT: Respond with valid JSON only. No additional text.")
        } else {
            system_prompt.to_string()
        };

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_content },
                { "role": "user", "content": user_prompt }
            ],
            "temperature": 0.7,
            "max_tokens": 2048
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<LlmResponse>()
            .await?;

        let content = &resp
            .choices
            .first()
            .ok_or_else(|| anyhow::anyhow!("No response from LLM"))?
            .message
            .content;
        if content.trim().is_empty() {
            return Err(anyhow::anyhow!("Empty response from LLM"));
        }
        Ok(content.clone())
    }
}

#[async_trait]
impl DecisionOracle for ChatOracle {
    async fn greet(&self, role: Role, persona: Persona, candidate_name: &str) -> Result<String> {
        let adaptive_note = if persona == Persona::Adaptive {
            "\n5. Mention that you will adapt to their communication style"
        } else {
            ""
        };

        let system_prompt = format!(
            "You are a professional interview agent conducting a mock {role} interview.\n\n\
             {persona_instructions}\n\n\
             Generate a warm, professional greeting that:\n\
             1. Welcomes the candidate\n\
             2. Explains the interview structure (5-7 questions)\n\
             3. Mentions anti-cheating monitoring\n\
             4. Sets expectations for honest, detailed answers{adaptive_note}\n\n\
             Keep it concise (3-4 sentences).",
            persona_instructions = persona.instructions(),
        );
        let user_prompt =
            format!("Generate a greeting for {candidate_name} for a {role} interview.");

        let greeting = self.call_llm(&system_prompt, &user_prompt, false).await?;
        Ok(greeting.trim().to_string())
    }

    async fn evaluate(&self, request: EvaluationRequest) -> Result<Decision> {
        let system_prompt = format!(
            "You are a professional interview agent conducting a {role} interview.\n\n\
             {persona_instructions}\n\n\
             Role Context: {context}\n\n\
             Scoring Rubric: {rubric}\n\n\
             Current Question: {question}\n\n\
             Evaluate the candidate's answer and decide:\n\
             1. Provide brief acknowledgment/feedback on their answer (1-2 sentences)\n\
             2. Decide if a follow-up question is needed (only if answer was vague or needs \
             clarification)\n\
             3. If no follow-up, just acknowledge and indicate readiness for next question\n\n\
             Respond with JSON:\n\
             {{\n    \"response\": \"your acknowledgment\",\n    \"followup\": true/false,\n    \
             \"followup_question\": \"optional follow-up question\",\n    \"complete\": false\n}}",
            role = request.role,
            persona_instructions = request.persona.instructions(),
            context = request.role.context(),
            rubric = rubric_text(request.role),
            question = request.current_prompt,
        );

        let user_prompt = format!(
            "Conversation so far: {} messages\n\n\
             User's latest answer: {}\n\n\
             Cheating events detected: {}",
            request.history.len(),
            request.answer,
            request.cheating.total_events,
        );

        let raw = self.call_llm(&system_prompt, &user_prompt, true).await?;
        let wire: DecisionWire = serde_json::from_str(extract_json(&raw))
            .with_context(|| format!("oracle returned a malformed decision: {raw}"))?;
        Ok(wire.into())
    }

    async fn final_feedback(&self, request: FeedbackRequest) -> Result<FeedbackDraft> {
        let system_prompt = format!(
            "You are a professional interview evaluator for {role} positions.\n\n\
             Analyze the complete interview conversation and provide detailed feedback.\n\n\
             Scoring Rubric: {rubric}\n\n\
             {persona_instructions}\n\n\
             Generate feedback in JSON format:\n\
             {{\n    \"technical_score\": 1-10,\n    \"communication_score\": 1-10,\n    \
             \"confidence_score\": 1-10,\n    \"overall_summary\": \"2-3 sentence summary\",\n    \
             \"strengths\": [\"strength 1\", \"strength 2\", \"strength 3\"],\n    \
             \"weaknesses\": [\"weakness 1\", \"weakness 2\"],\n    \
             \"recommendations\": [\"recommendation 1\", \"recommendation 2\", \
             \"recommendation 3\"]\n}}\n\n\
             Base scores on:\n\
             - Technical accuracy and depth\n\
             - Communication clarity\n\
             - Confidence and professionalism\n\
             - Ability to articulate thoughts",
            role = request.role,
            rubric = rubric_text(request.role),
            persona_instructions = request.persona.instructions(),
        );

        let answers: Vec<&ConversationTurn> = request
            .history
            .iter()
            .filter(|t| t.speaker == Speaker::Candidate)
            .collect();
        let total_words: usize = answers
            .iter()
            .map(|t| t.content.split_whitespace().count())
            .sum();

        let user_prompt = format!(
            "Interview Transcript:\n{transcript}\n\n\
             Cheating Summary:\n{cheating}\n\n\
             User provided {answer_count} answers with {total_words} total words.\n\n\
             CRITICAL: If the candidate provided no meaningful answers or ended interview \
             immediately without participating (0 messages or <10 words), give 0/10 for ALL \
             score categories and provide feedback explaining lack of participation. Do not \
             give 1/10 - give 0/10.\n\
             For minimal participation, scores should reflect the quality (0-2 range for very \
             poor performance).\n\n\
             Provide comprehensive feedback.",
            transcript = render_transcript(&request.history),
            cheating = serde_json::to_string_pretty(&request.cheating)
                .unwrap_or_else(|_| "{}".to_string()),
            answer_count = answers.len(),
        );

        let raw = self.call_llm(&system_prompt, &user_prompt, true).await?;
        let draft: FeedbackDraft = serde_json::from_str(extract_json(&raw))
            .with_context(|| format!("oracle returned malformed feedback: {raw}"))?;
        Ok(draft)
    }
}

/// Render the rubric as "axis: description" lines for a prompt.
fn rubric_text(role: Role) -> String {
    role.rubric()
        .iter()
        .map(|(axis, description)| format!("{axis}: {description}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render the transcript the way the evaluator prompt expects it.
fn render_transcript(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| {
            let speaker = match turn.speaker {
                Speaker::Interviewer => "interviewer",
                Speaker::Candidate => "candidate",
            };
            format!("{speaker}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Models often wrap JSON in markdown fences despite instructions; strip
/// them before parsing.
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
