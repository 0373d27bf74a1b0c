//! Prompt Builder
//!
//! Pure functions turning a session snapshot into the system prompt and the
//! trimmed message list sent to the backend.

use interview_agent_core::{ConversationTurn, InterviewSession, ResumeProfile, TurnRole};
use interview_agent_llm::Message;

/// System prompt used for the final evaluation call
pub const EVALUATION_SYSTEM_PROMPT: &str = "You are an expert interviewer providing a final evaluation report. Be honest, constructive, and professional.";

/// Everything needed for one backend call
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub messages: Vec<Message>,
}

/// Build the prompt for the next turn of `session`.
pub fn build_prompt(session: &InterviewSession, history_window: usize) -> Prompt {
    Prompt {
        system: system_prompt(session),
        messages: recent_messages(&session.conversation_history, history_window),
    }
}

/// Stage-, performance-, resume- and cheating-aware instructions.
pub fn system_prompt(session: &InterviewSession) -> String {
    let state = &session.agent_state;

    let resume_context = session
        .parsed_resume_data
        .as_ref()
        .map(resume_summary)
        .unwrap_or_default();

    let cheating_context = if session.cheating_score > 0 {
        format!(
            "\nANTI-CHEATING ALERT: {} violations detected.\nConsider this in your evaluation and maintain professionalism.\n",
            session.cheating_score
        )
    } else {
        String::new()
    };

    format!(
        r#"You are an intelligent AI Interview Agent conducting a professional job interview.

CANDIDATE INFORMATION:
- Name: {name}
- Email: {email}
{resume_context}
CURRENT INTERVIEW STAGE: {stage}
QUESTIONS ASKED SO FAR: {questions}
PERFORMANCE LEVEL: {performance}
{cheating_context}
YOUR RESPONSIBILITIES:
1. Conduct a natural, conversational interview
2. Ask relevant questions based on the current stage
3. Evaluate responses intelligently
4. Adapt difficulty based on candidate performance
5. Maintain professional and encouraging tone
6. Progress through stages: greeting → personal → resume → technical → closing

INTERVIEW STAGES:
- greeting: Welcome the candidate warmly, explain the process
- personal: Ask about background, motivations, career goals (2-3 questions)
- resume: Deep dive into their resume, projects, experience (3-4 questions)
- technical: Technical questions or coding logic based on role (4-5 questions)
- closing: Thank them, ask if they have questions, conclude professionally

ADAPTIVE QUESTIONING:
- If candidate struggles: Ask simpler follow-up questions, provide hints
- If candidate excels: Ask more challenging questions, probe deeper
- Always acknowledge good answers and encourage improvement

RESPONSE FORMAT:
Respond with a single JSON object and nothing else:
{{
    "message": "Your question or response to candidate",
    "stage": "greeting|personal|resume|technical|closing",
    "action": "ask_question|evaluate|progress_stage|conclude",
    "question_category": "PERSONAL|RESUME|TECHNICAL|CODING|BEHAVIORAL",
    "evaluation": {{
        "score": 0-10,
        "feedback": "brief feedback on their previous answer"
    }},
    "next_stage": "stage to move to, if progressing"
}}
Include "evaluation" only when scoring the candidate's previous answer.

Be conversational, professional, and adaptive. Your goal is to assess the candidate fairly while making them comfortable."#,
        name = session.candidate_name,
        email = session.candidate_email,
        resume_context = resume_context,
        stage = state.current_stage,
        questions = state.questions_asked,
        performance = state.performance_level,
        cheating_context = cheating_context,
    )
}

fn resume_summary(resume: &ResumeProfile) -> String {
    let or_na = |s: &str| if s.trim().is_empty() { "N/A".to_string() } else { s.to_string() };
    let mut summary = format!(
        "\nCANDIDATE RESUME SUMMARY:\n- Skills: {}\n- Experience: {}\n- Education: {}\n",
        resume.skills.join(", "),
        or_na(&resume.experience_summary),
        or_na(&resume.education),
    );
    if !resume.current_role.trim().is_empty() && resume.current_role != "N/A" {
        summary.push_str(&format!("- Current role: {}\n", resume.current_role));
    }
    if resume.years_of_experience > 0 {
        summary.push_str(&format!(
            "- Years of experience: {}\n",
            resume.years_of_experience
        ));
    }
    if !resume.key_projects.is_empty() {
        summary.push_str(&format!("- Key projects: {}\n", resume.key_projects.join("; ")));
    }
    summary
}

/// The last `window` turns as backend messages, oldest first.
///
/// Leading assistant turns are dropped so the list always opens with the
/// candidate, which chat APIs require.
pub fn recent_messages(history: &[ConversationTurn], window: usize) -> Vec<Message> {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .skip_while(|turn| turn.role == TurnRole::Assistant)
        .map(|turn| match turn.role {
            TurnRole::User => Message::user(turn.content.clone()),
            TurnRole::Assistant => Message::assistant(turn.content.clone()),
        })
        .collect()
}

/// Synthesized first candidate turn that makes the agent open the interview.
pub fn greeting_instruction(candidate_name: &str) -> String {
    format!(
        "Start the interview by greeting {} warmly. Introduce yourself as an AI Interview Agent, \
         explain the interview process briefly (it will have personal, resume-based, and technical \
         questions), and ask your first personal question to break the ice.",
        candidate_name
    )
}

/// User prompt for the final evaluation call.
pub fn evaluation_prompt(
    candidate_name: &str,
    total_questions: usize,
    average_score: f64,
    cheating_violations: u32,
    duration_minutes: i64,
) -> String {
    format!(
        r#"Based on the complete interview with {candidate_name}, generate a comprehensive evaluation report.

INTERVIEW SUMMARY:
- Total Questions: {total_questions}
- Average Score: {average_score:.2}/10
- Cheating Violations: {cheating_violations}
- Duration: {duration_minutes} minutes

Please provide:
1. Overall Performance Assessment (2-3 sentences)
2. Technical Skills Rating (1-10)
3. Communication Skills Rating (1-10)
4. Strengths (bullet points)
5. Areas for Improvement (bullet points)
6. Hiring Recommendation (Strong Yes / Yes / Maybe / No)
7. Additional Comments

Format as a professional evaluation report."#
    )
}
