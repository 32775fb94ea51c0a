//! 固定的 Prompt 模板（HEARS：Headline / Events / Actions / Results / Significance）

use crate::core::session::{JobDetails, ResponseRecord};
use crate::llm::Message;

const INTERVIEWER_SYSTEM: &str = "You are an expert behavioral interviewer and career coach. \
You evaluate answers with the HEARS method: Headline, Events, Actions, Results, Significance.";

const QUESTION_PROMPT_HEADER: &str = "behavioral interview questions based on the resume and job description provided";

/// 是否为出题 prompt（Mock 客户端据此区分请求）
pub fn is_question_prompt(prompt: &str) -> bool {
    prompt.contains(QUESTION_PROMPT_HEADER)
}

fn job_block(job: &JobDetails) -> String {
    format!(
        "- Title: {}\n- Company: {}\n- Description: {}\n- Experience Level: {} years\n- Industry: {}\n- Interview Duration: {} minutes",
        job.title,
        job.company,
        job.description,
        job.required_experience_years,
        job.industry
            .map(|i| i.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        job.duration_minutes(),
    )
}

/// 出题：要求严格返回 JSON 字符串数组
pub fn question_generation(resume_text: &str, job: &JobDetails, count: usize) -> Vec<Message> {
    let prompt = format!(
        "Generate exactly {count} {QUESTION_PROMPT_HEADER}.

RESUME CONTENT:
{resume_text}

JOB DETAILS:
{job}

REQUIREMENTS:
1. Generate exactly {count} questions - no more, no less
2. Focus on the HEARS method (Headline, Events, Actions, Results, Significance)
3. Tailor questions to the candidate's background and the job requirements
4. Include variety: leadership, problem-solving, conflict resolution, teamwork, adaptability, communication
5. Match difficulty to the experience level and interview duration
6. Make questions specific and encourage detailed responses covering all HEARS elements

IMPORTANT: Return your response in this EXACT format as a valid JSON array:
[\"Question 1 text here\", \"Question 2 text here\", \"Question 3 text here\"]

Do not include any other text, explanations, or formatting. Just the JSON array with exactly {count} questions.",
        job = job_block(job),
    );
    vec![Message::system(INTERVIEWER_SYSTEM), Message::user(prompt)]
}

/// 单题点评
pub fn answer_feedback(question: &str, answer: &str, job: &JobDetails) -> Vec<Message> {
    let prompt = format!(
        "Analyze this single interview question and answer using the HEARS methodology:

QUESTION: {question}
CANDIDATE'S ANSWER: {answer}
JOB CONTEXT: {title} at {company}

Provide feedback in this format:

## Question Analysis

**H (Headline):** [Did they provide a clear situation summary? Rate 1-10]
**E (Events):** [Did they describe specific events/challenges? Rate 1-10]
**A (Actions):** [Did they detail their specific actions? Rate 1-10]
**R (Results):** [Did they share measurable outcomes? Rate 1-10]
**S (Significance):** [Did they demonstrate skills/learning? Rate 1-10]

**Overall Score:** X/10
**Strengths:** [2-3 key strengths in this response]
**Areas for Improvement:** [1-2 specific suggestions]",
        title = job.title,
        company = job.company,
    );
    vec![Message::system(INTERVIEWER_SYSTEM), Message::user(prompt)]
}

/// 整场面试总评
pub fn session_feedback(responses: &[ResponseRecord], job: &JobDetails) -> Vec<Message> {
    let transcript = responses
        .iter()
        .map(|r| {
            format!(
                "Q{n}: {q}\nA{n}: {a}",
                n = r.question_number,
                q = r.question,
                a = r.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = format!(
        "Analyze this complete behavioral interview using the HEARS methodology:

INTERVIEW RESPONSES:
{transcript}

JOB CONTEXT:
{job}
TOTAL QUESTIONS ANSWERED: {answered}

Provide comprehensive feedback in this EXACT format:

# OVERALL INTERVIEW FEEDBACK REPORT

## HEADLINE ANALYSIS
[How well did the candidate provide situation summaries across all questions]
**Headline Score: X/10**

## EVENTS ANALYSIS
[Quality of situations/challenges described across all responses]
**Events Score: X/10**

## ACTIONS ANALYSIS
[Depth and specificity of actions described]
**Actions Score: X/10**

## RESULTS ANALYSIS
[Quality of outcomes and measurable impacts shared]
**Results Score: X/10**

## SIGNIFICANCE ANALYSIS
- Leadership / Problem-Solving / Communication / Teamwork / Adaptability, each with **Score: X/10**

## OVERALL ASSESSMENT
**Interview Duration Performance:** [How well they used the time]
**HEARS Methodology Adherence:** X/10
**Top 3 Strengths:** [List with specific examples]
**Top 3 Development Areas:** [Specific, actionable improvements]
**Overall Interview Score:** **X/10**
**Hiring Recommendation:** **[STRONG HIRE/HIRE/MAYBE/PASS]**

## IMPROVEMENT RECOMMENDATIONS
[Specific, actionable advice based on HEARS gaps]",
        job = job_block(job),
        answered = responses.iter().filter(|r| !r.skipped).count(),
    );
    vec![Message::system(INTERVIEWER_SYSTEM), Message::user(prompt)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::Industry;
    use chrono::Utc;

    fn job() -> JobDetails {
        JobDetails {
            title: "Data Analyst".into(),
            company: "Globex".into(),
            description: "SQL and dashboards".into(),
            required_experience_years: 2,
            industry: Some(Industry::Finance),
            duration_secs: 1800,
        }
    }

    #[test]
    fn test_question_prompt_carries_inputs() {
        let msgs = question_generation("Ten years of SQL", &job(), 6);
        let user = &msgs[1].content;
        assert!(is_question_prompt(user));
        assert!(user.contains("Generate exactly 6"));
        assert!(user.contains("Ten years of SQL"));
        assert!(user.contains("Globex"));
        assert!(user.contains("Industry: Finance"));
        assert!(user.contains("30 minutes"));
    }

    #[test]
    fn test_feedback_prompts_are_not_question_prompts() {
        let msgs = answer_feedback("Why?", "Because.", &job());
        assert!(!is_question_prompt(&msgs[1].content));
        assert!(msgs[1].content.contains("Data Analyst at Globex"));

        let record = ResponseRecord {
            question_number: 1,
            question: "Why?".into(),
            answer: "Because.".into(),
            skipped: false,
            created_at: Utc::now(),
        };
        let msgs = session_feedback(&[record], &job());
        assert!(msgs[1].content.contains("Q1: Why?\nA1: Because."));
        assert!(msgs[1].content.contains("TOTAL QUESTIONS ANSWERED: 1"));
    }
}
