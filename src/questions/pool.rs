//! 兜底题库：生成结果不足时按固定顺序补齐

/// 固定顺序的通用行为面试题
pub const FALLBACK_QUESTIONS: [&str; 12] = [
    "Tell me about a time when you had to lead a team through a difficult project. What was your approach and what were the results?",
    "Describe a situation where you had to solve a complex problem with limited resources. How did you handle it and what did you learn?",
    "Can you share an example of when you had to work with a difficult team member or stakeholder? What actions did you take?",
    "Tell me about a time when you had to adapt quickly to a significant change in your work environment. What was the outcome?",
    "Describe a situation where you made a mistake. How did you handle it and what did you learn from the experience?",
    "Give me an example of when you had to influence others without having direct authority over them. What was the result?",
    "Tell me about a time when you had to work under tight deadlines. How did you prioritize and manage your time?",
    "Describe a situation where you had to learn a new skill quickly to complete a project. What was the impact?",
    "Can you share an example of when you had to give difficult feedback to a colleague? How did you approach it?",
    "Tell me about a time when you had to make a decision with incomplete information. What was the outcome?",
    "Describe a situation where you had to manage competing priorities from different stakeholders. How did you handle it?",
    "Give me an example of when you went above and beyond what was expected in your role. What were the results?",
];

/// 题库前 count 道（题库不足时返回全部）
pub fn fallback_questions(count: usize) -> Vec<String> {
    FALLBACK_QUESTIONS
        .iter()
        .take(count)
        .map(|q| q.to_string())
        .collect()
}

pub fn pool_size() -> usize {
    FALLBACK_QUESTIONS.len()
}
