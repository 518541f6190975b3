// Prompt for resume improvement suggestions. Shared by the local and hosted
// backends.

/// Characters of resume text embedded in the prompt.
pub const RESUME_TEXT_LIMIT: usize = 1500;
/// Characters of job description embedded in the prompt.
pub const JOB_DESCRIPTION_LIMIT: usize = 800;

/// Replace `{resume_text}` before sending.
pub const ENHANCE_PROMPT_TEMPLATE: &str = r#"Please analyze the following resume and provide specific suggestions for improvement:

Resume Content:
{resume_text}

Please provide:
1. 3-5 specific suggestions for improving this resume
2. Ways to better highlight relevant experience and skills
3. Suggestions for strengthening the professional summary
4. Tips for better keyword optimization

Focus on actionable, practical advice.
"#;

/// Appended when a job description is supplied. Replace `{job_description}`.
pub const JOB_ALIGNMENT_TEMPLATE: &str = r#"
Target Job Description:
{job_description}

Additionally, suggest how to better align the resume with this specific job:
- Which skills should be emphasized more
- What experience should be highlighted
- How to incorporate relevant keywords naturally
"#;
