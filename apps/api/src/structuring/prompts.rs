// Prompt template for resume structuring. Shared by the local backend and
// hosted text generation models.

/// Replace `{resume_text}` before sending.
pub const STRUCTURE_PROMPT_TEMPLATE: &str = r#"Please extract structured information from the following resume text and return it as JSON with these fields:

{
  "contact_info": {
    "name": "Full name",
    "email": "email@domain.com",
    "phone": "phone number",
    "location": "city, state"
  },
  "summary": "Professional summary or objective",
  "experience": [
    {
      "company": "Company name",
      "position": "Job title",
      "duration": "Start - End dates",
      "description": "Job description and achievements"
    }
  ],
  "education": [
    {
      "institution": "School name",
      "degree": "Degree type",
      "field": "Field of study",
      "year": "Graduation year"
    }
  ],
  "skills": ["List of skills"],
  "certifications": ["List of certifications"]
}

Resume text:
{resume_text}
"#;

/// Characters of resume text embedded in the prompt.
pub const PROMPT_TEXT_LIMIT: usize = 2000;
