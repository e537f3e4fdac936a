// All prompt templates for the resume analysis tasks.
// Each template describes the JSON the caller expects back; nothing enforces it.

/// Resume grading prompt. Replace `{job_section}` and `{resume_text}` before sending.
/// `{job_section}` is either empty or the output of `job_section()`.
pub const GRADE_PROMPT_TEMPLATE: &str = r#"
You are an expert resume reviewer. Grade this resume on a scale of 1-100 and provide detailed feedback.

{job_section}Resume:
{resume_text}

Respond with JSON in exactly this format:
{
  "overallScore": number,
  "categories": [
    {
      "name": "Content Quality",
      "score": number,
      "maxScore": 20,
      "feedback": "detailed feedback",
      "suggestions": ["suggestion1", "suggestion2"]
    },
    {
      "name": "Formatting & Structure",
      "score": number,
      "maxScore": 20,
      "feedback": "detailed feedback",
      "suggestions": ["suggestion1", "suggestion2"]
    },
    {
      "name": "Relevance to Job",
      "score": number,
      "maxScore": 20,
      "feedback": "detailed feedback",
      "suggestions": ["suggestion1", "suggestion2"]
    },
    {
      "name": "Skills & Experience",
      "score": number,
      "maxScore": 20,
      "feedback": "detailed feedback",
      "suggestions": ["suggestion1", "suggestion2"]
    },
    {
      "name": "Achievement Focus",
      "score": number,
      "maxScore": 20,
      "feedback": "detailed feedback",
      "suggestions": ["suggestion1", "suggestion2"]
    }
  ],
  "suggestions": ["overall suggestion1", "overall suggestion2"],
  "strengths": ["strength1", "strength2"],
  "weaknesses": ["weakness1", "weakness2"]
}
"#;

/// Optimization prompt. Replace `{job_description}` and `{resume_text}`.
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"
You are an expert resume optimizer. Give specific suggestions to optimize this resume for the given job description.

Job Description:
{job_description}

Resume:
{resume_text}

Respond with JSON in exactly this format:
{
  "suggestions": [
    {
      "type": "add|modify|remove|reorder",
      "section": "section name",
      "content": "specific content suggestion",
      "reason": "why this change is needed",
      "priority": "high|medium|low"
    }
  ],
  "overallRecommendations": ["recommendation1", "recommendation2"],
  "keywordSuggestions": ["keyword1", "keyword2"],
  "missingSkills": ["skill1", "skill2"]
}
"#;

/// Job description extraction prompt. Replace `{job_description}`.
pub const PARSE_JOB_PROMPT_TEMPLATE: &str = r#"
You are an expert job description analyzer. Parse this job description and extract the key information.

Job Description:
{job_description}

Respond with JSON in exactly this format:
{
  "title": "job title",
  "company": "company name",
  "requirements": [
    {
      "category": "technical|soft|education|experience",
      "requirement": "specific requirement",
      "priority": "required|preferred|nice-to-have"
    }
  ],
  "responsibilities": ["responsibility1", "responsibility2"],
  "qualifications": [
    {
      "type": "education|experience|certification|skill",
      "description": "qualification description",
      "required": true/false
    }
  ],
  "benefits": ["benefit1", "benefit2"],
  "salary": {
    "min": number,
    "max": number,
    "currency": "USD",
    "period": "yearly"
  },
  "location": "location",
  "jobType": "full-time|part-time|contract",
  "experienceLevel": "entry|mid|senior"
}
"#;

/// Resume-to-job match prompt. Replace `{job_description}` and `{resume_text}`.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"
You are an expert at matching resumes to job descriptions. Analyze how well this resume matches the job requirements.

Job Description:
{job_description}

Resume:
{resume_text}

Respond with JSON in exactly this format:
{
  "overallMatch": number (0-100),
  "categoryMatches": [
    {
      "category": "Technical Skills",
      "score": number,
      "maxScore": 100,
      "matchedItems": ["item1", "item2"],
      "missingItems": ["missing1", "missing2"]
    }
  ],
  "missingSkills": ["skill1", "skill2"],
  "recommendations": ["recommendation1", "recommendation2"],
  "strengths": ["strength1", "strength2"],
  "gaps": ["gap1", "gap2"]
}
"#;

/// Optional job description block for the grading prompt.
pub fn job_section(job_description: Option<&str>) -> String {
    match job_description.map(str::trim) {
        Some(jd) if !jd.is_empty() => format!("Job Description:\n{jd}\n\n"),
        _ => String::new(),
    }
}

pub fn grade_prompt(resume_text: &str, job_description: Option<&str>) -> String {
    let (head, tail) = split_at_resume_slot(GRADE_PROMPT_TEMPLATE);
    let head = head.replace("{job_section}", &job_section(job_description));
    [head.as_str(), resume_text, tail].concat()
}

pub fn optimize_prompt(resume_text: &str, job_description: &str) -> String {
    fill_job_and_resume(OPTIMIZE_PROMPT_TEMPLATE, resume_text, job_description)
}

pub fn parse_job_prompt(job_description: &str) -> String {
    PARSE_JOB_PROMPT_TEMPLATE.replace("{job_description}", job_description)
}

pub fn match_prompt(resume_text: &str, job_description: &str) -> String {
    fill_job_and_resume(MATCH_PROMPT_TEMPLATE, resume_text, job_description)
}

/// Every template puts the resume after the job description. Splitting there means
/// placeholder-looking text inside the job description is never expanded.
fn split_at_resume_slot(template: &str) -> (&str, &str) {
    template
        .split_once("{resume_text}")
        .unwrap_or((template, ""))
}

fn fill_job_and_resume(template: &str, resume_text: &str, job_description: &str) -> String {
    let (head, tail) = split_at_resume_slot(template);
    let head = head.replace("{job_description}", job_description);
    [head.as_str(), resume_text, tail].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Roe\nSenior Rust Engineer, 8 years";
    const JD: &str = "Staff Engineer. Required: Rust, Kubernetes.";

    #[test]
    fn test_grade_prompt_without_job_description_has_no_job_block() {
        let prompt = grade_prompt(RESUME, None);
        assert!(prompt.contains(RESUME));
        assert!(!prompt.contains("Job Description:"));
        assert!(!prompt.contains("{job_section}"));
    }

    #[test]
    fn test_grade_prompt_blank_job_description_is_treated_as_absent() {
        assert_eq!(grade_prompt(RESUME, Some("   ")), grade_prompt(RESUME, None));
    }

    #[test]
    fn test_grade_prompt_with_job_description_precedes_resume() {
        let prompt = grade_prompt(RESUME, Some(JD));
        let jd_at = prompt.find(JD).unwrap();
        let resume_at = prompt.find(RESUME).unwrap();
        assert!(jd_at < resume_at);
    }

    #[test]
    fn test_grade_prompt_lists_all_five_categories() {
        let prompt = grade_prompt(RESUME, None);
        for name in [
            "Content Quality",
            "Formatting & Structure",
            "Relevance to Job",
            "Skills & Experience",
            "Achievement Focus",
        ] {
            assert!(prompt.contains(name), "missing category {name}");
        }
        assert_eq!(prompt.matches("\"maxScore\": 20").count(), 5);
    }

    #[test]
    fn test_optimize_and_match_prompts_fill_both_slots() {
        for prompt in [optimize_prompt(RESUME, JD), match_prompt(RESUME, JD)] {
            assert!(prompt.contains(RESUME));
            assert!(prompt.contains(JD));
            assert!(!prompt.contains("{resume_text}"));
            assert!(!prompt.contains("{job_description}"));
        }
    }

    #[test]
    fn test_placeholder_text_in_input_is_not_expanded() {
        let prompt = optimize_prompt("resume body", "see {resume_text} above");
        assert_eq!(prompt.matches("resume body").count(), 1);
        assert!(prompt.contains("see {resume_text} above"));

        let prompt = grade_prompt("resume body", Some("see {resume_text} above"));
        assert_eq!(prompt.matches("resume body").count(), 1);
    }

    #[test]
    fn test_parse_job_prompt_requests_structured_fields() {
        let prompt = parse_job_prompt(JD);
        assert!(prompt.contains(JD));
        for field in ["\"requirements\"", "\"salary\"", "\"jobType\"", "\"experienceLevel\""] {
            assert!(prompt.contains(field));
        }
    }
}
