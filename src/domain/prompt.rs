use crate::domain::crisis::CrisisDescription;

/// The two prompts sent during a run. Each renders to a single user message.
#[derive(Debug, Clone, Copy)]
pub enum PromptTemplate<'a> {
    Crisis {
        description: &'a CrisisDescription,
    },
    Legal {
        description: &'a CrisisDescription,
        crisis_statement: &'a str,
    },
}

impl PromptTemplate<'_> {
    pub fn render(&self) -> String {
        match self {
            PromptTemplate::Crisis { description } => format!(
                "You are a crisis management expert.\n\
                 Draft a **short and professional statement for the press** addressing the crisis while maintaining trust in the company.\n\
                 Your response should:\n\
                 - Acknowledge the issue.\n\
                 - Reassure customers, stakeholders, and the public.\n\
                 - Briefly mention the steps being taken to resolve the situation.\n\
                 - Be concise, clear, and confident.\n\
                 \n\
                 Crisis Situation: {}\n\
                 \n\
                 Press Statement:\n",
                description.as_str()
            ),
            PromptTemplate::Legal {
                description,
                crisis_statement,
            } => format!(
                "You are a legal expert.\n\
                 Review the following short press statement and edit it to (1) deny the direct culpability, and (2) remove any language that could put the company in legal liability.\n\
                 Ensure the statement remains professional and reassuring but avoids making admissions of fault or liability.\n\
                 In the final shared statement, please add a note about what you changed from the original statement and why, giving at least 1 concrete example.\n\
                 \n\
                 Crisis Situation: {}\n\
                 \n\
                 Original Press Statement:\n\
                 {}\n\
                 \n\
                 Legally Safe Press Statement:\n",
                description.as_str(),
                crisis_statement
            ),
        }
    }
}
