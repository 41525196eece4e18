//! Role and persona data: the closed enumerations a session is created
//! with, plus the fixed per-role question banks, context blurbs, and
//! scoring rubrics the oracle prompts are built from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InterviewError;

/// The position the candidate is interviewing for. Each role carries its
/// own fixed question plan and scoring rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "SDE")]
    Sde,
    Sales,
    #[serde(rename = "Retail Associate")]
    RetailAssociate,
    #[serde(rename = "HR")]
    Hr,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Sde, Role::Sales, Role::RetailAssociate, Role::Hr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sde => "SDE",
            Role::Sales => "Sales",
            Role::RetailAssociate => "Retail Associate",
            Role::Hr => "HR",
        }
    }

    /// The ordered base-question plan for this role. Fixed at session
    /// creation and consumed strictly in order.
    pub fn questions(&self) -> &'static [&'static str] {
        match self {
            Role::Sde => &[
                "Tell me about yourself and your experience with software development.",
                "Explain the difference between a process and a thread.",
                "What is your experience with data structures? Can you explain when you'd use a hash map vs. a binary tree?",
                "Describe a challenging bug you've encountered and how you debugged it.",
                "How do you ensure code quality in your projects?",
                "Explain the concept of REST APIs and how you've used them.",
                "What is your approach to learning new technologies?",
            ],
            Role::Sales => &[
                "Tell me about your experience in sales.",
                "How do you handle objections from potential customers?",
                "Describe a time when you successfully closed a difficult deal.",
                "What strategies do you use to build rapport with clients?",
                "How do you prioritize your sales pipeline?",
                "Tell me about a time you failed to meet a sales target. What did you learn?",
                "How do you stay motivated in a competitive sales environment?",
            ],
            Role::RetailAssociate => &[
                "Tell me about your customer service experience.",
                "How would you handle an angry or frustrated customer?",
                "Describe a time when you went above and beyond for a customer.",
                "How do you handle multiple customers at once during busy periods?",
                "What would you do if you suspected a customer of shoplifting?",
                "How do you stay knowledgeable about products you're selling?",
                "Why do you want to work in retail?",
            ],
            Role::Hr => &[
                "Tell me about your HR experience and areas of expertise.",
                "How do you handle confidential employee information?",
                "Describe your approach to resolving workplace conflicts.",
                "What strategies do you use for effective employee onboarding?",
                "How do you stay updated on labor laws and HR best practices?",
                "Tell me about a difficult employee situation you've handled.",
                "How do you promote diversity and inclusion in the workplace?",
            ],
        }
    }

    /// One-paragraph framing of what interviews for this role assess.
    pub fn context(&self) -> &'static str {
        match self {
            Role::Sde => {
                "Software Engineer interviews focus on technical knowledge, problem-solving, \
                 coding ability, and system design understanding."
            }
            Role::Sales => {
                "Sales interviews assess communication skills, persuasion ability, customer \
                 relationship management, and target-driven mindset."
            }
            Role::RetailAssociate => {
                "Retail interviews evaluate customer service skills, multitasking ability, \
                 product knowledge, and handling difficult situations."
            }
            Role::Hr => {
                "HR interviews focus on interpersonal skills, confidentiality, conflict \
                 resolution, policy knowledge, and employee relations."
            }
        }
    }

    /// The scoring axes the oracle is asked to judge against, as
    /// (axis, description) pairs.
    pub fn rubric(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Role::Sde => &[
                (
                    "technical_knowledge",
                    "Understanding of programming concepts, data structures, algorithms",
                ),
                (
                    "problem_solving",
                    "Ability to break down problems and think through solutions",
                ),
                ("communication", "Explaining technical concepts clearly"),
                (
                    "experience",
                    "Relevant project experience and practical application",
                ),
            ],
            Role::Sales => &[
                ("persuasion", "Ability to convince and influence"),
                (
                    "communication",
                    "Clear, confident, and engaging speaking style",
                ),
                (
                    "customer_focus",
                    "Understanding of customer needs and pain points",
                ),
                (
                    "results_orientation",
                    "Track record and approach to meeting targets",
                ),
            ],
            Role::RetailAssociate => &[
                (
                    "customer_service",
                    "Friendliness, patience, and problem-solving for customers",
                ),
                ("multitasking", "Ability to handle multiple tasks efficiently"),
                ("product_knowledge", "Interest in learning about products"),
                ("teamwork", "Ability to work well with others"),
            ],
            Role::Hr => &[
                (
                    "interpersonal_skills",
                    "Empathy, active listening, relationship building",
                ),
                (
                    "policy_knowledge",
                    "Understanding of HR practices and compliance",
                ),
                (
                    "conflict_resolution",
                    "Ability to mediate and resolve disputes",
                ),
                ("confidentiality", "Discretion and professional judgment"),
            ],
        }
    }

    /// Role-specific practice recommendation used by the feedback
    /// fallback path.
    pub fn practice_tip(&self) -> &'static str {
        match self {
            Role::Sde => "Practice coding problems on platforms like LeetCode and HackerRank",
            Role::Sales => "Study common sales scenarios and practice pitch delivery",
            Role::RetailAssociate => {
                "Focus on customer service scenarios and conflict resolution"
            }
            Role::Hr => "Review HR policies and practice behavioral interview questions",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InterviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                InterviewError::InvalidArgument(format!(
                    "invalid role {s:?}, expected one of: SDE, Sales, Retail Associate, HR"
                ))
            })
    }
}

/// The interviewer's communication style for a session. "Adaptive" detects
/// the candidate's style turn by turn instead of fixing one upfront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persona {
    Confused,
    Efficient,
    Chatty,
    #[serde(rename = "Edge-case")]
    EdgeCase,
    Adaptive,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::Confused,
        Persona::Efficient,
        Persona::Chatty,
        Persona::EdgeCase,
        Persona::Adaptive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Confused => "Confused",
            Persona::Efficient => "Efficient",
            Persona::Chatty => "Chatty",
            Persona::EdgeCase => "Edge-case",
            Persona::Adaptive => "Adaptive",
        }
    }

    /// Style instructions injected into every oracle system prompt.
    pub fn instructions(&self) -> &'static str {
        match self {
            Persona::Confused => {
                "The user may be uncertain or need guidance. Be patient, provide clear \
                 explanations, and gently redirect if needed."
            }
            Persona::Efficient => {
                "The user prefers concise, direct communication. Keep responses brief and to \
                 the point. Don't over-explain."
            }
            Persona::Chatty => {
                "The user tends to go off-topic. Be friendly but firm in redirecting to \
                 interview questions. Keep the conversation professional."
            }
            Persona::EdgeCase => {
                "The user may provide unusual or unexpected responses. Handle these \
                 gracefully, set boundaries, and guide back to relevant answers."
            }
            Persona::Adaptive => {
                "ADAPTIVE MODE: Automatically detect and adapt to the user's communication \
                 style:\n\
                 - If user is confused/uncertain: Be patient, provide clear explanations, and \
                 gently guide them\n\
                 - If user is efficient/direct: Keep responses brief and concise, don't \
                 over-explain\n\
                 - If user is chatty/goes off-topic: Be friendly but firm in redirecting to \
                 interview questions\n\
                 - If user provides edge-case/unusual responses: Handle gracefully, set \
                 boundaries, and guide back\n\n\
                 Continuously analyze the user's responses and adjust your communication \
                 style accordingly. Be flexible and responsive to their needs while \
                 maintaining professional interview standards."
            }
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = InterviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Persona::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                InterviewError::InvalidArgument(format!(
                    "invalid persona {s:?}, expected one of: Confused, Efficient, Chatty, \
                     Edge-case, Adaptive"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_a_seven_question_plan() {
        for role in Role::ALL {
            assert_eq!(role.questions().len(), 7, "role {role} plan length");
            assert!(role.questions().iter().all(|q| !q.is_empty()));
        }
    }

    #[test]
    fn every_role_has_a_four_axis_rubric() {
        for role in Role::ALL {
            assert_eq!(role.rubric().len(), 4, "role {role} rubric");
        }
    }

    #[test]
    fn role_round_trips_through_wire_name() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn role_serde_uses_wire_names() {
        let json = serde_json::to_string(&Role::RetailAssociate).unwrap();
        assert_eq!(json, "\"Retail Associate\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"SDE\"").unwrap(),
            Role::Sde
        );
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "Astronaut".parse::<Role>().unwrap_err();
        assert!(matches!(err, InterviewError::InvalidArgument(_)));
        assert!(err.to_string().contains("Astronaut"));
    }

    #[test]
    fn persona_round_trips_through_wire_name() {
        for persona in Persona::ALL {
            assert_eq!(persona.as_str().parse::<Persona>().unwrap(), persona);
        }
    }

    #[test]
    fn edge_case_persona_keeps_its_hyphenated_wire_name() {
        assert_eq!(
            serde_json::from_str::<Persona>("\"Edge-case\"").unwrap(),
            Persona::EdgeCase
        );
    }

    #[test]
    fn unknown_persona_is_rejected() {
        assert!(matches!(
            "Sleepy".parse::<Persona>(),
            Err(InterviewError::InvalidArgument(_))
        ));
    }

    #[test]
    fn every_persona_has_instructions() {
        for persona in Persona::ALL {
            assert!(!persona.instructions().is_empty());
        }
    }
}
