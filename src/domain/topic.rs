use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicFamily {
    React,
    General,
}

/// Closed set of documentation topics served by the docs tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    EssentialKnowledge,
    BasicUiSetup,
    Authentication,
    Routing,
    Customizing,
    CreatingComponents,
    Troubleshooting,
    PythonBasics,
    JavascriptFundamentals,
    BestPractices,
    CodeReviewTips,
}

pub const REACT_TOPICS: &[&str] = &[
    "essential-knowledge",
    "basic-ui-setup",
    "authentication",
    "routing",
    "customizing",
    "creating-components",
    "troubleshooting",
];

pub const GENERAL_TOPICS: &[&str] = &[
    "python-basics",
    "javascript-fundamentals",
    "best-practices",
    "code-review-tips",
];

impl Topic {
    pub const ALL: [Topic; 11] = [
        Topic::EssentialKnowledge,
        Topic::BasicUiSetup,
        Topic::Authentication,
        Topic::Routing,
        Topic::Customizing,
        Topic::CreatingComponents,
        Topic::Troubleshooting,
        Topic::PythonBasics,
        Topic::JavascriptFundamentals,
        Topic::BestPractices,
        Topic::CodeReviewTips,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Topic::EssentialKnowledge => "essential-knowledge",
            Topic::BasicUiSetup => "basic-ui-setup",
            Topic::Authentication => "authentication",
            Topic::Routing => "routing",
            Topic::Customizing => "customizing",
            Topic::CreatingComponents => "creating-components",
            Topic::Troubleshooting => "troubleshooting",
            Topic::PythonBasics => "python-basics",
            Topic::JavascriptFundamentals => "javascript-fundamentals",
            Topic::BestPractices => "best-practices",
            Topic::CodeReviewTips => "code-review-tips",
        }
    }

    pub fn family(self) -> TopicFamily {
        match self {
            Topic::EssentialKnowledge
            | Topic::BasicUiSetup
            | Topic::Authentication
            | Topic::Routing
            | Topic::Customizing
            | Topic::CreatingComponents
            | Topic::Troubleshooting => TopicFamily::React,
            Topic::PythonBasics
            | Topic::JavascriptFundamentals
            | Topic::BestPractices
            | Topic::CodeReviewTips => TopicFamily::General,
        }
    }
}

impl TopicFamily {
    pub fn slugs(self) -> &'static [&'static str] {
        match self {
            TopicFamily::React => REACT_TOPICS,
            TopicFamily::General => GENERAL_TOPICS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid topic: {0}")]
pub struct UnknownTopic(pub String);

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| UnknownTopic(s.to_owned()))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
