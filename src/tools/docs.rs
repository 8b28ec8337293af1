//! Documentation lookup tools backed by a static topic table.

use async_trait::async_trait;

use crate::core::error::ToolError;
use crate::core::tool::{str_arg, FieldKind, JsonObject, ToolDescriptor, ToolHandler, ToolOutput};
use crate::domain::topic::{GENERAL_TOPICS, REACT_TOPICS};
use crate::domain::{Topic, TopicFamily};

/// Serves the markdown page for one topic family.
#[derive(Debug, Clone, Copy)]
pub struct DocsByTopic {
    family: TopicFamily,
}

impl DocsByTopic {
    pub const REACT: &'static str = "GetReactDocsByTopic";
    pub const GENERAL: &'static str = "GetGeneralDocsByTopic";

    pub fn react() -> Self {
        Self { family: TopicFamily::React }
    }

    pub fn general() -> Self {
        Self { family: TopicFamily::General }
    }

    pub fn name(&self) -> &'static str {
        match self.family {
            TopicFamily::React => Self::REACT,
            TopicFamily::General => Self::GENERAL,
        }
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        let (description, topics) = match self.family {
            TopicFamily::React => (
                "Get documentation for building the React frontend by topic",
                REACT_TOPICS,
            ),
            TopicFamily::General => ("Get general programming guidance by topic", GENERAL_TOPICS),
        };
        ToolDescriptor::new(self.name(), description).required(
            "topic",
            FieldKind::Enum(topics),
            "Documentation topic",
        )
    }
}

#[async_trait]
impl ToolHandler for DocsByTopic {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError> {
        let raw = str_arg(arguments, "topic")?;
        let topic = raw
            .parse::<Topic>()
            .map_err(|e| ToolError::Message(e.to_string()))?;
        if topic.family() != self.family {
            return Err(ToolError::Message(format!("invalid topic: {raw}")));
        }
        Ok(ToolOutput::Text(doc(topic).to_owned()))
    }
}

pub fn doc(topic: Topic) -> &'static str {
    match topic {
        Topic::EssentialKnowledge => {
            "# Essential Knowledge\n\n\
             - The frontend is a React app written in TypeScript and built with Vite.\n\
             - Pages live under `src/pages`, shared UI under `src/components`.\n\
             - Server state goes through the API client in `src/lib/api.ts`; never call `fetch` from components.\n\
             - Run `npm run dev` for the dev server and `npm run typecheck` before pushing.\n"
        }
        Topic::BasicUiSetup => {
            "# Basic UI Setup\n\n\
             1. Wrap the app in the theme provider in `src/main.tsx`.\n\
             2. Use the layout shell (`<AppShell>`) for every authenticated page.\n\
             3. Style with Tailwind utility classes; add tokens to `tailwind.config.ts` rather than hard-coding colours.\n\
             4. Icons come from `lucide-react`.\n"
        }
        Topic::Authentication => {
            "# Authentication\n\n\
             - Sessions are handled by the auth provider; read the user with `useSession()`.\n\
             - Guard private routes with `<RequireAuth>`; unauthenticated users land on `/auth/login`.\n\
             - After checkout the user returns to `/dashboard`, where the subscription status is refreshed.\n\
             - Never store tokens in `localStorage`; the provider keeps them in an HTTP-only cookie.\n"
        }
        Topic::Routing => {
            "# Routing\n\n\
             - Routes are declared once in `src/router.tsx` with `createBrowserRouter`.\n\
             - Use `<Link>` for navigation and `useNavigate()` for redirects after actions.\n\
             - Lazy-load heavy pages with `React.lazy` and a `<Suspense>` fallback.\n\
             - Unknown paths render the `NotFound` page.\n"
        }
        Topic::Customizing => {
            "# Customizing\n\n\
             - Brand colours, radii and fonts are theme tokens; change them in one place.\n\
             - Prefer composition over props explosion: pass children or render slots.\n\
             - Dark mode follows the `class` strategy; test both themes for contrast.\n"
        }
        Topic::CreatingComponents => {
            "# Creating Components\n\n\
             - One component per file, named export matching the file name.\n\
             - Type props with an interface; avoid `any`.\n\
             - Keep components pure; move data fetching into hooks under `src/hooks`.\n\
             - Add a story or a test for every reusable component.\n"
        }
        Topic::Troubleshooting => {
            "# Troubleshooting\n\n\
             - Blank page: check the browser console for a failed import or env variable.\n\
             - CORS errors: the API origin must be listed in the gateway's `CORS_ORIGINS`.\n\
             - Stale data: invalidate the relevant query key after a mutation.\n\
             - Type errors after pulling: delete `node_modules/.vite` and restart the dev server.\n"
        }
        Topic::PythonBasics => {
            "# Python Basics\n\n\
             - Use virtual environments (`python -m venv .venv`) per project.\n\
             - Format with `black`, lint with `ruff`, type-check with `mypy`.\n\
             - Prefer f-strings, list comprehensions and `pathlib` over manual string paths.\n\
             - Handle exceptions narrowly; never use a bare `except:`.\n"
        }
        Topic::JavascriptFundamentals => {
            "# JavaScript Fundamentals\n\n\
             - Use `const` by default and `let` when reassignment is needed; avoid `var`.\n\
             - Understand the event loop: promises resolve on the microtask queue.\n\
             - Use `async`/`await` with `try`/`catch` for asynchronous error handling.\n\
             - Compare with `===`; `==` performs type coercion.\n"
        }
        Topic::BestPractices => {
            "# Best Practices\n\n\
             - Keep functions small and named after what they do.\n\
             - Validate input at the boundary and trust it inside.\n\
             - Write tests for behaviour, not implementation details.\n\
             - Keep secrets out of source control; load them from the environment.\n"
        }
        Topic::CodeReviewTips => {
            "# Code Review Tips\n\n\
             - Review for correctness first, then readability, then style.\n\
             - Ask questions instead of issuing orders.\n\
             - Keep pull requests small enough to review in one sitting.\n\
             - Approve once remaining comments are nits, and say so.\n"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(topic: &str) -> JsonObject {
        json!({ "topic": topic }).as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn react_tool_serves_markdown() {
        let out = DocsByTopic::react().call(&args("routing")).await.unwrap();
        let ToolOutput::Text(text) = out else { panic!("expected text") };
        assert!(text.starts_with("# Routing"));
    }

    #[tokio::test]
    async fn tools_refuse_the_other_family() {
        let err = DocsByTopic::general().call(&args("routing")).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid topic: routing");
        let err = DocsByTopic::react().call(&args("python-basics")).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid topic: python-basics");
    }

    #[test]
    fn every_topic_has_a_page() {
        for topic in Topic::ALL {
            assert!(doc(topic).starts_with("# "), "{topic} page lacks a heading");
        }
    }

    #[test]
    fn descriptors_enumerate_their_family() {
        let d = DocsByTopic::general().descriptor();
        assert_eq!(d.name(), "GetGeneralDocsByTopic");
        let schema = d.input_schema();
        assert_eq!(schema["properties"]["topic"]["enum"], json!(GENERAL_TOPICS));
        assert_eq!(schema["required"], json!(["topic"]));
    }
}
