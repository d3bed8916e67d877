//! The standardized judging prompt.

const RELEVANCE_PROMPT: &str = "\
You will be shown one image and the description of a planned post.

Description:
{description}

Rate how well the image illustrates the described content.
Respond with a single integer between 0 and 100 and nothing else.";

/// Build the judging prompt for a target description.
pub fn relevance_prompt(description: &str) -> String {
    RELEVANCE_PROMPT.replace("{description}", description)
}
