//! Prompt construction for the content service.

use crate::request::GenerationRequest;
use crate::sections::HeadingMarker;

/// Sections the generated guide is asked to contain, in order.
pub const REQUESTED_SECTIONS: [&str; 3] = [
    "Introduction",
    "Explanation with examples",
    "Further Reading",
];

/// Builds the instruction sent to the content service.
///
/// The prompt names the topics, depth and tone, lists the expected sections
/// and tells the service to mark headings with `marker` so the response can be
/// split by [`crate::sections::split_sections`].
pub fn build_prompt(request: &GenerationRequest, marker: HeadingMarker) -> String {
    let topics = request.keywords().join(", ");
    let prefix = marker.prefix();

    format!(
        "Create a structured study guide on the following topics: {topics}.\n\
         - Depth: {depth}\n\
         - Tone: {tone}\n\
         - Include sections: {first}, {second}, and {third}.\n\
         - Format output clearly with section headings (use Markdown style {prefix} Heading).\n",
        depth = request.depth(),
        tone = request.tone(),
        first = REQUESTED_SECTIONS[0],
        second = REQUESTED_SECTIONS[1],
        third = REQUESTED_SECTIONS[2],
    )
}
