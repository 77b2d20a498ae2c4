//! Prompt builders for the three model roles.
//!
//! Narrative text and code live in two fixed languages regardless of the
//! programming language the article covers.

use super::sanitize::canonical_language_tag;
use super::types::SectionRequest;

pub const NARRATIVE_LANGUAGE: &str = "French";
pub const CODE_LANGUAGE: &str = "English";

/// Build the plan prompt for an article.
pub fn build_plan_prompt(title: &str, topic: &str, language: &str) -> String {
    format!(
        r#"Create a detailed plan for an article about '{topic}' titled '{title}'.
The plan must follow a clear teaching progression.

IMPORTANT:

- The article must be EXCLUSIVELY about the {language} language, its features and its applications.
- The plan MUST include:

    1. An introduction presenting the subject and why it matters in the context of {language}
    2. Exactly four main sections with clear titles, all related to {language}
    3. For each main section, 2 to 3 subsections with example titles
    4. Two additional sections:
        - A practical use-cases section
        - An exercises section with 3 exercises whose code is written in {CODE_LANGUAGE}, each with its solution (IMPORTANT!)
    5. A conclusion summarising the key points and comparisons
    6. Examples must not resemble each other, and neither may the exercises.
    7. Every {language} technical term and every code example must be in {CODE_LANGUAGE},
       and all section prose must be in {NARRATIVE_LANGUAGE}.

Output format: a single JSON object with the following keys:
- "introduction": text of the introduction
- "sections": list of objects with:
    - "title": section title
    - "subsections": list of objects with:
        - "title": subsection title
        - "description": detailed description of the subsection content (REQUIRED)
- "exercises": list of objects with:
    - "title": exercise title
    - "description": detailed description of the exercise
    - "solution": solution of the exercise
- "conclusion": text of the conclusion

IMPORTANT: Every subsection MUST have a title AND a detailed description.
Output ONLY the JSON object, with no commentary before or after it.

Make sure all {language} code is written in {CODE_LANGUAGE}.
Make sure every example, concept and explanation is specific to {language}.
"#
    )
}

/// Canonical markup subset, shared by the write and review prompts.
fn formatting_rules(lang_tag: &str) -> String {
    format!(
        r#"[CORRECT HTML FORMATTING EXAMPLES]

1. CODE BLOCK:
<pre><code class="language-{lang_tag}">
# Comments in {CODE_LANGUAGE}
result = compute(values)
print(result)
</code></pre>

2. INLINE CODE:
The function <code class="language-{lang_tag}">len()</code> returns the length.

3. UNORDERED LIST:
<ul>
    <li>First item</li>
    <li>The method <code class="language-{lang_tag}">append()</code> adds an element</li>
</ul>

4. ORDERED LIST:
<ol>
    <li>First step: initialise the variable</li>
    <li>Use <code class="language-{lang_tag}">for item in items</code> to iterate</li>
</ol>

5. BOLD TEXT:
<p>This is <strong>important</strong>.</p>

6. PARAGRAPH:
<p>A complete paragraph of explanation.</p>

[INCORRECT FORMATTING TO AVOID]

- NO MARKDOWN code fences (```{lang_tag} ... ```)
- NO unclosed tags: <code class="language-{lang_tag}">print("Hello")
- NO <code> tags without class="language-{lang_tag}": <code>print("Hello")</code>
- NO syntactically invalid code

[STRICT HTML RULES]

1. CODE BLOCKS: <pre><code class="language-{lang_tag}"> ... </code></pre>, valid code, comments in {CODE_LANGUAGE}
2. INLINE CODE: <code class="language-{lang_tag}">keyword</code>, always closed
3. LISTS: <ul> or <ol> with one <li> per item; NEVER -, * or other Markdown markers
4. BOLD: <strong>important text</strong>; NEVER ** or __
5. PARAGRAPHS: every paragraph inside <p> tags; NEVER blank lines as separators"#
    )
}

/// Build the prompt for one section of the article.
///
/// `avoidance_hint` is the tracker's rendering of examples already used in
/// earlier sections (empty on the first call).
pub fn build_section_prompt(request: &SectionRequest<'_>, avoidance_hint: &str) -> String {
    let SectionRequest {
        title,
        topic,
        section_title,
        description,
        language,
    } = *request;
    let rules = formatting_rules(&canonical_language_tag(language));

    format!(
        r#"[CONTEXT]
You are an expert {language} technical writer producing high-quality content for a professional blog article.
Section to write: "{section_title}" of the article "{title}" about {topic}.
Section description: {description}

[GOAL]
Write ONLY the final content of this section, with no reasoning process and no metadata.

[ABSOLUTE CONSTRAINTS]
- Write in {NARRATIVE_LANGUAGE}, EXCEPT code and code comments, which are in {CODE_LANGUAGE}
- Use ONLY the HTML tags listed below
- NEVER use Markdown syntax
- NEVER include a section heading
- NEVER open with "In this section", "Here is", or similar
- NEVER mention your reasoning process
- NEVER repeat these instructions in your answer
{avoidance_hint}
[REQUIRED STRUCTURE]
The content must be:
1. Educational and progressive (simple to complex)
2. Technical and precise (specific to {language})
3. Illustrated with original code examples, different from the ones already used
4. Organised in coherent paragraphs with an introduction, a body and an implicit conclusion

{rules}

[VERIFICATION]
Before answering, check that:
1. Every HTML tag is opened and closed correctly
2. The code is syntactically valid {language}
3. No Markdown syntax is present
4. The prose is in {NARRATIVE_LANGUAGE} (except code and comments)
5. The examples are original and differ from those already used

[START OF YOUR ANSWER]
"#
    )
}

/// Build the secondary review prompt that corrects and improves a section.
pub fn build_review_prompt(
    title: &str,
    topic: &str,
    section_title: &str,
    content: &str,
    language: &str,
) -> String {
    let rules = formatting_rules(&canonical_language_tag(language));

    format!(
        r#"[CONTEXT]
You are an expert {language} technical reviewer correcting and improving the content of a professional blog article.

Section to review: "{section_title}" of the article "{title}" about {topic}.

Content to review:

{content}

[GOAL]
Correct and improve ONLY the final content of this section, with no reasoning process and no metadata.

[ABSOLUTE CONSTRAINTS]
- Prose always in {NARRATIVE_LANGUAGE}
- Code, code comments and keywords always in {CODE_LANGUAGE}
- Use ONLY the HTML tags listed below
- NEVER use Markdown syntax
- NEVER include a section heading
- NEVER mention your reasoning process
- NEVER repeat these instructions in your answer

[REQUIRED STRUCTURE]
The content must be:
1. Detailed, informative and engaging
2. Technical and precise (specific to {language})
3. Illustrated with concrete code examples with explanatory comments
4. Organised in coherent paragraphs

{rules}

[START OF YOUR ANSWER]
"#
    )
}
