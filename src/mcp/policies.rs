//! Static policy texts served as MCP resources. These are content, not
//! logic: the host LLM loads them before reviewing a PR or writing a PR
//! description.

pub const REVIEW_POLICY_URI: &str = "policy://review";
pub const PR_DESCRIPTION_GUIDE_URI: &str = "policy://pr-description-guide";

pub const REVIEW_POLICY: &str = r#"
LIGHTWEIGHT PR REVIEW POLICY
============================

This policy is designed for **pragmatic, focused code reviews**.
The goal is to catch **meaningful issues** and improve the code where it matters,
without over-reviewing or redesigning the entire solution.

SCOPE OF THE REVIEW
-------------------
- Prioritize **correctness**, **clarity**, and **consistency with existing patterns**.
- Focus on **new or changed code only** as shown in the diff.
- Do **not** attempt a full architecture review unless the PR clearly introduces
  architectural changes.
- Keep feedback **practical and proportionate** to the size and impact of the PR.

WHAT TO ALWAYS CHECK
--------------------
For the changed code, the reviewer should primarily verify:

1) Correctness & Safety
   - Does the new logic do what it claims to do?
   - Are obvious edge cases or error paths handled?
   - Is there any clear risk of crashes, bad data, or security concerns?

2) Readability & Consistency
   - Is the new code understandable without excessive mental effort?
   - Does it follow existing naming, patterns, and structure in this repository?
   - Is there unnecessary duplication that can be easily avoided?

3) Tests (Only for New Behavior)
   - If the PR introduces non-trivial new behavior, is there at least one test
     covering the main happy path and a key edge/error case?
   - API tests should validate response structure; deep logic should be tested
     in the service/domain layer.

4) Docstrings & API Contracts (When Relevant)
   - If new public functions, endpoints, or schemas are added:
       - Is there a minimal but clear docstring or description?
       - Does the documented behavior match what the code actually does?

WHAT TO AVOID
-------------
To prevent over-review, the reviewer should **not**:

- Nitpick personal style preferences that do not violate existing patterns.
- Propose large refactors unless there is a **clear, concrete** benefit
  (e.g., obvious bug risk, major readability problem, or duplication).
- Request changes for minor cosmetic details (spacing, trivial renames, etc.)
  unless they materially improve clarity.
- Reopen topics that are already clearly discussed and resolved in existing comments.

REVIEW OUTPUT STYLE
-------------------
- Keep the review **short and focused**, especially for small PRs.
- Prefer **a few high-impact comments** over many low-value ones.
- When pointing out an issue, include a **specific, actionable suggestion**.
- Use a friendly, teammate tone. The goal is collaboration, not policing.

SUGGESTED REVIEW STRUCTURE
--------------------------
Reviews may follow this simple structure:

- Summary: 2-3 sentences describing what the PR does and overall impression.
- Key Issues (if any): List 2-5 concrete, high-priority observations.
- Optional Nice-to-haves: Only if they are easy wins and clearly beneficial.
- Tests: Briefly note if tests are sufficient, missing, or could use one more case.

SOURCE OF TRUTH
---------------
All conclusions must be based strictly on:
- The unified diff returned by the diff tool.
- Any existing comments on the PR (to avoid duplicating feedback).

Do not assume or speculate about code that is not visible in the diff.

The goal of this policy is to keep reviews **helpful, respectful, and efficient**,
focusing on the changes that really matter.
"#;

pub const PR_DESCRIPTION_GUIDE: &str = r#"
PR DESCRIPTION GUIDE
====================

## What type of PR is this? (check all applicable)
- [ ] Refactor
- [ ] Feature
- [ ] Bug Fix
- [ ] Platform related
- [ ] Documentation Update

## Description
This section must be **very short and to the point**.

Rules:
  - Describe **why** the PR exists.
  - Give a **high-level summary** of the main change.
  - Max length: **1 short sentence + 1-2 bullets** (or 3 lines total).
  - NEVER restate the diff or describe the code internally.
  - Avoid long paragraphs, unnecessary details, and explaining the algorithm.

Example good descriptions:
  - "Fixes incorrect problem field mapping so the frontend receives the right structure."
  - "Adds a typed endpoint to expose problem fields for the UI."
  - "Refactors field extraction logic into a dedicated service to simplify updates."

## Test Instructions
  - Explain briefly how a reviewer or QA can verify the change.
  - List key test commands or a short manual step if required.
  - Keep it minimal and practical.

## Added/updated tests?
- [ ] Yes
- [ ] No, because: <brief explanation>
- [ ] I need help with writing tests

**Auto-detect this from the diff:**
  - If the diff contains changes to test files (e.g., test_*.py, *_test.py, tests/, __tests__/),
    check "Yes"
  - If no test files were modified/added, check "No" and provide a brief reason
    (e.g., "No, because: refactor only" or "No, because: config change")

## Added/updated Code Documentation?
- [ ] Yes
- [ ] No, because: <brief explanation>

**Auto-detect this from the diff:**
  - If the diff contains changes to docstrings, README, docs/, or comment blocks,
    check "Yes"
  - If no documentation was modified/added, check "No" and provide a brief reason
    (e.g., "No, because: internal logic change" or "No, because: self-explanatory fix")

General principles:
  - Be concise.
  - Lead with **WHY**, not HOW.
  - Highlight only the most important aspects.
  - Assume reviewers can see the diff.
  - Shorter is better.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_texts_are_populated() {
        assert!(REVIEW_POLICY.contains("LIGHTWEIGHT PR REVIEW POLICY"));
        assert!(REVIEW_POLICY.contains("SOURCE OF TRUTH"));
        assert!(PR_DESCRIPTION_GUIDE.contains("## Test Instructions"));
    }
}
