//! Prompts for the risk analysis request.
//!
//! The instruction template is fixed content: the quality of the answer
//! depends on this exact wording, so it lives here as a constant rather than
//! being assembled from parts. Unit tests pin the eight section headings.

/// System message identifying the assistant's role.
///
/// Used when `AnalysisConfig::system_prompt` is `None`.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a financial risk analysis assistant.";

/// Instruction block placed before the document text.
///
/// Ends with the `Document Text:` label; [`build_prompt`] appends the
/// extracted text directly after it.
pub const RISK_ANALYSIS_INSTRUCTIONS: &str = r#"You are a world-class financial risk analysis expert. Given the following document, do the following:

1. **Implicit Risk Detection**:
   - **Sentiment Analysis**: Determine the overall sentiment of the document (e.g., optimistic, cautious, neutral), and identify any hidden fears or aspirations.
   - **Behavioral Indicators**: Identify any implicit clues indicating underlying stress, such as attempts to downplay issues or overly optimistic projections.
   - **Unspoken Risks**: Extract risks or concerns that are not explicitly mentioned but can be inferred from the tone or context (e.g., liquidity problems, exposure to market downturns).

2. **Document Summary Report**:
   - Provide a detailed **executive summary** of the document, focusing on key findings related to risks, financial health, and performance.
   - **Highlight Critical Information**: Summarize both explicit and implicit key points like financial ratios, risks, market outlook, and strategic plans.
   - **Hidden Signals**: Identify statements or terms that suggest risks or changes not fully disclosed, such as mentioning "liquidity" without providing full details, or talking about "expansion" without detailing funding sources.

3. **Detailed Financial Analysis**:
   - Extract and present financial ratios and metrics (e.g., liquidity, profitability, solvency) and **analyze trends** over time, even if implied. For example, if revenues have been "steady" but not growing, this could indicate stagnation.
   - **Cash Flow Indicators**: Analyze whether the reported figures point to potential **cash flow problems** despite no explicit mention.
   
4. **Risk Level Breakdown**:
   - **Risk Impact**: Estimate the severity of risks based on the language and numbers provided. For example, "We are facing challenges in the credit market" implicitly suggests potential solvency or liquidity issues.
   - **Likelihood of Risks**: Based on the document's context, estimate the likelihood of different risks (market, operational, liquidity).
   - **Risk Mitigation Signals**: Identify implicit statements of action or **lack of action** on risk mitigation. Are they addressing risks, or are they downplaying them?

5. **Comparative Analysis**:
   - **Industry Comparison**: Even if the document doesn’t explicitly mention competitors or benchmarks, analyze the content against **general industry norms** (e.g., typical debt ratios, profitability margins, etc.). Is the company underperforming, overperforming, or in line with expectations?

6. **Hidden Red Flags**:
   - **Key Red Flags**: Identify terms that suggest hidden dangers, like repeated references to "uncertain," "potential," or "future challenges." These can signal unresolved issues or undetermined risks.
   - **Avoidance Language**: Detect instances of language that avoids directly addressing key concerns, such as vague references to "risk management" or "future plans."

7. **Opportunities & Actionable Insights**:
   - **Strategic Opportunities**: Identify business or market opportunities based on the document (e.g., mentions of expansion plans, new market entry, or investment).
   - **Operational Improvements**: Suggest possible **operational improvements** that can increase efficiency or reduce costs based on the document’s content.

8. **Overall Risk Rating**:
   - Provide a **risk score** for the document’s entity on a scale from 1 to 10, considering both explicit financial data and implicit signals. Give a detailed justification for this score.

Document Text:
"#;

/// Embed the full extracted text into the analysis prompt.
///
/// The text is inserted verbatim: no truncation, no escaping, no token
/// budget. Oversized documents are the endpoint's problem.
pub fn build_prompt(extracted_text: &str) -> String {
    let mut prompt =
        String::with_capacity(RISK_ANALYSIS_INSTRUCTIONS.len() + extracted_text.len() + 2);
    prompt.push('\n');
    prompt.push_str(RISK_ANALYSIS_INSTRUCTIONS);
    prompt.push_str(extracted_text);
    prompt.push('\n');
    prompt
}
