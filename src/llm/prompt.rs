use crate::herd::HerdRecord;
use crate::types::{AppError, Result};
use std::fmt::Write;

const ADVISOR_ROLE: &str = "You are an AI assistant for dairy farmers in Kenya.
Your role is to provide expert advice on:
1. Dairy cow management
2. Milk production optimization
3. Feed management
4. Health and disease prevention
5. Market information and pricing";

const ADVISOR_GUIDANCE: &str = "Please provide practical, actionable advice based on Kenyan farming conditions and the specific data provided.
Format your response in markdown with:
- Clear headings
- Bullet points for recommendations
- Bold text for important points
- Tables if presenting data comparisons
- Code blocks for any specific measurements or formulas

Focus on:
- Identifying any health concerns
- Suggesting improvements for milk production
- Providing feed recommendations
- Noting any concerning trends in the data";

/// Renders one cow's block from its most recent daily record.
fn cow_block(cow: &HerdRecord) -> Result<String> {
    let latest = cow.latest_record().ok_or_else(|| {
        AppError::Internal(format!("Cow '{}' has no daily records", cow.name))
    })?;

    let mut block = String::new();
    // Writing to a String cannot fail
    let _ = write!(
        block,
        "### {} ({})\n\
         - **Age**: {} years\n\
         - **Weight**: {} kg\n\
         - **Health Status**: {}\n\
         - **Pregnancy Status**: {}\n\
         - **Last Calving**: {}\n\
         - **Recent Milk Production**: {} liters\n\
         - **Recent Feed Intake**: {} kg\n\
         - **Recent Health Notes**: {}",
        cow.name,
        cow.breed,
        cow.age,
        cow.weight,
        cow.health_status.as_str(),
        cow.pregnancy_status.as_str(),
        cow.last_calving_date,
        latest.milk_production,
        latest.feed_intake,
        latest.health_notes,
    );
    Ok(block)
}

/// Builds the advisor prompt: role, herd data, guidance, then the user's
/// message as the final `User:` turn.
pub fn build_prompt(herd: &[HerdRecord], message: &str) -> Result<String> {
    let blocks = herd
        .iter()
        .map(cow_block)
        .collect::<Result<Vec<_>>>()?
        .join("\n\n");

    Ok(format!(
        "{}\n\nHere is the current data for the farm's cows:\n{}\n\n{}\n\nUser: {}",
        ADVISOR_ROLE, blocks, ADVISOR_GUIDANCE, message
    ))
}
