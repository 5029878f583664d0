use log::{info, warn};
use teloxide::Bot;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::{ChatId, Requester};
use teloxide::types::ParseMode;
use crate::models::GradeMap;

// Constructs a message string from the newly posted grades, one line per course.
pub fn new_grades_message(new_grades: &GradeMap) -> String {
    let mut message = String::from("Hi!\nThese new grade(s) have just been posted:\n\n");
    for (course, grade) in new_grades {
        message.push_str(&format!("- {}: {}\n", course, grade));
    }
    message
}

// Sends the constructed message asynchronously to a specified chat using a bot token.
// A failed delivery is logged and does not abort the run.
pub async fn send(message: &str) {
    // Fetches the bot token and chat ID from environment variables
    let bot_token = std::env::var("BOT_TOKEN").expect("BOT_TOKEN environment variable not found");
    let chat_id = std::env::var("CHAT_ID").expect("CHAT_ID environment variable not found");

    let bot = Bot::new(bot_token);

    // Attempts to send the message and logs the outcome
    match bot.send_message(ChatId(chat_id.parse().unwrap()), message)
        .parse_mode(ParseMode::Markdown)
        .await
    {
        Ok(message) => info!("Text message sent successfully {:?}", message.id),
        Err(e) => warn!("Text message wasn't sent because of: {}", e)
    };
}
