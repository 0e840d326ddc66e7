use crate::models::{Donation, FoodRequest};
use std::fmt::Write;

/// Build the matching prompt for one donation and the open requests
///
/// The model is asked to answer with a bare JSON array so the reply can be
/// parsed directly.
pub fn build_match_prompt(donation: &Donation, requests: &[FoodRequest]) -> String {
    let mut prompt = String::from(
        "You match surplus food donations with open food requests.\n\
         Weigh food type compatibility, quantity, urgency and how soon the donation expires.\n\n",
    );

    prompt.push_str("Donation:\n");
    let _ = writeln!(prompt, "- Item: {}", donation.item_name);
    let _ = writeln!(prompt, "- Quantity: {}", donation.quantity);
    let _ = writeln!(prompt, "- Description: {}", donation.description);
    let _ = writeln!(prompt, "- Expires in: {} days", donation.expiry_days);

    prompt.push_str("\nRequests:\n");
    for request in requests {
        let _ = writeln!(prompt, "- Request ID: {}", request.id);
        let _ = writeln!(prompt, "  Item: {}", request.item_name);
        let _ = writeln!(prompt, "  Quantity: {}", request.quantity);
        let _ = writeln!(prompt, "  Description: {}", request.description);
        let _ = writeln!(prompt, "  Urgency: {}", request.urgency);
    }

    prompt.push_str(
        "\nRespond with only a JSON array, no prose. Each element must look like \
         {\"requestId\": \"<request id>\", \"score\": <number between 0 and 1>, \"reason\": \"<short reason>\"}. \
         Leave out requests that are not a reasonable match. Return [] if none fit.\n",
    );

    prompt
}

/// Build the assistant prompt for a chatbot message
///
/// Only the first message of a session gets a greeting.
pub fn build_chat_prompt(message: &str, first_message: bool) -> String {
    let greeting = if first_message {
        "This is the user's first message: greet them and thank them for reaching out."
    } else {
        "You are mid-conversation: do not greet or thank the user again."
    };

    format!(
        "You are the assistant of Zero Hunger, a platform that collects food donations \
         and delivers them to people and shelters that asked for food.\n\
         Help donors decide what and where to donate, point people to nearby collection \
         centers, explain how volunteers can help, and answer questions about donating, \
         storing and handling food.\n\
         Answer in two or three clear, friendly sentences and encourage donating.\n\
         Do not give medical advice, do not guarantee food safety, and never share \
         personal details of donors or recipients. If you do not know, say so.\n\
         {greeting}\n\n\
         User: {message}\n\
         Assistant:"
    )
}
