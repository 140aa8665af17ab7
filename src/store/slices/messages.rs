//! Conversations and the messages of the open one

use serde::{Deserialize, Serialize};

use crate::models::{Conversation, ConversationDetails, ConversationInfo, Message};
use crate::store::Collection;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesData {
    pub conversations: Collection<Conversation>,
    /// Messages of the open conversation, newest first
    pub messages: Collection<Message>,
    pub current_conversation: Option<ConversationInfo>,
}

impl MessagesData {
    pub fn open_conversation(&mut self, details: ConversationDetails) {
        self.messages.replace(details.messages);
        self.current_conversation = Some(details.conversation);
    }

    pub fn push_sent(&mut self, message: Message) {
        self.messages.prepend(message);
    }
}
