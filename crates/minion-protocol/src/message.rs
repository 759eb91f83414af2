use serde::{Deserialize, Serialize};

/// Message types for the TCP protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Hello = 1,
    Welcome = 2,
    Refused = 3,
    Put = 4,
    Get = 5,
    Len = 6,
    Ack = 7,
    Item = 8,
    Length = 9,
    Nack = 10,
}

impl MessageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(MessageType::Hello),
            2 => Some(MessageType::Welcome),
            3 => Some(MessageType::Refused),
            4 => Some(MessageType::Put),
            5 => Some(MessageType::Get),
            6 => Some(MessageType::Len),
            7 => Some(MessageType::Ack),
            8 => Some(MessageType::Item),
            9 => Some(MessageType::Length),
            10 => Some(MessageType::Nack),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// The two queues a server hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueName {
    Tasks,
    Results,
}

impl QueueName {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueName::Tasks => "task_queue",
            QueueName::Results => "result_queue",
        }
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// First frame on every connection
    Hello { secret: Vec<u8> },

    /// Handshake accepted
    Welcome,

    /// Handshake rejected; the server closes the connection
    Refused { reason: String },

    /// Append an opaque item to a queue
    Put { queue: QueueName, payload: Vec<u8> },

    /// Remove the oldest item of a queue, waiting if it is empty
    Get { queue: QueueName },

    /// Ask for the current number of items in a queue
    Len { queue: QueueName },

    /// Positive acknowledgment of a `Put`
    Ack,

    /// Reply to `Get`
    Item { payload: Vec<u8> },

    /// Reply to `Len`
    Length { len: u64 },

    /// Negative acknowledgment
    Nack { error: String },
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Hello { .. } => MessageType::Hello,
            Message::Welcome => MessageType::Welcome,
            Message::Refused { .. } => MessageType::Refused,
            Message::Put { .. } => MessageType::Put,
            Message::Get { .. } => MessageType::Get,
            Message::Len { .. } => MessageType::Len,
            Message::Ack => MessageType::Ack,
            Message::Item { .. } => MessageType::Item,
            Message::Length { .. } => MessageType::Length,
            Message::Nack { .. } => MessageType::Nack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_conversion() {
        assert_eq!(MessageType::from_u8(1), Some(MessageType::Hello));
        assert_eq!(MessageType::from_u8(10), Some(MessageType::Nack));
        assert_eq!(MessageType::from_u8(0), None);
        assert_eq!(MessageType::from_u8(99), None);

        assert_eq!(MessageType::Hello.as_u8(), 1);
        assert_eq!(MessageType::Nack.as_u8(), 10);
    }

    #[test]
    fn test_queue_names() {
        assert_eq!(QueueName::Tasks.to_string(), "task_queue");
        assert_eq!(QueueName::Results.to_string(), "result_queue");
    }
}
